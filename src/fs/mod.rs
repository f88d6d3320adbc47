//! 文件存储模块
//!
//! 传输引擎依赖的存储能力接口及其后端实现：
//! - `volume`: 能力接口 [`Volume`]、元数据与惰性根目录枚举
//! - `ram`: 无堆分配的定长 RAM 卷
//! - `host`: 主机目录卷 (需要 `std`)

pub mod ram;
pub mod volume;

#[cfg(any(test, feature = "std"))]
pub mod host;

pub use ram::{RamDir, RamFile, RamVolume};
pub use volume::{file_name, AccessMode, FileName, FileType, FsError, Metadata, RootDir, Volume};

#[cfg(any(test, feature = "std"))]
pub use host::HostVolume;
