//! RustFM - 设备端文件管理器
//!
//! 通过一条窄的命令/应答文本通道，把设备上的扁平文件存储暴露给主机:
//! - 列出文件、分块读取、带校验的分块写入 (可从地址 0 重新开始)
//! - 删除单个文件或全部文件 (受权限位控制)
//! - 单槽缓存文件句柄，任意时刻最多一个存储句柄，空闲超时自动关闭
//! - 条件编译日志系统
//!
//! 默认 `no_std`，`std` feature 提供主机目录卷和 `fm-host` 演示程序。

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod command;
pub mod fs;
pub mod sync;
pub mod transfer;
pub mod util;

#[cfg(test)]
mod testing;

// ===== 重导出常用类型 =====
pub use command::{Dispatcher, DispatcherConfig, TransferOptions};
pub use fs::{FsError, RamVolume, Volume};
pub use sync::SharedDispatcher;
pub use transfer::{Base64Codec, Responder, TransferEngine, TransferResult, WireCodec};
pub use util::{Clock, SystemClock, TextResponder};

#[cfg(feature = "std")]
pub use fs::HostVolume;

// ===== 版本信息 =====
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 系统配置常量
pub mod config {
    /// 缓存句柄空闲超时 (毫秒)
    pub const CACHE_TIMEOUT_MS: u64 = 3000;

    /// 读取命令单次最多发送的字节数 (3 的倍数，与 Base64 分组对齐)
    pub const MAX_BLOCK_TO_SEND: u32 = 510;

    /// 文件名最大长度 (字节)
    pub const MAX_FILENAME_LEN: usize = 30;
}
