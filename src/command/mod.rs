//! 命令层
//!
//! - `options`: 删除权限位
//! - `params`: 参数游标
//! - `dispatcher`: 操作码解析与路由

pub mod dispatcher;
pub mod options;
pub mod params;

pub use dispatcher::{Dispatcher, DispatcherConfig, Opcode};
pub use options::TransferOptions;
pub use params::Params;
