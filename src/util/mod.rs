//! 工具模块
//!
//! - `log`: 条件编译日志宏
//! - `clock`: 单调时钟抽象 (空闲超时判定)
//! - `text`: 参考文本应答器

pub mod clock;
pub mod log;
pub mod text;

pub use clock::{Clock, SystemClock};
pub use text::TextResponder;
