//! 同步模块
//!
//! 基于 embassy-sync 的异步互斥锁封装:
//! - `CriticalMutex`: 临界区保护的异步互斥锁
//! - `SharedDispatcher`: 多上下文共享的串行化调度器

pub mod primitives;
pub mod shared;

pub use primitives::{new_mutex, CriticalMutex};
pub use shared::SharedDispatcher;
