//! 同步原语封装
//!
//! 基于 embassy-sync 的异步互斥锁，统一使用 CriticalSectionRawMutex。
//! 临界区只在检查和修改锁状态时短暂持有，等锁的一方让出执行权，
//! 持锁期间中断照常响应。

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};

/// 临界区互斥锁 - 异步互斥访问
///
/// # Example
/// ```ignore
/// static SHARED: CriticalMutex<u32> = new_mutex(0);
///
/// {
///     let mut guard = SHARED.lock().await;
///     *guard += 1;
/// } // 自动释放锁
/// ```
pub type CriticalMutex<T> = Mutex<CriticalSectionRawMutex, T>;

/// 创建新的临界区互斥锁
#[inline]
pub const fn new_mutex<T>(value: T) -> CriticalMutex<T> {
    Mutex::new(value)
}
