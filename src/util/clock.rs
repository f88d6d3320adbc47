//! 单调时钟抽象
//!
//! 空闲淘汰只需要比较两个时间点，时钟通过 trait 注入，
//! 固件使用 embassy-time 的系统时钟，测试使用可手动推进的假时钟。

use embassy_time::Instant;

/// 单调时钟
pub trait Clock {
    /// 当前时间
    fn now(&self) -> Instant;
}

/// embassy-time 系统时钟
///
/// 需要链接一个 embassy-time 驱动 (固件由 HAL 提供，主机使用 `std` feature)。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> Instant {
        (**self).now()
    }
}
