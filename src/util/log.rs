//! 条件编译日志系统
//!
//! 根据 feature 选择不同的日志后端:
//! - `log-defmt`: 使用 defmt (高效二进制日志)
//! - `log-facade`: 使用 `log` 门面 (主机上配合 env_logger)
//! - 默认: 完全禁用日志 (零开销)
//!
//! 格式串只使用 `{}` 占位符，两种后端都能接受。

// ===================================================================
// defmt 后端 (feature = "log-defmt")
// ===================================================================
#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { ::defmt::info!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { ::defmt::warn!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { ::defmt::error!($($arg)*) };
}

#[cfg(feature = "log-defmt")]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => { ::defmt::trace!($($arg)*) };
}

// ===================================================================
// log 门面后端 (feature = "log-facade")
// ===================================================================
#[cfg(all(feature = "log-facade", not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { ::log::info!(target: "rustfm", $($arg)*) };
}

#[cfg(all(feature = "log-facade", not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { ::log::debug!(target: "rustfm", $($arg)*) };
}

#[cfg(all(feature = "log-facade", not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { ::log::warn!(target: "rustfm", $($arg)*) };
}

#[cfg(all(feature = "log-facade", not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { ::log::error!(target: "rustfm", $($arg)*) };
}

#[cfg(all(feature = "log-facade", not(feature = "log-defmt")))]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => { ::log::trace!(target: "rustfm", $($arg)*) };
}

// ===================================================================
// 空实现 (无日志 feature)
// ===================================================================
// 参数仍经过 format_args! 类型检查，避免只在日志里用到的变量产生告警
#[cfg(not(any(feature = "log-defmt", feature = "log-facade")))]
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

#[cfg(not(any(feature = "log-defmt", feature = "log-facade")))]
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

#[cfg(not(any(feature = "log-defmt", feature = "log-facade")))]
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

#[cfg(not(any(feature = "log-defmt", feature = "log-facade")))]
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

#[cfg(not(any(feature = "log-defmt", feature = "log-facade")))]
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}
