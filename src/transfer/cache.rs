//! 单槽缓存文件句柄
//!
//! 连续操作同一文件时复用已打开的句柄，省去重复打开的开销，
//! 同时保证任意时刻最多只有一个存储句柄处于打开状态：
//! - 路径或模式改变时先关闭旧句柄再打开新句柄
//! - 写模式的全新创建总是先关闭旧句柄 (即使路径相同)
//! - 空闲超过超时时间后由 `tick` 关闭
//! - 主机声明传输结束时按路径关闭

use embassy_time::{Duration, Instant};

use crate::fs::{file_name, AccessMode, FileName, FsError, Volume};
use crate::log_debug;

/// 已打开的句柄及其绑定信息
struct Slot<F> {
    file: F,
    name: FileName,
    mode: AccessMode,
    last_used: Instant,
}

/// 单槽缓存句柄
pub struct CachedFile<V: Volume> {
    slot: Option<Slot<V::File>>,
    timeout: Duration,
}

impl<V: Volume> CachedFile<V> {
    /// 创建空缓存
    pub const fn new(timeout: Duration) -> Self {
        Self { slot: None, timeout }
    }

    /// 空闲超时时间
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 修改空闲超时时间
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// 是否持有打开的句柄
    pub fn is_open(&self) -> bool {
        self.slot.is_some()
    }

    /// 当前绑定的路径和模式
    pub fn binding(&self) -> Option<(&str, AccessMode)> {
        self.slot.as_ref().map(|s| (s.name.as_str(), s.mode))
    }

    /// 获取绑定到 `name`/`mode` 的句柄
    ///
    /// 命中时重置空闲计时并直接返回；否则关闭旧句柄后重新打开。
    /// 打开失败时缓存保持为空。
    pub fn acquire<'a>(
        &'a mut self,
        volume: &mut V,
        name: &str,
        mode: AccessMode,
        create_fresh: bool,
        now: Instant,
    ) -> Result<&'a mut V::File, FsError> {
        let fresh = mode.is_write() && create_fresh;
        let hit = !fresh
            && self
                .slot
                .as_ref()
                .is_some_and(|s| s.name.as_str() == name && s.mode == mode);

        if !hit {
            let bound = file_name(name)?;
            self.close(volume);
            let file = volume.open(name, mode, fresh)?;
            self.slot = Some(Slot {
                file,
                name: bound,
                mode,
                last_used: now,
            });
        }

        let slot = self.slot.as_mut().ok_or(FsError::InvalidHandle)?;
        slot.last_used = now;
        Ok(&mut slot.file)
    }

    /// 空闲超时检查，关闭了句柄时返回 true
    ///
    /// 没有打开的句柄时什么也不做，可以重复调用。
    pub fn tick(&mut self, volume: &mut V, now: Instant) -> bool {
        let expired = self
            .slot
            .as_ref()
            .is_some_and(|s| now.saturating_duration_since(s.last_used) > self.timeout);
        if expired {
            log_debug!("closing idle cached file");
            self.close(volume);
        }
        expired
    }

    /// 仅当句柄绑定到 `name` 时关闭 (不区分读写模式)
    pub fn close_if_matches(&mut self, volume: &mut V, name: &str) -> bool {
        let matches = self.slot.as_ref().is_some_and(|s| s.name.as_str() == name);
        if matches {
            self.close(volume);
        }
        matches
    }

    /// 关闭句柄，没有打开的句柄时返回 false
    pub fn close(&mut self, volume: &mut V) -> bool {
        match self.slot.take() {
            Some(slot) => {
                volume.close(slot.file);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::RamVolume;

    type Vol = RamVolume<4, 64>;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn seed(vol: &mut Vol, name: &str) {
        let mut f = vol.open(name, AccessMode::Write, true).unwrap();
        vol.write(&mut f, b"data").unwrap();
        vol.close(f);
    }

    #[test]
    fn test_hit_reuses_handle() {
        let mut vol = Vol::new();
        seed(&mut vol, "a");
        let mut cache = CachedFile::<Vol>::new(Duration::from_millis(3000));

        cache.acquire(&mut vol, "a", AccessMode::Read, false, at(0)).unwrap();
        cache.acquire(&mut vol, "a", AccessMode::Read, false, at(10)).unwrap();
        assert_eq!(vol.open_files(), 1);
        assert_eq!(vol.peak_open_files(), 1);
        assert_eq!(cache.binding(), Some(("a", AccessMode::Read)));
    }

    #[test]
    fn test_mode_or_path_change_closes_first() {
        let mut vol = Vol::new();
        seed(&mut vol, "a");
        seed(&mut vol, "b");
        let mut cache = CachedFile::<Vol>::new(Duration::from_millis(3000));

        cache.acquire(&mut vol, "a", AccessMode::Read, false, at(0)).unwrap();
        cache.acquire(&mut vol, "a", AccessMode::Write, false, at(1)).unwrap();
        cache.acquire(&mut vol, "b", AccessMode::Write, false, at(2)).unwrap();
        assert_eq!(vol.open_files(), 1);
        assert_eq!(vol.peak_open_files(), 1);
        assert_eq!(cache.binding(), Some(("b", AccessMode::Write)));
    }

    #[test]
    fn test_fresh_create_always_reopens() {
        let mut vol = Vol::new();
        seed(&mut vol, "a");
        let mut cache = CachedFile::<Vol>::new(Duration::from_millis(3000));

        cache.acquire(&mut vol, "a", AccessMode::Write, false, at(0)).unwrap();
        let file = cache.acquire(&mut vol, "a", AccessMode::Write, true, at(1)).unwrap();
        assert_eq!(vol.size(file), Ok(0));
        assert_eq!(vol.open_files(), 1);
    }

    #[test]
    fn test_open_failure_leaves_cache_empty() {
        let mut vol = Vol::new();
        seed(&mut vol, "a");
        let mut cache = CachedFile::<Vol>::new(Duration::from_millis(3000));

        cache.acquire(&mut vol, "a", AccessMode::Read, false, at(0)).unwrap();
        let err = cache.acquire(&mut vol, "missing", AccessMode::Read, false, at(1));
        assert_eq!(err.err(), Some(FsError::NotFound));
        assert!(!cache.is_open());
        assert_eq!(vol.open_files(), 0);
    }

    #[test]
    fn test_idle_eviction() {
        let mut vol = Vol::new();
        seed(&mut vol, "a");
        let mut cache = CachedFile::<Vol>::new(Duration::from_millis(3000));

        cache.acquire(&mut vol, "a", AccessMode::Read, false, at(1000)).unwrap();
        assert!(!cache.tick(&mut vol, at(4000)));
        // 使用会重置计时
        cache.acquire(&mut vol, "a", AccessMode::Read, false, at(4000)).unwrap();
        assert!(!cache.tick(&mut vol, at(6000)));
        assert!(cache.tick(&mut vol, at(7001)));
        assert_eq!(vol.open_files(), 0);
        // 幂等
        assert!(!cache.tick(&mut vol, at(99_000)));
    }

    #[test]
    fn test_close_if_matches_ignores_mode() {
        let mut vol = Vol::new();
        seed(&mut vol, "a");
        let mut cache = CachedFile::<Vol>::new(Duration::from_millis(3000));

        cache.acquire(&mut vol, "a", AccessMode::Write, false, at(0)).unwrap();
        assert!(!cache.close_if_matches(&mut vol, "b"));
        assert!(cache.is_open());
        assert!(cache.close_if_matches(&mut vol, "a"));
        assert!(!cache.is_open());
        assert_eq!(vol.open_files(), 0);
    }
}
