//! 传输引擎
//!
//! 实现列表、读取、写入、删除、全部删除和传输结束六个操作。
//! 引擎独占存储卷和单槽缓存句柄，是系统中唯一会修改缓存的组件。
//!
//! # 写入的续传规则
//! - 地址 0 表示 (重新) 开始：先关闭缓存句柄，删除已有文件，再全新创建
//! - 其它地址必须与文件当前大小完全相等，否则拒绝 (防止重复块和乱序块)
//! - 每个块写入后都 flush，保证下一个块读到的大小是真实的存储大小

use embassy_time::Duration;

use crate::config::CACHE_TIMEOUT_MS;
use crate::fs::{AccessMode, FsError, RootDir, Volume};
use crate::util::Clock;
use crate::{log_debug, log_warn};

use super::cache::CachedFile;
use super::codec::WireCodec;
use super::responder::{ByteSource, Responder};
use super::result::TransferResult;

/// 把缓存句柄包装成应答器可读取的字节源
struct FileSource<'a, V: Volume> {
    volume: &'a mut V,
    file: &'a mut V::File,
}

impl<V: Volume> ByteSource for FileSource<'_, V> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        self.volume.read(self.file, buf)
    }
}

/// 传输引擎
pub struct TransferEngine<V: Volume, C: Clock> {
    volume: V,
    cache: CachedFile<V>,
    clock: C,
}

impl<V: Volume, C: Clock> TransferEngine<V, C> {
    /// 使用默认空闲超时创建
    pub fn new(volume: V, clock: C) -> Self {
        Self::with_timeout(volume, clock, Duration::from_millis(CACHE_TIMEOUT_MS))
    }

    /// 指定缓存句柄空闲超时
    pub fn with_timeout(volume: V, clock: C, timeout: Duration) -> Self {
        Self {
            volume,
            cache: CachedFile::new(timeout),
            clock,
        }
    }

    /// 存储卷
    pub fn volume(&self) -> &V {
        &self.volume
    }

    /// 可变访问存储卷
    ///
    /// 缓存句柄可能仍然打开，调用方不应借此删除当前绑定的文件。
    pub fn volume_mut(&mut self) -> &mut V {
        &mut self.volume
    }

    /// 缓存句柄状态
    pub fn cache(&self) -> &CachedFile<V> {
        &self.cache
    }

    /// 修改缓存句柄空闲超时
    pub fn set_cache_timeout(&mut self, timeout: Duration) {
        self.cache.set_timeout(timeout);
    }

    /// 关闭缓存句柄并取回存储卷
    pub fn into_volume(mut self) -> V {
        self.cache.close(&mut self.volume);
        self.volume
    }

    /// 列出根目录中的普通文件
    ///
    /// 逐项枚举并立即交给应答器，子目录和读取失败的目录项被跳过。
    pub fn list_files<R: Responder + ?Sized>(&mut self, responder: &mut R) -> TransferResult {
        let root = match RootDir::open(&mut self.volume) {
            Ok(root) => root,
            Err(e) => {
                log_warn!("bad root: {}", e);
                return TransferResult::BadRoot;
            }
        };

        for entry in root {
            match entry {
                Ok(meta) if meta.is_file() => {
                    responder.send_file_info(&meta.name, meta.size, meta.modified);
                }
                Ok(_) => {}
                Err(e) => log_debug!("skipping unreadable entry: {}", e),
            }
        }
        TransferResult::Ok
    }

    /// 从 `first_byte` 开始发送最多 `block_size` 字节
    ///
    /// `block_size` 应为 3 的倍数，使块边界与 Base64 分组对齐；这里不做检查。
    pub fn send_file_content<R: Responder + ?Sized>(
        &mut self,
        path: &str,
        first_byte: u32,
        block_size: u32,
        responder: &mut R,
    ) -> TransferResult {
        let now = self.clock.now();
        let file = match self.cache.acquire(&mut self.volume, path, AccessMode::Read, false, now) {
            Ok(file) => file,
            Err(e) => {
                log_debug!("open {} for read failed: {}", path, e);
                responder.send_file_error(path, first_byte, TransferResult::FileOpenFailed);
                return TransferResult::FileOpenFailed;
            }
        };

        if let Err(e) = self.volume.seek(file, first_byte) {
            log_debug!("seek {} to {} failed: {}", path, first_byte, e);
            responder.send_file_error(path, first_byte, TransferResult::SeekFailed);
            return TransferResult::SeekFailed;
        }

        let mut source = FileSource {
            volume: &mut self.volume,
            file,
        };
        responder.send_file_bytes(path, first_byte, &mut source, block_size);
        TransferResult::Ok
    }

    /// 写入一个数据块
    pub fn receive_file_content<K, R>(
        &mut self,
        path: &str,
        first_byte: u32,
        payload: &str,
        codec: &K,
        responder: &mut R,
    ) -> TransferResult
    where
        K: WireCodec + ?Sized,
        R: Responder + ?Sized,
    {
        let restart = first_byte == 0;
        if restart {
            self.cache.close(&mut self.volume);
            if self.volume.exists(path) {
                if let Err(e) = self.volume.remove(path) {
                    log_warn!("removing {} before restart failed: {}", path, e);
                }
            }
        }

        let now = self.clock.now();
        let file = match self.cache.acquire(&mut self.volume, path, AccessMode::Write, restart, now) {
            Ok(file) => file,
            Err(e) => {
                log_debug!("open {} for write failed: {}", path, e);
                responder.file_receive_result(path, first_byte, 0, TransferResult::FileOpenFailed);
                return TransferResult::FileOpenFailed;
            }
        };

        let size = match self.volume.size(file) {
            Ok(size) => size,
            Err(e) => {
                log_warn!("size of {} unavailable: {}", path, e);
                // 超过 32 位的文件不可能与任何地址相符
                let result = match e {
                    FsError::FileTooLarge => TransferResult::BadDataBlockAddress,
                    _ => TransferResult::FileOpenFailed,
                };
                responder.file_receive_result(path, first_byte, 0, result);
                return result;
            }
        };
        if size != first_byte {
            log_warn!("bad block address for {}: expected {}, got {}", path, size, first_byte);
            responder.file_receive_result(path, first_byte, 0, TransferResult::BadDataBlockAddress);
            return TransferResult::BadDataBlockAddress;
        }

        let volume = &mut self.volume;
        let decoded = codec.decode(payload, |bytes| volume.write(file, bytes));
        if let Err(e) = self.volume.flush(file) {
            log_warn!("flush {} failed: {}", path, e);
        }

        let result = if decoded.complete {
            TransferResult::Ok
        } else {
            TransferResult::BadData
        };
        responder.file_receive_result(path, first_byte, decoded.written, result);
        result
    }

    /// 删除单个文件
    ///
    /// 缓存句柄绑定到该文件时先关闭。
    pub fn delete_file(&mut self, path: &str) -> TransferResult {
        self.cache.close_if_matches(&mut self.volume, path);
        match self.volume.remove(path) {
            Ok(()) => TransferResult::Ok,
            Err(e) => {
                log_debug!("delete {} failed: {}", path, e);
                TransferResult::DeleteFileFailed
            }
        }
    }

    /// 删除根目录中的全部普通文件
    ///
    /// 单个文件删除失败不会中断，继续删除其余文件；
    /// 只要有一个失败 (包括读取失败、因此无法删除的目录项)，
    /// 整体结果就是 `DeleteFileFailed`。
    pub fn clear_all_files(&mut self) -> TransferResult {
        self.cache.close(&mut self.volume);

        let mut root = match RootDir::open(&mut self.volume) {
            Ok(root) => root,
            Err(e) => {
                log_warn!("bad root: {}", e);
                return TransferResult::BadRoot;
            }
        };

        let mut result = TransferResult::Ok;
        while let Some(entry) = root.next() {
            let meta = match entry {
                Ok(meta) if meta.is_file() => meta,
                Ok(_) => continue,
                Err(e) => {
                    // 无法读取的目录项也就无法删除，不能报告成功
                    log_warn!("unreadable entry left in place: {}", e);
                    result = TransferResult::DeleteFileFailed;
                    continue;
                }
            };
            if let Err(e) = root.volume().remove(&meta.name) {
                log_warn!("delete {} failed: {}", meta.name.as_str(), e);
                result = TransferResult::DeleteFileFailed;
            }
        }
        result
    }

    /// 主机声明传输结束
    ///
    /// 仅当缓存句柄绑定到 `path` 时关闭 (不区分读写模式)。
    pub fn transfer_complete(&mut self, path: &str) -> bool {
        self.cache.close_if_matches(&mut self.volume, path)
    }

    /// 空闲淘汰检查，需由调度循环周期调用
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        self.cache.tick(&mut self.volume, now)
    }
}
