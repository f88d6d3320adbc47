//! 测试替身
//!
//! - `RecordingVolume`: 包装任意卷，记录调用并注入故障
//! - `RecordingResponder`: 记录应答事件
//! - `FakeClock`: 手动推进的单调时钟

use core::cell::Cell;

use embassy_time::Instant;

use crate::fs::{AccessMode, FsError, Metadata, Volume};
use crate::transfer::{ByteSource, Responder, TransferResult};
use crate::util::Clock;

/// 手动推进的时钟 (毫秒)
#[derive(Default)]
pub struct FakeClock {
    ms: Cell<u64>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.ms.set(self.ms.get() + ms);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.ms.get())
    }
}

/// 记录调用并可注入故障的卷
pub struct RecordingVolume<V> {
    pub inner: V,
    pub calls: Vec<String>,
    pub fail_remove: Vec<String>,
    /// 枚举到这些文件时返回错误 (游标照常前进)
    pub fail_entry: Vec<String>,
    pub root_error: Option<FsError>,
    pub open_files: usize,
    pub peak_open_files: usize,
}

impl<V> RecordingVolume<V> {
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            calls: Vec::new(),
            fail_remove: Vec::new(),
            fail_entry: Vec::new(),
            root_error: None,
            open_files: 0,
            peak_open_files: 0,
        }
    }

    /// 会改变存储内容的调用
    pub fn mutating_calls(&self) -> Vec<&str> {
        self.calls
            .iter()
            .map(String::as_str)
            .filter(|c| {
                c.starts_with("remove:") || c.starts_with("write:") || c.starts_with("open-fresh:")
            })
            .collect()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl<V: Volume> Volume for RecordingVolume<V> {
    type File = V::File;
    type Dir = V::Dir;

    fn exists(&mut self, name: &str) -> bool {
        self.calls.push(format!("exists:{name}"));
        self.inner.exists(name)
    }

    fn open(&mut self, name: &str, mode: AccessMode, truncate: bool) -> Result<V::File, FsError> {
        let kind = match (mode, truncate) {
            (AccessMode::Write, true) => "open-fresh",
            (AccessMode::Write, false) => "open-write",
            (AccessMode::Read, _) => "open-read",
        };
        self.calls.push(format!("{kind}:{name}"));
        let file = self.inner.open(name, mode, truncate)?;
        self.open_files += 1;
        self.peak_open_files = self.peak_open_files.max(self.open_files);
        Ok(file)
    }

    fn remove(&mut self, name: &str) -> Result<(), FsError> {
        self.calls.push(format!("remove:{name}"));
        if self.fail_remove.iter().any(|n| n == name) {
            return Err(FsError::Io);
        }
        self.inner.remove(name)
    }

    fn open_root(&mut self) -> Result<V::Dir, FsError> {
        self.calls.push("open-root".to_string());
        if let Some(e) = self.root_error {
            return Err(e);
        }
        self.inner.open_root()
    }

    fn next_entry(&mut self, dir: &mut V::Dir) -> Option<Result<Metadata, FsError>> {
        match self.inner.next_entry(dir)? {
            Ok(meta) if self.fail_entry.iter().any(|n| n == meta.name.as_str()) => Some(Err(FsError::Io)),
            entry => Some(entry),
        }
    }

    fn close_dir(&mut self, dir: V::Dir) {
        self.calls.push("close-root".to_string());
        self.inner.close_dir(dir);
    }

    fn seek(&mut self, file: &mut V::File, offset: u32) -> Result<(), FsError> {
        self.inner.seek(file, offset)
    }

    fn read(&mut self, file: &mut V::File, buf: &mut [u8]) -> Result<usize, FsError> {
        self.inner.read(file, buf)
    }

    fn write(&mut self, file: &mut V::File, data: &[u8]) -> Result<usize, FsError> {
        self.calls.push(format!("write:{}", data.len()));
        self.inner.write(file, data)
    }

    fn size(&mut self, file: &mut V::File) -> Result<u32, FsError> {
        self.inner.size(file)
    }

    fn flush(&mut self, file: &mut V::File) -> Result<(), FsError> {
        self.calls.push("flush".to_string());
        self.inner.flush(file)
    }

    fn close(&mut self, file: V::File) {
        self.calls.push("close".to_string());
        self.open_files -= 1;
        self.inner.close(file);
    }
}

/// 应答事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    FileInfo { name: String, size: u32, modified: u64 },
    FileBytes { path: String, first_byte: u32, bytes: Vec<u8> },
    FileError { path: String, first_byte: u32, result: TransferResult },
    Received { path: String, first_byte: u32, written: u32, result: TransferResult },
    Deleted { path: String, result: TransferResult },
    AllDeleted { request_id: u32, result: TransferResult },
    Error { result: TransferResult, opcode: char, path: Option<String>, context: u32 },
    Listed,
    Closed { path: String, closed: bool },
}

/// 记录全部应答事件
#[derive(Default)]
pub struct RecordingResponder {
    pub events: Vec<Event>,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<Event> {
        core::mem::take(&mut self.events)
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }
}

impl Responder for RecordingResponder {
    fn send_file_info(&mut self, name: &str, size: u32, modified: u64) {
        self.events.push(Event::FileInfo { name: name.to_string(), size, modified });
    }

    fn send_file_bytes(
        &mut self,
        path: &str,
        first_byte: u32,
        source: &mut dyn ByteSource,
        block_size: u32,
    ) {
        let mut bytes = Vec::new();
        let mut buf = [0u8; 7];
        while bytes.len() < block_size as usize {
            let want = buf.len().min(block_size as usize - bytes.len());
            match source.read(&mut buf[..want]) {
                Ok(0) | Err(_) => break,
                Ok(n) => bytes.extend_from_slice(&buf[..n]),
            }
        }
        self.events.push(Event::FileBytes { path: path.to_string(), first_byte, bytes });
    }

    fn send_file_error(&mut self, path: &str, first_byte: u32, result: TransferResult) {
        self.events.push(Event::FileError { path: path.to_string(), first_byte, result });
    }

    fn file_receive_result(&mut self, path: &str, first_byte: u32, written: u32, result: TransferResult) {
        self.events.push(Event::Received { path: path.to_string(), first_byte, written, result });
    }

    fn file_delete_result(&mut self, path: &str, result: TransferResult) {
        self.events.push(Event::Deleted { path: path.to_string(), result });
    }

    fn all_files_deleted(&mut self, request_id: u32, result: TransferResult) {
        self.events.push(Event::AllDeleted { request_id, result });
    }

    fn send_error(&mut self, result: TransferResult, opcode: char, path: Option<&str>, context: u32) {
        self.events.push(Event::Error {
            result,
            opcode,
            path: path.map(str::to_string),
            context,
        });
    }

    fn files_listed(&mut self) {
        self.events.push(Event::Listed);
    }

    fn transfer_closed(&mut self, path: &str, closed: bool) {
        self.events.push(Event::Closed { path: path.to_string(), closed });
    }
}

/// Base64 编码 (测试构造载荷用)
pub fn b64(data: &[u8]) -> String {
    use base64::Engine as _;
    base64::engine::general_purpose::STANDARD.encode(data)
}
