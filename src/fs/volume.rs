//! 存储能力接口
//!
//! 传输引擎只依赖这里定义的最小文件 API：存在性检查、打开、删除、
//! 根目录枚举，以及句柄上的 seek/read/write/size/flush/close。
//! 每种存储后端实现一次 [`Volume`]，再注入到引擎中。

use core::fmt;

use crate::config::MAX_FILENAME_LEN;

/// 文件名 (扁平命名空间，相对于后端根目录)
pub type FileName = heapless::String<MAX_FILENAME_LEN>;

/// 文件系统错误
///
/// 物理 I/O 错误与逻辑错误 (文件不存在等) 在引擎层会被合并成
/// 同一个传输结果码，这里仅用于日志和后端内部判断。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FsError {
    /// 文件/目录不存在
    NotFound,
    /// 根路径不是目录
    NotADirectory,
    /// 目标是目录而不是文件
    NotAFile,
    /// 文件名非法 (空、过长、包含路径分隔符)
    InvalidName,
    /// 偏移超出文件末尾
    SeekOutOfRange,
    /// 句柄模式不允许该操作
    AccessDenied,
    /// 空间不足
    NoSpace,
    /// 目录已满，无法再创建文件
    TooManyFiles,
    /// 句柄已失效 (文件已被删除)
    InvalidHandle,
    /// 文件大小超出 32 位地址范围
    FileTooLarge,
    /// 底层 I/O 错误
    Io,
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "Not found"),
            Self::NotADirectory => write!(f, "Not a directory"),
            Self::NotAFile => write!(f, "Not a file"),
            Self::InvalidName => write!(f, "Invalid file name"),
            Self::SeekOutOfRange => write!(f, "Seek out of range"),
            Self::AccessDenied => write!(f, "Access denied"),
            Self::NoSpace => write!(f, "No space"),
            Self::TooManyFiles => write!(f, "Too many files"),
            Self::InvalidHandle => write!(f, "Invalid handle"),
            Self::FileTooLarge => write!(f, "File too large"),
            Self::Io => write!(f, "IO error"),
        }
    }
}

/// 文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FileType {
    /// 普通文件
    File,
    /// 目录
    Directory,
}

/// 句柄打开模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessMode {
    /// 只读
    Read,
    /// 追加写 (不存在则创建)
    Write,
}

impl AccessMode {
    /// 是否为写模式
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

/// 目录项元数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// 文件类型
    pub file_type: FileType,
    /// 文件大小 (目录为 0)
    pub size: u32,
    /// 最后写入时间 (Unix 秒)，后端不支持时为 0
    pub modified: u64,
    /// 文件名
    pub name: FileName,
}

impl Metadata {
    /// 是否为文件
    pub fn is_file(&self) -> bool {
        matches!(self.file_type, FileType::File)
    }

    /// 是否为目录
    pub fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }
}

/// 校验并复制主机传来的文件名
///
/// 管理的是单层扁平目录：拒绝空名、`.`/`..`、路径分隔符和超长名称。
pub fn file_name(name: &str) -> Result<FileName, FsError> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(FsError::InvalidName);
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(FsError::InvalidName);
    }
    FileName::try_from(name).map_err(|_| FsError::InvalidName)
}

/// 存储后端能力接口
///
/// 句柄 (`File`) 与目录游标 (`Dir`) 都是后端拥有的值类型，
/// 引擎持有它们但所有操作都通过后端完成；后端自身不保留句柄。
pub trait Volume {
    /// 打开的文件句柄
    type File;
    /// 根目录枚举游标
    type Dir;

    /// 文件是否存在
    fn exists(&mut self, name: &str) -> bool;

    /// 打开文件
    ///
    /// 写模式下文件不存在时创建；`truncate` 为真时从零长度开始。
    fn open(&mut self, name: &str, mode: AccessMode, truncate: bool) -> Result<Self::File, FsError>;

    /// 删除文件
    fn remove(&mut self, name: &str) -> Result<(), FsError>;

    /// 打开根目录进行枚举
    ///
    /// 根目录不存在返回 `NotFound`，不是目录返回 `NotADirectory`。
    fn open_root(&mut self) -> Result<Self::Dir, FsError>;

    /// 读取下一个目录项，枚举结束返回 `None`
    ///
    /// 单个目录项读取失败返回 `Some(Err(_))`，游标仍然前进。
    fn next_entry(&mut self, dir: &mut Self::Dir) -> Option<Result<Metadata, FsError>>;

    /// 关闭目录游标
    fn close_dir(&mut self, dir: Self::Dir) {
        drop(dir);
    }

    /// 把读写位置移动到 `offset`，超出文件末尾时失败
    fn seek(&mut self, file: &mut Self::File, offset: u32) -> Result<(), FsError>;

    /// 从当前位置读取
    fn read(&mut self, file: &mut Self::File, buf: &mut [u8]) -> Result<usize, FsError>;

    /// 在当前位置写入 (写模式句柄总是追加)
    fn write(&mut self, file: &mut Self::File, data: &[u8]) -> Result<usize, FsError>;

    /// 句柄当前看到的文件大小
    ///
    /// 超出 `u32` 范围时返回 `FileTooLarge`，不能截断。
    fn size(&mut self, file: &mut Self::File) -> Result<u32, FsError>;

    /// 刷新写缓冲
    fn flush(&mut self, file: &mut Self::File) -> Result<(), FsError>;

    /// 关闭句柄
    fn close(&mut self, file: Self::File);
}

/// 根目录惰性枚举
///
/// 每次 `next` 只推进一个目录项，枚举结束或被丢弃时关闭游标，
/// 整个目录列表从不在内存中物化。
pub struct RootDir<'v, V: Volume> {
    volume: &'v mut V,
    cursor: Option<V::Dir>,
}

impl<'v, V: Volume> RootDir<'v, V> {
    /// 打开根目录
    pub fn open(volume: &'v mut V) -> Result<Self, FsError> {
        let dir = volume.open_root()?;
        Ok(Self {
            volume,
            cursor: Some(dir),
        })
    }

    /// 枚举过程中访问后端 (例如删除刚枚举到的文件)
    pub fn volume(&mut self) -> &mut V {
        self.volume
    }

    fn finish(&mut self) {
        if let Some(dir) = self.cursor.take() {
            self.volume.close_dir(dir);
        }
    }
}

impl<V: Volume> Iterator for RootDir<'_, V> {
    type Item = Result<Metadata, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        let dir = self.cursor.as_mut()?;
        match self.volume.next_entry(dir) {
            Some(entry) => Some(entry),
            None => {
                self.finish();
                None
            }
        }
    }
}

impl<V: Volume> Drop for RootDir<'_, V> {
    fn drop(&mut self) {
        self.finish();
    }
}
