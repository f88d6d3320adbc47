//! 主机目录卷
//!
//! 把主机文件系统上的一个目录作为扁平根目录暴露，供主机演示程序和
//! 集成测试使用。文件名在拼接根路径前先做校验，不允许越出根目录。

use std::fs::{self, File, OpenOptions, ReadDir};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use super::volume::{file_name, AccessMode, FileType, FsError, Metadata, Volume};

impl From<io::Error> for FsError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::AccessDenied,
            _ => Self::Io,
        }
    }
}

/// 主机目录卷
#[derive(Debug, Clone)]
pub struct HostVolume {
    root: PathBuf,
}

impl HostVolume {
    /// 以 `root` 为根目录创建卷 (不检查目录是否存在)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, name: &str) -> Result<PathBuf, FsError> {
        let name = file_name(name)?;
        Ok(self.root.join(name.as_str()))
    }
}

impl Volume for HostVolume {
    type File = File;
    type Dir = ReadDir;

    fn exists(&mut self, name: &str) -> bool {
        self.full_path(name).is_ok_and(|p| p.exists())
    }

    fn open(&mut self, name: &str, mode: AccessMode, truncate: bool) -> Result<File, FsError> {
        let path = self.full_path(name)?;
        let file = match mode {
            AccessMode::Read => File::open(&path)?,
            // append 与 truncate 不能同时使用；截断打开后游标在 0，同样是追加
            AccessMode::Write if truncate => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)?,
            AccessMode::Write => OpenOptions::new().append(true).create(true).open(&path)?,
        };
        if file.metadata()?.is_dir() {
            return Err(FsError::NotAFile);
        }
        Ok(file)
    }

    fn remove(&mut self, name: &str) -> Result<(), FsError> {
        let path = self.full_path(name)?;
        fs::remove_file(path)?;
        Ok(())
    }

    fn open_root(&mut self) -> Result<ReadDir, FsError> {
        if !fs::metadata(&self.root)?.is_dir() {
            return Err(FsError::NotADirectory);
        }
        Ok(fs::read_dir(&self.root)?)
    }

    fn next_entry(&mut self, dir: &mut ReadDir) -> Option<Result<Metadata, FsError>> {
        let entry = match dir.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e.into())),
        };
        Some(describe(&entry))
    }

    fn seek(&mut self, file: &mut File, offset: u32) -> Result<(), FsError> {
        if u64::from(offset) > file.metadata()?.len() {
            return Err(FsError::SeekOutOfRange);
        }
        file.seek(SeekFrom::Start(u64::from(offset)))?;
        Ok(())
    }

    fn read(&mut self, file: &mut File, buf: &mut [u8]) -> Result<usize, FsError> {
        Ok(file.read(buf)?)
    }

    fn write(&mut self, file: &mut File, data: &[u8]) -> Result<usize, FsError> {
        file.write_all(data)?;
        Ok(data.len())
    }

    fn size(&mut self, file: &mut File) -> Result<u32, FsError> {
        to_u32(file.metadata()?.len())
    }

    fn flush(&mut self, file: &mut File) -> Result<(), FsError> {
        file.flush()?;
        Ok(())
    }

    fn close(&mut self, file: File) {
        drop(file);
    }
}

fn to_u32(len: u64) -> Result<u32, FsError> {
    u32::try_from(len).map_err(|_| FsError::FileTooLarge)
}

fn describe(entry: &fs::DirEntry) -> Result<Metadata, FsError> {
    let meta = entry.metadata()?;
    let name = entry.file_name();
    let name = name.to_str().ok_or(FsError::InvalidName)?;
    let modified = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs());

    Ok(Metadata {
        file_type: if meta.is_dir() { FileType::Directory } else { FileType::File },
        size: if meta.is_dir() { 0 } else { to_u32(meta.len())? },
        modified,
        name: file_name(name)?,
    })
}
