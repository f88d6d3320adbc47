//! RAM 扁平卷
//!
//! 基于 heapless 的定长内存存储，无需堆分配：
//! - `FILES`: 最多容纳的目录项数
//! - `CAP`: 单个文件的最大字节数
//!
//! 不支持最后写入时间 (总是报告 0)。句柄携带代数 (generation)，
//! 文件被删除后旧句柄上的操作返回 `InvalidHandle`。

use heapless::Vec;

use super::volume::{file_name, AccessMode, FileName, FileType, FsError, Metadata, Volume};

/// RAM 卷中的目录项
struct RamEntry<const CAP: usize> {
    name: FileName,
    file_type: FileType,
    data: Vec<u8, CAP>,
}

/// RAM 卷文件句柄
#[derive(Debug)]
pub struct RamFile {
    slot: usize,
    generation: u32,
    mode: AccessMode,
    position: u32,
}

/// RAM 卷目录游标
#[derive(Debug)]
pub struct RamDir {
    index: usize,
}

/// 定长 RAM 卷
pub struct RamVolume<const FILES: usize, const CAP: usize> {
    entries: [Option<RamEntry<CAP>>; FILES],
    generations: [u32; FILES],
    open_files: usize,
    peak_open_files: usize,
}

impl<const FILES: usize, const CAP: usize> RamVolume<FILES, CAP> {
    /// 创建空卷
    pub fn new() -> Self {
        Self {
            entries: core::array::from_fn(|_| None),
            generations: [0; FILES],
            open_files: 0,
            peak_open_files: 0,
        }
    }

    /// 当前打开的句柄数
    pub fn open_files(&self) -> usize {
        self.open_files
    }

    /// 历史最大同时打开句柄数
    pub fn peak_open_files(&self) -> usize {
        self.peak_open_files
    }

    /// 普通文件数量
    pub fn file_count(&self) -> usize {
        self.entries
            .iter()
            .flatten()
            .filter(|e| e.file_type == FileType::File)
            .count()
    }

    /// 读取整个文件内容 (诊断用)
    pub fn contents(&self, name: &str) -> Option<&[u8]> {
        self.find(name)
            .and_then(|slot| self.entries[slot].as_ref())
            .filter(|e| e.file_type == FileType::File)
            .map(|e| e.data.as_slice())
    }

    /// 创建子目录项
    ///
    /// 卷本身是扁平的，子目录只会出现在枚举结果里并被传输层跳过。
    pub fn create_dir(&mut self, name: &str) -> Result<(), FsError> {
        let name = file_name(name)?;
        if self.find(&name).is_some() {
            return Ok(());
        }
        let slot = self.allocate()?;
        self.entries[slot] = Some(RamEntry {
            name,
            file_type: FileType::Directory,
            data: Vec::new(),
        });
        Ok(())
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.as_ref().is_some_and(|e| e.name.as_str() == name))
    }

    fn allocate(&self) -> Result<usize, FsError> {
        self.entries
            .iter()
            .position(Option::is_none)
            .ok_or(FsError::TooManyFiles)
    }

    fn entry(&self, file: &RamFile) -> Result<&RamEntry<CAP>, FsError> {
        if self.generations[file.slot] != file.generation {
            return Err(FsError::InvalidHandle);
        }
        self.entries[file.slot].as_ref().ok_or(FsError::InvalidHandle)
    }

    fn entry_mut(&mut self, file: &RamFile) -> Result<&mut RamEntry<CAP>, FsError> {
        if self.generations[file.slot] != file.generation {
            return Err(FsError::InvalidHandle);
        }
        self.entries[file.slot].as_mut().ok_or(FsError::InvalidHandle)
    }
}

impl<const FILES: usize, const CAP: usize> Default for RamVolume<FILES, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const FILES: usize, const CAP: usize> Volume for RamVolume<FILES, CAP> {
    type File = RamFile;
    type Dir = RamDir;

    fn exists(&mut self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn open(&mut self, name: &str, mode: AccessMode, truncate: bool) -> Result<RamFile, FsError> {
        let name = file_name(name)?;

        let slot = match self.find(&name) {
            Some(slot) => {
                let entry = self.entries[slot].as_mut().ok_or(FsError::NotFound)?;
                if entry.file_type != FileType::File {
                    return Err(FsError::NotAFile);
                }
                if mode.is_write() && truncate {
                    entry.data.clear();
                }
                slot
            }
            None if mode.is_write() => {
                let slot = self.allocate()?;
                self.entries[slot] = Some(RamEntry {
                    name,
                    file_type: FileType::File,
                    data: Vec::new(),
                });
                slot
            }
            None => return Err(FsError::NotFound),
        };

        let position = match mode {
            AccessMode::Read => 0,
            AccessMode::Write => self.entries[slot].as_ref().map_or(0, |e| e.data.len() as u32),
        };

        self.open_files += 1;
        self.peak_open_files = self.peak_open_files.max(self.open_files);

        Ok(RamFile {
            slot,
            generation: self.generations[slot],
            mode,
            position,
        })
    }

    fn remove(&mut self, name: &str) -> Result<(), FsError> {
        let slot = self.find(name).ok_or(FsError::NotFound)?;
        if self.entries[slot].as_ref().is_some_and(|e| e.file_type != FileType::File) {
            return Err(FsError::NotAFile);
        }
        self.entries[slot] = None;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        Ok(())
    }

    fn open_root(&mut self) -> Result<RamDir, FsError> {
        Ok(RamDir { index: 0 })
    }

    fn next_entry(&mut self, dir: &mut RamDir) -> Option<Result<Metadata, FsError>> {
        while dir.index < FILES {
            let index = dir.index;
            dir.index += 1;
            if let Some(entry) = &self.entries[index] {
                return Some(Ok(Metadata {
                    file_type: entry.file_type,
                    size: entry.data.len() as u32,
                    modified: 0,
                    name: entry.name.clone(),
                }));
            }
        }
        None
    }

    fn seek(&mut self, file: &mut RamFile, offset: u32) -> Result<(), FsError> {
        let len = self.entry(file)?.data.len() as u32;
        if offset > len {
            return Err(FsError::SeekOutOfRange);
        }
        file.position = offset;
        Ok(())
    }

    fn read(&mut self, file: &mut RamFile, buf: &mut [u8]) -> Result<usize, FsError> {
        if file.mode != AccessMode::Read {
            return Err(FsError::AccessDenied);
        }
        let data = &self.entry(file)?.data;
        let start = (file.position as usize).min(data.len());
        let count = buf.len().min(data.len() - start);
        buf[..count].copy_from_slice(&data[start..start + count]);
        file.position += count as u32;
        Ok(count)
    }

    fn write(&mut self, file: &mut RamFile, data: &[u8]) -> Result<usize, FsError> {
        if file.mode != AccessMode::Write {
            return Err(FsError::AccessDenied);
        }
        let entry = self.entry_mut(file)?;
        let count = data.len().min(CAP - entry.data.len());
        if count == 0 && !data.is_empty() {
            return Err(FsError::NoSpace);
        }
        entry
            .data
            .extend_from_slice(&data[..count])
            .map_err(|_| FsError::NoSpace)?;
        file.position = entry.data.len() as u32;
        Ok(count)
    }

    fn size(&mut self, file: &mut RamFile) -> Result<u32, FsError> {
        Ok(self.entry(file)?.data.len() as u32)
    }

    fn flush(&mut self, file: &mut RamFile) -> Result<(), FsError> {
        self.entry(file).map(|_| ())
    }

    fn close(&mut self, file: RamFile) {
        let _ = file;
        self.open_files = self.open_files.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Vol = RamVolume<4, 32>;

    #[test]
    fn test_write_then_read() {
        let mut vol = Vol::new();
        let mut f = vol.open("a.txt", AccessMode::Write, true).unwrap();
        assert_eq!(vol.write(&mut f, b"hello").unwrap(), 5);
        assert_eq!(vol.size(&mut f), Ok(5));
        vol.close(f);

        let mut f = vol.open("a.txt", AccessMode::Read, false).unwrap();
        vol.seek(&mut f, 1).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(vol.read(&mut f, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"ello");
        vol.close(f);
        assert_eq!(vol.open_files(), 0);
    }

    #[test]
    fn test_write_mode_appends() {
        let mut vol = Vol::new();
        let mut f = vol.open("a", AccessMode::Write, true).unwrap();
        vol.write(&mut f, b"ab").unwrap();
        vol.close(f);

        let mut f = vol.open("a", AccessMode::Write, false).unwrap();
        vol.write(&mut f, b"cd").unwrap();
        vol.close(f);
        assert_eq!(vol.contents("a"), Some(&b"abcd"[..]));

        let f = vol.open("a", AccessMode::Write, true).unwrap();
        vol.close(f);
        assert_eq!(vol.contents("a"), Some(&b""[..]));
    }

    #[test]
    fn test_read_missing_file() {
        let mut vol = Vol::new();
        assert_eq!(vol.open("nope", AccessMode::Read, false).err(), Some(FsError::NotFound));
        assert!(!vol.exists("nope"));
    }

    #[test]
    fn test_seek_past_end() {
        let mut vol = Vol::new();
        let mut f = vol.open("a", AccessMode::Write, true).unwrap();
        vol.write(&mut f, b"abc").unwrap();
        vol.close(f);

        let mut f = vol.open("a", AccessMode::Read, false).unwrap();
        assert!(vol.seek(&mut f, 3).is_ok());
        assert_eq!(vol.seek(&mut f, 4), Err(FsError::SeekOutOfRange));
        vol.close(f);
    }

    #[test]
    fn test_capacity_limits() {
        let mut vol = RamVolume::<1, 4>::new();
        let mut f = vol.open("a", AccessMode::Write, true).unwrap();
        assert_eq!(vol.write(&mut f, b"abcdef").unwrap(), 4);
        assert_eq!(vol.write(&mut f, b"g"), Err(FsError::NoSpace));
        vol.close(f);
        assert_eq!(vol.open("b", AccessMode::Write, true).err(), Some(FsError::TooManyFiles));
    }

    #[test]
    fn test_removed_file_invalidates_handle() {
        let mut vol = Vol::new();
        let mut f = vol.open("a", AccessMode::Write, true).unwrap();
        vol.remove("a").unwrap();
        assert_eq!(vol.write(&mut f, b"x"), Err(FsError::InvalidHandle));
        assert_eq!(vol.size(&mut f), Ok(0));
        vol.close(f);
    }

    #[test]
    fn test_enumeration_skips_empty_slots() {
        let mut vol = Vol::new();
        for name in ["a", "b", "c"] {
            let f = vol.open(name, AccessMode::Write, true).unwrap();
            vol.close(f);
        }
        vol.remove("b").unwrap();
        vol.create_dir("sub").unwrap();

        let mut dir = vol.open_root().unwrap();
        let mut names = std::vec::Vec::new();
        while let Some(entry) = vol.next_entry(&mut dir) {
            let entry = entry.unwrap();
            names.push((entry.name.to_string(), entry.is_dir()));
        }
        assert_eq!(
            names,
            [("a".to_string(), false), ("sub".to_string(), true), ("c".to_string(), false)]
        );
        assert_eq!(vol.file_count(), 2);
    }
}
