//! 传输结果码
//!
//! 扁平枚举，没有层级。每个读写操作都返回一个结果码，
//! 并且总是交给应答器发送给主机。

use core::fmt;

/// 传输操作结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TransferResult {
    /// 成功
    Ok = 0,
    /// 根路径不存在或不是目录
    BadRoot = 1,
    /// 打开文件失败
    FileOpenFailed = 2,
    /// 定位失败 (偏移超出文件末尾)
    SeekFailed = 3,
    /// 一个或多个文件删除失败
    DeleteFileFailed = 4,
    /// 载荷解码失败
    BadData = 5,
    /// 数据块地址与当前文件大小不符
    BadDataBlockAddress = 6,
    /// 校验和不匹配 (未触及存储)
    BadChecksum = 7,
    /// 文件删除被禁用
    FileDeleteDisabled = 8,
    /// 全部删除被禁用
    DeleteAllDisabled = 9,
    /// 未知命令
    UnknownCommand = 10,
}

impl TransferResult {
    /// 线路上使用的数值编码
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// 是否成功
    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// 由数值编码还原
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Ok,
            1 => Self::BadRoot,
            2 => Self::FileOpenFailed,
            3 => Self::SeekFailed,
            4 => Self::DeleteFileFailed,
            5 => Self::BadData,
            6 => Self::BadDataBlockAddress,
            7 => Self::BadChecksum,
            8 => Self::FileDeleteDisabled,
            9 => Self::DeleteAllDisabled,
            10 => Self::UnknownCommand,
            _ => return None,
        })
    }
}

impl fmt::Display for TransferResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "Ok"),
            Self::BadRoot => write!(f, "Bad root"),
            Self::FileOpenFailed => write!(f, "File open failed"),
            Self::SeekFailed => write!(f, "Seek failed"),
            Self::DeleteFileFailed => write!(f, "Delete file failed"),
            Self::BadData => write!(f, "Bad data"),
            Self::BadDataBlockAddress => write!(f, "Bad data block address"),
            Self::BadChecksum => write!(f, "Bad checksum"),
            Self::FileDeleteDisabled => write!(f, "File deletion disabled"),
            Self::DeleteAllDisabled => write!(f, "Delete all disabled"),
            Self::UnknownCommand => write!(f, "Unknown command"),
        }
    }
}
