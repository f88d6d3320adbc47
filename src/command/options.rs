//! 传输权限选项

use bitflags::bitflags;

bitflags! {
    /// 可独立开关的权限位
    ///
    /// 缺少某一位时，对应命令在接触存储之前就被拒绝。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TransferOptions: u8 {
        /// 允许删除单个文件 (`d`)
        const ALLOW_FILE_DELETION = 0b0000_0001;
        /// 允许删除全部文件 (`x`)
        const ALLOW_CLEAR_ALL = 0b0000_0010;
        /// 两者都允许
        const ALLOW_DELETION = Self::ALLOW_FILE_DELETION.bits() | Self::ALLOW_CLEAR_ALL.bits();
        /// 全部禁止
        const DISABLE_DELETION = 0;
    }
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self::ALLOW_DELETION
    }
}

impl TransferOptions {
    pub fn file_deletion_allowed(self) -> bool {
        self.contains(Self::ALLOW_FILE_DELETION)
    }

    pub fn clear_all_allowed(self) -> bool {
        self.contains(Self::ALLOW_CLEAR_ALL)
    }
}
