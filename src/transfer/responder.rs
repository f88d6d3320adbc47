//! 应答器接口
//!
//! 应答器是面向传输层的输出端：把文件列表、文件字节块和结果码
//! 渲染到线路上。核心只调用这里的方法，不关心线路格式。

use crate::fs::FsError;

use super::result::TransferResult;

/// 可流式读取的字节源
///
/// 发送文件内容时，应答器从这里按需读取，不需要整块缓冲。
pub trait ByteSource {
    /// 读取到 `buf`，返回 0 表示到达文件末尾
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError>;
}

/// 传输应答器
pub trait Responder {
    /// 列表中的一个普通文件
    fn send_file_info(&mut self, name: &str, size: u32, modified: u64);

    /// 从 `first_byte` 开始最多发送 `block_size` 字节
    fn send_file_bytes(
        &mut self,
        path: &str,
        first_byte: u32,
        source: &mut dyn ByteSource,
        block_size: u32,
    );

    /// 读取失败，不带字节
    fn send_file_error(&mut self, path: &str, first_byte: u32, result: TransferResult);

    /// 写入一个数据块的结果
    fn file_receive_result(
        &mut self,
        path: &str,
        first_byte: u32,
        bytes_written: u32,
        result: TransferResult,
    );

    /// 删除单个文件的结果
    fn file_delete_result(&mut self, path: &str, result: TransferResult);

    /// 删除全部文件的结果，原样回显请求 ID
    fn all_files_deleted(&mut self, request_id: u32, result: TransferResult);

    /// 通用错误 (列表失败、未知命令)
    fn send_error(&mut self, result: TransferResult, opcode: char, path: Option<&str>, context: u32);

    /// 列表成功结束
    ///
    /// 默认不发送任何内容：文件信息流本身就是应答。
    fn files_listed(&mut self) {}

    /// 主机声明传输结束，`closed` 表示是否释放了缓存句柄
    ///
    /// 默认不发送任何内容。
    fn transfer_closed(&mut self, path: &str, closed: bool) {
        let _ = (path, closed);
    }
}
