//! 参考文本应答器
//!
//! 把应答渲染成以 `FM ` 开头的文本行，写入任意 `core::fmt::Write`。
//! 与命令一样，路径总是行内最后一个字段 (路径中可以包含空格)。
//!
//! ```text
//! FM ? <大小> <修改时间> <文件名>
//! FM ?.                                   列表结束
//! FM < <首字节> <base64 或 -> <字节数> <路径>
//! FM <! <首字节> <结果码> <路径>
//! FM > <首字节> <写入字节数> <结果码> <路径>
//! FM d <结果码> <路径>
//! FM x <请求ID> <结果码>
//! FM ! <结果码> <操作码> <上下文> <路径 或 ->
//! FM . <是否关闭 0/1> <路径>
//! ```

use core::fmt::Write;

use crate::log_debug;
use crate::transfer::{Base64Codec, ByteSource, Responder, TransferResult};

/// 每次编码的原始字节数 (3 的倍数)
const ENCODE_CHUNK: usize = 48;

/// 文本行应答器
pub struct TextResponder<W: Write> {
    out: W,
}

impl<W: Write> TextResponder<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// 读满 `buf` 或直到文件末尾
fn fill(source: &mut dyn ByteSource, buf: &mut [u8]) -> usize {
    let mut len = 0;
    while len < buf.len() {
        match source.read(&mut buf[len..]) {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(e) => {
                log_debug!("read failed after {} bytes: {}", len, e);
                break;
            }
        }
    }
    len
}

impl<W: Write> Responder for TextResponder<W> {
    fn send_file_info(&mut self, name: &str, size: u32, modified: u64) {
        let _ = writeln!(self.out, "FM ? {} {} {}", size, modified, name);
    }

    fn send_file_bytes(&mut self, path: &str, first_byte: u32, source: &mut dyn ByteSource, block_size: u32) {
        let _ = write!(self.out, "FM < {} ", first_byte);

        let mut raw = [0u8; ENCODE_CHUNK];
        let mut text = [0u8; ENCODE_CHUNK / 3 * 4];
        let mut remaining = block_size as usize;
        let mut total = 0u32;

        // 只有最后一段可能不是 3 的倍数，填充不会出现在中间
        while remaining > 0 {
            let want = raw.len().min(remaining);
            let n = fill(source, &mut raw[..want]);
            if n == 0 {
                break;
            }
            let len = Base64Codec::encode_slice(&raw[..n], &mut text);
            if let Ok(encoded) = core::str::from_utf8(&text[..len]) {
                let _ = self.out.write_str(encoded);
            }
            total += n as u32;
            remaining -= n;
            if n < want {
                break;
            }
        }

        if total == 0 {
            let _ = self.out.write_char('-');
        }
        let _ = writeln!(self.out, " {} {}", total, path);
    }

    fn send_file_error(&mut self, path: &str, first_byte: u32, result: TransferResult) {
        let _ = writeln!(self.out, "FM <! {} {} {}", first_byte, result.code(), path);
    }

    fn file_receive_result(&mut self, path: &str, first_byte: u32, bytes_written: u32, result: TransferResult) {
        let _ = writeln!(self.out, "FM > {} {} {} {}", first_byte, bytes_written, result.code(), path);
    }

    fn file_delete_result(&mut self, path: &str, result: TransferResult) {
        let _ = writeln!(self.out, "FM d {} {}", result.code(), path);
    }

    fn all_files_deleted(&mut self, request_id: u32, result: TransferResult) {
        let _ = writeln!(self.out, "FM x {} {}", request_id, result.code());
    }

    fn send_error(&mut self, result: TransferResult, opcode: char, path: Option<&str>, context: u32) {
        let _ = writeln!(
            self.out,
            "FM ! {} {} {} {}",
            result.code(),
            opcode,
            context,
            path.unwrap_or("-")
        );
    }

    fn files_listed(&mut self) {
        let _ = writeln!(self.out, "FM ?.");
    }

    fn transfer_closed(&mut self, path: &str, closed: bool) {
        let _ = writeln!(self.out, "FM . {} {}", u8::from(closed), path);
    }
}
