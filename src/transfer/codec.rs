//! 线路编解码
//!
//! 载荷在线路上是文本 token，引擎只需要两件事：
//! 计算校验和，以及把 token 流式解码进存储。
//! 默认实现是标准 Base64 (规范填充)，以 4 字符为一组解码，
//! 遇到非法分组时停止，已解码的前序分组照常写入。

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::fs::FsError;

/// 解码暂存区大小 (3 的倍数，每满一次写一次存储)
const DECODE_BUFFER: usize = 48;

/// 一次解码的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// 实际交给 sink 并写入成功的字节数
    pub written: u32,
    /// 整个 token 是否都被解码并写入
    pub complete: bool,
}

/// 线路编解码器
pub trait WireCodec {
    /// 计算载荷 token 的 16 位校验和
    fn checksum(&self, token: &str) -> u16;

    /// 解码 token，把字节分批交给 `sink`
    ///
    /// `sink` 返回实际消费的字节数；短写或出错都会终止解码。
    fn decode<F>(&self, token: &str, sink: F) -> Decoded
    where
        F: FnMut(&[u8]) -> Result<usize, FsError>;
}

/// 标准 Base64 编解码器
///
/// 校验和为解码后字节的 16 位回绕和。
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl Base64Codec {
    /// 编码一段字节到 `output`，返回写入的字符数
    ///
    /// 非最后一段的 `input` 长度必须是 3 的倍数，否则中间会出现填充。
    pub fn encode_slice(input: &[u8], output: &mut [u8]) -> usize {
        STANDARD.encode_slice(input, output).unwrap_or(0)
    }
}

impl WireCodec for Base64Codec {
    fn checksum(&self, token: &str) -> u16 {
        let mut sum = 0u16;
        decode_groups(token, |bytes| {
            sum = bytes.iter().fold(sum, |acc, &b| acc.wrapping_add(u16::from(b)));
            true
        });
        sum
    }

    fn decode<F>(&self, token: &str, mut sink: F) -> Decoded
    where
        F: FnMut(&[u8]) -> Result<usize, FsError>,
    {
        let mut written = 0u32;
        let complete = decode_groups(token, |bytes| match sink(bytes) {
            Ok(count) => {
                written += count as u32;
                count == bytes.len()
            }
            Err(_) => false,
        });
        Decoded { written, complete }
    }
}

/// 按 4 字符分组解码，暂存后批量交给 `emit`
///
/// `emit` 返回 false 表示停止。整个 token 合法且全部交付时返回 true。
fn decode_groups<F>(token: &str, mut emit: F) -> bool
where
    F: FnMut(&[u8]) -> bool,
{
    let mut buf = [0u8; DECODE_BUFFER];
    let mut len = 0;
    let mut padded = false;
    let mut valid = true;

    for group in token.as_bytes().chunks(4) {
        let mut out = [0u8; 3];
        // 填充只允许出现在最后一组
        let count = match STANDARD.decode_slice(group, &mut out) {
            Ok(count) if !padded => count,
            _ => {
                valid = false;
                break;
            }
        };
        padded = count < 3;

        if len + count > DECODE_BUFFER {
            if !emit(&buf[..len]) {
                return false;
            }
            len = 0;
        }
        buf[len..len + count].copy_from_slice(&out[..count]);
        len += count;
    }

    if len > 0 && !emit(&buf[..len]) {
        return false;
    }
    valid
}
