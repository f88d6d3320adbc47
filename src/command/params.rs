//! 命令参数游标
//!
//! 参数之间以单个空格分隔；路径总是最后一个参数，取剩余的全部文本
//! (因此路径中可以包含空格)。

/// 参数游标
#[derive(Debug, Clone)]
pub struct Params<'a> {
    rest: &'a str,
}

impl<'a> Params<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }

    /// 取下一个以空格结束的参数
    pub fn next_token(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let (token, rest) = match self.rest.split_once(' ') {
            Some((token, rest)) => (token, rest),
            None => (self.rest, ""),
        };
        self.rest = rest;
        Some(token)
    }

    /// 十进制 u32
    pub fn next_decimal(&mut self) -> Option<u32> {
        self.next_token()?.parse().ok()
    }

    /// 十六进制 u32 (不带 `0x` 前缀)
    pub fn next_hex(&mut self) -> Option<u32> {
        u32::from_str_radix(self.next_token()?, 16).ok()
    }

    /// 十六进制 u16
    pub fn next_hex_u16(&mut self) -> Option<u16> {
        u16::from_str_radix(self.next_token()?, 16).ok()
    }

    /// 剩余的全部文本
    pub fn remaining(&self) -> &'a str {
        self.rest
    }
}
