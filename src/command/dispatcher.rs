//! 命令调度器
//!
//! 解析单字符操作码和参数，执行权限检查后交给传输引擎，
//! 保证每条命令恰好产生一个终结应答。
//!
//! # 命令格式
//! ```text
//! ?                                   列出文件
//! < <首字节(十进制)> <路径>            读取
//! > <地址(十六进制)> <载荷> <校验和(十六进制)> <路径>   写入
//! d <路径>                             删除
//! x <请求ID(十进制)>                   删除全部
//! . <路径>                             传输结束
//! ```

use embassy_time::Duration;

use crate::config::{CACHE_TIMEOUT_MS, MAX_BLOCK_TO_SEND};
use crate::fs::Volume;
use crate::transfer::{Base64Codec, Responder, TransferEngine, TransferResult, WireCodec};
use crate::util::Clock;
use crate::{log_debug, log_warn};

use super::options::TransferOptions;
use super::params::Params;

/// 操作码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    ListFiles,
    GetFileContent,
    PutFileContent,
    DeleteFile,
    DeleteAllFiles,
    TransferComplete,
}

impl Opcode {
    /// 错误应答中表示未知命令的上下文字符
    pub const UNKNOWN: char = '*';

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '?' => Some(Self::ListFiles),
            '<' => Some(Self::GetFileContent),
            '>' => Some(Self::PutFileContent),
            'd' => Some(Self::DeleteFile),
            'x' => Some(Self::DeleteAllFiles),
            '.' => Some(Self::TransferComplete),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::ListFiles => '?',
            Self::GetFileContent => '<',
            Self::PutFileContent => '>',
            Self::DeleteFile => 'd',
            Self::DeleteAllFiles => 'x',
            Self::TransferComplete => '.',
        }
    }
}

/// 调度器配置
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    /// 读取命令单次最多发送的字节数 (应为 3 的倍数)
    pub block_size: u32,
    /// 缓存句柄空闲超时
    pub cache_timeout: Duration,
    /// 初始权限
    pub options: TransferOptions,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherConfig {
    pub const fn new() -> Self {
        Self {
            block_size: MAX_BLOCK_TO_SEND,
            cache_timeout: Duration::from_millis(CACHE_TIMEOUT_MS),
            options: TransferOptions::ALLOW_DELETION,
        }
    }

    /// 设置读取块大小
    pub fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    /// 设置空闲超时
    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }

    /// 设置初始权限
    pub fn with_options(mut self, options: TransferOptions) -> Self {
        self.options = options;
        self
    }
}

/// 命令调度器
pub struct Dispatcher<V: Volume, C: Clock, K: WireCodec = Base64Codec> {
    engine: TransferEngine<V, C>,
    codec: K,
    options: TransferOptions,
    block_size: u32,
}

impl<V: Volume, C: Clock> Dispatcher<V, C, Base64Codec> {
    /// 默认配置和 Base64 编解码
    pub fn new(volume: V, clock: C) -> Self {
        Self::with_config(volume, clock, Base64Codec, DispatcherConfig::default())
    }
}

impl<V: Volume, C: Clock, K: WireCodec> Dispatcher<V, C, K> {
    pub fn with_config(volume: V, clock: C, codec: K, config: DispatcherConfig) -> Self {
        Self {
            engine: TransferEngine::with_timeout(volume, clock, config.cache_timeout),
            codec,
            options: config.options,
            block_size: config.block_size,
        }
    }

    /// 修改权限 (在两条命令之间调用)
    pub fn set_options(&mut self, options: TransferOptions) {
        self.options = options;
    }

    pub fn options(&self) -> TransferOptions {
        self.options
    }

    pub fn is_file_delete_enabled(&self) -> bool {
        self.options.file_deletion_allowed()
    }

    pub fn is_clear_all_enabled(&self) -> bool {
        self.options.clear_all_allowed()
    }

    pub fn engine(&self) -> &TransferEngine<V, C> {
        &self.engine
    }

    /// 空闲淘汰检查
    pub fn tick(&mut self) -> bool {
        self.engine.tick()
    }

    /// 处理一条命令
    ///
    /// 返回值与已发送给应答器的结果一致，便于调用方记录。
    pub fn dispatch<R: Responder + ?Sized>(&mut self, command: &str, responder: &mut R) -> TransferResult {
        let mut params = Params::new(command);
        let received = params.next_token().and_then(|t| t.chars().next());

        let Some(opcode) = received.and_then(Opcode::from_char) else {
            let ch = received.unwrap_or('\0');
            log_warn!("unknown file manager command: {}", ch as u32);
            responder.send_error(TransferResult::UnknownCommand, Opcode::UNKNOWN, None, ch as u32);
            return TransferResult::UnknownCommand;
        };

        match opcode {
            Opcode::ListFiles => self.handle_list(responder),
            Opcode::GetFileContent => self.handle_get(params, responder),
            Opcode::PutFileContent => self.handle_put(params, responder),
            Opcode::DeleteFile => self.handle_delete(params, responder),
            Opcode::DeleteAllFiles => self.handle_delete_all(params, responder),
            Opcode::TransferComplete => {
                let path = params.remaining();
                let closed = self.engine.transfer_complete(path);
                responder.transfer_closed(path, closed);
                TransferResult::Ok
            }
        }
    }

    fn handle_list<R: Responder + ?Sized>(&mut self, responder: &mut R) -> TransferResult {
        let result = self.engine.list_files(responder);
        if result.is_ok() {
            responder.files_listed();
        } else {
            responder.send_error(result, Opcode::ListFiles.as_char(), None, 0);
        }
        result
    }

    fn handle_get<R: Responder + ?Sized>(&mut self, mut params: Params<'_>, responder: &mut R) -> TransferResult {
        let first_byte = params.next_decimal();
        let path = params.remaining();
        match first_byte {
            Some(first_byte) => self.engine.send_file_content(path, first_byte, self.block_size, responder),
            None => {
                log_debug!("bad read offset for {}", path);
                responder.send_file_error(path, 0, TransferResult::SeekFailed);
                TransferResult::SeekFailed
            }
        }
    }

    fn handle_put<R: Responder + ?Sized>(&mut self, mut params: Params<'_>, responder: &mut R) -> TransferResult {
        let address = params.next_hex();
        let payload = params.next_token().unwrap_or("");
        let expected = params.next_hex_u16();
        let path = params.remaining();

        let (Some(address), Some(expected)) = (address, expected) else {
            log_warn!("malformed put for {}", path);
            responder.file_receive_result(path, 0, 0, TransferResult::BadChecksum);
            return TransferResult::BadChecksum;
        };

        let actual = self.codec.checksum(payload);
        if actual != expected {
            log_warn!("checksum mismatch for {}: expected {}, got {}", path, expected, actual);
            responder.file_receive_result(path, address, 0, TransferResult::BadChecksum);
            return TransferResult::BadChecksum;
        }

        self.engine.receive_file_content(path, address, payload, &self.codec, responder)
    }

    fn handle_delete<R: Responder + ?Sized>(&mut self, params: Params<'_>, responder: &mut R) -> TransferResult {
        let path = params.remaining();
        let result = if self.is_file_delete_enabled() {
            self.engine.delete_file(path)
        } else {
            log_warn!("file deletion disabled");
            TransferResult::FileDeleteDisabled
        };
        responder.file_delete_result(path, result);
        result
    }

    fn handle_delete_all<R: Responder + ?Sized>(&mut self, mut params: Params<'_>, responder: &mut R) -> TransferResult {
        let request_id = params.next_decimal().unwrap_or(0);
        let result = if self.is_clear_all_enabled() {
            self.engine.clear_all_files()
        } else {
            log_warn!("clear all disabled");
            TransferResult::DeleteAllDisabled
        };
        responder.all_files_deleted(request_id, result);
        result
    }
}
