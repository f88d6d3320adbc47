//! 文件传输核心
//!
//! - `result`: 传输结果码
//! - `codec`: 载荷编解码与校验和
//! - `responder`: 面向传输层的应答接口
//! - `cache`: 单槽缓存文件句柄
//! - `engine`: 列表、读取、写入、删除等操作

pub mod cache;
pub mod codec;
pub mod engine;
pub mod responder;
pub mod result;

pub use cache::CachedFile;
pub use codec::{Base64Codec, Decoded, WireCodec};
pub use engine::TransferEngine;
pub use responder::{ByteSource, Responder};
pub use result::TransferResult;
