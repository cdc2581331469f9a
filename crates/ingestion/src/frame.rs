//! BLE notify 载荷解码
//!
//! 传输层把字节流交到这里；解码失败映射为 `CoreError::InvalidPacket`。

use bytes::Bytes;
use contracts::{CanePacket, CoreError};

/// 解码一帧 notify 载荷
///
/// 载荷为 UTF-8 JSON，字段名见 `CanePacket` 的 serde 标注。
pub fn decode(payload: &Bytes) -> Result<CanePacket, CoreError> {
    serde_json::from_slice(payload).map_err(|e| CoreError::InvalidPacket {
        field: "payload".to_string(),
        message: e.to_string(),
    })
}

/// 解码一行回放记录（JSONL）
pub fn decode_line(line: &str) -> Result<CanePacket, CoreError> {
    serde_json::from_str(line).map_err(|e| CoreError::InvalidPacket {
        field: "payload".to_string(),
        message: e.to_string(),
    })
}

/// 编码数据包为一行回放记录
///
/// 用于测试与录制工具；正向路径不需要编码。
pub fn encode(packet: &CanePacket) -> Result<String, CoreError> {
    serde_json::to_string(packet).map_err(|e| CoreError::Other(e.to_string()))
}
