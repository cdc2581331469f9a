//! 错误分层定义
//!
//! 按来源分层：packet / state / rule / transport / speech / navigation

use thiserror::Error;

/// 统一错误类型
#[derive(Debug, Error)]
pub enum CoreError {
    // ===== 数据包错误 =====
    /// 数据包校验失败（字段越界、格式错误）
    #[error("invalid packet at '{field}': {message}")]
    InvalidPacket { field: String, message: String },

    /// 数据包过期
    #[error("stale packet: age {age_ms}ms exceeds {max_age_ms}ms")]
    StalePacket { age_ms: u64, max_age_ms: u64 },

    // ===== 状态错误 =====
    /// 状态无效（IMU 出现 NaN 等）
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    // ===== 规则引擎错误 =====
    /// 没有规则匹配（安装兜底规则后不可达）
    #[error("no rule applicable for snapshot")]
    NoRuleApplicable,

    // ===== 协作方错误 =====
    /// BLE 传输错误
    #[error("transport error: {message}")]
    Transport { message: String },

    /// 语音合成错误
    #[error("speech error: {message}")]
    Speech { message: String },

    // ===== 导航错误 =====
    /// 目的地校验错误
    #[error("navigation error at '{field}': {message}")]
    Navigation { field: String, message: String },

    /// 路线文件解析错误
    #[error("route parse error: {message}")]
    RouteParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== 通用错误 =====
    /// IO 错误
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 其他错误
    #[error("{0}")]
    Other(String),
}

impl CoreError {
    /// 创建数据包校验错误
    pub fn invalid_packet(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPacket {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 创建状态错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// 创建传输错误
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// 创建语音错误
    pub fn speech(message: impl Into<String>) -> Self {
        Self::Speech {
            message: message.into(),
        }
    }

    /// 创建导航校验错误
    pub fn navigation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 创建路线解析错误
    pub fn route_parse(message: impl Into<String>) -> Self {
        Self::RouteParse {
            message: message.into(),
            source: None,
        }
    }

    /// 是否可以在管道内局部恢复（丢弃当前包继续处理）
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidPacket { .. } | Self::StalePacket { .. } | Self::InvalidState { .. }
        )
    }
}
