//! 聊天记录客户端错误类型

use thiserror::Error;

/// 聊天记录操作错误
#[derive(Debug, Error)]
pub enum ChatLogsError {
    /// 网络层失败（连接、TLS、读取响应体等）
    #[error("请求发送失败: {0}")]
    Transport(#[from] reqwest::Error),

    /// 后端返回非 2xx，携带响应中的 detail
    #[error("{detail}")]
    Api { status: u16, detail: String },

    /// 2xx 响应体无法解析
    #[error("解析响应失败: {0}")]
    Decode(#[source] serde_json::Error),

    /// 导出时序列化失败
    #[error("序列化失败: {0}")]
    Encode(#[source] serde_json::Error),

    /// 按会话 ID 查询结果为空（本地判定）
    #[error("未找到聊天记录: {conversation_id}")]
    NotFound { conversation_id: String },

    /// 导出文件读写失败
    #[error("文件操作失败: {0}")]
    Io(#[from] std::io::Error),
}

impl ChatLogsError {
    /// HTTP 状态码（仅 Api 错误）
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatLogsError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatLogsError>;
