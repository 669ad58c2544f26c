//! 聊天记录管理端查看器
//!
//! 列表视图、详情视图与 `/chat-logs` REST 客户端

pub mod chat_logs;
pub mod common;
pub mod http_client;
pub mod model;
pub mod notification;
