//! 聊天记录查看模块
//!
//! 提供列表/详情视图状态机，以及访问 `/chat-logs` 接口的 API 客户端

pub mod api;
pub mod detail_view;
pub mod error;
pub mod export;
pub mod list_view;
pub mod query;
pub mod render;
pub mod session;
pub mod types;

pub use api::{ChatLogBackend, ChatLogsClient};
pub use detail_view::{DetailOutcome, DetailView};
pub use error::{ChatLogsError, Result};
pub use list_view::{DeleteOutcome, ListView, LoadState};
pub use query::{PAGE_SIZE, Pagination};
pub use session::{Role, Route, Session};
pub use types::{ChatLogDetail, ChatLogFilter, ChatLogSummary, ChatLogsResponse, FilterField, Message, MessageContent};
