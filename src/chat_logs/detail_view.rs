//! 单个对话详情视图
//!
//! 没有按 ID 获取的接口：用 `conversation_id` 精确筛选列表接口，取第一条结果。

use std::sync::Arc;

use super::api::ChatLogBackend;
use super::error::ChatLogsError;
use super::query::Pagination;
use super::session::{Route, Session};
use super::types::{ChatLogDetail, ChatLogFilter};
use crate::notification::Notifications;

/// 编号后的展示消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedMessage {
    /// 从 1 开始的序号（跳过 system 消息）
    pub number: usize,
    pub role: String,
    pub model: Option<String>,
    /// 渲染后的内容
    pub body: String,
}

/// 详情视图激活结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    /// 已加载
    Loaded,
    /// 非管理员，未发起请求直接跳转
    Redirect(Route),
    /// 查无此对话，返回列表
    NotFound(Route),
    /// 请求失败，停留在当前页
    Failed,
}

pub struct DetailView {
    backend: Arc<dyn ChatLogBackend>,
    session: Session,
    notifications: Notifications,
    conversation_id: String,
    log: Option<ChatLogDetail>,
    loading: bool,
}

impl DetailView {
    pub fn new(
        backend: Arc<dyn ChatLogBackend>,
        session: Session,
        notifications: Notifications,
        conversation_id: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            session,
            notifications,
            conversation_id: conversation_id.into(),
            log: None,
            loading: false,
        }
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    pub fn log(&self) -> Option<&ChatLogDetail> {
        self.log.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// 激活视图：角色检查 -> 按会话 ID 查询 -> 保存结果
    pub async fn activate(&mut self) -> DetailOutcome {
        if !self.session.is_admin() {
            tracing::debug!(role = ?self.session.role, "非管理员访问聊天记录详情，跳转首页");
            return DetailOutcome::Redirect(Route::Home);
        }

        self.loading = true;
        let filter = ChatLogFilter::by_conversation(self.conversation_id.clone());
        let backend = Arc::clone(&self.backend);
        let result = backend
            .fetch_logs(&self.session.token, &filter, true, Pagination::first())
            .await;
        self.loading = false;

        match result {
            Ok(response) => match response.data.into_iter().next() {
                Some(log) => {
                    self.log = Some(log);
                    DetailOutcome::Loaded
                }
                None => {
                    let e = ChatLogsError::NotFound {
                        conversation_id: self.conversation_id.clone(),
                    };
                    tracing::warn!("{}", e);
                    self.notifications.error(e.to_string());
                    DetailOutcome::NotFound(Route::List)
                }
            },
            Err(e) => {
                tracing::error!(conversation_id = %self.conversation_id, "加载聊天记录详情失败: {}", e);
                self.notifications.error(format!("加载聊天记录失败: {}", e));
                DetailOutcome::Failed
            }
        }
    }

    /// 当前对话的编号消息，未加载时为空
    pub fn messages(&self) -> Vec<NumberedMessage> {
        self.log.as_ref().map(number_messages).unwrap_or_default()
    }
}

/// 跳过 system 消息并从 1 开始编号；`response` 作为最后一条助手消息续号
pub fn number_messages(log: &ChatLogDetail) -> Vec<NumberedMessage> {
    let mut numbered: Vec<NumberedMessage> = log
        .messages
        .iter()
        .filter(|m| !m.is_system())
        .enumerate()
        .map(|(i, m)| NumberedMessage {
            number: i + 1,
            role: m.role.clone(),
            model: m.model.clone(),
            body: m.content.render(),
        })
        .collect();

    if let Some(response) = log.response.as_ref().filter(|r| !r.is_empty()) {
        numbered.push(NumberedMessage {
            number: numbered.len() + 1,
            role: "assistant".to_string(),
            model: Some(log.model.clone()).filter(|m| !m.is_empty()),
            body: response.render(),
        });
    }

    numbered
}
