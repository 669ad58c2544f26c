//! 聊天记录 API 请求/响应类型

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============ 筛选条件 ============

/// 列表筛选条件
///
/// 所有字段均可选，`None` 的字段不会出现在查询字符串中
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatLogFilter {
    pub user_id: Option<String>,
    pub model: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub conversation_id: Option<String>,
}

/// 可编辑的筛选字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    UserId,
    Model,
    StartDate,
    EndDate,
    ConversationId,
}

impl FilterField {
    pub const ALL: [FilterField; 5] = [
        FilterField::UserId,
        FilterField::Model,
        FilterField::StartDate,
        FilterField::EndDate,
        FilterField::ConversationId,
    ];

    /// 查询参数名
    pub fn key(self) -> &'static str {
        match self {
            FilterField::UserId => "user_id",
            FilterField::Model => "model",
            FilterField::StartDate => "start_date",
            FilterField::EndDate => "end_date",
            FilterField::ConversationId => "conversation_id",
        }
    }
}

impl ChatLogFilter {
    /// 按会话 ID 精确匹配的筛选条件
    pub fn by_conversation(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: Some(conversation_id.into()),
            ..Self::default()
        }
    }

    pub fn get(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::UserId => self.user_id.as_deref(),
            FilterField::Model => self.model.as_deref(),
            FilterField::StartDate => self.start_date.as_deref(),
            FilterField::EndDate => self.end_date.as_deref(),
            FilterField::ConversationId => self.conversation_id.as_deref(),
        }
    }

    /// 设置字段值，空白输入视为清除该字段
    pub fn set(&mut self, field: FilterField, value: &str) {
        let value = if value.trim().is_empty() {
            None
        } else {
            Some(value.to_string())
        };
        let slot = match field {
            FilterField::UserId => &mut self.user_id,
            FilterField::Model => &mut self.model,
            FilterField::StartDate => &mut self.start_date,
            FilterField::EndDate => &mut self.end_date,
            FilterField::ConversationId => &mut self.conversation_id,
        };
        *slot = value;
    }

    /// 链式设置（便于构造）
    pub fn with(mut self, field: FilterField, value: &str) -> Self {
        self.set(field, value);
        self
    }

    /// 按固定顺序返回已设置的 (参数名, 值) 对
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        FilterField::ALL
            .iter()
            .filter_map(|field| self.get(*field).map(|v| (field.key(), v)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

// ============ 消息 ============

/// 消息内容：纯文本或任意结构化 JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Structured(Value),
}

impl MessageContent {
    /// 渲染为展示文本：字符串原样输出，结构化内容输出缩进 JSON
    pub fn render(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    /// 空白文本或 JSON null 视为无内容
    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(text) => text.trim().is_empty(),
            MessageContent::Structured(value) => value.is_null(),
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

/// 单条对话消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// 约定为 system / user / assistant，不做强制校验
    pub role: String,
    #[serde(default)]
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// 后端附带的其他字段（id、timestamp、files 等）
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            model: None,
            extra: Map::new(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == "system"
    }
}

// ============ 聊天记录 ============

/// 列表中的单条聊天记录
///
/// 后端返回的未知字段保存在 `extra` 中，导出时原样写回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatLogSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    /// 对话结束时的模型回复，详情页作为最后一条助手消息展示
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<MessageContent>,
    /// 创建时间（Unix 秒）
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 详情页使用同一结构，`response` 字段为隐式的最后一条助手消息
pub type ChatLogDetail = ChatLogSummary;

impl ChatLogSummary {
    /// 列表中展示的用户名，缺失时回退到 user_id
    pub fn display_user(&self) -> &str {
        self.user_name
            .as_deref()
            .or(self.user_id.as_deref())
            .unwrap_or("-")
    }

    /// 列表中展示的标题，缺失时取第一条用户消息
    pub fn display_title(&self) -> String {
        if let Some(title) = self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            return title.to_string();
        }
        self.messages
            .iter()
            .find(|m| m.role == "user")
            .map(|m| m.content.render())
            .unwrap_or_else(|| "(untitled)".to_string())
    }

    /// 创建时间（本地时区）
    pub fn created_at_local(&self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp(self.created_at, 0).map(|dt| dt.with_timezone(&Local))
    }
}

// ============ 响应 ============

/// 列表接口响应
///
/// 除解析后的记录外，还保留后端返回的原始行，导出时原样写出
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLogsResponse {
    pub data: Vec<ChatLogSummary>,
    /// 服务端按筛选条件统计的总数，与本页条数无关
    pub count: u64,
    rows: Vec<Value>,
}

#[derive(Deserialize)]
struct RawPage {
    #[serde(default)]
    data: Vec<Value>,
    count: u64,
}

impl ChatLogsResponse {
    /// 由已解析的记录构造，原始行取记录的序列化结果
    pub fn new(data: Vec<ChatLogSummary>, count: u64) -> Self {
        let rows = data
            .iter()
            .filter_map(|log| serde_json::to_value(log).ok())
            .collect();
        Self { data, count, rows }
    }

    /// 解析 `{data, count}` 响应体，同时保留原始行
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        let page: RawPage = serde_json::from_str(body)?;
        let data = page
            .data
            .iter()
            .cloned()
            .map(serde_json::from_value)
            .collect::<serde_json::Result<Vec<ChatLogSummary>>>()?;
        Ok(Self {
            data,
            count: page.count,
            rows: page.data,
        })
    }

    /// 后端返回的原始行
    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn into_parts(self) -> (Vec<ChatLogSummary>, Vec<Value>, u64) {
        (self.data, self.rows, self.count)
    }
}

/// 非 2xx 响应体
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub detail: Value,
}

impl ErrorDetail {
    /// `detail` 可能是字符串，也可能是校验错误列表
    pub fn into_message(self) -> String {
        match self.detail {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}
