//! 聊天记录 REST API 客户端
//!
//! 只负责构建请求、发送一次并归一化错误；不重试、不缓存。
//! Token 作为显式参数传入，客户端本身不持有任何会话状态。

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ChatLogsError, Result};
use super::query::{Pagination, build_query};
use super::types::{ChatLogFilter, ChatLogSummary, ChatLogsResponse, ErrorDetail};

/// 视图依赖的后端能力
///
/// 列表与详情视图只通过该 trait 访问后端，便于替换为测试实现
#[async_trait]
pub trait ChatLogBackend: Send + Sync {
    /// GET /chat-logs[/admin]
    async fn fetch_logs(
        &self,
        token: &str,
        filter: &ChatLogFilter,
        is_admin: bool,
        pagination: Pagination,
    ) -> Result<ChatLogsResponse>;

    /// DELETE /chat-logs[/admin]，返回后端定义的确认值
    async fn delete_logs(&self, token: &str, filter: &ChatLogFilter, is_admin: bool) -> Result<Value>;
}

/// 基于 reqwest 的 API 客户端
#[derive(Debug, Clone)]
pub struct ChatLogsClient {
    client: Client,
    base_url: String,
}

impl ChatLogsClient {
    /// 创建客户端，`base_url` 末尾的 `/` 会被去掉
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 列表/批量删除端点
    pub fn endpoint(&self, is_admin: bool) -> String {
        if is_admin {
            format!("{}/chat-logs/admin", self.base_url)
        } else {
            format!("{}/chat-logs", self.base_url)
        }
    }

    fn conversation_endpoint(&self, conversation_id: &str) -> String {
        format!(
            "{}/chat-logs/{}",
            self.base_url,
            urlencoding::encode(conversation_id)
        )
    }

    /// GET /chat-logs/{conversation_id}
    pub async fn get_log(&self, token: &str, conversation_id: &str) -> Result<ChatLogSummary> {
        let url = self.conversation_endpoint(conversation_id);
        tracing::debug!(url = %url, "获取单条聊天记录");
        let response = self.send(self.client.get(&url), token).await?;
        parse_json(response).await
    }

    /// DELETE /chat-logs/{conversation_id}
    pub async fn delete_log(&self, token: &str, conversation_id: &str) -> Result<bool> {
        let url = self.conversation_endpoint(conversation_id);
        tracing::debug!(url = %url, "删除单条聊天记录");
        let response = self.send(self.client.delete(&url), token).await?;
        let value = parse_value(response).await?;
        Ok(is_truthy(&value))
    }

    async fn send(&self, request: RequestBuilder, token: &str) -> Result<Response> {
        Ok(request.bearer_auth(token).send().await?)
    }
}

#[async_trait]
impl ChatLogBackend for ChatLogsClient {
    async fn fetch_logs(
        &self,
        token: &str,
        filter: &ChatLogFilter,
        is_admin: bool,
        pagination: Pagination,
    ) -> Result<ChatLogsResponse> {
        let url = self.endpoint(is_admin);
        let params = build_query(filter, Some(pagination));
        tracing::debug!(url = %url, params = ?params, page = pagination.page(), "获取聊天记录列表");

        let response = self
            .send(self.client.get(&url).query(&params), token)
            .await?;
        let body = read_body(response).await?;
        let logs = ChatLogsResponse::from_json(&body).map_err(ChatLogsError::Decode)?;

        tracing::debug!(rows = logs.data.len(), total = logs.count, "聊天记录列表已加载");
        Ok(logs)
    }

    async fn delete_logs(&self, token: &str, filter: &ChatLogFilter, is_admin: bool) -> Result<Value> {
        let url = self.endpoint(is_admin);
        let params = build_query(filter, None);
        tracing::info!(url = %url, params = ?params, "批量删除聊天记录");

        let response = self
            .send(self.client.delete(&url).query(&params), token)
            .await?;
        parse_value(response).await
    }
}

/// 读取响应体；非 2xx 时按 `{detail}` 解析为 Api 错误
async fn read_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    #[cfg(feature = "sensitive-logs")]
    tracing::debug!(status = %status, body = %body, "收到响应");

    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorDetail>(&body)
            .map(ErrorDetail::into_message)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body.clone()
                }
            });
        tracing::warn!(status = status.as_u16(), detail = %detail, "聊天记录 API 返回错误");
        return Err(ChatLogsError::Api {
            status: status.as_u16(),
            detail,
        });
    }

    Ok(body)
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = read_body(response).await?;
    serde_json::from_str(&body).map_err(ChatLogsError::Decode)
}

/// 删除接口的返回值由后端定义，空响应体视为 null
async fn parse_value(response: Response) -> Result<Value> {
    let body = read_body(response).await?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(ChatLogsError::Decode)
}

/// 后端确认值的真值判断
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
