//! 聊天记录列表视图
//!
//! 持有页码、筛选条件、当前页数据等瞬时状态，并在挂载、翻页、修改筛选、
//! 清空筛选和删除后刷新时请求后端。
//!
//! 所有请求都经过 [`ListView::load_page`]。每次加载分配一个单调递增的请求序号，
//! 只有最新序号的响应会被应用，较早发出的请求晚到时直接丢弃。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde_json::Value;

use super::api::{ChatLogBackend, is_truthy};
use super::error::Result;
use super::export::write_export;
use super::query::{PAGE_SIZE, Pagination, page_count};
use super::session::{Route, Session};
use super::types::{ChatLogFilter, ChatLogSummary, ChatLogsResponse, FilterField};
use crate::notification::Notifications;

/// 列表加载状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// 一次列表加载的凭据
///
/// 由 [`ListView::begin_load`] 发出，交回 [`ListView::complete_load`] 时校验是否过期
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    token: u64,
    page: u32,
    filter: ChatLogFilter,
}

impl LoadTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn filter(&self) -> &ChatLogFilter {
        &self.filter
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page)
    }
}

/// 批量删除结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 用户未确认
    Cancelled,
    /// 删除成功并已刷新到第一页
    Deleted,
    /// 后端返回了假值，未刷新
    Rejected,
    /// 请求失败
    Failed,
}

/// 列表视图状态
pub struct ListView {
    backend: Arc<dyn ChatLogBackend>,
    session: Session,
    notifications: Notifications,
    filter: ChatLogFilter,
    page: u32,
    total: Option<u64>,
    results: Option<Vec<ChatLogSummary>>,
    /// 当前页的原始行，导出时原样写出
    rows: Option<Vec<Value>>,
    state: LoadState,
    loading: bool,
    /// 最近一次发出的请求序号
    latest_token: u64,
}

impl ListView {
    pub fn new(
        backend: Arc<dyn ChatLogBackend>,
        session: Session,
        notifications: Notifications,
    ) -> Self {
        Self {
            backend,
            session,
            notifications,
            filter: ChatLogFilter::default(),
            page: 1,
            total: None,
            results: None,
            rows: None,
            state: LoadState::Idle,
            loading: false,
            latest_token: 0,
        }
    }

    /// 以初始筛选条件创建（例如来自命令行参数）
    pub fn with_filter(mut self, filter: ChatLogFilter) -> Self {
        self.filter = filter;
        self
    }

    // ============ 状态读取 ============

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn results(&self) -> Option<&[ChatLogSummary]> {
        self.results.as_deref()
    }

    pub fn filter(&self) -> &ChatLogFilter {
        &self.filter
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn skip(&self) -> u64 {
        Pagination::new(self.page).skip()
    }

    /// 仅当总数超过一页时显示分页控件
    pub fn show_pagination(&self) -> bool {
        self.total.is_some_and(|total| total > PAGE_SIZE as u64)
    }

    pub fn page_count(&self) -> u32 {
        page_count(self.total.unwrap_or(0))
    }

    // ============ 加载 ============

    /// 首次挂载时加载当前页
    pub async fn mount(&mut self) {
        self.load_page(self.page).await;
    }

    /// 加载第 `page` 页（唯一的数据请求入口）
    pub async fn load_page(&mut self, page: u32) {
        let ticket = self.begin_load(page);
        let backend = Arc::clone(&self.backend);
        let result = backend
            .fetch_logs(
                &self.session.token,
                ticket.filter(),
                self.session.is_admin(),
                ticket.pagination(),
            )
            .await;
        self.complete_load(ticket, result);
    }

    /// 记录目标页码并分配新的请求序号
    pub fn begin_load(&mut self, page: u32) -> LoadTicket {
        self.page = page.max(1);
        self.latest_token += 1;
        self.loading = true;
        self.state = LoadState::Loading;

        LoadTicket {
            token: self.latest_token,
            page: self.page,
            filter: self.filter.clone(),
        }
    }

    /// 应用加载结果，过期请求的结果被丢弃
    ///
    /// 返回结果是否被应用
    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<ChatLogsResponse>) -> bool {
        if ticket.token != self.latest_token {
            tracing::debug!(
                token = ticket.token,
                latest = self.latest_token,
                page = ticket.page,
                "丢弃过期的列表响应"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(response) => {
                let (data, rows, count) = response.into_parts();
                self.total = Some(count);
                self.results = Some(data);
                self.rows = Some(rows);
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                tracing::error!(page = ticket.page, "加载聊天记录失败: {}", e);
                self.notifications.error(format!("加载聊天记录失败: {}", e));
                self.state = LoadState::Errored;
            }
        }
        true
    }

    // ============ 筛选 ============

    /// 修改单个筛选字段，回到第一页并刷新
    pub async fn set_filter(&mut self, field: FilterField, value: &str) {
        self.filter.set(field, value);
        self.load_page(1).await;
    }

    /// 整体替换筛选条件，回到第一页并刷新
    pub async fn apply_filter(&mut self, filter: ChatLogFilter) {
        self.filter = filter;
        self.load_page(1).await;
    }

    /// 清空筛选条件
    pub async fn clear_filters(&mut self) {
        self.filter = ChatLogFilter::default();
        self.load_page(1).await;
    }

    // ============ 导航 ============

    /// 点击第 `index` 行进入详情页
    pub fn open_detail(&self, index: usize) -> Option<Route> {
        let conversation_id = self
            .results
            .as_ref()?
            .get(index)?
            .conversation_id
            .clone()?;
        Some(Route::Detail { conversation_id })
    }

    // ============ 导出 ============

    /// 导出当前已加载的页面到 `dir`，文件名使用本地日期
    pub fn export(&mut self, dir: &Path) -> Option<PathBuf> {
        self.export_on(dir, Local::now().date_naive())
    }

    /// 按指定日期导出（文件名中的日期）
    ///
    /// 加载进行中时拒绝导出，避免写出即将被替换的页面
    pub fn export_on(&mut self, dir: &Path, date: NaiveDate) -> Option<PathBuf> {
        if self.loading {
            self.notifications.warning("聊天记录加载中，请稍后再导出");
            return None;
        }
        let Some(rows) = self.rows.as_deref() else {
            self.notifications.warning("没有可导出的聊天记录");
            return None;
        };

        match write_export(dir, date, rows) {
            Ok(path) => {
                self.notifications
                    .success(format!("已导出 {} 条聊天记录", rows.len()));
                Some(path)
            }
            Err(e) => {
                tracing::error!("导出聊天记录失败: {}", e);
                self.notifications.error(format!("导出失败: {}", e));
                None
            }
        }
    }

    // ============ 删除 ============

    /// 删除确认提示语
    pub fn delete_confirmation_prompt(&self) -> String {
        if self.filter.is_empty() {
            "确定要删除全部聊天记录吗？此操作不可撤销。".to_string()
        } else {
            let conditions = self
                .filter
                .entries()
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            format!("确定要删除符合筛选条件 [{}] 的所有聊天记录吗？此操作不可撤销。", conditions)
        }
    }

    /// 按当前筛选条件批量删除（空筛选即删除全部），成功后回到第一页刷新
    pub async fn delete_all(&mut self, confirmed: bool) -> DeleteOutcome {
        if !confirmed {
            return DeleteOutcome::Cancelled;
        }

        let backend = Arc::clone(&self.backend);
        let result = backend
            .delete_logs(&self.session.token, &self.filter, self.session.is_admin())
            .await;

        match result {
            Ok(value) if is_truthy(&value) => {
                self.notifications.success("聊天记录已删除");
                self.load_page(1).await;
                DeleteOutcome::Deleted
            }
            Ok(value) => {
                tracing::warn!(response = %value, "删除请求未被确认");
                self.notifications.warning("删除请求未被后端确认");
                DeleteOutcome::Rejected
            }
            Err(e) => {
                tracing::error!("删除聊天记录失败: {}", e);
                self.notifications.error(format!("删除失败: {}", e));
                DeleteOutcome::Failed
            }
        }
    }
}
