//! 终端渲染
//!
//! 把视图状态渲染为纯文本，供命令行宿主输出

use std::fmt::Write;

use super::detail_view::NumberedMessage;
use super::list_view::{ListView, LoadState};
use super::types::{ChatLogDetail, ChatLogSummary};
use crate::common::{single_line, truncate_with_ellipsis};
use crate::notification::Notification;

const TITLE_WIDTH: usize = 40;
const USER_WIDTH: usize = 18;
const MODEL_WIDTH: usize = 20;

fn format_time(log: &ChatLogSummary) -> String {
    log.created_at_local()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| log.created_at.to_string())
}

/// 渲染列表视图
pub fn render_list(view: &ListView) -> String {
    let mut out = String::new();

    if !view.filter().is_empty() {
        let conditions = view
            .filter()
            .entries()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "筛选: {}", conditions);
    }

    let results = match (view.state(), view.results()) {
        (_, Some(results)) => results,
        (LoadState::Errored, None) => {
            let _ = writeln!(out, "加载失败");
            return out;
        }
        (_, None) => {
            let _ = writeln!(out, "加载中...");
            return out;
        }
    };

    if results.is_empty() {
        let _ = writeln!(out, "暂无聊天记录");
        return out;
    }

    let _ = writeln!(
        out,
        "{:>4}  {:<title$}  {:<user$}  {:<model$}  {:>4}  {}",
        "#",
        "标题",
        "用户",
        "模型",
        "消息",
        "时间",
        title = TITLE_WIDTH,
        user = USER_WIDTH,
        model = MODEL_WIDTH,
    );

    let offset = view.skip();
    for (i, log) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}  {:<title$}  {:<user$}  {:<model$}  {:>4}  {}",
            offset + i as u64 + 1,
            truncate_with_ellipsis(&single_line(&log.display_title()), TITLE_WIDTH),
            truncate_with_ellipsis(log.display_user(), USER_WIDTH),
            truncate_with_ellipsis(&log.model, MODEL_WIDTH),
            log.messages.len(),
            format_time(log),
            title = TITLE_WIDTH,
            user = USER_WIDTH,
            model = MODEL_WIDTH,
        );
        if let Some(id) = log.conversation_id.as_deref() {
            let _ = writeln!(out, "      {}", id);
        }
    }

    if let Some(total) = view.total() {
        let _ = writeln!(out, "\n共 {} 条", total);
    }
    if view.show_pagination() {
        let _ = writeln!(out, "第 {}/{} 页", view.page(), view.page_count());
    }

    out
}

/// 渲染对话详情
pub fn render_detail(log: &ChatLogDetail, messages: &[NumberedMessage]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", log.display_title());
    if let Some(id) = log.conversation_id.as_deref() {
        let _ = writeln!(out, "会话: {}", id);
    }
    let _ = writeln!(out, "用户: {}", log.display_user());
    let _ = writeln!(out, "模型: {}", log.model);
    let _ = writeln!(out, "时间: {}", format_time(log));

    for message in messages {
        let _ = writeln!(out);
        match message.model.as_deref() {
            Some(model) => {
                let _ = writeln!(out, "[{}] {} ({})", message.number, message.role, model);
            }
            None => {
                let _ = writeln!(out, "[{}] {}", message.number, message.role);
            }
        }
        let _ = writeln!(out, "{}", message.body);
    }

    out
}

/// 渲染一条通知
pub fn render_notification(notification: &Notification) -> String {
    format!("[{}] {}", notification.level, notification.message)
}
