//! 界面通知模块
//!
//! 视图把操作结果以短暂通知（toast）的形式推入队列，宿主在每次操作后取出展示

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationLevel::Success => "成功",
            NotificationLevel::Warning => "警告",
            NotificationLevel::Error => "错误",
        };
        f.write_str(label)
    }
}

/// 单条通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// 通知队列
///
/// 克隆后共享同一个队列，可在多个视图之间传递
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    queue: Arc<Mutex<Vec<Notification>>>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: NotificationLevel, message: impl Into<String>) {
        self.queue.lock().push(Notification {
            level,
            message: message.into(),
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message);
    }

    /// 取出并清空所有待展示通知
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.queue.lock())
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
