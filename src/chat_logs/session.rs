//! 会话与路由
//!
//! Token 与角色由宿主应用提供，显式传入每个视图和 API 调用

use serde::{Deserialize, Serialize};

/// 用户角色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
    Pending,
}

/// 当前登录会话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: token.into(),
            role,
        }
    }

    /// 仅用于界面层的角色判断，后端仍需独立鉴权
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// 视图可请求的导航目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// 应用首页（无权限时的跳转目标）
    Home,
    /// 聊天记录列表
    List,
    /// 单个对话详情
    Detail { conversation_id: String },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::List => "/admin/chat-logs".to_string(),
            Route::Detail { conversation_id } => {
                format!("/admin/chat-logs/{}", urlencoding::encode(conversation_id))
            }
        }
    }
}
