//! chat-logs 命令行入口
//!
//! ```bash
//! # 查看第 2 页，按模型筛选
//! chat-logs list --model gpt-4o --page 2
//!
//! # 查看单个对话
//! chat-logs show 3f1c2a
//!
//! # 导出当前页
//! chat-logs export --user-id u-1 --out ./exports
//!
//! # 删除符合筛选条件的全部记录
//! chat-logs delete-all --end-date 2024-01-01
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chat_logs_viewer::chat_logs::detail_view::number_messages;
use chat_logs_viewer::chat_logs::render::{render_detail, render_list, render_notification};
use chat_logs_viewer::chat_logs::{
    ChatLogBackend, ChatLogFilter, ChatLogsClient, DeleteOutcome, DetailOutcome, DetailView,
    FilterField, ListView, LoadState, Role, Session,
};
use chat_logs_viewer::http_client::build_client;
use chat_logs_viewer::model::config::Config;
use chat_logs_viewer::notification::Notifications;

#[derive(Parser)]
#[command(name = "chat-logs", version, about = "聊天记录管理端查看器")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// 配置文件路径
    #[arg(short, long, global = true, default_value = Config::default_config_path())]
    config: PathBuf,

    /// 覆盖配置中的 API 根地址
    #[arg(long, global = true, env = "CHAT_LOGS_BASE_URL")]
    base_url: Option<String>,

    /// 覆盖配置中的 Token
    #[arg(long, global = true, env = "CHAT_LOGS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// 覆盖配置中的角色
    #[arg(long, global = true, value_enum)]
    role: Option<Role>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// 分页查看聊天记录
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// 页码（从 1 开始）
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// 查看单个对话
    Show { conversation_id: String },
    /// 导出当前页为 JSON 文件
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// 导出目录（默认取配置中的 exportDir）
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// 删除符合筛选条件的全部记录（无筛选时删除全部）
    DeleteAll {
        #[command(flatten)]
        filter: FilterArgs,
        /// 跳过确认
        #[arg(long)]
        yes: bool,
    },
    /// 通过单条接口获取对话
    Get { conversation_id: String },
    /// 通过单条接口删除对话
    Remove {
        conversation_id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    #[arg(long)]
    user_id: Option<String>,
    #[arg(long)]
    model: Option<String>,
    /// 开始日期（原样传给后端）
    #[arg(long)]
    start_date: Option<String>,
    /// 结束日期（原样传给后端）
    #[arg(long)]
    end_date: Option<String>,
    #[arg(long)]
    conversation_id: Option<String>,
}

impl FilterArgs {
    fn into_filter(self) -> ChatLogFilter {
        let fields = [
            (FilterField::UserId, self.user_id),
            (FilterField::Model, self.model),
            (FilterField::StartDate, self.start_date),
            (FilterField::EndDate, self.end_date),
            (FilterField::ConversationId, self.conversation_id),
        ];
        fields
            .into_iter()
            .fold(ChatLogFilter::default(), |filter, (field, value)| match value {
                Some(v) => filter.with(field, &v),
                None => filter,
            })
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,chat_logs_viewer={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_notifications(notifications: &Notifications) {
    for notification in notifications.drain() {
        eprintln!("{}", render_notification(&notification));
    }
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    eprint!("{} [y/N] ", prompt);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(token) = cli.token {
        config.token = Some(token);
    }
    if let Some(role) = cli.role {
        config.role = role;
    }

    let session = config.session()?;
    let http = build_client(config.proxy_url.as_deref(), config.timeout_secs)?;
    let client = Arc::new(ChatLogsClient::new(http, config.base_url.clone()));
    let backend: Arc<dyn ChatLogBackend> = client.clone();
    let notifications = Notifications::new();

    tracing::debug!(base_url = %client.base_url(), role = ?session.role, "chat-logs 已启动");

    let code = match cli.command {
        Command::List { filter, page } => {
            let mut view = ListView::new(backend, session, notifications.clone())
                .with_filter(filter.into_filter());
            view.load_page(page).await;
            print!("{}", render_list(&view));
            print_notifications(&notifications);
            exit_code(view.state() != LoadState::Errored)
        }
        Command::Show { conversation_id } => {
            show(backend, session, notifications, conversation_id).await
        }
        Command::Export { filter, page, out } => {
            let mut view = ListView::new(backend, session, notifications.clone())
                .with_filter(filter.into_filter());
            view.load_page(page).await;
            let dir = out.unwrap_or_else(|| config.export_dir.clone());
            let exported = view.export(&dir);
            if let Some(path) = &exported {
                println!("{}", path.display());
            }
            print_notifications(&notifications);
            exit_code(exported.is_some())
        }
        Command::DeleteAll { filter, yes } => {
            let mut view = ListView::new(backend, session, notifications.clone())
                .with_filter(filter.into_filter());
            let confirmed = yes || confirm(&view.delete_confirmation_prompt())?;
            let outcome = view.delete_all(confirmed).await;
            if outcome == DeleteOutcome::Deleted {
                print!("{}", render_list(&view));
            }
            print_notifications(&notifications);
            exit_code(matches!(outcome, DeleteOutcome::Deleted | DeleteOutcome::Cancelled))
        }
        Command::Get { conversation_id } => {
            match client.get_log(&session.token, &conversation_id).await {
                Ok(log) => {
                    print!("{}", render_detail(&log, &number_messages(&log)));
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!("获取聊天记录失败: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Remove { conversation_id, yes } => {
            let prompt = format!("确定要删除对话 {} 吗？", conversation_id);
            if !(yes || confirm(&prompt)?) {
                return Ok(ExitCode::SUCCESS);
            }
            match client.delete_log(&session.token, &conversation_id).await {
                Ok(true) => {
                    println!("对话 {} 已删除", conversation_id);
                    ExitCode::SUCCESS
                }
                Ok(false) => {
                    eprintln!("对话 {} 删除未被确认", conversation_id);
                    ExitCode::FAILURE
                }
                Err(e) => {
                    tracing::error!("删除聊天记录失败: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    };

    Ok(code)
}

/// 详情页：无权限跳首页，查无此对话时回到列表
async fn show(
    backend: Arc<dyn ChatLogBackend>,
    session: Session,
    notifications: Notifications,
    conversation_id: String,
) -> ExitCode {
    let mut view = DetailView::new(
        Arc::clone(&backend),
        session.clone(),
        notifications.clone(),
        conversation_id,
    );

    match view.activate().await {
        DetailOutcome::Loaded => {
            if let Some(log) = view.log() {
                print!("{}", render_detail(log, &view.messages()));
            }
            print_notifications(&notifications);
            ExitCode::SUCCESS
        }
        DetailOutcome::Redirect(route) => {
            eprintln!("无权访问聊天记录详情，已跳转到 {}", route.path());
            ExitCode::FAILURE
        }
        DetailOutcome::NotFound(route) => {
            print_notifications(&notifications);
            eprintln!("返回 {}", route.path());
            let mut list = ListView::new(backend, session, notifications.clone());
            list.mount().await;
            print!("{}", render_list(&list));
            print_notifications(&notifications);
            ExitCode::FAILURE
        }
        DetailOutcome::Failed => {
            print_notifications(&notifications);
            ExitCode::FAILURE
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
