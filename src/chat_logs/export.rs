//! 导出当前页聊天记录
//!
//! 只导出已加载到内存的当前页，不会向后端翻页拉取完整结果集。
//! 写出的是后端返回的原始行，不经过类型化结构的二次序列化

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value;

use super::error::{ChatLogsError, Result};

/// 导出文件名：chat-logs-YYYY-MM-DD.json
pub fn export_filename(date: NaiveDate) -> String {
    format!("chat-logs-{}.json", date.format("%Y-%m-%d"))
}

/// 序列化为带缩进的 JSON 文本
pub fn render_export(rows: &[Value]) -> Result<String> {
    serde_json::to_string_pretty(rows).map_err(ChatLogsError::Encode)
}

/// 写入 `dir` 下的导出文件，返回文件路径
pub fn write_export(dir: &Path, date: NaiveDate, rows: &[Value]) -> Result<PathBuf> {
    let content = render_export(rows)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(date));
    std::fs::write(&path, content)?;

    tracing::info!(path = %path.display(), rows = rows.len(), "聊天记录已导出");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filename_embeds_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename(date), "chat-logs-2024-03-09.json");
    }

    #[test]
    fn test_render_export_is_pretty_array() {
        let text = render_export(&[]).unwrap();
        assert_eq!(text, "[]");

        let row = serde_json::json!({"model": "m", "messages": [], "created_at": 1});
        let text = render_export(&[row]).unwrap();
        assert!(text.starts_with("[\n  {"));
    }

    #[test]
    fn test_render_export_keeps_nulls_and_unknown_fields() {
        let row = serde_json::json!({
            "conversation_id": "c-1",
            "title": null,
            "messages": [{"role": "user", "content": "hi", "id": "msg-1", "timestamp": 5}],
            "created_at": 1
        });
        let text = render_export(std::slice::from_ref(&row)).unwrap();
        let back: Vec<Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vec![row]);
    }

    #[test]
    fn test_write_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

        let path = write_export(&dir.path().join("out"), date, &[]).unwrap();
        assert_eq!(path.file_name().unwrap(), "chat-logs-2025-01-02.json");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }
}
