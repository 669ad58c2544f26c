//! 查询字符串构建与分页

use super::types::ChatLogFilter;

/// 每页固定条数
pub const PAGE_SIZE: u32 = 50;

/// 偏移分页（1 起始页码）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
}

impl Pagination {
    /// 页码小于 1 时按第 1 页处理
    pub fn new(page: u32) -> Self {
        Self { page: page.max(1) }
    }

    pub fn first() -> Self {
        Self::new(1)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        PAGE_SIZE
    }

    /// skip = (page - 1) * PAGE_SIZE
    pub fn skip(&self) -> u64 {
        (self.page as u64 - 1) * PAGE_SIZE as u64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::first()
    }
}

/// 总条数对应的页数（至少 1 页）
pub fn page_count(total: u64) -> u32 {
    let pages = total.div_ceil(PAGE_SIZE as u64).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// 构建查询参数：筛选字段在前，分页参数在后
pub fn build_query(filter: &ChatLogFilter, pagination: Option<Pagination>) -> Vec<(&'static str, String)> {
    let mut pairs: Vec<(&'static str, String)> = filter
        .entries()
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();

    if let Some(p) = pagination {
        pairs.push(("limit", p.limit().to_string()));
        pairs.push(("skip", p.skip().to_string()));
    }

    pairs
}
