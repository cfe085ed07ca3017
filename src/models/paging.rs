//! 分页状态模型
//!
//! 页码约定：
//! - 界面与 URL 使用从 1 开始的页码
//! - 发往后端的 `page` 参数从 0 开始

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// 每页默认条数
pub const ITEMS_PER_PAGE: u32 = 20;

/// 总条数响应头
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

/// 主键字段名，排序时作为次级排序键
pub const ID_PREDICATE: &str = "id";

static PREDICATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.]*$").expect("排序字段正则无效"));

/// 路由查询参数（原始字符串）
#[derive(Debug, Default, Deserialize)]
pub struct RouteQuery {
    pub page: Option<String>,
    pub sort: Option<String>,
}

/// 路由激活时提供的初始分页参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagingParams {
    /// 页码（从 1 开始）
    pub page: u32,
    /// 排序字段
    pub predicate: String,
    /// 是否升序
    pub ascending: bool,
}

impl Default for PagingParams {
    fn default() -> Self {
        Self {
            page: 1,
            predicate: ID_PREDICATE.to_string(),
            ascending: true,
        }
    }
}

impl PagingParams {
    /// 解析路由参数
    ///
    /// - 缺省或非法页码按第 1 页处理
    /// - 缺省排序为 `id,asc`，方向只有 `desc` 才视为降序
    pub fn from_route(query: &RouteQuery) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        let sort = query
            .sort
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("id,asc");
        // URL 中逗号可能仍是编码形式
        let sort = sort.replace("%2C", ",").replace("%2c", ",");
        let mut parts = sort.splitn(2, ',');
        let predicate = parts.next().unwrap_or_default().trim();
        let direction = parts.next().map(str::trim);

        let predicate = if PREDICATE_RE.is_match(predicate) {
            predicate.to_string()
        } else {
            log::warn!("忽略非法排序字段: {:?}", predicate);
            ID_PREDICATE.to_string()
        };

        Self {
            page,
            predicate,
            ascending: direction != Some("desc"),
        }
    }

    /// 从导航历史中的 URL 恢复路由参数
    pub fn from_url(url: &Url) -> Self {
        let mut query = RouteQuery::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "page" => query.page = Some(value.into_owned()),
                "sort" => query.sort = Some(value.into_owned()),
                _ => {}
            }
        }
        Self::from_route(&query)
    }
}

/// 列表分页状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagingState {
    /// 最近一次成功加载的页码（从 1 开始）
    pub page: u32,
    /// 每页条数
    pub items_per_page: u32,
    /// 排序字段
    pub predicate: String,
    /// 是否升序
    pub ascending: bool,
    /// 分页控件显示的页码
    pub pagination_page: u32,
}

impl PagingState {
    pub fn new(items_per_page: u32) -> Self {
        Self::from_params(&PagingParams::default(), items_per_page)
    }

    pub fn from_params(params: &PagingParams, items_per_page: u32) -> Self {
        Self {
            page: params.page,
            items_per_page,
            predicate: params.predicate.clone(),
            ascending: params.ascending,
            pagination_page: params.page,
        }
    }

    pub fn direction(&self) -> &'static str {
        if self.ascending {
            "asc"
        } else {
            "desc"
        }
    }

    /// URL 中的排序串，如 `date,desc`
    pub fn sort_param(&self) -> String {
        format!("{},{}", self.predicate, self.direction())
    }

    /// 发往后端的排序子句
    ///
    /// 排序字段不是 `id` 时追加 `id` 作为次级排序，保证跨页顺序稳定
    pub fn sort(&self) -> Vec<String> {
        let mut result = vec![self.sort_param()];
        if self.predicate != ID_PREDICATE {
            result.push(ID_PREDICATE.to_string());
        }
        result
    }
}

/// 从响应头读取总条数
///
/// 缺失或无法解析时返回 0
pub fn parse_total_count(headers: &HeaderMap) -> u64 {
    match headers.get(TOTAL_COUNT_HEADER) {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or_else(|| {
                log::warn!("无法解析 {} 响应头: {:?}", TOTAL_COUNT_HEADER, value);
                0
            }),
        None => 0,
    }
}
