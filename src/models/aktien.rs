//! 股票行情记录模型
//!
//! 区分两种表示：
//! - `Aktien`：内存中的记录，日期已解析为时间点
//! - `AktienDto`：与后端交换的 JSON 记录，日期为规范时间戳字符串

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 股票日行情记录（内存表示）
///
/// `id` 由后端分配，首次保存前为空
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aktien {
    /// 记录 ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// 股票名称及代码，如 "Apple Inc. (aapl)"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// 交易日
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    /// 开盘价
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    /// 收盘价
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<f64>,
    /// 最高价
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    /// 最低价
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    /// 成交量
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<i32>,
}

/// 股票日行情记录（线上表示）
///
/// 空字段在序列化时省略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AktienDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// 规范时间戳，如 "2020-02-03T00:00:00.000Z"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<i32>,
}
