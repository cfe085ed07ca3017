//! 股票代码查找表模型

use serde::{Deserialize, Serialize};

/// 股票代码（只读参考数据）
///
/// 仅用于填充选择控件，前端从不修改
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    /// 公司全称，选择控件按此字段检索
    #[serde(default)]
    pub full_name: Option<String>,
    /// 股票代码
    #[serde(default)]
    pub symbol: Option<String>,
}

impl Symbol {
    /// 是否匹配关键字（不区分大小写，匹配全称或代码）
    pub fn matches(&self, keyword: &str) -> bool {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return true;
        }
        [&self.full_name, &self.symbol]
            .iter()
            .filter_map(|field| field.as_deref())
            .any(|value| value.to_lowercase().contains(&keyword))
    }
}

/// 按关键字过滤代码列表
pub fn filter_symbols<'a>(symbols: &'a [Symbol], keyword: &str) -> Vec<&'a Symbol> {
    symbols.iter().filter(|s| s.matches(keyword)).collect()
}
