//! 查询条件与请求参数
//!
//! 后端过滤参数格式为 `<字段>.<操作>=<值>`，例如：
//! `/api/aktiens?id.greaterThan=5&symbol.contains=aapl&date.specified=true`

use std::fmt;

use super::error::{ClientError, ClientResult};

/// 可过滤字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CriteriaField {
    Id,
    Symbol,
    Date,
    Open,
    Close,
    High,
    Low,
    Volume,
}

impl CriteriaField {
    pub const ALL: [CriteriaField; 8] = [
        CriteriaField::Id,
        CriteriaField::Symbol,
        CriteriaField::Date,
        CriteriaField::Open,
        CriteriaField::Close,
        CriteriaField::High,
        CriteriaField::Low,
        CriteriaField::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CriteriaField::Id => "id",
            CriteriaField::Symbol => "symbol",
            CriteriaField::Date => "date",
            CriteriaField::Open => "open",
            CriteriaField::Close => "close",
            CriteriaField::High => "high",
            CriteriaField::Low => "low",
            CriteriaField::Volume => "volume",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// 过滤操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equals,
    NotEquals,
    In,
    Specified,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Contains,
    DoesNotContain,
}

impl FilterOp {
    pub const ALL: [FilterOp; 10] = [
        FilterOp::Equals,
        FilterOp::NotEquals,
        FilterOp::In,
        FilterOp::Specified,
        FilterOp::GreaterThan,
        FilterOp::GreaterThanOrEqual,
        FilterOp::LessThan,
        FilterOp::LessThanOrEqual,
        FilterOp::Contains,
        FilterOp::DoesNotContain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Equals => "equals",
            FilterOp::NotEquals => "notEquals",
            FilterOp::In => "in",
            FilterOp::Specified => "specified",
            FilterOp::GreaterThan => "greaterThan",
            FilterOp::GreaterThanOrEqual => "greaterThanOrEqual",
            FilterOp::LessThan => "lessThan",
            FilterOp::LessThanOrEqual => "lessThanOrEqual",
            FilterOp::Contains => "contains",
            FilterOp::DoesNotContain => "doesNotContain",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    fn is_range(&self) -> bool {
        matches!(
            self,
            FilterOp::GreaterThan
                | FilterOp::GreaterThanOrEqual
                | FilterOp::LessThan
                | FilterOp::LessThanOrEqual
        )
    }

    fn is_text(&self) -> bool {
        matches!(self, FilterOp::Contains | FilterOp::DoesNotContain)
    }

    /// 字符串字段只支持文本操作，其余字段只支持区间操作
    fn supports(&self, field: CriteriaField) -> bool {
        match field {
            CriteriaField::Symbol => !self.is_range(),
            _ => !self.is_text(),
        }
    }
}

/// 单个过滤条件
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    pub field: CriteriaField,
    pub op: FilterOp,
    pub value: String,
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}={}", self.field.as_str(), self.op.as_str(), self.value)
    }
}

impl fmt::Display for AktienCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, criterion) in self.criteria.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}", criterion)?;
        }
        Ok(())
    }
}

/// 股票行情过滤条件集合，所有条件同时生效
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AktienCriteria {
    criteria: Vec<Criterion>,
}

impl AktienCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加条件，字段与操作不匹配时报错
    pub fn with(
        mut self,
        field: CriteriaField,
        op: FilterOp,
        value: impl Into<String>,
    ) -> ClientResult<Self> {
        if !op.supports(field) {
            return Err(ClientError::InvalidCriterion(format!(
                "字段 {} 不支持 {} 操作",
                field.as_str(),
                op.as_str()
            )));
        }
        self.criteria.push(Criterion {
            field,
            op,
            value: value.into(),
        });
        Ok(self)
    }

    /// 从原始查询参数解析条件
    ///
    /// 非 `<字段>.<操作>` 形式的键（如 page、size、sort）直接跳过
    pub fn from_query_pairs<'a, I>(pairs: I) -> ClientResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut criteria = Self::new();
        for (key, value) in pairs {
            let Some((field, op)) = key.split_once('.') else {
                continue;
            };
            let Some(field) = CriteriaField::parse(field) else {
                continue;
            };
            let op = FilterOp::parse(op).ok_or_else(|| {
                ClientError::InvalidCriterion(format!("未知的过滤操作: {}", key))
            })?;
            criteria = criteria.with(field, op, value)?;
        }
        Ok(criteria)
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.criteria
            .iter()
            .map(|c| {
                (
                    format!("{}.{}", c.field.as_str(), c.op.as_str()),
                    c.value.clone(),
                )
            })
            .collect()
    }
}

/// 列表查询选项
///
/// 全部为空时不发送任何参数，由后端使用默认分页
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// 页码（从 0 开始）
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// 排序子句，依次生效
    pub sort: Vec<String>,
    pub criteria: AktienCriteria,
}

impl QueryOptions {
    pub fn paged(page: u32, size: u32, sort: Vec<String>) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            sort,
            criteria: AktienCriteria::default(),
        }
    }

    pub fn with_criteria(mut self, criteria: AktienCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// 转为请求参数，`sort` 可重复出现
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size".to_string(), size.to_string()));
        }
        for clause in &self.sort {
            pairs.push(("sort".to_string(), clause.clone()));
        }
        pairs.extend(self.criteria.to_query_pairs());
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paged_options_to_params() {
        let options = QueryOptions::paged(1, 20, vec!["date,desc".to_string(), "id".to_string()]);
        assert_eq!(
            options.to_query_pairs(),
            vec![
                ("page".to_string(), "1".to_string()),
                ("size".to_string(), "20".to_string()),
                ("sort".to_string(), "date,desc".to_string()),
                ("sort".to_string(), "id".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_options_send_nothing() {
        assert!(QueryOptions::default().to_query_pairs().is_empty());
    }

    #[test]
    fn test_criteria_params() {
        let criteria = AktienCriteria::new()
            .with(CriteriaField::Symbol, FilterOp::Contains, "aapl")
            .unwrap()
            .with(CriteriaField::Volume, FilterOp::GreaterThanOrEqual, "1000")
            .unwrap()
            .with(CriteriaField::Date, FilterOp::LessThan, "2020-01-01T00:00:00.000Z")
            .unwrap();

        assert_eq!(
            criteria.to_query_pairs(),
            vec![
                ("symbol.contains".to_string(), "aapl".to_string()),
                ("volume.greaterThanOrEqual".to_string(), "1000".to_string()),
                ("date.lessThan".to_string(), "2020-01-01T00:00:00.000Z".to_string()),
            ]
        );
        assert_eq!(
            criteria.to_string(),
            concat!(
                "symbol.contains=aapl&volume.greaterThanOrEqual=1000",
                "&date.lessThan=2020-01-01T00:00:00.000Z"
            )
        );
    }

    #[test]
    fn test_criteria_rejects_mismatched_ops() {
        let err = AktienCriteria::new()
            .with(CriteriaField::Symbol, FilterOp::GreaterThan, "A")
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidCriterion(_)));

        assert!(AktienCriteria::new()
            .with(CriteriaField::Close, FilterOp::Contains, "1")
            .is_err());

        // equals / in / specified 对所有字段可用
        for field in CriteriaField::ALL {
            for op in [FilterOp::Equals, FilterOp::NotEquals, FilterOp::In, FilterOp::Specified] {
                assert!(AktienCriteria::new().with(field, op, "x").is_ok());
            }
        }
    }

    #[test]
    fn test_criteria_from_query_pairs() {
        let pairs = vec![
            ("page", "0"),
            ("sort", "id,desc"),
            ("symbol.in", "AAPL,MSFT"),
            ("open.specified", "true"),
            ("unknown.equals", "1"),
        ];
        let criteria = AktienCriteria::from_query_pairs(pairs).unwrap();
        assert_eq!(
            criteria.to_query_pairs(),
            vec![
                ("symbol.in".to_string(), "AAPL,MSFT".to_string()),
                ("open.specified".to_string(), "true".to_string()),
            ]
        );

        assert!(AktienCriteria::from_query_pairs(vec![("id.between", "1")]).is_err());
        assert!(AktienCriteria::from_query_pairs(vec![("low.contains", "1")]).is_err());
    }
}
