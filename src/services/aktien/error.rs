//! 数据访问错误

use reqwest::StatusCode;
use thiserror::Error;

/// 数据访问层错误
///
/// 网络失败与非成功状态码在列表层不作区分，统一按加载失败处理
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("请求后端失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("后端返回 {status}: {url}")]
    Status { status: StatusCode, url: String },

    #[error("后端地址无效: {0}")]
    Url(#[from] url::ParseError),

    #[error("无效的查询条件: {0}")]
    InvalidCriterion(String),

    #[error("记录尚未保存，无法删除")]
    MissingId,
}

impl ClientError {
    /// 后端返回 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
