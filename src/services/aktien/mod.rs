//! 股票行情数据访问模块
//!
//! 内存记录与后端之间的唯一通道，负责日期表示的转换

pub mod client;
pub mod criteria;
pub mod dates;
pub mod error;

pub use client::{AktienApi, AktienService, EntityArrayResponse};
pub use criteria::{AktienCriteria, CriteriaField, FilterOp, QueryOptions};
pub use error::{ClientError, ClientResult};
