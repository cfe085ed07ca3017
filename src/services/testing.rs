//! 测试用的内存数据源

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use tokio::sync::mpsc::UnboundedSender;

use crate::models::{Aktien, Symbol, TOTAL_COUNT_HEADER};
use crate::services::aktien::{
    AktienApi, AktienCriteria, ClientError, ClientResult, EntityArrayResponse, QueryOptions,
};

/// 内存实现的 `AktienApi`，记录每次调用
#[derive(Default)]
pub struct FakeAktienApi {
    pub store: Mutex<Vec<Aktien>>,
    pub symbols: Mutex<Vec<Symbol>>,
    pub fail_queries: AtomicBool,
    pub fail_symbols: AtomicBool,
    pub fail_deletes: AtomicBool,
    /// 依次用于每次查询的延迟
    pub query_delays: Mutex<VecDeque<Duration>>,
    pub queries: Mutex<Vec<QueryOptions>>,
    pub deleted: Mutex<Vec<i64>>,
    query_listener: Mutex<Option<UnboundedSender<QueryOptions>>>,
}

pub fn sample(id: i64) -> Aktien {
    Aktien {
        id: Some(id),
        symbol: Some("Apple Inc. (aapl)".to_string()),
        close: Some(300.0 + id as f64),
        volume: Some(1000 + id as i32),
        ..Default::default()
    }
}

fn status_error(status: StatusCode) -> ClientError {
    ClientError::Status {
        status,
        url: "http://fake/api/aktiens".to_string(),
    }
}

impl FakeAktienApi {
    pub fn with_records(count: i64) -> Self {
        let api = Self::default();
        *api.store.lock() = (1..=count).map(sample).collect();
        api
    }

    /// 每次查询时把选项发送到该通道
    pub fn notify_queries(&self, sender: UnboundedSender<QueryOptions>) {
        *self.query_listener.lock() = Some(sender);
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().len()
    }
}

#[async_trait]
impl AktienApi for FakeAktienApi {
    async fn create(&self, aktien: &Aktien) -> ClientResult<Aktien> {
        let mut store = self.store.lock();
        let id = store.iter().filter_map(|a| a.id).max().unwrap_or(0) + 1;
        let created = Aktien {
            id: Some(id),
            ..aktien.clone()
        };
        store.push(created.clone());
        Ok(created)
    }

    async fn update(&self, aktien: &Aktien) -> ClientResult<Aktien> {
        let mut store = self.store.lock();
        let existing = store
            .iter_mut()
            .find(|a| a.id.is_some() && a.id == aktien.id)
            .ok_or_else(|| status_error(StatusCode::BAD_REQUEST))?;
        *existing = aktien.clone();
        Ok(aktien.clone())
    }

    async fn find(&self, id: i64) -> ClientResult<Aktien> {
        self.store
            .lock()
            .iter()
            .find(|a| a.id == Some(id))
            .cloned()
            .ok_or_else(|| status_error(StatusCode::NOT_FOUND))
    }

    async fn query(&self, options: &QueryOptions) -> ClientResult<EntityArrayResponse<Aktien>> {
        self.queries.lock().push(options.clone());
        if let Some(sender) = self.query_listener.lock().as_ref() {
            let _ = sender.send(options.clone());
        }

        let delay = self.query_delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(status_error(StatusCode::INTERNAL_SERVER_ERROR));
        }

        let store = self.store.lock();
        let size = options.size.unwrap_or(20) as usize;
        let page = options.page.unwrap_or(0) as usize;
        let body = store.iter().skip(page * size).take(size).cloned().collect();

        let mut headers = HeaderMap::new();
        headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(store.len() as u64));
        Ok(EntityArrayResponse { body, headers })
    }

    async fn count(&self, _criteria: &AktienCriteria) -> ClientResult<u64> {
        Ok(self.store.lock().len() as u64)
    }

    async fn query_symbols(&self) -> ClientResult<Vec<Symbol>> {
        if self.fail_symbols.load(Ordering::SeqCst) {
            return Err(status_error(StatusCode::BAD_GATEWAY));
        }
        Ok(self.symbols.lock().clone())
    }

    async fn delete(&self, id: i64) -> ClientResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(status_error(StatusCode::INTERNAL_SERVER_ERROR));
        }
        let mut store = self.store.lock();
        let before = store.len();
        store.retain(|a| a.id != Some(id));
        if store.len() == before {
            return Err(status_error(StatusCode::NOT_FOUND));
        }
        self.deleted.lock().push(id);
        Ok(())
    }
}
