//! 股票行情 REST 客户端
//!
//! 对接后端接口：
//! - POST   api/aktiens        创建
//! - PUT    api/aktiens        整条替换
//! - GET    api/aktiens/{id}   查询单条
//! - GET    api/aktiens        分页查询，总条数在 X-Total-Count 响应头中
//! - GET    api/aktiens/count  按条件计数
//! - DELETE api/aktiens/{id}   删除
//! - GET    api/symbols        股票代码全集

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response};
use url::Url;

use crate::config::BackendConfig;
use crate::models::{Aktien, AktienDto, Symbol};

use super::criteria::{AktienCriteria, QueryOptions};
use super::dates::{from_wire, from_wire_all, to_wire};
use super::error::{ClientError, ClientResult};

/// 列表响应：记录和响应头
#[derive(Debug, Clone, Default)]
pub struct EntityArrayResponse<T> {
    pub body: Vec<T>,
    pub headers: HeaderMap,
}

/// 股票行情数据访问接口
#[async_trait]
pub trait AktienApi: Send + Sync {
    async fn create(&self, aktien: &Aktien) -> ClientResult<Aktien>;

    async fn update(&self, aktien: &Aktien) -> ClientResult<Aktien>;

    async fn find(&self, id: i64) -> ClientResult<Aktien>;

    async fn query(&self, options: &QueryOptions) -> ClientResult<EntityArrayResponse<Aktien>>;

    async fn count(&self, criteria: &AktienCriteria) -> ClientResult<u64>;

    async fn query_symbols(&self) -> ClientResult<Vec<Symbol>>;

    async fn delete(&self, id: i64) -> ClientResult<()>;
}

/// 股票行情服务
pub struct AktienService {
    /// HTTP 客户端
    client: Client,
    resource_url: Url,
    symbols_url: Url,
    /// 转发给后端的 Bearer Token
    api_token: Option<String>,
}

impl AktienService {
    /// 按后端配置创建服务实例
    pub fn new(config: &BackendConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)?;

        let api_token = Some(config.api_token.trim())
            .filter(|t| !t.is_empty())
            .map(String::from);

        Ok(Self {
            client,
            resource_url: base.join("api/aktiens")?,
            symbols_url: base.join("api/symbols")?,
            api_token,
        })
    }

    fn entity_url(&self, id: i64) -> String {
        format!("{}/{}", self.resource_url, id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// 发送请求，非成功状态码转为错误
    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            log::debug!("后端返回非成功状态 {} {}", status, url);
            return Err(ClientError::Status { status, url });
        }
        Ok(response)
    }
}

#[async_trait]
impl AktienApi for AktienService {
    async fn create(&self, aktien: &Aktien) -> ClientResult<Aktien> {
        log::debug!("创建股票行情: {:?}", aktien.symbol);
        let copy = to_wire(aktien);
        let response = self
            .send(self.client.post(self.resource_url.clone()).json(&copy))
            .await?;
        let body: AktienDto = response.json().await?;
        Ok(from_wire(body))
    }

    async fn update(&self, aktien: &Aktien) -> ClientResult<Aktien> {
        log::debug!("更新股票行情: {:?}", aktien.id);
        let copy = to_wire(aktien);
        let response = self
            .send(self.client.put(self.resource_url.clone()).json(&copy))
            .await?;
        let body: AktienDto = response.json().await?;
        Ok(from_wire(body))
    }

    async fn find(&self, id: i64) -> ClientResult<Aktien> {
        let response = self.send(self.client.get(self.entity_url(id))).await?;
        let body: AktienDto = response.json().await?;
        Ok(from_wire(body))
    }

    async fn query(&self, options: &QueryOptions) -> ClientResult<EntityArrayResponse<Aktien>> {
        let params = options.to_query_pairs();
        log::debug!("分页查询股票行情: {:?}", params);

        let response = self
            .send(self.client.get(self.resource_url.clone()).query(&params))
            .await?;
        let headers = response.headers().clone();
        let body: Vec<AktienDto> = response.json().await?;

        Ok(EntityArrayResponse {
            body: from_wire_all(body),
            headers,
        })
    }

    async fn count(&self, criteria: &AktienCriteria) -> ClientResult<u64> {
        log::debug!("按条件计数股票行情: {}", criteria);
        let url = format!("{}/count", self.resource_url);
        let response = self
            .send(self.client.get(url).query(&criteria.to_query_pairs()))
            .await?;
        Ok(response.json::<u64>().await?)
    }

    async fn query_symbols(&self) -> ClientResult<Vec<Symbol>> {
        let response = self.send(self.client.get(self.symbols_url.clone())).await?;
        Ok(response.json::<Vec<Symbol>>().await?)
    }

    async fn delete(&self, id: i64) -> ClientResult<()> {
        log::debug!("删除股票行情: {}", id);
        self.send(self.client.delete(self.entity_url(id))).await?;
        Ok(())
    }
}
