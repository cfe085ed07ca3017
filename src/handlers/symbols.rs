//! 股票代码查找接口
//!
//! GET /symbols?q=<关键字> 返回列表控制器已加载的代码表，按全称或代码过滤

use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use crate::handlers::AppState;
use crate::models::{filter_symbols, ApiResponse, Symbol};
use crate::services::aktien::AktienApi;

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    /// 检索关键字
    pub q: Option<String>,
}

pub async fn list_symbols<A: AktienApi + 'static>(
    state: web::Data<AppState<A>>,
    query: web::Query<SymbolQuery>,
) -> Result<HttpResponse> {
    let view = state.controller.snapshot();
    let keyword = query.q.as_deref().unwrap_or_default();
    let symbols: Vec<Symbol> = filter_symbols(&view.symbols, keyword)
        .into_iter()
        .cloned()
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(symbols)))
}

pub fn config<A: AktienApi + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/symbols", web::get().to(list_symbols::<A>));
}
