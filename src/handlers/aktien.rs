//! 股票行情接口处理器
//!
//! ## API 列表
//! - GET    /aktien?page&sort   激活列表视图（按路由参数加载）
//! - GET    /aktien/view        当前列表视图
//! - GET    /aktien/search      按条件分页查询
//! - GET    /aktien/count       按条件计数
//! - GET    /aktien/{id}        查询单条
//! - POST   /aktien             创建
//! - PUT    /aktien             更新
//! - DELETE /aktien/{id}        删除（`confirm=false` 时取消）
//! - POST   /aktien/history/back     导航后退并恢复列表
//! - POST   /aktien/history/forward  导航前进并恢复列表

use actix_web::http::header::CONTENT_LOCATION;
use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use crate::handlers::AppState;
use crate::models::{
    parse_total_count, Aktien, AktienDto, ApiResponse, PageResult, PagingParams, RouteQuery,
};
use crate::services::aktien::dates::from_wire;
use crate::services::aktien::{AktienApi, AktienCriteria, ClientError, QueryOptions};
use crate::services::delete_dialog::DialogResult;
use crate::services::event_bus::{Event, ListModification};
use crate::services::list_controller::LoadOutcome;

/// 数据访问错误转为 HTTP 响应
fn error_response(e: &ClientError) -> HttpResponse {
    let response = ApiResponse::<()>::error(e.to_string());
    if e.is_not_found() {
        HttpResponse::NotFound().json(response)
    } else if matches!(e, ClientError::InvalidCriterion(_) | ClientError::MissingId) {
        HttpResponse::BadRequest().json(response)
    } else {
        HttpResponse::InternalServerError().json(response)
    }
}

/// 激活列表视图
///
/// GET /api/v1/aktien?page=2&sort=date,desc
///
/// 加载失败时仍返回上次成功的记录，`phase` 为 `failed`
pub async fn list_aktien<A: AktienApi + 'static>(
    state: web::Data<AppState<A>>,
    query: web::Query<RouteQuery>,
) -> Result<HttpResponse> {
    let params = PagingParams::from_route(&query);
    let outcome = state.controller.activate(params).await;
    log::debug!("列表激活结果: {:?}", outcome);

    Ok(view_response(&state))
}

/// 当前视图，`Content-Location` 为当前导航 URL
fn view_response<A: AktienApi + 'static>(state: &AppState<A>) -> HttpResponse {
    let view = state.controller.snapshot();
    let mut response = HttpResponse::Ok();
    if let Some(url) = state.navigator.current() {
        response.insert_header((CONTENT_LOCATION, url.to_string()));
    }
    response.json(ApiResponse::success(view))
}

#[derive(Debug, Clone, Copy)]
enum HistoryStep {
    Back,
    Forward,
}

/// 沿导航历史移动一步，并按该 URL 的分页参数重新激活列表
///
/// 加载失败时导航位置退回原处，保持 URL 与已显示的页一致
async fn step_history<A: AktienApi + 'static>(
    state: &AppState<A>,
    step: HistoryStep,
) -> HttpResponse {
    let target = match step {
        HistoryStep::Back => state.navigator.back(),
        HistoryStep::Forward => state.navigator.forward(),
    };
    let Some(url) = target else {
        return HttpResponse::NotFound()
            .json(ApiResponse::<()>::error("没有可用的导航历史".to_string()));
    };

    log::debug!("导航历史 {:?}: {}", step, url);
    let outcome = state.controller.activate(PagingParams::from_url(&url)).await;
    if outcome == LoadOutcome::Failed {
        let restored = match step {
            HistoryStep::Back => state.navigator.forward(),
            HistoryStep::Forward => state.navigator.back(),
        };
        log::debug!("加载失败，导航退回 {:?}", restored.map(|u| u.to_string()));
    }
    view_response(state)
}

/// 导航后退
pub async fn history_back<A: AktienApi + 'static>(
    state: web::Data<AppState<A>>,
) -> Result<HttpResponse> {
    Ok(step_history(&state, HistoryStep::Back).await)
}

/// 导航前进
pub async fn history_forward<A: AktienApi + 'static>(
    state: web::Data<AppState<A>>,
) -> Result<HttpResponse> {
    Ok(step_history(&state, HistoryStep::Forward).await)
}

/// 当前列表视图，不触发加载
pub async fn current_view<A: AktienApi + 'static>(
    state: web::Data<AppState<A>>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(state.controller.snapshot())))
}

/// 从原始查询参数解析过滤条件
fn criteria_from(pairs: &[(String, String)]) -> std::result::Result<AktienCriteria, ClientError> {
    AktienCriteria::from_query_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// 从原始查询参数构造查询选项
fn search_options(pairs: &[(String, String)]) -> std::result::Result<QueryOptions, ClientError> {
    let criteria = criteria_from(pairs)?;
    let mut options = QueryOptions::default().with_criteria(criteria);

    for (key, value) in pairs {
        match key.as_str() {
            "page" => options.page = value.parse().ok(),
            "size" => options.size = value.parse().ok(),
            "sort" => options.sort.push(value.clone()),
            _ => {}
        }
    }
    Ok(options)
}

/// 按条件分页查询
///
/// GET /api/v1/aktien/search?symbol.contains=aapl&page=0&size=20&sort=date,desc
pub async fn search_aktien<A: AktienApi + 'static>(
    state: web::Data<AppState<A>>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse> {
    let options = match search_options(&query) {
        Ok(options) => options,
        Err(e) => return Ok(error_response(&e)),
    };

    match state.api.query(&options).await {
        Ok(response) => {
            let result = PageResult {
                total_items: parse_total_count(&response.headers),
                items: response.body,
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(result)))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

/// 按条件计数
pub async fn count_aktien<A: AktienApi + 'static>(
    state: web::Data<AppState<A>>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse> {
    let criteria = match criteria_from(&query) {
        Ok(criteria) => criteria,
        Err(e) => return Ok(error_response(&e)),
    };

    match state.api.count(&criteria).await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(count))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 查询单条
pub async fn get_aktien<A: AktienApi + 'static>(
    state: web::Data<AppState<A>>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let id = path.into_inner();

    match state.api.find(id).await {
        Ok(aktien) => Ok(HttpResponse::Ok().json(ApiResponse::success(aktien))),
        Err(e) => Ok(error_response(&e)),
    }
}

/// 创建
///
/// 请求体为线上记录，无法解析的日期按空值处理
pub async fn create_aktien<A: AktienApi + 'static>(
    state: web::Data<AppState<A>>,
    body: web::Json<AktienDto>,
) -> Result<HttpResponse> {
    let aktien: Aktien = from_wire(body.into_inner());

    match state.api.create(&aktien).await {
        Ok(created) => {
            if let Some(id) = created.id {
                state
                    .bus
                    .publish(Event::AktienListModification(ListModification::Created(id)));
            }
            Ok(HttpResponse::Created().json(ApiResponse::success(created)))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

/// 更新（整条替换）
pub async fn update_aktien<A: AktienApi + 'static>(
    state: web::Data<AppState<A>>,
    body: web::Json<AktienDto>,
) -> Result<HttpResponse> {
    let aktien: Aktien = from_wire(body.into_inner());

    match state.api.update(&aktien).await {
        Ok(updated) => {
            if let Some(id) = updated.id {
                state
                    .bus
                    .publish(Event::AktienListModification(ListModification::Updated(id)));
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    /// 是否确认删除，缺省为确认
    pub confirm: Option<bool>,
}

/// 删除：打开删除对话框，按 `confirm` 确认或取消
pub async fn delete_aktien<A: AktienApi + 'static>(
    state: web::Data<AppState<A>>,
    path: web::Path<i64>,
    query: web::Query<DeleteQuery>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    let target = Aktien {
        id: Some(id),
        ..Default::default()
    };

    let dialog = state.controller.delete(target);
    let result = if query.confirm.unwrap_or(true) {
        dialog.confirm().await
    } else {
        dialog.dismiss()
    };

    match result {
        DialogResult::Deleted(id) => Ok(HttpResponse::Ok().json(ApiResponse::success(id))),
        DialogResult::Dismissed => {
            Ok(HttpResponse::Ok().json(ApiResponse::<i64>::error("已取消删除".to_string())))
        }
        DialogResult::Failed(e) => Ok(error_response(&e)),
    }
}

pub fn config<A: AktienApi + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/aktien")
            .route("", web::get().to(list_aktien::<A>))
            .route("", web::post().to(create_aktien::<A>))
            .route("", web::put().to(update_aktien::<A>))
            .route("/view", web::get().to(current_view::<A>))
            .route("/search", web::get().to(search_aktien::<A>))
            .route("/count", web::get().to(count_aktien::<A>))
            .route("/history/back", web::post().to(history_back::<A>))
            .route("/history/forward", web::post().to(history_forward::<A>))
            .route("/{id}", web::get().to(get_aktien::<A>))
            .route("/{id}", web::delete().to(delete_aktien::<A>))
    );
}
