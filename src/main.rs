//! Aktien 管理后台服务
//!
//! 股票行情列表的管理端：分页浏览、增删改查和股票代码检索
//! 数据来源：后端 REST 接口 api/aktiens、api/symbols

mod config;     // 配置
mod handlers;   // HTTP 请求处理器
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use env_logger::Env;
use url::Url;

use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::models::PagingParams;
use crate::services::aktien::AktienService;
use crate::services::event_bus::EventBus;

/// 应用程序入口
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置文件中的级别
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    log::info!("启动 Aktien 管理后台，后端地址 {}", config.backend.base_url);

    let api = Arc::new(AktienService::new(&config.backend).context("创建后端客户端失败")?);
    let public_url = Url::parse(&config.server.public_url).context("对外访问地址无效")?;
    let bus = EventBus::new();
    let state = web::Data::new(AppState::new(
        api,
        bus.clone(),
        config.paging.items_per_page,
        public_url,
    ));

    // 预加载代码表和第一页，并订阅列表变更
    let outcome = state.controller.open(PagingParams::default()).await;
    log::info!("初始列表加载: {:?}", outcome);
    state.controller.register_change_in_aktiens(&bus);

    let app_state = state.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())  // 添加请求日志中间件
            .app_data(app_state.clone())
            .configure(handlers::config::<AktienService>)  // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(config.bind_addr())?.run().await?;

    state.controller.teardown();
    log::info!("服务已停止");
    Ok(())
}
