//! 股票行情列表控制器
//!
//! 持有分页状态，按页加载记录并把分页状态写入 URL。
//! 状态流转：`Idle → Loading → Loaded | Failed`，以下情况重新进入 `Loading`：
//! - 路由激活
//! - 翻页
//! - 收到列表变更事件
//!
//! 每次加载分配递增的请求序号，只有最新请求的响应会被应用

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::models::{parse_total_count, Aktien, PagingParams, PagingState, Symbol};
use crate::services::aktien::{AktienApi, ClientError, EntityArrayResponse, QueryOptions};
use crate::services::delete_dialog::{DeleteDialog, DeleteDialogRef};
use crate::services::event_bus::{EventBus, SubscriptionGuard, Topic};
use crate::services::navigation::Navigator;

/// 列表路由路径
pub const LIST_PATH: &str = "/aktien";

/// 加载阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// 单次加载的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
    /// 已有更新的请求，本次响应被丢弃
    Superseded,
}

/// 列表视图快照
#[derive(Debug, Clone, Serialize)]
pub struct ListView {
    pub aktiens: Vec<Aktien>,
    pub symbols: Vec<Symbol>,
    pub total_items: u64,
    pub paging: PagingState,
    pub phase: LoadPhase,
}

/// 变更监听：释放时退订并停止监听任务
struct ChangeListener {
    _guard: SubscriptionGuard,
    task: JoinHandle<()>,
}

impl Drop for ChangeListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// 股票行情列表控制器
pub struct AktienListController<A> {
    api: Arc<A>,
    navigator: Arc<dyn Navigator>,
    dialog: DeleteDialog<A>,
    state: Mutex<ListView>,
    /// 最近一次发出的请求序号
    latest_request: AtomicU64,
    listener: Mutex<Option<ChangeListener>>,
}

impl<A: AktienApi + 'static> AktienListController<A> {
    pub fn new(
        api: Arc<A>,
        navigator: Arc<dyn Navigator>,
        dialog: DeleteDialog<A>,
        items_per_page: u32,
    ) -> Self {
        Self {
            api,
            navigator,
            dialog,
            state: Mutex::new(ListView {
                aktiens: Vec::new(),
                symbols: Vec::new(),
                total_items: 0,
                paging: PagingState::new(items_per_page),
                phase: LoadPhase::Idle,
            }),
            latest_request: AtomicU64::new(0),
            listener: Mutex::new(None),
        }
    }

    /// 当前视图
    pub fn snapshot(&self) -> ListView {
        self.state.lock().clone()
    }

    /// 加载代码表并按路由参数激活列表
    pub async fn open(&self, params: PagingParams) -> LoadOutcome {
        let ((), outcome) = futures::join!(self.load_symbols(), self.activate(params));
        outcome
    }

    /// 路由激活：采用路由中的排序并加载路由指定的页
    ///
    /// 页码只在加载成功后生效，失败时分页控件仍停留在已显示的页
    pub async fn activate(&self, params: PagingParams) -> LoadOutcome {
        {
            let mut view = self.state.lock();
            view.paging.predicate = params.predicate;
            view.paging.ascending = params.ascending;
        }
        self.load_page(Some(params.page)).await
    }

    /// 加载指定页（从 1 开始），未指定时重新加载当前页
    pub async fn load_page(&self, page: Option<u32>) -> LoadOutcome {
        let (page_to_load, options, token) = {
            let mut view = self.state.lock();
            let page_to_load = page.unwrap_or(view.paging.page).max(1);
            view.paging.pagination_page = page_to_load;
            view.phase = LoadPhase::Loading;

            let options = QueryOptions::paged(
                page_to_load - 1,
                view.paging.items_per_page,
                view.paging.sort(),
            );
            let token = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
            (page_to_load, options, token)
        };

        let result = self.api.query(&options).await;

        if self.latest_request.load(Ordering::SeqCst) != token {
            log::debug!("第 {} 页的响应已过期，丢弃", page_to_load);
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                self.on_success(response, page_to_load, token);
                LoadOutcome::Loaded
            }
            Err(e) => {
                self.on_error(&e, token);
                LoadOutcome::Failed
            }
        }
    }

    fn on_success(&self, response: EntityArrayResponse<Aktien>, page: u32, token: u64) {
        let query = {
            let mut view = self.state.lock();
            // 持锁复查，避免与更新的请求交错写入
            if self.latest_request.load(Ordering::SeqCst) != token {
                return;
            }
            view.total_items = parse_total_count(&response.headers);
            view.paging.page = page;
            view.paging.pagination_page = page;
            view.aktiens = response.body;
            view.phase = LoadPhase::Loaded;

            vec![
                ("page", page.to_string()),
                ("size", view.paging.items_per_page.to_string()),
                ("sort", view.paging.sort_param()),
            ]
        };
        self.navigator.navigate(LIST_PATH, &query);
    }

    fn on_error(&self, error: &ClientError, token: u64) {
        let mut view = self.state.lock();
        if self.latest_request.load(Ordering::SeqCst) != token {
            return;
        }
        log::warn!("加载股票行情列表失败: {}", error);
        // 分页控件回到最近一次成功的页，已显示的记录保留
        view.paging.pagination_page = view.paging.page;
        view.phase = LoadPhase::Failed;
    }

    /// 加载股票代码表，失败时忽略
    pub async fn load_symbols(&self) {
        match self.api.query_symbols().await {
            Ok(symbols) => {
                log::debug!("加载股票代码 {} 个", symbols.len());
                self.state.lock().symbols = symbols;
            }
            Err(e) => log::debug!("加载股票代码失败: {}", e),
        }
    }

    /// 订阅列表变更事件，每条事件重新加载当前页
    pub fn register_change_in_aktiens(self: &Arc<Self>, bus: &EventBus) {
        let (guard, mut receiver) = bus.subscribe(Topic::AktienListModification).into_parts();
        let controller = Arc::downgrade(self);

        let task = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                log::debug!("收到 {:?}，重新加载当前页", event);
                controller.load_page(None).await;
            }
        });

        let previous = self.listener.lock().replace(ChangeListener {
            _guard: guard,
            task,
        });
        drop(previous);
        log::debug!(
            "已订阅列表变更，当前订阅数 {}",
            bus.subscriber_count(Topic::AktienListModification)
        );
    }

    /// 释放变更订阅
    pub fn teardown(&self) {
        let listener = self.listener.lock().take();
        if listener.is_some() {
            log::debug!("列表控制器已释放变更订阅");
        }
        drop(listener);
    }

    /// 打开删除对话框
    pub fn delete(&self, aktien: Aktien) -> DeleteDialogRef<A> {
        self.dialog.open(aktien)
    }
}
