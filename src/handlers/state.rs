//! 应用共享状态

use std::sync::Arc;

use url::Url;

use crate::services::aktien::AktienApi;
use crate::services::delete_dialog::DeleteDialog;
use crate::services::event_bus::EventBus;
use crate::services::list_controller::AktienListController;
use crate::services::navigation::UrlNavigator;

/// 处理器共享的状态
pub struct AppState<A> {
    pub api: Arc<A>,
    pub bus: EventBus,
    pub navigator: Arc<UrlNavigator>,
    pub controller: Arc<AktienListController<A>>,
}

impl<A: AktienApi + 'static> AppState<A> {
    /// 组装列表控制器及其协作者
    ///
    /// `public_url` 为本服务对外地址，导航 URL 以此为根
    pub fn new(api: Arc<A>, bus: EventBus, items_per_page: u32, public_url: Url) -> Self {
        let navigator = Arc::new(UrlNavigator::new(public_url));
        let dialog = DeleteDialog::new(api.clone(), bus.clone());
        let controller = Arc::new(AktienListController::new(
            api.clone(),
            navigator.clone(),
            dialog,
            items_per_page,
        ));

        Self {
            api,
            bus,
            navigator,
            controller,
        }
    }
}
