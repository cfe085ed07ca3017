//! 删除确认对话框
//!
//! 列表只负责打开对话框；确认后由对话框执行删除并发布列表变更事件，
//! 列表通过事件刷新，不做乐观更新

use std::sync::Arc;

use crate::models::Aktien;
use crate::services::aktien::{AktienApi, ClientError};
use crate::services::event_bus::{Event, EventBus, ListModification};

/// 对话框结果
#[derive(Debug)]
pub enum DialogResult {
    /// 已删除
    Deleted(i64),
    /// 用户取消
    Dismissed,
    /// 删除失败
    Failed(ClientError),
}

/// 删除对话框工厂
pub struct DeleteDialog<A> {
    api: Arc<A>,
    bus: EventBus,
}

impl<A> Clone for DeleteDialog<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            bus: self.bus.clone(),
        }
    }
}

impl<A: AktienApi> DeleteDialog<A> {
    pub fn new(api: Arc<A>, bus: EventBus) -> Self {
        Self { api, bus }
    }

    /// 打开对话框，附带待删除记录
    pub fn open(&self, aktien: Aktien) -> DeleteDialogRef<A> {
        log::debug!("打开删除对话框: {:?}", aktien.id);
        DeleteDialogRef {
            aktien,
            api: self.api.clone(),
            bus: self.bus.clone(),
        }
    }
}

/// 已打开的对话框，确认或取消后即关闭
pub struct DeleteDialogRef<A> {
    aktien: Aktien,
    api: Arc<A>,
    bus: EventBus,
}

impl<A: AktienApi> DeleteDialogRef<A> {
    pub fn aktien(&self) -> &Aktien {
        &self.aktien
    }

    /// 确认删除
    pub async fn confirm(self) -> DialogResult {
        let Some(id) = self.aktien.id else {
            return DialogResult::Failed(ClientError::MissingId);
        };

        match self.api.delete(id).await {
            Ok(()) => {
                self.bus
                    .publish(Event::AktienListModification(ListModification::Deleted(id)));
                DialogResult::Deleted(id)
            }
            Err(e) => {
                log::warn!("删除股票行情 {} 失败: {}", id, e);
                DialogResult::Failed(e)
            }
        }
    }

    /// 取消
    pub fn dismiss(self) -> DialogResult {
        DialogResult::Dismissed
    }
}
