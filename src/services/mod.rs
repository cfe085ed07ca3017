//! 业务逻辑服务模块
//!
//! 封装后端数据访问、列表状态和组件间通信

pub mod aktien;           // 股票行情数据访问
pub mod delete_dialog;    // 删除确认
pub mod event_bus;        // 事件总线
pub mod list_controller;  // 列表控制器
pub mod navigation;       // URL 导航

#[cfg(test)]
pub mod testing;
