// ==========================================
// 市政投诉工单系统 - 应用层
// ==========================================
// 职责: 装配仓储/引擎/API,供调度器与调用方使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
