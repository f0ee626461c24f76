// ==========================================
// 市政投诉工单系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod complaint;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType, ADMIN_ACTOR, SYSTEM_ACTOR};
pub use complaint::{
    Complaint, ComplaintUpdate, EscalatedComplaint, GeoPoint, HeatmapPoint, NewComplaint,
};
pub use types::{ComplaintStatus, Priority};
