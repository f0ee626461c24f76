// ==========================================
// 市政投诉工单系统 - 投诉数据仓储
// ==========================================
// 对齐: complaints 表
// 红线: Repository 不含业务逻辑,只做数据映射
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

mod core;
mod queries;


pub use core::ComplaintRepository;

/// 时间戳存储格式（与 action_log 一致）
pub(crate) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// complaints 表查询列（顺序与 core::map_complaint_row 对齐）
pub(crate) const COMPLAINT_COLUMNS: &str = r#"
    id, user_id, type, description, image_url, status, priority, department,
    latitude, longitude, reported_at, acknowledged_at, in_progress_at,
    resolved_at, escalated_at
"#;
