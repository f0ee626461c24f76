// ==========================================
// 市政投诉工单系统 - API 层
// ==========================================
// 职责: 请求边界（参数校验、错误映射、审计日志）
// ==========================================

pub mod complaint_api;
pub mod error;
pub mod escalation_api;
pub mod nearby_api;

// 重导出核心类型
pub use complaint_api::{ComplaintApi, SubmitComplaintRequest};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use escalation_api::{AutoEscalationReport, EscalationApi, EscalationReport};
pub use nearby_api::{NearbyApi, NearbyItem, NearbyQuery, NearbyResponse};
