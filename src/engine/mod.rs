// ==========================================
// 市政投诉工单系统 - 引擎层
// ==========================================
// 职责: 状态机、自动升级规则、地理计算与附近排序
// 红线: Engine 不拼 SQL, 只处理内存中的工单
// ==========================================

pub mod display;
pub mod escalation;
pub mod geo;
pub mod nearby;
pub mod state_machine;

// 重导出核心引擎
pub use display::{format_reported_time, format_waiting_time};
pub use escalation::{ClusterRule, EscalationEngine, EscalationRule, TemporalRule};
pub use geo::{haversine_km, BoundingBox};
pub use nearby::{NearbyRanker, RankedComplaint};
pub use state_machine::{ComplaintStateMachine, TransitionError, TransitionOutcome};
