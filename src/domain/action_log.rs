// ==========================================
// 市政投诉工单系统 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录
// 用途: 审计追踪（人工变更 + 自动升级）
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,          // 日志ID（UUID）
    pub action_type: String,        // 操作类型（ActionType::as_str）
    pub action_ts: NaiveDateTime,   // 操作时间
    pub actor: String,              // 操作人（admin / system）
    pub complaint_id: Option<i64>,  // 单条操作关联工单（批量操作为空）
    pub payload_json: Option<JsonValue>, // 操作参数与影响范围
    pub detail: Option<String>,     // 详细描述
}

impl ActionLog {
    /// 创建一条新的日志（自动生成 action_id）
    pub fn new(
        action_type: ActionType,
        actor: &str,
        action_ts: NaiveDateTime,
        complaint_id: Option<i64>,
        payload_json: Option<JsonValue>,
        detail: Option<String>,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            action_ts,
            actor: actor.to_string(),
            complaint_id,
            payload_json,
            detail,
        }
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    Submit,             // 提交工单
    StatusUpdate,       // 人工变更状态
    PriorityUpdate,     // 人工变更优先级
    TemporalEscalation, // 超时自动升级
    ClusterEscalation,  // 聚集自动升级
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Submit => "Submit",
            ActionType::StatusUpdate => "StatusUpdate",
            ActionType::PriorityUpdate => "PriorityUpdate",
            ActionType::TemporalEscalation => "TemporalEscalation",
            ActionType::ClusterEscalation => "ClusterEscalation",
        }
    }
}

/// 系统自动操作的 actor 标识
pub const SYSTEM_ACTOR: &str = "system";

/// 管理员人工操作的 actor 标识
pub const ADMIN_ACTOR: &str = "admin";
