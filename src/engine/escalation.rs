// ==========================================
// 市政投诉工单系统 - 自动升级引擎
// ==========================================
// 职责: 双触发升级（超时规则 + 聚集规则）
// 输入: 从存储读取的活跃工单
// 输出: 需要持久化的工单变更（带读取时状态,供比较并交换）
// 红线: Engine 不拼 SQL; 状态变更必须经由 ComplaintStateMachine
// 红线: 规则幂等,重复运行不会重复升级
// ==========================================

mod cluster;
mod temporal;

#[cfg(test)]
mod tests;

pub use cluster::ClusterRule;
pub use temporal::{TemporalRule, MAX_AGE_THRESHOLD_HOURS};

use crate::domain::complaint::{Complaint, ComplaintUpdate};
use crate::domain::types::ComplaintStatus;
use crate::engine::state_machine::{ComplaintStateMachine, TransitionError, TransitionOutcome};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, instrument};

/// 升级规则类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscalationRule {
    Temporal,
    Cluster,
}

impl fmt::Display for EscalationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscalationRule::Temporal => write!(f, "TEMPORAL"),
            EscalationRule::Cluster => write!(f, "CLUSTER"),
        }
    }
}

// ==========================================
// EscalationEngine - 自动升级引擎
// ==========================================
pub struct EscalationEngine {
    temporal: TemporalRule,
    cluster: ClusterRule,
}

impl EscalationEngine {
    pub fn new(temporal: TemporalRule, cluster: ClusterRule) -> Self {
        Self { temporal, cluster }
    }

    /// 替换超时阈值（单次调用指定 hours 时使用）
    pub fn with_temporal_rule(&self, temporal: TemporalRule) -> Self {
        Self {
            temporal,
            cluster: self.cluster.clone(),
        }
    }

    pub fn temporal_rule(&self) -> &TemporalRule {
        &self.temporal
    }

    pub fn cluster_rule(&self) -> &ClusterRule {
        &self.cluster
    }

    /// 超时规则: 选出逾期工单并升级
    #[instrument(skip(self, complaints), fields(count = complaints.len()))]
    pub fn run_temporal(
        &self,
        complaints: Vec<Complaint>,
        now: NaiveDateTime,
    ) -> Result<Vec<ComplaintUpdate>, TransitionError> {
        let selected: HashSet<i64> = self.temporal.select(&complaints, now).into_iter().collect();
        debug!(selected = selected.len(), "超时规则命中");
        escalate_selected(complaints, &selected, now)
    }

    /// 聚集规则: 选出聚集区内的工单并升级
    #[instrument(skip(self, complaints), fields(count = complaints.len()))]
    pub fn run_cluster(
        &self,
        complaints: Vec<Complaint>,
        now: NaiveDateTime,
    ) -> Result<Vec<ComplaintUpdate>, TransitionError> {
        let selected: HashSet<i64> = self.cluster.select(&complaints).into_iter().collect();
        debug!(selected = selected.len(), "聚集规则命中");
        escalate_selected(complaints, &selected, now)
    }
}

/// 对选中的工单执行 → Escalated
///
/// 已是 Escalated 的工单为空操作,不产生变更。
fn escalate_selected(
    complaints: Vec<Complaint>,
    selected: &HashSet<i64>,
    now: NaiveDateTime,
) -> Result<Vec<ComplaintUpdate>, TransitionError> {
    let mut updates = Vec::with_capacity(selected.len());
    for mut complaint in complaints {
        if !selected.contains(&complaint.id) {
            continue;
        }
        let expected_status = complaint.status;
        match ComplaintStateMachine::apply_transition(
            &mut complaint,
            ComplaintStatus::Escalated,
            now,
        )? {
            TransitionOutcome::Applied => updates.push(ComplaintUpdate {
                expected_status,
                complaint,
            }),
            TransitionOutcome::AlreadyEscalated => {}
        }
    }
    Ok(updates)
}
