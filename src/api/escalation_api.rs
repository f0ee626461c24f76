// ==========================================
// 市政投诉工单系统 - 自动升级 API
// ==========================================
// 职责: 读取活跃工单 → EscalationEngine → 单事务持久化 → 审计
// 红线: 比较并交换写入,并发批次互不覆盖
// 红线: 没有升级任何工单时不写操作日志
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::{ActionLog, ActionType, SYSTEM_ACTOR};
use crate::domain::complaint::{ComplaintUpdate, EscalatedComplaint, HeatmapPoint};
use crate::domain::types::ComplaintStatus;
use crate::engine::escalation::{
    EscalationEngine, EscalationRule, TemporalRule, MAX_AGE_THRESHOLD_HOURS,
};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::complaint_repo::ComplaintRepository;

/// 自动升级候选集排除的状态
const ESCALATION_EXCLUSIONS: [ComplaintStatus; 2] =
    [ComplaintStatus::Resolved, ComplaintStatus::Escalated];

/// 升级列表返回的条数
pub const ESCALATION_LIST_LIMIT: usize = 10;

// ==========================================
// EscalationReport - 单规则运行结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationReport {
    pub rule: EscalationRule,
    pub candidates: usize,        // 读取的活跃工单数
    pub escalated_ids: Vec<i64>,  // 实际写入的工单
    pub skipped: usize,           // 被并发修改而跳过的工单
}

impl EscalationReport {
    pub fn escalated_count(&self) -> usize {
        self.escalated_ids.len()
    }
}

/// 两条规则依次运行的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoEscalationReport {
    pub temporal: EscalationReport,
    pub cluster: EscalationReport,
}

// ==========================================
// EscalationApi - 自动升级 API
// ==========================================
pub struct EscalationApi {
    complaint_repo: Arc<ComplaintRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    engine: EscalationEngine,
}

impl EscalationApi {
    pub fn new(
        complaint_repo: Arc<ComplaintRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        engine: EscalationEngine,
    ) -> Self {
        Self {
            complaint_repo,
            action_log_repo,
            engine,
        }
    }

    // ==========================================
    // 触发接口
    // ==========================================

    /// 超时升级
    ///
    /// # 参数
    /// - age_threshold_hours: 本次使用的阈值;None 时使用配置值
    ///
    /// # 返回
    /// - Err(InvalidParameter): 阈值不在 (0, MAX_AGE_THRESHOLD_HOURS] 之内
    pub fn escalate_overdue(
        &self,
        age_threshold_hours: Option<i64>,
    ) -> ApiResult<EscalationReport> {
        self.escalate_overdue_at(age_threshold_hours, Local::now().naive_local())
    }

    pub fn escalate_overdue_at(
        &self,
        age_threshold_hours: Option<i64>,
        now: NaiveDateTime,
    ) -> ApiResult<EscalationReport> {
        let overridden;
        let engine = match age_threshold_hours {
            Some(hours) => {
                let rule = TemporalRule::try_from_hours(hours).ok_or_else(|| {
                    ApiError::InvalidParameter(format!(
                        "超时阈值必须在 (0, {}] 小时之间: {}",
                        MAX_AGE_THRESHOLD_HOURS, hours
                    ))
                })?;
                overridden = self.engine.with_temporal_rule(rule);
                &overridden
            }
            None => &self.engine,
        };

        let complaints = self.complaint_repo.fetch_active(&ESCALATION_EXCLUSIONS)?;
        let candidates = complaints.len();
        let updates = engine.run_temporal(complaints, now)?;

        self.persist_and_record(
            EscalationRule::Temporal,
            candidates,
            updates,
            now,
            json!({ "age_threshold_hours": engine.temporal_rule().age_threshold().num_hours() }),
        )
    }

    /// 聚集升级
    pub fn run_cluster_escalation(&self) -> ApiResult<EscalationReport> {
        self.run_cluster_escalation_at(Local::now().naive_local())
    }

    pub fn run_cluster_escalation_at(&self, now: NaiveDateTime) -> ApiResult<EscalationReport> {
        let complaints = self.complaint_repo.fetch_active(&ESCALATION_EXCLUSIONS)?;
        let candidates = complaints.len();
        let updates = self.engine.run_cluster(complaints, now)?;

        let rule = self.engine.cluster_rule();
        self.persist_and_record(
            EscalationRule::Cluster,
            candidates,
            updates,
            now,
            json!({
                "radius_km": rule.radius_km(),
                "neighbor_threshold": rule.neighbor_threshold(),
            }),
        )
    }

    /// 依次运行超时规则与聚集规则（使用配置阈值）
    pub fn run_auto_escalation(&self) -> ApiResult<AutoEscalationReport> {
        self.run_auto_escalation_at(Local::now().naive_local())
    }

    pub fn run_auto_escalation_at(&self, now: NaiveDateTime) -> ApiResult<AutoEscalationReport> {
        let temporal = self.escalate_overdue_at(None, now)?;
        let cluster = self.run_cluster_escalation_at(now)?;
        Ok(AutoEscalationReport { temporal, cluster })
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 最近升级的工单（最近升级在前,最多 ESCALATION_LIST_LIMIT 条）
    pub fn list_escalations(&self) -> ApiResult<Vec<EscalatedComplaint>> {
        Ok(self.complaint_repo.list_escalated(ESCALATION_LIST_LIMIT)?)
    }

    /// 热力图坐标
    pub fn heatmap_points(&self) -> ApiResult<Vec<HeatmapPoint>> {
        Ok(self.complaint_repo.heatmap_points()?)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn persist_and_record(
        &self,
        rule: EscalationRule,
        candidates: usize,
        updates: Vec<ComplaintUpdate>,
        now: NaiveDateTime,
        params: serde_json::Value,
    ) -> ApiResult<EscalationReport> {
        let selected = updates.len();
        let escalated_ids = if updates.is_empty() {
            Vec::new()
        } else {
            self.complaint_repo.persist_batch(&updates)?
        };
        let skipped = selected - escalated_ids.len();

        info!(
            rule = %rule,
            candidates,
            escalated_count = escalated_ids.len(),
            skipped,
            "自动升级完成"
        );

        if !escalated_ids.is_empty() {
            let action_type = match rule {
                EscalationRule::Temporal => ActionType::TemporalEscalation,
                EscalationRule::Cluster => ActionType::ClusterEscalation,
            };
            let log = ActionLog::new(
                action_type,
                SYSTEM_ACTOR,
                now,
                None,
                Some(json!({ "complaint_ids": escalated_ids, "params": params })),
                Some(format!("{} 规则升级 {} 条工单", rule, escalated_ids.len())),
            );
            if let Err(e) = self.action_log_repo.insert(&log) {
                warn!(error = %e, "记录操作日志失败");
            }
        }

        Ok(EscalationReport {
            rule,
            candidates,
            escalated_ids,
            skipped,
        })
    }
}
