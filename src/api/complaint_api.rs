// ==========================================
// 市政投诉工单系统 - 工单 API
// ==========================================
// 职责: 提交工单、查询工单、人工变更状态/优先级
// 红线: 所有校验在变更之前完成
// 红线: 状态变更必须经由 ComplaintStateMachine
// ==========================================

use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::{ActionLog, ActionType, ADMIN_ACTOR};
use crate::domain::complaint::{Complaint, ComplaintUpdate, GeoPoint, NewComplaint};
use crate::domain::types::Priority;
use crate::engine::state_machine::{ComplaintStateMachine, TransitionOutcome};
use crate::repository::action_log_repo::ActionLogRepository;
use crate::repository::complaint_repo::ComplaintRepository;

// ==========================================
// SubmitComplaintRequest - 提交工单入参
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitComplaintRequest {
    pub user_id: i64,
    pub complaint_type: String,
    pub priority: String,
    pub department: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ==========================================
// ComplaintApi - 工单 API
// ==========================================
pub struct ComplaintApi {
    complaint_repo: Arc<ComplaintRepository>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl ComplaintApi {
    pub fn new(
        complaint_repo: Arc<ComplaintRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            complaint_repo,
            action_log_repo,
        }
    }

    // ==========================================
    // 写入接口
    // ==========================================

    /// 提交工单（初始状态 Reported）
    ///
    /// # 返回
    /// - Ok(id): 新工单ID
    /// - Err(NotFound): 用户不存在
    /// - Err(InvalidParameter): 类别/部门为空、优先级无法识别、坐标不完整或越界
    pub fn submit_complaint(&self, req: SubmitComplaintRequest) -> ApiResult<i64> {
        let complaint_type = req.complaint_type.trim();
        if complaint_type.is_empty() {
            return Err(ApiError::InvalidParameter("类别不能为空".to_string()));
        }
        let department = req.department.trim();
        if department.is_empty() {
            return Err(ApiError::InvalidParameter("部门不能为空".to_string()));
        }
        let priority = Priority::parse(req.priority.trim()).ok_or_else(|| {
            ApiError::InvalidParameter(format!(
                "优先级无效: {}（应为 High/Medium/Low）",
                req.priority
            ))
        })?;
        let location = validate_location(req.latitude, req.longitude)?;

        if !self.complaint_repo.user_exists(req.user_id)? {
            return Err(ApiError::NotFound(format!("User(id={})不存在", req.user_id)));
        }

        let now = Local::now().naive_local();
        let new_complaint = NewComplaint {
            user_id: req.user_id,
            complaint_type: complaint_type.to_string(),
            description: non_blank(req.description),
            image_url: non_blank(req.image_url),
            department: department.to_string(),
            priority,
            location,
            reported_at: now,
        };
        let id = self.complaint_repo.insert(&new_complaint)?;

        info!(
            complaint_id = id,
            user_id = req.user_id,
            complaint_type = %new_complaint.complaint_type,
            "工单已提交"
        );
        self.record(vec![ActionLog::new(
            ActionType::Submit,
            &format!("user:{}", req.user_id),
            now,
            Some(id),
            Some(json!({
                "user_id": req.user_id,
                "type": new_complaint.complaint_type,
                "priority": new_complaint.priority.to_db_str(),
                "department": new_complaint.department,
            })),
            None,
        )]);

        Ok(id)
    }

    /// 人工变更状态和/或优先级
    ///
    /// 空白字符串视为未提供。
    ///
    /// # 返回
    /// - Ok(Complaint): 变更后的工单
    /// - Err(NoOp): 状态与优先级都未提供
    /// - Err(UnknownStatus): 状态不是五种之一
    /// - Err(InvalidParameter): 优先级不是 High/Medium/Low
    /// - Err(NotFound): 工单不存在
    /// - Err(InvalidTransition): 非法转换,或工单已 Resolved
    /// - Err(ConcurrentModification): 读取后状态被其他操作修改
    pub fn update_status(
        &self,
        complaint_id: i64,
        new_status: Option<&str>,
        new_priority: Option<&str>,
    ) -> ApiResult<Complaint> {
        let raw_status = new_status.map(str::trim).filter(|s| !s.is_empty());
        let raw_priority = new_priority.map(str::trim).filter(|s| !s.is_empty());

        if raw_status.is_none() && raw_priority.is_none() {
            return Err(ApiError::NoOp("状态与优先级均未提供".to_string()));
        }

        let status = raw_status
            .map(ComplaintStateMachine::parse_status)
            .transpose()?;
        let priority = raw_priority
            .map(|p| {
                Priority::parse(p).ok_or_else(|| {
                    ApiError::InvalidParameter(format!("优先级无效: {}（应为 High/Medium/Low）", p))
                })
            })
            .transpose()?;

        let mut complaint = self
            .complaint_repo
            .find_by_id(complaint_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Complaint(id={})不存在", complaint_id)))?;

        let expected_status = complaint.status;
        if expected_status.is_terminal() {
            return Err(ApiError::InvalidTransition {
                from: expected_status.to_string(),
                to: status.unwrap_or(expected_status).to_string(),
            });
        }

        let now = Local::now().naive_local();
        let mut status_changed = false;
        if let Some(status) = status {
            status_changed = ComplaintStateMachine::apply_transition(&mut complaint, status, now)?
                == TransitionOutcome::Applied;
        }
        let previous_priority = complaint.priority.clone();
        if let Some(priority) = priority.clone() {
            complaint.priority = priority;
        }

        let update = ComplaintUpdate {
            expected_status,
            complaint,
        };
        if !self.complaint_repo.persist(&update)? {
            warn!(complaint_id, expected_status = %expected_status, "人工变更冲突");
            return Err(ApiError::ConcurrentModification(format!(
                "Complaint(id={}) 状态已不是 {}",
                complaint_id, expected_status
            )));
        }
        let complaint = update.complaint;

        let mut logs = Vec::with_capacity(2);
        if let Some(status) = status.filter(|_| status_changed) {
            logs.push(ActionLog::new(
                ActionType::StatusUpdate,
                ADMIN_ACTOR,
                now,
                Some(complaint_id),
                Some(json!({ "from": expected_status.to_db_str(), "to": status.to_db_str() })),
                None,
            ));
        }
        if let Some(priority) = priority {
            logs.push(ActionLog::new(
                ActionType::PriorityUpdate,
                ADMIN_ACTOR,
                now,
                Some(complaint_id),
                Some(json!({
                    "from": previous_priority.to_db_str(),
                    "to": priority.to_db_str(),
                })),
                None,
            ));
        }
        self.record(logs);

        info!(
            complaint_id,
            status = %complaint.status,
            priority = %complaint.priority,
            "工单已更新"
        );
        Ok(complaint)
    }

    // ==========================================
    // 查询接口
    // ==========================================

    /// 按ID查询工单
    pub fn get_complaint(&self, complaint_id: i64) -> ApiResult<Complaint> {
        self.complaint_repo
            .find_by_id(complaint_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Complaint(id={})不存在", complaint_id)))
    }

    /// 查询用户提交的工单（新上报在前）
    pub fn list_user_complaints(&self, user_id: i64) -> ApiResult<Vec<Complaint>> {
        Ok(self.complaint_repo.list_by_user(user_id)?)
    }

    /// 查询全部工单（新上报在前,管理端总览）
    pub fn list_all_complaints(&self) -> ApiResult<Vec<Complaint>> {
        Ok(self.complaint_repo.list_all()?)
    }

    /// 写入操作日志,失败时只记录警告（不影响主要操作）
    fn record(&self, logs: Vec<ActionLog>) {
        if logs.is_empty() {
            return;
        }
        if let Err(e) = self.action_log_repo.batch_insert(logs) {
            warn!(error = %e, "记录操作日志失败");
        }
    }
}

/// 坐标必须成对出现,且为合法经纬度
fn validate_location(latitude: Option<f64>, longitude: Option<f64>) -> ApiResult<Option<GeoPoint>> {
    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(ApiError::InvalidParameter(format!("纬度越界: {}", lat)));
            }
            if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
                return Err(ApiError::InvalidParameter(format!("经度越界: {}", lng)));
            }
            Ok(Some(GeoPoint::new(lat, lng)))
        }
        _ => Err(ApiError::InvalidParameter(
            "经纬度必须同时提供或同时省略".to_string(),
        )),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
