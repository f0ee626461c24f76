// ==========================================
// 市政投诉工单系统 - 投诉生命周期状态机
// ==========================================
// 职责: 校验并执行状态转换,首次进入某状态时打时间戳
// 红线: Resolved 为终态,不允许任何后续变更
// 红线: 时间戳一经写入不可覆盖
// ==========================================

use crate::domain::complaint::Complaint;
use crate::domain::types::ComplaintStatus;
use chrono::NaiveDateTime;
use thiserror::Error;

/// 状态转换错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("无效的状态转换: from={from} to={to}")]
    InvalidTransition { from: String, to: String },

    #[error("未知状态: {0}")]
    UnknownStatus(String),
}

/// 转换结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// 状态已变更
    Applied,
    /// 已升级的工单再次升级: 视为空操作（容忍并发的升级批次）
    AlreadyEscalated,
}

// ==========================================
// ComplaintStateMachine
// ==========================================
pub struct ComplaintStateMachine;

impl ComplaintStateMachine {
    /// 转换是否合法
    ///
    /// 规则:
    /// - Resolved 为终态,没有出边
    /// - 任何状态都不能回到 Reported
    /// - 目标状态不能等于当前状态（Escalated → Escalated 由 apply 特殊处理）
    pub fn can_transition(from: ComplaintStatus, to: ComplaintStatus) -> bool {
        !from.is_terminal() && to != ComplaintStatus::Reported && from != to
    }

    /// 解析边界传入的状态字符串
    pub fn parse_status(raw: &str) -> Result<ComplaintStatus, TransitionError> {
        ComplaintStatus::parse(raw).ok_or_else(|| TransitionError::UnknownStatus(raw.to_string()))
    }

    /// 执行状态转换（原地修改）
    ///
    /// 成功时设置 status,并在对应时间戳为空时写入 now。
    pub fn apply_transition(
        complaint: &mut Complaint,
        new_status: ComplaintStatus,
        now: NaiveDateTime,
    ) -> Result<TransitionOutcome, TransitionError> {
        let current = complaint.status;

        if current == ComplaintStatus::Escalated && new_status == ComplaintStatus::Escalated {
            return Ok(TransitionOutcome::AlreadyEscalated);
        }

        if !Self::can_transition(current, new_status) {
            return Err(TransitionError::InvalidTransition {
                from: current.to_string(),
                to: new_status.to_string(),
            });
        }

        let slot = match new_status {
            ComplaintStatus::Acknowledged => &mut complaint.acknowledged_at,
            ComplaintStatus::InProgress => &mut complaint.in_progress_at,
            ComplaintStatus::Resolved => &mut complaint.resolved_at,
            ComplaintStatus::Escalated => &mut complaint.escalated_at,
            ComplaintStatus::Reported => {
                return Err(TransitionError::InvalidTransition {
                    from: current.to_string(),
                    to: new_status.to_string(),
                })
            }
        };
        if slot.is_none() {
            *slot = Some(now);
        }
        complaint.status = new_status;

        Ok(TransitionOutcome::Applied)
    }
}
