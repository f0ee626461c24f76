use crate::domain::complaint::Complaint;
use crate::domain::types::ComplaintStatus;
use chrono::{Duration, NaiveDateTime};

/// 默认超时阈值（小时）
pub const DEFAULT_AGE_THRESHOLD_HOURS: i64 = 24;

/// 超时阈值上限（小时,约 100 年）
pub const MAX_AGE_THRESHOLD_HOURS: i64 = 24 * 365 * 100;

// ==========================================
// TemporalRule - 超时规则
// ==========================================
// 条件: status ∉ {Resolved, Escalated} 且 reported_at <= now - 阈值
// 已升级的工单在筛选阶段即被排除,重复运行结果不变
#[derive(Debug, Clone)]
pub struct TemporalRule {
    age_threshold: Duration,
}

impl TemporalRule {
    pub fn new(age_threshold: Duration) -> Self {
        Self { age_threshold }
    }

    /// 按小时构造,阈值不在 (0, MAX_AGE_THRESHOLD_HOURS] 时返回 None
    pub fn try_from_hours(hours: i64) -> Option<Self> {
        if hours <= 0 || hours > MAX_AGE_THRESHOLD_HOURS {
            return None;
        }
        Duration::try_hours(hours).map(Self::new)
    }

    pub fn age_threshold(&self) -> Duration {
        self.age_threshold
    }

    /// 单条判定
    ///
    /// now - 阈值 超出可表示的时间范围时,没有工单能早于该时刻,视为未逾期。
    pub fn is_overdue(&self, complaint: &Complaint, now: NaiveDateTime) -> bool {
        if matches!(
            complaint.status,
            ComplaintStatus::Resolved | ComplaintStatus::Escalated
        ) {
            return false;
        }
        match now.checked_sub_signed(self.age_threshold) {
            Some(cutoff) => complaint.reported_at <= cutoff,
            None => false,
        }
    }

    /// 返回命中的工单ID
    pub fn select(&self, complaints: &[Complaint], now: NaiveDateTime) -> Vec<i64> {
        complaints
            .iter()
            .filter(|c| self.is_overdue(c, now))
            .map(|c| c.id)
            .collect()
    }
}

impl Default for TemporalRule {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_AGE_THRESHOLD_HOURS))
    }
}
