// ==========================================
// 市政投诉工单系统 - 领域类型定义
// ==========================================
// 职责: 投诉状态（封闭枚举）与优先级
// 红线: 状态只能是五个已知值之一,禁止落库未知状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 投诉状态 (Complaint Status)
// ==========================================
// 序列化格式: 与数据库一致 (Reported / InProgress ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Reported,     // 已上报
    Acknowledged, // 已受理
    InProgress,   // 处理中
    Resolved,     // 已解决（终态）
    Escalated,    // 已升级
}

impl ComplaintStatus {
    /// 全部状态
    pub const ALL: [ComplaintStatus; 5] = [
        ComplaintStatus::Reported,
        ComplaintStatus::Acknowledged,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Escalated,
    ];

    /// 从字符串解析状态（严格匹配,未知值返回 None）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Reported" => Some(ComplaintStatus::Reported),
            "Acknowledged" => Some(ComplaintStatus::Acknowledged),
            "InProgress" => Some(ComplaintStatus::InProgress),
            "Resolved" => Some(ComplaintStatus::Resolved),
            "Escalated" => Some(ComplaintStatus::Escalated),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Reported => "Reported",
            ComplaintStatus::Acknowledged => "Acknowledged",
            ComplaintStatus::InProgress => "InProgress",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Escalated => "Escalated",
        }
    }

    /// 是否终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, ComplaintStatus::Resolved)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 优先级 (Priority)
// ==========================================
// 排序权重: High(1) < Medium(2) < Low(3) < 未识别(9)
// 库中历史数据可能存在未识别的取值,原样保留在 Other 中
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
    Other(String),
}

impl Priority {
    /// 从库中读取（宽松）: 未识别的值保留原文
    pub fn from_db_str(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| Priority::Other(s.to_string()))
    }

    /// 从外部输入解析（严格）: 只接受 High / Medium / Low
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "High" => Some(Priority::High),
            "Medium" => Some(Priority::Medium),
            "Low" => Some(Priority::Low),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Other(raw) => raw.as_str(),
        }
    }

    /// 排序权重（越小越靠前）
    pub fn rank_weight(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
            Priority::Other(_) => 9,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
