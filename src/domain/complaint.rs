// ==========================================
// 市政投诉工单系统 - 投诉领域模型
// ==========================================
// 对齐: complaints 表
// 红线: 状态只能经由 ComplaintStateMachine 变更
// ==========================================

use crate::domain::types::{ComplaintStatus, Priority};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// GeoPoint - 经纬度坐标
// ==========================================
// 红线: 经纬度要么同时存在,要么同时缺失
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// 由可空的两列组合坐标（任一缺失则视为无坐标）
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lng)) => Some(Self::new(lat, lng)),
            _ => None,
        }
    }
}

// ==========================================
// Complaint - 投诉工单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    // ===== 主键与归属 =====
    pub id: i64,      // 工单ID（不可变）
    pub user_id: i64, // 上报用户（外部所有）

    // ===== 分类信息 =====
    pub complaint_type: String,       // 类别标签（pothole / garbage ...）
    pub description: Option<String>,  // 描述
    pub image_url: Option<String>,    // 图片地址
    pub department: String,           // 责任部门
    pub priority: Priority,           // 优先级

    // ===== 状态 =====
    pub status: ComplaintStatus,

    // ===== 位置 =====
    pub location: Option<GeoPoint>, // 无坐标的工单不参与地理计算

    // ===== 时间戳 =====
    pub reported_at: NaiveDateTime,             // 上报时间（不可变）
    pub acknowledged_at: Option<NaiveDateTime>, // 首次受理
    pub in_progress_at: Option<NaiveDateTime>,  // 首次进入处理中
    pub resolved_at: Option<NaiveDateTime>,     // 解决时间
    pub escalated_at: Option<NaiveDateTime>,    // 首次升级
}

// ==========================================
// ComplaintUpdate - 待持久化的变更
// ==========================================
// expected_status: 读取时的状态,写入时做比较并交换（并发批次互不覆盖）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintUpdate {
    pub expected_status: ComplaintStatus,
    pub complaint: Complaint,
}

// ==========================================
// NewComplaint - 新建工单入参
// ==========================================
// 用途: 提交接口 → 仓储插入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComplaint {
    pub user_id: i64,
    pub complaint_type: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub department: String,
    pub priority: Priority,
    pub location: Option<GeoPoint>,
    pub reported_at: NaiveDateTime,
}

// ==========================================
// EscalatedComplaint - 升级列表视图
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalatedComplaint {
    pub id: i64,
    pub complaint_type: String,
    pub priority: String,
    pub department: String,
    pub escalated_at: Option<NaiveDateTime>,
}

/// 热力图坐标点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapPoint {
    pub lat: f64,
    pub lng: f64,
}
