// ==========================================
// 市政投诉工单系统 - 附近投诉排序
// ==========================================
// 职责: 外接矩形候选 → 精确距离过滤 → 按优先级排序 → 截断
// 输入: 存储按外接矩形返回的候选（按上报时间倒序）
// 输出: 带距离的排序结果
// 红线: 只按优先级排序,距离/时间不作为次级排序键
// ==========================================

use crate::domain::complaint::{Complaint, GeoPoint};
use crate::engine::geo::{haversine_km, BoundingBox};
use serde::{Deserialize, Serialize};

/// 展示条数上限（与请求的 limit 取小）
pub const DISPLAY_CAP: usize = 5;

/// 搜索半径上限（km）
pub const MAX_RADIUS_KM: f64 = 50.0;

/// 请求条数上限
pub const MAX_LIMIT: usize = 200;

/// 排序后的单条结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedComplaint {
    pub complaint: Complaint,
    pub distance_km: f64,
}

// ==========================================
// NearbyRanker - 附近投诉排序器
// ==========================================
pub struct NearbyRanker {
    // 无状态
}

impl NearbyRanker {
    pub fn new() -> Self {
        Self {}
    }

    /// 查询用的外接矩形
    pub fn bounding_box(&self, center: GeoPoint, radius_km: f64) -> BoundingBox {
        BoundingBox::around(center, radius_km)
    }

    /// 过滤 + 排序 + 截断
    ///
    /// 1) 无坐标或距离 > radius 的候选丢弃（矩形只是超集）
    /// 2) 稳定排序: High < Medium < Low < 未识别
    ///    同优先级保持候选原有顺序（存储按上报时间倒序返回）
    /// 3) 截断到 min(DISPLAY_CAP, limit)
    pub fn rank(
        &self,
        center: GeoPoint,
        radius_km: f64,
        limit: usize,
        candidates: Vec<Complaint>,
    ) -> Vec<RankedComplaint> {
        let mut survivors: Vec<RankedComplaint> = candidates
            .into_iter()
            .filter_map(|complaint| {
                let location = complaint.location?;
                let distance_km = haversine_km(center, location);
                (distance_km <= radius_km).then_some(RankedComplaint {
                    complaint,
                    distance_km,
                })
            })
            .collect();

        survivors.sort_by_key(|r| r.complaint.priority.rank_weight());
        survivors.truncate(DISPLAY_CAP.min(limit));
        survivors
    }
}

impl Default for NearbyRanker {
    fn default() -> Self {
        Self::new()
    }
}
