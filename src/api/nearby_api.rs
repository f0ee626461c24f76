// ==========================================
// 市政投诉工单系统 - 附近投诉 API
// ==========================================
// 职责: 参数校验 → 外接矩形候选 → NearbyRanker 排序 → 展示字段
// 红线: 只读,不修改任何工单
// ==========================================

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::{DEFAULT_NEARBY_LIMIT, DEFAULT_NEARBY_RADIUS_KM};
use crate::domain::complaint::GeoPoint;
use crate::engine::display::{format_reported_time, format_waiting_time};
use crate::engine::nearby::{NearbyRanker, RankedComplaint, MAX_LIMIT, MAX_RADIUS_KM};
use crate::repository::complaint_repo::ComplaintRepository;

// ==========================================
// NearbyQuery - 查询参数
// ==========================================
// 未提供的字段使用 NearbyApi 的默认值;查询坐标本身不做校验
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
    pub limit: Option<i64>,
    pub only_unresolved: Option<bool>,
}

impl NearbyQuery {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            ..Self::default()
        }
    }
}

/// 单条展示结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyItem {
    pub id: i64,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub complaint_type: String,
    pub department: String,
    pub priority: String,
    pub current_status: String,
    pub reported_time: String,
    pub waiting_time: String,
    pub distance_km: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// 查询响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub items: Vec<NearbyItem>,
    pub count: usize,
}

// ==========================================
// NearbyApi - 附近投诉 API
// ==========================================
pub struct NearbyApi {
    complaint_repo: Arc<ComplaintRepository>,
    ranker: NearbyRanker,
    default_radius_km: f64,
    default_limit: usize,
}

impl NearbyApi {
    pub fn new(complaint_repo: Arc<ComplaintRepository>) -> Self {
        Self::with_defaults(complaint_repo, DEFAULT_NEARBY_RADIUS_KM, DEFAULT_NEARBY_LIMIT)
    }

    /// 使用配置的默认半径/条数创建
    pub fn with_defaults(
        complaint_repo: Arc<ComplaintRepository>,
        default_radius_km: f64,
        default_limit: usize,
    ) -> Self {
        Self {
            complaint_repo,
            ranker: NearbyRanker::new(),
            default_radius_km,
            default_limit,
        }
    }

    /// 查询附近投诉（按当前本地时间计算等待时长）
    pub fn rank_nearby(&self, query: &NearbyQuery) -> ApiResult<NearbyResponse> {
        self.rank_nearby_at(query, Local::now().naive_local())
    }

    /// 查询附近投诉
    ///
    /// # 返回
    /// - Err(InvalidParameter): radius 不在 (0, 50] 或 limit 不在 [1, 200]
    pub fn rank_nearby_at(
        &self,
        query: &NearbyQuery,
        now: NaiveDateTime,
    ) -> ApiResult<NearbyResponse> {
        let radius_km = query.radius_km.unwrap_or(self.default_radius_km);
        // NaN 比较恒为 false,同样落入错误分支
        if !(radius_km > 0.0 && radius_km <= MAX_RADIUS_KM) {
            return Err(ApiError::InvalidParameter(format!(
                "半径必须在 (0, {}] km 之间: {}",
                MAX_RADIUS_KM, radius_km
            )));
        }

        let limit = query.limit.unwrap_or(self.default_limit as i64);
        if limit < 1 || limit > MAX_LIMIT as i64 {
            return Err(ApiError::InvalidParameter(format!(
                "limit 必须在 [1, {}] 之间: {}",
                MAX_LIMIT, limit
            )));
        }
        let only_unresolved = query.only_unresolved.unwrap_or(true);

        let center = GeoPoint::new(query.latitude, query.longitude);
        let bbox = self.ranker.bounding_box(center, radius_km);
        let candidates = self
            .complaint_repo
            .fetch_by_bounding_box(&bbox, only_unresolved)?;
        let candidate_count = candidates.len();

        let ranked = self
            .ranker
            .rank(center, radius_km, limit as usize, candidates);
        debug!(
            candidates = candidate_count,
            returned = ranked.len(),
            radius_km,
            "附近投诉查询完成"
        );

        let items: Vec<NearbyItem> = ranked
            .into_iter()
            .filter_map(|r| to_item(r, now))
            .collect();
        let count = items.len();
        Ok(NearbyResponse { items, count })
    }
}

fn to_item(ranked: RankedComplaint, now: NaiveDateTime) -> Option<NearbyItem> {
    let RankedComplaint {
        complaint,
        distance_km,
    } = ranked;
    let location = complaint.location?;
    Some(NearbyItem {
        id: complaint.id,
        reported_time: format_reported_time(complaint.reported_at),
        waiting_time: format_waiting_time(complaint.reported_at, now),
        description: complaint.description,
        complaint_type: complaint.complaint_type,
        department: complaint.department,
        priority: complaint.priority.to_db_str().to_string(),
        current_status: complaint.status.to_db_str().to_string(),
        distance_km,
        latitude: location.latitude,
        longitude: location.longitude,
    })
}
