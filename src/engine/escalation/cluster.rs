use crate::domain::complaint::{Complaint, GeoPoint};
use crate::domain::types::ComplaintStatus;
use crate::engine::geo::haversine_km;
use std::collections::HashMap;

/// 默认聚集半径（km）
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 5.0;

/// 默认聚集阈值: 聚集规模（自身 + 邻居）超过该值即升级
pub const DEFAULT_NEIGHBOR_THRESHOLD: usize = 5;

// ==========================================
// ClusterRule - 聚集规则
// ==========================================
// 参与者: status = Reported 且有坐标
// 邻居: 同类型、距离 <= 半径（Haversine）
// 判定: 1 + 邻居数 > 阈值
//
// 同类型内两两比较,O(n²)。升级为低频批处理,可接受;
// 若改用网格/geohash 分桶,判定结果必须与两两比较完全一致。
#[derive(Debug, Clone)]
pub struct ClusterRule {
    radius_km: f64,
    neighbor_threshold: usize,
}

impl ClusterRule {
    pub fn new(radius_km: f64, neighbor_threshold: usize) -> Self {
        Self {
            radius_km,
            neighbor_threshold,
        }
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn neighbor_threshold(&self) -> usize {
        self.neighbor_threshold
    }

    /// 计算每个参与工单的聚集规模（含自身）
    pub fn cluster_sizes(&self, complaints: &[Complaint]) -> HashMap<i64, usize> {
        let mut by_type: HashMap<&str, Vec<(i64, GeoPoint)>> = HashMap::new();
        for complaint in complaints {
            if complaint.status != ComplaintStatus::Reported {
                continue;
            }
            if let Some(location) = complaint.location {
                by_type
                    .entry(complaint.complaint_type.as_str())
                    .or_default()
                    .push((complaint.id, location));
            }
        }

        let mut sizes = HashMap::new();
        for members in by_type.values() {
            let mut neighbors = vec![0usize; members.len()];
            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    if haversine_km(members[i].1, members[j].1) <= self.radius_km {
                        neighbors[i] += 1;
                        neighbors[j] += 1;
                    }
                }
            }
            for (idx, (id, _)) in members.iter().enumerate() {
                sizes.insert(*id, neighbors[idx] + 1);
            }
        }
        sizes
    }

    /// 返回命中的工单ID（升序）
    pub fn select(&self, complaints: &[Complaint]) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .cluster_sizes(complaints)
            .into_iter()
            .filter(|(_, size)| *size > self.neighbor_threshold)
            .map(|(id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for ClusterRule {
    fn default() -> Self {
        Self::new(DEFAULT_CLUSTER_RADIUS_KM, DEFAULT_NEIGHBOR_THRESHOLD)
    }
}
