// ==========================================
// 市政投诉工单系统 - 地理计算
// ==========================================
// 职责: 球面距离（Haversine） + 外接矩形预筛选
// 红线: 纯函数,不访问存储
// ==========================================

use crate::domain::complaint::GeoPoint;
use serde::{Deserialize, Serialize};

/// 地球半径（km）,固定常量
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// 每纬度约对应的公里数（外接矩形用,略小于真实值以保证只多选不漏选）
pub const KM_PER_DEGREE: f64 = 111.0;

/// 经度跨度计算时 cos(纬度) 的下限
pub const MIN_LNG_COS: f64 = 0.2;

// ==========================================
// DistanceCalculator - 球面距离
// ==========================================

/// Haversine 大圆距离（km）
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // 浮点误差可能让 h 略超 1
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

// ==========================================
// BoundingBoxFilter - 外接矩形预筛选
// ==========================================
// 矩形外接于搜索圆: 只允许多选,不允许漏选
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// 围绕中心点构造外接矩形
    ///
    /// - 纬度跨度: radius / 111.0
    /// - 经度跨度: radius / (111.0 * max(0.2, cos(lat)))
    ///
    /// cos 下限生效（高纬度）、矩形跨越 ±180° 经线或覆盖极点时,
    /// 按上述公式会漏选,此时经度放宽到全范围。
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE;
        let cos_lat = center.latitude.to_radians().cos();
        let lng_delta = radius_km / (KM_PER_DEGREE * cos_lat.max(MIN_LNG_COS));

        let min_lat = center.latitude - lat_delta;
        let max_lat = center.latitude + lat_delta;
        let mut min_lng = center.longitude - lng_delta;
        let mut max_lng = center.longitude + lng_delta;

        let clamp_active = cos_lat < MIN_LNG_COS;
        let covers_pole = min_lat <= -90.0 || max_lat >= 90.0;
        let crosses_antimeridian = min_lng < -180.0 || max_lng > 180.0;
        if clamp_active || covers_pole || crosses_antimeridian {
            min_lng = -180.0;
            max_lng = 180.0;
        }

        Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }

    /// 点是否落在矩形内（闭区间,与 SQL BETWEEN 一致）
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.latitude >= self.min_lat
            && point.latitude <= self.max_lat
            && point.longitude >= self.min_lng
            && point.longitude <= self.max_lng
    }
}
