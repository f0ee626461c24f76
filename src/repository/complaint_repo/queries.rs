use super::core::{map_complaint_row, parse_opt_ts, ComplaintRepository};
use super::COMPLAINT_COLUMNS;
use crate::domain::complaint::{Complaint, EscalatedComplaint, HeatmapPoint};
use crate::domain::types::ComplaintStatus;
use crate::engine::geo::BoundingBox;
use crate::repository::error::RepositoryResult;
use rusqlite::{params, params_from_iter, Result as SqliteResult};

impl ComplaintRepository {
    // ==========================================
    // 引擎候选集查询
    // ==========================================

    /// 查询不处于排除状态的全部工单
    ///
    /// 自动升级使用: exclusions = [Resolved, Escalated]
    pub fn fetch_active(&self, exclusions: &[ComplaintStatus]) -> RepositoryResult<Vec<Complaint>> {
        let conn = self.get_conn()?;

        let mut sql = format!("SELECT {} FROM complaints", COMPLAINT_COLUMNS);
        if !exclusions.is_empty() {
            let placeholders = vec!["?"; exclusions.len()].join(", ");
            sql.push_str(&format!(" WHERE status NOT IN ({})", placeholders));
        }
        sql.push_str(" ORDER BY reported_at ASC, id ASC");

        let params: Vec<&str> = exclusions.iter().map(|s| s.to_db_str()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let complaints = stmt
            .query_map(params_from_iter(params.iter()), map_complaint_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(complaints)
    }

    /// 按外接矩形粗筛有坐标的工单（新上报在前）
    ///
    /// 矩形只做预过滤,精确距离由 NearbyRanker 计算。
    pub fn fetch_by_bounding_box(
        &self,
        bbox: &BoundingBox,
        exclude_resolved: bool,
    ) -> RepositoryResult<Vec<Complaint>> {
        let conn = self.get_conn()?;

        let mut sql = format!(
            r#"
            SELECT {}
            FROM complaints
            WHERE latitude IS NOT NULL AND longitude IS NOT NULL
              AND latitude BETWEEN ?1 AND ?2
              AND longitude BETWEEN ?3 AND ?4
            "#,
            COMPLAINT_COLUMNS
        );
        if exclude_resolved {
            sql.push_str(" AND status != ?5");
        }
        sql.push_str(" ORDER BY reported_at DESC, id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = if exclude_resolved {
            stmt.query_map(
                params![
                    bbox.min_lat,
                    bbox.max_lat,
                    bbox.min_lng,
                    bbox.max_lng,
                    ComplaintStatus::Resolved.to_db_str(),
                ],
                map_complaint_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?
        } else {
            stmt.query_map(
                params![bbox.min_lat, bbox.max_lat, bbox.min_lng, bbox.max_lng],
                map_complaint_row,
            )?
            .collect::<SqliteResult<Vec<_>>>()?
        };

        Ok(rows)
    }

    // ==========================================
    // 列表查询
    // ==========================================

    /// 查询用户提交的工单（新上报在前）
    pub fn list_by_user(&self, user_id: i64) -> RepositoryResult<Vec<Complaint>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM complaints WHERE user_id = ?1 ORDER BY reported_at DESC, id DESC",
            COMPLAINT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let complaints = stmt
            .query_map(params![user_id], map_complaint_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(complaints)
    }

    /// 查询全部工单（新上报在前,管理端总览）
    pub fn list_all(&self) -> RepositoryResult<Vec<Complaint>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM complaints ORDER BY reported_at DESC, id DESC",
            COMPLAINT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let complaints = stmt
            .query_map([], map_complaint_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(complaints)
    }

    /// 查询最近升级的工单（最近升级在前,最多 limit 条）
    pub fn list_escalated(&self, limit: usize) -> RepositoryResult<Vec<EscalatedComplaint>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, type, priority, department, escalated_at
            FROM complaints
            WHERE status = ?1
            ORDER BY escalated_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let items = stmt
            .query_map(
                params![ComplaintStatus::Escalated.to_db_str(), limit as i64],
                |row| {
                    Ok(EscalatedComplaint {
                        id: row.get(0)?,
                        complaint_type: row.get(1)?,
                        priority: row.get(2)?,
                        department: row.get(3)?,
                        escalated_at: parse_opt_ts(row, 4)?,
                    })
                },
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(items)
    }

    /// 热力图坐标（全部有坐标的工单,不区分状态）
    pub fn heatmap_points(&self) -> RepositoryResult<Vec<HeatmapPoint>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT latitude, longitude
            FROM complaints
            WHERE latitude IS NOT NULL AND longitude IS NOT NULL
            ORDER BY id ASC
            "#,
        )?;

        let points = stmt
            .query_map([], |row| {
                Ok(HeatmapPoint {
                    lat: row.get(0)?,
                    lng: row.get(1)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(points)
    }
}
