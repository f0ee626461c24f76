use super::{COMPLAINT_COLUMNS, TS_FORMAT};
use crate::domain::complaint::{Complaint, ComplaintUpdate, GeoPoint, NewComplaint};
use crate::domain::types::{ComplaintStatus, Priority};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ComplaintRepository - 投诉仓储
// ==========================================
pub struct ComplaintRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ComplaintRepository {
    /// 创建新的投诉仓储（共享连接）
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入新工单（状态固定为 Reported）
    ///
    /// # 返回
    /// - Ok(id): 新工单ID
    pub fn insert(&self, complaint: &NewComplaint) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO complaints (
                user_id, type, description, image_url, status, priority, department,
                latitude, longitude, reported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                complaint.user_id,
                complaint.complaint_type,
                complaint.description,
                complaint.image_url,
                ComplaintStatus::Reported.to_db_str(),
                complaint.priority.to_db_str(),
                complaint.department,
                complaint.location.map(|p| p.latitude),
                complaint.location.map(|p| p.longitude),
                format_ts(complaint.reported_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 持久化人工变更（状态 + 优先级 + 时间戳）
    ///
    /// 以读取时的状态做比较并交换;时间戳只在库中为空时写入。
    ///
    /// # 返回
    /// - Ok(true): 已写入
    /// - Ok(false): 状态已被其他操作改变,未写入
    pub fn persist(&self, update: &ComplaintUpdate) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let c = &update.complaint;
        let affected = conn.execute(
            r#"
            UPDATE complaints
            SET status = ?1,
                priority = ?2,
                acknowledged_at = COALESCE(acknowledged_at, ?3),
                in_progress_at = COALESCE(in_progress_at, ?4),
                resolved_at = COALESCE(resolved_at, ?5),
                escalated_at = COALESCE(escalated_at, ?6)
            WHERE id = ?7 AND status = ?8
            "#,
            params![
                c.status.to_db_str(),
                c.priority.to_db_str(),
                c.acknowledged_at.map(format_ts),
                c.in_progress_at.map(format_ts),
                c.resolved_at.map(format_ts),
                c.escalated_at.map(format_ts),
                c.id,
                update.expected_status.to_db_str(),
            ],
        )?;
        Ok(affected > 0)
    }

    /// 批量持久化引擎产生的状态变更（单事务）
    ///
    /// 只写状态与时间戳,不触碰优先级;比较并交换失败的行跳过。
    ///
    /// # 返回
    /// - Ok(ids): 实际写入的工单ID
    pub fn persist_batch(&self, updates: &[ComplaintUpdate]) -> RepositoryResult<Vec<i64>> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut applied = Vec::with_capacity(updates.len());
        {
            let mut stmt = tx.prepare(
                r#"
                UPDATE complaints
                SET status = ?1,
                    acknowledged_at = COALESCE(acknowledged_at, ?2),
                    in_progress_at = COALESCE(in_progress_at, ?3),
                    resolved_at = COALESCE(resolved_at, ?4),
                    escalated_at = COALESCE(escalated_at, ?5)
                WHERE id = ?6 AND status = ?7
                "#,
            )?;

            for update in updates {
                let c = &update.complaint;
                let affected = stmt.execute(params![
                    c.status.to_db_str(),
                    c.acknowledged_at.map(format_ts),
                    c.in_progress_at.map(format_ts),
                    c.resolved_at.map(format_ts),
                    c.escalated_at.map(format_ts),
                    c.id,
                    update.expected_status.to_db_str(),
                ])?;
                if affected > 0 {
                    applied.push(c.id);
                } else {
                    tracing::warn!(
                        complaint_id = c.id,
                        expected_status = %update.expected_status,
                        "工单状态已被并发修改,跳过"
                    );
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(applied)
    }

    // ==========================================
    // 单条查询
    // ==========================================

    /// 按ID查询工单
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Complaint>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM complaints WHERE id = ?1", COMPLAINT_COLUMNS);
        let complaint = conn
            .query_row(&sql, params![id], map_complaint_row)
            .optional()?;
        Ok(complaint)
    }

    /// 用户是否存在（投诉的归属引用,注册/登录不在本系统内）
    pub fn user_exists(&self, user_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM users WHERE id = ?1",
                params![user_id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }
}

// ==========================================
// 行映射辅助函数
// ==========================================

pub(crate) fn format_ts(ts: NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(super) fn parse_opt_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => parse_ts(idx, &raw).map(Some),
        None => Ok(None),
    }
}

/// complaints 行 → Complaint（列顺序见 COMPLAINT_COLUMNS）
///
/// 库中出现未知状态视为数据损坏,返回转换错误而不是猜测。
pub(crate) fn map_complaint_row(row: &Row<'_>) -> rusqlite::Result<Complaint> {
    let raw_status: String = row.get(5)?;
    let status = ComplaintStatus::parse(&raw_status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown complaint status: {}", raw_status).into(),
        )
    })?;
    let raw_priority: String = row.get(6)?;
    let reported_at_raw: String = row.get(10)?;

    Ok(Complaint {
        id: row.get(0)?,
        user_id: row.get(1)?,
        complaint_type: row.get(2)?,
        description: row.get(3)?,
        image_url: row.get(4)?,
        status,
        priority: Priority::from_db_str(&raw_priority),
        department: row.get(7)?,
        location: GeoPoint::from_parts(row.get(8)?, row.get(9)?),
        reported_at: parse_ts(10, &reported_at_raw)?,
        acknowledged_at: parse_opt_ts(row, 11)?,
        in_progress_at: parse_opt_ts(row, 12)?,
        resolved_at: parse_opt_ts(row, 13)?,
        escalated_at: parse_opt_ts(row, 14)?,
    })
}
