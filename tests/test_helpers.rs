// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use fixit_complaints::app::AppState;
use rusqlite::{params, Connection};
use std::error::Error;
use tempfile::NamedTempFile;

/// create_test_db 预置的用户
pub const TEST_USER_ID: i64 = 1;

/// 创建临时测试数据库并初始化 schema（含一个测试用户）
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = open_test_connection(&db_path)?;
    fixit_complaints::db::ensure_schema(&conn)?;
    insert_user(&conn, TEST_USER_ID, "test-user")?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接（统一 PRAGMA）
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(fixit_complaints::db::open_sqlite_connection(db_path)?)
}

/// 创建应用状态
pub fn build_state(db_path: &str) -> AppState {
    AppState::new(db_path.to_string()).expect("Failed to create AppState")
}

pub fn insert_user(conn: &Connection, id: i64, name: &str) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR IGNORE INTO users (id, name) VALUES (?1, ?2)",
        params![id, name],
    )?;
    Ok(())
}

/// 固定的基准时间: 2026-01-03 16:15:00
pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 3)
        .unwrap()
        .and_hms_opt(16, 15, 0)
        .unwrap()
}

pub fn fmt_ts(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 以原始 SQL 写入工单（可指定状态与回溯的上报时间）
pub fn seed_complaint(
    conn: &Connection,
    kind: &str,
    priority: &str,
    status: &str,
    location: Option<(f64, f64)>,
    reported_at: NaiveDateTime,
) -> Result<i64, Box<dyn Error>> {
    conn.execute(
        r#"
        INSERT INTO complaints (
            user_id, type, description, status, priority, department,
            latitude, longitude, reported_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            TEST_USER_ID,
            kind,
            format!("{} near market", kind),
            status,
            priority,
            "Public Works",
            location.map(|l| l.0),
            location.map(|l| l.1),
            fmt_ts(reported_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// 读取工单当前状态
pub fn read_status(conn: &Connection, id: i64) -> String {
    conn.query_row(
        "SELECT status FROM complaints WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )
    .expect("complaint should exist")
}

/// 统计某类操作日志条数
pub fn count_action_logs(conn: &Connection, action_type: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM action_log WHERE action_type = ?1",
        params![action_type],
        |row| row.get(0),
    )
    .expect("count action_log")
}
