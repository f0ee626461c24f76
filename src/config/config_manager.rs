// ==========================================
// 市政投诉工单系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::escalation_config_trait::EscalationConfigReader;
use crate::db::open_sqlite_connection;
use crate::engine::escalation::MAX_AGE_THRESHOLD_HOURS;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// 默认值
// ==========================================
pub const DEFAULT_ESCALATION_AGE_HOURS: i64 = 24;
pub const DEFAULT_CLUSTER_RADIUS_KM: f64 = 5.0;
pub const DEFAULT_CLUSTER_NEIGHBOR_THRESHOLD: usize = 5;
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;
pub const DEFAULT_NEARBY_LIMIT: usize = 50;
pub const DEFAULT_ESCALATION_INTERVAL_SECS: u64 = 3_600;
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;

// ==========================================
// EscalationSettings - 升级/附近查询参数快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationSettings {
    pub age_threshold_hours: i64,
    pub cluster_radius_km: f64,
    pub cluster_neighbor_threshold: usize,
    pub nearby_default_radius_km: f64,
    pub nearby_default_limit: usize,
}

impl Default for EscalationSettings {
    fn default() -> Self {
        Self {
            age_threshold_hours: DEFAULT_ESCALATION_AGE_HOURS,
            cluster_radius_km: DEFAULT_CLUSTER_RADIUS_KM,
            cluster_neighbor_threshold: DEFAULT_CLUSTER_NEIGHBOR_THRESHOLD,
            nearby_default_radius_km: DEFAULT_NEARBY_RADIUS_KM,
            nearby_default_limit: DEFAULT_NEARBY_LIMIT,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at)
             VALUES ('global', ?1, ?2, datetime('now', 'localtime'))
             ON CONFLICT(scope_id, key)
             DO UPDATE SET value = ?2, updated_at = datetime('now', 'localtime')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 读取并解析配置,缺失或格式错误时返回默认值
    ///
    /// `valid` 不通过的值同样按格式错误处理。
    fn get_parsed_or_default<T>(
        &self,
        key: &str,
        default: T,
        valid: impl Fn(&T) -> bool,
    ) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + std::fmt::Debug,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(v) if valid(&v) => Ok(v),
            _ => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    default = ?default,
                    "配置值格式错误，使用默认值"
                );
                Ok(default)
            }
        }
    }

    // ===== 升级规则配置 =====

    pub fn escalation_age_hours(&self) -> Result<i64, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::ESCALATION_AGE_HOURS,
            DEFAULT_ESCALATION_AGE_HOURS,
            |v| *v > 0 && *v <= MAX_AGE_THRESHOLD_HOURS,
        )
    }

    pub fn cluster_radius_km(&self) -> Result<f64, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::CLUSTER_RADIUS_KM,
            DEFAULT_CLUSTER_RADIUS_KM,
            |v| v.is_finite() && *v > 0.0,
        )
    }

    pub fn cluster_neighbor_threshold(&self) -> Result<usize, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::CLUSTER_NEIGHBOR_THRESHOLD,
            DEFAULT_CLUSTER_NEIGHBOR_THRESHOLD,
            |_| true,
        )
    }

    // ===== 附近查询默认值 =====

    pub fn nearby_default_radius_km(&self) -> Result<f64, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::NEARBY_DEFAULT_RADIUS_KM,
            DEFAULT_NEARBY_RADIUS_KM,
            |v| v.is_finite() && *v > 0.0 && *v <= 50.0,
        )
    }

    pub fn nearby_default_limit(&self) -> Result<usize, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::NEARBY_DEFAULT_LIMIT,
            DEFAULT_NEARBY_LIMIT,
            |v| (1..=200).contains(v),
        )
    }

    /// 汇总升级与附近查询参数
    pub fn load_escalation_settings(&self) -> Result<EscalationSettings, Box<dyn Error>> {
        Ok(EscalationSettings {
            age_threshold_hours: self.escalation_age_hours()?,
            cluster_radius_km: self.cluster_radius_km()?,
            cluster_neighbor_threshold: self.cluster_neighbor_threshold()?,
            nearby_default_radius_km: self.nearby_default_radius_km()?,
            nearby_default_limit: self.nearby_default_limit()?,
        })
    }
}

// ==========================================
// EscalationConfigReader Trait 实现
// ==========================================
#[async_trait]
impl EscalationConfigReader for ConfigManager {
    async fn get_escalation_age_hours(&self) -> Result<i64, Box<dyn Error>> {
        self.escalation_age_hours()
    }

    async fn get_cluster_radius_km(&self) -> Result<f64, Box<dyn Error>> {
        self.cluster_radius_km()
    }

    async fn get_cluster_neighbor_threshold(&self) -> Result<usize, Box<dyn Error>> {
        self.cluster_neighbor_threshold()
    }

    async fn get_escalation_interval_secs(&self) -> Result<u64, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::ESCALATION_INTERVAL_SECS,
            DEFAULT_ESCALATION_INTERVAL_SECS,
            |v| *v > 0,
        )
    }

    async fn get_store_timeout_secs(&self) -> Result<u64, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::STORE_TIMEOUT_SECS,
            DEFAULT_STORE_TIMEOUT_SECS,
            |v| *v > 0,
        )
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 超时升级
    pub const ESCALATION_AGE_HOURS: &str = "escalation_age_hours";

    // 聚集升级
    pub const CLUSTER_RADIUS_KM: &str = "cluster_radius_km";
    pub const CLUSTER_NEIGHBOR_THRESHOLD: &str = "cluster_neighbor_threshold";

    // 附近查询
    pub const NEARBY_DEFAULT_RADIUS_KM: &str = "nearby_default_radius_km";
    pub const NEARBY_DEFAULT_LIMIT: &str = "nearby_default_limit";

    // 调度
    pub const ESCALATION_INTERVAL_SECS: &str = "escalation_interval_secs";
    pub const STORE_TIMEOUT_SECS: &str = "store_timeout_secs";
}
