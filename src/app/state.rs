// ==========================================
// 市政投诉工单系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ComplaintApi, EscalationApi, NearbyApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::engine::escalation::{ClusterRule, EscalationEngine, TemporalRule};
use crate::repository::{ActionLogRepository, ComplaintRepository};

/// 应用状态
///
/// 所有仓储共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 工单API
    pub complaint_api: Arc<ComplaintApi>,

    /// 附近投诉API
    pub nearby_api: Arc<NearbyApi>,

    /// 自动升级API
    pub escalation_api: Arc<EscalationApi>,

    /// 配置管理器（调度器读取间隔/超时）
    pub config_manager: Arc<ConfigManager>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 读取 config_kv 中的升级参数
    /// 3. 初始化 Repository / Engine / API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        match read_schema_version(&conn) {
            Ok(Some(v)) if v == CURRENT_SCHEMA_VERSION => {}
            Ok(v) => tracing::warn!(
                found = ?v,
                expected = CURRENT_SCHEMA_VERSION,
                "schema_version 与当前代码不一致"
            ),
            Err(e) => tracing::warn!("读取 schema_version 失败: {}", e),
        }
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let settings = config_manager
            .load_escalation_settings()
            .map_err(|e| format!("读取升级配置失败: {}", e))?;
        tracing::info!(?settings, "升级配置已加载");

        // ==========================================
        // Repository层
        // ==========================================
        let complaint_repo = Arc::new(ComplaintRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        // ==========================================
        // Engine层
        // ==========================================
        let temporal_rule = TemporalRule::try_from_hours(settings.age_threshold_hours)
            .ok_or_else(|| format!("超时阈值无效: {}", settings.age_threshold_hours))?;
        let escalation_engine = EscalationEngine::new(
            temporal_rule,
            ClusterRule::new(settings.cluster_radius_km, settings.cluster_neighbor_threshold),
        );

        // ==========================================
        // API层
        // ==========================================
        let complaint_api = Arc::new(ComplaintApi::new(
            complaint_repo.clone(),
            action_log_repo.clone(),
        ));
        let nearby_api = Arc::new(NearbyApi::with_defaults(
            complaint_repo.clone(),
            settings.nearby_default_radius_km,
            settings.nearby_default_limit,
        ));
        let escalation_api = Arc::new(EscalationApi::new(
            complaint_repo,
            action_log_repo.clone(),
            escalation_engine,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            complaint_api,
            nearby_api,
            escalation_api,
            config_manager,
            action_log_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 FIXIT_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("FIXIT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./fixit_complaints.db");

    if let Some(data_dir) = dirs::data_local_dir() {
        let dir = data_dir.join("fixit-complaints");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("fixit_complaints.db");
        }
    }

    path.to_string_lossy().to_string()
}
