// ==========================================
// 市政投诉工单系统 - 升级配置读取 Trait
// ==========================================
// 职责: 定义调度器所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// EscalationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait EscalationConfigReader: Send + Sync {
    // ===== 升级规则 =====

    /// 超时升级阈值（小时）
    ///
    /// # 默认值
    /// - 24
    async fn get_escalation_age_hours(&self) -> Result<i64, Box<dyn Error>>;

    /// 聚集半径（公里）
    ///
    /// # 默认值
    /// - 5.0
    async fn get_cluster_radius_km(&self) -> Result<f64, Box<dyn Error>>;

    /// 聚集阈值: 聚集规模（含自身）超过该值即升级
    ///
    /// # 默认值
    /// - 5
    async fn get_cluster_neighbor_threshold(&self) -> Result<usize, Box<dyn Error>>;

    // ===== 调度 =====

    /// 自动升级运行间隔（秒）
    ///
    /// # 默认值
    /// - 3600
    async fn get_escalation_interval_secs(&self) -> Result<u64, Box<dyn Error>>;

    /// 单批次存储操作超时（秒）
    ///
    /// # 默认值
    /// - 30
    async fn get_store_timeout_secs(&self) -> Result<u64, Box<dyn Error>>;
}
