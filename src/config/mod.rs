// ==========================================
// 市政投诉工单系统 - 配置层
// ==========================================
// 职责: 升级规则与调度参数的读取/写入
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod escalation_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, EscalationSettings};
pub use escalation_config_trait::EscalationConfigReader;
