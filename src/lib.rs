// ==========================================
// 市政投诉工单系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + Tokio
// 核心: 工单生命周期状态机、双触发自动升级、附近投诉排序
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 请求边界
pub mod api;

// 应用层 - 装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ComplaintStatus, Priority};

// 领域实体
pub use domain::{
    ActionLog, ActionType, Complaint, ComplaintUpdate, EscalatedComplaint, GeoPoint,
    HeatmapPoint, NewComplaint,
};

// 引擎
pub use engine::{
    ClusterRule, ComplaintStateMachine, EscalationEngine, NearbyRanker, TemporalRule,
};

// API
pub use api::{ApiError, ComplaintApi, EscalationApi, NearbyApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "市政投诉工单系统";
