// ==========================================
// 市政投诉工单系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换 Repository/引擎错误为调用方可读的错误
// 约定: 4xx 为调用方错误,5xx 为存储不可用（核心不重试）
// ==========================================

use crate::engine::state_machine::TransitionError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误
    // ==========================================
    #[error("参数无效: {0}")]
    InvalidParameter(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效的状态转换: from={from} to={to}")]
    InvalidTransition { from: String, to: String },

    #[error("未知状态: {0}")]
    UnknownStatus(String),

    #[error("未提供任何变更: {0}")]
    NoOp(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("工单已被并发修改: {0}")]
    ConcurrentModification(String),

    // ==========================================
    // 存储错误
    // ==========================================
    #[error("存储不可用: {0}")]
    StoreUnavailable(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定的错误代码（供调用方分支判断）
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidParameter(_) => "INVALID_PARAMETER",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidTransition { .. } => "INVALID_TRANSITION",
            ApiError::UnknownStatus(_) => "UNKNOWN_STATUS",
            ApiError::NoOp(_) => "NO_OP",
            ApiError::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            ApiError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }

    /// 对应的 HTTP 状态码
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::InvalidParameter(_)
            | ApiError::InvalidTransition { .. }
            | ApiError::UnknownStatus(_)
            | ApiError::NoOp(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::ConcurrentModification(_) => 409,
            ApiError::StoreUnavailable(_) => 503,
            ApiError::InternalError(_) | ApiError::Other(_) => 500,
        }
    }

    /// 转换为错误响应体
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: match self {
                ApiError::InvalidTransition { from, to } => {
                    Some(serde_json::json!({ "from": from, "to": to }))
                }
                ApiError::UnknownStatus(raw) => Some(serde_json::json!({ "status": raw })),
                _ => None,
            },
        }
    }
}

/// 错误响应（返回给调用方）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,

    /// 错误消息
    pub message: String,

    /// 详细信息（可选）
    pub details: Option<serde_json::Value>,
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::StoreUnavailable(msg),
            RepositoryError::LockError(msg) => {
                ApiError::StoreUnavailable(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidParameter(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::NotFound(format!("引用的记录不存在: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InternalError(format!("字段值错误 (field={}): {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(e) => ApiError::Other(e),
        }
    }
}

// ==========================================
// 从 TransitionError 转换
// ==========================================
impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::InvalidTransition { from, to } => {
                ApiError::InvalidTransition { from, to }
            }
            TransitionError::UnknownStatus(raw) => ApiError::UnknownStatus(raw),
        }
    }
}

/// API层 Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
