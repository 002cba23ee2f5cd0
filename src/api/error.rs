// ==========================================
// 轮作优化引擎 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换引擎/知识库错误为调用方可读的错误消息
// 红线: 只有输入契约违反与运行限制向调用方抛出;农艺边界情况写入方案内容
// ==========================================

use crate::engine::error::OptimizeError;
use crate::knowledge::KnowledgeBaseError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入契约错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 请求校验失败（带逐项原因）
    #[error("请求校验失败: {reason}")]
    ValidationError {
        reason: String,
        violations: Vec<ValidationViolation>,
    },

    #[error("规划年限超出上限: requested={requested}, max={max}")]
    HorizonTooLarge { requested: usize, max: usize },

    // ==========================================
    // 运行限制
    // ==========================================
    #[error("优化超时: 超过时间预算 {budget_ms}ms")]
    Timeout { budget_ms: u64 },

    // ==========================================
    // 配置与数据源错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("知识库加载失败: {0}")]
    KnowledgeBase(#[from] KnowledgeBaseError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 OptimizeError 转换
// ==========================================
impl From<OptimizeError> for ApiError {
    fn from(err: OptimizeError) -> Self {
        match err {
            OptimizeError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            OptimizeError::InvalidConstraint {
                constraint_id,
                reason,
            } => ApiError::ValidationError {
                reason: format!("约束参数错误 (constraint_id={})", constraint_id),
                violations: vec![ValidationViolation {
                    field: format!("constraints[{}]", constraint_id),
                    reason,
                }],
            },
        }
    }
}

impl ApiError {
    /// 是否为调用方输入问题（可修正后重试）
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ApiError::InvalidInput(_)
                | ApiError::ValidationError { .. }
                | ApiError::HorizonTooLarge { .. }
        )
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验违规详情
// ==========================================

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationViolation {
    /// 字段路径（如 field_profile.size_acres）
    pub field: String,
    /// 违规原因
    pub reason: String,
}
