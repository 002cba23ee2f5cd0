// ==========================================
// 轮作优化引擎 - 引擎层错误类型
// ==========================================
// 红线: 只有输入契约违反才向调用方抛出
//       农艺边界情况（未知作物、约束冲突）写入方案内容,不抛出
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("约束参数错误 (constraint_id={constraint_id}): {reason}")]
    InvalidConstraint {
        constraint_id: String,
        reason: String,
    },
}

pub type OptimizeResult<T> = Result<T, OptimizeError>;
