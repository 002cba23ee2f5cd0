// ==========================================
// 轮作优化引擎 - API 层
// ==========================================
// 职责: 提供异步业务入口,供命令行与嵌入方调用
// ==========================================

pub mod error;
pub mod rotation_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use rotation_api::{RotationApi, RotationRequest, StrategyDraft};
pub use validator::RequestValidator;
