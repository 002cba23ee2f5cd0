// ==========================================
// 轮作优化引擎 - 引擎层
// ==========================================
// 职责: 单产估计、约束评估、多目标评分、逐年选择与方案组装
// 红线: 引擎同步无锁,知识库与市场参数经构造函数注入
// 红线: 每条建议与放宽都必须写入方案内容
// ==========================================

pub mod benefit;
pub mod constraint;
pub mod error;
pub mod evaluation;
pub mod goal_scorer;
pub mod management;
pub mod orchestrator;
pub mod params;
pub mod strategy;
pub mod yield_estimator;

// 重导出核心引擎
pub use benefit::BenefitAnalyzer;
pub use constraint::{ConstraintEvaluator, ConstraintViolation};
pub use error::{OptimizeError, OptimizeResult};
pub use evaluation::{RotationEvaluation, RotationEvaluator, YearEvaluation};
pub use goal_scorer::{GoalScorer, GoalSubScores, ScoringContext};
pub use management::ManagementAdvisor;
pub use orchestrator::{OptimizationState, RotationOptimizationEngine, RotationRun, YearSelection};
pub use params::ScoringParameters;
pub use strategy::RotationStrategy;
pub use yield_estimator::YieldEstimator;
