// ==========================================
// 轮作优化引擎 - 核心库
// ==========================================
// 职责: 多年作物轮作方案生成（贪心逐年选择 + 多目标评分）
// 系统定位: 农艺决策支持（建议方案,人工最终决定）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 知识库层 - 作物农艺事实与市场参数
pub mod knowledge;

// 引擎层 - 评分与选择规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 异步业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ConstraintType, GoalType, NitrogenDemand, PlantingSeason};

// 领域实体
pub use domain::{
    CropCompatibilityEntry, CropEconomics, CropRotationPlan, FieldProfile, RotationConstraint,
    RotationGoal, RotationYear,
};

// 知识库
pub use knowledge::{CropKnowledgeBase, KnowledgeBaseError, MarketTable, StaticKnowledgeBase};

// 引擎
pub use engine::{
    OptimizeError, RotationEvaluation, RotationEvaluator, RotationOptimizationEngine,
    RotationStrategy, ScoringParameters,
};

// API
pub use api::{ApiError, RotationApi, RotationRequest};

// 配置
pub use config::{ConfigManager, RotationConfigReader};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Crop Rotation Planner";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_reexports_build_an_engine() {
        let engine = RotationOptimizationEngine::with_builtin_tables();
        assert_eq!(engine.knowledge().crop_names().len(), 8);
    }
}
