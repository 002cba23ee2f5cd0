// ==========================================
// 轮作优化引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含引擎逻辑,不含 I/O
// ==========================================

pub mod crop;
pub mod field;
pub mod goal;
pub mod rotation;
pub mod types;

// 重导出核心类型
pub use crop::{normalize_crop_name, CropCompatibilityEntry, CropEconomics};
pub use field::FieldProfile;
pub use goal::{ConstraintKind, ConstraintRule, RotationConstraint, RotationGoal};
pub use rotation::{benefit_keys, CropRotationPlan, RotationYear};
pub use types::{ConstraintType, GoalType, NitrogenDemand, PlantingSeason};
