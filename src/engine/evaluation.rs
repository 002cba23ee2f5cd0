// ==========================================
// 轮作优化引擎 - 轮作序列评估
// ==========================================
// 职责: 对调用方给定的作物序列逐年评分,报告约束违反与前后茬冲突
// 输入: 地块档案 + 作物序列 + 目标 + 约束
// 输出: RotationEvaluation（不修改序列,不做选择）
// ==========================================

mod core;
mod report;

#[cfg(test)]
mod tests;

pub use self::core::RotationEvaluator;
pub use self::report::{RotationEvaluation, YearEvaluation};
