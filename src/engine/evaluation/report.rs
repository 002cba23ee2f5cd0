use crate::engine::constraint::ConstraintViolation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// YearEvaluation - 单年评估
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearEvaluation {
    pub year: usize,
    pub crop_name: String,
    pub estimated_yield: f64,
    pub score: f64,
}

// ==========================================
// RotationEvaluation - 序列评估报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationEvaluation {
    /// 地块 ID
    pub field_id: String,

    /// 逐年评估
    pub years: Vec<YearEvaluation>,

    /// 平均年度得分
    pub total_score: f64,

    /// 硬约束违反
    pub hard_violations: Vec<ConstraintViolation>,

    /// 软约束违反
    pub soft_violations: Vec<ConstraintViolation>,

    /// 前后茬冲突描述
    pub compatibility_issues: Vec<String>,

    /// 知识库中不存在的作物（按默认档案估计）
    pub unknown_crops: Vec<String>,

    /// 效益指标
    pub benefit_analysis: BTreeMap<String, f64>,
}

impl RotationEvaluation {
    /// 是否满足全部硬约束
    pub fn is_feasible(&self) -> bool {
        self.hard_violations.is_empty()
    }

    /// 单行摘要（用于日志与命令行输出）
    pub fn summary(&self) -> String {
        format!(
            "field={} years={} total_score={:.3} hard_violations={} soft_violations={} compatibility_issues={}",
            self.field_id,
            self.years.len(),
            self.total_score,
            self.hard_violations.len(),
            self.soft_violations.len(),
            self.compatibility_issues.len()
        )
    }
}
