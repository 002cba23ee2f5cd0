// ==========================================
// 轮作优化引擎 - 轮作方案领域模型
// ==========================================
// 红线: RotationYear 一经产生不可变
// 红线: CropRotationPlan 在 Finalizing 阶段一次性组装,不暴露中间态
// ==========================================

use crate::domain::goal::{RotationConstraint, RotationGoal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// benefit_analysis 指标键
// ==========================================
pub mod benefit_keys {
    pub const NITROGEN_FIXATION: &str = "nitrogen_fixation"; // 固氮总量 (lbs N/acre)
    pub const NITROGEN_CREDIT_APPLIED: &str = "nitrogen_credit_applied"; // 后茬可利用氮 (lbs N/acre)
    pub const SOIL_ORGANIC_MATTER: &str = "soil_organic_matter"; // 有机质趋势代理 [0,100]
    pub const PEST_MANAGEMENT: &str = "pest_management"; // 病虫害断代得分 [0,100]
    pub const CROP_DIVERSITY: &str = "crop_diversity"; // 作物多样性 [0,100]
}

// ==========================================
// RotationYear - 单年轮作决策
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationYear {
    pub year: usize,               // 年序 (0 起)
    pub crop_name: String,         // 作物
    pub estimated_yield: f64,      // 估计单产
    pub yield_unit: String,        // 单产单位
    pub score: f64,                // 选择得分
    pub planting_window: String,   // 播种窗口
    pub management_notes: Vec<String>,
}

// ==========================================
// CropRotationPlan - 轮作方案
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropRotationPlan {
    pub plan_id: String,
    pub field_id: String,
    pub planning_horizon: usize,
    pub rotation_years: Vec<RotationYear>,
    pub benefit_analysis: BTreeMap<String, f64>,
    pub overall_score: f64,

    // ===== 元数据 =====
    pub goals: Vec<RotationGoal>,
    pub constraints: Vec<RotationConstraint>,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
    /// 生成时的配置快照（经 API 生成时附带）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_snapshot: Option<String>,
}

impl CropRotationPlan {
    /// 作物序列
    pub fn crop_sequence(&self) -> Vec<&str> {
        self.rotation_years
            .iter()
            .map(|y| y.crop_name.as_str())
            .collect()
    }

    /// 是否为降级方案（存在被放宽的硬约束）
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}
