// ==========================================
// 轮作优化引擎 - 领域类型定义
// ==========================================
// 职责: 目标类型、约束类型、氮需求等级、播种季节
// 序列化格式: snake_case (与外部 JSON 接口一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 轮作目标类型 (Goal Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    YieldMaximization,     // 产量最大化
    SoilHealth,            // 土壤健康
    Sustainability,        // 可持续性(多样性)
    ProfitMaximization,    // 利润最大化
    PestDiseaseManagement, // 病虫害管理
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::YieldMaximization => "yield_maximization",
            GoalType::SoilHealth => "soil_health",
            GoalType::Sustainability => "sustainability",
            GoalType::ProfitMaximization => "profit_maximization",
            GoalType::PestDiseaseManagement => "pest_disease_management",
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yield_maximization" | "yield" => Ok(GoalType::YieldMaximization),
            "soil_health" => Ok(GoalType::SoilHealth),
            "sustainability" => Ok(GoalType::Sustainability),
            "profit_maximization" | "profit" => Ok(GoalType::ProfitMaximization),
            "pest_disease_management" | "pest_management" => {
                Ok(GoalType::PestDiseaseManagement)
            }
            other => Err(format!("未知目标类型: {}", other)),
        }
    }
}

// ==========================================
// 约束类型 (Constraint Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    MaxConsecutive,    // 连作上限
    RequiredCrop,      // 必须出现的作物
    ExcludedCrop,      // 禁止出现的作物
    MinReturnInterval, // 最短回茬间隔(年)
    MaxOccurrences,    // 出现次数上限
}

impl ConstraintType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintType::MaxConsecutive => "max_consecutive",
            ConstraintType::RequiredCrop => "required_crop",
            ConstraintType::ExcludedCrop => "excluded_crop",
            ConstraintType::MinReturnInterval => "min_return_interval",
            ConstraintType::MaxOccurrences => "max_occurrences",
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 氮需求等级 (Nitrogen Demand)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NitrogenDemand {
    Low,
    Medium,
    High,
}

impl NitrogenDemand {
    /// 前茬固氮对当季产量的响应系数
    pub fn credit_response(&self) -> f64 {
        match self {
            NitrogenDemand::Low => 0.3,
            NitrogenDemand::Medium => 0.7,
            NitrogenDemand::High => 1.0,
        }
    }

    /// 土壤健康视角下的需求得分（需求越低越好）
    pub fn soil_score(&self) -> f64 {
        match self {
            NitrogenDemand::Low => 1.0,
            NitrogenDemand::Medium => 0.6,
            NitrogenDemand::High => 0.2,
        }
    }
}

impl fmt::Display for NitrogenDemand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NitrogenDemand::Low => write!(f, "low"),
            NitrogenDemand::Medium => write!(f, "medium"),
            NitrogenDemand::High => write!(f, "high"),
        }
    }
}

impl FromStr for NitrogenDemand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(NitrogenDemand::Low),
            "medium" | "mid" => Ok(NitrogenDemand::Medium),
            "high" => Ok(NitrogenDemand::High),
            other => Err(format!("未知氮需求等级: {}", other)),
        }
    }
}

// ==========================================
// 播种季节 (Planting Season)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantingSeason {
    Spring, // 春播
    Fall,   // 秋播(越冬)
}

impl fmt::Display for PlantingSeason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlantingSeason::Spring => write!(f, "spring"),
            PlantingSeason::Fall => write!(f, "fall"),
        }
    }
}

impl FromStr for PlantingSeason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spring" => Ok(PlantingSeason::Spring),
            "fall" | "autumn" | "winter" => Ok(PlantingSeason::Fall),
            other => Err(format!("未知播种季节: {}", other)),
        }
    }
}
