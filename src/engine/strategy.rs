// ==========================================
// 轮作优化引擎 - 策略定义
// ==========================================
// 用途：
// - Strategy Drafts（多策略草案）：同一地块按不同目标侧重分别试算,便于对比；
// - 调用方未给出目标时,以策略预设的目标集合作为输入。

use crate::domain::goal::RotationGoal;
use crate::domain::types::GoalType;
use serde::{Deserialize, Serialize};

/// 轮作策略（预设目标权重）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStrategy {
    Balanced,
    SoilHealthFirst,
    ProfitFirst,
    YieldFirst,
}

impl RotationStrategy {
    pub fn all() -> [RotationStrategy; 4] {
        [
            RotationStrategy::Balanced,
            RotationStrategy::SoilHealthFirst,
            RotationStrategy::ProfitFirst,
            RotationStrategy::YieldFirst,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RotationStrategy::Balanced => "balanced",
            RotationStrategy::SoilHealthFirst => "soil_health_first",
            RotationStrategy::ProfitFirst => "profit_first",
            RotationStrategy::YieldFirst => "yield_first",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RotationStrategy::Balanced => "Balanced rotation",
            RotationStrategy::SoilHealthFirst => "Soil health first",
            RotationStrategy::ProfitFirst => "Profit first",
            RotationStrategy::YieldFirst => "Yield first",
        }
    }

    /// 预设目标集合
    pub fn goals(&self) -> Vec<RotationGoal> {
        let weights: &[(GoalType, f64)] = match self {
            RotationStrategy::Balanced => &[
                (GoalType::YieldMaximization, 0.25),
                (GoalType::SoilHealth, 0.25),
                (GoalType::Sustainability, 0.20),
                (GoalType::ProfitMaximization, 0.20),
                (GoalType::PestDiseaseManagement, 0.10),
            ],
            RotationStrategy::SoilHealthFirst => &[
                (GoalType::SoilHealth, 0.60),
                (GoalType::Sustainability, 0.25),
                (GoalType::PestDiseaseManagement, 0.15),
            ],
            RotationStrategy::ProfitFirst => &[
                (GoalType::ProfitMaximization, 0.60),
                (GoalType::YieldMaximization, 0.30),
                (GoalType::SoilHealth, 0.10),
            ],
            RotationStrategy::YieldFirst => &[
                (GoalType::YieldMaximization, 0.70),
                (GoalType::SoilHealth, 0.20),
                (GoalType::Sustainability, 0.10),
            ],
        };

        weights
            .iter()
            .enumerate()
            .map(|(i, (goal_type, weight))| {
                RotationGoal::new(format!("{}_{}", self.as_str(), goal_type), *goal_type, *weight)
                    .with_priority(i as i32 + 1)
            })
            .collect()
    }
}

impl Default for RotationStrategy {
    fn default() -> Self {
        RotationStrategy::Balanced
    }
}

impl std::fmt::Display for RotationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RotationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "balanced" => Ok(RotationStrategy::Balanced),
            "soil_health_first" | "soil-health-first" | "soil" => Ok(RotationStrategy::SoilHealthFirst),
            "profit_first" | "profit-first" | "profit" => Ok(RotationStrategy::ProfitFirst),
            "yield_first" | "yield-first" | "yield" => Ok(RotationStrategy::YieldFirst),
            other => Err(format!("未知策略类型: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_weights_sum_to_one() {
        for strategy in RotationStrategy::all() {
            let total: f64 = strategy.goals().iter().map(|g| g.weight).sum();
            assert!((total - 1.0).abs() < 1e-9, "{} 权重和 = {}", strategy, total);
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("Profit-First".parse::<RotationStrategy>().unwrap(), RotationStrategy::ProfitFirst);
        assert_eq!("soil".parse::<RotationStrategy>().unwrap(), RotationStrategy::SoilHealthFirst);
        assert!("cheapest".parse::<RotationStrategy>().is_err());
    }

    #[test]
    fn test_goal_ids_are_unique() {
        let goals = RotationStrategy::Balanced.goals();
        let mut ids: Vec<_> = goals.iter().map(|g| g.goal_id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert_eq!(goals[0].goal_id, "balanced_yield_maximization");
    }
}
