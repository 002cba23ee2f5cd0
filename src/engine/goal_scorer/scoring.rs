use crate::domain::crop::{normalize_crop_name, CropCompatibilityEntry, CropEconomics};
use crate::domain::goal::RotationGoal;
use crate::domain::types::{GoalType, NitrogenDemand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 单产子得分的参考上限（基准单产的 1.2 倍记满分）
const YIELD_REFERENCE_RATIO: f64 = 1.2;

/// 前茬已是固氮作物时,再种固氮作物的边际收益折减
const REPEATED_FIXER_DAMPING: f64 = 0.3;

/// 同科连作的病虫害得分折减
const SAME_FAMILY_DAMPING: f64 = 0.8;

/// 病虫害回看年数
const PEST_LOOKBACK_YEARS: usize = 2;

// ==========================================
// GoalSubScores - 子得分
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalSubScores {
    pub yield_score: f64,
    pub soil_health: f64,
    pub sustainability: f64,
    pub profit: f64,
    pub pest_disease: f64,
}

impl GoalSubScores {
    pub fn get(&self, goal_type: GoalType) -> f64 {
        match goal_type {
            GoalType::YieldMaximization => self.yield_score,
            GoalType::SoilHealth => self.soil_health,
            GoalType::Sustainability => self.sustainability,
            GoalType::ProfitMaximization => self.profit,
            GoalType::PestDiseaseManagement => self.pest_disease,
        }
    }

    /// 按目标权重加权求和（同类目标重复出现时累加）
    pub fn weighted_sum(&self, goals: &[RotationGoal]) -> f64 {
        goals
            .iter()
            .map(|goal| goal.weight * self.get(goal.goal_type))
            .sum()
    }
}

pub(super) fn yield_sub_score(estimated_yield: f64, base_yield: f64) -> f64 {
    let reference = base_yield * YIELD_REFERENCE_RATIO;
    if reference <= 0.0 {
        return 0.5;
    }
    (estimated_yield / reference).clamp(0.0, 1.0)
}

/// 土壤健康: 0.6 × 固氮贡献 + 0.4 × 需氮等级得分
///
/// 固氮贡献在前茬已是固氮作物时折减;高需氮作物接高需氮作物时需氮得分记 0
pub(super) fn soil_health_sub_score(
    entry: &CropCompatibilityEntry,
    predecessor: Option<&CropCompatibilityEntry>,
    fixation_reference_lbs: f64,
) -> f64 {
    let mut fixation =
        (entry.nitrogen_fixation_lbs_per_acre / fixation_reference_lbs).clamp(0.0, 1.0);
    if predecessor.is_some_and(|p| p.is_nitrogen_fixer()) {
        fixation *= REPEATED_FIXER_DAMPING;
    }

    let repeated_high_demand = entry.nitrogen_demand == NitrogenDemand::High
        && predecessor.is_some_and(|p| p.nitrogen_demand == NitrogenDemand::High);
    let demand = if repeated_high_demand {
        0.0
    } else {
        entry.nitrogen_demand.soil_score()
    };

    0.6 * fixation + 0.4 * demand
}

/// 可持续性: 0.6 × 窗口内作物多样性 + 0.4 × 回茬间隔得分
pub(super) fn sustainability_sub_score<S: AsRef<str>>(
    candidate: &str,
    history: &[S],
    diversity_window: usize,
) -> f64 {
    let candidate = normalize_crop_name(candidate);
    let tail = diversity_window.saturating_sub(1).min(history.len());

    let mut window: Vec<String> = history[history.len() - tail..]
        .iter()
        .map(|c| normalize_crop_name(c.as_ref()))
        .collect();
    window.push(candidate.clone());

    let distinct = window.iter().collect::<BTreeSet<_>>().len();
    let diversity = distinct as f64 / window.len() as f64;

    let years_since = history
        .iter()
        .rev()
        .position(|c| normalize_crop_name(c.as_ref()) == candidate)
        .map(|pos| pos + 1);
    let return_score = match years_since {
        Some(1) => 0.0,
        Some(2) => 0.25,
        Some(3) => 0.6,
        _ => 1.0,
    };

    0.6 * diversity + 0.4 * return_score
}

/// 利润: 每英亩净收益 / 参考值;缺少市场参数时取中位 0.5
pub(super) fn profit_sub_score(
    economics: Option<CropEconomics>,
    estimated_yield: f64,
    profit_reference_per_acre: f64,
) -> f64 {
    match economics {
        Some(e) => (e.margin_per_acre(estimated_yield) / profit_reference_per_acre).clamp(0.0, 1.0),
        None => 0.5,
    }
}

/// 病虫害: 1 - 候选标签与近两年标签的重叠比例;同科连作再折减
pub(super) fn pest_disease_sub_score(
    entry: &CropCompatibilityEntry,
    recent: &[&CropCompatibilityEntry],
) -> f64 {
    let tags = entry.pressure_tags();
    if tags.is_empty() {
        return 0.5;
    }

    let recent_tags: BTreeSet<&str> = recent
        .iter()
        .rev()
        .take(PEST_LOOKBACK_YEARS)
        .flat_map(|e| e.pressure_tags())
        .collect();
    let overlap = tags.intersection(&recent_tags).count();
    let mut score = 1.0 - overlap as f64 / tags.len() as f64;

    if let Some(prev) = recent.last() {
        if prev.crop_family == entry.crop_family && entry.crop_family != "unknown" {
            score *= SAME_FAMILY_DAMPING;
        }
    }

    score.clamp(0.0, 1.0)
}
