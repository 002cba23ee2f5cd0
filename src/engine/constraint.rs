// ==========================================
// 轮作优化引擎 - 约束评估器
// ==========================================
// 职责: 判定候选作物追加到历史后是否违反硬约束;计算软约束扣分与相容性加分
// 红线: 硬约束一票否决;软约束与相容性只影响得分
// ==========================================

use crate::domain::crop::normalize_crop_name;
use crate::domain::goal::{ConstraintKind, ConstraintRule};
use crate::engine::params::ScoringParameters;
use crate::knowledge::CropKnowledgeBase;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 整序列校验发现的约束违反
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub constraint_id: String,
    pub year: Option<usize>, // None 表示整序列层面（如必选作物缺失）
    pub is_hard: bool,
    pub message: String,
}

// ==========================================
// ConstraintEvaluator - 约束评估器
// ==========================================
#[derive(Clone)]
pub struct ConstraintEvaluator {
    knowledge: Arc<dyn CropKnowledgeBase>,
    horizon: Option<usize>,
    soft_constraint_penalty: f64,
    avoid_next_penalty: f64,
    good_next_bonus: f64,
}

impl ConstraintEvaluator {
    pub fn new(knowledge: Arc<dyn CropKnowledgeBase>, params: &ScoringParameters) -> Self {
        Self {
            knowledge,
            horizon: None,
            soft_constraint_penalty: params.soft_constraint_penalty,
            avoid_next_penalty: params.avoid_next_penalty,
            good_next_bonus: params.good_next_bonus,
        }
    }

    /// 绑定规划年限（必选作物约束需要剩余年数才能判定）
    pub fn with_horizon(&self, horizon: usize) -> Self {
        Self {
            horizon: Some(horizon),
            ..self.clone()
        }
    }

    pub fn horizon(&self) -> Option<usize> {
        self.horizon
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 候选作物追加到历史后是否违反任一硬约束
    pub fn violates_hard_constraint<S: AsRef<str>>(
        &self,
        candidate_crop: &str,
        history: &[S],
        constraints: &[ConstraintRule],
    ) -> bool {
        constraints
            .iter()
            .filter(|rule| rule.is_hard)
            .any(|rule| self.rule_violated(rule, candidate_crop, history, constraints))
    }

    /// 候选作物追加到历史后违反的硬约束 ID 列表
    pub fn violated_hard_constraints<S: AsRef<str>>(
        &self,
        candidate_crop: &str,
        history: &[S],
        constraints: &[ConstraintRule],
    ) -> Vec<String> {
        constraints
            .iter()
            .filter(|rule| rule.is_hard && self.rule_violated(rule, candidate_crop, history, constraints))
            .map(|rule| rule.constraint_id.clone())
            .collect()
    }

    /// 软约束扣分（>= 0;无违反时为 0）
    ///
    /// 组成:
    /// - 每条被违反的软约束: soft_constraint_penalty
    /// - 候选作物在前茬“忌后茬”集合中: avoid_next_penalty
    pub fn soft_penalty<S: AsRef<str>>(
        &self,
        candidate_crop: &str,
        history: &[S],
        constraints: &[ConstraintRule],
    ) -> f64 {
        let violated = constraints
            .iter()
            .filter(|rule| !rule.is_hard && self.rule_violated(rule, candidate_crop, history, constraints))
            .count();

        let mut penalty = violated as f64 * self.soft_constraint_penalty;

        if let Some(prev) = history.last() {
            if self
                .knowledge
                .avoid_next_crops(prev.as_ref())
                .contains(&normalize_crop_name(candidate_crop))
            {
                penalty += self.avoid_next_penalty;
            }
        }

        penalty
    }

    /// 相容性加分（候选作物在前茬“适宜后茬”集合中,>= 0）
    pub fn compatibility_bonus<S: AsRef<str>>(&self, candidate_crop: &str, history: &[S]) -> f64 {
        match history.last() {
            Some(prev)
                if self
                    .knowledge
                    .good_next_crops(prev.as_ref())
                    .contains(&normalize_crop_name(candidate_crop)) =>
            {
                self.good_next_bonus
            }
            _ => 0.0,
        }
    }

    /// 整序列校验（用于评估调用方给定的轮作序列）
    pub fn check_sequence<S: AsRef<str>>(
        &self,
        sequence: &[S],
        constraints: &[ConstraintRule],
    ) -> Vec<ConstraintViolation> {
        let normalized: Vec<String> = sequence
            .iter()
            .map(|c| normalize_crop_name(c.as_ref()))
            .collect();
        let mut violations = Vec::new();

        for rule in constraints {
            match &rule.kind {
                ConstraintKind::RequiredCrop {
                    crop,
                    min_occurrences,
                } => {
                    let count = count_of(&normalized, crop);
                    if count < *min_occurrences as usize {
                        violations.push(ConstraintViolation {
                            constraint_id: rule.constraint_id.clone(),
                            year: None,
                            is_hard: rule.is_hard,
                            message: format!(
                                "{} appears {} time(s); at least {} required",
                                crop, count, min_occurrences
                            ),
                        });
                    }
                }
                _ => {
                    for (year, crop) in normalized.iter().enumerate() {
                        if local_rule_violated(&rule.kind, crop, &normalized[..year]) {
                            violations.push(ConstraintViolation {
                                constraint_id: rule.constraint_id.clone(),
                                year: Some(year),
                                is_hard: rule.is_hard,
                                message: describe(&rule.kind),
                            });
                        }
                    }
                }
            }
        }

        violations
    }

    // ==========================================
    // 规则判定
    // ==========================================

    /// 单条规则判定
    ///
    /// 必选作物: 已种次数 + 本年选择 + 剩余年份最多可种次数 < 要求次数时视为违反。
    /// 剩余年份的上限受该作物自身硬约束（连作/间隔/次数/禁种）限制。
    fn rule_violated<S: AsRef<str>>(
        &self,
        rule: &ConstraintRule,
        candidate_crop: &str,
        history: &[S],
        constraints: &[ConstraintRule],
    ) -> bool {
        let candidate = normalize_crop_name(candidate_crop);

        match &rule.kind {
            ConstraintKind::RequiredCrop {
                crop,
                min_occurrences,
            } => {
                let Some(horizon) = self.horizon else {
                    return false;
                };
                let mut sequence: Vec<String> = history
                    .iter()
                    .map(|h| normalize_crop_name(h.as_ref()))
                    .collect();
                sequence.push(candidate);

                let planted = count_of(&sequence, crop);
                planted + max_further_placements(crop, sequence, horizon, constraints)
                    < *min_occurrences as usize
            }
            kind => local_rule_violated(kind, &candidate, history),
        }
    }
}

/// 剩余年份中 crop 最多还能种植的次数
///
/// 逐年尽早种植,受该作物硬约束阻止的年份视为种植其他作物。
/// 连作上限、最小间隔、次数上限下尽早种植即为最多次数。
fn max_further_placements(
    crop: &str,
    mut sequence: Vec<String>,
    horizon: usize,
    constraints: &[ConstraintRule],
) -> usize {
    let own_rules: Vec<&ConstraintKind> = constraints
        .iter()
        .filter(|rule| rule.is_hard && rule.kind.crop() == crop)
        .map(|rule| &rule.kind)
        .collect();

    let mut placed = 0;
    while sequence.len() < horizon {
        if own_rules
            .iter()
            .any(|kind| local_rule_violated(kind, crop, &sequence))
        {
            sequence.push(String::new());
        } else {
            sequence.push(crop.to_string());
            placed += 1;
        }
    }
    placed
}

/// 只依赖历史的规则判定（不含必选作物）
fn local_rule_violated<S: AsRef<str>>(kind: &ConstraintKind, candidate: &str, history: &[S]) -> bool {
    match kind {
        ConstraintKind::MaxConsecutive { crop, max } => {
            candidate == crop && trailing_run(history, crop) + 1 > *max as usize
        }
        ConstraintKind::ExcludedCrop { crop } => candidate == crop,
        ConstraintKind::MinReturnInterval { crop, years } => {
            let lookback = (*years as usize).min(history.len());
            candidate == crop
                && history[history.len() - lookback..]
                    .iter()
                    .any(|h| normalize_crop_name(h.as_ref()) == *crop)
        }
        ConstraintKind::MaxOccurrences { crop, max } => {
            candidate == crop && count_of(history, crop) + 1 > *max as usize
        }
        ConstraintKind::RequiredCrop { .. } => false,
    }
}

fn describe(kind: &ConstraintKind) -> String {
    match kind {
        ConstraintKind::MaxConsecutive { crop, max } => {
            format!("{} planted more than {} year(s) in a row", crop, max)
        }
        ConstraintKind::ExcludedCrop { crop } => format!("{} is excluded", crop),
        ConstraintKind::MinReturnInterval { crop, years } => {
            format!("{} returns within {} year(s)", crop, years)
        }
        ConstraintKind::MaxOccurrences { crop, max } => {
            format!("{} planted more than {} time(s)", crop, max)
        }
        ConstraintKind::RequiredCrop {
            crop,
            min_occurrences,
        } => format!("{} required at least {} time(s)", crop, min_occurrences),
    }
}

/// 历史尾部连续出现 crop 的年数
pub fn trailing_run<S: AsRef<str>>(history: &[S], crop: &str) -> usize {
    history
        .iter()
        .rev()
        .take_while(|h| normalize_crop_name(h.as_ref()) == crop)
        .count()
}

fn count_of<S: AsRef<str>>(history: &[S], crop: &str) -> usize {
    history
        .iter()
        .filter(|h| normalize_crop_name(h.as_ref()) == crop)
        .count()
}
