use crate::domain::crop::CropCompatibilityEntry;
use crate::domain::field::FieldProfile;
use crate::domain::goal::{ConstraintRule, RotationGoal};
use crate::engine::constraint::ConstraintEvaluator;
use crate::engine::params::ScoringParameters;
use crate::engine::yield_estimator::{predecessor, YieldEstimator};
use crate::knowledge::{CropKnowledgeBase, MarketTable};
use std::sync::Arc;

use super::scoring::{
    pest_disease_sub_score, profit_sub_score, soil_health_sub_score, sustainability_sub_score,
    yield_sub_score, GoalSubScores,
};

/// 单次评分所需的上下文（引擎每年构造一次）
pub struct ScoringContext<'a> {
    pub field: &'a FieldProfile,
    pub year_index: usize,
    pub history: &'a [String],
    pub goals: &'a [RotationGoal],
    pub rules: &'a [ConstraintRule],
    pub evaluator: &'a ConstraintEvaluator,
}

// ==========================================
// GoalScorer - 多目标评分器
// ==========================================
#[derive(Clone)]
pub struct GoalScorer {
    knowledge: Arc<dyn CropKnowledgeBase>,
    market: Arc<MarketTable>,
    estimator: YieldEstimator,
    compatibility: ConstraintEvaluator,
    params: ScoringParameters,
}

impl GoalScorer {
    pub fn new(
        knowledge: Arc<dyn CropKnowledgeBase>,
        market: Arc<MarketTable>,
        params: ScoringParameters,
    ) -> Self {
        let estimator = YieldEstimator::new(Arc::clone(&knowledge))
            .with_max_nitrogen_credit(params.max_nitrogen_credit);
        let compatibility = ConstraintEvaluator::new(Arc::clone(&knowledge), &params);

        Self {
            knowledge,
            market,
            estimator,
            compatibility,
            params,
        }
    }

    pub fn estimator(&self) -> &YieldEstimator {
        &self.estimator
    }

    pub fn params(&self) -> &ScoringParameters {
        &self.params
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 候选作物得分（无显式约束,只计前后茬相容性）
    pub fn score<S: AsRef<str>>(
        &self,
        candidate_crop: &str,
        field: &FieldProfile,
        year_index: usize,
        history: &[S],
        goals: &[RotationGoal],
    ) -> f64 {
        let prior = prior_years(year_index, history);
        self.sub_scores(candidate_crop, field, year_index, history)
            .weighted_sum(goals)
            - self.compatibility.soft_penalty(candidate_crop, prior, &[])
            + self.compatibility.compatibility_bonus(candidate_crop, prior)
    }

    /// 候选作物得分（含软约束扣分）
    pub fn score_in_context(&self, candidate_crop: &str, ctx: &ScoringContext<'_>) -> f64 {
        let prior = prior_years(ctx.year_index, ctx.history);
        self.sub_scores(candidate_crop, ctx.field, ctx.year_index, ctx.history)
            .weighted_sum(ctx.goals)
            - ctx.evaluator.soft_penalty(candidate_crop, prior, ctx.rules)
            + ctx.evaluator.compatibility_bonus(candidate_crop, prior)
    }

    /// 各目标子得分（均在 [0,1]）
    pub fn sub_scores<S: AsRef<str>>(
        &self,
        candidate_crop: &str,
        field: &FieldProfile,
        year_index: usize,
        history: &[S],
    ) -> GoalSubScores {
        let prior = prior_years(year_index, history);
        let entry = self.knowledge.entry_or_default(candidate_crop);
        let estimated = self
            .estimator
            .estimate_yield(candidate_crop, field, year_index, history);

        let predecessor_entry = predecessor(year_index, history)
            .map(|p| self.knowledge.entry_or_default(p).into_owned());
        let recent: Vec<CropCompatibilityEntry> = prior
            .iter()
            .rev()
            .take(2)
            .rev()
            .map(|c| self.knowledge.entry_or_default(c.as_ref()).into_owned())
            .collect();
        let recent_refs: Vec<&CropCompatibilityEntry> = recent.iter().collect();

        GoalSubScores {
            yield_score: yield_sub_score(estimated, entry.base_yield),
            soil_health: soil_health_sub_score(
                &entry,
                predecessor_entry.as_ref(),
                self.params.fixation_reference_lbs,
            ),
            sustainability: sustainability_sub_score(
                candidate_crop,
                prior,
                self.params.diversity_window,
            ),
            profit: profit_sub_score(
                self.market.economics(candidate_crop),
                estimated,
                self.params.profit_reference_per_acre,
            ),
            pest_disease: pest_disease_sub_score(&entry, &recent_refs),
        }
    }

    /// 平局裁决: 取最高分;与最高分差距 <= tie_epsilon 的候选中取规范顺序最靠前者
    ///
    /// 规范顺序相同（均为未知作物）时按名称字典序
    pub fn select_best<'s>(&self, scored: &'s [(String, f64)]) -> Option<&'s (String, f64)> {
        let best = scored
            .iter()
            .map(|(_, s)| *s)
            .filter(|s| s.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        if !best.is_finite() {
            return scored.first();
        }

        scored
            .iter()
            .filter(|(_, s)| s.is_finite() && *s >= best - self.params.tie_epsilon)
            .min_by(|(a, _), (b, _)| {
                self.knowledge
                    .canonical_rank(a)
                    .cmp(&self.knowledge.canonical_rank(b))
                    .then_with(|| a.cmp(b))
            })
    }
}

/// 年序之前的历史（year_index 超过历史长度时取全部）
fn prior_years<S>(year_index: usize, history: &[S]) -> &[S] {
    &history[..year_index.min(history.len())]
}
