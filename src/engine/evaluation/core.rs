use crate::domain::crop::normalize_crop_name;
use crate::domain::field::FieldProfile;
use crate::domain::goal::{ConstraintRule, RotationConstraint, RotationGoal};
use crate::engine::benefit::{round2, BenefitAnalyzer};
use crate::engine::constraint::ConstraintEvaluator;
use crate::engine::error::{OptimizeError, OptimizeResult};
use crate::engine::goal_scorer::{GoalScorer, ScoringContext};
use crate::engine::orchestrator::RotationOptimizationEngine;
use crate::engine::params::ScoringParameters;
use crate::knowledge::CropKnowledgeBase;
use std::sync::Arc;
use tracing::{debug, info};

use super::report::{RotationEvaluation, YearEvaluation};

// ==========================================
// RotationEvaluator - 轮作序列评估器
// ==========================================
// 与优化引擎共享知识库与评分参数,保证评估口径一致
pub struct RotationEvaluator {
    knowledge: Arc<dyn CropKnowledgeBase>,
    scorer: GoalScorer,
    benefit: BenefitAnalyzer,
    params: ScoringParameters,
}

impl RotationEvaluator {
    pub fn new(engine: &RotationOptimizationEngine) -> Self {
        Self {
            knowledge: engine.knowledge(),
            scorer: engine.scorer().clone(),
            benefit: engine.benefit_analyzer().clone(),
            params: engine.params().clone(),
        }
    }

    /// 评估作物序列
    ///
    /// # 返回
    /// - Ok: 评估报告（约束违反写入报告,不报错）
    /// - Err: 序列为空 / 目标权重非法 / 约束参数非法
    pub fn evaluate_rotation<S: AsRef<str>>(
        &self,
        field: &FieldProfile,
        sequence: &[S],
        goals: &[RotationGoal],
        constraints: &[RotationConstraint],
    ) -> OptimizeResult<RotationEvaluation> {
        if sequence.is_empty() {
            return Err(OptimizeError::InvalidInput("待评估的作物序列为空".to_string()));
        }
        if let Some(goal) = goals
            .iter()
            .find(|g| !g.weight.is_finite() || g.weight < 0.0)
        {
            return Err(OptimizeError::InvalidInput(format!(
                "目标权重必须为非负有限数 (goal_id={}, weight={})",
                goal.goal_id, goal.weight
            )));
        }

        let rules = constraints
            .iter()
            .map(|c| {
                ConstraintRule::parse(c).map_err(|reason| OptimizeError::InvalidConstraint {
                    constraint_id: c.constraint_id.clone(),
                    reason,
                })
            })
            .collect::<OptimizeResult<Vec<_>>>()?;

        let history: Vec<String> = sequence
            .iter()
            .map(|c| normalize_crop_name(c.as_ref()))
            .collect();
        let evaluator = ConstraintEvaluator::new(Arc::clone(&self.knowledge), &self.params)
            .with_horizon(history.len());

        // 1. 逐年评分
        let years: Vec<YearEvaluation> = history
            .iter()
            .enumerate()
            .map(|(year, crop)| {
                let ctx = ScoringContext {
                    field,
                    year_index: year,
                    history: &history,
                    goals,
                    rules: &rules,
                    evaluator: &evaluator,
                };
                YearEvaluation {
                    year,
                    crop_name: crop.clone(),
                    estimated_yield: round2(
                        self.scorer
                            .estimator()
                            .estimate_yield(crop, field, year, &history),
                    ),
                    score: self.scorer.score_in_context(crop, &ctx),
                }
            })
            .collect();

        let total_score = years.iter().map(|y| y.score).sum::<f64>() / years.len() as f64;

        // 2. 约束校验
        let (hard_violations, soft_violations): (Vec<_>, Vec<_>) = evaluator
            .check_sequence(&history, &rules)
            .into_iter()
            .partition(|v| v.is_hard);

        // 3. 前后茬冲突
        let compatibility_issues: Vec<String> = history
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| self.knowledge.avoid_next_crops(&pair[0]).contains(&pair[1]))
            .map(|(i, pair)| {
                format!(
                    "year {}: {} should not follow {}",
                    i + 1,
                    pair[1],
                    pair[0]
                )
            })
            .collect();

        let mut unknown_crops: Vec<String> = history
            .iter()
            .filter(|c| self.knowledge.get_entry(c).is_none())
            .cloned()
            .collect();
        unknown_crops.sort();
        unknown_crops.dedup();

        for issue in &compatibility_issues {
            debug!(field_id = %field.field_id, issue = %issue, "前后茬冲突");
        }

        let evaluation = RotationEvaluation {
            field_id: field.field_id.clone(),
            years,
            total_score,
            hard_violations,
            soft_violations,
            compatibility_issues,
            unknown_crops,
            benefit_analysis: self.benefit.analyze(&history),
        };

        info!(summary = %evaluation.summary(), "轮作序列评估完成");

        Ok(evaluation)
    }
}
