// ==========================================
// 轮作优化引擎 - 引擎编排器
// ==========================================
// 用途: 逐年贪心选择作物,组装完整轮作方案
// 状态机: Initialized -> SelectingYear(i) -> Finalizing -> Complete
// ==========================================
// 红线: 方案长度 == 规划年限
// 红线: 硬约束无解时放宽违反最少者,并在管理建议与 warnings 中记录
// 红线: 方案只在 Finalizing 阶段一次性组装
// ==========================================

use crate::domain::crop::normalize_crop_name;
use crate::domain::field::FieldProfile;
use crate::domain::goal::{ConstraintRule, RotationConstraint, RotationGoal};
use crate::domain::rotation::{CropRotationPlan, RotationYear};
use crate::engine::benefit::{round2, BenefitAnalyzer};
use crate::engine::constraint::ConstraintEvaluator;
use crate::engine::error::{OptimizeError, OptimizeResult};
use crate::engine::goal_scorer::{GoalScorer, ScoringContext};
use crate::engine::management::ManagementAdvisor;
use crate::engine::params::ScoringParameters;
use crate::knowledge::{CropKnowledgeBase, MarketTable, StaticKnowledgeBase};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// OptimizationState - 单次优化运行状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationState {
    Initialized,
    SelectingYear(usize),
    Finalizing,
    Complete,
}

impl fmt::Display for OptimizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationState::Initialized => write!(f, "INITIALIZED"),
            OptimizationState::SelectingYear(i) => write!(f, "SELECTING_YEAR({})", i),
            OptimizationState::Finalizing => write!(f, "FINALIZING"),
            OptimizationState::Complete => write!(f, "COMPLETE"),
        }
    }
}

// ==========================================
// YearSelection - 单年选择结果
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct YearSelection {
    pub crop_name: String,
    pub score: f64,
    pub relaxed_constraints: Vec<String>, // 被放宽的硬约束 ID（正常选择时为空）
}

impl YearSelection {
    pub fn is_relaxed(&self) -> bool {
        !self.relaxed_constraints.is_empty()
    }
}

// ==========================================
// RotationOptimizationEngine - 轮作优化引擎
// ==========================================
pub struct RotationOptimizationEngine {
    knowledge: Arc<dyn CropKnowledgeBase>,
    params: ScoringParameters,
    scorer: GoalScorer,
    advisor: ManagementAdvisor,
    benefit: BenefitAnalyzer,
}

impl RotationOptimizationEngine {
    /// 创建引擎实例（知识库与市场参数表由调用方注入）
    pub fn new(
        knowledge: Arc<dyn CropKnowledgeBase>,
        market: Arc<MarketTable>,
        params: ScoringParameters,
    ) -> Self {
        let params = params.sanitized();
        Self {
            scorer: GoalScorer::new(Arc::clone(&knowledge), market, params.clone()),
            advisor: ManagementAdvisor::new(Arc::clone(&knowledge)),
            benefit: BenefitAnalyzer::new(Arc::clone(&knowledge)),
            knowledge,
            params,
        }
    }

    /// 使用内置作物表与市场参数创建引擎
    pub fn with_builtin_tables() -> Self {
        Self::new(
            Arc::new(StaticKnowledgeBase::builtin()),
            Arc::new(MarketTable::builtin()),
            ScoringParameters::default(),
        )
    }

    pub fn knowledge(&self) -> Arc<dyn CropKnowledgeBase> {
        Arc::clone(&self.knowledge)
    }

    pub fn params(&self) -> &ScoringParameters {
        &self.params
    }

    pub fn scorer(&self) -> &GoalScorer {
        &self.scorer
    }

    pub fn advisor(&self) -> &ManagementAdvisor {
        &self.advisor
    }

    pub fn benefit_analyzer(&self) -> &BenefitAnalyzer {
        &self.benefit
    }

    /// 绑定规划年限的约束评估器
    pub fn constraint_evaluator(&self, horizon: usize) -> ConstraintEvaluator {
        ConstraintEvaluator::new(Arc::clone(&self.knowledge), &self.params).with_horizon(horizon)
    }

    // ==========================================
    // 主流程
    // ==========================================

    /// 生成最优轮作方案
    ///
    /// # 参数
    /// - `field`: 地块档案
    /// - `goals`: 轮作目标（至少一个,权重非负）
    /// - `constraints`: 轮作约束
    /// - `planning_horizon`: 规划年限 (> 0)
    ///
    /// # 返回
    /// - Ok: 完整方案（长度 == planning_horizon）
    /// - Err: 输入契约违反
    #[instrument(skip_all, fields(field_id = %field.field_id, planning_horizon = planning_horizon))]
    pub fn generate_optimal_rotation(
        &self,
        field: &FieldProfile,
        goals: &[RotationGoal],
        constraints: &[RotationConstraint],
        planning_horizon: usize,
    ) -> OptimizeResult<CropRotationPlan> {
        let rules = self.validate_inputs(goals, constraints, planning_horizon)?;

        info!(
            goals_count = goals.len(),
            constraints_count = constraints.len(),
            candidates_count = self.knowledge.crop_names().len(),
            "开始生成轮作方案"
        );

        let mut run = RotationRun::new(self, field, goals, constraints, rules, planning_horizon);
        while run.advance()? != OptimizationState::Complete {}

        let plan = run.into_plan().ok_or_else(|| {
            OptimizeError::InvalidInput("优化运行未产出方案".to_string())
        })?;

        info!(
            plan_id = %plan.plan_id,
            sequence = ?plan.crop_sequence(),
            overall_score = plan.overall_score,
            warnings_count = plan.warnings.len(),
            "轮作方案生成完成"
        );

        Ok(plan)
    }

    /// 校验输入并解析约束
    pub fn validate_inputs(
        &self,
        goals: &[RotationGoal],
        constraints: &[RotationConstraint],
        planning_horizon: usize,
    ) -> OptimizeResult<Vec<ConstraintRule>> {
        if planning_horizon == 0 {
            return Err(OptimizeError::InvalidInput(
                "planning_horizon 必须大于 0".to_string(),
            ));
        }

        if goals.is_empty() {
            return Err(OptimizeError::InvalidInput("至少需要一个轮作目标".to_string()));
        }

        for goal in goals {
            if !goal.weight.is_finite() || goal.weight < 0.0 {
                return Err(OptimizeError::InvalidInput(format!(
                    "目标权重必须为非负有限数 (goal_id={}, weight={})",
                    goal.goal_id, goal.weight
                )));
            }
        }

        if goals.iter().map(|g| g.weight).sum::<f64>() <= 0.0 {
            return Err(OptimizeError::InvalidInput("目标权重之和必须大于 0".to_string()));
        }

        if self.knowledge.crop_names().is_empty() {
            return Err(OptimizeError::InvalidInput("知识库中没有候选作物".to_string()));
        }

        constraints
            .iter()
            .map(|c| {
                ConstraintRule::parse(c).map_err(|reason| OptimizeError::InvalidConstraint {
                    constraint_id: c.constraint_id.clone(),
                    reason,
                })
            })
            .collect()
    }

    // ==========================================
    // 单年选择
    // ==========================================

    /// 为指定年份选择作物
    ///
    /// 1) 过滤违反硬约束的候选
    /// 2) 幸存者中取最高分（平局按规范顺序）
    /// 3) 无幸存者时放宽: 违反硬约束数最少,再取最高分
    ///
    /// # 返回
    /// 候选集合为空时返回 None
    pub fn select_crop_for_year(
        &self,
        field: &FieldProfile,
        year_index: usize,
        history: &[String],
        goals: &[RotationGoal],
        rules: &[ConstraintRule],
        evaluator: &ConstraintEvaluator,
    ) -> Option<YearSelection> {
        let ctx = ScoringContext {
            field,
            year_index,
            history,
            goals,
            rules,
            evaluator,
        };

        let assessed: Vec<(String, f64, Vec<String>)> = self
            .knowledge
            .crop_names()
            .into_iter()
            .map(|crop| {
                let violated = evaluator.violated_hard_constraints(&crop, history, rules);
                let score = self.scorer.score_in_context(&crop, &ctx);
                (crop, score, violated)
            })
            .collect();

        let fewest = assessed.iter().map(|(_, _, v)| v.len()).min()?;
        let pool: Vec<(String, f64)> = assessed
            .iter()
            .filter(|(_, _, v)| v.len() == fewest)
            .map(|(crop, score, _)| (crop.clone(), *score))
            .collect();

        let (crop_name, score) = self.scorer.select_best(&pool)?.clone();
        let relaxed_constraints = assessed
            .into_iter()
            .find(|(crop, _, _)| *crop == crop_name)
            .map(|(_, _, v)| v)
            .unwrap_or_default();

        Some(YearSelection {
            crop_name,
            score,
            relaxed_constraints,
        })
    }
}

// ==========================================
// RotationRun - 单次优化运行（显式状态机）
// ==========================================
pub struct RotationRun<'a> {
    engine: &'a RotationOptimizationEngine,
    field: &'a FieldProfile,
    goals: &'a [RotationGoal],
    constraints: &'a [RotationConstraint],
    rules: Vec<ConstraintRule>,
    evaluator: ConstraintEvaluator,
    planning_horizon: usize,

    state: OptimizationState,
    history: Vec<String>,
    years: Vec<RotationYear>,
    warnings: Vec<String>,
    plan: Option<CropRotationPlan>,
}

impl<'a> RotationRun<'a> {
    pub fn new(
        engine: &'a RotationOptimizationEngine,
        field: &'a FieldProfile,
        goals: &'a [RotationGoal],
        constraints: &'a [RotationConstraint],
        rules: Vec<ConstraintRule>,
        planning_horizon: usize,
    ) -> Self {
        Self {
            engine,
            field,
            goals,
            constraints,
            rules,
            evaluator: engine.constraint_evaluator(planning_horizon),
            planning_horizon,
            state: OptimizationState::Initialized,
            history: Vec::with_capacity(planning_horizon),
            years: Vec::with_capacity(planning_horizon),
            warnings: Vec::new(),
            plan: None,
        }
    }

    pub fn state(&self) -> OptimizationState {
        self.state
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// 推进一步,返回新状态
    pub fn advance(&mut self) -> OptimizeResult<OptimizationState> {
        self.state = match self.state {
            OptimizationState::Initialized => OptimizationState::SelectingYear(0),
            OptimizationState::SelectingYear(i) => {
                self.select_year(i)?;
                if i + 1 < self.planning_horizon {
                    OptimizationState::SelectingYear(i + 1)
                } else {
                    OptimizationState::Finalizing
                }
            }
            OptimizationState::Finalizing => {
                self.finalize();
                OptimizationState::Complete
            }
            OptimizationState::Complete => OptimizationState::Complete,
        };
        Ok(self.state)
    }

    /// 取出方案（仅 Complete 后可用）
    pub fn into_plan(self) -> Option<CropRotationPlan> {
        self.plan
    }

    fn select_year(&mut self, year_index: usize) -> OptimizeResult<()> {
        let selection = self
            .engine
            .select_crop_for_year(
                self.field,
                year_index,
                &self.history,
                self.goals,
                &self.rules,
                &self.evaluator,
            )
            .ok_or_else(|| OptimizeError::InvalidInput("知识库中没有候选作物".to_string()))?;

        let crop = normalize_crop_name(&selection.crop_name);
        let knowledge = &self.engine.knowledge;
        let estimated_yield = self.engine.scorer.estimator().estimate_yield(
            &crop,
            self.field,
            year_index,
            &self.history,
        );

        let mut management_notes =
            self.engine
                .advisor
                .management_notes(&crop, &self.history, self.field);

        if selection.is_relaxed() {
            let warning = format!(
                "WARNING: hard constraint conflict in year {}: no crop satisfies every hard constraint; relaxed {}",
                year_index,
                selection.relaxed_constraints.join(", ")
            );
            warn!(
                year = year_index,
                crop = %crop,
                relaxed = ?selection.relaxed_constraints,
                "硬约束冲突,已放宽"
            );
            management_notes.insert(0, warning.clone());
            self.warnings.push(warning);
        }

        debug!(
            year = year_index,
            crop = %crop,
            score = selection.score,
            estimated_yield = estimated_yield,
            "年度作物已选定"
        );

        self.years.push(RotationYear {
            year: year_index,
            crop_name: crop.clone(),
            estimated_yield: round2(estimated_yield),
            yield_unit: knowledge.entry_or_default(&crop).yield_unit.clone(),
            score: selection.score,
            planting_window: self.engine.advisor.planting_recommendation(&crop),
            management_notes,
        });
        self.history.push(crop);

        Ok(())
    }

    fn finalize(&mut self) {
        let benefit_analysis = self.engine.benefit.analyze(&self.history);
        let overall_score = if self.years.is_empty() {
            0.0
        } else {
            self.years.iter().map(|y| y.score).sum::<f64>() / self.years.len() as f64
        };

        self.plan = Some(CropRotationPlan {
            plan_id: Uuid::new_v4().to_string(),
            field_id: self.field.field_id.clone(),
            planning_horizon: self.planning_horizon,
            rotation_years: std::mem::take(&mut self.years),
            benefit_analysis,
            overall_score,
            goals: self.goals.to_vec(),
            constraints: self.constraints.to_vec(),
            warnings: std::mem::take(&mut self.warnings),
            generated_at: Utc::now(),
            config_snapshot: None,
        });
    }
}
