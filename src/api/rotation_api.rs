// ==========================================
// 轮作优化引擎 - 轮作 API
// ==========================================
// 职责: 面向调用方的异步入口
// - 请求校验（年限上限、字段合法性）
// - 在阻塞线程池中运行同步引擎,并施加时间预算
// - 多策略草案对比
// - 给定序列评估
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::RequestValidator;
use crate::config::RotationConfigReader;
use crate::domain::field::FieldProfile;
use crate::domain::goal::{RotationConstraint, RotationGoal};
use crate::domain::rotation::CropRotationPlan;
use crate::engine::error::OptimizeResult;
use crate::engine::evaluation::{RotationEvaluation, RotationEvaluator};
use crate::engine::orchestrator::RotationOptimizationEngine;
use crate::engine::strategy::RotationStrategy;
use crate::knowledge::{CropKnowledgeBase, MarketTable, StaticKnowledgeBase};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

// ==========================================
// 请求 / 响应
// ==========================================

/// 轮作请求（JSON 外部接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationRequest {
    pub field_profile: FieldProfile,
    pub goals: Vec<RotationGoal>,
    #[serde(default)]
    pub constraints: Vec<RotationConstraint>,
    pub planning_horizon: i64,
}

/// 策略草案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDraft {
    pub strategy: RotationStrategy,
    pub title: String,
    pub plan: CropRotationPlan,
}

// ==========================================
// RotationApi - 轮作 API
// ==========================================
pub struct RotationApi<C>
where
    C: RotationConfigReader,
{
    config: Arc<C>,
    engine: Arc<RotationOptimizationEngine>,
}

impl<C> RotationApi<C>
where
    C: RotationConfigReader + 'static,
{
    /// 使用已构建的引擎创建 API
    pub fn new(config: Arc<C>, engine: Arc<RotationOptimizationEngine>) -> Self {
        Self { config, engine }
    }

    /// 按配置构建引擎（知识库/市场参数路径、评分参数）
    pub async fn from_config(config: Arc<C>) -> ApiResult<Self> {
        let params = config
            .get_scoring_parameters()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let knowledge: Arc<dyn CropKnowledgeBase> = match config
            .get_knowledge_base_path()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?
        {
            Some(path) => Arc::new(StaticKnowledgeBase::from_csv_path(Path::new(&path))?),
            None => Arc::new(StaticKnowledgeBase::builtin()),
        };

        let market = match config
            .get_market_table_path()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?
        {
            Some(path) => MarketTable::from_csv_path(Path::new(&path))?,
            None => MarketTable::builtin(),
        };

        let engine = RotationOptimizationEngine::new(knowledge, Arc::new(market), params);
        Ok(Self::new(config, Arc::new(engine)))
    }

    pub fn engine(&self) -> Arc<RotationOptimizationEngine> {
        Arc::clone(&self.engine)
    }

    // ==========================================
    // 方案生成
    // ==========================================

    /// 生成最优轮作方案
    #[instrument(skip_all, fields(field_id = %request.field_profile.field_id, planning_horizon = request.planning_horizon))]
    pub async fn generate_optimal_rotation(
        &self,
        request: RotationRequest,
    ) -> ApiResult<CropRotationPlan> {
        let horizon = self.validator().await?.validate(&request)?;
        let config_snapshot = self
            .config
            .get_config_snapshot()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let RotationRequest {
            field_profile,
            goals,
            constraints,
            ..
        } = request;

        let mut plan = self
            .run_with_budget(move |engine| {
                engine.generate_optimal_rotation(&field_profile, &goals, &constraints, horizon)
            })
            .await?;
        plan.config_snapshot = Some(config_snapshot);

        Ok(plan)
    }

    /// 按预设策略生成方案（目标集合取策略预设）
    pub async fn generate_with_strategy(
        &self,
        field_profile: FieldProfile,
        constraints: Vec<RotationConstraint>,
        planning_horizon: i64,
        strategy: RotationStrategy,
    ) -> ApiResult<CropRotationPlan> {
        self.generate_optimal_rotation(RotationRequest {
            field_profile,
            goals: strategy.goals(),
            constraints,
            planning_horizon,
        })
        .await
    }

    /// 多策略草案: 每个预设策略各生成一个方案
    pub async fn generate_strategy_drafts(
        &self,
        field_profile: FieldProfile,
        constraints: Vec<RotationConstraint>,
        planning_horizon: i64,
    ) -> ApiResult<Vec<StrategyDraft>> {
        let mut drafts = Vec::with_capacity(RotationStrategy::all().len());

        for strategy in RotationStrategy::all() {
            let plan = self
                .generate_with_strategy(
                    field_profile.clone(),
                    constraints.clone(),
                    planning_horizon,
                    strategy,
                )
                .await?;

            info!(
                strategy = strategy.as_str(),
                sequence = ?plan.crop_sequence(),
                overall_score = plan.overall_score,
                "策略草案生成完成"
            );

            drafts.push(StrategyDraft {
                strategy,
                title: strategy.title().to_string(),
                plan,
            });
        }

        Ok(drafts)
    }

    // ==========================================
    // 序列评估
    // ==========================================

    /// 评估调用方给定的轮作序列
    pub async fn evaluate_rotation(
        &self,
        field_profile: FieldProfile,
        sequence: Vec<String>,
        goals: Vec<RotationGoal>,
        constraints: Vec<RotationConstraint>,
    ) -> ApiResult<RotationEvaluation> {
        let max = self.max_planning_horizon().await?;
        if sequence.len() > max {
            return Err(ApiError::HorizonTooLarge {
                requested: sequence.len(),
                max,
            });
        }

        self.run_with_budget(move |engine| {
            RotationEvaluator::new(engine).evaluate_rotation(
                &field_profile,
                &sequence,
                &goals,
                &constraints,
            )
        })
        .await
    }

    // ==========================================
    // 内部方法
    // ==========================================

    async fn max_planning_horizon(&self) -> ApiResult<usize> {
        self.config
            .get_max_planning_horizon()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }

    async fn validator(&self) -> ApiResult<RequestValidator> {
        Ok(RequestValidator::new(self.max_planning_horizon().await?))
    }

    /// 在阻塞线程池中运行引擎,超过时间预算返回 Timeout
    ///
    /// 超时后后台任务继续运行至结束,其结果被丢弃
    async fn run_with_budget<T, F>(&self, job: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&RotationOptimizationEngine) -> OptimizeResult<T> + Send + 'static,
    {
        let budget_ms = self
            .config
            .get_time_budget_ms()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let engine = Arc::clone(&self.engine);
        let handle = tokio::task::spawn_blocking(move || job(&engine));

        match tokio::time::timeout(Duration::from_millis(budget_ms), handle).await {
            Err(_) => {
                warn!(budget_ms = budget_ms, "优化超出时间预算");
                Err(ApiError::Timeout { budget_ms })
            }
            Ok(Err(join_err)) => Err(ApiError::InternalError(format!(
                "优化任务异常终止: {}",
                join_err
            ))),
            Ok(Ok(result)) => Ok(result?),
        }
    }
}
