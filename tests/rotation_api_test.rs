// ==========================================
// 轮作 API 集成测试
// ==========================================
// 职责: 验证异步 API 层的请求校验、时间预算与多策略草案
// 场景:
// - 正常请求 → 方案
// - 年限/字段/约束非法 → 输入错误,不启动计算
// - 计算超时 → Timeout
// ==========================================


use crop_rotation_planner::api::{ApiError, RotationApi, RotationRequest};
use crop_rotation_planner::config::{config_keys, ConfigManager};
use crop_rotation_planner::{
    CropCompatibilityEntry, CropKnowledgeBase, GoalType, MarketTable, RotationConstraint,
    RotationOptimizationEngine, RotationStrategy, ScoringParameters, StaticKnowledgeBase,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::*;

// ==========================================
// 测试辅助函数
// ==========================================

/// 查询作物列表时阻塞的知识库（用于触发时间预算）
struct SlowKnowledgeBase {
    inner: StaticKnowledgeBase,
    delay: Duration,
}

impl CropKnowledgeBase for SlowKnowledgeBase {
    fn get_entry(&self, crop_name: &str) -> Option<&CropCompatibilityEntry> {
        self.inner.get_entry(crop_name)
    }

    fn crop_names(&self) -> Vec<String> {
        std::thread::sleep(self.delay);
        self.inner.crop_names()
    }

    fn canonical_rank(&self, crop_name: &str) -> usize {
        self.inner.canonical_rank(crop_name)
    }
}

fn create_test_api() -> RotationApi<ConfigManager> {
    create_test_api_with_config(ConfigManager::new())
}

fn create_test_api_with_config(config: ConfigManager) -> RotationApi<ConfigManager> {
    RotationApi::new(
        Arc::new(config),
        Arc::new(RotationOptimizationEngine::with_builtin_tables()),
    )
}

fn create_request(planning_horizon: i64) -> RotationRequest {
    RotationRequest {
        field_profile: create_test_field(),
        goals: soil_health_goals(),
        constraints: vec![RotationConstraint::max_consecutive("C1", "corn", 2, true)],
        planning_horizon,
    }
}

// ==========================================
// 正常路径
// ==========================================

#[tokio::test]
async fn test_generate_optimal_rotation_success() {
    let api = create_test_api();

    let plan = api.generate_optimal_rotation(create_request(5)).await.unwrap();

    assert_eq!(plan.field_id, "F001");
    assert_eq!(plan.rotation_years.len(), 5);
    assert_eq!(
        plan.crop_sequence(),
        vec!["alfalfa", "soybean", "oats", "alfalfa", "wheat"]
    );
    assert!(!plan.is_degraded());
}

#[tokio::test]
async fn test_request_parsed_from_json() {
    let api = create_test_api();
    let request: RotationRequest = serde_json::from_value(json!({
        "field_profile": {
            "field_id": "F-JSON",
            "field_name": "East 40",
            "farm_id": "FARM02",
            "size_acres": 40.0,
            "soil_type": "silt_loam",
            "drainage_class": "poorly_drained",
            "climate_zone": "4b",
            "soil_ph": 5.6
        },
        "goals": [
            {"goal_id": "G1", "goal_type": "yield_maximization", "weight": 0.5},
            {"goal_id": "G2", "goal_type": "pest_disease_management", "weight": 0.5}
        ],
        "planning_horizon": 3
    }))
    .unwrap();
    assert!(request.constraints.is_empty());

    let plan = api.generate_optimal_rotation(request).await.unwrap();
    assert_eq!(plan.field_id, "F-JSON");
    assert_eq!(plan.rotation_years.len(), 3);

    let value = serde_json::to_value(&plan).unwrap();
    assert!(value["rotation_years"].is_array());
    assert!(value["benefit_analysis"].is_object());
    assert!(value["plan_id"].is_string());
}

// ==========================================
// 输入错误
// ==========================================

#[tokio::test]
async fn test_non_positive_horizon_rejected() {
    let api = create_test_api();

    for horizon in [0, -1] {
        let err = api
            .generate_optimal_rotation(create_request(horizon))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)), "horizon={} 应被拒绝", horizon);
        assert!(err.is_input_error());
    }
}

#[tokio::test]
async fn test_horizon_above_configured_max_rejected() {
    let api = create_test_api();
    let err = api
        .generate_optimal_rotation(create_request(51))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::HorizonTooLarge {
            requested: 51,
            max: 50
        }
    ));

    let config = ConfigManager::new();
    config
        .set_config_value(config_keys::MAX_PLANNING_HORIZON, "4")
        .unwrap();
    let api = create_test_api_with_config(config);
    assert!(api.generate_optimal_rotation(create_request(4)).await.is_ok());
    assert!(matches!(
        api.generate_optimal_rotation(create_request(5)).await,
        Err(ApiError::HorizonTooLarge { requested: 5, max: 4 })
    ));
}

#[tokio::test]
async fn test_invalid_field_and_goals_rejected() {
    let api = create_test_api();

    let mut request = create_request(3);
    request.field_profile.field_id = "  ".to_string();
    request.field_profile.organic_matter_percent = Some(120.0);
    match api.generate_optimal_rotation(request).await {
        Err(ApiError::ValidationError { violations, .. }) => {
            assert_eq!(violations.len(), 2);
            assert_eq!(violations[0].field, "field_profile.field_id");
            assert_eq!(violations[1].field, "field_profile.organic_matter_percent");
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }

    let mut request = create_request(3);
    request.goals.clear();
    assert!(matches!(
        api.generate_optimal_rotation(request).await,
        Err(ApiError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_malformed_constraint_rejected() {
    let api = create_test_api();
    let mut request = create_request(3);
    let mut broken = RotationConstraint::max_consecutive("BROKEN", "corn", 2, true);
    broken.parameters.remove("max_consecutive");
    request.constraints = vec![broken];

    match api.generate_optimal_rotation(request).await {
        Err(ApiError::ValidationError { violations, .. }) => {
            assert_eq!(violations[0].field, "constraints[BROKEN]");
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

// ==========================================
// 时间预算
// ==========================================

#[tokio::test]
async fn test_slow_optimization_times_out() {
    let config = ConfigManager::new();
    config.set_config_value(config_keys::TIME_BUDGET_MS, "20").unwrap();

    let knowledge: Arc<dyn CropKnowledgeBase> = Arc::new(SlowKnowledgeBase {
        inner: StaticKnowledgeBase::builtin(),
        delay: Duration::from_millis(200),
    });
    let engine = RotationOptimizationEngine::new(
        knowledge,
        Arc::new(MarketTable::builtin()),
        ScoringParameters::default(),
    );
    let api = RotationApi::new(Arc::new(config), Arc::new(engine));

    let err = api
        .generate_optimal_rotation(create_request(3))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Timeout { budget_ms: 20 }));
    assert!(!err.is_input_error());
}

// ==========================================
// 多策略草案与序列评估
// ==========================================

#[tokio::test]
async fn test_strategy_drafts_cover_every_strategy() {
    let api = create_test_api();

    let drafts = api
        .generate_strategy_drafts(create_test_field(), vec![], 4)
        .await
        .unwrap();

    assert_eq!(drafts.len(), RotationStrategy::all().len());
    for (draft, strategy) in drafts.iter().zip(RotationStrategy::all()) {
        assert_eq!(draft.strategy, strategy);
        assert_eq!(draft.title, strategy.title());
        assert_eq!(draft.plan.rotation_years.len(), 4);
    }
}

#[tokio::test]
async fn test_generate_with_strategy_uses_preset_goals() {
    let api = create_test_api();

    let plan = api
        .generate_with_strategy(create_test_field(), vec![], 3, RotationStrategy::ProfitFirst)
        .await
        .unwrap();

    assert_eq!(plan.goals, RotationStrategy::ProfitFirst.goals());
    assert!(plan
        .goals
        .iter()
        .any(|g| g.goal_type == GoalType::ProfitMaximization));
}

#[tokio::test]
async fn test_evaluate_rotation_reports_violations() {
    let api = create_test_api();
    let sequence = vec!["corn".to_string(), "corn".to_string(), "soybean".to_string()];
    let constraints = vec![RotationConstraint::max_consecutive("C1", "corn", 1, true)];

    let evaluation = api
        .evaluate_rotation(create_test_field(), sequence, soil_health_goals(), constraints)
        .await
        .unwrap();

    assert!(!evaluation.is_feasible());
    assert_eq!(evaluation.hard_violations.len(), 1);
    assert_eq!(evaluation.hard_violations[0].year, Some(1));
    assert!(evaluation
        .compatibility_issues
        .iter()
        .any(|i| i.contains("corn should not follow corn")));

    let empty = api
        .evaluate_rotation(create_test_field(), vec![], soil_health_goals(), vec![])
        .await;
    assert!(matches!(empty, Err(ApiError::InvalidInput(_))));
}
