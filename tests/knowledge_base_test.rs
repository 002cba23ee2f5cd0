// ==========================================
// 作物知识库加载集成测试
// ==========================================
// 职责: 验证 CSV 知识库/市场参数表的加载与错误报告
// 场景:
// - 临时 CSV → 知识库 → 引擎生成方案
// - 文件不存在 / 扩展名错误 / 缺列 / 无数据行
// - 通过配置路径构建 API
// ==========================================


use crop_rotation_planner::api::{ApiError, RotationApi};
use crop_rotation_planner::config::{config_keys, ConfigManager};
use crop_rotation_planner::{
    CropKnowledgeBase, KnowledgeBaseError, MarketTable, PlantingSeason, RotationConstraint,
    RotationOptimizationEngine, ScoringParameters, StaticKnowledgeBase,
};
use std::path::Path;
use std::sync::Arc;
use test_helpers::*;

// ==========================================
// 测试辅助函数
// ==========================================

fn load_small_knowledge_base() -> StaticKnowledgeBase {
    let file = create_temp_file(".csv", SMALL_CROPS_CSV);
    StaticKnowledgeBase::from_csv_path(file.path()).unwrap()
}

// ==========================================
// 加载成功
// ==========================================

#[test]
fn test_load_crop_table_from_csv_file() {
    let kb = load_small_knowledge_base();

    assert_eq!(kb.crop_names(), vec!["corn", "field_peas", "rye"]);
    let rye = kb.get_entry("Rye").unwrap();
    assert_eq!(rye.planting_season, PlantingSeason::Fall);
    assert_eq!(rye.crop_family, "poaceae");
    assert!(rye.pest_pressure.is_empty());
    assert!(kb.good_next_crops("corn").contains("field_peas"));
    assert!(kb.avoid_next_crops("field peas").contains("field_peas"));
    assert_eq!(kb.canonical_rank("rye"), 2);
    assert_eq!(kb.canonical_rank("quinoa"), usize::MAX);
}

#[test]
fn test_engine_runs_on_loaded_crop_table() {
    let knowledge: Arc<dyn CropKnowledgeBase> = Arc::new(load_small_knowledge_base());
    let engine = RotationOptimizationEngine::new(
        knowledge,
        Arc::new(MarketTable::empty()),
        ScoringParameters::default(),
    );
    let constraints = vec![RotationConstraint::max_consecutive("C1", "corn", 1, true)];

    let plan = engine
        .generate_optimal_rotation(&create_test_field(), &production_goals(), &constraints, 4)
        .unwrap();

    assert_eq!(plan.rotation_years.len(), 4);
    for year in &plan.rotation_years {
        assert!(
            ["corn", "field_peas", "rye"].contains(&year.crop_name.as_str()),
            "方案只能使用知识库中的作物: {}",
            year.crop_name
        );
    }
}

#[test]
fn test_load_market_table_from_csv_file() {
    let file = create_temp_file(
        ".csv",
        "crop_name,price_per_unit,production_cost_per_acre\nCorn,4.5,500\nRye,6.0,220\n",
    );

    let table = MarketTable::from_csv_path(file.path()).unwrap();
    assert_eq!(table.len(), 2);
    let corn = table.economics("corn").unwrap();
    assert_eq!(corn.price_per_unit, 4.5);
    assert_eq!(corn.production_cost_per_acre, 500.0);
    assert!(table.economics("field_peas").is_none());
}

// ==========================================
// 加载失败
// ==========================================

#[test]
fn test_missing_file_reported() {
    let result = StaticKnowledgeBase::from_csv_path(Path::new("/nonexistent/crops.csv"));
    assert!(matches!(result, Err(KnowledgeBaseError::FileNotFound(_))));
}

#[test]
fn test_wrong_extension_reported() {
    let file = create_temp_file(".txt", SMALL_CROPS_CSV);
    let result = StaticKnowledgeBase::from_csv_path(file.path());
    assert!(matches!(result, Err(KnowledgeBaseError::UnsupportedFormat(ext)) if ext == "txt"));
}

#[test]
fn test_missing_required_column_reported() {
    let file = create_temp_file(
        ".csv",
        "crop_name,nitrogen_demand\nCorn,high\n",
    );

    match StaticKnowledgeBase::from_csv_path(file.path()) {
        Err(KnowledgeBaseError::MissingField { row, field }) => {
            assert_eq!(row, 2);
            assert_eq!(field, "base_yield");
        }
        other => panic!("Expected MissingField, got {:?}", other.map(|kb| kb.crop_names())),
    }
}

#[test]
fn test_bad_value_reported() {
    let file = create_temp_file(
        ".csv",
        "crop_name,nitrogen_demand,base_yield\nCorn,extreme,175\n",
    );

    let result = StaticKnowledgeBase::from_csv_path(file.path());
    assert!(matches!(
        result,
        Err(KnowledgeBaseError::FieldValueError { row: 2, ref field, .. }) if field == "nitrogen_demand"
    ));
}

#[test]
fn test_non_finite_values_reported() {
    let cases = [
        ("crop_name,nitrogen_demand,base_yield\nCorn,high,NaN\n", "base_yield"),
        (
            "crop_name,nitrogen_demand,base_yield,nitrogen_fixation_lbs_per_acre\nSoybean,low,50,inf\n",
            "nitrogen_fixation_lbs_per_acre",
        ),
        (
            "crop_name,nitrogen_demand,base_yield,optimal_ph_min\nCorn,high,175,NaN\n",
            "optimal_ph_min",
        ),
        (
            "crop_name,nitrogen_demand,base_yield,optimal_ph_max\nCorn,high,175,-inf\n",
            "optimal_ph_max",
        ),
    ];

    for (content, expected_field) in cases {
        let file = create_temp_file(".csv", content);
        let result = StaticKnowledgeBase::from_csv_path(file.path());
        assert!(
            matches!(
                result,
                Err(KnowledgeBaseError::FieldValueError { row: 2, ref field, .. }) if field == expected_field
            ),
            "{} 的非有限值应被拒绝",
            expected_field
        );
    }

    let market = create_temp_file(
        ".csv",
        "crop_name,price_per_unit,production_cost_per_acre\nCorn,NaN,500\n",
    );
    assert!(matches!(
        MarketTable::from_csv_path(market.path()),
        Err(KnowledgeBaseError::FieldValueError { row: 2, ref field, .. }) if field == "price_per_unit"
    ));
}

#[test]
fn test_header_only_file_is_empty() {
    let file = create_temp_file(".csv", "crop_name,nitrogen_demand,base_yield\n");
    let result = StaticKnowledgeBase::from_csv_path(file.path());
    assert!(matches!(result, Err(KnowledgeBaseError::Empty(_))));
}

// ==========================================
// 通过配置构建 API
// ==========================================

#[tokio::test]
async fn test_api_from_config_uses_configured_tables() {
    let crops = create_temp_file(".csv", SMALL_CROPS_CSV);
    let market = create_temp_file(
        ".csv",
        "crop_name,price_per_unit,production_cost_per_acre\ncorn,4.5,500\n",
    );

    let config = ConfigManager::new();
    config
        .set_config_value(
            config_keys::KNOWLEDGE_BASE_PATH,
            crops.path().display().to_string(),
        )
        .unwrap();
    config
        .set_config_value(
            config_keys::MARKET_TABLE_PATH,
            market.path().display().to_string(),
        )
        .unwrap();

    let api = RotationApi::from_config(Arc::new(config)).await.unwrap();
    assert_eq!(
        api.engine().knowledge().crop_names(),
        vec!["corn", "field_peas", "rye"]
    );
}

#[tokio::test]
async fn test_api_from_config_reports_missing_table() {
    let config = ConfigManager::new();
    config
        .set_config_value(config_keys::KNOWLEDGE_BASE_PATH, "/nonexistent/crops.csv")
        .unwrap();

    let result = RotationApi::from_config(Arc::new(config)).await;
    assert!(matches!(
        result,
        Err(ApiError::KnowledgeBase(KnowledgeBaseError::FileNotFound(_)))
    ));
}
