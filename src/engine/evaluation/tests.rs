use super::*;
use crate::domain::field::FieldProfile;
use crate::domain::goal::{RotationConstraint, RotationGoal};
use crate::domain::rotation::benefit_keys;
use crate::domain::types::GoalType;
use crate::engine::error::OptimizeError;
use crate::engine::orchestrator::RotationOptimizationEngine;

// ==========================================
// 测试辅助函数
// ==========================================

fn create_evaluator() -> RotationEvaluator {
    RotationEvaluator::new(&RotationOptimizationEngine::with_builtin_tables())
}

fn create_field() -> FieldProfile {
    FieldProfile::new("F001", "North 80", "FARM01", 80.0, "silt_loam", "well_drained", "5a")
}

fn balanced_goals() -> Vec<RotationGoal> {
    vec![
        RotationGoal::new("G1", GoalType::YieldMaximization, 0.5),
        RotationGoal::new("G2", GoalType::SoilHealth, 0.5),
    ]
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_corn_soybean_rotation_is_feasible() {
    let evaluator = create_evaluator();
    let constraints = vec![RotationConstraint::max_consecutive("C1", "corn", 1, true)];

    let evaluation = evaluator
        .evaluate_rotation(
            &create_field(),
            &["corn", "soybean", "corn", "soybean"],
            &balanced_goals(),
            &constraints,
        )
        .unwrap();

    assert!(evaluation.is_feasible());
    assert_eq!(evaluation.years.len(), 4);
    assert!(evaluation.compatibility_issues.is_empty());
    assert!(evaluation.unknown_crops.is_empty());
    assert_eq!(evaluation.benefit_analysis[benefit_keys::NITROGEN_FIXATION], 80.0);
}

#[test]
fn test_continuous_corn_reports_violations() {
    let evaluator = create_evaluator();
    let constraints = vec![
        RotationConstraint::max_consecutive("C1", "corn", 2, true),
        RotationConstraint::required_crop("Q1", "soybean", 1, false),
    ];

    let evaluation = evaluator
        .evaluate_rotation(
            &create_field(),
            &["corn", "corn", "corn", "corn"],
            &balanced_goals(),
            &constraints,
        )
        .unwrap();

    assert!(!evaluation.is_feasible());
    assert_eq!(evaluation.hard_violations.len(), 2);
    assert_eq!(evaluation.hard_violations[0].year, Some(2));
    assert_eq!(evaluation.soft_violations.len(), 1);
    assert_eq!(evaluation.compatibility_issues.len(), 3);
    assert!(evaluation.summary().contains("hard_violations=2"));
}

#[test]
fn test_rotation_scores_higher_than_monoculture() {
    let evaluator = create_evaluator();
    let field = create_field();
    let goals = balanced_goals();

    let rotated = evaluator
        .evaluate_rotation(&field, &["corn", "soybean", "wheat", "alfalfa"], &goals, &[])
        .unwrap();
    let mono = evaluator
        .evaluate_rotation(&field, &["corn", "corn", "corn", "corn"], &goals, &[])
        .unwrap();

    assert!(rotated.total_score > mono.total_score);
}

#[test]
fn test_unknown_crops_are_reported() {
    let evaluation = create_evaluator()
        .evaluate_rotation(&create_field(), &["Quinoa", "corn", "quinoa"], &balanced_goals(), &[])
        .unwrap();
    assert_eq!(evaluation.unknown_crops, vec!["quinoa".to_string()]);
    assert_eq!(evaluation.years[0].crop_name, "quinoa");
}

#[test]
fn test_empty_sequence_is_rejected() {
    let result = create_evaluator().evaluate_rotation::<&str>(&create_field(), &[], &balanced_goals(), &[]);
    assert!(matches!(result, Err(OptimizeError::InvalidInput(_))));
}
