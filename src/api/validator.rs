// ==========================================
// 轮作优化引擎 - 请求校验器
// ==========================================
// 职责: 在进入引擎之前拦截输入契约违反
// 红线: 校验失败时计算不启动
// ==========================================

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::api::rotation_api::RotationRequest;
use std::collections::HashSet;

// ==========================================
// RequestValidator - 请求校验器
// ==========================================
pub struct RequestValidator {
    max_planning_horizon: usize,
}

impl RequestValidator {
    pub fn new(max_planning_horizon: usize) -> Self {
        Self {
            max_planning_horizon,
        }
    }

    /// 校验轮作请求
    ///
    /// # 返回
    /// - Ok(usize): 校验通过后的规划年限
    /// - Err(ApiError): 第一类错误（年限、目标为空）直接返回;字段级问题汇总为 ValidationError
    pub fn validate(&self, request: &RotationRequest) -> ApiResult<usize> {
        let horizon = self.validate_horizon(request.planning_horizon)?;

        if request.goals.is_empty() {
            return Err(ApiError::InvalidInput("至少需要一个轮作目标".to_string()));
        }

        let mut violations = Vec::new();
        let field = &request.field_profile;

        if field.field_id.trim().is_empty() {
            violations.push(violation("field_profile.field_id", "不能为空"));
        }
        if !field.size_acres.is_finite() || field.size_acres <= 0.0 {
            violations.push(violation(
                "field_profile.size_acres",
                &format!("必须为正数, 实际: {}", field.size_acres),
            ));
        }
        if let Some(ph) = field.soil_ph {
            if !ph.is_finite() || !(0.0..=14.0).contains(&ph) {
                violations.push(violation(
                    "field_profile.soil_ph",
                    &format!("必须在 [0, 14] 范围内, 实际: {}", ph),
                ));
            }
        }
        if let Some(om) = field.organic_matter_percent {
            if !om.is_finite() || !(0.0..=100.0).contains(&om) {
                violations.push(violation(
                    "field_profile.organic_matter_percent",
                    &format!("必须在 [0, 100] 范围内, 实际: {}", om),
                ));
            }
        }

        let mut goal_ids = HashSet::new();
        for (i, goal) in request.goals.iter().enumerate() {
            if !goal.weight.is_finite() || goal.weight < 0.0 {
                violations.push(violation(
                    &format!("goals[{}].weight", i),
                    &format!("必须为非负有限数, 实际: {}", goal.weight),
                ));
            }
            if !goal_ids.insert(goal.goal_id.as_str()) {
                violations.push(violation(
                    &format!("goals[{}].goal_id", i),
                    &format!("重复的 goal_id: {}", goal.goal_id),
                ));
            }
        }

        if violations.is_empty() {
            Ok(horizon)
        } else {
            Err(ApiError::ValidationError {
                reason: format!("{} 项字段校验失败", violations.len()),
                violations,
            })
        }
    }

    /// 校验规划年限: 1..=max_planning_horizon
    pub fn validate_horizon(&self, planning_horizon: i64) -> ApiResult<usize> {
        if planning_horizon <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "planning_horizon 必须大于 0, 实际: {}",
                planning_horizon
            )));
        }

        let horizon = usize::try_from(planning_horizon).unwrap_or(usize::MAX);
        if horizon > self.max_planning_horizon {
            return Err(ApiError::HorizonTooLarge {
                requested: horizon,
                max: self.max_planning_horizon,
            });
        }

        Ok(horizon)
    }
}

fn violation(field: &str, reason: &str) -> ValidationViolation {
    ValidationViolation {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
