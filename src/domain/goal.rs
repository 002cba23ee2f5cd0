// ==========================================
// 轮作优化引擎 - 目标与约束
// ==========================================
// 职责: 调用方目标(带权重)、原始约束(JSON 参数) 与 类型化约束规则
// 红线: 硬约束在输出中不得违反;软约束只扣分
// ==========================================

use crate::domain::crop::normalize_crop_name;
use crate::domain::types::{ConstraintType, GoalType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ==========================================
// RotationGoal - 轮作目标
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationGoal {
    pub goal_id: String,
    pub goal_type: GoalType,
    #[serde(default)]
    pub priority: i32, // 数值越小越优先（仅用于排序展示）
    pub weight: f64,   // 加权求和权重,约定和为 1 但不强制
    #[serde(default)]
    pub description: Option<String>,
}

impl RotationGoal {
    pub fn new(goal_id: impl Into<String>, goal_type: GoalType, weight: f64) -> Self {
        Self {
            goal_id: goal_id.into(),
            goal_type,
            priority: 1,
            weight,
            description: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

// ==========================================
// RotationConstraint - 原始约束（外部接口形态）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConstraint {
    pub constraint_id: String,
    pub constraint_type: ConstraintType,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default = "default_is_hard")]
    pub is_hard_constraint: bool,
}

fn default_is_hard() -> bool {
    true
}

impl RotationConstraint {
    /// 连作上限约束: crop 连续出现不超过 max_consecutive 年
    pub fn max_consecutive(
        constraint_id: impl Into<String>,
        crop_name: &str,
        max_consecutive: u32,
        is_hard_constraint: bool,
    ) -> Self {
        let mut parameters = Map::new();
        parameters.insert("crop_name".to_string(), Value::from(crop_name));
        parameters.insert("max_consecutive".to_string(), Value::from(max_consecutive));
        Self {
            constraint_id: constraint_id.into(),
            constraint_type: ConstraintType::MaxConsecutive,
            parameters,
            is_hard_constraint,
        }
    }

    /// 必选作物约束: crop 至少出现 min_occurrences 次
    pub fn required_crop(
        constraint_id: impl Into<String>,
        crop_name: &str,
        min_occurrences: u32,
        is_hard_constraint: bool,
    ) -> Self {
        let mut parameters = Map::new();
        parameters.insert("crop_name".to_string(), Value::from(crop_name));
        parameters.insert("min_occurrences".to_string(), Value::from(min_occurrences));
        Self {
            constraint_id: constraint_id.into(),
            constraint_type: ConstraintType::RequiredCrop,
            parameters,
            is_hard_constraint,
        }
    }

    /// 禁种作物约束
    pub fn excluded_crop(
        constraint_id: impl Into<String>,
        crop_name: &str,
        is_hard_constraint: bool,
    ) -> Self {
        let mut parameters = Map::new();
        parameters.insert("crop_name".to_string(), Value::from(crop_name));
        Self {
            constraint_id: constraint_id.into(),
            constraint_type: ConstraintType::ExcludedCrop,
            parameters,
            is_hard_constraint,
        }
    }

    /// 最短回茬间隔约束: 两次种植之间至少隔 years 年
    pub fn min_return_interval(
        constraint_id: impl Into<String>,
        crop_name: &str,
        years: u32,
        is_hard_constraint: bool,
    ) -> Self {
        let mut parameters = Map::new();
        parameters.insert("crop_name".to_string(), Value::from(crop_name));
        parameters.insert("years".to_string(), Value::from(years));
        Self {
            constraint_id: constraint_id.into(),
            constraint_type: ConstraintType::MinReturnInterval,
            parameters,
            is_hard_constraint,
        }
    }

    /// 出现次数上限约束
    pub fn max_occurrences(
        constraint_id: impl Into<String>,
        crop_name: &str,
        max_occurrences: u32,
        is_hard_constraint: bool,
    ) -> Self {
        let mut parameters = Map::new();
        parameters.insert("crop_name".to_string(), Value::from(crop_name));
        parameters.insert("max_occurrences".to_string(), Value::from(max_occurrences));
        Self {
            constraint_id: constraint_id.into(),
            constraint_type: ConstraintType::MaxOccurrences,
            parameters,
            is_hard_constraint,
        }
    }
}

// ==========================================
// ConstraintRule - 类型化约束规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    MaxConsecutive { crop: String, max: u32 },
    RequiredCrop { crop: String, min_occurrences: u32 },
    ExcludedCrop { crop: String },
    MinReturnInterval { crop: String, years: u32 },
    MaxOccurrences { crop: String, max: u32 },
}

impl ConstraintKind {
    pub fn crop(&self) -> &str {
        match self {
            ConstraintKind::MaxConsecutive { crop, .. }
            | ConstraintKind::RequiredCrop { crop, .. }
            | ConstraintKind::ExcludedCrop { crop }
            | ConstraintKind::MinReturnInterval { crop, .. }
            | ConstraintKind::MaxOccurrences { crop, .. } => crop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintRule {
    pub constraint_id: String,
    pub kind: ConstraintKind,
    pub is_hard: bool,
}

impl ConstraintRule {
    /// 从原始约束解析类型化规则
    ///
    /// # 返回
    /// - Ok(ConstraintRule): 参数合法
    /// - Err(String): 参数缺失/类型错误/取值越界的原因
    pub fn parse(constraint: &RotationConstraint) -> Result<Self, String> {
        let params = &constraint.parameters;
        let crop = crop_param(params)?;

        let kind = match constraint.constraint_type {
            ConstraintType::MaxConsecutive => {
                let max = u32_param(params, "max_consecutive")?;
                if max == 0 {
                    return Err("max_consecutive 必须 >= 1（禁种请使用 excluded_crop）".to_string());
                }
                ConstraintKind::MaxConsecutive { crop, max }
            }
            ConstraintType::RequiredCrop => {
                let min_occurrences = match params.get("min_occurrences") {
                    Some(_) => u32_param(params, "min_occurrences")?,
                    None => 1,
                };
                if min_occurrences == 0 {
                    return Err("min_occurrences 必须 >= 1".to_string());
                }
                ConstraintKind::RequiredCrop {
                    crop,
                    min_occurrences,
                }
            }
            ConstraintType::ExcludedCrop => ConstraintKind::ExcludedCrop { crop },
            ConstraintType::MinReturnInterval => {
                let years = u32_param(params, "years")?;
                if years == 0 {
                    return Err("years 必须 >= 1".to_string());
                }
                ConstraintKind::MinReturnInterval { crop, years }
            }
            ConstraintType::MaxOccurrences => ConstraintKind::MaxOccurrences {
                crop,
                max: u32_param(params, "max_occurrences")?,
            },
        };

        Ok(Self {
            constraint_id: constraint.constraint_id.clone(),
            kind,
            is_hard: constraint.is_hard_constraint,
        })
    }
}

fn crop_param(params: &Map<String, Value>) -> Result<String, String> {
    let raw = params
        .get("crop_name")
        .or_else(|| params.get("crop"))
        .ok_or_else(|| "缺少参数 crop_name".to_string())?;

    let name = raw
        .as_str()
        .ok_or_else(|| format!("crop_name 必须为字符串, 实际: {}", raw))?;

    let normalized = normalize_crop_name(name);
    if normalized.is_empty() {
        return Err("crop_name 不能为空".to_string());
    }
    Ok(normalized)
}

fn u32_param(params: &Map<String, Value>, key: &str) -> Result<u32, String> {
    let raw = params
        .get(key)
        .ok_or_else(|| format!("缺少参数 {}", key))?;

    let value = match raw {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                // 允许 2.0 这类整数值浮点
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .ok_or_else(|| format!("{} 必须为非负整数, 实际: {}", key, n))?,
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("{} 必须为非负整数, 实际: {}", key, s))?,
        other => return Err(format!("{} 必须为非负整数, 实际: {}", key, other)),
    };

    u32::try_from(value).map_err(|_| format!("{} 超出范围: {}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_max_consecutive() {
        let constraint = RotationConstraint::max_consecutive("C1", " Corn ", 2, true);
        let rule = ConstraintRule::parse(&constraint).unwrap();
        assert_eq!(
            rule.kind,
            ConstraintKind::MaxConsecutive {
                crop: "corn".to_string(),
                max: 2
            }
        );
        assert!(rule.is_hard);
    }

    #[test]
    fn test_parse_accepts_numeric_strings_and_integral_floats() {
        let constraint: RotationConstraint = serde_json::from_value(json!({
            "constraint_id": "C2",
            "constraint_type": "min_return_interval",
            "parameters": {"crop": "canola", "years": "3"},
            "is_hard_constraint": false
        }))
        .unwrap();
        let rule = ConstraintRule::parse(&constraint).unwrap();
        assert_eq!(
            rule.kind,
            ConstraintKind::MinReturnInterval {
                crop: "canola".to_string(),
                years: 3
            }
        );

        let constraint: RotationConstraint = serde_json::from_value(json!({
            "constraint_id": "C3",
            "constraint_type": "max_occurrences",
            "parameters": {"crop_name": "wheat", "max_occurrences": 2.0}
        }))
        .unwrap();
        assert!(constraint.is_hard_constraint);
        assert!(ConstraintRule::parse(&constraint).is_ok());
    }

    #[test]
    fn test_parse_rejects_malformed_parameters() {
        let missing_crop: RotationConstraint = serde_json::from_value(json!({
            "constraint_id": "C1",
            "constraint_type": "max_consecutive",
            "parameters": {"max_consecutive": 2}
        }))
        .unwrap();
        assert!(ConstraintRule::parse(&missing_crop).is_err());

        let negative: RotationConstraint = serde_json::from_value(json!({
            "constraint_id": "C2",
            "constraint_type": "max_consecutive",
            "parameters": {"crop_name": "corn", "max_consecutive": -1}
        }))
        .unwrap();
        assert!(ConstraintRule::parse(&negative).is_err());

        let zero = RotationConstraint::max_consecutive("C3", "corn", 0, true);
        assert!(ConstraintRule::parse(&zero).is_err());
    }

    #[test]
    fn test_required_crop_defaults_to_one_occurrence() {
        let constraint = RotationConstraint {
            constraint_id: "R1".to_string(),
            constraint_type: ConstraintType::RequiredCrop,
            parameters: {
                let mut m = Map::new();
                m.insert("crop_name".to_string(), json!("alfalfa"));
                m
            },
            is_hard_constraint: true,
        };
        let rule = ConstraintRule::parse(&constraint).unwrap();
        assert_eq!(
            rule.kind,
            ConstraintKind::RequiredCrop {
                crop: "alfalfa".to_string(),
                min_occurrences: 1
            }
        );
    }
}
