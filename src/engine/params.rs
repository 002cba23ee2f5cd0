// ==========================================
// 轮作优化引擎 - 评分参数
// ==========================================
// 说明: 权重与阈值均为经验常数,可由配置层覆写
// ==========================================

use serde::{Deserialize, Serialize};

/// 氮素增益上限的下界
///
/// 内置最强固氮作物（紫花苜蓿 150 lbs/acre）的增益为 0.15,
/// 上限低于此值时苜蓿与大豆前茬的增益被截平,单调性失效
pub const MIN_MAX_NITROGEN_CREDIT: f64 = 0.15;

/// 评分参数（均有默认值,配置缺失时回退）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParameters {
    /// 平局裁决容差：与最高分差距在此之内视为平局
    pub tie_epsilon: f64,

    /// 多样性窗口（年）：可持续性得分统计的尾部窗口长度
    pub diversity_window: usize,

    /// 每条被违反的软约束扣分
    pub soft_constraint_penalty: f64,

    /// 候选作物在前茬“忌后茬”集合中的扣分
    pub avoid_next_penalty: f64,

    /// 候选作物在前茬“适宜后茬”集合中的加分
    pub good_next_bonus: f64,

    /// 利润得分参考值（USD/acre,净收益达到此值记满分）
    pub profit_reference_per_acre: f64,

    /// 固氮得分参考值（lbs N/acre,达到此值记满分）
    pub fixation_reference_lbs: f64,

    /// 前茬氮素产量增益上限（0.20 即 +20%）
    pub max_nitrogen_credit: f64,
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self {
            tie_epsilon: 1e-9,
            diversity_window: 4,
            soft_constraint_penalty: 0.25,
            avoid_next_penalty: 0.15,
            good_next_bonus: 0.05,
            profit_reference_per_acre: 600.0,
            fixation_reference_lbs: 200.0,
            max_nitrogen_credit: 0.20,
        }
    }
}

impl ScoringParameters {
    /// 修正非法取值（负数/非有限值回退默认,氮素增益上限低于下界同样回退）
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let pick = |v: f64, d: f64| if v.is_finite() && v >= 0.0 { v } else { d };
        let positive = |v: f64, d: f64| if v.is_finite() && v > 0.0 { v } else { d };

        Self {
            tie_epsilon: pick(self.tie_epsilon, defaults.tie_epsilon),
            diversity_window: self.diversity_window.max(1),
            soft_constraint_penalty: pick(self.soft_constraint_penalty, defaults.soft_constraint_penalty),
            avoid_next_penalty: pick(self.avoid_next_penalty, defaults.avoid_next_penalty),
            good_next_bonus: pick(self.good_next_bonus, defaults.good_next_bonus),
            profit_reference_per_acre: positive(
                self.profit_reference_per_acre,
                defaults.profit_reference_per_acre,
            ),
            fixation_reference_lbs: positive(self.fixation_reference_lbs, defaults.fixation_reference_lbs),
            max_nitrogen_credit: if self.max_nitrogen_credit.is_finite()
                && self.max_nitrogen_credit >= MIN_MAX_NITROGEN_CREDIT
            {
                self.max_nitrogen_credit
            } else {
                defaults.max_nitrogen_credit
            },
        }
    }
}
