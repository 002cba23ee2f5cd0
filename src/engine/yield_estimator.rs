// ==========================================
// 轮作优化引擎 - 单产估计器
// ==========================================
// 职责: 估计作物在轮作序列某一位置的单产
// 输入: 作物 + 地块档案 + 年序 + 前茬序列
// 输出: 估计单产 (> 0)
// ==========================================
// 红线: 氮素增益只看紧邻前茬（有界回看）
// 红线: 未知作物使用通用默认档案,永不报错
// ==========================================

use crate::domain::crop::{normalize_crop_name, CropCompatibilityEntry};
use crate::domain::field::FieldProfile;
use crate::engine::params::MIN_MAX_NITROGEN_CREDIT;
use crate::knowledge::CropKnowledgeBase;
use std::sync::Arc;

/// 地块条件系数区间
const FIELD_FACTOR_MIN: f64 = 0.5;
const FIELD_FACTOR_MAX: f64 = 1.2;

/// 总乘数区间
const MULTIPLIER_MIN: f64 = 0.3;
const MULTIPLIER_MAX: f64 = 1.5;

/// 每 lb 固氮对应的产量增益
const CREDIT_PER_LB: f64 = 0.001;

/// 忌后茬 / 同作物连作的产量拖累
const AVOID_NEXT_DRAG: f64 = 0.90;
const CONTINUOUS_DRAG: f64 = 0.95;

// ==========================================
// YieldEstimator - 单产估计器
// ==========================================
#[derive(Clone)]
pub struct YieldEstimator {
    knowledge: Arc<dyn CropKnowledgeBase>,
    max_nitrogen_credit: f64,
}

impl YieldEstimator {
    pub fn new(knowledge: Arc<dyn CropKnowledgeBase>) -> Self {
        Self {
            knowledge,
            max_nitrogen_credit: 0.20,
        }
    }

    pub fn with_max_nitrogen_credit(mut self, max_nitrogen_credit: f64) -> Self {
        self.max_nitrogen_credit = if max_nitrogen_credit.is_finite() {
            max_nitrogen_credit.max(MIN_MAX_NITROGEN_CREDIT)
        } else {
            MIN_MAX_NITROGEN_CREDIT
        };
        self
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 估计单产
    ///
    /// 乘数 = 氮素增益 × 轮作效应 × 地块条件,区间 [0.3, 1.5]
    ///
    /// # 参数
    /// - `crop_name`: 作物
    /// - `field`: 地块档案
    /// - `year_index`: 年序;前茬取 `preceding_sequence[..year_index]` 的最后一项
    /// - `preceding_sequence`: 前茬序列（可传入完整方案序列）
    pub fn estimate_yield<S: AsRef<str>>(
        &self,
        crop_name: &str,
        field: &FieldProfile,
        year_index: usize,
        preceding_sequence: &[S],
    ) -> f64 {
        let entry = self.knowledge.entry_or_default(crop_name);
        let predecessor = predecessor(year_index, preceding_sequence);

        let multiplier = self.nitrogen_credit_multiplier(&entry, predecessor)
            * self.rotation_effect(&entry, predecessor)
            * field_condition_factor(&entry, field);

        entry.base_yield.max(f64::EPSILON) * multiplier.clamp(MULTIPLIER_MIN, MULTIPLIER_MAX)
    }

    /// 前茬氮素增益乘数（>= 1.0,随前茬固氮量单调递增）
    pub fn nitrogen_credit_multiplier(
        &self,
        entry: &CropCompatibilityEntry,
        predecessor: Option<&str>,
    ) -> f64 {
        let fixation = predecessor
            .and_then(|p| self.knowledge.get_entry(p))
            .map(|p| p.nitrogen_fixation_lbs_per_acre)
            .unwrap_or(0.0);

        let credit = (fixation * CREDIT_PER_LB).min(self.max_nitrogen_credit);
        1.0 + credit * entry.nitrogen_demand.credit_response()
    }

    /// 轮作效应（忌后茬 0.90 / 同作物连作 0.95 / 其他 1.0）
    fn rotation_effect(&self, entry: &CropCompatibilityEntry, predecessor: Option<&str>) -> f64 {
        let Some(prev) = predecessor else {
            return 1.0;
        };

        if self.knowledge.avoid_next_crops(prev).contains(&entry.crop_name) {
            AVOID_NEXT_DRAG
        } else if normalize_crop_name(prev) == entry.crop_name {
            CONTINUOUS_DRAG
        } else {
            1.0
        }
    }
}

/// 紧邻前茬（`preceding_sequence[..year_index]` 的最后一项）
pub fn predecessor<S: AsRef<str>>(year_index: usize, preceding_sequence: &[S]) -> Option<&str> {
    let end = year_index.min(preceding_sequence.len());
    preceding_sequence[..end].last().map(|s| s.as_ref())
}

// ==========================================
// 地块条件系数
// ==========================================

/// 地块条件系数: 土壤质地 × 排水 × pH × 有机质 × 气候分区,区间 [0.5, 1.2]
pub fn field_condition_factor(entry: &CropCompatibilityEntry, field: &FieldProfile) -> f64 {
    let factor = soil_type_factor(&field.soil_type)
        * drainage_factor(&field.drainage_class)
        * ph_factor(entry, field.soil_ph)
        * organic_matter_factor(field.organic_matter_percent)
        * climate_zone_factor(field.climate_zone_number());

    factor.clamp(FIELD_FACTOR_MIN, FIELD_FACTOR_MAX)
}

fn normalize_class(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '-'], "_")
}

fn soil_type_factor(soil_type: &str) -> f64 {
    match normalize_class(soil_type).as_str() {
        "silt_loam" => 1.02,
        "loam" => 1.0,
        "silty_clay_loam" | "clay_loam" => 0.97,
        "silt" => 0.98,
        "muck" | "peat" => 0.95,
        "sandy_loam" | "loamy_sand" => 0.93,
        "clay" | "silty_clay" => 0.92,
        "sand" => 0.85,
        _ => 0.95,
    }
}

fn drainage_factor(drainage_class: &str) -> f64 {
    match normalize_class(drainage_class).as_str() {
        "well_drained" | "well" => 1.0,
        "moderately_well_drained" | "moderately_well" => 0.98,
        "somewhat_poorly_drained" | "somewhat_poor" => 0.92,
        "poorly_drained" | "poor" | "very_poorly_drained" => 0.85,
        "excessively_drained" | "somewhat_excessively_drained" => 0.90,
        _ => 0.95,
    }
}

fn ph_factor(entry: &CropCompatibilityEntry, soil_ph: Option<f64>) -> f64 {
    let Some(ph) = soil_ph.filter(|v| v.is_finite()) else {
        return 1.0;
    };

    let deviation = if ph < entry.optimal_ph_min {
        entry.optimal_ph_min - ph
    } else if ph > entry.optimal_ph_max {
        ph - entry.optimal_ph_max
    } else {
        0.0
    };

    (1.0 - 0.12 * deviation).max(0.6)
}

fn organic_matter_factor(organic_matter_percent: Option<f64>) -> f64 {
    match organic_matter_percent.filter(|v| v.is_finite()) {
        None => 1.0,
        Some(om) if om < 1.0 => 0.90,
        Some(om) if om < 2.0 => 0.95,
        Some(om) if om < 3.5 => 1.0,
        Some(_) => 1.03,
    }
}

fn climate_zone_factor(zone: Option<u32>) -> f64 {
    match zone {
        None => 1.0,
        Some(z) if z <= 3 => 0.85,
        Some(4) => 0.95,
        Some(z) if z <= 7 => 1.0,
        Some(z) if z <= 9 => 0.95,
        Some(_) => 0.90,
    }
}
