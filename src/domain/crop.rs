// ==========================================
// 轮作优化引擎 - 作物农艺档案
// ==========================================
// 红线: 静态只读,运行期不修改
// ==========================================

use crate::domain::types::{NitrogenDemand, PlantingSeason};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 作物名称归一化（去空白、小写、空格转下划线）
pub fn normalize_crop_name(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '-'], "_")
}

// ==========================================
// CropCompatibilityEntry - 作物相容性条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropCompatibilityEntry {
    pub crop_name: String,

    // ===== 前后茬相容性 =====
    pub good_next: BTreeSet<String>,  // 适宜后茬
    pub avoid_next: BTreeSet<String>, // 忌后茬

    // ===== 氮素 =====
    pub nitrogen_demand: NitrogenDemand,
    pub nitrogen_fixation_lbs_per_acre: f64, // 非固氮作物为 0

    // ===== 病虫害压力标签 =====
    pub pest_pressure: BTreeSet<String>,
    pub disease_pressure: BTreeSet<String>,

    // ===== 栽培属性 =====
    pub crop_family: String,
    pub planting_season: PlantingSeason,
    pub planting_window: String,
    pub base_yield: f64, // 基准单产
    pub yield_unit: String,
    pub optimal_ph_min: f64,
    pub optimal_ph_max: f64,
    pub residue_contribution: f64, // 残茬对有机质的贡献 [0,1]
}

impl CropCompatibilityEntry {
    pub fn is_nitrogen_fixer(&self) -> bool {
        self.nitrogen_fixation_lbs_per_acre > 0.0
    }

    /// 病虫害标签并集
    pub fn pressure_tags(&self) -> BTreeSet<&str> {
        self.pest_pressure
            .iter()
            .chain(self.disease_pressure.iter())
            .map(String::as_str)
            .collect()
    }

    /// 未知作物的通用默认档案（中位估计）
    pub fn generic_default(crop_name: &str) -> Self {
        Self {
            crop_name: normalize_crop_name(crop_name),
            good_next: BTreeSet::new(),
            avoid_next: BTreeSet::new(),
            nitrogen_demand: NitrogenDemand::Medium,
            nitrogen_fixation_lbs_per_acre: 0.0,
            pest_pressure: BTreeSet::new(),
            disease_pressure: BTreeSet::new(),
            crop_family: "unknown".to_string(),
            planting_season: PlantingSeason::Spring,
            planting_window: String::new(),
            base_yield: 50.0,
            yield_unit: "units/acre".to_string(),
            optimal_ph_min: 6.0,
            optimal_ph_max: 7.5,
            residue_contribution: 0.5,
        }
    }
}

// ==========================================
// CropEconomics - 作物经济参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropEconomics {
    pub price_per_unit: f64,           // 单位产量价格 (USD)
    pub production_cost_per_acre: f64, // 每英亩生产成本 (USD)
}

impl CropEconomics {
    /// 每英亩净收益
    pub fn margin_per_acre(&self, estimated_yield: f64) -> f64 {
        estimated_yield * self.price_per_unit - self.production_cost_per_acre
    }
}
