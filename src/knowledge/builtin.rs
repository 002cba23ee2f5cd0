// ==========================================
// 轮作优化引擎 - 内置作物知识库
// ==========================================
// 职责: 手工整理的作物相容性表（玉米带常见作物）
// 红线: 表构建后只读;规范顺序决定平局裁决
// ==========================================
// 注: 数值为经验常数,作为验收区间使用,固化前需农艺专家确认
// ==========================================

use crate::domain::crop::{normalize_crop_name, CropCompatibilityEntry};
use crate::domain::types::{NitrogenDemand, PlantingSeason};
use crate::knowledge::CropKnowledgeBase;
use std::collections::{BTreeSet, HashMap};

// ==========================================
// StaticKnowledgeBase - 静态知识库
// ==========================================
#[derive(Debug, Clone)]
pub struct StaticKnowledgeBase {
    entries: HashMap<String, CropCompatibilityEntry>,
    order: Vec<String>, // 规范顺序
}

impl StaticKnowledgeBase {
    /// 由条目列表构建（列表顺序即规范顺序,重名时后者覆盖前者但保留首次位置）
    pub fn from_entries(entries: Vec<CropCompatibilityEntry>) -> Self {
        let mut map = HashMap::with_capacity(entries.len());
        let mut order = Vec::with_capacity(entries.len());

        for mut entry in entries {
            let key = normalize_crop_name(&entry.crop_name);
            entry.crop_name = key.clone();
            if !map.contains_key(&key) {
                order.push(key.clone());
            }
            map.insert(key, entry);
        }

        Self {
            entries: map,
            order,
        }
    }

    /// 内置作物表
    ///
    /// 规范顺序: corn, soybean, wheat, alfalfa, oats, barley, canola, sunflower
    pub fn builtin() -> Self {
        Self::from_entries(vec![
            CropCompatibilityEntry {
                crop_name: "corn".to_string(),
                good_next: set(&["soybean", "alfalfa", "wheat", "oats"]),
                avoid_next: set(&["corn"]),
                nitrogen_demand: NitrogenDemand::High,
                nitrogen_fixation_lbs_per_acre: 0.0,
                pest_pressure: set(&["corn_rootworm", "european_corn_borer"]),
                disease_pressure: set(&["gray_leaf_spot", "northern_corn_leaf_blight"]),
                crop_family: "poaceae".to_string(),
                planting_season: PlantingSeason::Spring,
                planting_window: "April-May".to_string(),
                base_yield: 180.0,
                yield_unit: "bu/acre".to_string(),
                optimal_ph_min: 5.8,
                optimal_ph_max: 7.0,
                residue_contribution: 0.8,
            },
            CropCompatibilityEntry {
                crop_name: "soybean".to_string(),
                good_next: set(&["corn", "wheat", "canola"]),
                avoid_next: set(&["soybean", "sunflower"]),
                nitrogen_demand: NitrogenDemand::Low,
                nitrogen_fixation_lbs_per_acre: 40.0,
                pest_pressure: set(&["soybean_aphid", "soybean_cyst_nematode"]),
                disease_pressure: set(&["white_mold", "sudden_death_syndrome"]),
                crop_family: "fabaceae".to_string(),
                planting_season: PlantingSeason::Spring,
                planting_window: "May-June".to_string(),
                base_yield: 55.0,
                yield_unit: "bu/acre".to_string(),
                optimal_ph_min: 6.0,
                optimal_ph_max: 7.0,
                residue_contribution: 0.3,
            },
            CropCompatibilityEntry {
                crop_name: "wheat".to_string(),
                good_next: set(&["soybean", "canola", "alfalfa", "corn"]),
                avoid_next: set(&["wheat", "barley", "oats"]),
                nitrogen_demand: NitrogenDemand::Medium,
                nitrogen_fixation_lbs_per_acre: 0.0,
                pest_pressure: set(&["hessian_fly", "cereal_leaf_beetle"]),
                disease_pressure: set(&["fusarium_head_blight", "take_all"]),
                crop_family: "poaceae".to_string(),
                planting_season: PlantingSeason::Fall,
                planting_window: "September-October".to_string(),
                base_yield: 70.0,
                yield_unit: "bu/acre".to_string(),
                optimal_ph_min: 6.0,
                optimal_ph_max: 7.0,
                residue_contribution: 0.7,
            },
            CropCompatibilityEntry {
                crop_name: "alfalfa".to_string(),
                good_next: set(&["corn", "wheat"]),
                avoid_next: set(&["alfalfa"]),
                nitrogen_demand: NitrogenDemand::Low,
                nitrogen_fixation_lbs_per_acre: 150.0,
                pest_pressure: set(&["alfalfa_weevil", "potato_leafhopper"]),
                disease_pressure: set(&["verticillium_wilt", "phytophthora_root_rot"]),
                crop_family: "fabaceae".to_string(),
                planting_season: PlantingSeason::Spring,
                planting_window: "April-May".to_string(),
                base_yield: 4.5,
                yield_unit: "tons/acre".to_string(),
                optimal_ph_min: 6.5,
                optimal_ph_max: 7.5,
                residue_contribution: 0.9,
            },
            CropCompatibilityEntry {
                crop_name: "oats".to_string(),
                good_next: set(&["alfalfa", "soybean", "corn", "canola"]),
                avoid_next: set(&["oats", "wheat", "barley"]),
                nitrogen_demand: NitrogenDemand::Low,
                nitrogen_fixation_lbs_per_acre: 0.0,
                pest_pressure: set(&["cereal_leaf_beetle"]),
                disease_pressure: set(&["crown_rust"]),
                crop_family: "poaceae".to_string(),
                planting_season: PlantingSeason::Spring,
                planting_window: "March-April".to_string(),
                base_yield: 80.0,
                yield_unit: "bu/acre".to_string(),
                optimal_ph_min: 5.5,
                optimal_ph_max: 7.0,
                residue_contribution: 0.6,
            },
            CropCompatibilityEntry {
                crop_name: "barley".to_string(),
                good_next: set(&["soybean", "canola", "alfalfa"]),
                avoid_next: set(&["barley", "wheat", "oats"]),
                nitrogen_demand: NitrogenDemand::Medium,
                nitrogen_fixation_lbs_per_acre: 0.0,
                pest_pressure: set(&["cereal_leaf_beetle"]),
                disease_pressure: set(&["fusarium_head_blight", "net_blotch"]),
                crop_family: "poaceae".to_string(),
                planting_season: PlantingSeason::Spring,
                planting_window: "March-April".to_string(),
                base_yield: 75.0,
                yield_unit: "bu/acre".to_string(),
                optimal_ph_min: 6.0,
                optimal_ph_max: 7.5,
                residue_contribution: 0.6,
            },
            CropCompatibilityEntry {
                crop_name: "canola".to_string(),
                good_next: set(&["wheat", "barley", "corn"]),
                avoid_next: set(&["canola", "sunflower", "soybean"]),
                nitrogen_demand: NitrogenDemand::High,
                nitrogen_fixation_lbs_per_acre: 0.0,
                pest_pressure: set(&["flea_beetle"]),
                disease_pressure: set(&["sclerotinia_stem_rot", "blackleg"]),
                crop_family: "brassicaceae".to_string(),
                planting_season: PlantingSeason::Spring,
                planting_window: "April-May".to_string(),
                base_yield: 45.0,
                yield_unit: "bu/acre".to_string(),
                optimal_ph_min: 6.0,
                optimal_ph_max: 7.5,
                residue_contribution: 0.4,
            },
            CropCompatibilityEntry {
                crop_name: "sunflower".to_string(),
                good_next: set(&["wheat", "barley", "corn"]),
                avoid_next: set(&["sunflower", "canola", "soybean"]),
                nitrogen_demand: NitrogenDemand::Medium,
                nitrogen_fixation_lbs_per_acre: 0.0,
                pest_pressure: set(&["sunflower_stem_weevil"]),
                disease_pressure: set(&["sclerotinia_stem_rot", "white_mold"]),
                crop_family: "asteraceae".to_string(),
                planting_season: PlantingSeason::Spring,
                planting_window: "May-June".to_string(),
                base_yield: 1800.0,
                yield_unit: "lbs/acre".to_string(),
                optimal_ph_min: 6.0,
                optimal_ph_max: 7.5,
                residue_contribution: 0.35,
            },
        ])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for StaticKnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CropKnowledgeBase for StaticKnowledgeBase {
    fn get_entry(&self, crop_name: &str) -> Option<&CropCompatibilityEntry> {
        self.entries.get(&normalize_crop_name(crop_name))
    }

    fn crop_names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn canonical_rank(&self, crop_name: &str) -> usize {
        let normalized = normalize_crop_name(crop_name);
        self.order
            .iter()
            .position(|c| *c == normalized)
            .unwrap_or(usize::MAX)
    }
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}
