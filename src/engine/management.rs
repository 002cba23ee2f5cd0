// ==========================================
// 轮作优化引擎 - 田间管理建议
// ==========================================
// 职责: 为每个轮作年份生成模板化管理建议与播种窗口
// 红线: 氮肥减量建议只依据紧邻前茬
// 说明: 建议文本面向农户,使用英文模板
// ==========================================

use crate::domain::crop::normalize_crop_name;
use crate::domain::field::FieldProfile;
use crate::domain::types::{NitrogenDemand, PlantingSeason};
use crate::knowledge::CropKnowledgeBase;
use std::sync::Arc;

#[derive(Clone)]
pub struct ManagementAdvisor {
    knowledge: Arc<dyn CropKnowledgeBase>,
}

impl ManagementAdvisor {
    pub fn new(knowledge: Arc<dyn CropKnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// 生成管理建议
    ///
    /// # 参数
    /// - `crop_name`: 当年作物
    /// - `history`: 当年之前的作物序列
    /// - `field`: 地块档案
    pub fn management_notes<S: AsRef<str>>(
        &self,
        crop_name: &str,
        history: &[S],
        field: &FieldProfile,
    ) -> Vec<String> {
        let crop = normalize_crop_name(crop_name);
        let mut notes = Vec::new();

        let Some(entry) = self.knowledge.get_entry(&crop) else {
            notes.push(format!(
                "No agronomic profile for {}; yield and scoring use a generic default profile",
                crop
            ));
            notes.push(format!("Planting window: {}", self.planting_recommendation(&crop)));
            return notes;
        };

        let previous = history.last().map(|p| normalize_crop_name(p.as_ref()));
        let previous_entry = previous.as_deref().and_then(|p| self.knowledge.get_entry(p));

        // 氮素
        match (previous.as_deref(), previous_entry) {
            (Some(prev), Some(prev_entry)) if prev_entry.is_nitrogen_fixer() => {
                notes.push(format!(
                    "Following {}: reduce nitrogen fertilizer by about {:.0} lbs N/acre to account for the {} nitrogen credit",
                    prev, prev_entry.nitrogen_fixation_lbs_per_acre, prev
                ));
            }
            _ if entry.nitrogen_demand == NitrogenDemand::High => {
                notes.push(format!(
                    "Plan a full nitrogen program: {} has high nitrogen demand and no legume credit is available",
                    crop
                ));
            }
            _ => {}
        }

        // 前后茬相容性
        if let Some(prev) = previous.as_deref() {
            if self.knowledge.avoid_next_crops(prev).contains(&crop) {
                notes.push(format!(
                    "Scout for carry-over pests and diseases: {} is not recommended after {}",
                    crop, prev
                ));
            }
        }

        if entry.is_nitrogen_fixer() {
            notes.push(format!(
                "Inoculate {} seed with the appropriate rhizobia if the crop has not been grown recently",
                crop
            ));
        }

        // 土壤条件
        if let Some(ph) = field.soil_ph.filter(|v| v.is_finite()) {
            if ph < entry.optimal_ph_min {
                notes.push(format!(
                    "Apply lime: soil pH {:.1} is below the {:.1}-{:.1} range preferred by {}",
                    ph, entry.optimal_ph_min, entry.optimal_ph_max, crop
                ));
            } else if ph > entry.optimal_ph_max {
                notes.push(format!(
                    "Consider elemental sulfur or tolerant varieties: soil pH {:.1} is above the {:.1}-{:.1} range preferred by {}",
                    ph, entry.optimal_ph_min, entry.optimal_ph_max, crop
                ));
            }
        }

        if field.is_poorly_drained()
            && entry
                .disease_pressure
                .iter()
                .any(|d| d.contains("phytophthora"))
        {
            notes.push(format!(
                "Poorly drained field: choose {} varieties resistant to phytophthora root rot",
                crop
            ));
        }

        notes.push(format!("Planting window: {}", self.planting_recommendation(&crop)));
        notes
    }

    /// 播种窗口建议
    pub fn planting_recommendation(&self, crop_name: &str) -> String {
        match self.knowledge.get_entry(crop_name) {
            Some(entry) => match entry.planting_season {
                PlantingSeason::Fall => {
                    let window = if entry.planting_window.is_empty() {
                        "September-October"
                    } else {
                        entry.planting_window.as_str()
                    };
                    format!("{} (fall planted)", window)
                }
                PlantingSeason::Spring if entry.planting_window.is_empty() => {
                    "Spring, after soils reach planting temperature".to_string()
                }
                PlantingSeason::Spring => format!("{} (spring planted)", entry.planting_window),
            },
            None => "Consult local extension service for the planting window".to_string(),
        }
    }
}
