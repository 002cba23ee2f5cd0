// ==========================================
// 轮作优化引擎 - 轮作效益分析
// ==========================================
// 职责: 基于完整作物序列计算 benefit_analysis 汇总指标
// 红线: 所有指标 >= 0;只读知识库,无副作用
// ==========================================

use crate::domain::rotation::benefit_keys;
use crate::knowledge::CropKnowledgeBase;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Clone)]
pub struct BenefitAnalyzer {
    knowledge: Arc<dyn CropKnowledgeBase>,
}

impl BenefitAnalyzer {
    pub fn new(knowledge: Arc<dyn CropKnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// 计算效益指标
    ///
    /// - nitrogen_fixation: 全序列固氮总量 (lbs N/acre)
    /// - nitrogen_credit_applied: 后茬按需氮等级实际利用的前茬氮
    /// - soil_organic_matter: 平均残茬贡献 × 100
    /// - pest_management: 相邻年份病虫害断代比例 × 100
    /// - crop_diversity: 不同作物数 / 年数 × 100
    pub fn analyze<S: AsRef<str>>(&self, sequence: &[S]) -> BTreeMap<String, f64> {
        let entries: Vec<_> = sequence
            .iter()
            .map(|c| self.knowledge.entry_or_default(c.as_ref()))
            .collect();

        let mut analysis = BTreeMap::new();
        if entries.is_empty() {
            return analysis;
        }

        let fixation: f64 = entries
            .iter()
            .map(|e| e.nitrogen_fixation_lbs_per_acre.max(0.0))
            .sum();

        let credit_applied: f64 = entries
            .windows(2)
            .map(|pair| {
                pair[0].nitrogen_fixation_lbs_per_acre.max(0.0)
                    * pair[1].nitrogen_demand.credit_response()
            })
            .sum();

        let organic_matter = entries
            .iter()
            .map(|e| e.residue_contribution.clamp(0.0, 1.0))
            .sum::<f64>()
            / entries.len() as f64
            * 100.0;

        let pest_management = if entries.len() < 2 {
            100.0
        } else {
            let breaks = entries
                .windows(2)
                .filter(|pair| {
                    pair[0].crop_name != pair[1].crop_name
                        && pair[0].pressure_tags().is_disjoint(&pair[1].pressure_tags())
                })
                .count();
            breaks as f64 / (entries.len() - 1) as f64 * 100.0
        };

        let distinct = entries
            .iter()
            .map(|e| e.crop_name.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        let diversity = distinct as f64 / entries.len() as f64 * 100.0;

        for (key, value) in [
            (benefit_keys::NITROGEN_FIXATION, fixation),
            (benefit_keys::NITROGEN_CREDIT_APPLIED, credit_applied),
            (benefit_keys::SOIL_ORGANIC_MATTER, organic_matter),
            (benefit_keys::PEST_MANAGEMENT, pest_management),
            (benefit_keys::CROP_DIVERSITY, diversity),
        ] {
            analysis.insert(key.to_string(), round2(value.max(0.0)));
        }

        analysis
    }
}

/// 保留两位小数
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
