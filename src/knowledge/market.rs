// ==========================================
// 轮作优化引擎 - 市场参数表
// ==========================================
// 职责: 每种作物的单价与每英亩生产成本（静态,经构造函数注入引擎）
// ==========================================

use crate::domain::crop::{normalize_crop_name, CropEconomics};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MarketTable {
    economics: HashMap<String, CropEconomics>,
}

impl MarketTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 内置市场参数（USD）
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (crop, price, cost) in [
            ("corn", 4.50, 650.0),
            ("soybean", 11.50, 450.0),
            ("wheat", 6.00, 380.0),
            ("alfalfa", 200.0, 500.0),
            ("oats", 3.50, 250.0),
            ("barley", 5.00, 300.0),
            ("canola", 13.00, 420.0),
            ("sunflower", 0.25, 350.0),
        ] {
            table.insert(
                crop,
                CropEconomics {
                    price_per_unit: price,
                    production_cost_per_acre: cost,
                },
            );
        }
        table
    }

    pub fn insert(&mut self, crop_name: &str, economics: CropEconomics) {
        self.economics
            .insert(normalize_crop_name(crop_name), economics);
    }

    pub fn economics(&self, crop_name: &str) -> Option<CropEconomics> {
        self.economics.get(&normalize_crop_name(crop_name)).copied()
    }

    pub fn len(&self) -> usize {
        self.economics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.economics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_builtin_crops() {
        let table = MarketTable::builtin();
        assert_eq!(table.len(), 8);
        let corn = table.economics("Corn").unwrap();
        assert!(corn.margin_per_acre(180.0) > 0.0);
        assert!(table.economics("dragonfruit").is_none());
    }
}
