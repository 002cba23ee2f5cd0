// ==========================================
// 轮作优化引擎 - 地块档案
// ==========================================
// 红线: 调用方一次请求创建一次,引擎只读
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// FieldProfile - 地块档案
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProfile {
    pub field_id: String,       // 地块ID
    pub field_name: String,     // 地块名称
    pub farm_id: String,        // 农场ID
    pub size_acres: f64,        // 面积(英亩)
    pub soil_type: String,      // 土壤质地 (loam/silt_loam/clay/...)
    pub drainage_class: String, // 排水等级 (well_drained/poorly_drained/...)
    pub climate_zone: String,   // 气候分区 (如 "5a")

    // ===== 可选土壤化验指标 =====
    #[serde(default)]
    pub soil_ph: Option<f64>,
    #[serde(default)]
    pub organic_matter_percent: Option<f64>,
}

impl FieldProfile {
    /// 构造最小地块档案（土壤化验指标缺省）
    pub fn new(
        field_id: impl Into<String>,
        field_name: impl Into<String>,
        farm_id: impl Into<String>,
        size_acres: f64,
        soil_type: impl Into<String>,
        drainage_class: impl Into<String>,
        climate_zone: impl Into<String>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            field_name: field_name.into(),
            farm_id: farm_id.into(),
            size_acres,
            soil_type: soil_type.into(),
            drainage_class: drainage_class.into(),
            climate_zone: climate_zone.into(),
            soil_ph: None,
            organic_matter_percent: None,
        }
    }

    pub fn with_soil_test(mut self, soil_ph: f64, organic_matter_percent: f64) -> Self {
        self.soil_ph = Some(soil_ph);
        self.organic_matter_percent = Some(organic_matter_percent);
        self
    }

    /// 解析气候分区的数字部分（"5a" -> 5）
    pub fn climate_zone_number(&self) -> Option<u32> {
        let digits: String = self
            .climate_zone
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    /// 排水是否不良（poor/somewhat_poor/very_poor）
    pub fn is_poorly_drained(&self) -> bool {
        let drainage = self.drainage_class.trim().to_lowercase();
        drainage.contains("poor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_climate_zone_number() {
        let field = FieldProfile::new("F1", "North", "FARM1", 80.0, "loam", "well_drained", "5a");
        assert_eq!(field.climate_zone_number(), Some(5));

        let field = FieldProfile {
            climate_zone: "unknown".to_string(),
            ..field
        };
        assert_eq!(field.climate_zone_number(), None);
    }

    #[test]
    fn test_soil_test_fields_default_when_missing() {
        let json = r#"{
            "field_id": "F1", "field_name": "North", "farm_id": "FARM1",
            "size_acres": 120.5, "soil_type": "loam",
            "drainage_class": "somewhat_poorly_drained", "climate_zone": "4b"
        }"#;
        let field: FieldProfile = serde_json::from_str(json).unwrap();
        assert!(field.soil_ph.is_none());
        assert!(field.is_poorly_drained());
    }
}
