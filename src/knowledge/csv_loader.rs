// ==========================================
// 轮作优化引擎 - CSV 知识库导入
// ==========================================
// 职责: 从 CSV 构建作物知识库 / 市场参数表（数据驱动替换内置表）
// 格式: 首行为表头;列表字段以 ';' 分隔
// ==========================================
// 作物表必填列: crop_name, nitrogen_demand, base_yield
// 市场表必填列: crop_name, price_per_unit, production_cost_per_acre
// ==========================================

use crate::domain::crop::{normalize_crop_name, CropCompatibilityEntry, CropEconomics};
use crate::knowledge::error::KnowledgeBaseError;
use crate::knowledge::market::MarketTable;
use crate::knowledge::StaticKnowledgeBase;
use csv::ReaderBuilder;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

type RawRow = HashMap<String, String>;

impl StaticKnowledgeBase {
    /// 从 CSV 文件加载作物知识库
    pub fn from_csv_path(path: &Path) -> Result<Self, KnowledgeBaseError> {
        let file = open_csv(path)?;
        let kb = Self::from_csv_reader(file)?;
        info!(path = %path.display(), crops = kb.len(), "作物知识库 CSV 加载完成");
        Ok(kb)
    }

    /// 从任意 Reader 加载作物知识库（行序即规范顺序）
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, KnowledgeBaseError> {
        let rows = parse_rows(reader)?;
        if rows.is_empty() {
            return Err(KnowledgeBaseError::Empty("作物表无数据行".to_string()));
        }

        let mut entries = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            // 行号从 2 开始（表头占第 1 行）
            entries.push(map_crop_row(idx + 2, row)?);
        }

        Ok(Self::from_entries(entries))
    }
}

impl MarketTable {
    /// 从 CSV 文件加载市场参数表
    pub fn from_csv_path(path: &Path) -> Result<Self, KnowledgeBaseError> {
        let file = open_csv(path)?;
        Self::from_csv_reader(file)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, KnowledgeBaseError> {
        let rows = parse_rows(reader)?;
        let mut table = MarketTable::empty();

        for (idx, row) in rows.iter().enumerate() {
            let row_no = idx + 2;
            let crop = required(row_no, row, "crop_name")?;
            table.insert(
                &crop,
                CropEconomics {
                    price_per_unit: parse_f64(row_no, row, "price_per_unit")?,
                    production_cost_per_acre: parse_f64(row_no, row, "production_cost_per_acre")?,
                },
            );
        }

        Ok(table)
    }
}

// ==========================================
// 解析辅助
// ==========================================

fn open_csv(path: &Path) -> Result<File, KnowledgeBaseError> {
    if !path.exists() {
        return Err(KnowledgeBaseError::FileNotFound(path.display().to_string()));
    }

    if let Some(ext) = path.extension() {
        if ext != "csv" {
            return Err(KnowledgeBaseError::UnsupportedFormat(
                ext.to_string_lossy().to_string(),
            ));
        }
    }

    Ok(File::open(path)?)
}

fn parse_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, KnowledgeBaseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row = HashMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row.insert(header.clone(), value.trim().to_string());
            }
        }

        // 跳过完全空白的行
        if row.values().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    debug!(rows = rows.len(), "CSV 解析完成");
    Ok(rows)
}

fn map_crop_row(row_no: usize, row: &RawRow) -> Result<CropCompatibilityEntry, KnowledgeBaseError> {
    let crop_name = required(row_no, row, "crop_name")?;
    let mut entry = CropCompatibilityEntry::generic_default(&crop_name);

    entry.nitrogen_demand = required(row_no, row, "nitrogen_demand")?
        .parse()
        .map_err(|message| field_error(row_no, "nitrogen_demand", message))?;
    entry.base_yield = parse_f64(row_no, row, "base_yield")?;
    if entry.base_yield <= 0.0 {
        return Err(field_error(row_no, "base_yield", "必须 > 0".to_string()));
    }

    entry.good_next = list(row, "good_next");
    entry.avoid_next = list(row, "avoid_next");
    entry.pest_pressure = list(row, "pest_pressure");
    entry.disease_pressure = list(row, "disease_pressure");

    if let Some(v) = optional(row, "nitrogen_fixation_lbs_per_acre") {
        entry.nitrogen_fixation_lbs_per_acre = parse_finite(row_no, "nitrogen_fixation_lbs_per_acre", v)?;
        if entry.nitrogen_fixation_lbs_per_acre < 0.0 {
            return Err(field_error(
                row_no,
                "nitrogen_fixation_lbs_per_acre",
                "不能为负".to_string(),
            ));
        }
    }
    if let Some(v) = optional(row, "crop_family") {
        entry.crop_family = v.to_lowercase();
    }
    if let Some(v) = optional(row, "planting_season") {
        entry.planting_season = v
            .parse()
            .map_err(|message| field_error(row_no, "planting_season", message))?;
    }
    if let Some(v) = optional(row, "planting_window") {
        entry.planting_window = v.to_string();
    }
    if let Some(v) = optional(row, "yield_unit") {
        entry.yield_unit = v.to_string();
    }
    if let Some(v) = optional(row, "optimal_ph_min") {
        entry.optimal_ph_min = parse_finite(row_no, "optimal_ph_min", v)?;
    }
    if let Some(v) = optional(row, "optimal_ph_max") {
        entry.optimal_ph_max = parse_finite(row_no, "optimal_ph_max", v)?;
    }
    if entry.optimal_ph_min > entry.optimal_ph_max {
        return Err(field_error(
            row_no,
            "optimal_ph_min",
            format!("{} > optimal_ph_max {}", entry.optimal_ph_min, entry.optimal_ph_max),
        ));
    }
    if let Some(v) = optional(row, "residue_contribution") {
        entry.residue_contribution = parse_finite(row_no, "residue_contribution", v)?.clamp(0.0, 1.0);
    }

    Ok(entry)
}

fn optional<'a>(row: &'a RawRow, field: &str) -> Option<&'a str> {
    row.get(field).map(String::as_str).filter(|v| !v.is_empty())
}

fn required(row_no: usize, row: &RawRow, field: &str) -> Result<String, KnowledgeBaseError> {
    optional(row, field)
        .map(str::to_string)
        .ok_or_else(|| KnowledgeBaseError::MissingField {
            row: row_no,
            field: field.to_string(),
        })
}

fn parse_f64(row_no: usize, row: &RawRow, field: &str) -> Result<f64, KnowledgeBaseError> {
    let raw = required(row_no, row, field)?;
    parse_finite(row_no, field, &raw)
}

/// 解析有限浮点数（NaN / inf 视为非法值）
fn parse_finite(row_no: usize, field: &str, raw: &str) -> Result<f64, KnowledgeBaseError> {
    let value = raw
        .parse::<f64>()
        .map_err(|_| field_error(row_no, field, format!("无法解析数值: {}", raw)))?;
    if !value.is_finite() {
        return Err(field_error(row_no, field, format!("必须为有限数值: {}", raw)));
    }
    Ok(value)
}

fn list(row: &RawRow, field: &str) -> BTreeSet<String> {
    optional(row, field)
        .map(|v| {
            v.split(';')
                .map(normalize_crop_name)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn field_error(row: usize, field: &str, message: String) -> KnowledgeBaseError {
    KnowledgeBaseError::FieldValueError {
        row,
        field: field.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{NitrogenDemand, PlantingSeason};
    use crate::knowledge::CropKnowledgeBase;

    const CROPS_CSV: &str = "\
crop_name,good_next,avoid_next,nitrogen_demand,nitrogen_fixation_lbs_per_acre,pest_pressure,disease_pressure,planting_season,planting_window,base_yield,yield_unit
Corn,soybean;field peas,corn,high,0,corn_rootworm,gray_leaf_spot,spring,April-May,175,bu/acre
Field Peas,corn;wheat,field peas,low,60,pea_aphid,ascochyta_blight,spring,March-April,45,bu/acre
Winter Wheat,field peas,winter wheat,medium,,hessian_fly,take_all,fall,September-October,68,bu/acre
,,,,,,,,,,
";

    #[test]
    fn test_load_crops_from_reader() {
        let kb = StaticKnowledgeBase::from_csv_reader(CROPS_CSV.as_bytes()).unwrap();

        assert_eq!(kb.crop_names(), vec!["corn", "field_peas", "winter_wheat"]);
        let peas = kb.get_entry("field peas").unwrap();
        assert_eq!(peas.nitrogen_demand, NitrogenDemand::Low);
        assert_eq!(peas.nitrogen_fixation_lbs_per_acre, 60.0);
        assert!(peas.good_next.contains("wheat"));

        let wheat = kb.get_entry("winter_wheat").unwrap();
        assert_eq!(wheat.planting_season, PlantingSeason::Fall);
        assert_eq!(wheat.nitrogen_fixation_lbs_per_acre, 0.0);
        assert!(kb.good_next_crops("corn").contains("field_peas"));
    }

    #[test]
    fn test_missing_required_field_reports_row() {
        let csv = "crop_name,nitrogen_demand,base_yield\ncorn,,180\n";
        let err = StaticKnowledgeBase::from_csv_reader(csv.as_bytes()).unwrap_err();
        match err {
            KnowledgeBaseError::MissingField { row, field } => {
                assert_eq!(row, 2);
                assert_eq!(field, "nitrogen_demand");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_numeric_value_is_rejected() {
        let csv = "crop_name,nitrogen_demand,base_yield\ncorn,high,lots\n";
        assert!(matches!(
            StaticKnowledgeBase::from_csv_reader(csv.as_bytes()),
            Err(KnowledgeBaseError::FieldValueError { .. })
        ));
    }

    #[test]
    fn test_empty_table_is_rejected() {
        let csv = "crop_name,nitrogen_demand,base_yield\n";
        assert!(matches!(
            StaticKnowledgeBase::from_csv_reader(csv.as_bytes()),
            Err(KnowledgeBaseError::Empty(_))
        ));
    }

    #[test]
    fn test_load_market_table() {
        let csv = "crop_name,price_per_unit,production_cost_per_acre\nCorn,4.25,640\n";
        let table = MarketTable::from_csv_reader(csv.as_bytes()).unwrap();
        let corn = table.economics("corn").unwrap();
        assert_eq!(corn.price_per_unit, 4.25);
        assert!(table.economics("soybean").is_none());
    }
}
