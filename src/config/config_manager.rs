// ==========================================
// 轮作优化引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 内存 KV（可由 JSON 配置文件初始化）
// 加载顺序: CROP_ROTATION_CONFIG_PATH > 用户配置目录 > 内置默认值
// ==========================================

use crate::config::rotation_config_trait::{ConfigResult, RotationConfigReader};
use crate::engine::params::ScoringParameters;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// 配置文件路径环境变量
pub const CONFIG_PATH_ENV: &str = "CROP_ROTATION_CONFIG_PATH";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Clone, Default)]
pub struct ConfigManager {
    values: Arc<RwLock<HashMap<String, String>>>,
    source_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建空配置（全部使用默认值）
    pub fn new() -> Self {
        Self::default()
    }

    /// 按加载顺序构建配置管理器
    ///
    /// 1. 环境变量 CROP_ROTATION_CONFIG_PATH 指定的文件（文件必须存在）
    /// 2. 用户配置目录下的 crop-rotation-planner/config.json（存在时加载）
    /// 3. 内置默认值
    pub fn load() -> Result<Self, Box<dyn Error + Send + Sync>> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = path.trim();
            if !path.is_empty() {
                info!(path = %path, "从环境变量指定的路径加载配置");
                return Self::from_file(path);
            }
        }

        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                info!(path = %path.display(), "从用户配置目录加载配置");
                return Self::from_file(&path);
            }
        }

        debug!("未找到配置文件,使用内置默认值");
        Ok(Self::new())
    }

    /// 默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crop-rotation-planner").join("config.json"))
    }

    /// 从 JSON 文件加载配置
    ///
    /// # 格式
    /// 顶层为对象: {"max_planning_horizon": 30, "tie_epsilon": 1e-9, ...}
    /// 字符串原样保存,其他值保存其 JSON 文本
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("读取配置文件失败 ({}): {}", path.display(), e))?;

        let mut manager = Self::from_json_str(&content)?;
        manager.source_path = Some(path.to_path_buf());
        Ok(manager)
    }

    /// 从 JSON 文本加载配置
    pub fn from_json_str(content: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let value: Value = serde_json::from_str(content)?;
        let object = value
            .as_object()
            .ok_or_else(|| "配置文件顶层必须为 JSON 对象".to_string())?;

        let values = object
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect();

        Ok(Self {
            values: Arc::new(RwLock::new(values)),
            source_path: None,
        })
    }

    /// 配置来源文件
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|e| format!("锁获取失败: {}", e))?;
        Ok(values.get(key).cloned())
    }

    /// 覆写配置值
    pub fn set_config_value(&self, key: &str, value: impl Into<String>) -> ConfigResult<()> {
        let mut values = self
            .values
            .write()
            .map_err(|e| format!("锁获取失败: {}", e))?;
        values.insert(key.to_string(), value.into());
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_global_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 读取数值配置;无法解析时告警并回退默认值
    fn get_number_or_default<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Display,
    {
        match self.get_global_config_value(key)? {
            None => Ok(default),
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(config_key = key, value = %raw, default = %default, "配置值无法解析,使用默认值");
                    Ok(default)
                }
            },
        }
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 以 `__meta_` 开头的键为元信息,不回写
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut values = self
            .values
            .write()
            .map_err(|e| format!("锁获取失败: {}", e))?;

        let mut count = 0;
        for (key, value) in config_map {
            if key.starts_with("__meta_") {
                continue;
            }
            values.insert(key, value);
            count += 1;
        }

        Ok(count)
    }

    /// 组装评分参数
    pub fn load_scoring_parameters(&self) -> ConfigResult<ScoringParameters> {
        let d = ScoringParameters::default();
        let params = ScoringParameters {
            tie_epsilon: self.get_number_or_default(config_keys::TIE_EPSILON, d.tie_epsilon)?,
            diversity_window: self
                .get_number_or_default(config_keys::DIVERSITY_WINDOW, d.diversity_window)?,
            soft_constraint_penalty: self.get_number_or_default(
                config_keys::SOFT_CONSTRAINT_PENALTY,
                d.soft_constraint_penalty,
            )?,
            avoid_next_penalty: self
                .get_number_or_default(config_keys::AVOID_NEXT_PENALTY, d.avoid_next_penalty)?,
            good_next_bonus: self
                .get_number_or_default(config_keys::GOOD_NEXT_BONUS, d.good_next_bonus)?,
            profit_reference_per_acre: self.get_number_or_default(
                config_keys::PROFIT_REFERENCE_PER_ACRE,
                d.profit_reference_per_acre,
            )?,
            fixation_reference_lbs: self.get_number_or_default(
                config_keys::FIXATION_REFERENCE_LBS,
                d.fixation_reference_lbs,
            )?,
            max_nitrogen_credit: self
                .get_number_or_default(config_keys::MAX_NITROGEN_CREDIT, d.max_nitrogen_credit)?,
        };
        Ok(params.sanitized())
    }
}

// ==========================================
// RotationConfigReader 实现
// ==========================================
#[async_trait]
impl RotationConfigReader for ConfigManager {
    async fn get_max_planning_horizon(&self) -> ConfigResult<usize> {
        let value = self.get_number_or_default(config_keys::MAX_PLANNING_HORIZON, 50usize)?;
        Ok(if value == 0 { 50 } else { value })
    }

    async fn get_time_budget_ms(&self) -> ConfigResult<u64> {
        let value = self.get_number_or_default(config_keys::TIME_BUDGET_MS, 2000u64)?;
        Ok(if value == 0 { 2000 } else { value })
    }

    async fn get_scoring_parameters(&self) -> ConfigResult<ScoringParameters> {
        self.load_scoring_parameters()
    }

    async fn get_knowledge_base_path(&self) -> ConfigResult<Option<String>> {
        Ok(self
            .get_global_config_value(config_keys::KNOWLEDGE_BASE_PATH)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    async fn get_market_table_path(&self) -> ConfigResult<Option<String>> {
        Ok(self
            .get_global_config_value(config_keys::MARKET_TABLE_PATH)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    async fn get_default_strategy(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::DEFAULT_STRATEGY, "balanced")
    }

    async fn get_config_snapshot(&self) -> ConfigResult<String> {
        let values = self
            .values
            .read()
            .map_err(|e| format!("锁获取失败: {}", e))?;
        let ordered: std::collections::BTreeMap<_, _> = values.iter().collect();
        Ok(serde_json::to_string(&json!(ordered))?)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // ===== 请求限制 =====
    pub const MAX_PLANNING_HORIZON: &str = "max_planning_horizon";
    pub const TIME_BUDGET_MS: &str = "time_budget_ms";

    // ===== 评分参数 =====
    pub const TIE_EPSILON: &str = "tie_epsilon";
    pub const DIVERSITY_WINDOW: &str = "diversity_window";
    pub const SOFT_CONSTRAINT_PENALTY: &str = "soft_constraint_penalty";
    pub const AVOID_NEXT_PENALTY: &str = "avoid_next_penalty";
    pub const GOOD_NEXT_BONUS: &str = "good_next_bonus";
    pub const PROFIT_REFERENCE_PER_ACRE: &str = "profit_reference_per_acre";
    pub const FIXATION_REFERENCE_LBS: &str = "fixation_reference_lbs";
    pub const MAX_NITROGEN_CREDIT: &str = "max_nitrogen_credit";

    // ===== 数据源 =====
    pub const KNOWLEDGE_BASE_PATH: &str = "knowledge_base_path";
    pub const MARKET_TABLE_PATH: &str = "market_table_path";
    pub const DEFAULT_STRATEGY: &str = "default_strategy";
}
