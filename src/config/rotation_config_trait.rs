// ==========================================
// 轮作优化引擎 - 配置读取 Trait
// ==========================================
// 职责: 定义 API 层与引擎构建所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::engine::params::ScoringParameters;
use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// RotationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（内存 KV + JSON 配置文件）
#[async_trait]
pub trait RotationConfigReader: Send + Sync {
    // ===== 请求限制 =====

    /// 获取最大规划年限
    ///
    /// # 默认值
    /// - 50
    async fn get_max_planning_horizon(&self) -> ConfigResult<usize>;

    /// 获取单次优化的时间预算（毫秒）
    ///
    /// # 默认值
    /// - 2000
    async fn get_time_budget_ms(&self) -> ConfigResult<u64>;

    // ===== 评分参数 =====

    /// 获取评分参数（缺失项回退默认值,非法值被修正）
    async fn get_scoring_parameters(&self) -> ConfigResult<ScoringParameters>;

    // ===== 数据源 =====

    /// 获取作物知识库 CSV 路径（未配置时使用内置表）
    async fn get_knowledge_base_path(&self) -> ConfigResult<Option<String>>;

    /// 获取市场参数 CSV 路径（未配置时使用内置表）
    async fn get_market_table_path(&self) -> ConfigResult<Option<String>>;

    /// 获取默认策略名称
    ///
    /// # 默认值
    /// - balanced
    async fn get_default_strategy(&self) -> ConfigResult<String>;

    // ===== 可复现性 =====

    /// 获取全部配置项的快照（JSON 对象,键有序）
    ///
    /// # 用途
    /// - 附带在方案输出中,可用 `restore_config_from_snapshot` 还原生成时的配置
    async fn get_config_snapshot(&self) -> ConfigResult<String>;
}
