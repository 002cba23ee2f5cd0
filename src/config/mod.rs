// ==========================================
// 轮作优化引擎 - 配置层
// ==========================================
// 职责: 系统配置管理,支持文件加载与运行期覆写
// 存储: 内存 KV（JSON 配置文件初始化）
// ==========================================

pub mod config_manager;
pub mod rotation_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, CONFIG_PATH_ENV};
pub use rotation_config_trait::{ConfigResult, RotationConfigReader};
