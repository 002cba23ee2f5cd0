// ==========================================
// 轮作优化引擎 - 命令行入口
// ==========================================
// 用法:
//   crop-rotation-planner <request.json> [--strategy <name>] [--knowledge-base <crops.csv>] [--drafts] [--json-log]
// 输出: 方案 JSON 写入 stdout,日志写入 stderr
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use crop_rotation_planner::api::{RotationApi, RotationRequest};
use crop_rotation_planner::config::{config_keys, ConfigManager, RotationConfigReader};
use crop_rotation_planner::engine::RotationStrategy;
use crop_rotation_planner::logging;
use std::path::PathBuf;
use std::sync::Arc;

/// 命令行参数
struct CliArgs {
    request_path: PathBuf,
    strategy: Option<RotationStrategy>,
    knowledge_base: Option<String>,
    drafts: bool,
    json_log: bool,
}

impl CliArgs {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Self> {
        let mut request_path = None;
        let mut strategy = None;
        let mut knowledge_base = None;
        let mut drafts = false;
        let mut json_log = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--strategy" => {
                    let value = args.next().context("--strategy 缺少参数值")?;
                    strategy = Some(value.parse::<RotationStrategy>().map_err(|e| anyhow!(e))?);
                }
                "--knowledge-base" => {
                    knowledge_base = Some(args.next().context("--knowledge-base 缺少参数值")?);
                }
                "--drafts" => drafts = true,
                "--json-log" => json_log = true,
                "-h" | "--help" => bail!(usage()),
                other if other.starts_with("--") => bail!("未知参数: {}\n{}", other, usage()),
                other => {
                    if request_path.replace(PathBuf::from(other)).is_some() {
                        bail!("只能指定一个请求文件\n{}", usage());
                    }
                }
            }
        }

        Ok(Self {
            request_path: request_path.ok_or_else(|| anyhow!(usage()))?,
            strategy,
            knowledge_base,
            drafts,
            json_log,
        })
    }
}

fn usage() -> String {
    "用法: crop-rotation-planner <request.json> [--strategy <balanced|soil_health_first|profit_first|yield_first>] [--knowledge-base <crops.csv>] [--drafts] [--json-log]".to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse(std::env::args().skip(1))?;

    if args.json_log {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", crop_rotation_planner::APP_NAME, crop_rotation_planner::VERSION);
    tracing::info!("==================================================");

    let config = ConfigManager::load().map_err(|e| anyhow!("加载配置失败: {}", e))?;
    match config.source_path() {
        Some(path) => tracing::info!(path = %path.display(), "配置文件已加载"),
        None => tracing::info!("未找到配置文件,使用默认配置"),
    }
    if let Some(path) = &args.knowledge_base {
        config
            .set_config_value(config_keys::KNOWLEDGE_BASE_PATH, path.as_str())
            .map_err(|e| anyhow!("写入配置失败: {}", e))?;
    }
    let config = Arc::new(config);

    let api = RotationApi::from_config(Arc::clone(&config)).await?;

    let content = std::fs::read_to_string(&args.request_path)
        .with_context(|| format!("读取请求文件失败: {}", args.request_path.display()))?;
    let mut request: RotationRequest =
        serde_json::from_str(&content).context("请求 JSON 解析失败")?;

    let output = if args.drafts {
        let drafts = api
            .generate_strategy_drafts(
                request.field_profile,
                request.constraints,
                request.planning_horizon,
            )
            .await?;
        serde_json::to_string_pretty(&drafts)?
    } else {
        if let Some(strategy) = args.strategy {
            request.goals = strategy.goals();
        } else if request.goals.is_empty() {
            let name = config
                .get_default_strategy()
                .await
                .map_err(|e| anyhow!("读取默认策略失败: {}", e))?;
            let strategy = name.parse::<RotationStrategy>().map_err(|e| anyhow!(e))?;
            tracing::info!(strategy = strategy.as_str(), "请求未给出目标,使用默认策略");
            request.goals = strategy.goals();
        }

        let plan = api.generate_optimal_rotation(request).await?;
        serde_json::to_string_pretty(&plan)?
    };

    println!("{}", output);
    Ok(())
}
