// ==========================================
// 轮作优化引擎 - 作物知识库层
// ==========================================
// 职责: 以只读接口暴露作物农艺事实与市场参数
// 红线: 进程启动时构建一次,运行期不修改
// 说明: 引擎只依赖 CropKnowledgeBase trait,数据源可替换（内置表 / CSV）
// ==========================================

pub mod builtin;
pub mod csv_loader;
pub mod error;
pub mod market;

use crate::domain::crop::CropCompatibilityEntry;
use std::borrow::Cow;
use std::collections::BTreeSet;

pub use builtin::StaticKnowledgeBase;
pub use error::KnowledgeBaseError;
pub use market::MarketTable;

// ==========================================
// CropKnowledgeBase Trait
// ==========================================
// 实现者: StaticKnowledgeBase（内置表 / CSV 导入）
pub trait CropKnowledgeBase: Send + Sync {
    /// 查询作物条目
    ///
    /// # 返回
    /// - Some: 已知作物
    /// - None: 未知作物（调用方需回退到默认估计）
    fn get_entry(&self, crop_name: &str) -> Option<&CropCompatibilityEntry>;

    /// 全部作物名称（规范顺序,用于候选枚举与平局裁决）
    fn crop_names(&self) -> Vec<String>;

    /// 适宜后茬集合（未知作物返回空集）
    fn good_next_crops(&self, crop_name: &str) -> BTreeSet<String> {
        self.get_entry(crop_name)
            .map(|e| e.good_next.clone())
            .unwrap_or_default()
    }

    /// 忌后茬集合（未知作物返回空集）
    fn avoid_next_crops(&self, crop_name: &str) -> BTreeSet<String> {
        self.get_entry(crop_name)
            .map(|e| e.avoid_next.clone())
            .unwrap_or_default()
    }

    /// 查询条目,未知作物回退到通用默认档案
    fn entry_or_default(&self, crop_name: &str) -> Cow<'_, CropCompatibilityEntry> {
        match self.get_entry(crop_name) {
            Some(entry) => Cow::Borrowed(entry),
            None => Cow::Owned(CropCompatibilityEntry::generic_default(crop_name)),
        }
    }

    /// 作物在规范顺序中的位置（未知作物排最后）
    fn canonical_rank(&self, crop_name: &str) -> usize {
        let normalized = crate::domain::crop::normalize_crop_name(crop_name);
        self.crop_names()
            .iter()
            .position(|c| *c == normalized)
            .unwrap_or(usize::MAX)
    }
}
