// ==========================================
// 轮作优化引擎 - 多目标评分器
// ==========================================
// 职责: 计算候选作物在某年的多目标加权得分,并做确定性平局裁决
// 输入: 候选作物 + 地块档案 + 年序 + 历史序列 + 目标集合
// 输出: 得分 = Σ 权重 × 子得分 - 软约束扣分 + 相容性加分
// ==========================================
// 红线: 子得分均归一化到 [0,1]
// 红线: 平局（差距 <= tie_epsilon）取规范顺序最靠前的作物
// ==========================================

mod core;
mod scoring;


pub use self::core::{GoalScorer, ScoringContext};
pub use self::scoring::GoalSubScores;
