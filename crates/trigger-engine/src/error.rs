//! 触发引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriggerError {
    // ==================== 条件配置错误 ====================
    #[error("无效的周期: 必须 >= 1, 实际 {period}")]
    InvalidPeriod { period: u32 },

    #[error("无效的循环边界: 需要恰好 2 个值, 实际 {len} 个")]
    InvalidCycleBounds { len: usize },

    #[error("无效的循环步长: 不能为 0")]
    InvalidCycleStep,

    #[error("无效的随机范围: min {min} 大于 max {max}")]
    InvalidRandomRange { min: i64, max: i64 },

    // ==================== 事件边界错误 ====================
    #[error("事件格式错误: {0}")]
    MalformedEvent(String),

    #[error("无效的延迟: {delay} 秒, 不允许为负")]
    NegativeDelay { delay: f64 },

    // ==================== 派发错误 ====================
    #[error("动作执行失败: {0}")]
    Action(#[source] anyhow::Error),

    // ==================== 外部边界错误 ====================
    #[error("传输 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("规则文件解析失败: {0}")]
    RuleFile(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TriggerError>;
