//! 触发引擎
//!
//! 让现场视觉演出对外部模式序列器发来的音乐事件做出反应：
//! - 条件：带内部状态的布尔门（周期计数、三角波循环、均匀随机）
//! - 规则：采样名匹配 + 条件组合 + 渲染动作
//! - 注册表：订阅事件流，按事件自带的延迟安排一次性派发

pub mod condition;
pub mod error;
pub mod event;
pub mod loader;
pub mod registry;
pub mod rule;
pub mod transport;

pub use condition::{Condition, ConditionKind, Cycle, Every, Randomizer};
pub use error::{Result, TriggerError};
pub use event::PlayEvent;
pub use loader::{EffectSpec, Modulation, RuleFile, RuleSpec};
pub use registry::{RuleHandle, TriggerRegistry};
pub use rule::{Action, ConditionSnapshot, Rule};
pub use transport::SequencerListener;
