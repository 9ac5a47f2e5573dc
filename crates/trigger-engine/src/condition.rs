//! 触发条件
//!
//! 每个条件是一个带内部状态的布尔门：`evaluate` 总是先推进状态再返回
//! 当前门是否打开。三种条件各司其职：
//! - `Every`：每 N 次派发放行一次
//! - `Cycle`：在两个端点之间做三角波往返计数，永远放行
//! - `Randomizer`：每次重新抽取一个均匀随机整数，永远放行
//!
//! `Cycle` 与 `Randomizer` 的副作用（当前位置、当前随机值）会被后续的
//! 渲染动作读取，所以即使前面的门已经关闭也必须继续评估。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

use crate::error::{Result, TriggerError};

/// 条件种类
///
/// 每条规则同种条件最多安装一个，重复安装是替换而不是叠加。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Every,
    Cycle,
    Randomizer,
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Every => "every",
            Self::Cycle => "cycle",
            Self::Randomizer => "randomizer",
        };
        write!(f, "{}", name)
    }
}

/// 周期门：每 period 次评估放行一次
///
/// 内部计数器从 period 开始倒数，归零时放行并重置。
#[derive(Debug, Clone)]
pub struct Every {
    period: u32,
    remaining: u32,
}

impl Every {
    /// 创建周期门，period 必须 >= 1
    pub fn new(period: u32) -> Result<Self> {
        if period == 0 {
            return Err(TriggerError::InvalidPeriod { period });
        }
        Ok(Self {
            period,
            remaining: period,
        })
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn evaluate(&mut self) -> bool {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.remaining = self.period;
            true
        } else {
            false
        }
    }
}

/// 三角波循环计数器
///
/// 位置从 0 开始，每次评估加 step；到达或越过当前目标端点
/// （`bounds[0]`）时反转步长方向并交换端点，在两个端点之间永久往返。
/// 它不是真正的门，评估永远返回 true，存在的意义是让位置随每次派发
/// 推进，供渲染动作读取。
#[derive(Debug, Clone)]
pub struct Cycle {
    bounds: [f64; 2],
    step: f64,
    position: f64,
}

impl Cycle {
    /// 创建循环计数器
    ///
    /// bounds 必须恰好 2 个值，step 不能为 0。step 方向与端点顺序
    /// 不匹配属于调用方的配置问题，不在这里纠正。
    pub fn new(bounds: &[f64], step: f64) -> Result<Self> {
        if bounds.len() != 2 {
            return Err(TriggerError::InvalidCycleBounds { len: bounds.len() });
        }
        if step == 0.0 {
            return Err(TriggerError::InvalidCycleStep);
        }
        Ok(Self {
            bounds: [bounds[0], bounds[1]],
            step,
            position: 0.0,
        })
    }

    /// 当前循环位置
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn evaluate(&mut self) -> bool {
        self.position += self.step;

        let reached = if self.step > 0.0 {
            self.position >= self.bounds[0]
        } else {
            self.position <= self.bounds[0]
        };

        if reached {
            self.step = -self.step;
            self.bounds.swap(0, 1);
        }

        true
    }
}

/// 均匀随机采样器
///
/// 每次评估在 [min, max] 闭区间内重新抽取一个整数，抽取结果通过
/// `value` 暴露给渲染动作。首次评估之前读取到的是哨兵值 0。
#[derive(Debug, Clone)]
pub struct Randomizer {
    min: i64,
    max: i64,
    value: i64,
    rng: StdRng,
}

impl Randomizer {
    /// 创建随机采样器，要求 min <= max
    pub fn new(min: i64, max: i64) -> Result<Self> {
        Self::with_rng(min, max, StdRng::from_os_rng())
    }

    /// 使用固定种子创建，便于可复现的演出和测试
    pub fn with_seed(min: i64, max: i64, seed: u64) -> Result<Self> {
        Self::with_rng(min, max, StdRng::seed_from_u64(seed))
    }

    fn with_rng(min: i64, max: i64, rng: StdRng) -> Result<Self> {
        if min > max {
            return Err(TriggerError::InvalidRandomRange { min, max });
        }
        Ok(Self {
            min,
            max,
            value: 0,
            rng,
        })
    }

    /// 最近一次抽取的随机值
    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn evaluate(&mut self) -> bool {
        self.value = self.rng.random_range(self.min..=self.max);
        true
    }
}

/// 统一的条件包装
#[derive(Debug, Clone)]
pub enum Condition {
    Every(Every),
    Cycle(Cycle),
    Randomizer(Randomizer),
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::Every(_) => ConditionKind::Every,
            Self::Cycle(_) => ConditionKind::Cycle,
            Self::Randomizer(_) => ConditionKind::Randomizer,
        }
    }

    /// 推进内部状态并返回门是否打开
    ///
    /// 两次调用的效果可观测地不同于一次调用，调用方不得重试。
    pub fn evaluate(&mut self) -> bool {
        match self {
            Self::Every(c) => c.evaluate(),
            Self::Cycle(c) => c.evaluate(),
            Self::Randomizer(c) => c.evaluate(),
        }
    }
}
