//! 触发规则
//!
//! 一条规则把一个采样名、一组条件和一个渲染动作绑在一起。每次事件
//! 派发都会评估全部条件（不短路，保证循环位置和随机值照常推进），
//! 只有采样名匹配且所有门都打开时才执行动作。

use std::fmt;

use crate::condition::{Condition, ConditionKind, Cycle, Every, Randomizer};
use crate::error::{Result, TriggerError};

/// 条件读数快照
///
/// 动作执行时拿到的当前循环位置与随机值。对应的条件未安装时
/// 读数为 0（哨兵值）。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConditionSnapshot {
    pub cycle_position: f64,
    pub random_value: i64,
}

/// 规则动作
///
/// 渲染上下文作为显式注入的能力传入，而不是隐式的全局状态；
/// 动作返回的错误会向上传播并中断本次派发。
pub type Action<S> = Box<dyn FnMut(&mut S, ConditionSnapshot) -> anyhow::Result<()> + Send>;

/// 触发规则
pub struct Rule<S> {
    subject: String,
    /// 条件槽位，同种条件最多一个；替换保留原槽位顺序
    conditions: Vec<Condition>,
    action: Action<S>,
}

impl<S> Rule<S> {
    /// 创建规则，绑定采样名与动作
    pub fn new<F>(subject: impl Into<String>, action: F) -> Self
    where
        F: FnMut(&mut S, ConditionSnapshot) -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            subject: subject.into(),
            conditions: Vec::new(),
            action: Box::new(action),
        }
    }

    /// 替换要匹配的采样名
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// 当前绑定的采样名
    pub fn bound_subject(&self) -> &str {
        &self.subject
    }

    /// 替换动作
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: FnMut(&mut S, ConditionSnapshot) -> anyhow::Result<()> + Send + 'static,
    {
        self.action = Box::new(action);
        self
    }

    /// 安装周期门：每 period 次派发放行一次
    pub fn every(mut self, period: u32) -> Result<Self> {
        self.install(Condition::Every(Every::new(period)?));
        Ok(self)
    }

    /// 安装三角波循环计数器
    pub fn cycle(mut self, bounds: &[f64], step: f64) -> Result<Self> {
        self.install(Condition::Cycle(Cycle::new(bounds, step)?));
        Ok(self)
    }

    /// 安装均匀随机采样器
    pub fn randomizer(mut self, min: i64, max: i64) -> Result<Self> {
        self.install(Condition::Randomizer(Randomizer::new(min, max)?));
        Ok(self)
    }

    /// 安装带固定种子的随机采样器，便于可复现的演出和测试
    pub fn randomizer_seeded(mut self, min: i64, max: i64, seed: u64) -> Result<Self> {
        self.install(Condition::Randomizer(Randomizer::with_seed(min, max, seed)?));
        Ok(self)
    }

    /// 安装条件；同种条件已存在时原位替换，不改变槽位顺序
    fn install(&mut self, condition: Condition) {
        let kind = condition.kind();
        match self.conditions.iter_mut().find(|c| c.kind() == kind) {
            Some(slot) => *slot = condition,
            None => self.conditions.push(condition),
        }
    }

    /// 当前循环位置，未安装循环条件时为 0
    pub fn current_cycle(&self) -> f64 {
        self.conditions
            .iter()
            .find_map(|c| match c {
                Condition::Cycle(cycle) => Some(cycle.position()),
                _ => None,
            })
            .unwrap_or(0.0)
    }

    /// 当前随机值，未安装随机条件（或尚未评估）时为 0
    pub fn current_random_value(&self) -> i64 {
        self.conditions
            .iter()
            .find_map(|c| match c {
                Condition::Randomizer(randomizer) => Some(randomizer.value()),
                _ => None,
            })
            .unwrap_or(0)
    }

    fn snapshot(&self) -> ConditionSnapshot {
        ConditionSnapshot {
            cycle_position: self.current_cycle(),
            random_value: self.current_random_value(),
        }
    }

    /// 针对一个事件的采样名做一次评估
    ///
    /// 全部条件按槽位顺序评估且不短路：即使采样名不匹配或某个门
    /// 已经关闭，循环和随机条件的状态也照常推进。只有采样名匹配
    /// 且所有门都打开时才执行动作；动作错误原样向上传播。
    pub fn dispatch(&mut self, subject: &str, ctx: &mut S) -> Result<()> {
        let mut all_open = true;
        for condition in &mut self.conditions {
            if !condition.evaluate() {
                all_open = false;
            }
        }

        if all_open && subject == self.subject {
            let snapshot = self.snapshot();
            (self.action)(ctx, snapshot).map_err(TriggerError::Action)?;
        }

        Ok(())
    }
}

impl<S> fmt::Debug for Rule<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<ConditionKind> = self.conditions.iter().map(|c| c.kind()).collect();
        f.debug_struct("Rule")
            .field("subject", &self.subject)
            .field("conditions", &kinds)
            .finish_non_exhaustive()
    }
}
