//! 声明式规则加载
//!
//! 服务启动时从 JSON 规则文件构建规则：每条声明一个采样名、可选的
//! 条件参数和一个渲染效果。效果的个别参数可以声明为由循环位置或
//! 随机值调制，这正是条件副作用被渲染动作读取的打通点。
//!
//! 单条规则的配置错误不拖垮整个文件：坏规则记日志跳过，好规则
//! 照常加载。

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use trigger_render::{OscillatorCall, RenderSink, ShapeCall};

use crate::error::Result;
use crate::rule::{Action, ConditionSnapshot, Rule};

/// 规则文件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFile {
    pub rules: Vec<RuleSpec>,
}

/// 单条规则声明
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    /// 要匹配的采样名
    pub subject: String,
    /// 周期门参数
    #[serde(default)]
    pub every: Option<u32>,
    /// 循环计数器参数
    #[serde(default)]
    pub cycle: Option<CycleSpec>,
    /// 随机采样器参数
    #[serde(default)]
    pub randomizer: Option<RandomizerSpec>,
    /// 命中时执行的渲染效果
    pub effect: EffectSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSpec {
    pub bounds: Vec<f64>,
    pub step: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomizerSpec {
    pub min: i64,
    pub max: i64,
    /// 固定种子，可复现的演出用
    #[serde(default)]
    pub seed: Option<u64>,
}

/// 渲染效果声明
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectSpec {
    Shape {
        #[serde(default)]
        params: ShapeCall,
        #[serde(default)]
        modulate: Option<Modulation>,
    },
    Oscillator {
        #[serde(default)]
        params: OscillatorCall,
        #[serde(default)]
        modulate: Option<Modulation>,
    },
}

/// 参数调制方式：用条件读数覆盖效果的某个参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modulation {
    /// 旋转角度取当前循环位置
    RotateFromCycle,
    /// 旋转角度取当前随机值
    RotateFromRandom,
}

impl Modulation {
    fn rotate(self, snapshot: ConditionSnapshot) -> f64 {
        match self {
            Self::RotateFromCycle => snapshot.cycle_position,
            Self::RotateFromRandom => snapshot.random_value as f64,
        }
    }
}

impl EffectSpec {
    /// 把效果声明变成规则动作
    fn into_action<S: RenderSink>(self) -> Action<S> {
        match self {
            Self::Shape { params, modulate } => {
                Box::new(move |sink: &mut S, snapshot: ConditionSnapshot| {
                    let mut call = params.clone();
                    if let Some(m) = modulate {
                        call.rotate = m.rotate(snapshot);
                    }
                    sink.shape(&call);
                    Ok(())
                })
            }
            Self::Oscillator { params, modulate } => {
                Box::new(move |sink: &mut S, snapshot: ConditionSnapshot| {
                    let mut call = params.clone();
                    if let Some(m) = modulate {
                        call.rotate = m.rotate(snapshot);
                    }
                    sink.oscillator(&call);
                    Ok(())
                })
            }
        }
    }
}

impl RuleSpec {
    /// 构建规则，条件参数错误立即暴露
    pub fn build<S: RenderSink + 'static>(&self) -> Result<Rule<S>> {
        let mut rule = Rule::new(&self.subject, self.effect.clone().into_action::<S>());

        if let Some(period) = self.every {
            rule = rule.every(period)?;
        }
        if let Some(cycle) = &self.cycle {
            rule = rule.cycle(&cycle.bounds, cycle.step)?;
        }
        if let Some(randomizer) = &self.randomizer {
            rule = match randomizer.seed {
                Some(seed) => rule.randomizer_seeded(randomizer.min, randomizer.max, seed)?,
                None => rule.randomizer(randomizer.min, randomizer.max)?,
            };
        }

        Ok(rule)
    }
}

/// 构建文件里的全部规则
///
/// 坏规则记日志跳过，返回成功构建的部分。
pub fn build_rules<S: RenderSink + 'static>(file: &RuleFile) -> Vec<Rule<S>> {
    let mut rules = Vec::with_capacity(file.rules.len());
    let mut failed = 0usize;

    for (i, spec) in file.rules.iter().enumerate() {
        match spec.build() {
            Ok(rule) => rules.push(rule),
            Err(e) => {
                failed += 1;
                warn!(index = i, subject = %spec.subject, error = %e, "规则构建失败, 已跳过");
            }
        }
    }

    info!("规则加载完成: {} 成功, {} 失败", rules.len(), failed);
    rules
}

/// 从 JSON 文件加载规则
pub fn load_file<S: RenderSink + 'static>(path: impl AsRef<Path>) -> Result<Vec<Rule<S>>> {
    let text = std::fs::read_to_string(path)?;
    let file: RuleFile = serde_json::from_str(&text)?;
    Ok(build_rules(&file))
}
