//! 序列器事件
//!
//! 外部模式序列器把每次采样触发以扁平的键值交替列表发过来，
//! 例如 `["s", "kick", "delay", "0.25"]`。引擎只关心两个字段：
//! `s`（采样名，用于规则匹配）和 `delay`（派发前等待的秒数）。

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriggerError};

/// 一次采样触发事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayEvent {
    /// 采样名
    pub subject: String,
    /// 派发前等待的秒数，0 表示下一个调度点立即派发
    #[serde(default)]
    pub delay: f64,
}

impl PlayEvent {
    /// 创建事件，延迟必须是非负的有限值
    pub fn new(subject: impl Into<String>, delay: f64) -> Result<Self> {
        if !delay.is_finite() {
            return Err(TriggerError::MalformedEvent(format!(
                "delay 不是有限数值: {}",
                delay
            )));
        }
        if delay < 0.0 {
            return Err(TriggerError::NegativeDelay { delay });
        }
        Ok(Self {
            subject: subject.into(),
            delay,
        })
    }

    /// 从键值交替的 token 列表解码
    ///
    /// 缺少 `s` 字段是错误；缺少 `delay` 时默认为 0（立即派发）；
    /// 负延迟在这里拒绝。无关字段（序列器会带上 cycle、orbit 等）
    /// 原样忽略。
    pub fn decode<T: AsRef<str>>(tokens: &[T]) -> Result<Self> {
        if tokens.len() % 2 != 0 {
            return Err(TriggerError::MalformedEvent(format!(
                "键值列表长度必须为偶数, 实际 {} 个 token",
                tokens.len()
            )));
        }

        let mut subject: Option<&str> = None;
        let mut delay = 0.0_f64;

        for pair in tokens.chunks_exact(2) {
            let key = pair[0].as_ref();
            let value = pair[1].as_ref();
            match key {
                "s" => subject = Some(value),
                "delay" => {
                    delay = value.parse().map_err(|_| {
                        TriggerError::MalformedEvent(format!("delay 不是数值: {:?}", value))
                    })?;
                }
                _ => {}
            }
        }

        let subject = subject
            .ok_or_else(|| TriggerError::MalformedEvent("缺少采样名字段 s".to_string()))?;

        Self::new(subject, delay)
    }
}
