//! 振荡器渲染调用
//!
//! 参数及默认值对应上游渲染器的 osc(frequency, sync, offset) 约定，
//! 附带颜色、旋转、缩放、反色等常用后置参数。

use serde::{Deserialize, Serialize};

use crate::RenderSink;

/// RGB 颜色，分量取值 [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// 白色
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::white()
    }
}

/// 一次振荡器绘制的完整参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillatorCall {
    /// 振荡频率
    pub frequency: f64,
    /// 同步速度
    pub sync: f64,
    /// 相位偏移
    pub offset: f64,
    /// 颜色，默认白色
    pub rgb: Rgb,
    /// 旋转角度（0 表示正向朝上）
    pub rotate: f64,
    /// 缩放（1 表示原始大小）
    pub scale: f64,
    /// 反色强度（0 表示关闭）
    pub invert: f64,
}

impl Default for OscillatorCall {
    fn default() -> Self {
        Self {
            frequency: 60.0,
            sync: 0.1,
            offset: 0.0,
            rgb: Rgb::white(),
            rotate: 0.0,
            scale: 1.0,
            invert: 0.0,
        }
    }
}

/// 振荡器参数构建器，支持链式调用
#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    call: OscillatorCall,
}

impl Oscillator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frequency(mut self, frequency: f64) -> Self {
        self.call.frequency = frequency;
        self
    }

    pub fn sync(mut self, sync: f64) -> Self {
        self.call.sync = sync;
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.call.offset = offset;
        self
    }

    pub fn rgb(mut self, r: f64, g: f64, b: f64) -> Self {
        self.call.rgb = Rgb::new(r, g, b);
        self
    }

    pub fn rotate(mut self, rotate: f64) -> Self {
        self.call.rotate = rotate;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.call.scale = scale;
        self
    }

    pub fn invert(mut self, invert: f64) -> Self {
        self.call.invert = invert;
        self
    }

    /// 当前参数快照
    pub fn call(&self) -> &OscillatorCall {
        &self.call
    }

    /// 向 sink 发出一次绘制调用
    pub fn render(&self, sink: &mut dyn RenderSink) {
        sink.oscillator(&self.call);
    }
}
