//! 多边形渲染调用
//!
//! 参数及默认值对应上游渲染器的 shape(sides, radius, smoothing) 约定。

use serde::{Deserialize, Serialize};

use crate::RenderSink;

/// 一次多边形绘制的完整参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeCall {
    /// 边数
    pub sides: f64,
    /// 半径
    pub radius: f64,
    /// 边缘平滑度
    pub smoothing: f64,
    /// 旋转角度（0 表示正向朝上）
    pub rotate: f64,
    /// 反色强度（-1 表示关闭）
    pub invert: f64,
}

impl Default for ShapeCall {
    fn default() -> Self {
        Self {
            sides: 3.0,
            radius: 0.3,
            smoothing: 0.01,
            rotate: 0.0,
            invert: -1.0,
        }
    }
}

/// 多边形参数构建器，支持链式调用
#[derive(Debug, Clone, Default)]
pub struct Shape {
    call: ShapeCall,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sides(mut self, sides: f64) -> Self {
        self.call.sides = sides;
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.call.radius = radius;
        self
    }

    pub fn smoothing(mut self, smoothing: f64) -> Self {
        self.call.smoothing = smoothing;
        self
    }

    pub fn rotate(mut self, rotate: f64) -> Self {
        self.call.rotate = rotate;
        self
    }

    pub fn invert(mut self, invert: f64) -> Self {
        self.call.invert = invert;
        self
    }

    /// 当前参数快照
    pub fn call(&self) -> &ShapeCall {
        &self.call
    }

    /// 向 sink 发出一次绘制调用
    pub fn render(&self, sink: &mut dyn RenderSink) {
        sink.shape(&self.call);
    }
}
