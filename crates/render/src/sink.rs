//! 内置 sink 实现
//!
//! `LogSink` 把渲染调用写进结构化日志，用于没有接入真实渲染后端的
//! 部署；`RecordingSink` 把调用记录在内存里，供测试断言。

use serde::Serialize;
use tracing::info;

use crate::oscillator::OscillatorCall;
use crate::shape::ShapeCall;
use crate::RenderSink;

/// 一次渲染调用的记录
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderCall {
    Shape(ShapeCall),
    Oscillator(OscillatorCall),
}

/// 把渲染调用输出到日志的 sink
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl RenderSink for LogSink {
    fn shape(&mut self, call: &ShapeCall) {
        info!(
            sides = call.sides,
            radius = call.radius,
            smoothing = call.smoothing,
            rotate = call.rotate,
            invert = call.invert,
            "render shape"
        );
    }

    fn oscillator(&mut self, call: &OscillatorCall) {
        info!(
            frequency = call.frequency,
            sync = call.sync,
            offset = call.offset,
            r = call.rgb.r,
            g = call.rgb.g,
            b = call.rgb.b,
            rotate = call.rotate,
            scale = call.scale,
            invert = call.invert,
            "render oscillator"
        );
    }
}

/// 记录全部渲染调用的测试 sink
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// 按发生顺序记录的调用
    pub calls: Vec<RenderCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录的调用数量
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl RenderSink for RecordingSink {
    fn shape(&mut self, call: &ShapeCall) {
        self.calls.push(RenderCall::Shape(call.clone()));
    }

    fn oscillator(&mut self, call: &OscillatorCall) {
        self.calls.push(RenderCall::Oscillator(call.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_preserves_order() {
        let mut sink = RecordingSink::new();
        sink.shape(&ShapeCall::default());
        sink.oscillator(&OscillatorCall::default());
        sink.shape(&ShapeCall::default());

        assert_eq!(sink.len(), 3);
        assert!(matches!(sink.calls[0], RenderCall::Shape(_)));
        assert!(matches!(sink.calls[1], RenderCall::Oscillator(_)));
        assert!(matches!(sink.calls[2], RenderCall::Shape(_)));
    }

    #[test]
    fn test_log_sink_accepts_calls() {
        let mut sink = LogSink::new();
        sink.shape(&ShapeCall::default());
        sink.oscillator(&OscillatorCall::default());
    }
}
