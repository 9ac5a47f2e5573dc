//! 渲染调用层
//!
//! 触发引擎与实际渲染器之间的边界。引擎侧只依赖 `RenderSink` trait，
//! 具体画什么由调用方注入的 sink 决定（日志输出、测试录制、或真正的
//! 渲染后端）。`Shape` 与 `Oscillator` 提供链式参数构建器，参数默认值
//! 与上游渲染器的约定保持一致。

pub mod oscillator;
pub mod shape;
pub mod sink;

pub use oscillator::{Oscillator, OscillatorCall, Rgb};
pub use shape::{Shape, ShapeCall};
pub use sink::{LogSink, RecordingSink, RenderCall};

/// 渲染接收端
///
/// 引擎在规则命中时通过该 trait 发出渲染调用。实现方负责把参数
/// 翻译成实际的绘制指令；引擎不关心也不检查调用的结果。
pub trait RenderSink: Send {
    /// 绘制一个多边形
    fn shape(&mut self, call: &ShapeCall);

    /// 绘制一个振荡器
    fn oscillator(&mut self, call: &OscillatorCall);
}
