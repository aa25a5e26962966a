//! 帧级事件记录（JSON）
//!
//! 丢帧、未连接丢弃、畸形帧这类不会向发送端报告的情况都记在这里，
//! 仿真结束后可整体写成一个 JSON 数组。

mod types;

pub use types::{TraceEvent, TraceEventKind, TraceLog, TraceSegment};
