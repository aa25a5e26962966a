use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// 事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEventKind {
    /// 链路元信息（connect 成功时记录一条）
    LinkUp {
        name: String,
        medium: String,
        rate_bps: f64,
        distance_m: f64,
        loss: f64,
    },
    /// 端点交给链路一帧，已调度到达
    FrameSent {
        segment: TraceSegment,
        arrive_ns: u64,
        serialization_ns: u64,
        propagation_ns: u64,
        /// 抖动可正可负
        jitter_ns: i64,
        duplex_penalty_ns: u64,
    },
    /// 按丢帧概率丢弃
    FrameLost { segment: TraceSegment },
    /// 链路尚未连接，丢弃
    FrameUnconnected { segment: TraceSegment },
    /// 帧到达接收端点
    FrameDelivered { endpoint: usize },
    /// 头部过短等无法解析的帧
    FrameMalformed { endpoint: usize, error: String },
    /// 目的地址/端口不是本端点
    FrameMisaddressed { endpoint: usize },
    /// 重组出一条完整的应用层消息
    MessageComplete { endpoint: usize, bytes: usize },
}

/// 帧携带分段的摘要，便于按序号过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TraceSegment {
    pub seq: u32,
    pub len: usize,
    pub fin: bool,
}

/// 一条事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 仿真时间（纳秒，和 `SimTime.0` 同口径）
    pub t_ns: u64,
    pub link: Option<usize>,
    pub frame_bytes: Option<usize>,
    #[serde(flatten)]
    pub kind: TraceEventKind,
}

/// 内存中的事件收集器
#[derive(Debug, Default)]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, ev: TraceEvent) {
        self.events.push(ev);
    }

    pub fn count(&self, pred: impl Fn(&TraceEventKind) -> bool) -> usize {
        self.events.iter().filter(|ev| pred(&ev.kind)).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.events)
    }

    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        fs::write(path, json)
    }
}
