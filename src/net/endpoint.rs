//! 端点（客户端 / 服务端）
//!
//! 端点持有自己的地址/端口、出口链路、序号计数器和重组缓冲区，
//! 负责封装发送与到达处理。

use std::net::Ipv4Addr;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::counters::{IdCounter, SeqCounter};
use super::id::{EndpointId, LinkId};
use super::network::Network;
use crate::http::{self, HttpRequest, HttpResponse};
use crate::segment::{split, ReassemblyBuffer};
use crate::sim::Simulator;
use crate::trace::{TraceEventKind, TraceSegment};
use crate::wire::{
    parse_addr, Frame, NetworkHeader, ParsedFrame, TcpFlags, TransportHeader, WireError,
    DEFAULT_TTL, DEFAULT_WINDOW, IPV4_MIN_HEADER_LEN, TCP_MIN_HEADER_LEN,
};

/// 最大 MSS：两个最短头部加上一段负载必须放进 16 位的总长度字段。
pub const MAX_MSS: usize = u16::MAX as usize - IPV4_MIN_HEADER_LEN - TCP_MIN_HEADER_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Server,
}

/// 端点配置（可从 JSON 反序列化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub name: String,
    /// 点分十进制地址
    pub addr: String,
    pub port: u16,
    /// 最大分段长度（字节）
    pub mss: usize,
    pub ttl: u8,
    pub window: u16,
    /// 本端初始序号
    pub initial_seq: u32,
    /// 首个 IP 标识
    pub initial_ip_id: u16,
    /// 服务端响应 GET 时返回的内容
    pub response_body: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            name: "endpoint".to_string(),
            addr: "10.0.0.2".to_string(),
            port: 53_000,
            mss: 1460,
            ttl: DEFAULT_TTL,
            window: DEFAULT_WINDOW,
            initial_seq: 1,
            initial_ip_id: 0x1000,
            response_body: "<html><body>hello</body></html>".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("mss must be at least 1 byte")]
    ZeroMss,
    #[error("mss {0} exceeds 65495, the largest payload a frame can carry")]
    MssTooLarge(usize),
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// 端点统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EndpointStats {
    pub frames_sent: u64,
    pub payload_bytes_sent: u64,
    pub frames_received: u64,
    pub malformed_frames: u64,
    pub misaddressed_frames: u64,
    pub messages_completed: u64,
    pub unparseable_messages: u64,
}

/// 一次 build_and_send 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendReport {
    pub frames: usize,
    pub payload_bytes: usize,
    pub first_seq: u32,
}

#[derive(Debug)]
pub struct Endpoint {
    id: EndpointId,
    name: String,
    role: Role,
    addr: Ipv4Addr,
    port: u16,
    mss: NonZeroUsize,
    ttl: u8,
    window: u16,
    response_body: String,
    uplink: Option<LinkId>,
    seq: SeqCounter,
    ip_id: IdCounter,
    peer_isn: u32,
    rx: ReassemblyBuffer,
    requests: Vec<HttpRequest>,
    responses: Vec<HttpResponse>,
    stats: EndpointStats,
}

impl Endpoint {
    /// `peer_isn` 是对端字节流的起始序号，用于锚定重组缓冲区。
    pub fn new(
        id: EndpointId,
        role: Role,
        cfg: &EndpointConfig,
        peer_isn: u32,
    ) -> Result<Self, EndpointError> {
        let addr = parse_addr(&cfg.addr)?;
        let mss = NonZeroUsize::new(cfg.mss).ok_or(EndpointError::ZeroMss)?;
        if mss.get() > MAX_MSS {
            return Err(EndpointError::MssTooLarge(mss.get()));
        }
        Ok(Self {
            id,
            name: cfg.name.clone(),
            role,
            addr,
            port: cfg.port,
            mss,
            ttl: cfg.ttl,
            window: cfg.window,
            response_body: cfg.response_body.clone(),
            uplink: None,
            seq: SeqCounter::new(cfg.initial_seq),
            ip_id: IdCounter::new(cfg.initial_ip_id),
            peer_isn,
            rx: ReassemblyBuffer::new(peer_isn),
            requests: Vec::new(),
            responses: Vec::new(),
            stats: EndpointStats::default(),
        })
    }

    pub fn id(&self) -> EndpointId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn mss(&self) -> NonZeroUsize {
        self.mss
    }

    pub fn uplink(&self) -> Option<LinkId> {
        self.uplink
    }

    pub(crate) fn set_uplink(&mut self, link: LinkId) {
        self.uplink = Some(link);
    }

    pub fn stats(&self) -> &EndpointStats {
        &self.stats
    }

    pub fn reassembly(&self) -> &ReassemblyBuffer {
        &self.rx
    }

    /// 服务端收到的请求
    pub fn requests(&self) -> &[HttpRequest] {
        &self.requests
    }

    /// 客户端收到的响应
    pub fn responses(&self) -> &[HttpResponse] {
        &self.responses
    }

    pub fn next_seq(&self) -> u32 {
        self.seq.peek()
    }

    /// 期望对端下一个字节的序号（用作 ack）
    fn ack_number(&self) -> u32 {
        self.rx
            .start_seq()
            .wrapping_add(self.rx.contiguous().len() as u32)
    }

    /// 切分 `message` 并逐段封装、交给出口链路。提交顺序即序号顺序；
    /// 到达顺序由链路决定。空消息不产生任何帧。
    ///
    /// 所有帧先全部封装成功才开始提交；封装失败时一帧也不发，计数器保持不变。
    #[tracing::instrument(
        skip(self, message, sim, net),
        fields(endpoint = %self.name, len = message.len(), dst = %dst)
    )]
    pub fn build_and_send(
        &mut self,
        message: &[u8],
        dst: Ipv4Addr,
        dst_port: u16,
        sim: &mut Simulator,
        net: &mut Network,
    ) -> Result<SendReport, WireError> {
        let chunks = split(message, self.mss);
        let ack = self.ack_number();
        let last = chunks.len().saturating_sub(1);

        // 在副本上推进计数器，全部成功后再写回
        let mut seq_counter = self.seq;
        let mut ip_id = self.ip_id;
        let mut frames = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.into_iter().enumerate() {
            let fin = i == last;
            let mut flags = TcpFlags::psh_ack();
            flags.fin = fin;

            let seq = seq_counter.take(chunk.len());
            let mut tcp = TransportHeader::new(self.port, dst_port, seq, ack, flags);
            tcp.window = self.window;
            let mut ip = NetworkHeader::new(self.addr, dst, ip_id.next_id());
            ip.ttl = self.ttl;
            let frame = Frame::assemble(&ip, &tcp, chunk)?;

            trace!(
                seq,
                ack,
                id = ip.identification,
                flags = %flags,
                frame_bytes = frame.len(),
                "封装分段"
            );
            let segment = TraceSegment {
                seq,
                len: chunk.len(),
                fin,
            };
            frames.push((frame, segment));
        }

        let mut report = SendReport {
            first_seq: self.seq.peek(),
            ..SendReport::default()
        };
        self.seq = seq_counter;
        self.ip_id = ip_id;
        for (frame, segment) in frames {
            self.stats.frames_sent += 1;
            self.stats.payload_bytes_sent += segment.len as u64;
            report.frames += 1;
            report.payload_bytes += segment.len;

            match self.uplink {
                Some(link) => net.transmit(link, frame, segment, sim),
                None => {
                    warn!(seq = segment.seq, "端点没有出口链路，丢弃帧");
                    let kind = TraceEventKind::FrameUnconnected { segment };
                    net.record(sim.now(), None, Some(frame.len()), kind);
                }
            }
        }

        debug!(frames = report.frames, bytes = report.payload_bytes, "消息已提交");
        Ok(report)
    }

    /// 客户端发起一次请求：对端的响应使用新的序号空间，因此先重置重组缓冲区。
    pub fn send_request(
        &mut self,
        req: &HttpRequest,
        dst: Ipv4Addr,
        dst_port: u16,
        sim: &mut Simulator,
        net: &mut Network,
    ) -> Result<SendReport, WireError> {
        info!(endpoint = %self.name, method = %req.method, path = %req.path, "📤 发送请求");
        self.rx.reset(self.peer_isn);
        self.build_and_send(&req.to_bytes(), dst, dst_port, sim, net)
    }

    /// 处理到达的一帧：解析、按序号写入重组缓冲区，并处理所有已完整的消息。
    #[tracing::instrument(
        skip(self, bytes, sim, net),
        fields(endpoint = %self.name, frame_bytes = bytes.len())
    )]
    pub fn on_frame_arrival(&mut self, bytes: &[u8], sim: &mut Simulator, net: &mut Network) {
        self.stats.frames_received += 1;
        let frame = match ParsedFrame::parse(bytes) {
            Ok(f) => f,
            Err(e) => {
                self.stats.malformed_frames += 1;
                warn!(error = %e, "畸形帧，丢弃");
                net.record(
                    sim.now(),
                    None,
                    Some(bytes.len()),
                    TraceEventKind::FrameMalformed {
                        endpoint: self.id.0,
                        error: e.to_string(),
                    },
                );
                return;
            }
        };

        let ip = &frame.network;
        let tcp = &frame.transport;
        if ip.dst != self.addr || tcp.dst_port != self.port {
            self.stats.misaddressed_frames += 1;
            warn!(dst = %ip.dst, dst_port = tcp.dst_port, "目的地址不是本端点，丢弃");
            net.record(
                sim.now(),
                None,
                Some(bytes.len()),
                TraceEventKind::FrameMisaddressed { endpoint: self.id.0 },
            );
            return;
        }

        debug!(
            src = %ip.src,
            src_port = tcp.src_port,
            seq = tcp.seq,
            ack = tcp.ack,
            flags = %tcp.flags,
            payload = frame.payload.len(),
            "收到分段"
        );
        let (peer, peer_port) = (ip.src, tcp.src_port);
        if !self.rx.append(tcp.seq, &frame.payload) {
            trace!(seq = tcp.seq, "分段为空或已过期，忽略");
        }

        while let Some((message, remainder)) = self.rx.extract_message() {
            self.stats.messages_completed += 1;
            info!(bytes = message.len(), remainder = remainder.len(), "✅ 消息重组完成");
            net.record(
                sim.now(),
                None,
                None,
                TraceEventKind::MessageComplete {
                    endpoint: self.id.0,
                    bytes: message.len(),
                },
            );
            self.on_message(&message, peer, peer_port, sim, net);
        }
    }

    fn on_message(
        &mut self,
        message: &[u8],
        peer: Ipv4Addr,
        peer_port: u16,
        sim: &mut Simulator,
        net: &mut Network,
    ) {
        match self.role {
            Role::Server => {
                let req = match HttpRequest::parse(message) {
                    Ok(r) => r,
                    Err(e) => {
                        self.stats.unparseable_messages += 1;
                        warn!(error = %e, "无法解析请求");
                        return;
                    }
                };
                info!(
                    method = %req.method,
                    path = %req.path,
                    host = ?req.header("Host"),
                    "📥 收到请求"
                );
                let resp = http::respond(&req, &self.response_body);
                self.requests.push(req);

                // 每个响应使用新的序号空间
                self.seq.restart();
                if let Err(e) = self.build_and_send(&resp.to_bytes(), peer, peer_port, sim, net) {
                    warn!(error = %e, "响应发送失败");
                }
            }
            Role::Client => match HttpResponse::parse(message) {
                Ok(resp) => {
                    info!(status = resp.status, body_bytes = resp.body.len(), "📥 收到响应");
                    self.responses.push(resp);
                }
                Err(e) => {
                    self.stats.unparseable_messages += 1;
                    warn!(error = %e, "无法解析响应");
                }
            },
        }
    }
}
