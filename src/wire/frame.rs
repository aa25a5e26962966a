//! 帧：网络层头部 ++ 传输层头部 ++ 载荷

use super::error::WireError;
use super::ipv4::{NetworkHeader, ParsedNetworkHeader};
use super::tcp::{ParsedTransportHeader, TransportHeader};

/// 链路上传输的已编码帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    pub fn assemble(
        network: &NetworkHeader,
        transport: &TransportHeader,
        payload: &[u8],
    ) -> Result<Self, WireError> {
        let tcp = transport.encode()?;
        let ip = network.encode(tcp.len() + payload.len())?;
        let mut bytes = Vec::with_capacity(ip.len() + tcp.len() + payload.len());
        bytes.extend_from_slice(&ip);
        bytes.extend_from_slice(&tcp);
        bytes.extend_from_slice(payload);
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len_bits(&self) -> u64 {
        (self.bytes.len() as u64).saturating_mul(8)
    }
}

/// 解码后拆开的帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    pub network: ParsedNetworkHeader,
    pub transport: ParsedTransportHeader,
    pub payload: Vec<u8>,
}

impl ParsedFrame {
    /// 先解网络层头部，再从 IHL 指出的偏移解传输层头部。
    ///
    /// 载荷从传输层 data offset 开始，到网络层 total length 结束
    /// （缓冲区更短时到缓冲区末尾）。
    pub fn parse(bytes: &[u8]) -> Result<Self, WireError> {
        let network = ParsedNetworkHeader::decode(bytes)?;
        let ip_len = network.header_len();
        let end = (network.total_length as usize).clamp(ip_len, bytes.len());
        let segment = &bytes[ip_len..end];
        let transport = ParsedTransportHeader::decode(segment)?;
        let payload = segment[transport.header_len()..].to_vec();
        Ok(Self {
            network,
            transport,
            payload,
        })
    }
}
