//! 传输层头部（TCP 布局，校验和恒为 0）
//!
//! ```text
//! +-------------------------------+-------------------------------+
//! |          source port          |       destination port        |
//! +-------------------------------+-------------------------------+
//! |                        sequence number                        |
//! |                     acknowledgment number                     |
//! +-------+-------+---------------+-------------------------------+
//! |offset | rsvd  |C E U A P R S F|            window             |
//! +-------+-------+---------------+-------------------------------+
//! |      checksum (always 0)      |        urgent pointer         |
//! +-------------------------------+-------------------------------+
//! ```

use std::fmt;

use super::error::WireError;

pub const TCP_MIN_HEADER_LEN: usize = 20;
pub const TCP_MAX_HEADER_LEN: usize = 15 * 4;
pub const DEFAULT_WINDOW: u16 = 65_535;

/// 头部第 13 字节的控制位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpFlags {
    pub cwr: bool,
    pub ece: bool,
    pub urg: bool,
    pub ack: bool,
    pub psh: bool,
    pub rst: bool,
    pub syn: bool,
    pub fin: bool,
}

impl TcpFlags {
    pub const CWR: u8 = 0x80;
    pub const ECE: u8 = 0x40;
    pub const URG: u8 = 0x20;
    pub const ACK: u8 = 0x10;
    pub const PSH: u8 = 0x08;
    pub const RST: u8 = 0x04;
    pub const SYN: u8 = 0x02;
    pub const FIN: u8 = 0x01;

    /// PSH+ACK，每个数据分段都带
    pub fn psh_ack() -> Self {
        Self {
            psh: true,
            ack: true,
            ..Self::default()
        }
    }

    pub fn to_byte(self) -> u8 {
        [
            (self.cwr, Self::CWR),
            (self.ece, Self::ECE),
            (self.urg, Self::URG),
            (self.ack, Self::ACK),
            (self.psh, Self::PSH),
            (self.rst, Self::RST),
            (self.syn, Self::SYN),
            (self.fin, Self::FIN),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .fold(0, |acc, (_, bit)| acc | bit)
    }

    pub fn from_byte(b: u8) -> Self {
        Self {
            cwr: b & Self::CWR != 0,
            ece: b & Self::ECE != 0,
            urg: b & Self::URG != 0,
            ack: b & Self::ACK != 0,
            psh: b & Self::PSH != 0,
            rst: b & Self::RST != 0,
            syn: b & Self::SYN != 0,
            fin: b & Self::FIN != 0,
        }
    }
}

impl fmt::Display for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.cwr, "CWR"),
            (self.ece, "ECE"),
            (self.urg, "URG"),
            (self.ack, "ACK"),
            (self.psh, "PSH"),
            (self.rst, "RST"),
            (self.syn, "SYN"),
            (self.fin, "FIN"),
        ];
        let set: Vec<&str> = names.iter().filter(|(on, _)| *on).map(|(_, n)| *n).collect();
        write!(f, "[{}]", set.join(","))
    }
}

/// 一个待发送传输层分段头部的字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub flags: TcpFlags,
    pub window: u16,
    pub urgent_ptr: u16,
    pub options: Vec<u8>,
}

impl TransportHeader {
    pub fn new(src_port: u16, dst_port: u16, seq: u32, ack: u32, flags: TcpFlags) -> Self {
        Self {
            src_port,
            dst_port,
            seq,
            ack,
            flags,
            window: DEFAULT_WINDOW,
            urgent_ptr: 0,
            options: Vec::new(),
        }
    }

    /// 以 32 位字计的 data offset：`5 + ceil(options / 4)`
    pub fn data_offset(&self) -> usize {
        5 + self.options.len().div_ceil(4)
    }

    pub fn header_len(&self) -> usize {
        self.data_offset() * 4
    }

    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let header_len = self.header_len();
        if header_len > TCP_MAX_HEADER_LEN {
            return Err(WireError::invalid(
                "data_offset",
                format!(
                    "{} option bytes need {} words, max is 15",
                    self.options.len(),
                    self.data_offset()
                ),
            ));
        }

        let mut buf = Vec::with_capacity(header_len);
        buf.extend_from_slice(&self.src_port.to_be_bytes());
        buf.extend_from_slice(&self.dst_port.to_be_bytes());
        buf.extend_from_slice(&self.seq.to_be_bytes());
        buf.extend_from_slice(&self.ack.to_be_bytes());
        buf.push((self.data_offset() as u8) << 4);
        buf.push(self.flags.to_byte());
        buf.extend_from_slice(&self.window.to_be_bytes());
        // 不计算校验和
        buf.extend_from_slice(&[0, 0]);
        buf.extend_from_slice(&self.urgent_ptr.to_be_bytes());
        buf.extend_from_slice(&self.options);
        buf.resize(header_len, 0);
        Ok(buf)
    }
}

/// 从线上读出的传输层头部
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTransportHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub data_offset: u8,
    pub flags: TcpFlags,
    pub window: u16,
    pub checksum: u16,
    pub urgent_ptr: u16,
    pub options: Vec<u8>,
}

impl ParsedTransportHeader {
    pub fn header_len(&self) -> usize {
        self.data_offset as usize * 4
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < TCP_MIN_HEADER_LEN {
            return Err(WireError::Truncated {
                what: "transport header",
                need: TCP_MIN_HEADER_LEN,
                got: bytes.len(),
            });
        }
        let data_offset = bytes[12] >> 4;
        let header_len = data_offset as usize * 4;
        if header_len < TCP_MIN_HEADER_LEN || header_len > bytes.len() {
            return Err(WireError::Truncated {
                what: "transport header options",
                need: header_len.max(TCP_MIN_HEADER_LEN),
                got: bytes.len(),
            });
        }

        Ok(Self {
            src_port: u16::from_be_bytes([bytes[0], bytes[1]]),
            dst_port: u16::from_be_bytes([bytes[2], bytes[3]]),
            seq: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            ack: u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            data_offset,
            flags: TcpFlags::from_byte(bytes[13]),
            window: u16::from_be_bytes([bytes[14], bytes[15]]),
            checksum: u16::from_be_bytes([bytes[16], bytes[17]]),
            urgent_ptr: u16::from_be_bytes([bytes[18], bytes[19]]),
            options: bytes[TCP_MIN_HEADER_LEN..header_len].to_vec(),
        })
    }
}
