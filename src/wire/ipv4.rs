//! 网络层头部（IPv4 布局）
//!
//! ```text
//!  0               1               2               3
//! +-------+-------+-----------+---+-------------------------------+
//! |version|  IHL  |   DSCP    |ECN|         total length          |
//! +-------+-------+-----------+---+-----+-------------------------+
//! |         identification        |0|D|M|     fragment offset     |
//! +---------------+---------------+-----+-------------------------+
//! |      TTL      |   protocol    |        header checksum        |
//! +---------------+---------------+-------------------------------+
//! |                        source address                         |
//! |                      destination address                      |
//! |                options (zero padded to 4 bytes)               |
//! +---------------------------------------------------------------+
//! ```

use std::net::Ipv4Addr;

use super::checksum::checksum;
use super::error::WireError;

pub const IPV4_VERSION: u8 = 4;
pub const IPV4_MIN_HEADER_LEN: usize = 20;
/// IHL 是 4 位的字数
pub const IPV4_MAX_HEADER_LEN: usize = 15 * 4;
/// 本协议栈承载的传输层对应的 `protocol` 值
pub const PROTO_TCP: u8 = 6;
pub const DEFAULT_TTL: u8 = 64;

const FLAG_DF: u16 = 0x4000;
const FLAG_MF: u16 = 0x2000;
const FRAG_OFFSET_MASK: u16 = 0x1FFF;

/// 解析点分十进制地址，失败时返回 [`WireError::InvalidField`]。
pub fn parse_addr(s: &str) -> Result<Ipv4Addr, WireError> {
    s.trim().parse::<Ipv4Addr>().map_err(|_| {
        WireError::invalid("address", format!("{s:?} is not a dotted-quad IPv4 address"))
    })
}

/// 一个待发送网络层头部的字段
///
/// `total_length`、`ihl` 与校验和在编码时算出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkHeader {
    pub dscp: u8,
    pub ecn: u8,
    pub identification: u16,
    pub dont_fragment: bool,
    pub more_fragments: bool,
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub options: Vec<u8>,
}

impl NetworkHeader {
    /// 端点使用的默认头部：TTL 64，协议 TCP，置 DF。
    pub fn new(src: Ipv4Addr, dst: Ipv4Addr, identification: u16) -> Self {
        Self {
            dscp: 0,
            ecn: 0,
            identification,
            dont_fragment: true,
            more_fragments: false,
            fragment_offset: 0,
            ttl: DEFAULT_TTL,
            protocol: PROTO_TCP,
            src,
            dst,
            options: Vec::new(),
        }
    }

    /// 以 32 位字计的头部长度：`5 + ceil(options / 4)`
    pub fn ihl(&self) -> usize {
        5 + self.options.len().div_ceil(4)
    }

    pub fn header_len(&self) -> usize {
        self.ihl() * 4
    }

    /// 为 `payload_len` 字节的载荷打包头部
    pub fn encode(&self, payload_len: usize) -> Result<Vec<u8>, WireError> {
        let header_len = self.header_len();
        if header_len > IPV4_MAX_HEADER_LEN {
            return Err(WireError::invalid(
                "ihl",
                format!("{} option bytes need {} words, max is 15", self.options.len(), self.ihl()),
            ));
        }
        let total = header_len + payload_len;
        let total_length = u16::try_from(total).map_err(|_| {
            WireError::invalid("total_length", format!("{total} does not fit in 16 bits"))
        })?;
        if self.dscp > 0x3F {
            return Err(WireError::invalid("dscp", format!("{} does not fit in 6 bits", self.dscp)));
        }
        if self.ecn > 0x03 {
            return Err(WireError::invalid("ecn", format!("{} does not fit in 2 bits", self.ecn)));
        }
        if self.fragment_offset > FRAG_OFFSET_MASK {
            return Err(WireError::invalid(
                "fragment_offset",
                format!("{} does not fit in 13 bits", self.fragment_offset),
            ));
        }

        let mut flags_frag = self.fragment_offset;
        if self.dont_fragment {
            flags_frag |= FLAG_DF;
        }
        if self.more_fragments {
            flags_frag |= FLAG_MF;
        }

        let mut buf = Vec::with_capacity(header_len);
        buf.push((IPV4_VERSION << 4) | self.ihl() as u8);
        buf.push((self.dscp << 2) | self.ecn);
        buf.extend_from_slice(&total_length.to_be_bytes());
        buf.extend_from_slice(&self.identification.to_be_bytes());
        buf.extend_from_slice(&flags_frag.to_be_bytes());
        buf.push(self.ttl);
        buf.push(self.protocol);
        buf.extend_from_slice(&[0, 0]);
        buf.extend_from_slice(&self.src.octets());
        buf.extend_from_slice(&self.dst.octets());
        buf.extend_from_slice(&self.options);
        buf.resize(header_len, 0);

        let sum = checksum(&buf);
        buf[10..12].copy_from_slice(&sum.to_be_bytes());
        Ok(buf)
    }
}

/// 从线上读出的网络层头部。校验和只读出，不校验。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNetworkHeader {
    pub version: u8,
    pub ihl: u8,
    pub dscp: u8,
    pub ecn: u8,
    pub total_length: u16,
    pub identification: u16,
    pub dont_fragment: bool,
    pub more_fragments: bool,
    pub fragment_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    /// 选项字节，含填充
    pub options: Vec<u8>,
}

impl ParsedNetworkHeader {
    pub fn header_len(&self) -> usize {
        self.ihl as usize * 4
    }

    /// 声明的载荷长度（`total_length - header_len`），最小为 0
    pub fn payload_len(&self) -> usize {
        (self.total_length as usize).saturating_sub(self.header_len())
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < IPV4_MIN_HEADER_LEN {
            return Err(WireError::Truncated {
                what: "network header",
                need: IPV4_MIN_HEADER_LEN,
                got: bytes.len(),
            });
        }
        let ihl = bytes[0] & 0x0F;
        let header_len = ihl as usize * 4;
        if header_len < IPV4_MIN_HEADER_LEN || header_len > bytes.len() {
            return Err(WireError::Truncated {
                what: "network header options",
                need: header_len.max(IPV4_MIN_HEADER_LEN),
                got: bytes.len(),
            });
        }
        let flags_frag = u16::from_be_bytes([bytes[6], bytes[7]]);

        Ok(Self {
            version: bytes[0] >> 4,
            ihl,
            dscp: bytes[1] >> 2,
            ecn: bytes[1] & 0x03,
            total_length: u16::from_be_bytes([bytes[2], bytes[3]]),
            identification: u16::from_be_bytes([bytes[4], bytes[5]]),
            dont_fragment: flags_frag & FLAG_DF != 0,
            more_fragments: flags_frag & FLAG_MF != 0,
            fragment_offset: flags_frag & FRAG_OFFSET_MASK,
            ttl: bytes[8],
            protocol: bytes[9],
            checksum: u16::from_be_bytes([bytes[10], bytes[11]]),
            src: Ipv4Addr::new(bytes[12], bytes[13], bytes[14], bytes[15]),
            dst: Ipv4Addr::new(bytes[16], bytes[17], bytes[18], bytes[19]),
            options: bytes[IPV4_MIN_HEADER_LEN..header_len].to_vec(),
        })
    }
}
