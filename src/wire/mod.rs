//! 头部编解码
//!
//! 网络层与传输层头部的逐位编码，统一大端。
//! 解码时从不校验校验和。

mod checksum;
mod error;
mod frame;
mod ipv4;
mod tcp;

pub use checksum::{checksum, fold, ones_complement_sum};
pub use error::WireError;
pub use frame::{Frame, ParsedFrame};
pub use ipv4::{
    parse_addr, NetworkHeader, ParsedNetworkHeader, DEFAULT_TTL, IPV4_MAX_HEADER_LEN,
    IPV4_MIN_HEADER_LEN, IPV4_VERSION, PROTO_TCP,
};
pub use tcp::{
    ParsedTransportHeader, TcpFlags, TransportHeader, DEFAULT_WINDOW, TCP_MAX_HEADER_LEN,
    TCP_MIN_HEADER_LEN,
};
