//! 接收端重组

use std::collections::BTreeMap;

use crate::http::framed_len;

/// 与流起点的距离达到此值及以上的偏移，视为流起点之前
/// 的序号（已消费）。
const STALE_OFFSET: u32 = 1 << 31;

/// 一条字节流已收到的载荷块，以相对流起点的偏移为键。
///
/// 块可以任意顺序到达，按序号拼接；
/// 只在无空洞的前缀里查找完整消息。
#[derive(Debug, Clone)]
pub struct ReassemblyBuffer {
    start_seq: u32,
    chunks: BTreeMap<u32, Vec<u8>>,
}

impl ReassemblyBuffer {
    /// 流从序号 `start_seq` 开始的缓冲区
    pub fn new(start_seq: u32) -> Self {
        Self {
            start_seq,
            chunks: BTreeMap::new(),
        }
    }

    /// 丢弃已缓冲的全部数据，并重新设定流起点
    pub fn reset(&mut self, start_seq: u32) {
        self.start_seq = start_seq;
        self.chunks.clear();
    }

    /// 第一个尚未取出的字节的序号
    pub fn start_seq(&self) -> u32 {
        self.start_seq
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn buffered_bytes(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }

    /// 存入一个到达的载荷。块被忽略（为空，或完全在流起点之前）
    /// 时返回 `false`。
    pub fn append(&mut self, seq: u32, chunk: &[u8]) -> bool {
        if chunk.is_empty() {
            return false;
        }
        let offset = seq.wrapping_sub(self.start_seq);
        if offset >= STALE_OFFSET {
            return false;
        }
        self.chunks.insert(offset, chunk.to_vec());
        true
    }

    /// 从流起点到第一个空洞为止的字节
    pub fn contiguous(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (&off, chunk) in &self.chunks {
            let off = off as usize;
            let have = out.len();
            if off > have {
                break;
            }
            let end = off + chunk.len();
            if end > have {
                out.extend_from_slice(&chunk[have - off..]);
            }
        }
        out
    }

    pub fn is_complete(&self) -> bool {
        framed_len(&self.contiguous()).is_some()
    }

    /// 取出第一条完整消息，连同其后连续的字节一起返回。
    /// 剩余部分留在缓冲区里，作为下一条消息的开头。
    pub fn extract_message(&mut self) -> Option<(Vec<u8>, Vec<u8>)> {
        let data = self.contiguous();
        let n = framed_len(&data)?;
        let remainder = data[n..].to_vec();

        let consumed = data.len() as u32;
        let shift = n as u32;
        let mut rest = BTreeMap::new();
        if !remainder.is_empty() {
            rest.insert(0, remainder.clone());
        }
        for (off, chunk) in std::mem::take(&mut self.chunks) {
            if off > consumed {
                rest.insert(off - shift, chunk);
            }
        }
        self.chunks = rest;
        self.start_seq = self.start_seq.wrapping_add(shift);

        Some((data[..n].to_vec(), remainder))
    }
}
