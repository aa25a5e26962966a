//! 发送端分段

use std::num::NonZeroUsize;

/// 按顺序把 `data` 切成 MSS 大小的片；第 `i` 片覆盖
/// `[i * mss, min(len, (i + 1) * mss))`。空输入不产生分片。
pub fn split(data: &[u8], mss: NonZeroUsize) -> Vec<&[u8]> {
    data.chunks(mss.get()).collect()
}

/// `split` 对 `len` 字节产生的分段数
pub fn segment_count(len: usize, mss: NonZeroUsize) -> usize {
    len.div_ceil(mss.get())
}
