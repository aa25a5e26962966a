//! 反码和校验（Internet checksum）

/// 把 `bytes` 按大端 16 位字累加到宽累加器里。
/// 奇数长度时，最后一个字节作为高位、低位补零。
pub fn ones_complement_sum(bytes: &[u8]) -> u32 {
    let mut chunks = bytes.chunks_exact(2);
    let mut sum: u32 = 0;
    for w in &mut chunks {
        sum = sum.wrapping_add(u16::from_be_bytes([w[0], w[1]]) as u32);
    }
    if let [last] = chunks.remainder() {
        sum = sum.wrapping_add((*last as u32) << 8);
    }
    sum
}

/// 把第 15 位以上的进位反复折回低 16 位，直到没有进位。
pub fn fold(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

/// `bytes` 的校验和：折叠后字和的反码。
///
/// 调用方需先把校验和字段清零。
pub fn checksum(bytes: &[u8]) -> u16 {
    !fold(ones_complement_sum(bytes))
}
