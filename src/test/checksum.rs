use crate::wire::{checksum, fold, ones_complement_sum};

/// Straightforward reference: add words one at a time with end-around carry.
fn reference_checksum(bytes: &[u8]) -> u16 {
    let mut acc: u16 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let hi = bytes[i] as u16;
        let lo = bytes.get(i + 1).copied().unwrap_or(0) as u16;
        let (s, carry) = acc.overflowing_add((hi << 8) | lo);
        acc = s + carry as u16;
        i += 2;
    }
    !acc
}

#[test]
fn fold_moves_carries_until_none_remain() {
    assert_eq!(fold(0x0001_FFFF), 0x0001);
    assert_eq!(fold(0x0002_FFFE), 0x0001);
    assert_eq!(fold(0xFFFF), 0xFFFF);
    assert_eq!(fold(0), 0);
}

#[test]
fn odd_length_pads_last_byte_low() {
    assert_eq!(ones_complement_sum(&[0x12, 0x34, 0x56]), 0x1234 + 0x5600);
}

#[test]
fn checksum_matches_reference_on_rfc1071_sample() {
    // Sample words from RFC 1071 section 3.
    let data = [0x00, 0x01, 0xf2, 0x03, 0xf4, 0xf5, 0xf6, 0xf7];
    assert_eq!(fold(ones_complement_sum(&data)), 0xddf2);
    assert_eq!(checksum(&data), !0xddf2);
    assert_eq!(checksum(&data), reference_checksum(&data));
}

#[test]
fn checksum_matches_reference_on_varied_inputs() {
    let inputs: [&[u8]; 4] = [
        &[],
        &[0xFF; 64],
        b"GET / HTTP/1.1\r\n",
        &[
            0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00, 0xc0, 0xa8,
            0x00, 0x01, 0xc0, 0xa8, 0x00, 0xc7,
        ],
    ];
    for data in inputs {
        assert_eq!(checksum(data), reference_checksum(data), "input {data:?}");
    }
}

#[test]
fn checksum_of_wikipedia_ipv4_example() {
    let header = [
        0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00, 0xc0, 0xa8, 0x00,
        0x01, 0xc0, 0xa8, 0x00, 0xc7,
    ];
    assert_eq!(checksum(&header), 0xb861);
}
