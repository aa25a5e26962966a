use std::net::Ipv4Addr;

use crate::wire::{
    checksum, fold, ones_complement_sum, parse_addr, NetworkHeader, ParsedNetworkHeader, WireError,
    PROTO_TCP,
};

fn example_header() -> NetworkHeader {
    let mut h =
        NetworkHeader::new(Ipv4Addr::new(10, 0, 0, 2), Ipv4Addr::new(104, 18, 32, 47), 0x1000);
    h.ttl = 64;
    h.protocol = PROTO_TCP;
    h
}

#[test]
fn example_header_has_ihl5_total_length_and_valid_checksum() {
    let h = example_header();
    let bytes = h.encode(20).expect("encode");

    assert_eq!(bytes.len(), 20);
    assert_eq!(bytes[0], 0x45);
    assert_eq!(u16::from_be_bytes([bytes[2], bytes[3]]), 40);
    assert_eq!(&bytes[4..6], &[0x10, 0x00]);
    // DF set, MF clear, offset 0
    assert_eq!(&bytes[6..8], &[0x40, 0x00]);
    assert_eq!(bytes[8], 64);
    assert_eq!(bytes[9], 6);
    assert_eq!(&bytes[12..16], &[10, 0, 0, 2]);
    assert_eq!(&bytes[16..20], &[104, 18, 32, 47]);

    let inserted = u16::from_be_bytes([bytes[10], bytes[11]]);
    assert_eq!(inserted, 0x988d);

    let mut zeroed = bytes.clone();
    zeroed[10] = 0;
    zeroed[11] = 0;
    assert_eq!(fold(ones_complement_sum(&zeroed)), !inserted);
    assert_eq!(checksum(&zeroed), inserted);
    // Summing the header with its checksum in place yields all ones.
    assert_eq!(fold(ones_complement_sum(&bytes)), 0xFFFF);
}

#[test]
fn decode_reproduces_every_encoded_field() {
    let mut h = example_header();
    h.dscp = 46;
    h.ecn = 1;
    h.dont_fragment = false;
    h.more_fragments = true;
    h.fragment_offset = 0x1ABC;
    h.ttl = 3;
    h.protocol = 17;
    h.options = vec![0x94, 0x04, 0x00, 0x00, 0x01];

    let bytes = h.encode(100).expect("encode");
    let p = ParsedNetworkHeader::decode(&bytes).expect("decode");

    assert_eq!(p.version, 4);
    assert_eq!(p.ihl, 7);
    assert_eq!(p.header_len(), 28);
    assert_eq!(p.total_length, 128);
    assert_eq!(p.payload_len(), 100);
    assert_eq!(p.dscp, 46);
    assert_eq!(p.ecn, 1);
    assert_eq!(p.identification, 0x1000);
    assert!(!p.dont_fragment);
    assert!(p.more_fragments);
    assert_eq!(p.fragment_offset, 0x1ABC);
    assert_eq!(p.ttl, 3);
    assert_eq!(p.protocol, 17);
    assert_eq!(p.src, h.src);
    assert_eq!(p.dst, h.dst);
    assert_eq!(p.options, vec![0x94, 0x04, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00]);

    let mut zeroed = bytes.clone();
    zeroed[10..12].copy_from_slice(&[0, 0]);
    assert_eq!(p.checksum, checksum(&zeroed));
}

#[test]
fn options_are_padded_to_word_boundary() {
    let mut h = example_header();
    for (opt_len, ihl) in [(0usize, 5usize), (1, 6), (4, 6), (5, 7), (40, 15)] {
        h.options = vec![1; opt_len];
        assert_eq!(h.ihl(), ihl, "options {opt_len}");
        let bytes = h.encode(0).expect("encode");
        assert_eq!(bytes.len(), ihl * 4);
        assert_eq!(bytes[0] & 0x0F, ihl as u8);
    }
}

#[test]
fn encode_rejects_fields_that_do_not_fit() {
    let mut h = example_header();
    h.options = vec![0; 41];
    assert!(matches!(h.encode(0), Err(WireError::InvalidField { field: "ihl", .. })));

    let h = example_header();
    assert!(matches!(
        h.encode(65_535 - 19),
        Err(WireError::InvalidField { field: "total_length", .. })
    ));
    assert!(h.encode(65_535 - 20).is_ok());

    let mut h = example_header();
    h.fragment_offset = 0x2000;
    assert!(matches!(h.encode(0), Err(WireError::InvalidField { field: "fragment_offset", .. })));

    let mut h = example_header();
    h.dscp = 64;
    assert!(matches!(h.encode(0), Err(WireError::InvalidField { field: "dscp", .. })));
}

#[test]
fn decode_does_not_verify_checksum() {
    let mut bytes = example_header().encode(0).expect("encode");
    bytes[10] ^= 0xFF;
    let p = ParsedNetworkHeader::decode(&bytes).expect("decode trusts the header");
    assert_eq!(p.ttl, 64);
}

#[test]
fn decode_rejects_short_or_inconsistent_headers() {
    let bytes = example_header().encode(0).expect("encode");
    assert_eq!(
        ParsedNetworkHeader::decode(&bytes[..19]),
        Err(WireError::Truncated {
            what: "network header",
            need: 20,
            got: 19
        })
    );

    let mut bad_ihl = bytes.clone();
    bad_ihl[0] = 0x44;
    assert!(matches!(ParsedNetworkHeader::decode(&bad_ihl), Err(WireError::Truncated { .. })));

    let mut long_ihl = bytes.clone();
    long_ihl[0] = 0x46;
    assert!(matches!(
        ParsedNetworkHeader::decode(&long_ihl),
        Err(WireError::Truncated { need: 24, .. })
    ));
}

#[test]
fn parse_addr_accepts_dotted_quads_only() {
    assert_eq!(parse_addr("10.0.0.2"), Ok(Ipv4Addr::new(10, 0, 0, 2)));
    assert_eq!(parse_addr(" 104.18.32.47 "), Ok(Ipv4Addr::new(104, 18, 32, 47)));
    for bad in ["10.0.0", "256.1.1.1", "example.com", ""] {
        assert!(
            matches!(parse_addr(bad), Err(WireError::InvalidField { field: "address", .. })),
            "{bad:?}"
        );
    }
}
