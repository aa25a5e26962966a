use std::num::NonZeroUsize;

use crate::segment::{split, ReassemblyBuffer};

const REQUEST: &[u8] = b"GET /x HTTP/1.1\r\nHost: a\r\n\r\n";

fn fill(buf: &mut ReassemblyBuffer, start: u32, data: &[u8], mss: usize, order: &[usize]) {
    let parts = split(data, NonZeroUsize::new(mss).expect("mss"));
    for &i in order {
        let seq = start.wrapping_add((i * mss) as u32);
        assert!(buf.append(seq, parts[i]));
    }
}

/// A header block padded with a body so the whole message is exactly `total` bytes.
fn message_of_len(total: usize) -> Vec<u8> {
    let head_without_len = "POST /upload HTTP/1.1\r\nContent-Length: ";
    let overhead = head_without_len.len() + 4 + 4;
    let body_len = total - overhead;
    let head = format!("{head_without_len}{body_len:04}\r\n\r\n");
    let mut msg = head.into_bytes();
    msg.extend((0..body_len).map(|i| b'a' + (i % 26) as u8));
    assert_eq!(msg.len(), total);
    msg
}

#[test]
fn in_order_arrival_completes_after_last_chunk() {
    let mut buf = ReassemblyBuffer::new(1);
    let parts = split(REQUEST, NonZeroUsize::new(10).expect("mss"));
    let mut seq = 1u32;
    for (i, p) in parts.iter().enumerate() {
        assert!(!buf.is_complete(), "complete too early at chunk {i}");
        buf.append(seq, p);
        seq += p.len() as u32;
    }
    assert!(buf.is_complete());
    let (msg, rest) = buf.extract_message().expect("complete");
    assert_eq!(msg, REQUEST);
    assert!(rest.is_empty());
    assert_eq!(buf.start_seq(), 1 + REQUEST.len() as u32);
    assert_eq!(buf.chunk_count(), 0);
}

#[test]
fn fifteen_hundred_bytes_reassemble_in_every_arrival_order() {
    let msg = message_of_len(1500);
    let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
    for order in orders {
        let mut buf = ReassemblyBuffer::new(1);
        fill(&mut buf, 1, &msg, 600, &order[..2]);
        assert!(!buf.is_complete(), "order {order:?}");
        fill(&mut buf, 1, &msg, 600, &order[2..]);
        assert!(buf.is_complete(), "order {order:?}");
        let (got, rest) = buf.extract_message().expect("complete");
        assert_eq!(got, msg, "order {order:?}");
        assert!(rest.is_empty());
    }
}

#[test]
fn gap_blocks_completion_even_if_later_bytes_contain_delimiter() {
    let mut buf = ReassemblyBuffer::new(100);
    fill(&mut buf, 100, REQUEST, 10, &[1, 2]);
    assert!(buf.contiguous().is_empty());
    assert!(!buf.is_complete());
    assert_eq!(buf.buffered_bytes(), REQUEST.len() - 10);
    assert!(buf.extract_message().is_none());
}

#[test]
fn body_is_awaited_per_content_length() {
    let msg = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello";
    let mut buf = ReassemblyBuffer::new(0);
    buf.append(0, &msg[..msg.len() - 2]);
    assert!(!buf.is_complete());
    buf.append((msg.len() - 2) as u32, &msg[msg.len() - 2..]);
    assert!(buf.is_complete());
    assert_eq!(buf.extract_message().expect("complete").0, msg.to_vec());
}

#[test]
fn remainder_is_kept_as_start_of_next_message() {
    let mut stream = REQUEST.to_vec();
    stream.extend_from_slice(b"GET /y HT");
    let mut buf = ReassemblyBuffer::new(7);
    buf.append(7, &stream);

    let (msg, rest) = buf.extract_message().expect("first message");
    assert_eq!(msg, REQUEST);
    assert_eq!(rest, b"GET /y HT");
    assert!(!buf.is_complete());

    let next_seq = 7 + stream.len() as u32;
    buf.append(next_seq, b"TP/1.1\r\n\r\n");
    let (msg, _) = buf.extract_message().expect("second message");
    assert_eq!(msg, b"GET /y HTTP/1.1\r\n\r\n");
}

#[test]
fn sequence_numbers_wrap_around() {
    let start = u32::MAX - 12;
    let mut buf = ReassemblyBuffer::new(start);
    fill(&mut buf, start, REQUEST, 10, &[2, 0, 1]);
    let (msg, _) = buf.extract_message().expect("complete across wrap");
    assert_eq!(msg, REQUEST);
    assert_eq!(buf.start_seq(), start.wrapping_add(REQUEST.len() as u32));
}

#[test]
fn stale_and_empty_chunks_are_ignored() {
    let mut buf = ReassemblyBuffer::new(1_000);
    assert!(!buf.append(999, b"old"));
    assert!(!buf.append(1_000, b""));
    assert_eq!(buf.chunk_count(), 0);

    buf.reset(5);
    assert_eq!(buf.start_seq(), 5);
    assert!(buf.append(5, b"x"));
}

#[test]
fn oversized_content_length_completes_as_header_block() {
    let head: &[u8] = b"GET / HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\n";
    let mut buf = ReassemblyBuffer::new(1);
    assert!(buf.append(1, head));
    assert!(buf.is_complete());

    let (msg, rest) = buf.extract_message().expect("header block framed");
    assert_eq!(msg, head);
    assert!(rest.is_empty());
    assert_eq!(buf.start_seq(), 1 + head.len() as u32);
}
