#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{bytes, info, rej, rr, rset, seq, ua};
use llcnfc::protocol::{Frame, FrameCodec, LlcCodec, ResetParams, SupervisoryKind};
use llcnfc::{BaudRate, Error};

#[test]
fn known_unnumbered_vectors() {
    assert_eq!(rset(4).encode().unwrap(), bytes(common::fixtures::RSET_WINDOW_4));
    assert_eq!(ua().encode().unwrap(), bytes(common::fixtures::UA));
    assert_eq!(Frame::decode(&bytes(common::fixtures::UA)).unwrap(), ua());
}

#[test]
fn headers_by_frame_class() {
    assert_eq!(info(3, 5, b"x").header(), 0x80 | (3 << 3) | 5);
    assert_eq!(rr(2).header(), 0xC2);
    assert_eq!(rej(7).header(), 0xCF);
    assert_eq!(
        Frame::supervisory(SupervisoryKind::ReceiveNotReady, seq(1)).header(),
        0xD1
    );
    assert_eq!(rset(4).header(), 0xF9);
    assert_eq!(ua().header(), 0xE6);
}

#[test]
fn information_frame_decodes_through_codec() {
    let codec = LlcCodec;
    let frame = info(1, 2, &[0xD4, 0x4A, 0x01, 0x00]);
    let wire = codec.encode(&frame).unwrap();
    assert_eq!(wire[0] as usize, wire.len() - 1);
    assert_eq!(wire[1], 0x8A);
    assert_eq!(codec.decode(&wire).unwrap(), frame);
}

#[test]
fn rset_with_baud_rate() {
    let frame = Frame::reset(ResetParams::new(2, Some(BaudRate::B115200)));
    let wire = frame.encode().unwrap();
    assert_eq!(&wire[..5], &[0x06, 0xF9, 0x02, 0x00, 0x05]);
    assert_eq!(Frame::decode(&wire).unwrap(), frame);
}

#[test]
fn largest_payload_fills_a_33_byte_frame() {
    let wire = info(0, 0, &[0x55; 29]).encode().unwrap();
    assert_eq!(wire.len(), 33);
    assert_eq!(wire[0], 32);

    match info(0, 0, &[0x55; 30]).encode() {
        Err(Error::PayloadTooLarge { max: 29, actual: 30 }) => {}
        other => panic!("expected PayloadTooLarge, got: {:?}", other),
    }
}

#[test]
fn corrupted_trailer_is_rejected() {
    let mut wire = rr(3).encode().unwrap();
    let last = wire.len() - 1;
    wire[last] ^= 0x01;
    assert!(matches!(
        Frame::decode(&wire),
        Err(Error::ChecksumMismatch { .. })
    ));
}

#[test]
fn truncated_frame_is_rejected() {
    let wire = info(0, 0, b"abc").encode().unwrap();
    assert!(Frame::decode(&wire[..wire.len() - 1]).is_err());
    assert!(Frame::decode(&[0x02, 0xC0, 0x00]).is_err());
}
