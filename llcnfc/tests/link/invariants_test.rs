#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{info, rej, rnr, rr, rset, seq, ua};
use llcnfc::config::LinkConfig;
use llcnfc::link::Notification;
use llcnfc::protocol::Frame;
use llcnfc::test_support::Harness;
use llcnfc::timer::TimerId;
use llcnfc::{TransportError, distance};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Send(usize),
    CompleteWrite,
    FailWrite(bool),
    Peer(Frame),
    Garbage(Vec<u8>),
    Expire(TimerId),
    Receive,
    Init,
}

fn peer_frame() -> impl Strategy<Value = Frame> {
    prop_oneof![
        (0u8..8).prop_map(rr),
        (0u8..8).prop_map(rej),
        (0u8..8).prop_map(rnr),
        (0u8..8, 0u8..8, proptest::collection::vec(any::<u8>(), 0..8))
            .prop_map(|(ns, nr, p)| info(ns, nr, &p)),
        (1u8..=4).prop_map(rset),
        Just(ua()),
    ]
}

fn timer() -> impl Strategy<Value = TimerId> {
    prop_oneof![
        Just(TimerId::Connection),
        Just(TimerId::DelayedAck),
        Just(TimerId::WriteRetry),
        (0u8..8).prop_map(|n| TimerId::Guard(seq(n))),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1usize..=29).prop_map(Op::Send),
        4 => Just(Op::CompleteWrite),
        1 => any::<bool>().prop_map(Op::FailWrite),
        4 => peer_frame().prop_map(Op::Peer),
        1 => proptest::collection::vec(any::<u8>(), 1..6).prop_map(Op::Garbage),
        2 => timer().prop_map(Op::Expire),
        1 => Just(Op::Receive),
        1 => Just(Op::Init),
    ]
}

fn apply(h: &mut Harness, op: Op) {
    let read_pending = h.link.transport().pending_read.is_some();
    match op {
        Op::Send(len) => {
            let _ = h.link.send(&vec![0xA5; len]);
        }
        Op::CompleteWrite => {
            h.complete_write();
        }
        Op::FailWrite(busy) => {
            let err = if busy {
                TransportError::Busy
            } else {
                TransportError::Io("fault".into())
            };
            h.fail_write(err);
        }
        Op::Peer(frame) if read_pending => h.deliver(&frame),
        Op::Garbage(bytes) if read_pending => h.deliver_bytes(&bytes),
        Op::Peer(_) | Op::Garbage(_) => {}
        Op::Expire(id) => h.expire(id),
        Op::Receive => {
            let _ = h.link.receive();
        }
        Op::Init => {
            let _ = h.link.init();
        }
    }
}

/// Apply `op`; for an I-frame from the peer also check that the expected
/// N(S) moved by one exactly when the frame was taken in order.
fn apply_checked(h: &mut Harness, op: Op) -> Result<(), String> {
    let Op::Peer(Frame::Information { ref payload, .. }) = op else {
        apply(h, op);
        return Ok(());
    };
    let empty = payload.is_empty();
    let was_up = h.link.is_up();
    let before = h.link.status().expected_recv;
    h.notifications();
    apply(h, op);
    let after = h.link.status().expected_recv;
    let delivered = h
        .notifications()
        .iter()
        .any(|n| matches!(n, Notification::Received(_) | Notification::ReceiveCompleted(_)));

    // a recovery reset renumbers from zero
    if !was_up || !h.link.is_up() {
        return Ok(());
    }
    match distance(before, after) {
        0 if !delivered => Ok(()),
        1 if delivered || empty => Ok(()),
        step => Err(format!(
            "expected N(S) moved {} -> {} (step {}), delivered={} empty={}",
            before, after, step, delivered, empty
        )),
    }
}

fn config() -> impl Strategy<Value = LinkConfig> {
    (any::<bool>(), any::<bool>(), 1u8..=4).prop_map(|(piggyback, near_gap, window)| {
        LinkConfig::builder()
            .piggyback_ack(piggyback)
            .reject_on_near_gap(near_gap)
            .window_size(window)
            .build()
            .unwrap()
    })
}

proptest! {
    #[test]
    fn link_invariants_hold_under_any_event_order(
        config in config(),
        ops in proptest::collection::vec(op(), 1..120),
    ) {
        let mut h = Harness::opened(config).unwrap();
        for op in ops {
            if let Err(broken) = apply_checked(&mut h, op.clone()) {
                prop_assert!(false, "after {:?}: {}", op, broken);
            }
            if let Err(broken) = h.check_invariants() {
                prop_assert!(false, "after {:?}: {}", op, broken);
            }
        }
    }
}
