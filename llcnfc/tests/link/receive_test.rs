#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{info, rej, rr};
use llcnfc::config::LinkConfig;
use llcnfc::link::{LinkState, Notification};
use llcnfc::timer::TimerId;

fn piggyback(window: u8) -> LinkConfig {
    LinkConfig::builder()
        .piggyback_ack(true)
        .window_size(window)
        .build()
        .unwrap()
}

#[test]
fn in_order_frames_are_delivered_and_acked() {
    let mut h = common::opened();
    h.link.receive().unwrap();
    assert_eq!(h.link.state(), LinkState::Receiving);

    h.deliver(&info(0, 0, b"hi"));
    assert_eq!(h.complete_write(), Some(rr(1)));
    h.deliver(&info(1, 0, b"yo"));
    assert_eq!(h.complete_write(), Some(rr(2)));

    assert_eq!(
        h.notifications(),
        vec![
            Notification::ReceiveCompleted(b"hi".to_vec()),
            Notification::Received(b"yo".to_vec()),
        ]
    );
    assert_eq!(h.link.status().expected_recv.value(), 2);
}

#[test]
fn duplicate_is_reacked_not_redelivered() {
    let mut h = common::opened();
    h.deliver(&info(0, 0, b"once"));
    h.complete_write();
    h.deliver(&info(0, 0, b"once"));
    assert_eq!(h.complete_write(), Some(rr(1)));
    assert_eq!(h.notifications(), vec![Notification::Received(b"once".to_vec())]);
    assert_eq!(h.link.status().expected_recv.value(), 1);
}

#[test]
fn gap_sends_one_reject_naming_the_expected_frame() {
    let mut h = common::opened();
    h.deliver(&info(1, 0, b"ahead"));
    assert_eq!(h.complete_write(), Some(rej(0)));

    h.deliver(&info(2, 0, b"further"));
    assert_eq!(h.complete_write(), None);
    assert_eq!(h.link.status().expected_recv.value(), 0);
    assert!(h.notifications().is_empty());

    h.deliver(&info(0, 0, b"missing"));
    assert_eq!(h.complete_write(), Some(rr(1)));

    // the reject condition cleared with the frame that filled the gap
    h.deliver(&info(3, 0, b"again"));
    assert_eq!(h.complete_write(), Some(rej(1)));
}

#[test]
fn piggyback_batches_acks_until_window_fills() {
    let mut h = common::opened_with(piggyback(2));
    h.deliver(&info(0, 0, b"a"));
    assert_eq!(h.complete_write(), None);
    assert!(h.link.timers().is_armed(TimerId::DelayedAck));
    assert_eq!(h.link.status().pending_acks, 1);

    h.deliver(&info(1, 0, b"b"));
    assert_eq!(h.complete_write(), Some(rr(2)));
    assert!(!h.link.timers().is_armed(TimerId::DelayedAck));
    assert_eq!(h.link.status().pending_acks, 0);
}

#[test]
fn delayed_ack_flushes_on_timeout() {
    let mut h = common::opened_with(piggyback(4));
    h.deliver(&info(0, 0, b"a"));
    assert_eq!(h.complete_write(), None);

    h.expire(TimerId::DelayedAck);
    assert_eq!(h.complete_write(), Some(rr(1)));
    h.check_invariants().unwrap();
}

#[test]
fn outgoing_frame_carries_the_held_ack() {
    let mut h = common::opened_with(piggyback(4));
    h.deliver(&info(0, 0, b"question"));
    h.link.send(b"answer").unwrap();
    assert_eq!(h.complete_write(), Some(info(0, 1, b"answer")));
    assert!(!h.link.timers().is_armed(TimerId::DelayedAck));
    assert_eq!(h.link.status().pending_acks, 0);
}

#[test]
fn near_gap_option_rejects_a_repeat() {
    let config = LinkConfig::builder()
        .reject_on_near_gap(true)
        .build()
        .unwrap();
    let mut h = common::opened_with(config);
    h.deliver(&info(0, 0, b"x"));
    h.complete_write();
    h.deliver(&info(0, 0, b"x"));
    assert_eq!(h.complete_write(), Some(rej(1)));
}

#[test]
fn empty_frame_is_acked_but_not_delivered() {
    let mut h = common::opened();
    h.deliver(&info(0, 0, &[]));
    assert_eq!(h.complete_write(), Some(rr(1)));
    assert!(h.notifications().is_empty());
}

#[test]
fn corrupt_frame_is_counted_and_dropped() {
    let mut h = common::opened();
    let mut wire = info(0, 0, b"hi").encode().unwrap();
    wire[3] ^= 0x40;
    h.deliver_bytes(&wire);
    assert_eq!(h.complete_write(), None);
    assert_eq!(h.link.status().recv_errors, 1);
    assert_eq!(h.link.status().expected_recv.value(), 0);

    h.deliver(&info(0, 0, b"hi"));
    assert_eq!(h.complete_write(), Some(rr(1)));
    assert_eq!(h.link.status().recv_errors, 0);
}

#[test]
fn bad_length_prefix_rereads_from_the_next_byte() {
    let mut h = common::opened();
    h.deliver_bytes(&[0x01]);
    assert_eq!(h.link.status().recv_errors, 1);
    h.deliver(&info(0, 0, b"ok"));
    assert_eq!(h.notifications(), vec![Notification::Received(b"ok".to_vec())]);
}

#[test]
fn incoming_frame_acknowledges_our_frames() {
    let mut h = common::opened();
    let id = h.link.send(b"ping").unwrap();
    h.complete_write();
    h.deliver(&info(0, 1, b"pong"));
    assert_eq!(
        h.notifications(),
        vec![
            Notification::SendCompleted(id),
            Notification::Received(b"pong".to_vec()),
        ]
    );
    assert_eq!(h.complete_write(), Some(rr(1)));
}
