#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{info, rej, rnr, rr, seq};
use llcnfc::config::LinkConfig;
use llcnfc::link::{LinkState, Notification};
use llcnfc::protocol::Frame;
use llcnfc::timer::TimerId;
use llcnfc::{Error, TransportError};

fn sent_numbers(frames: &[Frame]) -> Vec<u8> {
    frames
        .iter()
        .filter_map(|f| match f {
            Frame::Information { ns, .. } => Some(ns.value()),
            _ => None,
        })
        .collect()
}

#[test]
fn at_most_one_write_is_outstanding() {
    let mut h = common::opened();
    for p in [b"a", b"b", b"c"] {
        h.link.send(p).unwrap();
    }
    assert_eq!(h.link.transport().written.len(), 1);
    assert_eq!(h.link.state(), LinkState::Sending);

    let frames = h.flush_writes();
    assert_eq!(sent_numbers(&frames), vec![0, 1, 2]);
    assert_eq!(h.link.transport().overlapping_writes, 0);
    h.check_invariants().unwrap();
}

#[test]
fn send_is_refused_when_window_full() {
    let mut h = common::opened_with(LinkConfig::builder().window_size(2).build().unwrap());
    let first = h.link.send(b"1").unwrap();
    let second = h.link.send(b"2").unwrap();
    assert_eq!(h.link.send(b"3"), Err(Error::Busy));
    h.flush_writes();

    h.deliver(&rr(1));
    assert_eq!(h.notifications(), vec![Notification::SendCompleted(first)]);
    h.link.send(b"3").unwrap();
    assert_eq!(h.complete_write(), Some(info(2, 0, b"3")));

    h.deliver(&rr(3));
    let done = h.notifications();
    assert_eq!(done.len(), 2);
    assert_eq!(done[0], Notification::SendCompleted(second));
}

#[test]
fn payload_limits() {
    let mut h = common::opened();
    assert_eq!(h.link.send(&[]), Err(Error::EmptyPayload));
    assert_eq!(
        h.link.send(&[0u8; 30]),
        Err(Error::PayloadTooLarge {
            max: 29,
            actual: 30
        })
    );
    h.link.send(&[0u8; 29]).unwrap();
    assert_eq!(h.link.status().outstanding, 1);
}

#[test]
fn reject_resends_from_its_nr() {
    let mut h = common::opened_with(LinkConfig::builder().window_size(3).build().unwrap());
    let first = h.link.send(b"zero").unwrap();
    h.link.send(b"one").unwrap();
    h.link.send(b"two").unwrap();
    h.flush_writes();
    h.take_frames();

    // frame 1 was lost; the peer got 0 and asks again from 1
    h.deliver(&rej(1));
    assert_eq!(h.notifications(), vec![Notification::SendCompleted(first)]);
    let resent = h.flush_writes();
    assert_eq!(resent, vec![info(1, 0, b"one"), info(2, 0, b"two")]);
    assert_eq!(h.link.status().recv_errors, 1);
    h.check_invariants().unwrap();

    h.deliver(&rr(3));
    assert_eq!(h.link.status().outstanding, 0);
    assert_eq!(h.link.status().recv_errors, 0);
}

#[test]
fn partial_ack_then_guards_resend_only_the_unacked_frames() {
    let mut h = common::opened_with(LinkConfig::builder().window_size(3).build().unwrap());
    for p in [b"zero", b"one_", b"two_"] {
        h.link.send(p).unwrap();
    }
    h.flush_writes();
    h.take_frames();

    h.deliver(&rr(1));
    h.expire(TimerId::Guard(seq(1)));
    h.complete_write();
    h.expire(TimerId::Guard(seq(2)));
    h.complete_write();
    assert_eq!(sent_numbers(&h.take_frames()), vec![1, 2]);
    assert!(h.link.is_up());
    h.check_invariants().unwrap();
}

#[test]
fn guard_per_outstanding_frame() {
    let mut h = common::opened();
    h.link.send(b"a").unwrap();
    h.link.send(b"b").unwrap();
    h.flush_writes();
    assert!(h.link.timers().is_armed(TimerId::Guard(seq(0))));
    assert!(h.link.timers().is_armed(TimerId::Guard(seq(1))));

    h.deliver(&rr(1));
    assert!(!h.link.timers().is_armed(TimerId::Guard(seq(0))));
    assert!(h.link.timers().is_armed(TimerId::Guard(seq(1))));
    h.check_invariants().unwrap();
}

#[test]
fn ack_outside_outstanding_range_is_ignored() {
    let mut h = common::opened();
    h.link.send(b"a").unwrap();
    h.flush_writes();

    h.deliver(&rr(5));
    assert!(h.notifications().is_empty());
    assert_eq!(h.link.status().outstanding, 1);
}

#[test]
fn rnr_holds_back_new_frames() {
    let mut h = common::opened();
    h.link.send(b"a").unwrap();
    h.flush_writes();

    h.deliver(&rnr(1));
    assert_eq!(h.link.status().outstanding, 0);
    h.link.send(b"b").unwrap();
    assert_eq!(h.complete_write(), None);

    h.deliver(&rr(1));
    assert_eq!(h.complete_write(), Some(info(1, 0, b"b")));
}

#[test]
fn srej_is_answered_with_reject() {
    let mut h = common::opened();
    h.deliver(&common::fixtures::srej(0));
    assert_eq!(
        h.complete_write(),
        Some(Frame::supervisory(
            llcnfc::protocol::SupervisoryKind::Reject,
            seq(0)
        ))
    );
}

#[test]
fn synchronous_write_failure_rolls_back_the_send() {
    let mut h = common::opened();
    h.link
        .transport_mut()
        .fail_next_write(TransportError::Io("unplugged".into()));
    assert_eq!(
        h.link.send(b"x"),
        Err(Error::Transport(TransportError::Io("unplugged".into())))
    );
    assert_eq!(h.link.status().outstanding, 0);
    assert_eq!(h.link.status().next_send.value(), 0);

    h.link.send(b"x").unwrap();
    assert_eq!(h.complete_write(), Some(info(0, 0, b"x")));
}

#[test]
fn busy_driver_is_retried_in_place() {
    let mut h = common::opened();
    h.link.transport_mut().fail_next_write(TransportError::Busy);
    h.link.transport_mut().fail_next_write(TransportError::Busy);
    h.link.send(b"x").unwrap();
    assert_eq!(h.complete_write(), Some(info(0, 0, b"x")));
}

#[test]
fn driver_busy_past_the_retry_limit_is_tried_again_later() {
    let mut h = common::opened();
    for _ in 0..=h.link.config().busy_retry_limit {
        h.link.transport_mut().fail_next_write(TransportError::Busy);
    }
    h.link.send(b"x").unwrap();
    assert!(!h.link.write_pending());
    assert!(h.link.transport().written.is_empty());
    assert!(h.link.timers().is_armed(TimerId::WriteRetry));
    h.check_invariants().unwrap();

    h.expire(TimerId::WriteRetry);
    assert_eq!(h.complete_write(), Some(info(0, 0, b"x")));
    assert!(h.link.timers().is_armed(TimerId::Guard(seq(0))));
    assert!(!h.link.timers().is_armed(TimerId::WriteRetry));
    h.check_invariants().unwrap();
}

#[test]
fn busy_completion_rewrites_the_same_bytes() {
    let mut h = common::opened();
    h.link.send(b"x").unwrap();
    assert!(h.fail_write(TransportError::Busy));
    let written = &h.link.transport().written;
    assert_eq!(written.len(), 2);
    assert_eq!(written[0], written[1]);
    h.check_invariants().unwrap();
}
