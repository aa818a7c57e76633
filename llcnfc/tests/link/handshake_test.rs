#[path = "../common/mod.rs"]
mod common;

use common::fixtures::{bytes, info, rr, rset, ua};
use llcnfc::config::LinkConfig;
use llcnfc::link::{LinkState, Notification};
use llcnfc::test_support::Harness;
use llcnfc::timer::TimerId;
use llcnfc::Error;

#[test]
fn init_sends_rset_and_completes_on_ua() {
    common::init_logging();
    let mut h = Harness::new(LinkConfig::default()).unwrap();
    h.link.init().unwrap();
    assert_eq!(h.link.state(), LinkState::Initialising);
    assert!(h.link.timers().is_armed(TimerId::Connection));

    assert_eq!(h.complete_write(), Some(rset(4)));
    assert_eq!(
        h.link.transport().written[0],
        bytes(common::fixtures::RSET_WINDOW_4)
    );

    h.deliver(&ua());
    assert_eq!(h.notifications(), vec![Notification::InitCompleted]);
    assert_eq!(h.link.state(), LinkState::Initialised);
    assert!(!h.link.timers().is_armed(TimerId::Connection));
    h.check_invariants().unwrap();
}

#[test]
fn send_before_handshake_completes_is_refused() {
    let mut h = Harness::new(LinkConfig::default()).unwrap();
    assert_eq!(h.link.send(b"early"), Err(Error::NotInitialised));
    h.link.init().unwrap();
    assert_eq!(h.link.send(b"early"), Err(Error::NotInitialised));
}

#[test]
fn init_fails_after_max_reset_attempts() {
    let config = LinkConfig::builder().max_reset_attempts(3).build().unwrap();
    let mut h = Harness::new(config).unwrap();
    h.link.init().unwrap();

    let mut resets = Vec::new();
    for _ in 0..3 {
        resets.extend(h.complete_write());
        h.expire(TimerId::Connection);
    }
    assert_eq!(resets, vec![rset(4), rset(4), rset(4)]);
    assert_eq!(h.notifications(), vec![Notification::InitFailed]);
    assert_eq!(h.link.state(), LinkState::Uninitialised);
    assert_eq!(h.link.send(b"late"), Err(Error::LinkDown));
    assert!(h.link.armed_timers().is_empty());
}

#[test]
fn unsolicited_ua_is_ignored_once_up() {
    let mut h = common::opened();
    h.deliver(&ua());
    assert!(h.notifications().is_empty());
    assert_eq!(h.complete_write(), None);
    assert!(h.link.is_up());
}

#[test]
fn reinit_discards_outstanding_frames() {
    let mut h = common::opened();
    let id = h.link.send(b"lost").unwrap();
    h.complete_write();

    h.link.init().unwrap();
    assert_eq!(h.notifications(), vec![Notification::SendFailed(id)]);
    assert_eq!(h.link.state(), LinkState::Initialising);
    assert_eq!(h.link.status().outstanding, 0);
    assert_eq!(h.complete_write(), Some(rset(4)));

    h.deliver(&ua());
    assert_eq!(h.notifications(), vec![Notification::InitCompleted]);
    assert_eq!(h.link.status().next_send.value(), 0);
    h.check_invariants().unwrap();
}

#[test]
fn reinit_reaches_the_same_state_as_a_fresh_open() {
    let fresh = common::opened().link.status();

    let mut h = common::opened();
    h.link.send(b"a").unwrap();
    h.deliver(&info(0, 0, b"b"));
    h.flush_writes();
    h.link.init().unwrap();
    h.complete_write();
    h.deliver(&ua());
    assert_eq!(h.link.status(), fresh);
}

#[test]
fn peer_rset_mid_session_renegotiates_and_resends() {
    let mut h = common::opened();
    h.link.send(b"keep").unwrap();
    assert_eq!(h.complete_write(), Some(info(0, 0, b"keep")));

    h.deliver(&rset(2));
    assert_eq!(h.notifications(), vec![Notification::LinkReset]);
    assert_eq!(h.link.window_size(), 2);

    // UA goes first, then the carried-over frame under its new number
    assert_eq!(h.complete_write(), Some(ua()));
    assert_eq!(h.complete_write(), Some(info(0, 0, b"keep")));
    h.check_invariants().unwrap();

    h.deliver(&rr(1));
    assert_eq!(h.link.status().outstanding, 0);
}

#[test]
fn peer_rset_during_own_handshake_completes_init() {
    let mut h = Harness::new(LinkConfig::default()).unwrap();
    h.link.init().unwrap();
    h.complete_write();

    h.deliver(&rset(3));
    assert_eq!(h.notifications(), vec![Notification::InitCompleted]);
    assert_eq!(h.link.window_size(), 3);
    assert_eq!(h.complete_write(), Some(ua()));
}

#[test]
fn peer_window_out_of_range_keeps_configured_size() {
    let mut h = common::opened();
    h.deliver(&rset(7));
    assert_eq!(h.link.window_size(), 4);
    assert_eq!(h.complete_write(), Some(ua()));
}
