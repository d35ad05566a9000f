//! Integration tests for publisher eligibility and visibility.

use payledger_core::publisher::{
    contribute, contribution_shares, eligible, visible, PublisherRecord, Scorekeeper, SiteSetting,
};
use payledger_core::{Config, LedgerState, SynopsisUpdate};
use proptest::prelude::*;

fn publisher(key: &str, visits: u32, duration_ms: u64, score: f64) -> PublisherRecord {
    let mut record = PublisherRecord::new(key);
    record.visits = visits;
    record.duration_ms = duration_ms;
    record.scores.insert(Scorekeeper::Concave, score);
    record
}

#[test]
fn visible_cache_update_round_trip() {
    let mut state = LedgerState::default();
    let mut verified = publisher("verified.com", 3, 20_000, 2.0);
    verified.options.verified = Some(true);
    state.insert_publisher(verified);
    state.insert_publisher(publisher("plain.com", 3, 20_000, 1.0));

    let mut config = Config::default();
    config.payments.allow_non_verified = false;

    // First read derives the option and hands back the write.
    let (plain_visible, update) = visible(&state, config.payments.allow_non_verified, "plain.com");
    assert!(!plain_visible);
    let update = update.expect("first read derives the option");
    assert_eq!(update, SynopsisUpdate::ShowOnlyVerified(true));
    state.apply(update);

    // Once cached, the general setting no longer matters.
    let (plain_visible, update) = visible(&state, true, "plain.com");
    assert!(!plain_visible);
    assert!(update.is_none());
    assert!(visible(&state, true, "verified.com").0);
}

#[test]
fn configured_thresholds_gate_contribution() {
    let mut state = LedgerState::default();
    state.insert_publisher(publisher("short.com", 10, 9_000, 1.0));
    state.insert_publisher(publisher("long.com", 10, 60_000, 1.0));

    assert!(contribute(&state, "short.com"));

    let mut config = Config::default();
    config.payments.minimum_visit_time_ms = 30_000;
    config.apply_thresholds(&mut state.synopsis.options);

    assert!(!contribute(&state, "short.com"));
    assert!(contribute(&state, "long.com"));

    let shares = contribution_shares(&state);
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].percentage, 100);
}

#[test]
fn blocked_publisher_is_eligible_but_neither_visible_nor_contributing() {
    let mut state = LedgerState::default();
    state.insert_publisher(publisher("a.com", 3, 20_000, 1.0));
    state.site_settings.insert(
        "a.com".into(),
        SiteSetting {
            ledger_payments: Some(true),
            ledger_payments_shown: Some(false),
        },
    );
    assert!(eligible(&state, "a.com"));
    assert!(!contribute(&state, "a.com"));
    assert!(!visible(&state, true, "a.com").0);
}

proptest! {
    #[test]
    fn eligible_is_monotonic_in_visits_and_duration(
        visits in 0u32..50,
        duration_ms in 0u64..120_000,
        extra_visits in 0u32..50,
        extra_duration in 0u64..120_000,
        score in 0.0f64..5.0,
        min_visits in 0u32..20,
        min_duration_ms in 0u64..60_000,
    ) {
        let mut state = LedgerState::default();
        state.synopsis.options.min_visits = min_visits;
        state.synopsis.options.min_duration_ms = min_duration_ms;
        state.insert_publisher(publisher("p.com", visits, duration_ms, score));
        let before = eligible(&state, "p.com");

        state.insert_publisher(publisher(
            "p.com",
            visits + extra_visits,
            duration_ms + extra_duration,
            score,
        ));
        let after = eligible(&state, "p.com");

        prop_assert!(!before || after);
    }
}
