//! Publisher eligibility predicates.
//!
//! `eligible` is the statistical gate; `sticky` and `blocked` resolve user
//! overrides; `contribute` and `visible` combine them for the contribution
//! pipeline and the publisher list respectively.

use super::{LedgerState, SynopsisUpdate};

/// Score > 0 under the configured scorekeeper, enough accumulated time and
/// enough visits. Unknown publishers are never eligible.
pub fn eligible(state: &LedgerState, key: &str) -> bool {
    let Some(publisher) = state.publisher(key) else {
        return false;
    };
    let options = &state.synopsis.options;
    publisher.score(options.scorekeeper) > 0.0
        && publisher.duration_ms >= options.min_duration_ms
        && publisher.visits >= options.min_visits
}

/// Opt-in state: the site setting wins, then the publisher's own exclude
/// option (inverted), then opt-in by default.
pub fn sticky(state: &LedgerState, key: &str) -> bool {
    if let Some(explicit) = state.site_setting(key).and_then(|s| s.ledger_payments) {
        return explicit;
    }
    match exclude_option(state, key) {
        Some(exclude) => !exclude,
        None => true,
    }
}

/// Hidden from the list by an explicit `ledger_payments_shown = false`.
pub fn blocked(state: &LedgerState, key: &str) -> bool {
    state
        .site_setting(key)
        .and_then(|s| s.ledger_payments_shown)
        == Some(false)
}

/// Included in automatic contributions.
///
/// The exclude-option check overlaps with `sticky`'s fallback; both paths are
/// kept so either one alone can permit contribution.
pub fn contribute(state: &LedgerState, key: &str) -> bool {
    (sticky(state, key) || exclude_option(state, key) != Some(true))
        && eligible(state, key)
        && !blocked(state, key)
}

/// Shown in the publisher list.
///
/// When `show_only_verified` has never been cached, it is derived from the
/// general `allow_non_verified` setting and returned as an update for the
/// caller to apply; the state itself is left untouched.
pub fn visible(
    state: &LedgerState,
    allow_non_verified: bool,
    key: &str,
) -> (bool, Option<SynopsisUpdate>) {
    let (only_verified, update) = match state.synopsis.options.show_only_verified {
        Some(cached) => (cached, None),
        None => {
            let derived = !allow_non_verified;
            (derived, Some(SynopsisUpdate::ShowOnlyVerified(derived)))
        }
    };
    let verified = state
        .publisher(key)
        .and_then(|p| p.options.verified)
        .unwrap_or(false);

    let shown = eligible(state, key) && (!only_verified || verified) && !blocked(state, key);
    (shown, update)
}

fn exclude_option(state: &LedgerState, key: &str) -> Option<bool> {
    state.publisher(key).and_then(|p| p.options.exclude)
}
