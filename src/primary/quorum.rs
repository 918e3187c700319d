//! C6: a pure function over current health. No state of its own.

/// Whether a majority of `1 + secondary_count` nodes (primary always included) are healthy.
///
/// `healthy_secondaries` is the number of secondaries currently `Healthy`; the primary itself
/// always counts toward `healthy_count` (`spec.md` §4.6).
pub fn has_quorum(secondary_count: usize, healthy_secondaries: usize) -> bool {
    let healthy_count = 1 + healthy_secondaries;
    let total = 1 + secondary_count;
    healthy_count >= total / 2 + 1
}
