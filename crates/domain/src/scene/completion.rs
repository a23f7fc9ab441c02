//! Completion gating - when a scene is allowed to end on its own.

/// Utterances a scene needs before a completion claim is honoured.
pub const MIN_EXCHANGES_FOR_COMPLETION: usize = 6;

/// A completion claim is honoured only once the scene has substance:
/// at least six exchanges, and both participants have spoken.
pub fn may_complete(exchange_count: usize, spoken_a: bool, spoken_b: bool) -> bool {
    exchange_count >= MIN_EXCHANGES_FOR_COMPLETION && spoken_a && spoken_b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_exchanges() {
        for count in 0..MIN_EXCHANGES_FOR_COMPLETION {
            assert!(!may_complete(count, true, true));
        }
    }

    #[test]
    fn both_must_have_spoken() {
        assert!(!may_complete(10, true, false));
        assert!(!may_complete(10, false, true));
        assert!(!may_complete(10, false, false));
    }

    #[test]
    fn allowed_at_threshold() {
        assert!(may_complete(6, true, true));
        assert!(may_complete(40, true, true));
    }
}
