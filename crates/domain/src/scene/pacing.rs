//! Pacing - when a turn carries narration.

/// Narrate the opening beat and then every third exchange.
///
/// `exchange_count` is the number of utterances recorded before the upcoming turn.
pub fn needs_narration(exchange_count: usize) -> bool {
    exchange_count % NARRATION_INTERVAL == 0
}

/// Exchanges between narrated turns.
pub const NARRATION_INTERVAL: usize = 3;
