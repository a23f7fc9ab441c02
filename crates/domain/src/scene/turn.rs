//! Turn selection - who must speak next.
//!
//! Strict alternation beats every other signal. Before any alternation data
//! exists, a participant who has not spoken yet is brought in; with no history
//! at all, the first participant opens. The generator never gets a say here.

use crate::value_objects::CharacterName;

/// Decide which of the two participants must speak next.
///
/// Priority order:
/// 1. `last_speaker == a` -> `b`
/// 2. `last_speaker == b` -> `a`
/// 3. only `a` has spoken -> `b`
/// 4. only `b` has spoken -> `a`
/// 5. otherwise -> `a`
pub fn select_next<'a>(
    last_speaker: Option<&CharacterName>,
    spoken_a: bool,
    spoken_b: bool,
    name_a: &'a CharacterName,
    name_b: &'a CharacterName,
) -> &'a CharacterName {
    match last_speaker {
        Some(last) if last == name_a => name_b,
        Some(last) if last == name_b => name_a,
        _ if spoken_a && !spoken_b => name_b,
        _ if spoken_b && !spoken_a => name_a,
        _ => name_a,
    }
}

/// The participant who is not `forced`, i.e. the one being responded to.
pub fn counterpart<'a>(
    forced: &CharacterName,
    name_a: &'a CharacterName,
    name_b: &'a CharacterName,
) -> &'a CharacterName {
    if forced == name_a {
        name_b
    } else {
        name_a
    }
}
