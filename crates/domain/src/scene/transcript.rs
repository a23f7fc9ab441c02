//! Scene transcript - the chronological record of a scene.
//!
//! Entries are only ever appended, except for redo which removes the most
//! recent turn. Insertion order is the scene's timeline and is never changed.

use serde::{Deserialize, Serialize};

use crate::value_objects::CharacterName;

/// One entry in a scene transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscriptEntry {
    /// Storyteller exposition, attributed to nobody.
    Narration { text: String },
    /// User-authored direction injected mid-scene.
    Interjection { text: String },
    /// A participant's spoken line. `speaker` is always one of the scene's two participants.
    Utterance { speaker: CharacterName, text: String },
}

impl TranscriptEntry {
    pub fn narration(text: impl Into<String>) -> Self {
        Self::Narration { text: text.into() }
    }

    pub fn interjection(text: impl Into<String>) -> Self {
        Self::Interjection { text: text.into() }
    }

    pub fn utterance(speaker: CharacterName, text: impl Into<String>) -> Self {
        Self::Utterance {
            speaker,
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Narration { text } | Self::Interjection { text } | Self::Utterance { text, .. } => {
                text
            }
        }
    }

    pub fn is_utterance(&self) -> bool {
        matches!(self, Self::Utterance { .. })
    }

    pub fn is_narration(&self) -> bool {
        matches!(self, Self::Narration { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneTranscript {
    entries: Vec<TranscriptEntry>,
}

impl SceneTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Remove the most recent turn, for "redo last".
    ///
    /// With fewer than two entries this is a no-op. Otherwise the last
    /// utterance is removed together with one narration: the closing narration
    /// after it if there is one, else the narration immediately before it.
    /// Never removes more than two entries. Interjections are never removed.
    ///
    /// Returns the number of entries removed.
    pub fn truncate_last_pair(&mut self) -> usize {
        if self.entries.len() < 2 {
            return 0;
        }

        let Some(utterance_idx) = self.entries.iter().rposition(TranscriptEntry::is_utterance)
        else {
            return 0;
        };

        let closing_idx = self.entries[utterance_idx + 1..]
            .iter()
            .position(TranscriptEntry::is_narration)
            .map(|offset| utterance_idx + 1 + offset);

        match closing_idx {
            Some(idx) => {
                self.entries.remove(idx);
                self.entries.remove(utterance_idx);
                2
            }
            None => {
                self.entries.remove(utterance_idx);
                if utterance_idx > 0 && self.entries[utterance_idx - 1].is_narration() {
                    self.entries.remove(utterance_idx - 1);
                    2
                } else {
                    1
                }
            }
        }
    }

    /// Chronological dialogue view for generation context.
    ///
    /// Interjections render as bracketed directions, utterances as
    /// `name: "text"`; narrations are left out (they are supplied separately).
    pub fn render_dialogue_context(&self) -> String {
        let mut rendered = String::new();
        for entry in &self.entries {
            match entry {
                TranscriptEntry::Narration { .. } => {}
                TranscriptEntry::Interjection { text } => {
                    rendered.push_str(&format!("[Direction: {}]\n", text));
                }
                TranscriptEntry::Utterance { speaker, text } => {
                    rendered.push_str(&format!("{}: \"{}\"\n", speaker, text));
                }
            }
        }
        rendered
    }

    /// The last `limit` narration texts, oldest first.
    pub fn collect_recent_narrations(&self, limit: usize) -> Vec<String> {
        let mut recent: Vec<String> = self
            .entries
            .iter()
            .rev()
            .filter_map(|entry| match entry {
                TranscriptEntry::Narration { text } => Some(text.clone()),
                _ => None,
            })
            .take(limit)
            .collect();
        recent.reverse();
        recent
    }

    /// Number of recorded utterances.
    pub fn exchange_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_utterance()).count()
    }

    /// Speaker of the most recent utterance.
    pub fn last_speaker(&self) -> Option<&CharacterName> {
        self.entries.iter().rev().find_map(|entry| match entry {
            TranscriptEntry::Utterance { speaker, .. } => Some(speaker),
            _ => None,
        })
    }

    pub fn has_spoken(&self, name: &CharacterName) -> bool {
        self.entries.iter().any(|entry| {
            matches!(entry, TranscriptEntry::Utterance { speaker, .. } if speaker == name)
        })
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> CharacterName {
        CharacterName::new(s).unwrap()
    }

    fn sample() -> SceneTranscript {
        let mut t = SceneTranscript::new();
        t.append(TranscriptEntry::narration("Steam rolls across the platform."));
        t.append(TranscriptEntry::utterance(name("Aria"), "Is this seat taken?"));
        t.append(TranscriptEntry::interjection("Make Bram suspicious"));
        t.append(TranscriptEntry::utterance(name("Bram"), "Depends who's asking."));
        t
    }

    #[test]
    fn dialogue_context_excludes_narration() {
        let rendered = sample().render_dialogue_context();
        assert_eq!(
            rendered,
            "Aria: \"Is this seat taken?\"\n[Direction: Make Bram suspicious]\nBram: \"Depends who's asking.\"\n"
        );
    }

    #[test]
    fn exchange_count_ignores_quotes_in_text() {
        let mut t = SceneTranscript::new();
        t.append(TranscriptEntry::narration("She said \"hello\": twice"));
        t.append(TranscriptEntry::interjection("\"quoted\": direction"));
        t.append(TranscriptEntry::utterance(name("Aria"), "Hi"));
        assert_eq!(t.exchange_count(), 1);
    }

    #[test]
    fn derived_speaker_tracking() {
        let t = sample();
        assert_eq!(t.last_speaker(), Some(&name("Bram")));
        assert!(t.has_spoken(&name("Aria")));
        assert!(!t.has_spoken(&name("Cole")));
        assert_eq!(SceneTranscript::new().last_speaker(), None);
    }

    #[test]
    fn recent_narrations_are_chronological_and_limited() {
        let mut t = SceneTranscript::new();
        for i in 1..=5 {
            t.append(TranscriptEntry::narration(format!("n{i}")));
            t.append(TranscriptEntry::utterance(name("Aria"), "line"));
        }
        assert_eq!(t.collect_recent_narrations(3), vec!["n3", "n4", "n5"]);
        assert_eq!(t.collect_recent_narrations(10).len(), 5);
        assert!(t.collect_recent_narrations(0).is_empty());
    }

    #[test]
    fn truncate_noop_below_two_entries() {
        let mut empty = SceneTranscript::new();
        assert_eq!(empty.truncate_last_pair(), 0);
        assert!(empty.is_empty());

        let mut single = SceneTranscript::new();
        single.append(TranscriptEntry::utterance(name("Aria"), "Hi"));
        assert_eq!(single.truncate_last_pair(), 0);
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn truncate_removes_utterance_and_preceding_narration() {
        let mut t = SceneTranscript::new();
        t.append(TranscriptEntry::utterance(name("Aria"), "one"));
        t.append(TranscriptEntry::narration("beat"));
        t.append(TranscriptEntry::utterance(name("Bram"), "two"));

        assert_eq!(t.truncate_last_pair(), 2);
        assert_eq!(t.entries(), &[TranscriptEntry::utterance(name("Aria"), "one")]);
    }

    #[test]
    fn truncate_keeps_unrelated_history_when_turn_had_no_narration() {
        let mut t = SceneTranscript::new();
        t.append(TranscriptEntry::narration("opening"));
        t.append(TranscriptEntry::utterance(name("Aria"), "one"));
        t.append(TranscriptEntry::utterance(name("Bram"), "two"));

        assert_eq!(t.truncate_last_pair(), 1);
        assert_eq!(t.len(), 2);
        assert_eq!(t.last_speaker(), Some(&name("Aria")));
    }

    #[test]
    fn truncate_keeps_interjections() {
        let mut t = sample();
        assert_eq!(t.truncate_last_pair(), 1);
        assert_eq!(
            t.last(),
            Some(&TranscriptEntry::interjection("Make Bram suspicious"))
        );
    }

    #[test]
    fn truncate_takes_closing_narration_with_the_turn() {
        let mut t = SceneTranscript::new();
        t.append(TranscriptEntry::utterance(name("Aria"), "one"));
        t.append(TranscriptEntry::narration("beat"));
        t.append(TranscriptEntry::utterance(name("Bram"), "two"));
        t.append(TranscriptEntry::narration("The end."));

        assert_eq!(t.truncate_last_pair(), 2);
        assert_eq!(
            t.entries(),
            &[
                TranscriptEntry::utterance(name("Aria"), "one"),
                TranscriptEntry::narration("beat"),
            ]
        );
    }

    #[test]
    fn truncate_never_removes_more_than_two() {
        let mut t = SceneTranscript::new();
        t.append(TranscriptEntry::narration("opening"));
        t.append(TranscriptEntry::utterance(name("Aria"), "one"));
        t.append(TranscriptEntry::narration("beat"));
        t.append(TranscriptEntry::utterance(name("Bram"), "two"));
        t.append(TranscriptEntry::narration("The end."));

        assert_eq!(t.truncate_last_pair(), 2);
        assert_eq!(t.len(), 3);
        assert_eq!(t.truncate_last_pair(), 2);
        assert_eq!(t.entries(), &[TranscriptEntry::narration("opening")]);

        let mut t = SceneTranscript::new();
        t.append(TranscriptEntry::narration("beat"));
        t.append(TranscriptEntry::utterance(name("Bram"), "two"));
        t.append(TranscriptEntry::interjection("Wrap it up"));
        t.append(TranscriptEntry::narration("The end."));

        assert_eq!(t.truncate_last_pair(), 2);
        assert_eq!(
            t.entries(),
            &[
                TranscriptEntry::narration("beat"),
                TranscriptEntry::interjection("Wrap it up"),
            ]
        );
    }

    #[test]
    fn truncate_without_utterances_is_noop() {
        let mut t = SceneTranscript::new();
        t.append(TranscriptEntry::narration("a"));
        t.append(TranscriptEntry::interjection("b"));
        assert_eq!(t.truncate_last_pair(), 0);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn entries_serialize_with_kind_tag() {
        let json = serde_json::to_value(TranscriptEntry::utterance(name("Aria"), "Hi")).unwrap();
        assert_eq!(json["kind"], "utterance");
        assert_eq!(json["speaker"], "Aria");
    }
}
