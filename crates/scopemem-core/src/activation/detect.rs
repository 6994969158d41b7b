//! Heuristic memory-type detection from text.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::entry::MemoryType;

/// Explicit flags that take precedence over text heuristics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryHints {
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub vault: bool,
}

fn procedural_cues() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?im)\b(?:step[- ]by[- ]step|step\s+\d+|how\s+to|run|execute|install|configure|set\s*up|script|command)\b|^\s*\d+[.)]\s+\S|\.(?:sh|py|ps1|bat)\b",
        )
        .expect("procedural cue pattern is valid")
    })
}

fn episodic_cues() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b\d{4}-\d{2}-\d{2}\b|\b\d{1,2}/\d{1,2}/\d{2,4}\b|\b(?:yesterday|today|tonight|tomorrow|this\s+morning|last\s+(?:night|week|month|year)|happened|decided|meeting|session|discussed|agreed)\b|\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+\d{1,2}\b",
        )
        .expect("episodic cue pattern is valid")
    })
}

/// Classify `text` into a memory type.
///
/// Precedence: explicit `pinned`/`vault` hints, then procedural cues, then
/// episodic cues; anything else is semantic.
pub fn detect_memory_type(text: &str, hints: Option<&MemoryHints>) -> MemoryType {
    if hints.is_some_and(|h| h.pinned || h.vault) {
        return MemoryType::Vault;
    }
    if procedural_cues().is_match(text) {
        return MemoryType::Procedural;
    }
    if episodic_cues().is_match(text) {
        return MemoryType::Episodic;
    }
    MemoryType::Semantic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declarative_is_semantic() {
        assert_eq!(
            detect_memory_type("Alice prefers dark mode in every editor.", None),
            MemoryType::Semantic
        );
        assert_eq!(
            detect_memory_type("The billing service is written in Go.", None),
            MemoryType::Semantic
        );
    }

    #[test]
    fn test_procedural_cues() {
        for text in [
            "To deploy, run make release and wait for the tag.",
            "How to configure the VPN on a new laptop",
            "Install the toolchain first",
            "Step 2: copy the certificate",
            "1. open the console\n2. rotate the key",
            "See rotate_keys.sh for details",
        ] {
            assert_eq!(detect_memory_type(text, None), MemoryType::Procedural, "{text}");
        }
    }

    #[test]
    fn test_episodic_cues() {
        for text in [
            "Yesterday the payments outage was resolved.",
            "We decided to drop the legacy API.",
            "On 2024-05-01 the team moved offices.",
            "Notes from the planning meeting",
            "Launch slipped to March 14",
        ] {
            assert_eq!(detect_memory_type(text, None), MemoryType::Episodic, "{text}");
        }
    }

    #[test]
    fn test_procedural_beats_episodic() {
        let text = "In today's meeting we agreed how to install the agent.";
        assert_eq!(detect_memory_type(text, None), MemoryType::Procedural);
    }

    #[test]
    fn test_hints_beat_text() {
        let text = "Run the backup script every night";
        let vault = MemoryHints {
            pinned: false,
            vault: true,
        };
        let pinned = MemoryHints {
            pinned: true,
            vault: false,
        };
        assert_eq!(detect_memory_type(text, Some(&vault)), MemoryType::Vault);
        assert_eq!(detect_memory_type(text, Some(&pinned)), MemoryType::Vault);
        assert_eq!(
            detect_memory_type(text, Some(&MemoryHints::default())),
            MemoryType::Procedural
        );
    }

    #[test]
    fn test_word_boundaries() {
        // "running" and "scripture" are not cues.
        assert_eq!(
            detect_memory_type("Bob enjoys running and reads scripture.", None),
            MemoryType::Semantic
        );
        // Words that merely start like a month are not dates.
        for text in [
            "Prices use decimal 2 places.",
            "The marketing 5 list is curated.",
            "Use a separator 3 chars wide.",
            "Mayor 4 of the county is elected.",
        ] {
            assert_eq!(detect_memory_type(text, None), MemoryType::Semantic, "{text}");
        }
        for text in [
            "Launch moved to March 3",
            "sept 12 review of the budget",
            "Offsite is Dec. 9",
            "Contract signed jan 21",
        ] {
            assert_eq!(detect_memory_type(text, None), MemoryType::Episodic, "{text}");
        }
    }
}
