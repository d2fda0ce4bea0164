//! Deterministic persona detection.

use super::registry::PersonaRegistry;

/// Maps a raw user message to exactly one persona key.
///
/// Implementations must be total: every input, including the empty string,
/// yields a registered key.
pub trait PersonaDetector: Send + Sync {
    fn detect(&self, message: &str) -> &'static str;
}

/// Two-phase substring matcher.
///
/// 1. Explicit mention: the first persona (registry order) whose lower-cased
///    display name or spoken key appears in the message wins outright.
/// 2. Keyword scoring: each listed keyword found in the message adds one to
///    its persona's score. The highest score wins; ties go to the persona
///    declared first. A zero top score falls back to the registry default.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordDetector {
    registry: PersonaRegistry,
}

impl KeywordDetector {
    pub fn new(registry: PersonaRegistry) -> Self {
        Self { registry }
    }

    fn explicit_mention(&self, message: &str) -> Option<&'static str> {
        self.registry
            .personas()
            .iter()
            .find(|p| message.contains(&p.name.to_lowercase()) || message.contains(&p.spoken_key()))
            .map(|p| p.key)
    }

    /// Per-persona keyword scores in registry order.
    pub fn scores(&self, message: &str) -> Vec<(&'static str, usize)> {
        let message = message.to_lowercase();
        self.registry
            .personas()
            .iter()
            .map(|p| {
                let score = p
                    .keywords
                    .iter()
                    .filter(|keyword| message.contains(*keyword))
                    .count();
                (p.key, score)
            })
            .collect()
    }
}

impl PersonaDetector for KeywordDetector {
    fn detect(&self, message: &str) -> &'static str {
        let lowered = message.to_lowercase();

        if let Some(key) = self.explicit_mention(&lowered) {
            tracing::debug!(persona = key, "Persona explicitly mentioned");
            return key;
        }

        let mut best: Option<(&'static str, usize)> = None;
        for (key, score) in self.scores(&lowered) {
            // Strict comparison keeps the earliest persona on ties.
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((key, score));
            }
        }

        match best {
            Some((key, score)) => {
                tracing::debug!(persona = key, score, "Persona selected by keywords");
                key
            }
            None => self.registry.default_key(),
        }
    }
}

/// Detect a persona with the built-in registry.
pub fn detect_persona(message: &str) -> &'static str {
    KeywordDetector::default().detect(message)
}
