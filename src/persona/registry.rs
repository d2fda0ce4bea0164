//! Static persona definitions.
//!
//! Declaration order matters: it is the order of the explicit-mention scan and
//! the tie-break order for keyword scoring.

/// A named bundle of behavior scope and allowed tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Persona {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Tool names this persona may offer to the model, in presentation order.
    pub tools: &'static [&'static str],
    /// Substrings that vote for this persona during detection.
    pub keywords: &'static [&'static str],
}

impl Persona {
    /// The key with `_` separators replaced by spaces (`stock_analyst` -> `stock analyst`).
    pub fn spoken_key(&self) -> String {
        self.key.replace('_', " ")
    }
}

pub const DEFAULT_PERSONA: &str = "campaign_manager";

pub const BUILTIN_PERSONAS: &[Persona] = &[
    Persona {
        key: "campaign_manager",
        name: "Campaign Manager",
        description: "Manages marketing campaigns across platforms (Instagram, Facebook, TikTok, Twitter, etc.). Specializes in creating, tracking, and optimizing affiliate marketing campaigns.",
        tools: &[
            "create_campaign",
            "read_campaign",
            "update_campaign",
            "delete_campaign",
            "list_campaigns",
        ],
        keywords: &[
            "campaign",
            "marketing",
            "campaign manager",
            "ads",
            "instagram",
            "facebook",
            "tiktok",
            "twitter",
            "platform",
        ],
    },
    Persona {
        key: "stock_analyst",
        name: "Stock Market Analyst",
        description: "Tracks stock investments, dividends, and stock market insights. Manages stock purchases, sales, and dividend tracking.",
        tools: &[
            "create_stock",
            "read_stock",
            "update_stock",
            "delete_stock",
            "create_transaction",
            "get_stock_quote",
            "get_penny_stocks",
            "get_stock_intraday",
            "get_stock_daily",
        ],
        keywords: &[
            "stock",
            "analyst",
            "market",
            "dividend",
            "portfolio",
            "shares",
            "equity",
            "investment",
        ],
    },
    Persona {
        key: "learning_manager",
        name: "Learning & Development Manager",
        description: "Tracks educational progress and learning modules. Helps you stay updated with courses, certifications, and skill development.",
        tools: &[
            "create_learning_module",
            "read_learning_module",
            "update_learning_module",
            "delete_learning_module",
        ],
        keywords: &[
            "learning",
            "module",
            "course",
            "education",
            "training",
            "skill",
            "progress",
            "module",
        ],
    },
    Persona {
        key: "financial_assistant",
        name: "Financial Assistant",
        description: "Logs all financial transactions including deposits, withdrawals, affiliate payouts, dividends, and bank transfers. Manages PayPal payments. Maintains comprehensive financial records.",
        tools: &[
            "create_transaction",
            "create_PayPalPayment",
            "get_PayPalPaymentDetails",
            "list_PayPalPayments",
            "verify_PayPalPayment",
            "cancel_PayPalPayment",
            "get_PayPalConfig",
        ],
        keywords: &[
            "transaction",
            "deposit",
            "withdrawal",
            "payout",
            "payment",
            "paypal",
            "pay",
            "invoice",
            "billing",
            "financial",
            "money",
            "finance",
        ],
    },
    Persona {
        key: "app_customizer",
        name: "App Customizer",
        description: "Manages user preferences and application settings including theme, default views, notifications, and display options.",
        tools: &["update_app_settings", "get_app_settings"],
        keywords: &[
            "setting",
            "preference",
            "theme",
            "customize",
            "custom",
            "view",
            "notification",
            "display",
        ],
    },
    Persona {
        key: "language_assistant",
        name: "Language Assistant",
        description: "Provides multilingual support including translation, language switching, and content generation in 65+ languages.",
        tools: &["translate_content", "set_language", "get_supported_languages"],
        keywords: &[
            "translate",
            "language",
            "spanish",
            "french",
            "german",
            "chinese",
            "japanese",
            "korean",
            "arabic",
            "portuguese",
            "russian",
            "italian",
            "dutch",
            "swedish",
            "hindi",
            "translate to",
            "language assistant",
        ],
    },
];

/// Ordered, immutable set of personas plus the fallback key.
#[derive(Debug, Clone, Copy)]
pub struct PersonaRegistry {
    personas: &'static [Persona],
    default_key: &'static str,
}

impl PersonaRegistry {
    /// Build a registry. `default_key` should name one of `personas`.
    pub const fn new(personas: &'static [Persona], default_key: &'static str) -> Self {
        Self {
            personas,
            default_key,
        }
    }

    pub const fn builtin() -> Self {
        Self::new(BUILTIN_PERSONAS, DEFAULT_PERSONA)
    }

    pub fn personas(&self) -> &'static [Persona] {
        self.personas
    }

    pub fn default_key(&self) -> &'static str {
        self.default_key
    }

    pub fn get(&self, key: &str) -> Option<&'static Persona> {
        self.personas.iter().find(|p| p.key == key)
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_keys_are_unique() {
        let keys: HashSet<_> = BUILTIN_PERSONAS.iter().map(|p| p.key).collect();
        assert_eq!(keys.len(), BUILTIN_PERSONAS.len());
    }

    #[test]
    fn default_persona_is_registered() {
        let registry = PersonaRegistry::builtin();
        assert!(registry.get(registry.default_key()).is_some());
    }

    #[test]
    fn spoken_key_replaces_separators() {
        let persona = PersonaRegistry::builtin().get("stock_analyst").unwrap();
        assert_eq!(persona.spoken_key(), "stock analyst");
    }

    #[test]
    fn financial_assistant_declares_seven_tools() {
        let persona = PersonaRegistry::builtin()
            .get("financial_assistant")
            .unwrap();
        assert_eq!(persona.tools.len(), 7);
    }
}
