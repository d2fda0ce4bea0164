//! Static tool declarations and per-persona resolution.

use thiserror::Error;

use super::schema::{ParamSpec, ParamType, ToolDescriptor};
use crate::persona::PersonaRegistry;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Unknown persona: {0}")]
    UnknownPersona(String),
}

const TRANSACTION_TYPES: &[&str] = &[
    "deposit",
    "withdrawal",
    "dividend",
    "affiliate_payout",
    "stock_purchase",
    "stock_sale",
];
const PAYMENT_METHODS: &[&str] = &[
    "paypal",
    "apple_pay",
    "cash_app",
    "chime",
    "bank_transfer",
    "crypto",
];
const TRANSACTION_STATUSES: &[&str] = &["pending", "completed", "failed"];
const INTRADAY_INTERVALS: &[&str] = &["1min", "5min", "15min", "30min", "60min"];
const THEMES: &[&str] = &["light", "dark", "auto"];
const DEFAULT_VIEWS: &[&str] = &["dashboard", "campaigns", "transactions", "stocks", "learning"];

pub const BUILTIN_TOOLS: &[ToolDescriptor] = &[
    // Campaigns
    ToolDescriptor {
        name: "create_campaign",
        description: "Creates a new campaign with the specified details. Used when user wants to create a marketing campaign.",
        params: &[
            ParamSpec::required("name", ParamType::String, "The name of the campaign (required)"),
            ParamSpec::required("platform", ParamType::String, "The platform for the campaign, e.g., 'Instagram', 'Facebook', 'TikTok', 'Twitter' (required)"),
            ParamSpec::optional("affiliate_link", ParamType::String, "The affiliate link for the campaign (optional)"),
            ParamSpec::optional("content", ParamType::String, "The content or description of the campaign (optional)"),
            ParamSpec::optional("status", ParamType::String, "The status of the campaign (default: draft)"),
        ],
    },
    ToolDescriptor {
        name: "read_campaign",
        description: "Retrieves the details of a specific campaign by ID.",
        params: &[ParamSpec::required("campaign_id", ParamType::String, "The unique ID of the campaign to retrieve (required)")],
    },
    ToolDescriptor {
        name: "update_campaign",
        description: "Updates an existing campaign with new details.",
        params: &[
            ParamSpec::required("campaign_id", ParamType::String, "The unique ID of the campaign to update (required)"),
            ParamSpec::optional("name", ParamType::String, "New name for the campaign (optional)"),
            ParamSpec::optional("platform", ParamType::String, "New platform for the campaign (optional)"),
            ParamSpec::optional("content", ParamType::String, "New content for the campaign (optional)"),
            ParamSpec::optional("status", ParamType::String, "New status for the campaign (optional)"),
        ],
    },
    ToolDescriptor {
        name: "delete_campaign",
        description: "Deletes a campaign by ID.",
        params: &[ParamSpec::required("campaign_id", ParamType::String, "The unique ID of the campaign to delete (required)")],
    },
    ToolDescriptor {
        name: "list_campaigns",
        description: "Lists all campaigns with their status and platform.",
        params: &[],
    },
    // Transactions
    ToolDescriptor {
        name: "create_transaction",
        description: "Log a new financial transaction (deposit, withdrawal, dividend, affiliate_payout, etc.)",
        params: &[
            ParamSpec::required("amount", ParamType::Number, "The dollar amount (required)"),
            ParamSpec::required("type", ParamType::String, "Transaction type: deposit, withdrawal, dividend, affiliate_payout, stock_purchase, or stock_sale (required)")
                .one_of(TRANSACTION_TYPES),
            ParamSpec::optional("description", ParamType::String, "Notes about the transaction (optional)"),
            ParamSpec::optional("payment_method", ParamType::String, "Payment method: paypal, apple_pay, cash_app, chime, bank_transfer, or crypto (optional)")
                .one_of(PAYMENT_METHODS),
            ParamSpec::optional("status", ParamType::String, "Transaction status: pending, completed, or failed (default: pending)")
                .one_of(TRANSACTION_STATUSES),
        ],
    },
    // PayPal
    ToolDescriptor {
        name: "create_PayPalPayment",
        description: "Initiate a new PayPal payment. Creates a payment request in the backend that can be sent to PayPal for processing.",
        params: &[
            ParamSpec::required("amount", ParamType::Number, "The payment amount in dollars (required)"),
            ParamSpec::required("description", ParamType::String, "A short description of what the payment is for (required)"),
            ParamSpec::optional("orderId", ParamType::String, "Optional order reference ID to link payment to an order"),
        ],
    },
    ToolDescriptor {
        name: "get_PayPalPaymentDetails",
        description: "Retrieve the details and status of a specific PayPal payment by its ID.",
        params: &[ParamSpec::required("payment_id", ParamType::String, "The unique ID of the PayPal payment to retrieve (required)")],
    },
    ToolDescriptor {
        name: "list_PayPalPayments",
        description: "Get a list of all PayPal payments made by the current user.",
        params: &[],
    },
    ToolDescriptor {
        name: "verify_PayPalPayment",
        description: "Verify a PayPal payment after the user has completed the transaction on PayPal. Updates the payment status to completed.",
        params: &[
            ParamSpec::required("payment_id", ParamType::String, "The unique ID of the payment to verify (required)"),
            ParamSpec::required("transactionId", ParamType::String, "The PayPal transaction ID from the payment confirmation (required)"),
        ],
    },
    ToolDescriptor {
        name: "cancel_PayPalPayment",
        description: "Cancel a pending or failed PayPal payment. Mark the payment as cancelled.",
        params: &[ParamSpec::required("payment_id", ParamType::String, "The unique ID of the payment to cancel (required)")],
    },
    ToolDescriptor {
        name: "get_PayPalConfig",
        description: "Retrieve PayPal configuration including the PayPal email address for payments.",
        params: &[],
    },
    // Stock holdings (not yet persisted)
    ToolDescriptor {
        name: "create_stock",
        description: "Log a new stock purchase with details like ticker symbol, shares, and purchase price.",
        params: &[
            ParamSpec::required("ticker", ParamType::String, "Stock ticker symbol (e.g., AAPL, MSFT) (required)"),
            ParamSpec::required("shares", ParamType::Number, "Number of shares purchased (required)"),
            ParamSpec::required("purchase_price", ParamType::Number, "Price per share at purchase (required)"),
            ParamSpec::optional("purchase_date", ParamType::String, "Date of purchase (optional)"),
            ParamSpec::optional("broker", ParamType::String, "Broker name (e.g., Fidelity, Robinhood) (optional)"),
        ],
    },
    ToolDescriptor {
        name: "read_stock",
        description: "Retrieve details about a specific stock holding.",
        params: &[ParamSpec::required("stock_id", ParamType::String, "The unique ID of the stock record (required)")],
    },
    ToolDescriptor {
        name: "update_stock",
        description: "Update stock holding details like current shares or broker information.",
        params: &[
            ParamSpec::required("stock_id", ParamType::String, "The unique ID of the stock record (required)"),
            ParamSpec::optional("shares", ParamType::Number, "Updated number of shares (optional)"),
            ParamSpec::optional("current_price", ParamType::Number, "Current market price (optional)"),
            ParamSpec::optional("notes", ParamType::String, "Additional notes (optional)"),
        ],
    },
    ToolDescriptor {
        name: "delete_stock",
        description: "Remove a stock holding record.",
        params: &[ParamSpec::required("stock_id", ParamType::String, "The unique ID of the stock record to delete (required)")],
    },
    // Market data
    ToolDescriptor {
        name: "get_stock_quote",
        description: "Fetch a live stock quote for a given symbol. Returns current price, daily change, and key metrics.",
        params: &[ParamSpec::required("symbol", ParamType::String, "The stock ticker symbol (e.g., 'AAPL', 'MSFT', 'TSLA') (required)")],
    },
    ToolDescriptor {
        name: "get_penny_stocks",
        description: "Retrieve a list of penny stocks (stocks under $5) with current prices and daily percentage changes.",
        params: &[],
    },
    ToolDescriptor {
        name: "get_stock_intraday",
        description: "Get intraday stock trading data (price movements throughout the day) for a given symbol.",
        params: &[
            ParamSpec::required("symbol", ParamType::String, "The stock ticker symbol (required)"),
            ParamSpec::optional("interval", ParamType::String, "Time interval for data points (default: 5min)")
                .one_of(INTRADAY_INTERVALS),
        ],
    },
    ToolDescriptor {
        name: "get_stock_daily",
        description: "Get daily stock data for the past year. Useful for longer-term analysis and trend spotting.",
        params: &[ParamSpec::required("symbol", ParamType::String, "The stock ticker symbol (required)")],
    },
    // Learning modules (not yet persisted)
    ToolDescriptor {
        name: "create_learning_module",
        description: "Create a new learning module to track progress on courses, certifications, or skill development.",
        params: &[
            ParamSpec::required("title", ParamType::String, "Title of the learning module (required)"),
            ParamSpec::optional("platform", ParamType::String, "Platform (e.g., Coursera, Udemy, LinkedIn Learning) (optional)"),
            ParamSpec::optional("description", ParamType::String, "Description of what you're learning (optional)"),
            ParamSpec::optional("progress", ParamType::Number, "Progress percentage (0-100) (optional)"),
            ParamSpec::optional("target_completion", ParamType::String, "Target completion date (optional)"),
        ],
    },
    ToolDescriptor {
        name: "read_learning_module",
        description: "Retrieve details about a specific learning module.",
        params: &[ParamSpec::required("module_id", ParamType::String, "The unique ID of the learning module (required)")],
    },
    ToolDescriptor {
        name: "update_learning_module",
        description: "Update learning module progress and details.",
        params: &[
            ParamSpec::required("module_id", ParamType::String, "The unique ID of the learning module (required)"),
            ParamSpec::optional("progress", ParamType::Number, "Updated progress percentage (0-100) (optional)"),
            ParamSpec::optional("notes", ParamType::String, "Learning notes or achievements (optional)"),
            ParamSpec::optional("status", ParamType::String, "Status (in_progress, completed, paused) (optional)"),
        ],
    },
    ToolDescriptor {
        name: "delete_learning_module",
        description: "Remove a learning module record.",
        params: &[ParamSpec::required("module_id", ParamType::String, "The unique ID of the learning module to delete (required)")],
    },
    // App settings (not yet persisted)
    ToolDescriptor {
        name: "update_app_settings",
        description: "Update user application preferences and settings.",
        params: &[
            ParamSpec::optional("theme", ParamType::String, "App theme: light, dark, or auto (optional)").one_of(THEMES),
            ParamSpec::optional("default_view", ParamType::String, "Default view when opening app (optional)").one_of(DEFAULT_VIEWS),
            ParamSpec::optional("notifications_enabled", ParamType::Boolean, "Enable/disable notifications (optional)"),
            ParamSpec::optional("currency", ParamType::String, "Preferred currency (e.g., USD, EUR) (optional)"),
            ParamSpec::optional("language", ParamType::String, "Preferred language code (e.g., 'en', 'es', 'fr', 'de', 'zh') (optional)"),
        ],
    },
    ToolDescriptor {
        name: "get_app_settings",
        description: "Retrieve current application settings and preferences.",
        params: &[],
    },
    // Language
    ToolDescriptor {
        name: "translate_content",
        description: "Translate text content to a specified language.",
        params: &[
            ParamSpec::required("content", ParamType::String, "The text content to translate (required)"),
            ParamSpec::required("target_language", ParamType::String, "Target language (e.g., 'Spanish', 'French', 'German', 'Mandarin Chinese') (required)"),
            ParamSpec::optional("source_language", ParamType::String, "Source language (optional, default: English)"),
        ],
    },
    ToolDescriptor {
        name: "set_language",
        description: "Set the preferred language for the application and AI responses.",
        params: &[
            ParamSpec::required("language_code", ParamType::String, "ISO 639-1 language code (e.g., 'en', 'es', 'fr', 'de', 'zh', 'ja', 'ko', 'ar') (required)"),
            ParamSpec::required("language_name", ParamType::String, "Full language name (e.g., 'English', 'Spanish', 'French') (required)"),
        ],
    },
    ToolDescriptor {
        name: "get_supported_languages",
        description: "Get a list of all supported languages (65+ languages).",
        params: &[],
    },
];

/// Read-only mapping from tool names to descriptors, filtered per persona.
#[derive(Debug, Clone, Copy)]
pub struct ToolCatalog {
    registry: PersonaRegistry,
    tools: &'static [ToolDescriptor],
}

impl ToolCatalog {
    pub const fn new(registry: PersonaRegistry, tools: &'static [ToolDescriptor]) -> Self {
        Self { registry, tools }
    }

    pub const fn builtin() -> Self {
        Self::new(PersonaRegistry::builtin(), BUILTIN_TOOLS)
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    pub fn get(&self, name: &str) -> Option<&'static ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Descriptors a persona may use, in its declared order.
    ///
    /// Declared names with no catalog entry are skipped.
    pub fn tools_for_persona(
        &self,
        persona_key: &str,
    ) -> Result<Vec<&'static ToolDescriptor>, CatalogError> {
        let persona = self
            .registry
            .get(persona_key)
            .ok_or_else(|| CatalogError::UnknownPersona(persona_key.to_string()))?;

        let mut resolved = Vec::with_capacity(persona.tools.len());
        for name in persona.tools {
            match self.get(name) {
                Some(tool) => resolved.push(tool),
                None => tracing::warn!(
                    persona = persona.key,
                    tool = %name,
                    "Persona declares a tool missing from the catalog, skipping"
                ),
            }
        }
        Ok(resolved)
    }

    /// `(persona, tool)` pairs declared by a persona but absent from the catalog.
    pub fn missing_tools(&self) -> Vec<(&'static str, &'static str)> {
        self.registry
            .personas()
            .iter()
            .flat_map(|p| p.tools.iter().map(move |t| (p.key, *t)))
            .filter(|(_, tool)| self.get(tool).is_none())
            .collect()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Persona;
    use std::collections::HashSet;

    #[test]
    fn tool_names_are_unique() {
        let names: HashSet<_> = BUILTIN_TOOLS.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), BUILTIN_TOOLS.len());
    }

    #[test]
    fn builtin_personas_reference_only_known_tools() {
        assert!(ToolCatalog::builtin().missing_tools().is_empty());
    }

    #[test]
    fn financial_assistant_gets_exactly_its_seven_tools() {
        let catalog = ToolCatalog::builtin();
        let tools = catalog.tools_for_persona("financial_assistant").unwrap();
        let names: Vec<_> = tools.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "create_transaction",
                "create_PayPalPayment",
                "get_PayPalPaymentDetails",
                "list_PayPalPayments",
                "verify_PayPalPayment",
                "cancel_PayPalPayment",
                "get_PayPalConfig",
            ]
        );
    }

    #[test]
    fn every_persona_resolves_to_its_declared_list() {
        let catalog = ToolCatalog::builtin();
        for persona in catalog.registry().personas() {
            let names: Vec<_> = catalog
                .tools_for_persona(persona.key)
                .unwrap()
                .iter()
                .map(|t| t.name)
                .collect();
            assert_eq!(names, persona.tools, "persona {}", persona.key);
        }
    }

    #[test]
    fn unknown_persona_is_an_error() {
        let err = ToolCatalog::builtin()
            .tools_for_persona("astrologer")
            .unwrap_err();
        assert_eq!(err, CatalogError::UnknownPersona("astrologer".to_string()));
    }

    const PARTIAL: &[Persona] = &[Persona {
        key: "partial",
        name: "Partial",
        description: "",
        tools: &["read_campaign", "does_not_exist", "delete_campaign"],
        keywords: &[],
    }];

    #[test]
    fn undeclared_catalog_entries_are_skipped_in_order() {
        let catalog = ToolCatalog::new(PersonaRegistry::new(PARTIAL, "partial"), BUILTIN_TOOLS);
        let names: Vec<_> = catalog
            .tools_for_persona("partial")
            .unwrap()
            .iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["read_campaign", "delete_campaign"]);
        assert_eq!(catalog.missing_tools(), vec![("partial", "does_not_exist")]);
    }
}
