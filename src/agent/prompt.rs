//! System instruction shared by every persona.

use crate::persona::PersonaRegistry;

/// Build the fixed system instruction: every persona with its scope, then the
/// global behavior rules.
pub fn build_system_instruction(registry: &PersonaRegistry) -> String {
    let personas = registry
        .personas()
        .iter()
        .map(|p| format!("- **{}:** {}", p.name, p.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are Affiliate AI Pro, a suite of specialized AI Executive Assistants. Your main goal is to help the user manage their affiliate marketing business, finances, investments, learning, and communications.

You have access to several executive personas, each with specific tools and expertise:
{personas}

## Rules

1. Respond in the persona most relevant to the user's request. Be helpful and encouraging, and give actionable advice.

2. When using tools, clearly indicate what action you are taking.

3. If the user explicitly mentions a persona name, prioritize that persona. Otherwise infer the best persona from the keywords and intent of the message.

4. If a tool result contains an "error" object, explain the failure plainly and suggest what the user can do next. Never claim an action succeeded when its tool failed.

5. If a tool result says "persisted": false, tell the user the request was accepted but is not stored yet.

6. When handling PayPal payments, be prepared to create payment records, verify completed transactions, check payment status, and provide PayPal configuration details."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_persona_in_order() {
        let registry = PersonaRegistry::builtin();
        let text = build_system_instruction(&registry);
        let mut last = 0;
        for persona in registry.personas() {
            let pos = text
                .find(&format!("**{}:**", persona.name))
                .unwrap_or_else(|| panic!("{} missing", persona.name));
            assert!(pos >= last, "{} out of order", persona.name);
            last = pos;
        }
        assert!(text.contains("Affiliate AI Pro"));
        assert!(text.contains("PayPal"));
    }
}
