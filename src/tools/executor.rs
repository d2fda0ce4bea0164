//! Tool dispatcher: maps a tool name and argument bag to a backend call.

use serde_json::{json, Map, Value};

use super::backend::{item_path, BackendClient};
use super::catalog::ToolCatalog;
use super::schema::ToolDescriptor;
use super::{placeholder, ToolError, ToolResult};

/// Executes tool calls requested by the model.
///
/// `execute` is total: unknown names, bad arguments and backend failures all
/// come back as [`ToolResult::Error`].
#[derive(Clone)]
pub struct ToolExecutor {
    catalog: ToolCatalog,
    backend: BackendClient,
}

impl ToolExecutor {
    pub fn new(catalog: ToolCatalog, backend: BackendClient) -> Self {
        Self { catalog, backend }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub async fn execute(&self, name: &str, args: &Map<String, Value>) -> ToolResult {
        let Some(descriptor) = self.catalog.get(name) else {
            tracing::warn!(tool = %name, "Model requested an unknown tool");
            return ToolResult::Error(ToolError::unknown_tool(name));
        };

        let args = strip_nulls(args);
        if let Err(e) = check_required(descriptor, &args) {
            tracing::warn!(tool = %name, error = %e.message, "Rejected tool call");
            return ToolResult::Error(e);
        }

        let rendered = Value::Object(args.clone());
        tracing::info!(tool = %name, args = %rendered, "Executing tool");
        let result: ToolResult = self.dispatch(name, &args).await.into();

        match &result {
            ToolResult::Success(_) => tracing::info!(tool = %name, "Tool succeeded"),
            ToolResult::Error(e) => tracing::warn!(
                tool = %name,
                kind = ?e.kind,
                status = ?e.status,
                "Tool failed: {}",
                e.message
            ),
        }
        result
    }

    async fn dispatch(&self, name: &str, args: &Map<String, Value>) -> Result<Value, ToolError> {
        if let Some(value) = placeholder::respond(name, args) {
            return Ok(value);
        }

        let backend = &self.backend;
        match name {
            // Campaigns
            "create_campaign" => {
                let mut body = pick(
                    args,
                    &["name", "platform", "affiliate_link", "content", "status"],
                );
                body.entry("status").or_insert_with(|| json!("draft"));
                backend.post("/campaigns", Value::Object(body)).await
            }
            "read_campaign" => {
                let id = id_arg(args, "campaign_id")?;
                backend.get(&item_path("campaigns", &id)).await
            }
            "update_campaign" => {
                let id = id_arg(args, "campaign_id")?;
                let body = without(args, &["campaign_id"]);
                backend.put(&item_path("campaigns", &id), Value::Object(body)).await
            }
            "delete_campaign" => {
                let id = id_arg(args, "campaign_id")?;
                backend.delete(&item_path("campaigns", &id)).await
            }
            "list_campaigns" => backend.get("/campaigns").await,

            // Transactions
            "create_transaction" => {
                backend
                    .post("/transactions", Value::Object(args.clone()))
                    .await
            }

            // PayPal
            "create_PayPalPayment" => {
                let body = pick(args, &["amount", "description", "orderId"]);
                let created = backend.post("/payments", Value::Object(body)).await?;
                let amount = args.get("amount").cloned().unwrap_or(Value::Null);
                Ok(json!({
                    "status": "success",
                    "message": format!("PayPal payment created for ${}", display_amount(&amount)),
                    "payment_id": created.get("id"),
                    "amount": amount,
                    "description": args.get("description"),
                    "next_step": "User should complete payment on PayPal, then verify with payment ID",
                }))
            }
            "get_PayPalPaymentDetails" => {
                let id = id_arg(args, "payment_id")?;
                let payment = backend.get(&item_path("payments", &id)).await?;
                Ok(json!({
                    "status": "success",
                    "payment_id": payment.get("id"),
                    "amount": payment.get("amount"),
                    "description": payment.get("description"),
                    "payment_status": payment.get("status"),
                    "created_at": payment.get("created_at"),
                    "updated_at": payment.get("updated_at"),
                }))
            }
            "list_PayPalPayments" => {
                let payments = match backend.get("/payments").await? {
                    Value::Array(items) => items,
                    single => vec![single],
                };
                Ok(json!({
                    "status": "success",
                    "total_payments": payments.len(),
                    "payments": payments,
                }))
            }
            "verify_PayPalPayment" => {
                let id = id_arg(args, "payment_id")?;
                let transaction_id = id_arg(args, "transactionId")?;
                let path = format!("{}/verify", item_path("payments", &id));
                backend
                    .post(&path, json!({ "transactionId": transaction_id }))
                    .await?;
                Ok(json!({
                    "status": "success",
                    "message": format!("Payment {} verified and marked as completed", id),
                    "payment_id": id,
                    "transaction_id": transaction_id,
                    "payment_status": "completed",
                }))
            }
            "cancel_PayPalPayment" => {
                let id = id_arg(args, "payment_id")?;
                backend.delete(&item_path("payments", &id)).await?;
                Ok(json!({
                    "status": "success",
                    "message": format!("Payment {} has been cancelled", id),
                    "payment_id": id,
                    "payment_status": "cancelled",
                }))
            }
            "get_PayPalConfig" => {
                let config = backend.get("/paypal-config").await?;
                // The backend names the field `paypalEmail`; older builds used `email`.
                let email = config
                    .get("paypalEmail")
                    .and_then(Value::as_str)
                    .or_else(|| config.get("email").and_then(Value::as_str));
                Ok(json!({
                    "status": "success",
                    "paypal_email": email,
                    "message": match email {
                        Some(email) => format!("Payments should be sent to: {}", email),
                        None => "No PayPal email is configured on the backend".to_string(),
                    },
                }))
            }

            // Market data
            "get_stock_quote" => {
                let symbol = id_arg(args, "symbol")?;
                backend
                    .get(&item_path("external-stocks/quote", &symbol))
                    .await
            }
            "get_penny_stocks" => backend.get("/external-stocks/penny-stocks").await,
            "get_stock_intraday" => {
                let symbol = id_arg(args, "symbol")?;
                let interval = args
                    .get("interval")
                    .and_then(Value::as_str)
                    .unwrap_or("5min");
                let path = format!(
                    "{}?interval={}",
                    item_path("external-stocks/intraday", &symbol),
                    urlencoding::encode(interval)
                );
                backend.get(&path).await
            }
            "get_stock_daily" => {
                let symbol = id_arg(args, "symbol")?;
                backend
                    .get(&item_path("external-stocks/daily", &symbol))
                    .await
            }

            // Declared in the catalog but without a handler.
            other => Err(ToolError::unknown_tool(other)),
        }
    }
}

/// Drop top-level `null` values so they never reach the backend.
fn strip_nulls(args: &Map<String, Value>) -> Map<String, Value> {
    args.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn check_required(descriptor: &ToolDescriptor, args: &Map<String, Value>) -> Result<(), ToolError> {
    let missing: Vec<&str> = descriptor
        .required_params()
        .filter(|p| !args.contains_key(p.name))
        .map(|p| p.name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ToolError::invalid_arguments(format!(
            "{} is missing required argument(s): {}",
            descriptor.name,
            missing.join(", ")
        )))
    }
}

/// An identifier argument as text. Numbers are accepted and stringified.
fn id_arg(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    match args.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(ToolError::invalid_arguments(format!(
            "'{}' must be a non-empty string",
            key
        ))),
        None => Err(ToolError::invalid_arguments(format!("'{}' is required", key))),
    }
}

fn pick(args: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|k| args.get(*k).map(|v| (k.to_string(), v.clone())))
        .collect()
}

fn without(args: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    args.iter()
        .filter(|(k, _)| !keys.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn display_amount(amount: &Value) -> String {
    match amount {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
