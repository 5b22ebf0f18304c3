//! Client for the external order-data API.
//!
//! Every failure mode degrades into the `OrderLookup` result contract —
//! nothing here returns an error across the tool boundary.

use std::fmt;
use std::str::FromStr;

use reqwest::Client;
use serde_json::Value;

/// Result contract of the order API: either orders, or a descriptive error
/// message. Order records are opaque payloads; the core only checks
/// presence/absence and the error field.
#[derive(Debug, Clone)]
pub struct OrderLookup {
    pub orders: Vec<Value>,
    pub error: Option<String>,
}

impl OrderLookup {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            orders: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Closed set of order priority levels accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPriority {
    High,
    Medium,
    Low,
    Critical,
}

impl OrderPriority {
    pub const ALL: [OrderPriority; 4] = [
        OrderPriority::High,
        OrderPriority::Medium,
        OrderPriority::Low,
        OrderPriority::Critical,
    ];

    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPriority::High => "high",
            OrderPriority::Medium => "medium",
            OrderPriority::Low => "low",
            OrderPriority::Critical => "critical",
        }
    }
}

impl fmt::Display for OrderPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderPriority {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "high" => Ok(OrderPriority::High),
            "medium" => Ok(OrderPriority::Medium),
            "low" => Ok(OrderPriority::Low),
            "critical" => Ok(OrderPriority::Critical),
            _ => Err(()),
        }
    }
}

#[derive(Clone)]
pub struct OrderApiClient {
    base_url: String,
    client: Client,
}

impl OrderApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub async fn get_order_by_id(&self, customer_id: i64) -> OrderLookup {
        let url = format!("{}/customer/{}", self.base_url, customer_id);
        self.fetch(&url).await
    }

    pub async fn get_orders_by_priority(&self, priority: OrderPriority) -> OrderLookup {
        let url = format!("{}/priority/{}", self.base_url, priority);
        self.fetch(&url).await
    }

    async fn fetch(&self, url: &str) -> OrderLookup {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => return OrderLookup::failed(format!("Request failed: {}", err)),
        };

        let status = response.status();
        if !status.is_success() {
            return OrderLookup::failed(format!(
                "API request failed with status code: {}",
                status.as_u16()
            ));
        }

        match response.json::<Value>().await {
            Ok(body) => parse_body(body),
            Err(err) => OrderLookup::failed(format!("Invalid response body: {}", err)),
        }
    }
}

fn parse_body(body: Value) -> OrderLookup {
    match body {
        Value::Array(orders) => OrderLookup {
            orders,
            error: None,
        },
        Value::Object(ref map) => {
            if let Some(error) = map.get("error") {
                if !error.is_null() {
                    let message = error
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string());
                    return OrderLookup::failed(message);
                }
            }
            if let Some(Value::Array(orders)) = map.get("orders") {
                return OrderLookup {
                    orders: orders.clone(),
                    error: None,
                };
            }
            OrderLookup {
                orders: vec![body],
                error: None,
            }
        }
        other => OrderLookup {
            orders: vec![other],
            error: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn priority_parsing_is_case_insensitive() {
        assert_eq!("HIGH".parse::<OrderPriority>(), Ok(OrderPriority::High));
        assert_eq!("Medium".parse::<OrderPriority>(), Ok(OrderPriority::Medium));
        assert_eq!(" low ".parse::<OrderPriority>(), Ok(OrderPriority::Low));
        assert_eq!(
            "critical".parse::<OrderPriority>(),
            Ok(OrderPriority::Critical)
        );
    }

    #[test]
    fn unknown_priority_is_rejected() {
        assert!("URGENT".parse::<OrderPriority>().is_err());
        assert!("".parse::<OrderPriority>().is_err());
    }

    #[test]
    fn valid_values_enumerates_the_closed_set() {
        assert_eq!(OrderPriority::valid_values(), "high, medium, low, critical");
    }

    #[test]
    fn array_body_becomes_orders() {
        let lookup = parse_body(json!([{"id": 1}, {"id": 2}]));
        assert_eq!(lookup.orders.len(), 2);
        assert!(lookup.error.is_none());
    }

    #[test]
    fn error_object_becomes_error_result() {
        let lookup = parse_body(json!({"orders": [], "error": "not found"}));
        assert!(lookup.orders.is_empty());
        assert_eq!(lookup.error.as_deref(), Some("not found"));
    }

    #[test]
    fn null_error_field_is_not_an_error() {
        let lookup = parse_body(json!({"orders": [{"id": 7}], "error": null}));
        assert_eq!(lookup.orders.len(), 1);
        assert!(lookup.error.is_none());
    }

    #[test]
    fn bare_object_is_wrapped_as_a_single_order() {
        let lookup = parse_body(json!({"id": 9, "status": "shipped"}));
        assert_eq!(lookup.orders.len(), 1);
        assert!(lookup.error.is_none());
    }

    #[tokio::test]
    async fn network_failure_degrades_to_error_result() {
        // Nothing listens on this port; the request must fail fast and still
        // produce the error-result contract.
        let client = OrderApiClient::new("http://127.0.0.1:1".to_string());
        let lookup = client.get_order_by_id(42).await;
        assert!(lookup.orders.is_empty());
        assert!(lookup.error.is_some());
    }
}
