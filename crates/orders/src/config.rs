//! Service configuration loaded from environment variables.

use common::OrderId;

/// Configuration for the lifecycle service.
///
/// Reads from environment variables:
/// - `CLIENT_URL` — base URL of the client application, used to build deep
///   links into order activity pages (default: `"http://localhost:3000"`)
#[derive(Debug, Clone)]
pub struct OrdersConfig {
    pub client_url: String,
}

impl OrdersConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            client_url: std::env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }

    /// Creates a config with an explicit client URL.
    pub fn new(client_url: impl Into<String>) -> Self {
        Self {
            client_url: client_url.into(),
        }
    }

    /// Deep link to the order's activity page in the client application.
    pub fn order_activity_url(&self, order_id: &OrderId) -> String {
        format!(
            "{}/orders/{}/activities",
            self.client_url.trim_end_matches('/'),
            order_id
        )
    }
}

impl Default for OrdersConfig {
    fn default() -> Self {
        Self {
            client_url: "http://localhost:3000".to_string(),
        }
    }
}
