use serde::Serialize;
use shopsquad_config::PayPalSettings;
use tracing::info;

// ---- Response / DTO types ------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub approval_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureResponse {
    pub order_id: String,
    pub status: String,
}

// ---- Error type ----------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PayPalError {
    #[error("PayPal is not configured")]
    NotConfigured,
    #[error("PayPal API error: {0}")]
    ApiError(String),
    #[error("Order {0} was not approved")]
    NotApproved(String),
}

// ---- Service -------------------------------------------------------------

/// Thin client over the PayPal Orders v2 REST API. One client-credentials
/// token per call; no token cache, these calls are rare.
pub struct PayPalService {
    settings: PayPalSettings,
    client: reqwest::Client,
}

impl PayPalService {
    pub fn new(settings: &PayPalSettings) -> Self {
        Self {
            settings: settings.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    async fn access_token(&self) -> Result<String, PayPalError> {
        if !self.is_configured() {
            return Err(PayPalError::NotConfigured);
        }

        let resp: serde_json::Value = self
            .client
            .post(format!("{}/v1/oauth2/token", self.settings.api_base))
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| PayPalError::ApiError(e.to_string()))?
            .json()
            .await
            .map_err(|e| PayPalError::ApiError(e.to_string()))?;

        resp["access_token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PayPalError::ApiError("No access token in response".to_string()))
    }

    /// Creates an order for one participant's share. The caller approves it
    /// in the PayPal UI via the returned link, then hits the capture route.
    pub async fn create_order(
        &self,
        amount: f64,
        description: &str,
    ) -> Result<OrderResponse, PayPalError> {
        let token = self.access_token().await?;

        let body = serde_json::json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "description": description,
                "amount": {
                    "currency_code": self.settings.currency,
                    "value": format!("{amount:.2}"),
                }
            }]
        });

        let resp: serde_json::Value = self
            .client
            .post(format!("{}/v2/checkout/orders", self.settings.api_base))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PayPalError::ApiError(e.to_string()))?
            .json()
            .await
            .map_err(|e| PayPalError::ApiError(e.to_string()))?;

        if let Some(err) = resp.get("details").and_then(|d| d.get(0)) {
            return Err(PayPalError::ApiError(
                err["description"]
                    .as_str()
                    .unwrap_or("Unknown PayPal error")
                    .to_string(),
            ));
        }

        let order_id = resp["id"]
            .as_str()
            .ok_or_else(|| PayPalError::ApiError("No order ID in response".to_string()))?
            .to_string();

        let approval_url = resp["links"]
            .as_array()
            .and_then(|links| {
                links
                    .iter()
                    .find(|l| l["rel"].as_str() == Some("approve"))
            })
            .and_then(|l| l["href"].as_str())
            .map(str::to_string);

        info!(%order_id, amount, "Created PayPal order");
        Ok(OrderResponse {
            order_id,
            approval_url,
        })
    }

    /// Captures an approved order. Money moves here; callers must treat a
    /// success as committed even if their own bookkeeping write fails after.
    pub async fn capture_order(&self, order_id: &str) -> Result<CaptureResponse, PayPalError> {
        let token = self.access_token().await?;

        let resp: serde_json::Value = self
            .client
            .post(format!(
                "{}/v2/checkout/orders/{order_id}/capture",
                self.settings.api_base
            ))
            .bearer_auth(&token)
            .header("Content-Type", "application/json")
            .body("{}")
            .send()
            .await
            .map_err(|e| PayPalError::ApiError(e.to_string()))?
            .json()
            .await
            .map_err(|e| PayPalError::ApiError(e.to_string()))?;

        let status = resp["status"].as_str().unwrap_or_default().to_string();
        if status != "COMPLETED" {
            return Err(PayPalError::NotApproved(order_id.to_string()));
        }

        info!(%order_id, "Captured PayPal order");
        Ok(CaptureResponse {
            order_id: order_id.to_string(),
            status,
        })
    }
}
