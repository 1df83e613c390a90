use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub scope: String,
    #[serde(default)]
    pub obtained_at: i64,
}

/// Raw body of the Etsy token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PkceSession {
    pub code_verifier: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtsyUser {
    pub user_id: u64,
    #[serde(default)]
    pub shop_id: Option<u64>,
}

/// Incoming body of `POST /listings`.
///
/// Everything is optional at the type level so validation can report every
/// missing field at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who_made: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_made: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_id: Option<f64>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_profile_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_policy_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_weight_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_dimensions_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_supply: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Products array forwarded verbatim to the inventory endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageOutcome {
    pub source: String,
    pub rank: u32,
    pub listing_image_id: Option<u64>,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn succeeded(response: Value) -> Self {
        Self {
            ok: true,
            response: Some(response),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            response: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingOutcome {
    pub listing: Value,
    pub images: Vec<ImageOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<StepOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<StepOutcome>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopListingsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}
