use reqwest::Method;
use serde_json::Value;

use crate::{error::EtsyError, etsy::EtsyClient, types::ShopListingsQuery};

impl EtsyClient {
    /// `GET /users/me`, also used as the token validity probe.
    pub async fn me(&self, token: &str) -> Result<Value, EtsyError> {
        Self::send_json(self.request(Method::GET, "users/me", Some(token))).await
    }

    /// `GET /shops/{shop_id}/listings`
    pub async fn shop_listings(
        &self,
        token: &str,
        shop_id: u64,
        query: &ShopListingsQuery,
    ) -> Result<Value, EtsyError> {
        let path = format!("shops/{shop_id}/listings");
        Self::send_json(self.request(Method::GET, &path, Some(token)).query(query)).await
    }

    /// `GET /shops/{shop_id}/shipping-profiles`
    pub async fn shipping_profiles(&self, token: &str, shop_id: u64) -> Result<Value, EtsyError> {
        let path = format!("shops/{shop_id}/shipping-profiles");
        Self::send_json(self.request(Method::GET, &path, Some(token))).await
    }

    /// `GET /shops/{shop_id}/policies/return`
    pub async fn return_policies(&self, token: &str, shop_id: u64) -> Result<Value, EtsyError> {
        let path = format!("shops/{shop_id}/policies/return");
        Self::send_json(self.request(Method::GET, &path, Some(token))).await
    }

    /// `GET /seller-taxonomy/nodes`, needs the API key only.
    pub async fn seller_taxonomy_nodes(&self) -> Result<Value, EtsyError> {
        Self::send_json(self.request(Method::GET, "seller-taxonomy/nodes", None)).await
    }
}
