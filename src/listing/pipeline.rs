use std::{
    io,
    path::{Path, PathBuf},
};

use serde_json::{Value, json};
use tempfile::NamedTempFile;
use tokio::time::sleep;

use crate::{
    error::{ApiError, EtsyError},
    etsy::EtsyClient,
    listing::validate::draft_body,
    types::{ImageOutcome, ListingDraft, ListingOutcome, StepOutcome},
    utils,
};

/// Word in the upstream error Etsy sends while a listing is still being
/// processed by a previous write; such uploads succeed when retried.
pub const LISTING_LOCKED_MARKER: &str = "locked";

/// Runs the listing creation steps for an already validated draft.
///
/// The draft listing must be created for anything else to happen; images,
/// inventory and video are attempted afterwards in that order and their
/// individual failures are recorded in the outcome.
pub struct ListingPipeline<'a> {
    client: &'a EtsyClient,
    token: &'a str,
    shop_id: u64,
}

impl<'a> ListingPipeline<'a> {
    pub fn new(client: &'a EtsyClient, token: &'a str, shop_id: u64) -> Self {
        Self {
            client,
            token,
            shop_id,
        }
    }

    pub async fn run(&self, draft: &ListingDraft) -> Result<ListingOutcome, ApiError> {
        let listing = self
            .client
            .create_draft_listing(self.token, self.shop_id, &draft_body(draft))
            .await
            .map_err(|e| {
                tracing::warn!(status = ?e.status(), "draft listing creation failed: {}", e);
                ApiError::from(e)
            })?;

        let listing_id = listing["listing_id"].as_u64().ok_or_else(|| {
            ApiError::Internal("draft listing response has no listing_id".to_string())
        })?;
        tracing::info!(listing_id, shop_id = self.shop_id, "draft listing created");

        let mut images = Vec::with_capacity(draft.image_paths.len());
        for (i, source) in draft.image_paths.iter().enumerate() {
            let rank = i as u32 + 1;
            images.push(self.upload_image(listing_id, source, rank).await);
        }

        let inventory = match inventory_body(draft) {
            Some(body) => Some(self.update_inventory(listing_id, &body).await),
            None => None,
        };

        let video = self.upload_video(listing_id).await;

        Ok(ListingOutcome {
            listing,
            images,
            inventory,
            video,
        })
    }

    async fn upload_image(&self, listing_id: u64, source: &str, rank: u32) -> ImageOutcome {
        let mut outcome = ImageOutcome {
            source: source.to_string(),
            rank,
            listing_image_id: None,
            attempts: 0,
            error: None,
        };

        // Dropping the staged file removes any temporary download. Failing
        // here sends nothing, so `attempts` stays at zero.
        let staged = match self.stage(source).await {
            Ok(staged) => staged,
            Err(e) => {
                tracing::warn!(source, "cannot read image: {}", e);
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };
        let file_name = utils::file_name_of(source);
        let cfg = self.client.config();

        loop {
            outcome.attempts += 1;
            let result = self
                .client
                .upload_listing_image(
                    self.token,
                    self.shop_id,
                    listing_id,
                    staged.path(),
                    &file_name,
                    rank,
                )
                .await;

            match result {
                Ok(body) => {
                    outcome.listing_image_id = body["listing_image_id"].as_u64();
                    outcome.error = None;
                    tracing::info!(listing_id, rank, "image uploaded");
                    return outcome;
                }
                Err(e) if is_listing_locked(&e) && outcome.attempts < cfg.image_upload_attempts => {
                    tracing::warn!(
                        listing_id,
                        rank,
                        attempt = outcome.attempts,
                        "listing locked, retrying image upload"
                    );
                    outcome.error = Some(e.to_string());
                    sleep(cfg.image_upload_retry_delay).await;
                }
                Err(e) => {
                    tracing::warn!(
                        listing_id,
                        rank,
                        attempts = outcome.attempts,
                        "image upload failed: {}",
                        e
                    );
                    outcome.error = Some(e.to_string());
                    return outcome;
                }
            }
        }
    }

    async fn stage(&self, source: &str) -> Result<StagedFile, EtsyError> {
        if !utils::is_remote_url(source) {
            let path = PathBuf::from(source);
            if !async_fs::metadata(&path).await?.is_file() {
                return Err(io::Error::other(format!("{source} is not a file")).into());
            }
            return Ok(StagedFile::Local(path));
        }

        let bytes = self.client.download(source).await?;
        let suffix = utils::extension_of(source).unwrap_or_default();
        let dir = &self.client.config().image_download_dir;
        async_fs::create_dir_all(dir).await?;
        let file = tempfile::Builder::new()
            .prefix(STAGED_IMAGE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(dir)?;
        async_fs::write(file.path(), bytes).await?;
        Ok(StagedFile::Downloaded(file))
    }

    async fn update_inventory(&self, listing_id: u64, body: &Value) -> StepOutcome {
        match self
            .client
            .update_listing_inventory(self.token, listing_id, body)
            .await
        {
            Ok(response) => StepOutcome::succeeded(response),
            Err(e) => {
                tracing::warn!(listing_id, "inventory update failed: {}", e);
                StepOutcome::failed(e.to_string())
            }
        }
    }

    async fn upload_video(&self, listing_id: u64) -> Option<StepOutcome> {
        let path = &self.client.config().video_path;
        match async_fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            _ => {
                tracing::debug!(path = %path.display(), "no listing video, skipping");
                return None;
            }
        }

        let outcome = match self
            .client
            .upload_listing_video(self.token, self.shop_id, listing_id, path)
            .await
        {
            Ok(response) => StepOutcome::succeeded(response),
            Err(e) => {
                tracing::warn!(listing_id, "video upload failed: {}", e);
                StepOutcome::failed(e.to_string())
            }
        };
        Some(outcome)
    }
}

pub const STAGED_IMAGE_PREFIX: &str = "etsy-image-";

enum StagedFile {
    Local(PathBuf),
    Downloaded(NamedTempFile),
}

impl StagedFile {
    fn path(&self) -> &Path {
        match self {
            StagedFile::Local(path) => path,
            StagedFile::Downloaded(file) => file.path(),
        }
    }
}

pub fn is_listing_locked(err: &EtsyError) -> bool {
    err.body().is_some_and(|body| {
        body.split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| word.eq_ignore_ascii_case(LISTING_LOCKED_MARKER))
    })
}

/// Inventory payload for the draft, if it asked for one.
///
/// An explicit `inventory` wins; a bare `sku` becomes a single product offered
/// at the draft's price and quantity.
pub fn inventory_body(draft: &ListingDraft) -> Option<Value> {
    if let Some(inventory) = &draft.inventory {
        return Some(if inventory.is_array() {
            json!({ "products": inventory })
        } else {
            inventory.clone()
        });
    }

    let sku = draft.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    Some(json!({
        "products": [{
            "sku": sku,
            "property_values": [],
            "offerings": [{
                "price": draft.price,
                "quantity": draft.quantity.map(|q| q as u64),
                "is_enabled": true
            }]
        }]
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn locked_marker_is_matched_case_insensitively() {
        let err = EtsyError::Http {
            status: StatusCode::CONFLICT,
            body: r#"{"error":"Listing is LOCKED for editing"}"#.to_string(),
        };
        assert!(is_listing_locked(&err));
        assert!(!is_listing_locked(&EtsyError::Decode("locked".into())));
    }

    #[test]
    fn locked_marker_must_be_a_whole_word() {
        let unlocked = EtsyError::Http {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"error":"listing is unlocked but the image is invalid"}"#.to_string(),
        };
        assert!(!is_listing_locked(&unlocked));

        let plain = EtsyError::Http {
            status: StatusCode::CONFLICT,
            body: "listing_locked: locked".to_string(),
        };
        assert!(is_listing_locked(&plain));
    }

    #[test]
    fn sku_builds_single_product_inventory() {
        let draft = ListingDraft {
            price: Some(12.0),
            quantity: Some(4.0),
            sku: Some("MUG-1".into()),
            ..Default::default()
        };
        let body = inventory_body(&draft).unwrap();
        assert_eq!(body["products"][0]["sku"], json!("MUG-1"));
        assert_eq!(body["products"][0]["offerings"][0]["quantity"], json!(4));
    }

    #[test]
    fn explicit_inventory_array_is_wrapped() {
        let draft = ListingDraft {
            sku: Some("ignored".into()),
            inventory: Some(json!([{ "sku": "A" }])),
            ..Default::default()
        };
        assert_eq!(
            inventory_body(&draft),
            Some(json!({ "products": [{ "sku": "A" }] }))
        );
        assert_eq!(inventory_body(&ListingDraft::default()), None);
    }
}
