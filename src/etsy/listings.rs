use std::path::Path;

use reqwest::{
    Method,
    multipart::{Form, Part},
};
use serde_json::Value;

use crate::{error::EtsyError, etsy::EtsyClient, utils};

impl EtsyClient {
    /// `POST /shops/{shop_id}/listings`
    pub async fn create_draft_listing(
        &self,
        token: &str,
        shop_id: u64,
        body: &Value,
    ) -> Result<Value, EtsyError> {
        let path = format!("shops/{shop_id}/listings");
        Self::send_json(self.request(Method::POST, &path, Some(token)).json(body)).await
    }

    /// `POST /shops/{shop_id}/listings/{listing_id}/images`
    ///
    /// `file_name` names the multipart part, `path` is read from disk.
    pub async fn upload_listing_image(
        &self,
        token: &str,
        shop_id: u64,
        listing_id: u64,
        path: &Path,
        file_name: &str,
        rank: u32,
    ) -> Result<Value, EtsyError> {
        let bytes = async_fs::read(path).await?;
        let part = file_part(bytes, file_name)?;
        let form = Form::new().part("image", part).text("rank", rank.to_string());

        let path = format!("shops/{shop_id}/listings/{listing_id}/images");
        Self::send_json(self.request(Method::POST, &path, Some(token)).multipart(form)).await
    }

    /// `PUT /listings/{listing_id}/inventory`
    pub async fn update_listing_inventory(
        &self,
        token: &str,
        listing_id: u64,
        body: &Value,
    ) -> Result<Value, EtsyError> {
        let path = format!("listings/{listing_id}/inventory");
        Self::send_json(self.request(Method::PUT, &path, Some(token)).json(body)).await
    }

    /// `POST /shops/{shop_id}/listings/{listing_id}/videos`
    pub async fn upload_listing_video(
        &self,
        token: &str,
        shop_id: u64,
        listing_id: u64,
        path: &Path,
    ) -> Result<Value, EtsyError> {
        let file_name = utils::file_name_of(&path.to_string_lossy());
        let bytes = async_fs::read(path).await?;
        let part = file_part(bytes, &file_name)?;
        let form = Form::new()
            .part("video", part)
            .text("name", file_name.clone());

        let path = format!("shops/{shop_id}/listings/{listing_id}/videos");
        Self::send_json(self.request(Method::POST, &path, Some(token)).multipart(form)).await
    }
}

fn file_part(bytes: Vec<u8>, file_name: &str) -> Result<Part, EtsyError> {
    Part::bytes(bytes)
        .file_name(file_name.to_string())
        .mime_str(mime_for(file_name))
        .map_err(EtsyError::Transport)
}

fn mime_for(file_name: &str) -> &'static str {
    match utils::extension_of(file_name).as_deref() {
        Some(".jpg") | Some(".jpeg") => "image/jpeg",
        Some(".png") => "image/png",
        Some(".gif") => "image/gif",
        Some(".webp") => "image/webp",
        Some(".mp4") => "video/mp4",
        Some(".mov") => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for("photo.JPG"), "image/jpeg");
        assert_eq!(mime_for("clip.mp4"), "video/mp4");
        assert_eq!(mime_for("blob"), "application/octet-stream");
    }
}
