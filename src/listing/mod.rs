//! Listing creation: request validation and the draft, images, inventory,
//! video pipeline run against Etsy.

mod pipeline;
mod validate;

pub use pipeline::{
    LISTING_LOCKED_MARKER, ListingPipeline, STAGED_IMAGE_PREFIX, inventory_body,
    is_listing_locked,
};
pub use validate::{
    DIMENSION_UNITS, LISTING_TYPES, WEIGHT_UNITS, WHEN_MADE, WHO_MADE, draft_body, validate,
};
