use serde_json::{Map, Value, json};

use crate::types::ListingDraft;

pub const WHO_MADE: &[&str] = &["i_did", "someone_else", "collective"];

pub const WHEN_MADE: &[&str] = &[
    "made_to_order",
    "2020_2025",
    "2010_2019",
    "2006_2009",
    "before_2006",
    "2000_2005",
    "1990s",
    "1980s",
    "1970s",
    "1960s",
    "1950s",
    "1940s",
    "1930s",
    "1920s",
    "1910s",
    "1900s",
    "1800s",
    "1700s",
    "before_1700",
];

pub const LISTING_TYPES: &[&str] = &["physical", "download", "both"];

pub const WEIGHT_UNITS: &[&str] = &["oz", "lb", "g", "kg"];

pub const DIMENSION_UNITS: &[&str] = &["in", "ft", "mm", "cm", "m", "yd", "inches"];

/// Checks a draft and returns every violation found.
pub fn validate(draft: &ListingDraft) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if is_blank(&draft.title) {
        errors.push("title is required".to_string());
    }
    if is_blank(&draft.description) {
        errors.push("description is required".to_string());
    }

    match draft.price {
        None => errors.push("price is required".to_string()),
        Some(p) if !(p.is_finite() && p > 0.0) => {
            errors.push("price must be a positive number".to_string())
        }
        _ => {}
    }

    match draft.quantity {
        None => errors.push("quantity is required".to_string()),
        Some(q) if !is_positive_integer(q) => {
            errors.push("quantity must be a positive integer".to_string())
        }
        _ => {}
    }

    check_enum(&mut errors, "who_made", draft.who_made.as_deref(), WHO_MADE, true);
    check_enum(&mut errors, "when_made", draft.when_made.as_deref(), WHEN_MADE, true);

    match draft.taxonomy_id {
        None => errors.push("taxonomy_id is required".to_string()),
        Some(t) if !is_positive_integer(t) => {
            errors.push("taxonomy_id must be a positive integer".to_string())
        }
        _ => {}
    }

    check_enum(
        &mut errors,
        "type",
        draft.listing_type.as_deref(),
        LISTING_TYPES,
        false,
    );

    if draft.listing_type.as_deref() == Some("physical") {
        if draft.shipping_profile_id.is_none() {
            errors.push("shipping_profile_id is required for physical listings".to_string());
        }
        for (name, value) in [
            ("item_weight", draft.item_weight),
            ("item_length", draft.item_length),
            ("item_width", draft.item_width),
            ("item_height", draft.item_height),
        ] {
            match value {
                Some(v) if v.is_finite() && v > 0.0 => {}
                _ => errors.push(format!(
                    "{name} must be a positive number for physical listings"
                )),
            }
        }
        check_enum(
            &mut errors,
            "item_weight_unit",
            draft.item_weight_unit.as_deref(),
            WEIGHT_UNITS,
            true,
        );
        check_enum(
            &mut errors,
            "item_dimensions_unit",
            draft.item_dimensions_unit.as_deref(),
            DIMENSION_UNITS,
            true,
        );
    }

    for (i, path) in draft.image_paths.iter().enumerate() {
        if path.trim().is_empty() {
            errors.push(format!("image_paths[{i}] must not be empty"));
        }
    }

    if let Some(inventory) = &draft.inventory {
        if !(inventory.is_array() || inventory.get("products").is_some_and(Value::is_array)) {
            errors.push(
                "inventory must be a products array or an object with products".to_string(),
            );
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn is_positive_integer(value: f64) -> bool {
    value.is_finite() && value >= 1.0 && value.fract() == 0.0
}

fn check_enum(
    errors: &mut Vec<String>,
    name: &str,
    value: Option<&str>,
    allowed: &[&str],
    required: bool,
) {
    match value {
        None if required => errors.push(format!("{name} is required")),
        None => {}
        Some(v) if !allowed.contains(&v) => errors.push(format!(
            "{name} must be one of: {}",
            allowed.join(", ")
        )),
        _ => {}
    }
}

/// Body of the `createDraftListing` call built from a validated draft.
///
/// Fields that only drive later pipeline steps (`sku`, `inventory`,
/// `image_paths`) are left out.
pub fn draft_body(draft: &ListingDraft) -> Value {
    let mut body = Map::new();
    let mut put = |key: &str, value: Value| {
        if !value.is_null() {
            body.insert(key.to_string(), value);
        }
    };

    put("title", json!(draft.title.as_deref().map(str::trim)));
    put("description", json!(draft.description));
    put("price", json!(draft.price));
    put("quantity", json!(draft.quantity.map(|q| q as u64)));
    put("who_made", json!(draft.who_made));
    put("when_made", json!(draft.when_made));
    put("taxonomy_id", json!(draft.taxonomy_id.map(|t| t as u64)));
    put("type", json!(draft.listing_type));
    put("shipping_profile_id", json!(draft.shipping_profile_id));
    put("return_policy_id", json!(draft.return_policy_id));
    put("item_weight", json!(draft.item_weight));
    put("item_length", json!(draft.item_length));
    put("item_width", json!(draft.item_width));
    put("item_height", json!(draft.item_height));
    put("item_weight_unit", json!(draft.item_weight_unit));
    put("item_dimensions_unit", json!(draft.item_dimensions_unit));
    put("is_supply", json!(draft.is_supply));
    if !draft.tags.is_empty() {
        put("tags", json!(draft.tags));
    }
    if !draft.materials.is_empty() {
        put("materials", json!(draft.materials));
    }

    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> ListingDraft {
        ListingDraft {
            title: Some("Hand-thrown mug".into()),
            description: Some("Stoneware, 350ml".into()),
            price: Some(24.5),
            quantity: Some(3.0),
            who_made: Some("i_did".into()),
            when_made: Some("made_to_order".into()),
            taxonomy_id: Some(1633.0),
            ..Default::default()
        }
    }

    fn physical_draft() -> ListingDraft {
        ListingDraft {
            listing_type: Some("physical".into()),
            shipping_profile_id: Some(42),
            item_weight: Some(0.4),
            item_length: Some(10.0),
            item_width: Some(8.0),
            item_height: Some(12.0),
            item_weight_unit: Some("kg".into()),
            item_dimensions_unit: Some("cm".into()),
            ..valid_draft()
        }
    }

    #[test]
    fn valid_drafts_pass() {
        assert_eq!(validate(&valid_draft()), Ok(()));
        assert_eq!(validate(&physical_draft()), Ok(()));
    }

    #[test]
    fn missing_title_and_description_are_both_listed() {
        let draft = ListingDraft {
            title: None,
            description: Some("   ".into()),
            ..valid_draft()
        };
        let errors = validate(&draft).unwrap_err();
        assert!(errors.contains(&"title is required".to_string()));
        assert!(errors.contains(&"description is required".to_string()));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn when_made_outside_enumeration_is_rejected() {
        let draft = ListingDraft {
            when_made: Some("last_tuesday".into()),
            ..valid_draft()
        };
        let errors = validate(&draft).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("when_made must be one of"));
    }

    #[test]
    fn fractional_quantity_and_non_positive_price_are_rejected() {
        let draft = ListingDraft {
            price: Some(0.0),
            quantity: Some(1.5),
            ..valid_draft()
        };
        let errors = validate(&draft).unwrap_err();
        assert!(errors.contains(&"price must be a positive number".to_string()));
        assert!(errors.contains(&"quantity must be a positive integer".to_string()));
    }

    #[test]
    fn item_weight_only_checked_for_physical_listings() {
        let download = ListingDraft {
            listing_type: Some("download".into()),
            item_weight: Some(0.0),
            ..valid_draft()
        };
        assert_eq!(validate(&download), Ok(()));

        let physical = ListingDraft {
            item_weight: Some(-1.0),
            ..physical_draft()
        };
        let errors = validate(&physical).unwrap_err();
        assert_eq!(
            errors,
            vec!["item_weight must be a positive number for physical listings".to_string()]
        );
    }

    #[test]
    fn draft_body_leaves_out_pipeline_fields() {
        let draft = ListingDraft {
            sku: Some("MUG-1".into()),
            image_paths: vec!["a.jpg".into()],
            ..valid_draft()
        };
        let body = draft_body(&draft);
        assert_eq!(body["quantity"], json!(3));
        assert_eq!(body["taxonomy_id"], json!(1633));
        assert!(body.get("sku").is_none());
        assert!(body.get("image_paths").is_none());
        assert!(body.get("type").is_none());
    }
}
