//! Product input validation.
//!
//! Admin create and update both submit a full [`ProductDraft`]. Validation
//! stops at the first broken rule and reports that field's message, which the
//! API returns verbatim.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::types::{Cents, SpecEntry, Specifications};

/// Longest accepted product name or brand.
pub const MAX_NAME_LENGTH: usize = 200;

/// A validation failure on one field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FieldError {
    /// Wire name of the offending field.
    pub field: &'static str,
    /// Human readable message.
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Product fields as submitted by the admin editor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub price_cents: i64,
    pub stock: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub specifications: Vec<SpecEntry>,
    #[serde(default)]
    pub image_url: String,
}

/// A draft that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidProduct {
    pub name: String,
    pub brand: String,
    pub price: Cents,
    pub stock: i32,
    pub description: String,
    pub specifications: Specifications,
    pub image_url: String,
}

impl ProductDraft {
    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldError`] in field order: name, brand, price,
    /// stock, description, specifications, image URL.
    pub fn validate(self) -> Result<ValidProduct, FieldError> {
        let name = required_text("name", &self.name, "product name cannot be empty")?;
        let brand = required_text("brand", &self.brand, "brand cannot be empty")?;

        let price = Cents::new(self.price_cents)
            .ok_or_else(|| FieldError::new("priceCents", "price cannot be negative"))?;

        let stock = i32::try_from(self.stock)
            .ok()
            .filter(|stock| *stock >= 0)
            .ok_or_else(|| FieldError::new("stock", "stock must be a non-negative whole number"))?;

        let description = self.description.trim();
        if description.is_empty() {
            return Err(FieldError::new("description", "description cannot be empty"));
        }

        if self
            .specifications
            .iter()
            .any(|entry| entry.key.trim().is_empty() && !entry.value.trim().is_empty())
        {
            return Err(FieldError::new(
                "specifications",
                "specification name cannot be empty",
            ));
        }

        let image_url = validate_image_url(&self.image_url)?;

        Ok(ValidProduct {
            name,
            brand,
            price,
            stock,
            description: description.to_owned(),
            specifications: Specifications::from_entries(self.specifications),
            image_url,
        })
    }
}

fn required_text(field: &'static str, value: &str, empty_message: &str) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(field, empty_message));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(FieldError::new(
            field,
            format!("{field} must be at most {MAX_NAME_LENGTH} characters"),
        ));
    }
    Ok(trimmed.to_owned())
}

fn validate_image_url(raw: &str) -> Result<String, FieldError> {
    let invalid = || FieldError::new("imageUrl", "image URL is not valid");
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Canon PIXMA G1020".to_owned(),
            brand: "Canon".to_owned(),
            price_cents: 2_250_000,
            stock: 15,
            description: "Printer ink tank".to_owned(),
            specifications: vec![SpecEntry::new("Kondisi", "Baru"), SpecEntry::new("", "")],
            image_url: "https://images.unsplash.com/photo-1612815154858-60aa4c59eaa6?w=500"
                .to_owned(),
        }
    }

    #[test]
    fn test_valid_draft() {
        let product = draft().validate().unwrap();
        assert_eq!(product.price.as_i64(), 2_250_000);
        assert_eq!(product.stock, 15);
        assert_eq!(product.specifications.entries().len(), 1);
    }

    #[test]
    fn test_reports_first_violated_field() {
        let mut d = draft();
        d.name = "   ".to_owned();
        d.price_cents = -5;
        let err = d.validate().unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.to_string(), "product name cannot be empty");
    }

    #[test]
    fn test_rejects_negative_price_and_stock() {
        let mut d = draft();
        d.price_cents = -1;
        assert_eq!(d.validate().unwrap_err().field, "priceCents");

        let mut d = draft();
        d.stock = -3;
        assert_eq!(d.validate().unwrap_err().field, "stock");

        let mut d = draft();
        d.stock = i64::from(i32::MAX) + 1;
        assert_eq!(d.validate().unwrap_err().field, "stock");
    }

    #[test]
    fn test_rejects_specification_without_name() {
        let mut d = draft();
        d.specifications = vec![SpecEntry::new("  ", "Wi-Fi")];
        assert_eq!(d.validate().unwrap_err().field, "specifications");

        // A name without a value is an unfinished row and is dropped.
        let mut d = draft();
        d.specifications = vec![SpecEntry::new("Konektivitas", " ")];
        assert!(d.validate().unwrap().specifications.is_empty());
    }

    #[test]
    fn test_rejects_bad_image_url() {
        for bad in ["", "not a url", "ftp://files.example.com/a.png", "/static/a.png"] {
            let mut d = draft();
            d.image_url = bad.to_owned();
            assert_eq!(d.validate().unwrap_err().field, "imageUrl", "{bad}");
        }
    }

    #[test]
    fn test_deserializes_camel_case() {
        let json = r#"{
            "name": "Epson L3110",
            "brand": "Epson",
            "priceCents": 2100000,
            "stock": 20,
            "description": "EcoTank",
            "imageUrl": "https://example.com/epson.jpg"
        }"#;
        let d: ProductDraft = serde_json::from_str(json).unwrap();
        let product = d.validate().unwrap();
        assert!(product.specifications.is_empty());
    }
}
