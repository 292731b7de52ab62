//! Product catalogue model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::resource::default_active;
use super::{Counters, Resource, ResourceKind};

pub const DEFAULT_CURRENCY: &str = "USD";

/// A purchasable assessment or coaching product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Price in minor currency units
    pub price_cents: u64,
    /// ISO-4217 code
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub counters: Counters,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn from_new(id: String, new: NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            category: new.category,
            price_cents: new.price_cents,
            currency: new
                .currency
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            image_url: new.image_url,
            counters: Counters::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Resource for Product {
    const KIND: ResourceKind = ResourceKind::Product;

    fn id(&self) -> &str {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn counters(&self) -> Counters {
        self.counters
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Request body for `POST /products`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[validate(length(min = 1_u64, max = 200_u64))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000_u64))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1_u64, max = 64_u64))]
    pub category: Option<String>,
    pub price_cents: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 3_u64))]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub image_url: Option<String>,
}

/// Request body for `PUT /products/:id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1_u64, max = 200_u64))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000_u64))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1_u64, max = 64_u64))]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub image_url: Option<String>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.price_cents.is_none()
            && self.image_url.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            name: "Career Clarity Assessment".to_string(),
            description: None,
            category: Some("assessment".to_string()),
            price_cents: 4900,
            currency: None,
            image_url: None,
        }
    }

    #[test]
    fn test_currency_defaults_to_usd() {
        let product = Product::from_new("x".to_string(), new_product(), Utc::now());
        assert_eq!(product.currency, "USD");
    }

    #[test]
    fn test_currency_is_uppercased() {
        let new = NewProduct { currency: Some("eur".to_string()), ..new_product() };
        let product = Product::from_new("x".to_string(), new, Utc::now());
        assert_eq!(product.currency, "EUR");
    }

    #[test]
    fn test_invalid_image_url_rejected() {
        let new = NewProduct { image_url: Some("not a url".to_string()), ..new_product() };
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_price_cents_round_trips_camel_case() {
        let product = Product::from_new("x".to_string(), new_product(), Utc::now());
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["priceCents"], 4900);
    }
}
