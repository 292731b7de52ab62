use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;
use wingrox_types::{NewProduct, Product, ProductUpdate};

use super::{require_text, ResourceOps, ResourceService, ServiceError};
use crate::repository::to_document;
use crate::store::DocumentStore;

#[derive(Clone)]
pub struct ProductService {
    records: ResourceService<Product>,
}

impl ProductService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { records: ResourceService::new(store) }
    }
}

fn check_currency(currency: &str) -> Result<(), ServiceError> {
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ServiceError::validation(format!(
            "currency must be a 3-letter ISO code, got '{}'",
            currency
        )));
    }
    Ok(())
}

#[async_trait]
impl ResourceOps for ProductService {
    type Item = Product;
    type New = NewProduct;
    type Changes = ProductUpdate;

    const FILTERS: &'static [(&'static str, &'static str)] = &[("category", "category")];

    fn records(&self) -> &ResourceService<Product> {
        &self.records
    }

    async fn create(&self, mut new: NewProduct) -> Result<Product, ServiceError> {
        new.validate()?;
        require_text("name", &new.name)?;
        if let Some(currency) = &new.currency {
            check_currency(currency)?;
        }
        new.name = new.name.trim().to_string();

        let product = Product::from_new(uuid::Uuid::new_v4().to_string(), new, Utc::now());
        let created = self.records.insert(product).await?;
        tracing::info!("Created product {} ({})", created.id, created.name);
        Ok(created)
    }

    async fn update(&self, id: &str, changes: ProductUpdate) -> Result<Product, ServiceError> {
        changes.validate()?;
        if changes.is_empty() {
            return Err(ServiceError::validation("update must change at least one field"));
        }
        if let Some(name) = &changes.name {
            require_text("name", name)?;
        }
        self.records.apply(id, to_document(&changes)?).await
    }
}
