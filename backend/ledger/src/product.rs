use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, merge, merge_opt, validate};

/// Stock strictly below this, but above zero, counts as low.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

labels! {
    ProductStatus {
        Active => "active",
        Inactive => "inactive",
        Discontinued => "discontinued",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub cost: Option<Decimal>,
    pub stock: u32,
    pub sold_count: u32,
    pub status: ProductStatus,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl_record!(Product, "products", |p| vec![("sku", p.sku.clone())]);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub stock: Option<u32>,
    pub sold_count: Option<u32>,
    pub status: Option<ProductStatus>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub stock: Option<u32>,
    pub sold_count: Option<u32>,
    pub status: Option<ProductStatus>,
    pub description: Option<String>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::required("sku", &self.sku)?;
        validate::required("name", &self.name)?;

        if self.price.is_some_and(|price| price.is_sign_negative()) {
            return Err(LedgerError::InvalidField {
                field: "price",
                reason: "must not be negative".to_string(),
            });
        }

        Ok(())
    }
}

impl Product {
    pub fn create(new: NewProduct, now: NaiveDateTime) -> Self {
        Product {
            id: 0,
            sku: new.sku.trim().to_string(),
            name: new.name,
            category: new.category,
            price: new.price.unwrap_or_default(),
            cost: new.cost,
            stock: new.stock.unwrap_or(0),
            sold_count: new.sold_count.unwrap_or(0),
            status: new.status.unwrap_or(ProductStatus::Active),
            description: new.description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: ProductPatch, now: NaiveDateTime) {
        merge(&mut self.name, patch.name);
        merge_opt(&mut self.category, patch.category);
        merge(&mut self.price, patch.price);
        merge_opt(&mut self.cost, patch.cost);
        merge(&mut self.stock, patch.stock);
        merge(&mut self.sold_count, patch.sold_count);
        merge(&mut self.status, patch.status);
        merge_opt(&mut self.description, patch.description);
        self.updated_at = now;
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock > 0 && self.stock < LOW_STOCK_THRESHOLD
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }
}
