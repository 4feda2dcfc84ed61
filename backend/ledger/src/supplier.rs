use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, merge, merge_opt, validate};

labels! {
    SupplierStatus {
        Active => "active",
        Inactive => "inactive",
        Blocked => "blocked",
    }
}

labels! {
    SupplierRating {
        Excellent => "excellent",
        Good => "good",
        Average => "average",
        Poor => "poor",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub contact_person: Option<String>,
    pub rating: Option<SupplierRating>,
    pub status: SupplierStatus,
    pub total_purchased: Decimal,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl_record!(Supplier, "suppliers");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub contact_person: Option<String>,
    pub rating: Option<SupplierRating>,
    pub status: Option<SupplierStatus>,
    pub total_purchased: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub contact_person: Option<String>,
    pub rating: Option<SupplierRating>,
    pub status: Option<SupplierStatus>,
    pub total_purchased: Option<Decimal>,
    pub notes: Option<String>,
}

impl NewSupplier {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::required("name", &self.name)?;
        validate::optional_email("email", self.email.as_deref())
    }
}

impl SupplierPatch {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::optional_email("email", self.email.as_deref())
    }
}

impl Supplier {
    pub fn create(new: NewSupplier, now: NaiveDateTime) -> Self {
        Supplier {
            id: 0,
            name: new.name,
            email: new.email,
            phone: new.phone,
            address: new.address,
            city: new.city,
            country: new.country,
            contact_person: new.contact_person,
            rating: new.rating,
            status: new.status.unwrap_or(SupplierStatus::Active),
            total_purchased: new.total_purchased.unwrap_or_default(),
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: SupplierPatch, now: NaiveDateTime) {
        merge(&mut self.name, patch.name);
        merge_opt(&mut self.email, patch.email);
        merge_opt(&mut self.phone, patch.phone);
        merge_opt(&mut self.address, patch.address);
        merge_opt(&mut self.city, patch.city);
        merge_opt(&mut self.country, patch.country);
        merge_opt(&mut self.contact_person, patch.contact_person);
        merge_opt(&mut self.rating, patch.rating);
        merge(&mut self.status, patch.status);
        merge(&mut self.total_purchased, patch.total_purchased);
        merge_opt(&mut self.notes, patch.notes);
        self.updated_at = now;
    }

    /// Active and rated excellent or good.
    pub fn is_preferred(&self) -> bool {
        self.status == SupplierStatus::Active
            && matches!(
                self.rating,
                Some(SupplierRating::Excellent | SupplierRating::Good)
            )
    }
}
