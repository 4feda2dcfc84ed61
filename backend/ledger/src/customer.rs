use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, merge, merge_opt, validate};

labels! {
    /// Spend tier, derived from `total_spent`.
    CustomerLevel {
        Diamond => "diamond",
        Gold => "gold",
        Silver => "silver",
        New => "new",
    }
}

impl CustomerLevel {
    pub fn for_spend(total_spent: Decimal) -> Self {
        if total_spent >= Decimal::from(80_000_000) {
            CustomerLevel::Diamond
        } else if total_spent >= Decimal::from(50_000_000) {
            CustomerLevel::Gold
        } else if total_spent >= Decimal::from(20_000_000) {
            CustomerLevel::Silver
        } else {
            CustomerLevel::New
        }
    }

    pub fn is_vip(self) -> bool {
        matches!(self, CustomerLevel::Diamond | CustomerLevel::Gold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub total_spent: Decimal,
    pub order_count: u32,
    pub level: CustomerLevel,
    pub created_at: NaiveDateTime,
    pub last_purchase_at: Option<NaiveDateTime>,
}

impl_record!(Customer, "customers", |c| vec![("email", c.email.clone())]);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub total_spent: Option<Decimal>,
    pub order_count: Option<u32>,
    pub last_purchase_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub total_spent: Option<Decimal>,
    pub order_count: Option<u32>,
    pub last_purchase_at: Option<NaiveDateTime>,
}

impl NewCustomer {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::required("name", &self.name)?;
        validate::email("email", &self.email)
    }
}

impl CustomerPatch {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if let Some(name) = &self.name {
            validate::required("name", name)?;
        }
        if let Some(email) = &self.email {
            validate::email("email", email)?;
        }

        Ok(())
    }
}

impl Customer {
    pub fn create(new: NewCustomer, now: NaiveDateTime) -> Self {
        let mut customer = Customer {
            id: 0,
            name: new.name.trim().to_string(),
            email: new.email.trim().to_string(),
            phone: new.phone,
            location: new.location,
            total_spent: new.total_spent.unwrap_or_default(),
            order_count: new.order_count.unwrap_or(0),
            level: CustomerLevel::New,
            created_at: now,
            last_purchase_at: new.last_purchase_at,
        };
        customer.refresh_level();

        customer
    }

    pub fn apply(&mut self, patch: CustomerPatch) {
        merge(&mut self.name, patch.name.map(|name| name.trim().to_string()));
        merge(&mut self.email, patch.email.map(|email| email.trim().to_string()));
        merge_opt(&mut self.phone, patch.phone);
        merge_opt(&mut self.location, patch.location);
        merge_opt(&mut self.last_purchase_at, patch.last_purchase_at);

        if patch.total_spent.is_some() || patch.order_count.is_some() {
            merge(&mut self.total_spent, patch.total_spent);
            merge(&mut self.order_count, patch.order_count);
            self.refresh_level();
        }
    }

    fn refresh_level(&mut self) {
        self.level = CustomerLevel::for_spend(self.total_spent);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid timestamp")
    }

    fn new_customer(total_spent: Option<Decimal>) -> NewCustomer {
        NewCustomer {
            name: " Lan ".to_string(),
            email: "lan@example.com".to_string(),
            total_spent,
            ..Default::default()
        }
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(CustomerLevel::for_spend(Decimal::ZERO), CustomerLevel::New);
        assert_eq!(
            CustomerLevel::for_spend(Decimal::from(19_999_999)),
            CustomerLevel::New
        );
        assert_eq!(
            CustomerLevel::for_spend(Decimal::from(20_000_000)),
            CustomerLevel::Silver
        );
        assert_eq!(
            CustomerLevel::for_spend(Decimal::from(50_000_000)),
            CustomerLevel::Gold
        );
        assert_eq!(
            CustomerLevel::for_spend(Decimal::from(80_000_000)),
            CustomerLevel::Diamond
        );
    }

    #[test]
    fn test_create_defaults() {
        let customer = Customer::create(new_customer(None), now());

        assert_eq!(customer.name, "Lan");
        assert_eq!(customer.total_spent, Decimal::ZERO);
        assert_eq!(customer.order_count, 0);
        assert_eq!(customer.level, CustomerLevel::New);
        assert_eq!(customer.created_at, now());
    }

    #[test]
    fn test_create_derives_level_from_spend() {
        let customer = Customer::create(new_customer(Some(Decimal::from(60_000_000))), now());

        assert_eq!(customer.level, CustomerLevel::Gold);
    }

    #[test]
    fn test_patch_recomputes_level() {
        let mut customer = Customer::create(new_customer(None), now());

        customer.apply(CustomerPatch {
            total_spent: Some(Decimal::from(90_000_000)),
            ..Default::default()
        });
        assert_eq!(customer.level, CustomerLevel::Diamond);

        customer.apply(CustomerPatch {
            location: Some("Hanoi".to_string()),
            ..Default::default()
        });
        assert_eq!(customer.level, CustomerLevel::Diamond);
        assert_eq!(customer.location.as_deref(), Some("Hanoi"));
    }

    #[test]
    fn test_validate() {
        assert!(new_customer(None).validate().is_ok());

        let missing = NewCustomer {
            email: "x@y.z".to_string(),
            ..Default::default()
        };
        assert_eq!(missing.validate(), Err(LedgerError::MissingField("name")));
    }

    #[test]
    fn test_level_labels() {
        assert_eq!("gold".parse::<CustomerLevel>(), Ok(CustomerLevel::Gold));
        assert!("platinum".parse::<CustomerLevel>().is_err());
        assert_eq!(
            serde_json::to_string(&CustomerLevel::Diamond).expect("serialize"),
            "\"diamond\""
        );
    }
}
