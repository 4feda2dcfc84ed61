use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, merge, merge_opt, validate};

labels! {
    WarehouseType {
        Main => "main",
        Regional => "regional",
        Distribution => "distribution",
        Retail => "retail",
    }
}

labels! {
    WarehouseStatus {
        Active => "active",
        Inactive => "inactive",
        Maintenance => "maintenance",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: i64,
    pub warehouse_code: String,
    pub name: String,
    pub location: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub manager: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub capacity: Option<u64>,
    pub current_stock: u64,
    #[serde(rename = "type")]
    pub kind: WarehouseType,
    pub status: WarehouseStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl_record!(Warehouse, "warehouses", |w| vec![(
    "warehouseCode",
    w.warehouse_code.clone()
)]);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWarehouse {
    pub warehouse_code: String,
    pub name: String,
    pub location: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub manager: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub capacity: Option<u64>,
    pub current_stock: Option<u64>,
    #[serde(rename = "type")]
    pub kind: Option<WarehouseType>,
    pub status: Option<WarehouseStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehousePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub manager: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub capacity: Option<u64>,
    pub current_stock: Option<u64>,
    #[serde(rename = "type")]
    pub kind: Option<WarehouseType>,
    pub status: Option<WarehouseStatus>,
    pub notes: Option<String>,
}

impl NewWarehouse {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::required("warehouseCode", &self.warehouse_code)?;
        validate::required("name", &self.name)?;
        validate::optional_email("email", self.email.as_deref())
    }
}

impl Warehouse {
    pub fn create(new: NewWarehouse, now: NaiveDateTime) -> Self {
        Warehouse {
            id: 0,
            warehouse_code: new.warehouse_code.trim().to_string(),
            name: new.name,
            location: new.location,
            city: new.city,
            country: new.country,
            manager: new.manager,
            phone: new.phone,
            email: new.email,
            capacity: new.capacity,
            current_stock: new.current_stock.unwrap_or(0),
            kind: new.kind.unwrap_or(WarehouseType::Main),
            status: new.status.unwrap_or(WarehouseStatus::Active),
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: WarehousePatch, now: NaiveDateTime) {
        merge(&mut self.name, patch.name);
        merge_opt(&mut self.location, patch.location);
        merge_opt(&mut self.city, patch.city);
        merge_opt(&mut self.country, patch.country);
        merge_opt(&mut self.manager, patch.manager);
        merge_opt(&mut self.phone, patch.phone);
        merge_opt(&mut self.email, patch.email);
        merge_opt(&mut self.capacity, patch.capacity);
        merge(&mut self.current_stock, patch.current_stock);
        merge(&mut self.kind, patch.kind);
        merge(&mut self.status, patch.status);
        merge_opt(&mut self.notes, patch.notes);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 2)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid timestamp")
    }

    fn warehouse() -> Warehouse {
        Warehouse::create(
            NewWarehouse {
                warehouse_code: " WH-HN ".to_string(),
                name: "Ha Noi".to_string(),
                capacity: Some(1000),
                ..Default::default()
            },
            now(),
        )
    }

    #[test]
    fn test_defaults() {
        let w = warehouse();

        assert_eq!(w.warehouse_code, "WH-HN");
        assert_eq!(w.kind, WarehouseType::Main);
        assert_eq!(w.status, WarehouseStatus::Active);
        assert_eq!(w.current_stock, 0);
    }

    #[test]
    fn test_patch() {
        let mut w = warehouse();

        w.apply(
            WarehousePatch {
                current_stock: Some(250),
                status: Some(WarehouseStatus::Maintenance),
                ..Default::default()
            },
            now(),
        );

        assert_eq!(w.current_stock, 250);
        assert_eq!(w.status, WarehouseStatus::Maintenance);
        assert_eq!(w.capacity, Some(1000));
    }

    #[test]
    fn test_type_uses_wire_names() {
        assert_eq!("distribution".parse::<WarehouseType>(), Ok(WarehouseType::Distribution));
        assert!("depot".parse::<WarehouseType>().is_err());
    }
}
