use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, merge, merge_opt, validate};

labels! {
    SalesOrderStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Processing => "processing",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

labels! {
    /// Shared by sales and purchase orders.
    PaymentStatus {
        Unpaid => "unpaid",
        Partial => "partial",
        Paid => "paid",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrder {
    pub id: i64,
    pub order_number: String,
    pub order_date: NaiveDateTime,
    pub customer_id: i64,
    pub customer_name: Option<String>,
    pub total_amount: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub grand_total: Option<Decimal>,
    pub status: SalesOrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl_record!(SalesOrder, "sales_orders", |o| vec![(
    "orderNumber",
    o.order_number.clone()
)]);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSalesOrder {
    pub order_number: String,
    pub customer_id: i64,
    pub customer_name: Option<String>,
    pub total_amount: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub grand_total: Option<Decimal>,
    pub status: Option<SalesOrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderPatch {
    pub status: Option<SalesOrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub shipping_address: Option<String>,
    pub notes: Option<String>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub grand_total: Option<Decimal>,
}

impl NewSalesOrder {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::required("orderNumber", &self.order_number)
    }
}

impl SalesOrder {
    /// Stamped with `now` as the order date.
    pub fn create(new: NewSalesOrder, now: NaiveDateTime) -> Self {
        SalesOrder {
            id: 0,
            order_number: new.order_number.trim().to_string(),
            order_date: now,
            customer_id: new.customer_id,
            customer_name: new.customer_name,
            total_amount: new.total_amount,
            discount: new.discount,
            tax: new.tax,
            grand_total: new.grand_total,
            status: new.status.unwrap_or(SalesOrderStatus::Pending),
            payment_status: new.payment_status.unwrap_or(PaymentStatus::Unpaid),
            payment_method: new.payment_method,
            shipping_address: new.shipping_address,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: SalesOrderPatch, now: NaiveDateTime) {
        merge(&mut self.status, patch.status);
        merge(&mut self.payment_status, patch.payment_status);
        merge_opt(&mut self.payment_method, patch.payment_method);
        merge_opt(&mut self.shipping_address, patch.shipping_address);
        merge_opt(&mut self.notes, patch.notes);
        merge_opt(&mut self.discount, patch.discount);
        merge_opt(&mut self.tax, patch.tax);
        merge_opt(&mut self.grand_total, patch.grand_total);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 2)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    fn order() -> SalesOrder {
        SalesOrder::create(
            NewSalesOrder {
                order_number: "  SO-1 ".to_string(),
                customer_id: 4,
                grand_total: Some(Decimal::from(1200)),
                ..Default::default()
            },
            at(9),
        )
    }

    #[test]
    fn test_defaults() {
        let so = order();

        assert_eq!(so.order_number, "SO-1");
        assert_eq!(so.status, SalesOrderStatus::Pending);
        assert_eq!(so.payment_status, PaymentStatus::Unpaid);
        assert_eq!(so.order_date, at(9));
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let mut so = order();

        so.apply(
            SalesOrderPatch {
                status: Some(SalesOrderStatus::Shipped),
                payment_status: Some(PaymentStatus::Partial),
                ..Default::default()
            },
            at(15),
        );

        assert_eq!(so.status, SalesOrderStatus::Shipped);
        assert_eq!(so.payment_status, PaymentStatus::Partial);
        assert_eq!(so.grand_total, Some(Decimal::from(1200)));
        assert_eq!((so.created_at, so.updated_at), (at(9), at(15)));
    }

    #[test]
    fn test_order_number_required() {
        let new = NewSalesOrder {
            order_number: " ".to_string(),
            ..Default::default()
        };

        assert!(new.validate().is_err());
    }
}
