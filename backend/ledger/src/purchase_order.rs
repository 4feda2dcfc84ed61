use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, merge, merge_opt, sales_order::PaymentStatus, validate};

labels! {
    PurchaseOrderStatus {
        Draft => "draft",
        Sent => "sent",
        Confirmed => "confirmed",
        Received => "received",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: i64,
    pub po_number: String,
    pub order_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub supplier_id: i64,
    pub supplier_name: Option<String>,
    pub total_amount: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub grand_total: Option<Decimal>,
    pub status: PurchaseOrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl_record!(PurchaseOrder, "purchase_orders", |po| vec![(
    "poNumber",
    po.po_number.clone()
)]);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseOrder {
    pub po_number: String,
    pub expected_date: Option<NaiveDate>,
    pub supplier_id: i64,
    pub supplier_name: Option<String>,
    pub total_amount: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub grand_total: Option<Decimal>,
    pub status: Option<PurchaseOrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_terms: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderPatch {
    pub status: Option<PurchaseOrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_terms: Option<String>,
    pub expected_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewPurchaseOrder {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::required("poNumber", &self.po_number)
    }
}

impl PurchaseOrder {
    /// Dated `today`; status defaults to draft and payment to unpaid.
    pub fn create(new: NewPurchaseOrder, today: NaiveDate, now: NaiveDateTime) -> Self {
        PurchaseOrder {
            id: 0,
            po_number: new.po_number.trim().to_string(),
            order_date: today,
            expected_date: new.expected_date,
            received_date: None,
            supplier_id: new.supplier_id,
            supplier_name: new.supplier_name,
            total_amount: new.total_amount,
            discount: new.discount,
            tax: new.tax,
            grand_total: new.grand_total,
            status: new.status.unwrap_or(PurchaseOrderStatus::Draft),
            payment_status: new.payment_status.unwrap_or(PaymentStatus::Unpaid),
            payment_terms: new.payment_terms,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: PurchaseOrderPatch, now: NaiveDateTime) {
        merge(&mut self.status, patch.status);
        merge(&mut self.payment_status, patch.payment_status);
        merge_opt(&mut self.payment_terms, patch.payment_terms);
        merge_opt(&mut self.expected_date, patch.expected_date);
        merge_opt(&mut self.received_date, patch.received_date);
        merge_opt(&mut self.notes, patch.notes);
        self.updated_at = now;
    }

    /// Expected before `today` and still open.
    pub fn is_pending_on(&self, today: NaiveDate) -> bool {
        !matches!(
            self.status,
            PurchaseOrderStatus::Received | PurchaseOrderStatus::Cancelled
        ) && self.expected_date.is_some_and(|expected| expected < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, d).expect("valid date")
    }

    fn order(expected: Option<NaiveDate>) -> PurchaseOrder {
        PurchaseOrder::create(
            NewPurchaseOrder {
                po_number: "PO-1".to_string(),
                supplier_id: 3,
                expected_date: expected,
                ..Default::default()
            },
            day(1),
            day(1).and_hms_opt(8, 0, 0).expect("valid time"),
        )
    }

    #[test]
    fn test_defaults() {
        let po = order(None);

        assert_eq!(po.status, PurchaseOrderStatus::Draft);
        assert_eq!(po.payment_status, PaymentStatus::Unpaid);
        assert_eq!(po.order_date, day(1));
    }

    #[test]
    fn test_pending() {
        let mut po = order(Some(day(5)));

        assert!(!po.is_pending_on(day(5)));
        assert!(po.is_pending_on(day(6)));

        po.apply(
            PurchaseOrderPatch {
                status: Some(PurchaseOrderStatus::Received),
                received_date: Some(day(7)),
                ..Default::default()
            },
            day(7).and_hms_opt(9, 0, 0).expect("valid time"),
        );
        assert!(!po.is_pending_on(day(8)));
        assert_eq!(po.received_date, Some(day(7)));
    }
}
