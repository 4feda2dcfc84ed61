use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, merge, merge_opt, validate};

labels! {
    InvoiceStatus {
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Overdue => "overdue",
        Cancelled => "cancelled",
    }
}

impl InvoiceStatus {
    /// Settled invoices never count as overdue or outstanding.
    pub fn is_closed(self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub customer_id: i64,
    pub customer_name: Option<String>,
    pub sales_order_id: Option<i64>,
    pub subtotal: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
    pub balance_due: Option<Decimal>,
    pub status: InvoiceStatus,
    pub payment_method: Option<String>,
    pub paid_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl_record!(Invoice, "invoices", |i| vec![(
    "invoiceNumber",
    i.invoice_number.clone()
)]);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub invoice_number: String,
    pub due_date: Option<NaiveDate>,
    pub customer_id: i64,
    pub customer_name: Option<String>,
    pub sales_order_id: Option<i64>,
    pub subtotal: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
    pub status: Option<InvoiceStatus>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePatch {
    pub status: Option<InvoiceStatus>,
    pub paid_amount: Option<Decimal>,
    pub payment_method: Option<String>,
    pub paid_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl NewInvoice {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::required("invoiceNumber", &self.invoice_number)
    }
}

impl Invoice {
    /// Dated `today` regardless of the payload, status defaults to draft.
    pub fn create(new: NewInvoice, today: NaiveDate, now: NaiveDateTime) -> Self {
        let mut invoice = Invoice {
            id: 0,
            invoice_number: new.invoice_number.trim().to_string(),
            invoice_date: today,
            due_date: new.due_date,
            customer_id: new.customer_id,
            customer_name: new.customer_name,
            sales_order_id: new.sales_order_id,
            subtotal: new.subtotal,
            discount: new.discount,
            tax: new.tax,
            total_amount: new.total_amount,
            paid_amount: new.paid_amount,
            balance_due: None,
            status: new.status.unwrap_or(InvoiceStatus::Draft),
            payment_method: new.payment_method,
            paid_date: None,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        invoice.recompute_balance();

        invoice
    }

    /// Applies the patch, then recomputes the balance and settles the status.
    pub fn apply(&mut self, patch: InvoicePatch, today: NaiveDate, now: NaiveDateTime) {
        merge(&mut self.status, patch.status);
        merge_opt(&mut self.paid_amount, patch.paid_amount);
        merge_opt(&mut self.payment_method, patch.payment_method);
        merge_opt(&mut self.paid_date, patch.paid_date);
        merge_opt(&mut self.notes, patch.notes);
        merge_opt(&mut self.due_date, patch.due_date);

        self.updated_at = now;
        self.recompute_balance();
        self.refresh_status(today);
    }

    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        !self.status.is_closed() && self.due_date.is_some_and(|due| due < today)
    }

    fn recompute_balance(&mut self) {
        if let (Some(total), Some(paid)) = (self.total_amount, self.paid_amount) {
            self.balance_due = Some(total - paid);
        }
    }

    fn refresh_status(&mut self, today: NaiveDate) {
        if self.balance_due.is_some_and(|balance| balance.is_zero()) {
            self.status = InvoiceStatus::Paid;
        } else if self.is_overdue_on(today) {
            self.status = InvoiceStatus::Overdue;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).expect("valid date")
    }

    fn at(d: u32) -> NaiveDateTime {
        day(d).and_hms_opt(12, 0, 0).expect("valid time")
    }

    fn invoice(total: i64, paid: i64, due: Option<NaiveDate>) -> Invoice {
        Invoice::create(
            NewInvoice {
                invoice_number: "INV-001".to_string(),
                customer_id: 7,
                total_amount: Some(Decimal::from(total)),
                paid_amount: Some(Decimal::from(paid)),
                due_date: due,
                ..Default::default()
            },
            day(1),
            at(1),
        )
    }

    #[test]
    fn test_create_computes_balance() {
        let inv = invoice(1_000, 250, None);

        assert_eq!(inv.balance_due, Some(Decimal::from(750)));
        assert_eq!(inv.status, InvoiceStatus::Draft);
        assert_eq!(inv.invoice_date, day(1));
    }

    #[test]
    fn test_create_without_amounts_leaves_balance_empty() {
        let inv = Invoice::create(
            NewInvoice {
                invoice_number: "INV-002".to_string(),
                ..Default::default()
            },
            day(1),
            at(1),
        );

        assert_eq!(inv.balance_due, None);
    }

    #[test]
    fn test_full_payment_marks_paid() {
        let mut inv = invoice(1_000, 0, Some(day(10)));

        inv.apply(
            InvoicePatch {
                paid_amount: Some(Decimal::new(100_000, 2)),
                ..Default::default()
            },
            day(20),
            at(20),
        );

        assert_eq!(inv.balance_due, Some(Decimal::ZERO));
        assert_eq!(inv.status, InvoiceStatus::Paid);
        assert_eq!(inv.updated_at, at(20));
    }

    #[test]
    fn test_past_due_marks_overdue() {
        let mut inv = invoice(1_000, 100, Some(day(10)));

        inv.apply(
            InvoicePatch {
                status: Some(InvoiceStatus::Sent),
                ..Default::default()
            },
            day(11),
            at(11),
        );

        assert_eq!(inv.status, InvoiceStatus::Overdue);
    }

    #[test]
    fn test_not_yet_due_keeps_status() {
        let mut inv = invoice(1_000, 100, Some(day(10)));

        inv.apply(
            InvoicePatch {
                status: Some(InvoiceStatus::Sent),
                ..Default::default()
            },
            day(10),
            at(10),
        );

        assert_eq!(inv.status, InvoiceStatus::Sent);
    }

    #[test]
    fn test_cancelled_never_turns_overdue() {
        let mut inv = invoice(1_000, 0, Some(day(2)));

        inv.apply(
            InvoicePatch {
                status: Some(InvoiceStatus::Cancelled),
                ..Default::default()
            },
            day(25),
            at(25),
        );

        assert_eq!(inv.status, InvoiceStatus::Cancelled);
    }
}
