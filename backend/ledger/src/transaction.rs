use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::LedgerError;

/// Columns a delimited row must carry, in order.
pub const CSV_COLUMNS: [&str; 10] = [
    "Date",
    "Customer",
    "TransactionType",
    "Revenue",
    "Cost",
    "Product",
    "OrderStatus",
    "Department",
    "Profit",
    "ForecastedRevenue",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub transaction_date: NaiveDate,
    pub customer_name: String,
    pub transaction_type: String,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub product: String,
    pub order_status: String,
    pub department: String,
    pub profit: Decimal,
    pub forecasted_revenue: Decimal,
}

impl_record!(Transaction, "transactions");

/// Parses comma separated rows, skipping the header line.
///
/// Rows with fewer than ten fields are ignored. A field that does not parse
/// fails the whole batch with the 1-based line number of the row.
pub fn parse_csv(input: &str) -> Result<Vec<Transaction>, LedgerError> {
    let mut transactions = Vec::new();

    for (index, line) in input.lines().enumerate().skip(1) {
        let fields: Vec<&str> = line.trim_end_matches('\r').split(',').collect();
        if fields.len() < CSV_COLUMNS.len() {
            continue;
        }

        let row = |reason: String| LedgerError::Row {
            line: index + 1,
            reason,
        };

        transactions.push(Transaction {
            id: 0,
            transaction_date: date(fields[0]).map_err(row)?,
            customer_name: fields[1].to_string(),
            transaction_type: fields[2].to_string(),
            revenue: amount("Revenue", fields[3]).map_err(row)?,
            cost: amount("Cost", fields[4]).map_err(row)?,
            product: fields[5].to_string(),
            order_status: fields[6].to_string(),
            department: fields[7].to_string(),
            profit: amount("Profit", fields[8]).map_err(row)?,
            forecasted_revenue: amount("ForecastedRevenue", fields[9]).map_err(row)?,
        });
    }

    Ok(transactions)
}

/// Converts one row returned by the enrichment service.
///
/// Values may arrive as JSON strings or numbers. `ForecastedRevenue` is
/// optional and defaults to zero.
pub fn from_enriched_row(row: &Map<String, Value>) -> Result<Transaction, LedgerError> {
    let text = |key: &'static str| -> Result<String, LedgerError> {
        match row.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(LedgerError::MissingField(key)),
        }
    };
    let invalid = |field: &'static str| move |reason: String| LedgerError::InvalidField { field, reason };

    let forecasted_revenue = match row.get("ForecastedRevenue") {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(_) => amount("ForecastedRevenue", &text("ForecastedRevenue")?)
            .map_err(invalid("ForecastedRevenue"))?,
    };

    Ok(Transaction {
        id: 0,
        transaction_date: date(&text("Date")?).map_err(invalid("Date"))?,
        customer_name: text("Customer")?,
        transaction_type: text("TransactionType")?,
        revenue: amount("Revenue", &text("Revenue")?).map_err(invalid("Revenue"))?,
        cost: amount("Cost", &text("Cost")?).map_err(invalid("Cost"))?,
        product: text("Product")?,
        order_status: text("OrderStatus")?,
        department: text("Department")?,
        profit: amount("Profit", &text("Profit")?).map_err(invalid("Profit"))?,
        forecasted_revenue,
    })
}

fn date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}'", value.trim()))
}

fn amount(column: &str, value: &str) -> Result<Decimal, String> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|_| format!("invalid {column} '{value}'"))
}
