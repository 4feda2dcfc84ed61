//! Grouping and summing over imported transactions.
//!
//! Groups are collected into ordered maps and sorted stably, so equal
//! figures always come out in name order. The only non-deterministic value is
//! the `change` jitter on top products, drawn from the caller's `Rng`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{LedgerError, transaction::Transaction};

const TOP_PRODUCTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    TopProducts,
    DepartmentPerformance,
    MonthlyTrend,
    ProductCategory,
    Comprehensive,
}

impl Kind {
    /// Case-insensitive; anything unrecognised selects the comprehensive view.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("top_products") => Kind::TopProducts,
            Some("department_performance") => Kind::DepartmentPerformance,
            Some("monthly_trend") => Kind::MonthlyTrend,
            Some("product_category") => Kind::ProductCategory,
            _ => Kind::Comprehensive,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub department: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Filter {
    /// The date range only applies when both ends are given.
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if tx.transaction_date < start || tx.transaction_date > end {
                return false;
            }
        }

        match self.department.as_deref().map(str::trim) {
            Some(department) if !department.is_empty() => {
                tx.department.to_lowercase() == department.to_lowercase()
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub name: String,
    pub value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentMetrics {
    pub name: String,
    pub revenue: Decimal,
    pub profit: Decimal,
    pub cost: Decimal,
    pub transactions: usize,
    pub profit_margin: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthMetrics {
    pub name: String,
    pub revenue: Decimal,
    pub profit: Decimal,
    pub cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Breakdown {
    TopProducts { data: Vec<Ranked>, total: Decimal },
    DepartmentPerformance { data: Vec<DepartmentMetrics> },
    MonthlyTrend { data: Vec<MonthMetrics> },
    ProductCategory { data: Vec<Ranked> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub total_cost: Decimal,
    pub profit_margin: Decimal,
    pub transaction_count: usize,
    pub top_products: Vec<Ranked>,
    pub departments: Vec<DepartmentMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Analytics {
    Breakdown(Breakdown),
    Summary(Summary),
}

/// Fails only when a total leaves the range `Decimal` can hold.
pub fn analyze<R: Rng + ?Sized>(
    kind: Kind,
    transactions: &[Transaction],
    rng: &mut R,
) -> Result<Analytics, LedgerError> {
    let analytics = match kind {
        Kind::TopProducts => {
            let (data, total) = top_products(transactions, rng)?;
            Analytics::Breakdown(Breakdown::TopProducts { data, total })
        }
        Kind::DepartmentPerformance => Analytics::Breakdown(Breakdown::DepartmentPerformance {
            data: department_performance(transactions)?,
        }),
        Kind::MonthlyTrend => Analytics::Breakdown(Breakdown::MonthlyTrend {
            data: monthly_trend(transactions)?,
        }),
        Kind::ProductCategory => Analytics::Breakdown(Breakdown::ProductCategory {
            data: product_category(transactions)?,
        }),
        Kind::Comprehensive => Analytics::Summary(summary(transactions, rng)?),
    };

    Ok(analytics)
}

/// Revenue per product, ten largest first, with the overall total.
pub fn top_products<R: Rng + ?Sized>(
    transactions: &[Transaction],
    rng: &mut R,
) -> Result<(Vec<Ranked>, Decimal), LedgerError> {
    let mut revenue: BTreeMap<&str, Decimal> = BTreeMap::new();
    for tx in transactions {
        add(revenue.entry(tx.product.as_str()).or_default(), tx.revenue)?;
    }
    let total = sum(revenue.values().copied())?;

    let data = ranked(revenue)
        .into_iter()
        .take(TOP_PRODUCTS)
        .map(|mut entry| {
            entry.change = Some((rng.gen::<f64>() - 0.5) * 40.0);
            entry
        })
        .collect();

    Ok((data, total))
}

pub fn department_performance(
    transactions: &[Transaction],
) -> Result<Vec<DepartmentMetrics>, LedgerError> {
    let mut departments: BTreeMap<&str, DepartmentMetrics> = BTreeMap::new();
    for tx in transactions {
        let metrics = departments
            .entry(tx.department.as_str())
            .or_insert_with(|| DepartmentMetrics {
                name: tx.department.clone(),
                revenue: Decimal::ZERO,
                profit: Decimal::ZERO,
                cost: Decimal::ZERO,
                transactions: 0,
                profit_margin: Decimal::ZERO,
            });
        add(&mut metrics.revenue, tx.revenue)?;
        add(&mut metrics.profit, tx.profit)?;
        add(&mut metrics.cost, tx.cost)?;
        metrics.transactions += 1;
    }

    let mut data = departments
        .into_values()
        .map(|mut metrics| {
            metrics.profit_margin = margin(metrics.profit, metrics.revenue)?;
            Ok(metrics)
        })
        .collect::<Result<Vec<DepartmentMetrics>, LedgerError>>()?;
    data.sort_by(|a, b| b.revenue.cmp(&a.revenue));

    Ok(data)
}

/// Figures per `YYYY-MM`, oldest month first.
pub fn monthly_trend(transactions: &[Transaction]) -> Result<Vec<MonthMetrics>, LedgerError> {
    let mut months: BTreeMap<String, MonthMetrics> = BTreeMap::new();
    for tx in transactions {
        let key = tx.transaction_date.format("%Y-%m").to_string();
        let metrics = months.entry(key.clone()).or_insert_with(|| MonthMetrics {
            name: key,
            revenue: Decimal::ZERO,
            profit: Decimal::ZERO,
            cost: Decimal::ZERO,
        });
        add(&mut metrics.revenue, tx.revenue)?;
        add(&mut metrics.profit, tx.profit)?;
        add(&mut metrics.cost, tx.cost)?;
    }

    Ok(months.into_values().collect())
}

/// Revenue per category, where the category is the first word of the product.
pub fn product_category(transactions: &[Transaction]) -> Result<Vec<Ranked>, LedgerError> {
    let mut revenue: BTreeMap<&str, Decimal> = BTreeMap::new();
    for tx in transactions {
        let category = tx.product.split(' ').next().unwrap_or_default();
        add(revenue.entry(category).or_default(), tx.revenue)?;
    }

    Ok(ranked(revenue))
}

pub fn summary<R: Rng + ?Sized>(
    transactions: &[Transaction],
    rng: &mut R,
) -> Result<Summary, LedgerError> {
    let total_revenue = sum(transactions.iter().map(|tx| tx.revenue))?;
    let total_profit = sum(transactions.iter().map(|tx| tx.profit))?;
    let total_cost = sum(transactions.iter().map(|tx| tx.cost))?;

    Ok(Summary {
        total_revenue,
        total_profit,
        total_cost,
        profit_margin: margin(total_profit, total_revenue)?,
        transaction_count: transactions.len(),
        top_products: top_products(transactions, rng)?.0,
        departments: department_performance(transactions)?,
    })
}

/// Percentage rounded to two places, zero when there is no revenue.
///
/// Scales before dividing when that fits, so small margins keep their
/// precision, and divides first otherwise.
pub fn margin(profit: Decimal, revenue: Decimal) -> Result<Decimal, LedgerError> {
    if revenue.is_zero() {
        return Ok(Decimal::ZERO);
    }

    profit
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(revenue))
        .or_else(|| {
            profit
                .checked_div(revenue)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        })
        .map(|percent| percent.round_dp(2))
        .ok_or(LedgerError::Overflow)
}

fn add(total: &mut Decimal, value: Decimal) -> Result<(), LedgerError> {
    *total = total.checked_add(value).ok_or(LedgerError::Overflow)?;
    Ok(())
}

/// Checked total; [`LedgerError::Overflow`] past the decimal range.
pub fn sum(mut values: impl Iterator<Item = Decimal>) -> Result<Decimal, LedgerError> {
    values.try_fold(Decimal::ZERO, |total, value| {
        total.checked_add(value).ok_or(LedgerError::Overflow)
    })
}

fn ranked(values: BTreeMap<&str, Decimal>) -> Vec<Ranked> {
    let mut entries: Vec<Ranked> = values
        .into_iter()
        .map(|(name, value)| Ranked {
            name: name.to_string(),
            value,
            change: None,
        })
        .collect();
    entries.sort_by(|a, b| b.value.cmp(&a.value));

    entries
}
