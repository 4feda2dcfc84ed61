//! Fixed dashboard, forecast, revenue and inventory figures.
//!
//! Nothing here reads the store. Only timestamps move.
use std::sync::Arc;

use axum::{Json, Router, extract::Path, routing::get};
use chrono::Duration;
use serde_json::{Value, json};

use crate::{state::AppState, utils::now};

const MONTHS: [&str; 9] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep"];
const MONTHLY_REVENUE: [f64; 9] = [1.8, 1.9, 2.1, 2.0, 2.3, 2.5, 2.4, 2.6, 2.1];

const ACTUAL: [(&str, u32); 6] = [
    ("Jul 24", 85),
    ("Aug 24", 90),
    ("Sep 24", 88),
    ("Oct 24", 95),
    ("Nov 24", 92),
    ("Dec 24", 100),
];

const FORECAST: [(&str, u32); 6] = [
    ("Jan 25", 105),
    ("Feb 25", 115),
    ("Mar 25", 110),
    ("Apr 25", 108),
    ("May 25", 112),
    ("Jun 25", 118),
];

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard/kpi", get(kpi_handler))
        .route("/dashboard/activities", get(activities_handler))
        .route("/dashboard/alerts", get(alerts_handler))
        .route("/forecast/insights", get(forecast_insights_handler))
        .route("/forecast/revenue", get(forecast_revenue_handler))
        .route("/forecast/targets", get(targets_handler))
        .route("/forecast/recommendations", get(recommendations_handler))
        .route("/revenue/september", get(september_handler))
        .route("/revenue/monthly", get(monthly_handler))
        .route("/revenue/summary", get(revenue_summary_handler))
        .route("/revenue/product/:product_id", get(product_revenue_handler))
        .route("/inventory/stock", get(stock_handler))
        .route("/inventory/product/:product_id", get(product_stock_handler))
        .route("/inventory/low-stock", get(low_stock_handler))
}

fn kpi(value: Value, change: f64, trend: &str) -> Value {
    json!({ "value": value, "change": change, "trend": trend })
}

async fn kpi_handler() -> Json<Value> {
    Json(json!({
        "revenue": kpi(json!(2.1), 10.0, "up"),
        "profit": kpi(json!(0.45), 15.0, "up"),
        "orders": kpi(json!(1234), -5.0, "down"),
        "inventory": kpi(json!(5678), 2.0, "up"),
    }))
}

async fn activities_handler() -> Json<Value> {
    let now = now();

    Json(json!([
        {
            "id": 1,
            "action": "New order #1234",
            "user": "Alex Nguyen",
            "timestamp": now - Duration::minutes(5),
        },
        {
            "id": 2,
            "action": "Updated price quote for product B",
            "user": "Beth Tran",
            "timestamp": now - Duration::minutes(15),
        },
    ]))
}

async fn alerts_handler() -> Json<Value> {
    Json(json!([
        {
            "id": 1,
            "type": "warning",
            "message": "Product A is running low on stock",
            "timestamp": now(),
        },
    ]))
}

async fn forecast_insights_handler() -> Json<Value> {
    Json(json!({
        "q1Forecast": {
            "period": "Q1 2025",
            "growthPercent": 18.5,
            "status": "positive",
            "label": "Positive",
            "message": "Strong growth expected next quarter",
        },
        "peakSeason": {
            "name": "Tet 2025",
            "period": "January to February 2025",
            "expectedGrowth": 35.0,
            "status": "trend",
            "label": "Trend",
            "message": "Sales expected to rise 35% over this period",
        },
        "inventoryWarning": {
            "type": "Inventory",
            "changePercent": -12.0,
            "status": "warning",
            "label": "Warning",
            "message": "Stock-out risk for 3 key products",
        },
    }))
}

async fn forecast_revenue_handler() -> Json<Value> {
    let actual = ACTUAL.iter().map(|(month, value)| {
        json!({ "month": month, "actual": value, "forecast": 0, "type": "actual" })
    });
    let forecast = FORECAST.iter().map(|(month, value)| {
        json!({ "month": month, "actual": 0, "forecast": value, "type": "forecast" })
    });

    Json(json!({ "data": actual.chain(forecast).collect::<Vec<_>>() }))
}

async fn targets_handler() -> Json<Value> {
    Json(json!({
        "targets": [
            { "target": "Q1 2025 revenue", "expected": "180M VND", "probability": 85, "status": "high" },
            { "target": "New customers", "expected": "450 customers", "probability": 78, "status": "high" },
            { "target": "Retention rate", "expected": "92%", "probability": 65, "status": "medium" },
            { "target": "Regional expansion", "expected": "2 branches", "probability": 45, "status": "low" },
        ]
    }))
}

async fn recommendations_handler() -> Json<Value> {
    Json(json!({
        "recommendations": [
            {
                "title": "Increase stock",
                "description": "Order 200 more iPhone 15 Pro units before Tet",
                "priority": "high",
            },
            {
                "title": "Promotion",
                "description": "Run a 15% laptop discount campaign in January",
                "priority": "medium",
            },
            {
                "title": "Staffing",
                "description": "Hire 5 more part-time sales staff",
                "priority": "high",
            },
            {
                "title": "Marketing",
                "description": "Raise the Facebook Ads budget to 30M per month",
                "priority": "medium",
            },
            {
                "title": "Partners",
                "description": "Start working with 3 new suppliers",
                "priority": "low",
            },
        ]
    }))
}

async fn september_handler() -> Json<Value> {
    Json(json!({ "revenue": 2.1, "growth": 10.0, "month": "September", "year": 2024 }))
}

async fn monthly_handler() -> Json<Value> {
    let data: Vec<Value> = MONTHS
        .iter()
        .zip(MONTHLY_REVENUE)
        .map(|(month, revenue)| json!({ "month": month, "revenue": revenue }))
        .collect();

    Json(Value::Array(data))
}

async fn revenue_summary_handler() -> Json<Value> {
    Json(json!({
        "totalRevenue": 18.7,
        "totalExpenses": 12.4,
        "profit": 6.3,
        "profitMargin": 33.7,
        "growthRate": 8.5,
    }))
}

async fn product_revenue_handler(Path(product_id): Path<String>) -> Json<Value> {
    let name = format!("Product {product_id}");

    if product_id == "A" {
        Json(json!({
            "productId": product_id,
            "productName": name,
            "revenue": 0.85,
            "growth": 12.0,
            "month": "September",
        }))
    } else {
        Json(json!({
            "productId": product_id,
            "productName": name,
            "revenue": 0.5,
            "growth": 5.0,
        }))
    }
}

async fn stock_handler() -> Json<Value> {
    Json(json!({
        "totalItems": 5678,
        "lowStockItems": 15,
        "outOfStockItems": 3,
        "value": 125.6,
    }))
}

async fn product_stock_handler(Path(product_id): Path<String>) -> Json<Value> {
    Json(json!({
        "productId": product_id,
        "productName": format!("Product {product_id}"),
        "quantity": 150,
        "minQuantity": 50,
        "status": "in_stock",
        "lastUpdated": now(),
    }))
}

async fn low_stock_handler() -> Json<Value> {
    Json(json!([
        {
            "productId": "A",
            "productName": "Product A",
            "quantity": 45,
            "minQuantity": 50,
            "recommendedOrder": 500,
        },
    ]))
}
