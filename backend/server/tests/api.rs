use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use server::{app, config::Config, state::AppState, store::MemoryStore};
use tower::ServiceExt;

const SECRET: &str = "integration-secret";

const CSV: &str = "Date,Customer,TransactionType,Revenue,Cost,Product,OrderStatus,Department,Profit,ForecastedRevenue\n\
                   2025-01-10,An,Sale,1000,600,Laptop Pro,Completed,Sales,400,1100\n\
                   2025-01-20,Binh,Sale,500,200,Phone X,Completed,Retail,300,0\n\
                   2025-02-05,Chi,Sale,300,100,Laptop Air,Completed,Sales,200,0\n";

fn router(require_auth: bool) -> Router {
    let mut config = Config::with_secret(SECRET);
    config.require_auth = require_auth;

    let state = AppState::with_store(config, Arc::new(MemoryStore::new())).expect("state");
    app(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };

    (status, body)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let (status, created) = send(app, json_request(Method::POST, uri, body)).await;
    assert!(status.is_success(), "{uri}: {status} {created}");
    created
}

fn names(body: &Value, field: &str) -> Vec<String> {
    body.as_array()
        .into_iter()
        .flatten()
        .filter_map(|item| item[field].as_str().map(str::to_string))
        .collect()
}

fn upload(file_name: &str, content: &str) -> Request<Body> {
    let boundary = "erp-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {content}\r\n\
         --{boundary}--\r\n"
    );

    Request::builder()
        .method(Method::POST)
        .uri("/api/data/upload-csv")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn test_health() {
    let app = router(true);

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_customer_lifecycle() {
    let app = router(false);

    let (status, created) = send(
        &app,
        json_request(
            Method::POST,
            "/api/customers",
            json!({ "name": "Lan", "email": "lan@example.com", "totalSpent": 60000000 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["level"], "gold");

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/customers",
            json!({ "name": "Other", "email": "lan@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = send(
        &app,
        json_request(Method::PUT, "/api/customers/1", json!({ "totalSpent": 90000000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["level"], "diamond");
    assert_eq!(updated["name"], "Lan");

    let (_, listed) = send(&app, get("/api/customers?level=diamond")).await;
    assert_eq!(listed["total"], 1);

    let (_, segments) = send(&app, get("/api/customers/segments")).await;
    assert_eq!(segments["segments"][0], json!({ "segment": "Diamond", "count": 1, "percent": 100 }));

    let (status, deleted) = send(
        &app,
        Request::builder()
            .method(Method::DELETE)
            .uri("/api/customers/1")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Customer deleted successfully");

    let (status, body) = send(&app, get("/api/customers/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Customer not found" }));
}

#[tokio::test]
async fn test_unknown_label_filter_is_rejected() {
    let app = router(false);

    let (status, body) = send(&app, get("/api/customers?level=platinum")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_invoice_payment_settles_status() {
    let app = router(false);

    let (status, invoice) = send(
        &app,
        json_request(
            Method::POST,
            "/api/invoices",
            json!({
                "invoiceNumber": "INV-001",
                "customerId": 7,
                "totalAmount": 1000,
                "paidAmount": 250,
                "status": "sent",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoice["balanceDue"].as_f64(), Some(750.0));
    assert_eq!(invoice["status"], "sent");

    let (_, paid) = send(
        &app,
        json_request(Method::PUT, "/api/invoices/1", json!({ "paidAmount": 1000 })),
    )
    .await;
    assert_eq!(paid["balanceDue"].as_f64(), Some(0.0));
    assert_eq!(paid["status"], "paid");

    let (_, stats) = send(&app, get("/api/invoices/stats")).await;
    assert_eq!(stats["paid"], 1);
    assert_eq!(stats["totalPaid"].as_f64(), Some(1000.0));

    let (_, by_customer) = send(&app, get("/api/invoices/customer/7")).await;
    assert_eq!(by_customer.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_auth_flow() {
    let app = router(true);

    let (status, registered) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/register",
            json!({ "username": "mai", "email": "mai@example.com", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["tokenType"], "Bearer");
    assert_eq!(registered["role"], "USER");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/register",
            json!({ "username": "mai", "email": "other@example.com", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username is already taken");

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            json!({ "usernameOrEmail": "mai", "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, login) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            json!({ "usernameOrEmail": "mai@example.com", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = login["accessToken"].as_str().expect("token").to_string();

    let (status, _) = send(&app, get("/api/customers")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let authed = |uri: &str| {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request")
    };

    let (status, me) = send(&app, authed("/api/auth/me")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "mai");
    assert!(me.get("passwordHash").is_none());

    let (status, customers) = send(&app, authed("/api/customers")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(customers["total"], 0);
}

#[tokio::test]
async fn test_csv_upload_and_analytics() {
    let app = router(false);

    let (status, body) = send(&app, upload("sales.txt", CSV)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only CSV files are allowed");

    let (status, body) = send(&app, upload("sales.csv", CSV)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["recordsImported"], 3);

    let (_, data) = send(&app, get("/api/data/status")).await;
    assert_eq!(data["transactions"], 3);

    let (_, summary) = send(&app, get("/api/transactions/analytics")).await;
    assert_eq!(summary["totalRevenue"].as_f64(), Some(1800.0));
    assert_eq!(summary["transactionCount"], 3);

    let (_, departments) = send(
        &app,
        get("/api/transactions/analytics?type=department_performance&department=sales"),
    )
    .await;
    assert_eq!(departments["type"], "department_performance");
    assert_eq!(departments["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(departments["data"][0]["revenue"].as_f64(), Some(1300.0));

    let (_, monthly) = send(
        &app,
        get("/api/transactions/analytics?type=monthly_trend&startDate=2025-01-01&endDate=2025-01-31"),
    )
    .await;
    assert_eq!(monthly["data"][0]["name"], "2025-01");
    assert_eq!(monthly["data"].as_array().map(Vec::len), Some(1));

    let (status, _) = send(
        &app,
        Request::builder()
            .method(Method::DELETE)
            .uri("/api/data/clear")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, data) = send(&app, get("/api/data/status")).await;
    assert_eq!(data["transactions"], 0);
}

#[tokio::test]
async fn test_report_is_completed_on_create() {
    let app = router(false);

    let (status, report) = send(
        &app,
        json_request(
            Method::POST,
            "/api/reports",
            json!({ "name": "January sales", "type": "sales" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(report["status"], "completed");

    let (_, types) = send(&app, get("/api/reports/types")).await;
    assert_eq!(types, json!({ "types": { "sales": 1 } }));
}

#[tokio::test]
async fn test_mock_figures() {
    let app = router(false);

    let (_, kpi) = send(&app, get("/api/dashboard/kpi")).await;
    assert_eq!(kpi["orders"]["value"], 1234);
    assert_eq!(kpi["orders"]["trend"], "down");

    let (_, forecast) = send(&app, get("/api/forecast/revenue")).await;
    assert_eq!(forecast["data"].as_array().map(Vec::len), Some(12));

    let (_, product) = send(&app, get("/api/revenue/product/A")).await;
    assert_eq!(product["revenue"].as_f64(), Some(0.85));

    let (_, other) = send(&app, get("/api/revenue/product/Z")).await;
    assert_eq!(other["growth"].as_f64(), Some(5.0));
    assert!(other.get("month").is_none());
}

#[tokio::test]
async fn test_unknown_ids_answer_not_found() {
    let app = router(false);

    let resources = [
        ("customers", "Customer"),
        ("products", "Product"),
        ("invoices", "Invoice"),
        ("sales-orders", "Sales order"),
        ("purchase-orders", "Purchase order"),
        ("suppliers", "Supplier"),
        ("warehouses", "Warehouse"),
        ("employees", "Employee"),
        ("projects", "Project"),
        ("reports", "Report"),
        ("transactions", "Transaction"),
    ];

    for (path, resource) in resources {
        let uri = format!("/api/{path}/99");
        let (status, body) = send(&app, get(&uri)).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, json!({ "error": format!("{resource} not found") }));
    }

    let (status, _) = send(&app, delete("/api/suppliers/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_stock_levels() {
    let app = router(false);

    for (sku, stock) in [("SKU-0", 0), ("SKU-9", 9), ("SKU-10", 10)] {
        let (status, product) = send(
            &app,
            json_request(
                Method::POST,
                "/api/products",
                json!({ "sku": sku, "name": "Laptop", "price": 1500, "stock": stock }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(product["status"], "active");
    }

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/products",
            json!({ "sku": "SKU-9", "name": "Other" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().is_some());

    let (_, stats) = send(&app, get("/api/products/stats")).await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["lowStock"], 1);
    assert_eq!(stats["outOfStock"], 1);

    let (_, listed) = send(&app, get("/api/products")).await;
    assert_eq!(listed["total"], 3);

    let (status, deleted) = send(&app, delete("/api/products/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Product deleted successfully");
}

#[tokio::test]
async fn test_purchase_orders_pending() {
    let app = router(false);

    let late = create(
        &app,
        "/api/purchase-orders",
        json!({ "poNumber": "PO-1", "supplierId": 3, "expectedDate": "2000-01-01" }),
    )
    .await;
    assert_eq!(late["status"], "draft");
    assert_eq!(late["paymentStatus"], "unpaid");

    create(
        &app,
        "/api/purchase-orders",
        json!({
            "poNumber": "PO-2",
            "supplierId": 3,
            "expectedDate": "2000-01-01",
            "status": "received",
        }),
    )
    .await;
    create(
        &app,
        "/api/purchase-orders",
        json!({ "poNumber": "PO-3", "supplierId": 4 }),
    )
    .await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/purchase-orders",
            json!({ "poNumber": "PO-1", "supplierId": 5 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, pending) = send(&app, get("/api/purchase-orders/pending")).await;
    assert_eq!(names(&pending, "poNumber"), ["PO-1"]);

    let (_, by_supplier) = send(&app, get("/api/purchase-orders/supplier/3")).await;
    assert_eq!(names(&by_supplier, "poNumber"), ["PO-1", "PO-2"]);

    let (_, received) = send(
        &app,
        json_request(
            Method::PUT,
            "/api/purchase-orders/1",
            json!({ "status": "received", "receivedDate": "2000-01-05" }),
        ),
    )
    .await;
    assert_eq!(received["status"], "received");
    assert_eq!(received["poNumber"], "PO-1");

    let (_, pending) = send(&app, get("/api/purchase-orders/pending")).await;
    assert_eq!(pending, json!([]));
}

#[tokio::test]
async fn test_sales_orders() {
    let app = router(false);

    let order = create(
        &app,
        "/api/sales-orders",
        json!({ "orderNumber": "SO-1", "customerId": 7, "grandTotal": 1200 }),
    )
    .await;
    assert_eq!(order["status"], "pending");
    create(
        &app,
        "/api/sales-orders",
        json!({ "orderNumber": "SO-2", "customerId": 8, "grandTotal": 300, "status": "cancelled" }),
    )
    .await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/sales-orders",
            json!({ "orderNumber": "SO-1", "customerId": 9 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, stats) = send(&app, get("/api/sales-orders/stats")).await;
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["cancelled"], 1);
    assert_eq!(stats["totalRevenue"].as_f64(), Some(1200.0));

    let (_, by_customer) = send(&app, get("/api/sales-orders/customer/7")).await;
    assert_eq!(names(&by_customer, "orderNumber"), ["SO-1"]);

    let (status, body) = send(&app, delete("/api/sales-orders/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_supplier_rankings() {
    let app = router(false);

    let suppliers = [
        ("An Phat", "active", "excellent", 500),
        ("Binh Minh", "active", "good", 900),
        ("Cuu Long", "blocked", "excellent", 2000),
        ("Dong A", "active", "poor", 100),
    ];
    for (name, status, rating, purchased) in suppliers {
        create(
            &app,
            "/api/suppliers",
            json!({
                "name": name,
                "status": status,
                "rating": rating,
                "totalPurchased": purchased,
            }),
        )
        .await;
    }

    let (_, top) = send(&app, get("/api/suppliers/top?limit=2")).await;
    assert_eq!(names(&top, "name"), ["Binh Minh", "An Phat"]);

    let (_, preferred) = send(&app, get("/api/suppliers/preferred")).await;
    assert_eq!(names(&preferred, "name"), ["An Phat", "Binh Minh"]);

    let (_, stats) = send(&app, get("/api/suppliers/stats")).await;
    assert_eq!(stats["active"], 3);
    assert_eq!(stats["blocked"], 1);
}

#[tokio::test]
async fn test_warehouse_utilization() {
    let app = router(false);

    create(
        &app,
        "/api/warehouses",
        json!({ "warehouseCode": "WH-1", "name": "Ha Noi", "currentStock": 50 }),
    )
    .await;

    let (_, stats) = send(&app, get("/api/warehouses/stats")).await;
    assert_eq!(stats["totalCapacity"], 0);
    assert_eq!(stats["utilizationPercent"].as_f64(), Some(0.0));

    create(
        &app,
        "/api/warehouses",
        json!({
            "warehouseCode": "WH-2",
            "name": "Da Nang",
            "capacity": 200,
            "currentStock": 50,
        }),
    )
    .await;
    create(
        &app,
        "/api/warehouses",
        json!({
            "warehouseCode": "WH-3",
            "name": "Hue",
            "capacity": 1000,
            "currentStock": 900,
            "status": "inactive",
        }),
    )
    .await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/warehouses",
            json!({ "warehouseCode": "WH-2", "name": "Copy" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, stats) = send(&app, get("/api/warehouses/stats")).await;
    assert_eq!(stats["active"], 2);
    assert_eq!(stats["inactive"], 1);
    assert_eq!(stats["totalStock"], 100);
    assert_eq!(stats["utilizationPercent"].as_f64(), Some(50.0));

    let (_, active) = send(&app, get("/api/warehouses/active")).await;
    assert_eq!(names(&active, "warehouseCode").len(), 2);
}

#[tokio::test]
async fn test_employee_departments() {
    let app = router(false);

    let staff = [
        ("EMP-1", "Sales", "active"),
        ("EMP-2", "Sales", "on-leave"),
        ("EMP-3", "Marketing", "active"),
    ];
    for (id, department, status) in staff {
        create(
            &app,
            "/api/employees",
            json!({
                "employeeId": id,
                "firstName": "Hoa",
                "lastName": "Tran",
                "department": department,
                "status": status,
            }),
        )
        .await;
    }

    let (_, departments) = send(&app, get("/api/employees/departments")).await;
    assert_eq!(departments, json!(["Marketing", "Sales"]));

    let (_, count) = send(&app, get("/api/employees/department/Sales/count")).await;
    assert_eq!(count, json!({ "department": "Sales", "count": 1 }));

    let (_, listed) = send(&app, get("/api/employees?department=Sales")).await;
    assert_eq!(names(&listed, "employeeId"), ["EMP-1", "EMP-2"]);

    let (_, stats) = send(&app, get("/api/employees/stats")).await;
    assert_eq!(stats["onLeave"], 1);
}

#[tokio::test]
async fn test_project_statuses() {
    let app = router(false);

    create(&app, "/api/projects", json!({ "name": "Rollout", "status": "in_progress" })).await;
    create(&app, "/api/projects", json!({ "name": "Training" })).await;
    create(&app, "/api/projects", json!({ "name": "Audit" })).await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/projects",
            json!({ "name": "Late", "startDate": "2025-05-10", "endDate": "2025-05-01" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stats) = send(&app, get("/api/projects/stats")).await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["planning"], 2);
    assert_eq!(stats["statuses"], json!(["planning", "in_progress"]));
}

#[tokio::test]
async fn test_analytics_past_decimal_range() {
    let app = router(false);
    let csv = "Date,Customer,TransactionType,Revenue,Cost,Product,OrderStatus,Department,Profit,ForecastedRevenue\n\
               2025-01-10,An,Sale,50000000000000000000000000000,0,Laptop,Completed,Sales,0,0\n\
               2025-01-11,Binh,Sale,50000000000000000000000000000,0,Laptop,Completed,Sales,0,0\n";

    let (status, _) = send(&app, upload("huge.csv", csv)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/api/transactions/analytics")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Totals exceed the supported numeric range");
}

#[tokio::test]
async fn test_recent_windows_past_the_calendar() {
    let app = router(false);
    create(&app, "/api/reports", json!({ "name": "Q1", "type": "sales" })).await;

    for path in ["invoices", "sales-orders", "purchase-orders"] {
        let uri = format!("/api/{path}/recent?days=100000000");
        let (status, body) = send(&app, get(&uri)).await;

        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body, json!([]));
    }

    let (status, body) = send(&app, get("/api/reports/recent?days=9223372036854775807")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reports"].as_array().map(Vec::len), Some(1));
}
