//! HTTP-level tests against the in-memory hosted backend

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use pos_console::{AppState, Config, create_router};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    token: String,
}

async fn app() -> TestApp {
    let config = Config::for_memory();
    let state = AppState::new(&config).await.unwrap();
    let router = create_router(state);
    let token = login(&router, "admin@pos.local", "admin123")
        .await
        .1["token"]
        .as_str()
        .unwrap()
        .to_string();
    TestApp { router, token }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, body)
}

async fn login(router: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    login_from(router, email, password, "198.51.100.7").await
}

async fn login_from(
    router: &Router,
    email: &str,
    password: &str,
    forwarded_for: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", forwarded_for)
        .body(Body::from(json!({"email": email, "password": password}).to_string()))
        .unwrap();
    send(router, request).await
}

impl TestApp {
    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call_as(&self.token, method, uri, body).await
    }

    async fn call_as(
        &self,
        token: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        send(&self.router, request).await
    }

    async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "pos-console");
}

#[tokio::test]
async fn test_login_and_me() {
    let app = app().await;
    let (status, me) = app.call(Method::GET, "/api/auth/me", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "admin");
    assert_eq!(me["role"], "admin");
    assert!(me["lastLogin"].as_i64().is_some());

    let (status, logs) = app.call(Method::GET, "/api/activity?type=auth", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs[0]["action"], "login");
}

#[tokio::test]
async fn test_wrong_password_and_missing_token() {
    let app = app().await;
    let (status, body) = login(&app.router, "admin@pos.local", "nope").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);

    let request = Request::builder().uri("/api/products").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);
}

#[tokio::test]
async fn test_login_rate_limited() {
    let app = app().await;
    // One attempt already spent by the admin login in `app()`
    for _ in 0..4 {
        let (status, _) = login(&app.router, "admin@pos.local", "wrong").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, body) = login(&app.router, "admin@pos.local", "admin123").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], 1008);
}

#[tokio::test]
async fn test_forwarded_header_from_untrusted_peer_does_not_reset_limit() {
    let app = app().await;
    for i in 0..4 {
        let (status, _) =
            login_from(&app.router, "admin@pos.local", "wrong", &format!("203.0.113.{i}")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, _) = login_from(&app.router, "admin@pos.local", "admin123", "203.0.113.99").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_session_follows_stored_profile() {
    let app = app().await;
    let (status, boss) = app
        .call(
            Method::POST,
            "/api/users",
            Some(json!({
                "username": "boss2",
                "fullName": "Second Admin",
                "email": "boss2@shop.test",
                "password": "secret1",
                "role": "admin",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let boss_id = boss["id"].as_str().unwrap().to_string();
    let (_, body) = login(&app.router, "boss2@shop.test", "secret1").await;
    let boss_token = body["token"].as_str().unwrap().to_string();

    let (status, _) = app.call_as(&boss_token, Method::GET, "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);

    // Demoted: the old token no longer carries admin rights
    let (status, _) = app
        .call(Method::PUT, &format!("/api/users/{boss_id}"), Some(json!({"role": "manager"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.call_as(&boss_token, Method::GET, "/api/backups", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2003);
    let (_, me) = app.call_as(&boss_token, Method::GET, "/api/auth/me", None).await;
    assert_eq!(me["role"], "manager");

    // Disabled
    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/api/users/{boss_id}/status"),
            Some(json!({"status": "inactive"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.call_as(&boss_token, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1007);

    // Deleted
    let (status, _) = app.call(Method::DELETE, &format!("/api/users/{boss_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .call_as(
            &boss_token,
            Method::POST,
            "/api/backups",
            Some(json!({"name": "late", "selection": {"settings": true}})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn test_padded_username_update_keeps_names_unique() {
    let app = app().await;
    let (_, maria) = app
        .call(
            Method::POST,
            "/api/users",
            Some(json!({
                "username": "maria",
                "fullName": "Maria",
                "email": "maria@shop.test",
                "password": "secret1",
                "role": "manager",
            })),
        )
        .await;
    let maria_id = maria["id"].as_str().unwrap();

    let (status, renamed) = app
        .call(Method::PUT, &format!("/api/users/{maria_id}"), Some(json!({"username": "  lina  "})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["username"], "lina");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/users",
            Some(json!({
                "username": "lina",
                "fullName": "Lina",
                "email": "lina@shop.test",
                "password": "secret1",
                "role": "manager",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 8102);
}

#[tokio::test]
async fn test_cashier_cannot_sign_in_and_manager_is_not_admin() {
    let app = app().await;
    for (username, role) in [("cash1", "cashier"), ("mgr1", "manager")] {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/users",
                Some(json!({
                    "username": username,
                    "fullName": format!("{username} user"),
                    "email": format!("{username}@shop.test"),
                    "password": "secret1",
                    "role": role,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = login(&app.router, "cash1@shop.test", "secret1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2001);

    let (status, body) = login(&app.router, "mgr1@shop.test", "secret1").await;
    assert_eq!(status, StatusCode::OK);
    let manager_token = body["token"].as_str().unwrap().to_string();

    let (status, _) = app
        .call_as(&manager_token, Method::GET, "/api/products", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .call_as(&manager_token, Method::GET, "/api/backups", None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2003);
    let (status, _) = app
        .call_as(&manager_token, Method::PUT, "/api/settings", Some(json!({"taxRate": 5.0})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .call_as(&manager_token, Method::GET, "/api/settings", None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cannot_disable_or_delete_self() {
    let app = app().await;
    let (_, me) = app.call(Method::GET, "/api/auth/me", None).await;
    let id = me["id"].as_str().unwrap();

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/api/users/{id}/status"),
            Some(json!({"status": "inactive"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2006);

    let (status, _) = app.call(Method::DELETE, &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_product_crud_with_activity_diff() {
    let app = app().await;
    let (status, product) = app
        .call(
            Method::POST,
            "/api/products",
            Some(json!({"name": "Green tea", "sku": "TEA-1", "price": 2.5, "stock": 3, "minStock": 5})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let id = product["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(Method::POST, "/api/products", Some(json!({"name": "Dup", "sku": "tea-1", "price": 1.0})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4004);

    let (status, low) = app.call(Method::GET, "/api/products/low-stock", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(low.as_array().unwrap().len(), 1);

    let (status, updated) = app
        .call(Method::PUT, &format!("/api/products/{id}"), Some(json!({"price": 3.0})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 3.0);
    assert_eq!(updated["name"], "Green tea");

    let (_, logs) = app.call(Method::GET, "/api/activity?type=inventory", None).await;
    let update = logs
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["action"] == "product_updated")
        .unwrap();
    assert_eq!(update["details"]["changes"][0]["field"], "price");
    assert_eq!(update["details"]["changes"][0]["from"], 2.5);
    assert_eq!(update["details"]["changes"][0]["to"], 3.0);

    let (status, body) = app
        .call(Method::POST, &format!("/api/products/{id}/stock"), Some(json!({"delta": -10})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4003);

    let (status, adjusted) = app
        .call(Method::POST, &format!("/api/products/{id}/stock"), Some(json!({"delta": 7})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(adjusted["stock"], 10);

    let (status, body) = app.call(Method::DELETE, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["message"], "Product deleted");
    let (status, body) = app.call(Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);
}

#[tokio::test]
async fn test_validation_errors() {
    let app = app().await;
    let (status, body) = app
        .call(Method::POST, "/api/customers", Some(json!({"name": "  "})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
    assert_eq!(body["details"]["field"], "name");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/employees",
            Some(json!({"name": "Lin", "salary": 100.0, "commissionRate": 150.0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "commissionRate");
}

#[tokio::test]
async fn test_branch_delete_refused_with_employees() {
    let app = app().await;
    let (_, branch) = app
        .call(Method::POST, "/api/branches", Some(json!({"name": "Downtown"})))
        .await;
    let branch_id = branch["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .call(
            Method::POST,
            "/api/employees",
            Some(json!({"name": "Lin", "salary": 1000.0, "branchId": branch_id})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::DELETE, &format!("/api/branches/{branch_id}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7002);

    let (_, staff) = app
        .call(Method::GET, &format!("/api/branches/{branch_id}/employees"), None)
        .await;
    assert_eq!(staff.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_payroll_preview_record_and_duplicate() {
    let app = app().await;
    let (_, employee) = app
        .call(
            Method::POST,
            "/api/employees",
            Some(json!({"name": "Lin", "salary": 1000.0, "commissionRate": 5.0, "allowance": 50.0})),
        )
        .await;
    let id = employee["id"].as_str().unwrap().to_string();
    let request = json!({"month": 3, "year": 2025, "salesAmount": 2000.0, "deduction": 25.0});

    let (status, preview) = app
        .call(Method::POST, &format!("/api/employees/{id}/payroll/preview"), Some(request.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["commission"], 100.0);
    assert_eq!(preview["allowance"], 50.0);
    assert_eq!(preview["netSalary"], 1125.0);

    let (status, record) = app
        .call(Method::POST, &format!("/api/employees/{id}/salaries"), Some(request.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["netSalary"], 1125.0);
    assert_eq!(record["createdBy"], "admin");

    let (status, body) = app
        .call(Method::POST, &format!("/api/employees/{id}/salaries"), Some(request))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 6002);

    let (_, period) = app.call(Method::GET, "/api/salaries?month=3&year=2025", None).await;
    assert_eq!(period.as_array().unwrap().len(), 1);

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/employees/{id}/payroll/preview"),
            Some(json!({"month": 13, "year": 2025})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6003);
}

#[tokio::test]
async fn test_backup_size_matches_download() {
    let app = app().await;
    app.call(Method::POST, "/api/products", Some(json!({"name": "Tea", "price": 2.0})))
        .await;
    app.call(Method::POST, "/api/customers", Some(json!({"name": "Ana"})))
        .await;

    let (status, backup) = app
        .call(
            Method::POST,
            "/api/backups",
            Some(json!({"name": "Before audit", "selection": {"products": true, "customers": true, "settings": true}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backup["type"], "manual");
    assert_eq!(backup["user"], "admin");
    let id = backup["id"].as_str().unwrap();

    let request = Request::builder()
        .uri(format!("/api/backups/{id}/download"))
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("before-audit.json")
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(backup["size"].as_u64().unwrap(), bytes.len() as u64);

    let payload: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(payload.get("products").is_some());
    assert!(payload.get("invoices").is_none());
}

#[tokio::test]
async fn test_empty_backup_selection_rejected() {
    let app = app().await;
    let (status, body) = app
        .call(Method::POST, "/api/backups", Some(json!({"name": "nothing", "selection": {}})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3002);
}

#[tokio::test]
async fn test_restore_customers_only_leaves_other_categories() {
    let app = app().await;
    let (_, customer) = app
        .call(Method::POST, "/api/customers", Some(json!({"name": "Ana", "phone": "111"})))
        .await;
    let (_, product) = app
        .call(Method::POST, "/api/products", Some(json!({"name": "Tea", "price": 2.0})))
        .await;
    let customer_id = customer["id"].as_str().unwrap().to_string();
    let product_id = product["id"].as_str().unwrap().to_string();

    let (_, backup) = app
        .call(
            Method::POST,
            "/api/backups",
            Some(json!({"name": "full", "selection": {"products": true, "customers": true, "invoices": true, "settings": true, "users": true}})),
        )
        .await;
    let backup_id = backup["id"].as_str().unwrap().to_string();

    app.call(Method::PUT, &format!("/api/customers/{customer_id}"), Some(json!({"phone": "999"})))
        .await;
    app.call(Method::PUT, &format!("/api/products/{product_id}"), Some(json!({"price": 4.0})))
        .await;
    app.call(Method::PUT, "/api/settings", Some(json!({"storeName": "Renamed"})))
        .await;

    let (status, report) = app
        .call(
            Method::POST,
            &format!("/api/backups/{backup_id}/restore"),
            Some(json!({"selection": {"customers": true}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["restored"], json!(["customers"]));

    let (_, customer) = app.call(Method::GET, &format!("/api/customers/{customer_id}"), None).await;
    assert_eq!(customer["phone"], "111");
    let (_, product) = app.call(Method::GET, &format!("/api/products/{product_id}"), None).await;
    assert_eq!(product["price"], 4.0);
    let (_, settings) = app.call(Method::GET, "/api/settings", None).await;
    assert_eq!(settings["storeName"], "Renamed");

    let (_, logs) = app.call(Method::GET, "/api/activity?type=backup", None).await;
    let restored = logs
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["action"] == "backup_restored")
        .unwrap();
    assert_eq!(restored["target"], backup_id.as_str());
}

#[tokio::test]
async fn test_delete_backup_then_missing() {
    let app = app().await;
    let (_, backup) = app
        .call(Method::POST, "/api/backups", Some(json!({"name": "tmp", "selection": {"settings": true}})))
        .await;
    let id = backup["id"].as_str().unwrap();
    let (status, _) = app.call(Method::DELETE, &format!("/api/backups/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .call(Method::POST, &format!("/api/backups/{id}/restore"), Some(json!({"selection": {"settings": true}})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 3001);
}

#[tokio::test]
async fn test_empty_table_renders_placeholder() {
    let app = app().await;
    let (status, html) = app.get_text("/console/tables/customers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(html.matches(r#"<tr class="no-data">"#).count(), 1);
    assert!(html.contains(r#"colspan="5""#));

    let (status, html) = app.get_text("/console/tables/users").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<td>admin</td>"));
    assert!(!html.contains("no-data"));

    let (status, _) = app.get_text("/console/tables/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_activity() {
    let app = app().await;
    // Login entry must be strictly older than the cutoff
    tokio::time::sleep(Duration::from_millis(5)).await;
    let (status, body) = app
        .call(Method::DELETE, "/api/activity?older_than_days=0", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);

    let (_, logs) = app.call(Method::GET, "/api/activity", None).await;
    let actions: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|l| l["action"].as_str())
        .collect();
    assert_eq!(actions, vec!["activity_cleared"]);
}

#[tokio::test]
async fn test_dashboard_counts() {
    let app = app().await;
    app.call(Method::POST, "/api/products", Some(json!({"name": "Tea", "price": 2.0, "stock": 1, "minStock": 3})))
        .await;
    let (status, summary) = app.call(Method::GET, "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["users"], 1);
    assert_eq!(summary["products"], 1);
    assert_eq!(summary["lowStockCount"], 1);
    assert_eq!(summary["monthSales"], 0.0);
}
