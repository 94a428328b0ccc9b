mod common;

use axum::http::{
    StatusCode,
    header::{CONTENT_DISPOSITION, CONTENT_TYPE},
};
use common::{admin_token, body_bytes, data, get, pos_token, rpc, seed_account, test_app};
use serde_json::json;

const MOBILE: &str = "9876543210";
const PIN: &str = "12345678";

/// 管理员创建账户并返回账户 ID
async fn create_account(app: &axum::Router, admin: &str, mobile: &str, name: &str) -> String {
    let (_, body) = rpc(
        app,
        "create_pos_account",
        Some(admin),
        json!({ "mobile_number": mobile, "pin": PIN, "restaurant_name": name }),
    )
    .await;
    data(&body)["account_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_database() {
    let (_, app) = test_app().await;
    let response = get(&app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn procedures_require_a_token() {
    let (_, app) = test_app().await;

    let (status, body) = rpc(&app, "get_pos_accounts", None, json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Unauthorized");

    let (status, _) = rpc(&app, "get_pos_accounts", Some("made-up"), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_credentials_are_reported_failures() {
    let (_, app) = test_app().await;

    let (status, body) = rpc(
        &app,
        "admin_login",
        None,
        json!({ "username": "root", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid username or password");

    let (status, body) = rpc(
        &app,
        "pos_login",
        None,
        json!({ "mobile_number": MOBILE, "pin": PIN }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Invalid mobile number or PIN");
}

#[tokio::test]
async fn malformed_payload_is_bad_request() {
    let (_, app) = test_app().await;
    let (status, body) = rpc(&app, "admin_login", None, json!({ "username": 42 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let (_, app) = test_app().await;
    let (status, body) = rpc(&app, "drop_all_tables", None, json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn account_creation_validates_input() {
    let (_, app) = test_app().await;
    let admin = admin_token(&app).await;

    let (status, body) = rpc(
        &app,
        "create_pos_account",
        Some(&admin),
        json!({ "mobile_number": "12345", "pin": PIN, "restaurant_name": "Spice Garden" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Mobile number must be exactly 10 digits");

    let (_, body) = rpc(
        &app,
        "create_pos_account",
        Some(&admin),
        json!({ "p_mobile_number": MOBILE, "p_pin": "1234", "p_restaurant_name": "Spice Garden" }),
    )
    .await;
    assert_eq!(body["message"], "PIN must be exactly 8 digits");

    create_account(&app, &admin, MOBILE, "Spice Garden").await;
    let (_, body) = rpc(
        &app,
        "create_pos_account",
        Some(&admin),
        json!({ "mobile_number": MOBILE, "pin": PIN, "restaurant_name": "Copy Cat" }),
    )
    .await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "An account with this mobile number already exists"
    );
}

#[tokio::test]
async fn pos_tokens_cannot_reach_admin_or_other_accounts() {
    let (_, app) = test_app().await;
    let admin = admin_token(&app).await;
    let own = create_account(&app, &admin, MOBILE, "Spice Garden").await;
    let other = create_account(&app, &admin, "9000000002", "Blue Cafe").await;
    let token = pos_token(&app, MOBILE, PIN).await;

    let (status, _) = rpc(&app, "get_pos_accounts", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = rpc(
        &app,
        "list_menu_items",
        Some(&token),
        json!({ "account_id": other }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = rpc(
        &app,
        "get_categories",
        Some(&token),
        json!({ "account_id": own }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body).as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn disabling_an_account_blocks_login_and_revokes_sessions() {
    let (_, app) = test_app().await;
    let admin = admin_token(&app).await;
    let account_id = create_account(&app, &admin, MOBILE, "Spice Garden").await;
    let token = pos_token(&app, MOBILE, PIN).await;

    let (_, body) = rpc(
        &app,
        "toggle_pos_account_status",
        Some(&admin),
        json!({ "account_id": account_id }),
    )
    .await;
    assert_eq!(data(&body)["new_status"], "disabled");

    let (status, _) = rpc(
        &app,
        "get_orders",
        Some(&token),
        json!({ "account_id": account_id }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = rpc(
        &app,
        "pos_login",
        None,
        json!({ "mobile_number": MOBILE, "pin": PIN }),
    )
    .await;
    assert_eq!(body["message"], "Account is disabled");
}

#[tokio::test]
async fn order_flow_through_the_router() {
    let (_, app) = test_app().await;
    let admin = admin_token(&app).await;
    let account_id = create_account(&app, &admin, MOBILE, "Spice Garden").await;
    let token = pos_token(&app, MOBILE, PIN).await;

    let (_, body) = rpc(
        &app,
        "upsert_menu_item",
        Some(&token),
        json!({ "account_id": account_id, "name": "Masala Dosa", "price": 80, "category": "Mains" }),
    )
    .await;
    let item_id = data(&body)["id"].as_str().unwrap().to_string();

    let (_, body) = rpc(
        &app,
        "upsert_menu_item",
        Some(&token),
        json!({ "account_id": account_id, "item_id": item_id, "name": "Masala Dosa", "price": 0, "category": "Mains" }),
    )
    .await;
    assert_eq!(body["message"], "Price must be greater than 0");

    let (_, body) = rpc(
        &app,
        "create_order",
        Some(&token),
        json!({
            "account_id": account_id,
            "items": [{ "item_name": "Masala Dosa", "quantity": 2, "unit_price": 80 }],
            "payment_method": "upi",
            "total_amount": 200
        }),
    )
    .await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Order total does not match item totals");

    let (_, body) = rpc(
        &app,
        "create_order",
        Some(&token),
        json!({
            "account_id": account_id,
            "items": [{ "name": "Masala Dosa", "quantity": 2, "price": 80 }],
            "payment_method": "upi",
            "total_amount": 160
        }),
    )
    .await;
    let order = data(&body);
    let order_id = order["id"].as_str().unwrap().to_string();
    let order_number = order["order_number"].as_str().unwrap().to_string();
    assert!(order_number.starts_with("ORD-"));
    assert!(order_number.ends_with("-0001"));
    assert_eq!(order["items"].as_array().unwrap().len(), 1);

    let (_, body) = rpc(
        &app,
        "create_order",
        Some(&token),
        json!({
            "account_id": account_id,
            "items": [{ "item_name": "Masala Dosa", "quantity": 1, "unit_price": 80 }],
            "payment_method": "cash",
            "total_amount": 80,
            "order_number": order_number
        }),
    )
    .await;
    assert_eq!(body["message"], "Order number already exists");

    let (_, body) = rpc(
        &app,
        "get_orders",
        Some(&token),
        json!({ "account_id": account_id }),
    )
    .await;
    assert_eq!(data(&body).as_array().unwrap().len(), 1);

    let (_, body) = rpc(
        &app,
        "get_sales_overview",
        Some(&token),
        json!({ "account_id": account_id }),
    )
    .await;
    let overview = data(&body);
    assert_eq!(overview["period"]["today"]["orders"], 1);
    assert_eq!(overview["period"]["today"]["revenue"], 160.0);
    assert_eq!(overview["last_7_days"].as_array().unwrap().len(), 7);
    assert_eq!(overview["payment_methods"][0]["method"], "upi");

    let (_, body) = rpc(
        &app,
        "get_item_sales",
        Some(&token),
        json!({ "account_id": account_id, "days": 7 }),
    )
    .await;
    assert_eq!(data(&body)[0]["item_name"], "Masala Dosa");
    assert_eq!(data(&body)[0]["quantity_sold"], 2);

    let (_, body) = rpc(
        &app,
        "get_account_full_details",
        Some(&admin),
        json!({ "account_id": account_id }),
    )
    .await;
    let details = data(&body);
    assert_eq!(details["telemetry"]["total_orders"], 1);
    assert!(details["account"].get("pin_hash").is_none());

    let (_, body) = rpc(
        &app,
        "get_account_analytics",
        Some(&admin),
        json!({ "account_id": account_id, "days": 7 }),
    )
    .await;
    let analytics = data(&body);
    assert_eq!(analytics["summary"]["total_orders"], 1);
    assert_eq!(analytics["summary"]["unique_items_sold"], 1);
    assert_eq!(analytics["daily_sales"].as_array().unwrap().len(), 7);

    // 收据导出
    let response = get(
        &app,
        &format!("/export/orders/{}/receipt.pdf", order_id),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
    assert!(body_bytes(response).await.starts_with(b"%PDF"));
}

#[tokio::test]
async fn payment_method_edits_follow_the_edit_mode() {
    let (_, app) = test_app().await;
    let admin = admin_token(&app).await;
    let account_id = create_account(&app, &admin, MOBILE, "Spice Garden").await;
    let token = pos_token(&app, MOBILE, PIN).await;

    let (_, body) = rpc(
        &app,
        "create_order",
        Some(&token),
        json!({
            "account_id": account_id,
            "items": [{ "item_name": "Tea", "quantity": 1, "unit_price": 10 }],
            "payment_method": "cash",
            "total_amount": 10
        }),
    )
    .await;
    let order_id = data(&body)["id"].as_str().unwrap().to_string();

    // 默认 time_limited 30 分钟
    let (_, body) = rpc(
        &app,
        "can_edit_order",
        Some(&token),
        json!({ "account_id": account_id, "order_id": order_id }),
    )
    .await;
    assert_eq!(data(&body)["can_edit"], true);

    let (_, body) = rpc(
        &app,
        "upsert_admin_setting",
        Some(&admin),
        json!({ "key": "order_edit_mode", "value": "sometimes" }),
    )
    .await;
    assert_eq!(body["success"], false);

    let (_, body) = rpc(
        &app,
        "upsert_admin_setting",
        Some(&admin),
        json!({ "key": "order_edit_mode", "value": "off" }),
    )
    .await;
    assert_eq!(data(&body)["setting_value"], "off");

    let (_, body) = rpc(
        &app,
        "update_order_payment_method",
        Some(&token),
        json!({ "account_id": account_id, "order_id": order_id, "payment_method": "card" }),
    )
    .await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Order editing is disabled");

    // POS 令牌声称是管理员无效
    let (_, body) = rpc(
        &app,
        "update_order_payment_method",
        Some(&token),
        json!({ "account_id": account_id, "order_id": order_id, "payment_method": "card", "is_admin": true }),
    )
    .await;
    assert_eq!(body["success"], false);

    let (_, body) = rpc(
        &app,
        "update_order_payment_method",
        Some(&admin),
        json!({ "account_id": account_id, "order_id": order_id, "payment_method": "card", "is_admin": true }),
    )
    .await;
    assert_eq!(data(&body)["payment_method"], "card");
}

#[tokio::test]
async fn public_menu_is_served_as_html() {
    let (state, app) = test_app().await;
    let account = seed_account(&state, MOBILE, "Spice <Garden>").await;
    let token = pos_token(&app, MOBILE, PIN).await;

    rpc(
        &app,
        "upsert_menu_item",
        Some(&token),
        json!({ "account_id": account.id, "name": "Masala Dosa", "price": 80, "category": "Mains" }),
    )
    .await;

    let (_, body) = rpc(
        &app,
        "initialize_digital_menu",
        Some(&token),
        json!({ "account_id": account.id, "restaurant_name": "Spice Garden" }),
    )
    .await;
    let init = data(&body);
    assert_eq!(init["created"], true);
    assert_eq!(init["public_url"], "https://menu.example.com/menu/spice-garden");

    let (_, body) = rpc(
        &app,
        "update_menu_theme",
        Some(&token),
        json!({ "account_id": account.id, "theme_name": "neon" }),
    )
    .await;
    assert_eq!(body["message"], "Unknown theme: neon");

    let (_, body) = rpc(
        &app,
        "update_menu_theme",
        Some(&token),
        json!({ "account_id": account.id, "theme_name": "classic", "custom_colors": { "primary": "#123456" } }),
    )
    .await;
    assert_eq!(data(&body)["theme_name"], "classic");

    let response = get(&app, "/menu/spice-garden?q=dosa", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Spice &lt;Garden&gt;"));
    assert!(html.contains("Masala Dosa"));
    assert!(html.contains("₹80"));
    assert!(html.contains("--menu-primary:#123456"));

    let (_, body) = rpc(&app, "get_public_menu", None, json!({ "slug": "spice-garden" })).await;
    assert_eq!(data(&body)["menu_items"].as_array().unwrap().len(), 1);

    let response = get(&app, "/export/menu-qr.svg", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "image/svg+xml");

    let (_, body) = rpc(
        &app,
        "set_digital_menu_active",
        Some(&token),
        json!({ "account_id": account.id, "is_active": false }),
    )
    .await;
    assert_eq!(data(&body)["qr_code_generated"], true);

    let response = get(&app, "/menu/spice-garden", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (_, body) = rpc(&app, "get_public_menu", None, json!({ "slug": "spice-garden" })).await;
    assert_eq!(body["message"], "Menu not found or inactive");
}

#[tokio::test]
async fn list_menu_themes_is_public() {
    let (_, app) = test_app().await;
    let (_, body) = rpc(&app, "list_menu_themes", None, json!({})).await;
    let themes = data(&body).as_array().unwrap();
    assert_eq!(themes.len(), 10);
    assert_eq!(themes[0]["name"], "modern");
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let (_, app) = test_app().await;
    let admin = admin_token(&app).await;

    let (_, body) = rpc(&app, "logout", Some(&admin), json!({})).await;
    assert_eq!(data(&body)["logged_out"], true);

    let (status, _) = rpc(&app, "get_admin_settings", Some(&admin), json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// 创建账户、登录并下一单，返回 (管理员令牌, POS 令牌, 账户 ID)
async fn account_with_order(app: &axum::Router) -> (String, String, String) {
    let admin = admin_token(app).await;
    let account_id = create_account(app, &admin, MOBILE, "Spice Garden").await;
    let token = pos_token(app, MOBILE, PIN).await;

    rpc(
        app,
        "upsert_menu_item",
        Some(&token),
        json!({ "account_id": account_id, "name": "Masala Dosa", "price": 80, "category": "Mains" }),
    )
    .await;
    let (_, body) = rpc(
        app,
        "create_order",
        Some(&token),
        json!({
            "account_id": account_id,
            "items": [{ "item_name": "Masala Dosa", "quantity": 2, "unit_price": 80 }],
            "payment_method": "card",
            "total_amount": 160
        }),
    )
    .await;
    data(&body);
    (admin, token, account_id)
}

#[tokio::test]
async fn every_export_route_returns_a_pdf() {
    let (_, app) = test_app().await;
    let (_, token, _) = account_with_order(&app).await;

    let uris = [
        "/export/reports/daily.pdf",
        "/export/reports/daily.pdf?date=2025-06-04",
        "/export/reports/weekly.pdf",
        "/export/reports/weekly.pdf?date=2025-06-04",
        "/export/reports/monthly.pdf",
        "/export/reports/monthly.pdf?year=2024&month=2",
        "/export/reports/yearly.pdf",
        "/export/reports/yearly.pdf?year=2024",
        "/export/reports/payment-methods.pdf",
        "/export/reports/payment-methods.pdf?start=2025-01-01&end=2025-12-31",
        "/export/reports/item-wise.pdf",
        "/export/reports/item-wise.pdf?start=2025-06-01&end=2025-06-01",
        "/export/menu.pdf",
    ];
    for uri in uris {
        let response = get(&app, uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf", "{}", uri);
        assert!(
            response.headers()[CONTENT_DISPOSITION]
                .to_str()
                .unwrap()
                .starts_with("attachment"),
            "{}",
            uri
        );
        assert!(body_bytes(response).await.starts_with(b"%PDF"), "{}", uri);
    }
}

#[tokio::test]
async fn admins_export_with_an_explicit_account() {
    let (_, app) = test_app().await;
    let (admin, _, account_id) = account_with_order(&app).await;

    let response = get(
        &app,
        &format!("/export/reports/daily.pdf?account_id={}", account_id),
        Some(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");

    let response = get(&app, "/export/reports/daily.pdf", Some(&admin)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/export/menu.pdf", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_export_queries_are_rejected() {
    let (_, app) = test_app().await;
    let (_, token, _) = account_with_order(&app).await;

    let uris = [
        "/export/reports/monthly.pdf?year=2025&month=13",
        "/export/reports/monthly.pdf?year=2025&month=0",
        "/export/reports/payment-methods.pdf?start=2025-06-10&end=2025-06-01",
        "/export/reports/item-wise.pdf?start=2025-06-10&end=2025-06-01",
        "/export/reports/daily.pdf?date=yesterday",
        // 所在周的周六超出日期范围
        "/export/reports/weekly.pdf?date=%2B262142-12-31",
    ];
    for uri in uris {
        let response = get(&app, uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["success"], false, "{}", uri);
    }

    // 服务仍可用
    let response = get(&app, "/export/reports/weekly.pdf", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn license_durations_are_bounded() {
    let (_, app) = test_app().await;
    let admin = admin_token(&app).await;

    let (status, body) = rpc(
        &app,
        "create_pos_account",
        Some(&admin),
        json!({
            "mobile_number": MOBILE,
            "pin": PIN,
            "restaurant_name": "Spice Garden",
            "license_duration_days": 200_000_000_000_000i64
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "License duration must be at most 36500 days"
    );

    let account_id = create_account(&app, &admin, MOBILE, "Spice Garden").await;
    let (_, body) = rpc(
        &app,
        "extend_pos_license",
        Some(&admin),
        json!({ "account_id": account_id, "days": i64::MAX }),
    )
    .await;
    assert_eq!(body["message"], "Days must be at most 36500 days");

    let (_, body) = rpc(
        &app,
        "extend_pos_license",
        Some(&admin),
        json!({ "account_id": account_id, "days": 36_500 }),
    )
    .await;
    assert!(data(&body)["days_remaining"].as_i64().unwrap() > 36_500);
}
