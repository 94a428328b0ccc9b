#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{
        Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::Response,
};
use http_body_util::BodyExt;
use resto_pos_lib::{
    build_router,
    config::AppConfig,
    database::{dto::NewAccount, repository::accounts_repository::AccountsRepository},
    entity::pos_accounts,
    prepare_state,
    state::AppState,
};
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "correct horse battery";

/// 内存数据库 + 已迁移的表 + 初始管理员
pub async fn test_state() -> AppState {
    let mut config = AppConfig::default();
    config.database.url = Some("sqlite::memory:".to_string());
    config.auth.admin_username = Some(ADMIN_USERNAME.to_string());
    config.auth.admin_password = Some(ADMIN_PASSWORD.to_string());
    config.server.public_base_url = "https://menu.example.com".to_string();
    prepare_state(config).await.unwrap()
}

pub async fn test_app() -> (AppState, Router) {
    let state = test_state().await;
    let app = build_router(state.clone());
    (state, app)
}

/// 直接写库创建账户（跳过 PIN 哈希以外的校验）
pub async fn seed_account(state: &AppState, mobile: &str, name: &str) -> pos_accounts::Model {
    AccountsRepository::create_with_defaults(
        &state.db,
        NewAccount {
            mobile_number: mobile.to_string(),
            pin_hash: resto_pos_lib::utils::password::hash_secret("12345678").unwrap(),
            restaurant_name: name.to_string(),
            license_duration_days: 30,
        },
        state.now(),
    )
    .await
    .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// 调用 `POST /rpc/<name>`，返回状态码和 JSON 信封
pub async fn rpc(app: &Router, name: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/rpc/{}", name))
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = body_bytes(response).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// 成功信封中的 data
pub fn data(envelope: &Value) -> &Value {
    assert_eq!(envelope["success"], true, "unexpected failure: {}", envelope);
    &envelope["data"]
}

pub async fn admin_token(app: &Router) -> String {
    let (_, body) = rpc(
        app,
        "admin_login",
        None,
        serde_json::json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
    )
    .await;
    data(&body)["token"].as_str().unwrap().to_string()
}

pub async fn pos_token(app: &Router, mobile: &str, pin: &str) -> String {
    let (_, body) = rpc(
        app,
        "pos_login",
        None,
        serde_json::json!({ "mobile_number": mobile, "pin": pin }),
    )
    .await;
    data(&body)["token"].as_str().unwrap().to_string()
}
