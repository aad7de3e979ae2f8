use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;

use lmgfood::{api::router, state::AppState};
use serde_json::{Value, json};
use tempfile::tempdir;
use tower::ServiceExt;

fn test_app() -> (Router, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let state = AppState::new(dir.path()).unwrap();
    (router(state), dir)
}

async fn body_json(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    (status, body_json(res).await)
}

async fn post(app: &Router, uri: &str, body: Value) -> Value {
    let (status, v) = send(app, Method::POST, uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "POST {uri}: {v}");
    v
}

struct Seed {
    city_id: u64,
    client_id: u64,
    restaurant_id: u64,
    product_id: u64,
}

async fn seed(app: &Router) -> Seed {
    let province = post(app, "/estados", json!({"name": "Minas Gerais"})).await;
    let city = post(
        app,
        "/cidades",
        json!({"name": "Uberlandia", "province_id": province["id"]}),
    )
    .await;
    let kitchen = post(app, "/cozinhas", json!({"name": "Brasileira"})).await;
    let client = post(
        app,
        "/usuarios",
        json!({"name": "Ana", "email": "ana@lmgfood.com.br", "password": "s3cret"}),
    )
    .await;
    let restaurant = post(
        app,
        "/restaurantes",
        json!({
            "name": "Tuk Tuk",
            "freight_fee": "5.00",
            "kitchen_id": kitchen["id"],
            "address": {
                "zip_code": "38400-000",
                "street": "Rua Floriano Peixoto",
                "number": "500",
                "city_id": city["id"]
            }
        }),
    )
    .await;
    let restaurant_id = restaurant["id"].as_u64().unwrap();
    let product = post(
        app,
        &format!("/restaurantes/{restaurant_id}/produtos"),
        json!({"name": "Pao de queijo", "description": "porcao", "price": "2.50"}),
    )
    .await;

    Seed {
        city_id: city["id"].as_u64().unwrap(),
        client_id: client["id"].as_u64().unwrap(),
        restaurant_id,
        product_id: product["id"].as_u64().unwrap(),
    }
}

async fn place_order(app: &Router, seed: &Seed) -> String {
    let order = post(
        app,
        "/pedidos",
        json!({
            "client_id": seed.client_id,
            "restaurant_id": seed.restaurant_id,
            "delivery_address": {
                "zip_code": "38400-100",
                "street": "Avenida Rondon Pacheco",
                "number": "1200",
                "district": "Tabajaras",
                "city_id": seed.city_id
            },
            "lines": [{"product_id": seed.product_id, "quantity": 3, "note": "bem quente"}]
        }),
    )
    .await;
    order["code"].as_str().unwrap().to_string()
}

fn problem_type(v: &Value) -> &str {
    v["type"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn order_lifecycle_confirm_then_deliver() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;
    let code = place_order(&app, &seed).await;

    let (status, order) = send(&app, Method::GET, &format!("/pedidos/{code}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "CREATED");
    assert_eq!(order["subtotal"], "7.50");
    assert_eq!(order["total"], "12.50");
    assert_eq!(order["lines"][0]["product_name"], "Pao de queijo");
    assert_eq!(order["delivery_address"]["city"]["province"], "Minas Gerais");

    let (status, _) = send(&app, Method::POST, &format!("/pedidos/{code}/confirmacao"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::PUT, &format!("/pedidos/{code}/entregua"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, problem) =
        send(&app, Method::PUT, &format!("/pedidos/{code}/entregua"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(problem_type(&problem).ends_with("/invalid-state-transition"));
    assert_eq!(problem["status"], 409);

    let (_, order) = send(&app, Method::GET, &format!("/pedidos/{code}"), None).await;
    assert_eq!(order["status"], "DELIVERED");
    assert!(order["confirmed_at"].is_string());
    assert!(order["delivered_at"].is_string());
    assert!(order["cancelled_at"].is_null());
}

#[tokio::test]
async fn cancelled_order_cannot_be_confirmed() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;
    let code = place_order(&app, &seed).await;

    let (status, _) =
        send(&app, Method::PUT, &format!("/pedidos/{code}/cancelamento"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, problem) =
        send(&app, Method::PUT, &format!("/pedidos/{code}/confirmacao"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(problem["detail"].as_str().unwrap().contains("CANCELLED"));

    let (_, order) = send(&app, Method::GET, &format!("/pedidos/{code}"), None).await;
    assert_eq!(order["status"], "CANCELLED");
    assert!(order["confirmed_at"].is_null());
}

#[tokio::test]
async fn unknown_order_code_is_not_found() {
    let (app, _tmp) = test_app();
    for (method, uri) in [
        (Method::GET, "/pedidos/nope"),
        (Method::POST, "/pedidos/nope/confirmacao"),
        (Method::PUT, "/pedidos/nope/cancelamento"),
        (Method::PUT, "/pedidos/nope/entregua"),
    ] {
        let (status, problem) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(problem_type(&problem).ends_with("/entity-not-found"));
        assert!(problem["detail"].as_str().unwrap().contains("nope"));
    }
}

#[tokio::test]
async fn concurrent_confirmations_succeed_once() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;
    let code = place_order(&app, &seed).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            let uri = format!("/pedidos/{code}/confirmacao");
            tokio::spawn(async move { send(&app, Method::POST, &uri, None).await.0 })
        })
        .collect();
    let statuses: Vec<StatusCode> = futures_util::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let ok = statuses.iter().filter(|s| **s == StatusCode::NO_CONTENT).count();
    let conflicts = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!(ok, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn order_for_missing_product_is_business_rule() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;

    let (status, problem) = send(
        &app,
        Method::POST,
        "/pedidos",
        Some(json!({
            "client_id": seed.client_id,
            "restaurant_id": seed.restaurant_id,
            "delivery_address": {
                "zip_code": "38400-100",
                "street": "Avenida Rondon Pacheco",
                "number": "1200",
                "city_id": seed.city_id
            },
            "lines": [{"product_id": 999, "quantity": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/business-rule"));
}

#[tokio::test]
async fn order_without_lines_is_invalid_data() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;

    let (status, problem) = send(
        &app,
        Method::POST,
        "/pedidos",
        Some(json!({
            "client_id": seed.client_id,
            "restaurant_id": seed.restaurant_id,
            "delivery_address": {
                "zip_code": "",
                "street": "Avenida Rondon Pacheco",
                "number": "1200",
                "city_id": seed.city_id
            },
            "lines": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/invalid-data"));
    let names: Vec<&str> = problem["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["delivery_address.zip_code", "lines"]);
    assert!(problem["userMessage"].is_string());
}

#[tokio::test]
async fn city_in_use_cannot_be_removed() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;

    let (status, problem) =
        send(&app, Method::DELETE, &format!("/cidades/{}", seed.city_id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(problem_type(&problem).ends_with("/entity-in-use"));

    let (status, _) = send(&app, Method::GET, &format!("/cidades/{}", seed.city_id), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unused_city_is_removed() {
    let (app, _tmp) = test_app();
    let province = post(&app, "/estados", json!({"name": "Goias"})).await;
    let city = post(
        &app,
        "/cidades",
        json!({"name": "Catalao", "province_id": province["id"]}),
    )
    .await;
    assert_eq!(city["province"]["name"], "Goias");
    let uri = format!("/cidades/{}", city["id"]);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, problem) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(problem_type(&problem).ends_with("/entity-not-found"));
}

#[tokio::test]
async fn city_with_unknown_province_is_business_rule() {
    let (app, _tmp) = test_app();
    let (status, problem) = send(
        &app,
        Method::POST,
        "/cidades",
        Some(json!({"name": "Nowhere", "province_id": 42})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/business-rule"));
}

#[tokio::test]
async fn unknown_property_is_named_in_detail() {
    let (app, _tmp) = test_app();
    let (status, problem) = send(
        &app,
        Method::POST,
        "/cozinhas",
        Some(json!({"name": "Tailandesa", "spicy": true})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/incomprehensible-message"));
    assert!(problem["detail"].as_str().unwrap().contains("'spicy'"));
}

#[tokio::test]
async fn client_supplied_id_is_rejected() {
    let (app, _tmp) = test_app();
    let (status, problem) = send(
        &app,
        Method::POST,
        "/cozinhas",
        Some(json!({"id": 7, "name": "Tailandesa"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem["detail"].as_str().unwrap().contains("'id'"));
}

#[tokio::test]
async fn wrong_property_type_is_incomprehensible() {
    let (app, _tmp) = test_app();
    let (status, problem) = send(
        &app,
        Method::POST,
        "/cidades",
        Some(json!({"name": "Catalao", "province_id": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/incomprehensible-message"));
    assert!(problem["detail"].as_str().unwrap().contains("province_id"));
}

#[tokio::test]
async fn broken_json_is_incomprehensible() {
    let (app, _tmp) = test_app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/cozinhas")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let problem = body_json(res).await;
    assert!(problem_type(&problem).ends_with("/incomprehensible-message"));
}

#[tokio::test]
async fn blank_name_is_invalid_data() {
    let (app, _tmp) = test_app();
    let (status, problem) =
        send(&app, Method::POST, "/estados", Some(json!({"name": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/invalid-data"));
    assert_eq!(problem["fields"][0]["name"], "name");
    assert!(problem["fields"][0]["userMessage"].is_string());
}

#[tokio::test]
async fn non_numeric_path_id_is_invalid_parameter() {
    let (app, _tmp) = test_app();
    let (status, problem) = send(&app, Method::GET, "/cozinhas/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/invalid-parameter"));
    assert!(problem["detail"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn unknown_route_is_problem_404() {
    let (app, _tmp) = test_app();
    let res = app
        .oneshot(
            Request::builder()
                .uri("/does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.headers().get(CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );
    let problem = body_json(res).await;
    assert!(problem_type(&problem).ends_with("/resource-not-found"));
    assert!(problem["detail"].as_str().unwrap().contains("/does-not-exist"));
}

#[tokio::test]
async fn unsupported_method_is_normalized() {
    let (app, _tmp) = test_app();
    let (status, problem) = send(&app, Method::PATCH, "/estados", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(problem["status"], 405);
    assert_eq!(problem["title"], "Method Not Allowed");
    assert!(problem["timestamp"].is_string());
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (app, _tmp) = test_app();
    post(
        &app,
        "/usuarios",
        json!({"name": "Ana", "email": "ana@lmgfood.com.br", "password": "x1"}),
    )
    .await;
    let (status, problem) = send(
        &app,
        Method::POST,
        "/usuarios",
        Some(json!({"name": "Outra Ana", "email": "ANA@lmgfood.com.br", "password": "x2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/business-rule"));
}

#[tokio::test]
async fn password_change_checks_current_password() {
    let (app, _tmp) = test_app();
    let user = post(
        &app,
        "/usuarios",
        json!({"name": "Ana", "email": "ana@lmgfood.com.br", "password": "old"}),
    )
    .await;
    assert!(user.get("password").is_none());
    let uri = format!("/usuarios/{}/senha", user["id"]);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"current_password": "wrong", "new_password": "new"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"current_password": "old", "new_password": "new"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn restaurant_listing_projections() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;

    let (status, summary) = send(&app, Method::GET, "/restaurantes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary[0]["kitchen"]["name"], "Brasileira");
    assert!(summary[0].get("address").is_none());

    let (_, names) = send(&app, Method::GET, "/restaurantes?projecao=apenas-nome", None).await;
    assert_eq!(names, json!([{"id": seed.restaurant_id, "name": "Tuk Tuk"}]));

    let (_, full) = send(&app, Method::GET, "/restaurantes?projecao=completo", None).await;
    assert_eq!(full[0]["address"]["city"]["name"], "Uberlandia");
    assert_eq!(full[0]["active"], true);
}

#[tokio::test]
async fn inactive_restaurant_takes_no_orders() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/restaurantes/ativacoes",
        Some(json!([seed.restaurant_id])),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, problem) = send(
        &app,
        Method::POST,
        "/pedidos",
        Some(json!({
            "client_id": seed.client_id,
            "restaurant_id": seed.restaurant_id,
            "delivery_address": {
                "zip_code": "38400-100",
                "street": "Avenida Rondon Pacheco",
                "number": "1200",
                "city_id": seed.city_id
            },
            "lines": [{"product_id": seed.product_id, "quantity": 1}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/business-rule"));

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/restaurantes/{}/ativo", seed.restaurant_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    place_order(&app, &seed).await;
}

#[tokio::test]
async fn bulk_activation_with_unknown_id_changes_nothing() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;

    let (status, problem) = send(
        &app,
        Method::DELETE,
        "/restaurantes/ativacoes",
        Some(json!([seed.restaurant_id, 999])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/business-rule"));

    let (_, full) = send(
        &app,
        Method::GET,
        &format!("/restaurantes/{}", seed.restaurant_id),
        None,
    )
    .await;
    assert_eq!(full["active"], true);
}

#[tokio::test]
async fn product_of_another_restaurant_is_not_found() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/restaurantes/{}/produtos/{}", seed.restaurant_id + 1, seed.product_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn put(app: &Router, uri: &str, body: Value) -> Value {
    let (status, v) = send(app, Method::PUT, uri, Some(body)).await;
    assert_eq!(status, StatusCode::OK, "PUT {uri}: {v}");
    v
}

#[tokio::test]
async fn province_and_kitchen_updates_keep_the_id() {
    let (app, _tmp) = test_app();
    let province = post(&app, "/estados", json!({"name": "Minas"})).await;
    let kitchen = post(&app, "/cozinhas", json!({"name": "Tai"})).await;

    let uri = format!("/estados/{}", province["id"]);
    let updated = put(&app, &uri, json!({"name": "Minas Gerais"})).await;
    assert_eq!(updated, json!({"id": province["id"], "name": "Minas Gerais"}));
    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched, updated);

    let uri = format!("/cozinhas/{}", kitchen["id"]);
    let updated = put(&app, &uri, json!({"name": "Tailandesa"})).await;
    assert_eq!(updated, json!({"id": kitchen["id"], "name": "Tailandesa"}));

    let (status, _) = send(
        &app,
        Method::PUT,
        "/estados/999",
        Some(json!({"name": "Nowhere"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn city_update_moves_province_and_checks_it_exists() {
    let (app, _tmp) = test_app();
    let mg = post(&app, "/estados", json!({"name": "Minas Gerais"})).await;
    let go = post(&app, "/estados", json!({"name": "Goias"})).await;
    let city = post(
        &app,
        "/cidades",
        json!({"name": "Araguari", "province_id": mg["id"]}),
    )
    .await;
    let uri = format!("/cidades/{}", city["id"]);

    let moved = put(
        &app,
        &uri,
        json!({"name": "Catalao", "province_id": go["id"]}),
    )
    .await;
    assert_eq!(moved["id"], city["id"]);
    assert_eq!(moved["name"], "Catalao");
    assert_eq!(moved["province"]["name"], "Goias");

    let (status, problem) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"name": "Lost", "province_id": 999})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/business-rule"));

    let (_, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(fetched["name"], "Catalao");
}

#[tokio::test]
async fn user_update_keeps_own_email_and_password() {
    let (app, _tmp) = test_app();
    let ana = post(
        &app,
        "/usuarios",
        json!({"name": "Ana", "email": "ana@lmgfood.com.br", "password": "old"}),
    )
    .await;
    post(
        &app,
        "/usuarios",
        json!({"name": "Bia", "email": "bia@lmgfood.com.br", "password": "x"}),
    )
    .await;
    let uri = format!("/usuarios/{}", ana["id"]);

    let renamed = put(
        &app,
        &uri,
        json!({"name": "Ana Maria", "email": "ana@lmgfood.com.br"}),
    )
    .await;
    assert_eq!(renamed["id"], ana["id"]);
    assert_eq!(renamed["name"], "Ana Maria");
    assert_eq!(renamed["created_at"], ana["created_at"]);
    assert!(renamed.get("password").is_none());

    let (status, problem) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"name": "Ana Maria", "email": "bia@lmgfood.com.br"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/business-rule"));

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("{uri}/senha"),
        Some(json!({"current_password": "old", "new_password": "new"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn restaurant_update_preserves_flags_and_creation_time() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;
    let uri = format!("/restaurantes/{}", seed.restaurant_id);

    let (status, _) = send(&app, Method::PUT, &format!("{uri}/abertura"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &format!("{uri}/inativo"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, before) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(before["open"], true);
    assert_eq!(before["active"], false);

    let updated = put(
        &app,
        &uri,
        json!({
            "name": "Tuk Tuk Thai",
            "freight_fee": "7.00",
            "kitchen_id": before["kitchen"]["id"]
        }),
    )
    .await;
    assert_eq!(updated["id"], seed.restaurant_id);
    assert_eq!(updated["name"], "Tuk Tuk Thai");
    assert_eq!(updated["freight_fee"], "7.00");
    assert_eq!(updated["active"], false);
    assert_eq!(updated["open"], true);
    assert_eq!(updated["created_at"], before["created_at"]);
    assert!(updated["address"].is_null());

    let (status, problem) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"name": "Tuk Tuk", "freight_fee": "5.00", "kitchen_id": 999})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/business-rule"));

    let (status, _) = send(&app, Method::PUT, &format!("{uri}/fechamento"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, after) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(after["open"], false);
    assert_eq!(after["name"], "Tuk Tuk Thai");
}

#[tokio::test]
async fn product_update_keeps_id_and_restaurant() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;
    let uri = format!(
        "/restaurantes/{}/produtos/{}",
        seed.restaurant_id, seed.product_id
    );

    let updated = put(
        &app,
        &uri,
        json!({"name": "Pao de queijo grande", "price": "3.75", "active": false}),
    )
    .await;
    assert_eq!(updated["id"], seed.product_id);
    assert_eq!(updated["restaurant_id"], seed.restaurant_id);
    assert_eq!(updated["price"], "3.75");
    assert_eq!(updated["active"], false);

    let (_, listed) = send(
        &app,
        Method::GET,
        &format!("/restaurantes/{}/produtos", seed.restaurant_id),
        None,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["name"], "Pao de queijo grande");
}

#[tokio::test]
async fn oversized_price_is_refused_and_service_keeps_answering() {
    let (app, _tmp) = test_app();
    let seed = seed(&app).await;

    let (status, problem) = send(
        &app,
        Method::POST,
        &format!("/restaurantes/{}/produtos", seed.restaurant_id),
        Some(json!({"name": "Caviar", "price": "79228162514264337593543950335"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/invalid-data"));
    assert_eq!(problem["fields"][0]["name"], "price");

    let (status, problem) = send(
        &app,
        Method::PUT,
        &format!("/restaurantes/{}", seed.restaurant_id),
        Some(json!({"name": "Tuk Tuk", "freight_fee": "10000000.01", "kitchen_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(problem["fields"][0]["name"], "freight_fee");

    place_order(&app, &seed).await;
    let (status, _) = send(&app, Method::GET, "/estados", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_projection_is_invalid_parameter() {
    let (app, _tmp) = test_app();
    let (status, problem) = send(&app, Method::GET, "/restaurantes?projecao=tudo", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(problem_type(&problem).ends_with("/invalid-parameter"));
    let detail = problem["detail"].as_str().unwrap();
    assert!(detail.contains("'projecao'"));
    assert!(detail.contains("'tudo'"));
}
