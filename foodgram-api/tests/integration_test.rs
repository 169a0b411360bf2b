/// End-to-end tests against PostgreSQL
///
/// Run with `DATABASE_URL` set: `cargo test -p foodgram-api -- --ignored`

mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, TestContext};
use foodgram_shared::models::{
    ingredient::{CreateIngredient, Ingredient},
    tag::{CreateTag, Tag},
};
use serde_json::{json, Value};
use uuid::Uuid;

/// Registers a user and returns (id, auth header value)
async fn register(ctx: &TestContext, name: &str) -> (Uuid, String) {
    let suffix = Uuid::new_v4().simple().to_string();
    let email = format!("{name}-{suffix}@example.com");
    let username = format!("{name}_{}", &suffix[..8]);

    let response = ctx
        .send(
            "POST",
            "/api/users/",
            None,
            Some(json!({
                "email": email,
                "username": username,
                "first_name": "Test",
                "last_name": "Cook",
                "password": "pancakes-42"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let profile = body_json(response).await;
    let id: Uuid = profile["id"].as_str().unwrap().parse().unwrap();

    let response = ctx
        .send(
            "POST",
            "/api/auth/token/login/",
            None,
            Some(json!({ "email": email, "password": "pancakes-42" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["auth_token"]
        .as_str()
        .unwrap()
        .to_string();

    (id, format!("Token {token}"))
}

async fn send_as(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    auth: &str,
    body: Option<Value>,
) -> axum::http::Response<axum::body::Body> {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", auth);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    ctx.app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_recipe_lifecycle() {
    let ctx = TestContext::postgres().await.unwrap();
    let (author_id, author) = register(&ctx, "author").await;
    let (_, reader) = register(&ctx, "reader").await;

    let suffix = Uuid::new_v4().simple().to_string();
    let flour = Ingredient::create(
        &ctx.db,
        CreateIngredient {
            name: format!("flour {suffix}"),
            measurement_unit: "g".to_string(),
        },
    )
    .await
    .unwrap();
    let tag = Tag::create(
        &ctx.db,
        CreateTag {
            name: format!("Brunch {}", &suffix[..12]),
            slug: format!("brunch-{}", &suffix[..12]),
        },
    )
    .await
    .unwrap();

    let response = send_as(
        &ctx,
        "POST",
        "/api/recipes/",
        &author,
        Some(json!({
            "ingredients": [{ "id": flour.id, "amount": 200 }],
            "tags": [tag.id],
            "image": "data:image/png;base64,AAAA",
            "name": "Pancakes",
            "text": "Mix and fry.",
            "cooking_time": 20
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let recipe = body_json(response).await;
    let recipe_id = recipe["id"].as_str().unwrap().to_string();
    assert_eq!(recipe["author"]["id"], author_id.to_string());
    assert_eq!(recipe["ingredients"][0]["amount"], 200);
    assert_eq!(recipe["tags"][0]["slug"], tag.slug);

    // Favorite and cart flags follow the viewer
    let uri = format!("/api/recipes/{recipe_id}/favorite/");
    assert_eq!(send_as(&ctx, "POST", &uri, &reader, None).await.status(), StatusCode::CREATED);
    assert_eq!(send_as(&ctx, "POST", &uri, &reader, None).await.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/recipes/{recipe_id}/shopping_cart/");
    assert_eq!(send_as(&ctx, "POST", &uri, &reader, None).await.status(), StatusCode::CREATED);

    let response = send_as(&ctx, "GET", &format!("/api/recipes/{recipe_id}/"), &reader, None).await;
    let view = body_json(response).await;
    assert_eq!(view["is_favorited"], true);
    assert_eq!(view["is_in_shopping_cart"], true);

    let response = send_as(&ctx, "GET", "/api/recipes/download_shopping_cart/", &reader, None).await;
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(text, format!("flour {suffix} - 200 g\n"));

    // Update replaces associations as a whole
    let response = send_as(
        &ctx,
        "PATCH",
        &format!("/api/recipes/{recipe_id}/"),
        &author,
        Some(json!({
            "ingredients": [{ "id": flour.id, "amount": 350 }],
            "tags": [tag.id],
            "cooking_time": 25
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["ingredients"][0]["amount"], 350);
    assert_eq!(updated["name"], "Pancakes");
    assert_eq!(updated["cooking_time"], 25);

    let response = send_as(
        &ctx,
        "GET",
        &format!("/api/recipes/?author={author_id}&is_favorited=1"),
        &reader,
        None,
    )
    .await;
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = send_as(&ctx, "DELETE", &format!("/api/recipes/{recipe_id}/"), &author, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send_as(&ctx, "GET", "/api/recipes/download_shopping_cart/", &reader, None).await;
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_subscriptions() {
    let ctx = TestContext::postgres().await.unwrap();
    let (author_id, _) = register(&ctx, "chef").await;
    let (reader_id, reader) = register(&ctx, "fan").await;

    let uri = format!("/api/users/{author_id}/subscribe/?recipes_limit=2");
    let response = send_as(&ctx, "POST", &uri, &reader, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 0);

    assert_eq!(send_as(&ctx, "POST", &uri, &reader, None).await.status(), StatusCode::BAD_REQUEST);

    let own = format!("/api/users/{reader_id}/subscribe/");
    assert_eq!(send_as(&ctx, "POST", &own, &reader, None).await.status(), StatusCode::BAD_REQUEST);

    let response = send_as(&ctx, "GET", &format!("/api/users/{author_id}/"), &reader, None).await;
    assert_eq!(body_json(response).await["is_subscribed"], true);

    let response = send_as(&ctx, "GET", "/api/users/subscriptions/", &reader, None).await;
    let list = body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let uri = format!("/api/users/{author_id}/subscribe/");
    assert_eq!(send_as(&ctx, "DELETE", &uri, &reader, None).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(send_as(&ctx, "DELETE", &uri, &reader, None).await.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL instance
async fn test_login_rejects_wrong_password() {
    let ctx = TestContext::postgres().await.unwrap();

    let response = ctx
        .send(
            "POST",
            "/api/auth/token/login/",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "whatever-123" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
