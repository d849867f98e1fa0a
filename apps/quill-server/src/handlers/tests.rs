use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{TimeDelta, Utc};
use serde_json::Value;

use quill_core::domain::{Post, User};
use quill_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::middleware::auth::AUTH_COOKIE;
use crate::state::AppState;

fn test_state() -> AppState {
    AppState::from_parts(
        InMemoryStore::repositories(Arc::new(InMemoryStore::new())),
        Arc::new(JwtTokenService::new(JwtConfig::default())),
        Arc::new(Argon2PasswordService::new()),
        "/auth/login/".to_string(),
        "memory",
    )
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

async fn user(state: &AppState, username: &str) -> User {
    let user = User::new(
        username.to_string(),
        String::new(),
        Argon2PasswordService::unusable(),
    );
    state.users().insert(user).await.unwrap()
}

async fn member(state: &AppState, username: &str, password: &str) -> User {
    let hash = state.passwords.hash(password).unwrap();
    let user = User::new(username.to_string(), String::new(), hash);
    state.users().insert(user).await.unwrap()
}

fn bearer(state: &AppState, user: &User) -> (header::HeaderName, String) {
    let token = state.tokens.generate_token(user.id, &user.username).unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

async fn post(state: &AppState, author: &User, hours_from_now: i64) -> Post {
    let post = Post::new(
        author.id,
        "Title".to_string(),
        "Body".to_string(),
        Utc::now() + TimeDelta::hours(hours_from_now),
    );
    state.blog.repositories().posts.insert(post).await.unwrap()
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_web::test]
async fn test_empty_index_has_one_page() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/?page=oops").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["number"], 1);
    assert_eq!(body["data"]["total_pages"], 1);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 0);
}

#[actix_web::test]
async fn test_huge_page_number_is_served_empty() {
    let state = test_state();
    let ann = user(&state, "ann").await;
    post(&state, &ann, -1).await;
    let app = test_app!(state);

    for (uri, pointer) in [
        ("/?page=18446744073709551615", "/data"),
        ("/profile/ann/?page=18446744073709551615", "/data/posts"),
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");

        let body: Value = test::read_body_json(resp).await;
        let page = body.pointer(pointer).unwrap();
        assert_eq!(page["number"], u64::from(u32::MAX), "{uri}");
        assert_eq!(page["total_pages"], 1, "{uri}");
        assert_eq!(page["items"].as_array().unwrap().len(), 0, "{uri}");
    }
}

#[actix_web::test]
async fn test_anonymous_create_redirects_to_login() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/posts/create/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Fposts%2Fcreate%2F");
}

#[actix_web::test]
async fn test_token_of_deleted_user_redirects_to_login() {
    let state = test_state();
    let ann = user(&state, "ann").await;
    let token = bearer(&state, &ann);
    state.users().delete(ann.id).await.unwrap();
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/profile/edit/")
        .insert_header(token.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=%2Fprofile%2Fedit%2F");

    let req = test::TestRequest::get()
        .uri("/")
        .insert_header(token)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_create_form_is_not_taken_for_a_post_id() {
    let state = test_state();
    let ann = user(&state, "ann").await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/posts/create/")
        .insert_header(bearer(&state, &ann))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_create_post_redirects_to_profile() {
    let state = test_state();
    let ann = user(&state, "ann").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(bearer(&state, &ann))
        .set_form([
            ("title", "Hello"),
            ("text", "World"),
            ("pub_date", "2020-01-01T10:00"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/ann/");

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["items"][0]["title"], "Hello");
    assert_eq!(body["data"]["items"][0]["author"]["username"], "ann");
}

#[actix_web::test]
async fn test_invalid_post_is_rendered_with_errors() {
    let state = test_state();
    let ann = user(&state, "ann").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(bearer(&state, &ann))
        .set_form([("title", ""), ("text", "World"), ("pub_date", "yesterday")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["data"]["text"], "World");
    assert!(body["data"]["errors"]["title"].is_array());
    assert!(body["data"]["errors"]["pub_date"].is_array());
}

#[actix_web::test]
async fn test_malformed_post_id_is_404() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/posts/not-a-uuid/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_scheduled_post_visible_only_to_author() {
    let state = test_state();
    let ann = user(&state, "ann").await;
    let bob = user(&state, "bob").await;
    let scheduled = post(&state, &ann, 48).await;
    let app = test_app!(state);
    let uri = format!("/posts/{}/", scheduled.id);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&state, &bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&state, &ann))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["post"]["id"], scheduled.id.to_string());
}

#[actix_web::test]
async fn test_non_author_delete_redirects_to_post() {
    let state = test_state();
    let ann = user(&state, "ann").await;
    let bob = user(&state, "bob").await;
    let published = post(&state, &ann, -1).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete/", published.id))
        .insert_header(bearer(&state, &bob))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", published.id));
    let stored = state
        .blog
        .repositories()
        .posts
        .find_by_id(published.id)
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[actix_web::test]
async fn test_comment_on_post() {
    let state = test_state();
    let ann = user(&state, "ann").await;
    let bob = user(&state, "bob").await;
    let published = post(&state, &ann, -1).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", published.id))
        .insert_header(bearer(&state, &bob))
        .set_form([("text", "Great read")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", published.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["comments"][0]["text"], "Great read");
    assert_eq!(body["data"]["comments"][0]["author"]["username"], "bob");
    assert_eq!(body["data"]["post"]["comment_count"], 1);
}

#[actix_web::test]
async fn test_profile_edit_route_precedes_username() {
    let state = test_state();
    let ann = user(&state, "ann").await;
    let app = test_app!(state);

    let req = test::TestRequest::get()
        .uri("/profile/edit/")
        .insert_header(bearer(&state, &ann))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["data"]["username"], "ann");
}

#[actix_web::test]
async fn test_login_sets_cookie_that_authenticates() {
    let state = test_state();
    member(&state, "ann", "password1").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([
            ("username", "ann"),
            ("password", "password1"),
            ("next", "/profile/edit/"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/edit/");

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == AUTH_COOKIE)
        .unwrap()
        .into_owned();
    assert_eq!(cookie.http_only(), Some(true));

    let req = test::TestRequest::get()
        .uri("/profile/edit/")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_wrong_password_rerenders_login() {
    let state = test_state();
    member(&state, "ann", "password1").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "ann"), ("password", "nope")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["username"], "ann");
    assert!(body["data"]["errors"]["__all__"].is_array());
}

#[actix_web::test]
async fn test_login_rejects_unknown_and_passwordless_users() {
    let state = test_state();
    user(&state, "ann").await;
    let app = test_app!(state);

    for username in ["ann", "nobody"] {
        let req = test::TestRequest::post()
            .uri("/auth/login/")
            .set_form([("username", username), ("password", "anything at all")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{username}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false, "{username}");
        assert!(body["data"]["errors"]["__all__"].is_array(), "{username}");
    }
}

#[actix_web::test]
async fn test_register_and_duplicate_username() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/auth/register/")
        .set_form([("username", "ann"), ("password", "long password")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/ann/");

    let req = test::TestRequest::post()
        .uri("/auth/register/")
        .set_form([("username", "ann"), ("password", "another password")])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], false);
    assert!(body["data"]["errors"]["username"].is_array());
    assert!(body["data"]["data"].get("password").is_none());
}

#[actix_web::test]
async fn test_logout_clears_cookie() {
    let state = test_state();
    let app = test_app!(state);

    let req = test::TestRequest::post().uri("/auth/logout/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == AUTH_COOKIE)
        .unwrap();
    assert_eq!(cookie.value(), "");
}
