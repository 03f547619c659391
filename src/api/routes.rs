use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::websocket::websocket_handler;

use super::auth_handlers;
use super::handlers::*;
use super::library_handlers::*;
use super::openapi::ApiDocV1;
use super::state::AppState;

/// Create the API router with Swagger UI and WebSocket support
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/v1/openapi.json", ApiDocV1::openapi()))
        // WebSocket endpoint
        .route("/ws", get(websocket_handler))
        .route("/health", get(health_check))
        // Recipe endpoints
        .route("/api/v1/recipes/search", get(search_recipes))
        .route("/api/v1/recipes/random", get(random_recipes))
        .route("/api/v1/recipes/home", get(home_feed))
        .route("/api/v1/recipes/generate", post(generate_recipe))
        .route("/api/v1/recipes/collections/:kind", get(recipe_collection))
        .route("/api/v1/recipes/:id", get(get_recipe))
        // Translation endpoints
        .route("/api/v1/translate", post(translate_text))
        .route("/api/v1/translate/batch", post(translate_batch))
        .route("/api/v1/i18n/:locale", get(get_ui_strings))
        // Auth endpoints
        .route("/api/v1/auth/signup", post(auth_handlers::signup))
        .route("/api/v1/auth/login", post(auth_handlers::login))
        .route("/api/v1/auth/logout", post(auth_handlers::logout))
        .route("/api/v1/auth/me", get(auth_handlers::me))
        .route("/api/v1/auth/profile", put(auth_handlers::update_profile))
        // Saved recipe endpoints
        .route("/api/v1/saved", get(list_saved).post(save_recipe))
        .route("/api/v1/saved/toggle", post(toggle_saved))
        .route("/api/v1/saved/:id", delete(remove_saved))
        .route("/api/v1/saved/:id/status", get(saved_status))
        // Community endpoints
        .route(
            "/api/v1/community",
            get(list_community).post(create_community_recipe),
        )
        .route("/api/v1/community/:id", get(get_community_recipe))
        .route("/api/v1/community/:id/like", post(toggle_like))
        .route("/api/v1/cache/stats", get(cache_stats))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RequestCache;
    use crate::config::AppConfig;
    use crate::recipes::service::tests::{sample_recipe, tagging_chain, FakeSource};
    use crate::translation::TranslationChain;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> Router {
        let source = FakeSource::with(vec![sample_recipe(716429, "Pasta with Garlic")]);
        let state = AppState::with_services(AppConfig::default(), source, tagging_chain()).await;
        create_router(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn signup(app: &Router, email: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(json!({"email": email, "password": "segredo", "display_name": "Ana"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["translation_providers"], json!(["tagging"]));
    }

    #[tokio::test]
    async fn test_recipe_endpoints() {
        let app = app().await;

        let (status, body) =
            send(&app, Method::GET, "/api/v1/recipes/search?query=alho&locale=pt-BR", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query_used"], "[en] alho");
        assert_eq!(body["results"][0]["title"], "[pt] Pasta with Garlic");

        let (status, body) = send(&app, Method::GET, "/api/v1/recipes/search?query=", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_query");

        let (status, body) =
            send(&app, Method::GET, "/api/v1/recipes/716429?locale=en", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Pasta with Garlic");

        let (status, _) = send(&app, Method::GET, "/api/v1/recipes/abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, "/api/v1/recipes/1", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, Method::GET, "/api/v1/recipes/collections/snacks", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) =
            send(&app, Method::GET, "/api/v1/recipes/collections/desserts?locale=en", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = send(&app, Method::GET, "/api/v1/recipes/home?locale=xx", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_generate_requires_auth() {
        let app = app().await;
        let request = json!({"ingredients": ["garlic"], "language": "en"});

        let (status, _) =
            send(&app, Method::POST, "/api/v1/recipes/generate", None, Some(request.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = signup(&app, "ana@example.com").await;
        let (status, body) =
            send(&app, Method::POST, "/api/v1/recipes/generate", Some(&token), Some(request)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "spoonacular");
        assert_eq!(body["title"], "Pasta with Garlic");
    }

    #[tokio::test]
    async fn test_translation_and_i18n() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/translate",
            None,
            Some(json!({"text": "egg", "target": "es"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "[es] egg");
        assert_eq!(body["ok"], true);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/translate/batch",
            None,
            Some(json!({"items": ["salt", "pepper"], "locale": "pt"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"], json!(["[pt] salt", "[pt] pepper"]));

        let (status, body) = send(&app, Method::GET, "/api/v1/i18n/es", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["strings"]["instructions"], "Instrucciones");

        let (status, _) = send(&app, Method::GET, "/api/v1/i18n/fr", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_auth_flow() {
        let app = app().await;
        let token = signup(&app, "ana@example.com").await;

        let (status, body) = send(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ana@example.com");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(json!({"email": "ana@example.com", "password": "segredo"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/v1/auth/profile",
            Some(&token),
            Some(json!({"display_name": "Ana Maria"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["display_name"], "Ana Maria");

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ana@example.com", "password": "errado"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::POST, "/api/v1/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, "/api/v1/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_saved_recipes_flow() {
        let app = app().await;
        let token = signup(&app, "ana@example.com").await;
        let recipe = json!({"id": 716429, "title": "Pasta with Garlic", "ready_in_minutes": 45});

        let (status, _) = send(&app, Method::GET, "/api/v1/saved", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) =
            send(&app, Method::POST, "/api/v1/saved", Some(&token), Some(recipe.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], "716429");

        let (_, body) =
            send(&app, Method::GET, "/api/v1/saved/716429/status", Some(&token), None).await;
        assert_eq!(body, json!({"id": "716429", "saved": true}));

        let (_, body) =
            send(&app, Method::POST, "/api/v1/saved/toggle", Some(&token), Some(recipe)).await;
        assert_eq!(body["saved"], false);

        let (status, _) =
            send(&app, Method::DELETE, "/api/v1/saved/716429", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, Method::GET, "/api/v1/saved", Some(&token), None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_community_flow() {
        let app = app().await;
        let draft = json!({
            "title": "Bolo de cenoura",
            "description": "Fofinho",
            "ingredients": "3 cenouras\n2 xícaras de farinha",
            "instructions": "Bata\nAsse",
            "prep_time": 50,
            "servings": 10
        });

        let (status, _) =
            send(&app, Method::POST, "/api/v1/community", None, Some(draft.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = signup(&app, "ana@example.com").await;
        let (status, created) =
            send(&app, Method::POST, "/api/v1/community", Some(&token), Some(draft)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["author_name"], "Ana");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/api/v1/community/{}/like", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["likes"], 1);

        let (_, body) = send(&app, Method::GET, "/api/v1/community", None, None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = send(&app, Method::GET, "/api/v1/community/missing", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/community",
            Some(&token),
            Some(json!({"title": "Sem nada"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_cache_stats_lists_translation_cache() {
        let app = app().await;
        let (status, body) = send(&app, Method::GET, "/api/v1/cache/stats", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let namespaces: Vec<&str> = body["caches"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["namespace"].as_str().unwrap())
            .collect();
        assert!(namespaces.contains(&"information"));
        assert!(namespaces.contains(&"translation"));
    }

    #[tokio::test]
    async fn test_real_chain_without_providers_keeps_text() {
        let chain = Arc::new(TranslationChain::new(
            vec![],
            None,
            RequestCache::in_memory("translation", Duration::from_secs(60)),
        ));
        let state = AppState::with_services(AppConfig::default(), FakeSource::with(vec![]), chain).await;
        let app = create_router(state);

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/v1/translate",
            None,
            Some(json!({"text": "egg", "target": "pt"})),
        )
        .await;
        assert_eq!(body["text"], "egg");
        assert_eq!(body["ok"], false);
    }
}
