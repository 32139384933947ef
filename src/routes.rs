use axum::{
    handler::Handler,
    middleware,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};

use crate::{auth, follows, state::AppState, users};

/// One entry of the static route table: where a request goes and whether the
/// auth gate wraps the handler.
pub struct RouteDef {
    pub path: &'static str,
    pub method: MethodFilter,
    pub handler: MethodRouter<AppState>,
    pub protected: bool,
}

fn def<H, T>(path: &'static str, method: MethodFilter, handler: H, protected: bool) -> RouteDef
where
    H: Handler<T, AppState>,
    T: 'static,
{
    RouteDef {
        path,
        method,
        handler: on(method, handler),
        protected,
    }
}

/// The full route table. `(path, method)` pairs must be unique; registering a
/// duplicate makes axum panic at startup, and a test below guards against it.
pub fn route_table() -> Vec<RouteDef> {
    vec![
        def("/login", MethodFilter::POST, auth::handlers::login, false),
        def("/users", MethodFilter::POST, users::handlers::create, false),
        def("/users", MethodFilter::GET, users::handlers::list, true),
        def("/users/:id", MethodFilter::GET, users::handlers::get, true),
        def("/users/:id", MethodFilter::PUT, users::handlers::update, true),
        def("/users/:id", MethodFilter::DELETE, users::handlers::delete, true),
        def(
            "/users/:id/follow",
            MethodFilter::POST,
            follows::handlers::follow,
            true,
        ),
        def(
            "/users/:id/unfollow",
            MethodFilter::DELETE,
            follows::handlers::unfollow,
            true,
        ),
        def(
            "/users/:id/followers",
            MethodFilter::GET,
            follows::handlers::followers,
            true,
        ),
        def(
            "/users/:id/following",
            MethodFilter::GET,
            follows::handlers::following,
            true,
        ),
    ]
}

/// Compose the live router from the table. Protected handlers get the auth
/// gate as a route layer; request logging wraps the whole router outermost in
/// [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new();
    for RouteDef {
        path,
        handler,
        protected,
        ..
    } in route_table()
    {
        let handler = if protected {
            handler.route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::middleware::require_auth,
            ))
        } else {
            handler
        };
        router = router.route(path, handler);
    }
    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::token::TokenKeys;

    #[test]
    fn no_duplicate_path_method_pairs() {
        let mut seen = HashSet::new();
        for def in route_table() {
            assert!(
                seen.insert((def.path, format!("{:?}", def.method))),
                "duplicate route {} {:?}",
                def.path,
                def.method
            );
        }
    }

    #[test]
    fn only_registration_and_login_are_public() {
        let public: Vec<_> = route_table()
            .into_iter()
            .filter(|d| !d.protected)
            .map(|d| (d.path, format!("{:?}", d.method)))
            .collect();
        assert_eq!(public.len(), 2);
        assert!(public.contains(&("/login", format!("{:?}", MethodFilter::POST))));
        assert!(public.contains(&("/users", format!("{:?}", MethodFilter::POST))));
        assert_eq!(route_table().len(), 10);
    }

    async fn error_body(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn token_for(user_id: i64) -> String {
        // Secret matches AppState::fake().
        let keys = TokenKeys::from_secret("test-secret", Duration::from_secs(3600));
        keys.issue(user_id).expect("sign")
    }

    #[tokio::test]
    async fn protected_route_without_token_is_401() {
        let app = build_router(AppState::fake());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/users/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = error_body(resp).await;
        assert_eq!(body["error"], "invalid or expired token");
    }

    #[tokio::test]
    async fn garbled_authorization_header_is_401() {
        // One part instead of two: the credential falls through as the empty
        // string and fails signature parsing.
        let app = build_router(AppState::fake());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/users/1")
                    .header(header::AUTHORIZATION, "garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn reading_another_users_record_is_403() {
        // Middleware passes (valid token), the ownership check in the handler
        // rejects before any store call, so the lazy test pool is never hit.
        let app = build_router(AppState::fake());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/users/2")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token_for(1)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = error_body(resp).await;
        assert_eq!(body["error"], "user unauthorized");
    }

    #[tokio::test]
    async fn self_follow_is_rejected_before_the_store() {
        let app = build_router(AppState::fake());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users/1/follow")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token_for(1)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = error_body(resp).await;
        assert_eq!(body["error"], "not possible to follow yourself");
    }

    #[tokio::test]
    async fn self_unfollow_is_rejected_before_the_store() {
        let app = build_router(AppState::fake());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/users/1/unfollow")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token_for(1)))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn login_is_reachable_without_a_token() {
        // Unparseable body: the public route answers 400, not 401.
        let app = build_router(AppState::fake());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = error_body(resp).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn invalid_registration_is_400_without_auth() {
        let app = build_router(AppState::fake());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"name":"","nick":"ann1","email":"ann@x.com","password":"secret123"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = error_body(resp).await;
        assert_eq!(body["error"], "name is required");
    }
}
