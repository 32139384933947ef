use std::net::SocketAddr;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::routes::build_router;
use crate::state::AppState;

/// Compose the route table with CORS and request logging. The trace layer is
/// outermost, so every request is logged whether or not the auth gate later
/// rejects it.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let host = req
                        .headers()
                        .get(axum::http::header::HOST)
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        %host,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use tracing::span::{Attributes, Id};
    use tracing_subscriber::{layer::Context, layer::SubscriberExt, registry::Registry, Layer};

    use super::*;

    struct RequestSpanCheck {
        seen: Arc<AtomicBool>,
    }

    impl<S: tracing::Subscriber> Layer<S> for RequestSpanCheck {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
            let meta = attrs.metadata();
            if meta.name() == "http_request" && meta.fields().field("status").is_some() {
                self.seen.store(true, Ordering::SeqCst);
            }
        }
    }

    // The span must declare `status` up front, otherwise the record call in
    // on_response silently drops the value.
    #[tokio::test]
    async fn request_span_declares_status_field() {
        let seen = Arc::new(AtomicBool::new(false));
        let subscriber = Registry::default().with(RequestSpanCheck { seen: seen.clone() });
        let _guard = tracing::subscriber::set_default(subscriber);

        let app = build_app(AppState::fake());
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
        assert_eq!(resp.status(), axum::http::StatusCode::UNAUTHORIZED);
        assert!(seen.load(Ordering::SeqCst));
    }
}
