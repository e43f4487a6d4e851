//! HTTP server setup.
//!
//! # Responsibilities
//! - Wrap the dispatcher in an axum app (every request hits the fallback)
//! - Wire up tracing middleware
//! - Serve on a bound listener until shutdown

use std::sync::Arc;

use axum::Router as AxumRouter;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::TransportConfig;
use crate::http::context::Services;
use crate::http::dispatcher::{dispatch_handler, Dispatcher};
use crate::http::log_flags::LogFlagSource;
use crate::lifecycle::signals;
use crate::routing::Router;

/// HTTP front end for a [`Router`].
pub struct HttpServer {
    app: AxumRouter,
    dispatcher: Dispatcher,
}

impl HttpServer {
    /// Server with fresh pools and an authenticator built from `config`.
    pub fn new(config: &TransportConfig, router: Router, log_flags: Arc<dyn LogFlagSource>) -> Self {
        Self::with_services(
            config,
            Arc::new(router),
            Arc::new(Services::new(config)),
            log_flags,
        )
    }

    /// Server sharing caller-provided services.
    pub fn with_services(
        config: &TransportConfig,
        router: Arc<Router>,
        services: Arc<Services>,
        log_flags: Arc<dyn LogFlagSource>,
    ) -> Self {
        let dispatcher = Dispatcher::new(config, router, services, log_flags);
        let app = Self::build_app(dispatcher.clone());
        Self { app, dispatcher }
    }

    fn build_app(dispatcher: Dispatcher) -> AxumRouter {
        AxumRouter::new()
            .fallback(dispatch_handler)
            .with_state(dispatcher)
            .layer(TraceLayer::new_for_http())
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The axum app, for driving in-process with `tower::ServiceExt`.
    pub fn into_app(self) -> AxumRouter {
        self.app
    }

    /// Serve until `shutdown` fires or Ctrl+C arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => tracing::info!("Shutdown triggered"),
                    _ = signals::ctrl_c() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::LogFlag;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn server() -> HttpServer {
        HttpServer::new(
            &TransportConfig::default(),
            Router::builder().build(),
            Arc::new(|_: &str| LogFlag::NONE),
        )
    }

    #[tokio::test]
    async fn test_ping() {
        let app = server().into_app();
        let res = app
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let app = server().into_app();
        let res = app
            .oneshot(Request::get("/does/not/exist").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
