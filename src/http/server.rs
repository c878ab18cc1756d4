//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router: permission gate in front of the file service
//! - Wire up middleware (tracing, timeout, request ID, access log)
//! - Serve on a plain listener or over TLS
//!
//! # Design Decisions
//! - Built only from `lifecycle::Ready`, i.e. after the startup script ran
//! - The served directory is `RuntimeConfig::server_dir`

use axum::{middleware, Router};
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{RuntimeConfig, ServerConfig};
use crate::deny::DenyDispatcher;
use crate::http::request::{access_log, UuidRequestId};
use crate::lifecycle::{shutdown_signal, Ready};
use crate::security::access_control::{permission_gate, AnonymousResolver, RoleResolver};
use crate::security::PermissionRegistry;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<RuntimeConfig>,
    pub registry: Arc<PermissionRegistry>,
    pub resolver: Arc<dyn RoleResolver>,
    pub deny: DenyDispatcher,
}

/// The host HTTP server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Server where every caller is anonymous.
    pub fn new(ready: Ready) -> Self {
        Self::with_resolver(ready, Arc::new(AnonymousResolver))
    }

    pub fn with_resolver(ready: Ready, resolver: Arc<dyn RoleResolver>) -> Self {
        let state = AppState {
            runtime: ready.runtime.clone(),
            registry: ready.registry,
            resolver,
            deny: ready.dispatcher,
        };
        Self {
            router: Self::build_router(&ready.settings, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(settings: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback_service(ServeDir::new(&state.runtime.server_dir))
            .layer(middleware::from_fn_with_state(state, permission_gate))
            .layer(middleware::from_fn(access_log))
            .layer(TimeoutLayer::new(Duration::from_secs(settings.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let stopper = handle.clone();
        tokio::spawn(async move {
            shutdown_signal(shutdown).await;
            stopper.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Bootstrap;
    use crate::security::Role;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn server(script: &str, dir: &std::path::Path, resolver: Arc<dyn RoleResolver>) -> HttpServer {
        let mut settings = ServerConfig::default();
        settings.runtime.server_dir = dir.display().to_string();
        let mut bootstrap = Bootstrap::new(settings);
        bootstrap.run_script(script).unwrap();
        HttpServer::with_resolver(bootstrap.finish().unwrap(), resolver)
    }

    async fn get(router: Router, path: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_public_file_is_served() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.txt"), "hello").unwrap();

        let server = server("", dir.path(), Arc::new(AnonymousResolver));
        let (status, body) = get(server.router(), "/index.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn test_protected_path_uses_custom_handler() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(
            r#"
            ClearPermissions();
            AddUserPrefix("/members");
            DenyHandler(|| { Status(401); print("Members only: " + UrlPath()); });
            "#,
            dir.path(),
            Arc::new(AnonymousResolver),
        );

        let (status, body) = get(server.router(), "/members/page").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, "Members only: /members/page\n");
    }

    #[tokio::test]
    async fn test_granted_role_passes_gate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("members")).unwrap();
        std::fs::write(dir.path().join("members/page.txt"), "welcome").unwrap();

        let resolver = |req: &Request<Body>| {
            if req.headers().contains_key("x-member") {
                Role::User
            } else {
                Role::Public
            }
        };
        let server = server(
            r#"ClearPermissions(); AddUserPrefix("/members");"#,
            dir.path(),
            Arc::new(resolver),
        );

        let allowed = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/members/page.txt")
                    .header("x-member", "1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);

        let (status, body) = get(server.router(), "/members/page.txt").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "Permission denied.");
    }

    #[tokio::test]
    async fn test_request_id_is_set() {
        let dir = tempfile::tempdir().unwrap();
        let server = server("", dir.path(), Arc::new(AnonymousResolver));
        let response = server
            .router()
            .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
