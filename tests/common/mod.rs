//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpListener;

use confbridge::config::ServerConfig;
use confbridge::{Bootstrap, HttpServer, Shutdown};

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Run `script` through startup and serve `dir` on 127.0.0.1.
pub async fn start_server(script: &str, dir: &Path) -> TestServer {
    let mut settings = ServerConfig::default();
    settings.runtime.server_dir = dir.display().to_string();
    settings.runtime.bind_address = "127.0.0.1:0".to_string();

    let mut bootstrap = Bootstrap::new(settings);
    bootstrap.run_script(script).expect("startup script");
    let server = HttpServer::new(bootstrap.finish().expect("startup finished"));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    TestServer { addr, shutdown }
}

/// Client without connection pooling or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
