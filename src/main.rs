//! confbridge: an HTTP server whose access rules come from a script.
//!
//! # Architecture Overview
//!
//! ```text
//!   serverconf.rhai ──▶ lifecycle::Bootstrap ──▶ scripting::bridge ──▶ config / registry / deny slot
//!                              │
//!                              ▼ finish()
//!                        lifecycle::Ready
//!                              │
//!   Client ──▶ http::server ──▶ security::access_control ──▶ static files
//!                                      │ denied
//!                                      ▼
//!                              deny::dispatch ──▶ scripting::pool ──▶ custom handler
//!                                      │ failure
//!                                      ▼
//!                              default "Permission denied."
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use confbridge::config::loader::load_config;
use confbridge::config::ServerConfig;
use confbridge::lifecycle::{Bootstrap, Shutdown};
use confbridge::net::tls::load_tls_config;
use confbridge::observability::{logging, metrics};
use confbridge::HttpServer;

#[derive(Parser)]
#[command(name = "confbridge", version)]
#[command(about = "HTTP server with script-controlled permissions", long_about = None)]
struct Cli {
    /// Directory to serve
    server_dir: Option<String>,

    /// Base configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, e.g. 127.0.0.1:3000 or :3000
    #[arg(short, long)]
    addr: Option<String>,

    /// TLS certificate (PEM)
    #[arg(long)]
    cert: Option<String>,

    /// TLS private key (PEM)
    #[arg(long)]
    key: Option<String>,

    /// Data store address
    #[arg(long)]
    store: Option<String>,

    /// Data store database index
    #[arg(long)]
    store_index: Option<i64>,

    /// Configuration script; must exist when given
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    debug: bool,

    /// Prometheus endpoint address
    #[arg(long)]
    metrics_address: Option<String>,
}

impl Cli {
    fn apply(&self, settings: &mut ServerConfig) {
        let runtime = &mut settings.runtime;
        if let Some(dir) = &self.server_dir {
            runtime.server_dir = dir.clone();
        }
        if let Some(addr) = &self.addr {
            runtime.bind_address = addr.clone();
        }
        if let Some(cert) = &self.cert {
            runtime.tls_cert_path = cert.clone();
        }
        if let Some(key) = &self.key {
            runtime.tls_key_path = key.clone();
        }
        if let Some(store) = &self.store {
            runtime.store_address = store.clone();
        }
        if let Some(index) = self.store_index {
            runtime.store_index = index;
        }
        if let Some(script) = &self.script {
            runtime.script_path = script.display().to_string();
        }
        if self.debug {
            runtime.debug = true;
        }
        if let Some(addr) = &self.metrics_address {
            settings.observability.metrics_address = addr.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    cli.apply(&mut settings);

    // Console first; log files and the final level come from the script.
    let logging = logging::init_logging(&settings.runtime);
    tracing::info!("confbridge v{} starting", env!("CARGO_PKG_VERSION"));

    let script = PathBuf::from(&settings.runtime.script_path);
    let mut bootstrap = Bootstrap::new(settings);
    let ran_script = cli.script.is_some() || script.is_file();
    if ran_script {
        bootstrap.run_script_file(&script)?;
    }
    let ready = bootstrap.finish()?;

    logging.apply(&ready.runtime);
    if !ran_script {
        tracing::info!(path = %script.display(), "No configuration script found, using defaults");
    }
    for line in ready.runtime.server_info().lines() {
        tracing::debug!("{}", line);
    }
    tracing::info!(
        bind_address = %ready.runtime.bind_address,
        admin_prefixes = ?ready.registry.admin_prefixes(),
        user_prefixes = ?ready.registry.user_prefixes(),
        custom_deny_handler = ready.dispatcher.slot().is_custom(),
        "Configuration loaded"
    );

    let metrics_address = &ready.settings.observability.metrics_address;
    if !metrics_address.is_empty() {
        metrics::init_metrics(metrics_address.parse()?);
    }

    let addr = ready.runtime.socket_addr()?;
    let tls = load_tls_config(&ready.runtime).await?;
    let server = HttpServer::new(ready);
    let shutdown = Shutdown::new();

    match tls {
        Some(tls) => server.run_tls(addr, tls, shutdown.subscribe()).await?,
        None => {
            let listener = TcpListener::bind(addr).await?;
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
