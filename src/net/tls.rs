//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::RuntimeConfig;

/// Errors while preparing TLS material.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("{kind} file not found: {path:?}")]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("failed to load TLS material: {0}")]
    Load(#[from] std::io::Error),
}

fn require_file(kind: &'static str, path: &Path) -> Result<(), TlsError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(TlsError::NotFound {
            kind,
            path: path.to_path_buf(),
        })
    }
}

/// Load the certificate and key named in `config`.
///
/// Returns `None` when TLS is not configured.
pub async fn load_tls_config(config: &RuntimeConfig) -> Result<Option<RustlsConfig>, TlsError> {
    if !config.tls_enabled() {
        return Ok(None);
    }

    let cert_path = Path::new(&config.tls_cert_path);
    let key_path = Path::new(&config.tls_key_path);
    require_file("Certificate", cert_path)?;
    require_file("Private key", key_path)?;

    let tls = RustlsConfig::from_pem_file(cert_path, key_path).await?;
    Ok(Some(tls))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tls_disabled_without_paths() {
        let config = RuntimeConfig::default();
        assert!(load_tls_config(&config).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_certificate() {
        let config = RuntimeConfig {
            tls_cert_path: "/no/such/cert.pem".into(),
            tls_key_path: "/no/such/key.pem".into(),
            ..RuntimeConfig::default()
        };
        match load_tls_config(&config).await {
            Err(TlsError::NotFound { kind, .. }) => assert_eq!(kind, "Certificate"),
            other => panic!("expected missing certificate, got {:?}", other.map(|c| c.is_some())),
        }
    }
}
