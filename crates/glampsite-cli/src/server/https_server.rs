//! HTTPS server using rustls.

use std::path::Path;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;

use crate::TRACING_TARGET_SERVER_STARTUP;
use crate::config::ServerConfig;
use crate::server::lifecycle::serve_with_shutdown;
use crate::server::{ServerError, ServerResult, shutdown_signal};

/// Serves `app` over HTTPS with the configured certificate and key.
pub async fn serve_https(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let (Some(cert_path), Some(key_path)) = (
        server_config.tls_cert_path.clone(),
        server_config.tls_key_path.clone(),
    ) else {
        return Err(ServerError::InvalidConfig(
            "the tls build requires --tls-cert-path and --tls-key-path".to_owned(),
        ));
    };

    validate_tls_files(&cert_path, &key_path)?;

    let tls_config = RustlsConfig::from_pem_file(&cert_path, &key_path)
        .await
        .map_err(|err| {
            ServerError::Tls(format!("failed to load certificate and key: {err}"))
        })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        cert_path = %cert_path.display(),
        key_path = %key_path.display(),
        "TLS certificates loaded"
    );

    let server_addr = server_config.server_addr();
    let shutdown_timeout = server_config.shutdown_timeout();

    serve_with_shutdown(&server_config, move || async move {
        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            shutdown_signal(shutdown_timeout).await;
            shutdown_handle.graceful_shutdown(Some(shutdown_timeout));
        });

        axum_server::bind_rustls(server_addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
    })
    .await
}

fn validate_tls_files(cert_path: &Path, key_path: &Path) -> ServerResult<()> {
    let validate_file = |path: &Path, file_type: &str| -> ServerResult<()> {
        let metadata = std::fs::metadata(path).map_err(|err| {
            ServerError::Tls(format!(
                "{file_type} file {} cannot be read: {err}",
                path.display()
            ))
        })?;

        if !metadata.is_file() {
            return Err(ServerError::Tls(format!(
                "{file_type} path is not a file: {}",
                path.display()
            )));
        }

        if metadata.len() == 0 {
            return Err(ServerError::Tls(format!(
                "{file_type} file is empty: {}",
                path.display()
            )));
        }

        Ok(())
    };

    validate_file(cert_path, "Certificate")?;
    validate_file(key_path, "Private key")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_files_are_rejected() {
        let result = validate_tls_files(Path::new("missing_cert.pem"), Path::new("missing_key.pem"));
        assert!(matches!(
            result,
            Err(ServerError::Tls(msg)) if msg.starts_with("Certificate")
        ));
    }

    #[test]
    fn empty_key_is_rejected() -> anyhow::Result<()> {
        let mut cert = tempfile::NamedTempFile::new()?;
        cert.write_all(b"-----BEGIN CERTIFICATE-----")?;
        let key = tempfile::NamedTempFile::new()?;

        let result = validate_tls_files(cert.path(), key.path());
        assert!(matches!(
            result,
            Err(ServerError::Tls(msg)) if msg.contains("empty")
        ));
        Ok(())
    }
}
