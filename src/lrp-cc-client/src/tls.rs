//! Mutual-TLS configuration for [`crate::CcClient`].
//!
//! Given paths to a client certificate, client key, and CA certificate,
//! [`TlsConfigFactory::build`] returns a fully configured TLS identity and
//! pinned root CA. Failure to read or parse any of the three files is
//! reported as [`TlsInitError`], which callers should map to the process's
//! "invalid configuration" exit code.

use std::path::Path;

use reqwest::{Certificate, Identity};

/// Errors constructing the client's TLS material. Distinct from
/// [`crate::CcClientError`]: this happens once at startup, not per call.
#[derive(Debug, thiserror::Error)]
pub enum TlsInitError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TLS identity from client cert/key: {0}")]
    InvalidIdentity(#[source] reqwest::Error),
    #[error("failed to parse CA certificate: {0}")]
    InvalidCertificate(#[source] reqwest::Error),
}

/// A loaded client identity plus pinned root CA, ready to be applied to a
/// [`reqwest::ClientBuilder`].
pub struct ClientTlsConfig {
    pub(crate) identity: Identity,
    pub(crate) root_ca: Certificate,
}

/// Builds [`ClientTlsConfig`] values from PEM files on disk.
pub struct TlsConfigFactory;

impl TlsConfigFactory {
    /// Reads `client_cert_path`, `client_key_path`, and `ca_cert_path`,
    /// returning a TLS configuration with server verification enabled
    /// against the pinned CA.
    pub fn build(
        client_cert_path: &Path,
        client_key_path: &Path,
        ca_cert_path: &Path,
    ) -> Result<ClientTlsConfig, TlsInitError> {
        let mut identity_pem = read_file(client_cert_path)?;
        identity_pem.extend_from_slice(&read_file(client_key_path)?);
        let identity = Identity::from_pem(&identity_pem).map_err(TlsInitError::InvalidIdentity)?;

        let ca_pem = read_file(ca_cert_path)?;
        let root_ca = Certificate::from_pem(&ca_pem).map_err(TlsInitError::InvalidCertificate)?;

        Ok(ClientTlsConfig { identity, root_ca })
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, TlsInitError> {
    std::fs::read(path).map_err(|source| TlsInitError::ReadFile {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cert_file_is_an_init_error() {
        let result = TlsConfigFactory::build(
            Path::new("/nonexistent/cert.pem"),
            Path::new("/nonexistent/key.pem"),
            Path::new("/nonexistent/ca.pem"),
        );
        assert!(matches!(result, Err(TlsInitError::ReadFile { .. })));
    }
}
