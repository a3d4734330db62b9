//! TLS configuration and certificate loading.

use axum_server::tls_rustls::RustlsConfig;
use std::io::{BufReader, Error, ErrorKind};
use std::path::Path;

/// Load TLS configuration from PEM certificate and key files.
///
/// Both files are parsed up front so a missing or empty file is reported
/// with its path instead of as a handshake failure later.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, Error> {
    let cert_pem = read_pem(cert_path, "Certificate")?;
    let key_pem = read_pem(key_path, "Private key")?;

    let certs = rustls_pemfile::certs(&mut BufReader::new(cert_pem.as_slice())).collect::<Result<Vec<_>, _>>()?;
    if certs.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("No certificate found in {:?}", cert_path),
        ));
    }
    if rustls_pemfile::private_key(&mut BufReader::new(key_pem.as_slice()))?.is_none() {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("No private key found in {:?}", key_path),
        ));
    }

    RustlsConfig::from_pem(cert_pem, key_pem).await
}

fn read_pem(path: &Path, what: &str) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|e| Error::new(e.kind(), format!("{} file {:?}: {}", what, path, e)))
}
