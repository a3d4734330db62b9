//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NfConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::IpAddr;

use crate::config::schema::NfConfig;
use crate::models::{AmfId, PlmnId};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &NfConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let configuration = &config.configuration;
    let sbi = &configuration.sbi;

    if sbi.scheme != "http" && sbi.scheme != "https" {
        errors.push(ValidationError::new(
            "configuration.sbi.scheme",
            format!("expected http or https, got '{}'", sbi.scheme),
        ));
    }
    if sbi.port == 0 {
        errors.push(ValidationError::new("configuration.sbi.port", "must be non-zero"));
    }
    check_ip(&mut errors, "configuration.sbi.bindingIPv4", &sbi.binding_ipv4);
    if let Some(register) = &sbi.register_ipv4 {
        check_ip(&mut errors, "configuration.sbi.registerIPv4", register);
    }
    if sbi.max_body_size == 0 {
        errors.push(ValidationError::new("configuration.sbi.maxBodySize", "must be non-zero"));
    }

    for (i, ip) in configuration.ngap_ip_list.iter().enumerate() {
        check_ip(&mut errors, &format!("configuration.ngapIpList[{}]", i), ip);
    }
    if configuration.ngap_max_peers == 0 {
        errors.push(ValidationError::new("configuration.ngapMaxPeers", "must be non-zero"));
    }

    if let Err(e) = url::Url::parse(&configuration.nrf_uri) {
        errors.push(ValidationError::new("configuration.nrfUri", e.to_string()));
    }

    for (i, guami) in configuration.served_guami_list.iter().enumerate() {
        let field = format!("configuration.servedGuamiList[{}]", i);
        check_plmn(&mut errors, &field, &guami.plmn_id);
        if AmfId::parse(&guami.amf_id).is_none() {
            errors.push(ValidationError::new(
                format!("{}.amfId", field),
                format!("expected six hex digits, got '{}'", guami.amf_id),
            ));
        }
    }
    for (i, tai) in configuration.support_tai_list.iter().enumerate() {
        check_plmn(&mut errors, &format!("configuration.supportTaiList[{}]", i), &tai.plmn_id);
    }
    for (i, item) in configuration.plmn_support_list.iter().enumerate() {
        check_plmn(&mut errors, &format!("configuration.plmnSupportList[{}]", i), &item.plmn_id);
    }

    if let Err(e) = configuration.security.integrity_algorithms() {
        errors.push(ValidationError::new("configuration.security.integrityOrder", e.to_string()));
    }
    if let Err(e) = configuration.security.ciphering_algorithms() {
        errors.push(ValidationError::new("configuration.security.cipheringOrder", e.to_string()));
    }

    if config.metrics.enabled && config.metrics.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "metrics.bindAddress",
            format!("invalid socket address '{}'", config.metrics.bind_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_ip(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if value.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::new(field, format!("invalid IP address '{}'", value)));
    }
}

fn check_plmn(errors: &mut Vec<ValidationError>, field: &str, plmn: &PlmnId) {
    if !plmn.is_well_formed() {
        errors.push(ValidationError::new(
            format!("{}.plmnId", field),
            format!("malformed PLMN '{}'", plmn),
        ));
    }
}
