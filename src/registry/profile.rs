//! NF profile construction.

use thiserror::Error;

use crate::config::NfConfig;
use crate::models::nrf::{AmfInfo, IpEndPoint, NfProfile, NfService, NfServiceVersion};
use crate::models::{AmfId, Snssai};
use crate::services::enabled_services;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    /// A field the registry requires is absent from the configuration.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("malformed AMF id '{0}'")]
    InvalidAmfId(String),
}

/// Build this NF's profile. Pure: reads only `config`.
pub fn build_profile(config: &NfConfig, nf_id: &str) -> Result<NfProfile, ProfileError> {
    let configuration = &config.configuration;
    let sbi = &configuration.sbi;

    let first_guami = configuration
        .served_guami_list
        .first()
        .ok_or(ProfileError::MissingField("servedGuamiList"))?;
    let register_ip = sbi
        .register_ipv4
        .as_deref()
        .filter(|ip| !ip.is_empty())
        .ok_or(ProfileError::MissingField("sbi.registerIPv4"))?;
    let amf_id = AmfId::parse(&first_guami.amf_id).ok_or_else(|| ProfileError::InvalidAmfId(first_guami.amf_id.clone()))?;

    let mut s_nssais: Vec<Snssai> = Vec::new();
    for snssai in configuration.plmn_support_list.iter().flat_map(|item| &item.snssai_list) {
        if !s_nssais.contains(snssai) {
            s_nssais.push(snssai.clone());
        }
    }

    let api_prefix = format!("{}://{}:{}", sbi.scheme, register_ip, sbi.port);
    let nf_services = enabled_services(&configuration.service_name_list)
        .into_iter()
        .enumerate()
        .map(|(index, service)| NfService {
            service_instance_id: index.to_string(),
            service_name: service.as_str().to_string(),
            versions: vec![NfServiceVersion {
                api_version_in_uri: "v1".to_string(),
                api_full_version: "1.0.0".to_string(),
            }],
            scheme: sbi.scheme.clone(),
            nf_service_status: "REGISTERED".to_string(),
            ip_end_points: vec![IpEndPoint {
                ipv4_address: register_ip.to_string(),
                transport: "TCP".to_string(),
                port: sbi.port,
            }],
            api_prefix: Some(api_prefix.clone()),
        })
        .collect();

    Ok(NfProfile {
        nf_instance_id: nf_id.to_string(),
        nf_type: "AMF".to_string(),
        nf_status: "REGISTERED".to_string(),
        plmn_list: configuration.plmn_support_list.iter().map(|item| item.plmn_id.clone()).collect(),
        s_nssais,
        ipv4_addresses: vec![register_ip.to_string()],
        amf_info: Some(AmfInfo {
            amf_set_id: amf_id.set_hex(),
            amf_region_id: amf_id.region_hex(),
            guami_list: configuration.served_guami_list.clone(),
            tai_list: configuration.support_tai_list.clone(),
        }),
        nf_services,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Guami, PlmnId, PlmnSupportItem};

    fn config() -> NfConfig {
        let mut config = NfConfig::default();
        let configuration = &mut config.configuration;
        configuration.sbi.register_ipv4 = Some("127.0.0.18".into());
        configuration.sbi.port = 8000;
        configuration.service_name_list = vec!["namf-comm".into(), "bogus".into(), "namf-mt".into()];
        configuration.served_guami_list = vec![Guami {
            plmn_id: PlmnId::new("208", "93"),
            amf_id: "cafe00".into(),
        }];
        let slice = Snssai { sst: 1, sd: Some("010203".into()) };
        configuration.plmn_support_list = vec![
            PlmnSupportItem { plmn_id: PlmnId::new("208", "93"), snssai_list: vec![slice.clone()] },
            PlmnSupportItem { plmn_id: PlmnId::new("208", "95"), snssai_list: vec![slice] },
        ];
        config
    }

    #[test]
    fn builds_amf_profile() {
        let profile = build_profile(&config(), "nf-1").unwrap();
        assert_eq!(profile.nf_instance_id, "nf-1");
        assert_eq!(profile.nf_type, "AMF");
        assert_eq!(profile.plmn_list.len(), 2);
        assert_eq!(profile.s_nssais.len(), 1);

        let amf_info = profile.amf_info.unwrap();
        assert_eq!(amf_info.amf_region_id, "ca");
        assert_eq!(amf_info.amf_set_id, "3f8");

        let names: Vec<_> = profile.nf_services.iter().map(|s| s.service_name.as_str()).collect();
        assert_eq!(names, vec!["namf-comm", "namf-mt"]);
        assert_eq!(profile.nf_services[1].api_prefix.as_deref(), Some("http://127.0.0.18:8000"));
    }

    #[test]
    fn serializes_registry_field_names() {
        let json = serde_json::to_value(build_profile(&config(), "nf-1").unwrap()).unwrap();
        assert_eq!(json["nfInstanceId"], "nf-1");
        assert_eq!(json["sNssais"][0]["sst"], 1);
        assert_eq!(json["amfInfo"]["guamiList"][0]["amfId"], "cafe00");
        assert_eq!(json["nfServices"][0]["ipEndPoints"][0]["ipv4Address"], "127.0.0.18");
    }

    #[test]
    fn missing_identity_fields_fail() {
        let mut no_guami = config();
        no_guami.configuration.served_guami_list.clear();
        assert_eq!(build_profile(&no_guami, "x").unwrap_err(), ProfileError::MissingField("servedGuamiList"));

        let mut no_address = config();
        no_address.configuration.sbi.register_ipv4 = None;
        assert_eq!(build_profile(&no_address, "x").unwrap_err(), ProfileError::MissingField("sbi.registerIPv4"));
    }
}
