//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::NfConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Toml(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "[Configuration] IO error: {}", e),
            ConfigError::Yaml(e) => write!(f, "[Configuration] YAML error: {}", e),
            ConfigError::Toml(e) => write!(f, "[Configuration] TOML error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "[Configuration] Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration. `.toml` files are read as TOML,
/// everything else as YAML.
pub fn load_config(path: &Path) -> Result<NfConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let is_toml = path.extension().and_then(|ext| ext.to_str()) == Some("toml");

    let config: NfConfig = if is_toml {
        toml::from_str(&content).map_err(ConfigError::Toml)?
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::Yaml)?
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
info:
  version: 1.0.0
  description: AMF initial local configuration
configuration:
  amfName: AMF
  ngapIpList:
    - 127.0.0.1
  sbi:
    scheme: http
    registerIPv4: 127.0.0.18
    bindingIPv4: 127.0.0.18
    port: 8000
  serviceNameList:
    - namf-comm
    - namf-evts
  servedGuamiList:
    - plmnId:
        mcc: "208"
        mnc: "93"
      amfId: cafe00
  supportTaiList:
    - plmnId:
        mcc: "208"
        mnc: "93"
      tac: "1"
  plmnSupportList:
    - plmnId:
        mcc: "208"
        mnc: "93"
      snssaiList:
        - sst: 1
          sd: "010203"
  supportDnnList:
    - internet
  nrfUri: http://127.0.0.10:8000
  security:
    integrityOrder: [NIA2]
    cipheringOrder: [NEA0]
  networkName:
    full: free5GC
    short: free
  t3502: 720
  t3512: 3600
  non3gppDeregistrationTimer: 3240
"#;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_yaml_document() {
        let file = write_temp(".yaml", YAML);
        let config = load_config(file.path()).unwrap();
        let configuration = &config.configuration;
        assert_eq!(config.info.version, "1.0.0");
        assert_eq!(configuration.service_name_list, vec!["namf-comm", "namf-evts"]);
        assert_eq!(configuration.served_guami_list[0].amf_id, "cafe00");
        assert_eq!(configuration.plmn_support_list[0].snssai_list[0].sd.as_deref(), Some("010203"));
        assert_eq!(configuration.network_name.full, "free5GC");
        assert_eq!(configuration.sbi.port, 8000);
    }

    #[test]
    fn loads_toml_document() {
        let toml = "[configuration]\namfName = \"AMF-T\"\nnrfUri = \"http://127.0.0.1:29510\"\n\n[configuration.sbi]\nport = 29518\n";
        let file = write_temp(".toml", toml);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.configuration.amf_name, "AMF-T");
        assert_eq!(config.configuration.sbi.port, 29518);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/amfcfg.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn invalid_values_are_all_reported() {
        let yaml = "configuration:\n  sbi:\n    scheme: ftp\n    port: 0\n  nrfUri: not a uri\n";
        let file = write_temp(".yaml", yaml);
        match load_config(file.path()).unwrap_err() {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let file = write_temp(".yml", "configuration: [unclosed");
        assert!(matches!(load_config(file.path()).unwrap_err(), ConfigError::Yaml(_)));
    }
}
