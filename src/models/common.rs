//! Identity types served by the NF.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Public land mobile network identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
pub struct PlmnId {
    /// Mobile country code (three digits).
    pub mcc: String,
    /// Mobile network code (two or three digits).
    pub mnc: String,
}

impl PlmnId {
    pub fn new(mcc: impl Into<String>, mnc: impl Into<String>) -> Self {
        Self {
            mcc: mcc.into(),
            mnc: mnc.into(),
        }
    }

    /// Returns true when both codes have a valid digit count.
    pub fn is_well_formed(&self) -> bool {
        let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        self.mcc.len() == 3 && digits(&self.mcc) && (2..=3).contains(&self.mnc.len()) && digits(&self.mnc)
    }
}

impl fmt::Display for PlmnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.mcc, self.mnc)
    }
}

/// Globally unique AMF identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Guami {
    pub plmn_id: PlmnId,
    /// AMF identifier as six hex digits (region, set, pointer).
    pub amf_id: String,
}

/// Decoded 24-bit AMF identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmfId {
    /// 8-bit AMF region ID.
    pub region: u8,
    /// 10-bit AMF set ID.
    pub set: u16,
    /// 6-bit AMF pointer.
    pub pointer: u8,
}

impl AmfId {
    /// Parse a six-hex-digit AMF identifier such as `cafe00`.
    pub fn parse(hex: &str) -> Option<Self> {
        if hex.len() != 6 {
            return None;
        }
        let raw = u32::from_str_radix(hex, 16).ok()?;
        Some(Self {
            region: (raw >> 16) as u8,
            set: ((raw >> 6) & 0x3ff) as u16,
            pointer: (raw & 0x3f) as u8,
        })
    }

    /// Region ID in registry notation (two hex digits).
    pub fn region_hex(&self) -> String {
        format!("{:02x}", self.region)
    }

    /// Set ID in registry notation (three hex digits).
    pub fn set_hex(&self) -> String {
        format!("{:03x}", self.set)
    }
}

/// Tracking area identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tai {
    pub plmn_id: PlmnId,
    /// Tracking area code (hex digits).
    pub tac: String,
}

/// Single network slice selection assistance information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Snssai {
    pub sst: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sd: Option<String>,
}

/// PLMN together with the slices supported in it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlmnSupportItem {
    pub plmn_id: PlmnId,
    #[serde(default)]
    pub snssai_list: Vec<Snssai>,
}

/// Network name shown to UEs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct NetworkName {
    #[serde(default)]
    pub full: String,
    #[serde(default)]
    pub short: String,
}
