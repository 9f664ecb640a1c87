use crate::page::{display_code, link_or_fallback};
use serde::{Deserialize, Serialize};

const ACTIVATED_VALUE: &str = "true";

/// The two stored entries as read for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromoRecord {
    pub url: Option<String>,
    pub activated: bool,
}

impl PromoRecord {
    pub fn from_entries(url: Option<String>, activated: Option<&str>) -> Self {
        Self {
            url,
            activated: activated == Some(ACTIVATED_VALUE),
        }
    }
}

pub fn activated_value(activated: bool) -> &'static str {
    if activated {
        ACTIVATED_VALUE
    } else {
        "false"
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoSpecification {
    pub url: Option<String>,
    pub activated: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PromoState {
    pub url: String,
    pub code: String,
    pub activated: bool,
}

impl From<&PromoRecord> for PromoState {
    fn from(record: &PromoRecord) -> Self {
        let url = link_or_fallback(record.url.as_deref());
        Self {
            url: url.to_string(),
            code: display_code(url).to_string(),
            activated: record.activated,
        }
    }
}
