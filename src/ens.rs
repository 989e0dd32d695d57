//! ENS subname claims for agents. Stateless: the request is validated and a
//! name under the configured base domain is formatted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENS_APP_URL: &str = "https://app.ens.domains";
pub const MAX_LABEL_LEN: usize = 32;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClaimEnsRequest {
    pub agent_id: u64,
    pub custom_name: String,
    pub wallet_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimEnsResponse {
    pub success: bool,
    pub ens_name: String,
    pub ens_app_url: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnsError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid ENS name")]
    InvalidName,
}

/// Lowercase, keep `[a-z0-9-]`, cap at 32 characters.
pub fn sanitize_label(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .take(MAX_LABEL_LEN)
        .collect()
}

pub fn claim(request: &ClaimEnsRequest, base_domain: &str) -> Result<ClaimEnsResponse, EnsError> {
    if request.agent_id == 0
        || request.custom_name.is_empty()
        || request.wallet_address.is_empty()
    {
        return Err(EnsError::MissingFields);
    }

    let label = sanitize_label(&request.custom_name);
    if label.is_empty() {
        return Err(EnsError::InvalidName);
    }

    let ens_name = format!("{label}.{base_domain}");
    Ok(ClaimEnsResponse {
        success: true,
        ens_app_url: format!("{ENS_APP_URL}/name/{ens_name}"),
        message: format!("Successfully prepared ENS name: {ens_name}"),
        ens_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> ClaimEnsRequest {
        ClaimEnsRequest {
            agent_id: 3,
            custom_name: name.into(),
            wallet_address: "0x5b6A404F8958E7e10028301549e61435925725Bf".into(),
        }
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("My Cool Agent!!"), "mycoolagent");
        assert_eq!(sanitize_label("###"), "");
        assert_eq!(sanitize_label("degen-bot_v2"), "degen-botv2");
        assert_eq!(sanitize_label(&"a".repeat(40)).len(), MAX_LABEL_LEN);
    }

    #[test]
    fn test_claim_formats_name_and_url() {
        let resp = claim(&request("My Cool Agent!!"), "liqu.finance.eth").unwrap();
        assert!(resp.success);
        assert_eq!(resp.ens_name, "mycoolagent.liqu.finance.eth");
        assert_eq!(
            resp.ens_app_url,
            "https://app.ens.domains/name/mycoolagent.liqu.finance.eth"
        );
    }

    #[test]
    fn test_claim_rejects_bad_input() {
        assert_eq!(
            claim(&request("###"), "liqu.finance.eth"),
            Err(EnsError::InvalidName)
        );

        let mut missing = request("agent");
        missing.agent_id = 0;
        assert_eq!(claim(&missing, "liqu.finance.eth"), Err(EnsError::MissingFields));

        let mut missing = request("agent");
        missing.wallet_address.clear();
        assert_eq!(claim(&missing, "liqu.finance.eth"), Err(EnsError::MissingFields));
    }
}
