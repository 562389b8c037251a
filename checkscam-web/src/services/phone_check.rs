//! Multi-provider phone risk aggregation
//!
//! Orchestrates the two validators and merges their answers into a single
//! [`PhoneReputation`]. No failure in here ever reaches the caller: a missing
//! key skips the network entirely and a failed provider call contributes no
//! data, so the worst case is the default all-Unknown verdict.

use checkscam_common::phone::{self, PhoneReputation, PhoneVerdict, UNKNOWN};

use super::numverify_client::{NumverifyClient, NumverifyData};
use super::veriphone_client::{VeriphoneClient, VeriphoneData};

/// Immutable provider configuration, injected at construction.
///
/// Keys are read once at startup (database -> environment -> TOML); the
/// aggregation logic itself never touches ambient configuration.
#[derive(Debug, Clone, Default)]
pub struct PhoneCheckConfig {
    pub numverify_api_key: Option<String>,
    pub veriphone_api_key: Option<String>,
}

/// Phone risk aggregation service
pub struct PhoneCheckService {
    numverify: Option<NumverifyClient>,
    veriphone: Option<VeriphoneClient>,
}

impl PhoneCheckService {
    /// Both keys are required for any outbound call; with either missing the
    /// service stays up but every check returns the default verdict.
    pub fn new(config: PhoneCheckConfig) -> Self {
        let (numverify, veriphone) = match (config.numverify_api_key, config.veriphone_api_key) {
            (Some(numverify_key), Some(veriphone_key)) => {
                match (
                    NumverifyClient::new(numverify_key),
                    VeriphoneClient::new(veriphone_key),
                ) {
                    (Ok(numverify), Ok(veriphone)) => (Some(numverify), Some(veriphone)),
                    (numverify, veriphone) => {
                        if let Err(e) = &numverify {
                            tracing::warn!("Numverify client unavailable: {}", e);
                        }
                        if let Err(e) = &veriphone {
                            tracing::warn!("Veriphone client unavailable: {}", e);
                        }
                        (None, None)
                    }
                }
            }
            _ => {
                tracing::warn!(
                    "Phone validator API keys not configured; checks will return the default verdict"
                );
                (None, None)
            }
        };

        Self { numverify, veriphone }
    }

    /// True when both validator clients are ready.
    pub fn is_configured(&self) -> bool {
        self.numverify.is_some() && self.veriphone.is_some()
    }

    /// Query both validators and merge their answers.
    pub async fn check(&self, raw: &str) -> PhoneReputation {
        let (Some(numverify), Some(veriphone)) = (&self.numverify, &self.veriphone) else {
            return PhoneReputation::default();
        };

        let canonical = phone::normalize(raw);
        tracing::debug!(raw = raw, canonical = %canonical, "Checking phone number");

        // The two sources are independent (neither consumes the other's
        // output), so the lookups run concurrently. The merge below applies
        // a fixed precedence regardless of completion order.
        let (numverify_result, veriphone_result) =
            tokio::join!(numverify.validate(&canonical), veriphone.verify(&canonical));

        let numverify_data = numverify_result
            .map_err(|e| tracing::warn!("Numverify lookup failed: {}", e))
            .ok();
        let veriphone_data = veriphone_result
            .map_err(|e| tracing::warn!("Veriphone lookup failed: {}", e))
            .ok();

        let reputation = merge(numverify_data, veriphone_data);

        tracing::info!(
            canonical = %canonical,
            is_valid = reputation.is_valid,
            line_type = %reputation.line_type,
            carrier = %reputation.carrier,
            is_suspicious = reputation.is_suspicious,
            "Phone check complete"
        );

        reputation
    }

    /// [`check`](Self::check) plus risk-level derivation.
    pub async fn assess(&self, raw: &str) -> PhoneVerdict {
        self.check(raw).await.into_verdict()
    }
}

/// Merge the two validator answers.
///
/// Precedence is fixed: Numverify fields land first, Veriphone fills only
/// slots still at `Unknown`. Validity is the OR of both providers. The
/// suspicion flag comes exclusively from Veriphone's risk level; the
/// voip/virtual signal is recomputed from the merged line type.
fn merge(numverify: Option<NumverifyData>, veriphone: Option<VeriphoneData>) -> PhoneReputation {
    let mut reputation = PhoneReputation::default();

    if let Some(data) = &numverify {
        reputation.has_data = true;
        reputation.is_valid = data.valid;
        if let Some(line_type) = non_empty(data.line_type.as_deref()) {
            reputation.line_type = line_type.to_string();
        }
        if let Some(carrier) = non_empty(data.carrier.as_deref()) {
            reputation.carrier = carrier.to_string();
        }
    }

    if let Some(data) = &veriphone {
        reputation.has_data = true;

        if reputation.carrier == UNKNOWN {
            if let Some(carrier) = non_empty(data.carrier.as_deref()) {
                reputation.carrier = carrier.to_string();
            }
        }
        if reputation.line_type == UNKNOWN {
            if let Some(phone_type) = non_empty(data.phone_type.as_deref()) {
                reputation.line_type = phone_type.to_string();
            }
        }

        reputation.is_suspicious =
            matches!(data.risk_level.as_deref(), Some("high") | Some("medium"));
        reputation.is_valid = reputation.is_valid || data.is_valid;
    }

    reputation.is_virtual = phone::is_virtual_line_type(&reputation.line_type);
    reputation
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
