//! Phone normalization and risk classification core
//!
//! Everything in this module is pure and synchronous: the provider HTTP
//! clients and the aggregation service live in checkscam-web, feed their
//! answers into [`PhoneReputation`], and read the derived [`RiskLevel`]
//! back out. Keeping the decision table here lets it be tested without any
//! network access.

use serde::{Deserialize, Serialize};

/// Single supported country calling code (Vietnam).
pub const COUNTRY_CODE: &str = "84";

/// Sentinel for provider fields with no reported value.
pub const UNKNOWN: &str = "Unknown";

/// Normalize a user-supplied phone string to international format.
///
/// Rules, applied in order, first match wins:
/// 1. Strip every character except ASCII digits and a leading `+`.
/// 2. Leading `0` and 9-10 characters total: the `0` becomes `+84`.
/// 3. Bare country code (`84...`, length >= 10): prefix `+`.
/// 4. Already `+`-prefixed: returned unchanged.
/// 5. 9-10 digits with no prefix at all: prefix `+84`.
/// 6. Anything else passes through untouched.
///
/// Never fails. Malformed input degrades to a best-effort string that the
/// downstream validators reject on their own.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();

    let mut cleaned = String::with_capacity(trimmed.len());
    for (i, ch) in trimmed.chars().enumerate() {
        if ch.is_ascii_digit() || (ch == '+' && i == 0) {
            cleaned.push(ch);
        }
    }

    if cleaned.starts_with('0') && (cleaned.len() == 9 || cleaned.len() == 10) {
        return format!("+{}{}", COUNTRY_CODE, &cleaned[1..]);
    }

    if cleaned.starts_with(COUNTRY_CODE) && cleaned.len() >= 10 {
        return format!("+{}", cleaned);
    }

    if cleaned.starts_with('+') {
        return cleaned;
    }

    if cleaned.len() >= 9 && cleaned.len() <= 10 {
        return format!("+{}{}", COUNTRY_CODE, cleaned);
    }

    cleaned
}

/// True when a reported line type denotes a virtual/VoIP line.
///
/// Substring match, case-insensitive. This drives the High escalation rule
/// and is tracked separately from the Veriphone suspicion flag.
pub fn is_virtual_line_type(line_type: &str) -> bool {
    let lower = line_type.to_lowercase();
    lower.contains("voip") || lower.contains("virtual")
}

/// Tri-level scam-risk classification, ordered `Low < Medium < High`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Raise to `other` when it is more severe. Never downgrades.
    pub fn escalate(self, other: RiskLevel) -> RiskLevel {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Parse the stored string form; anything unrecognized reads as Low.
    pub fn from_str_lossy(value: &str) -> RiskLevel {
        match value {
            "High" => RiskLevel::High,
            "Medium" => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merged evidence from the two phone validators.
///
/// `is_suspicious` carries only Veriphone's explicit risk flag and
/// `is_virtual` only the voip/virtual line-type signal. Both currently drive
/// the same High escalation but stay separate fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneReputation {
    /// True when either validator confirmed the number exists.
    pub is_valid: bool,
    /// Line type ("mobile", "landline", "voip", ...), `Unknown` if unreported.
    pub line_type: String,
    /// Carrier name, `Unknown` if unreported.
    pub carrier: String,
    /// Veriphone reported an explicit high/medium risk level.
    pub is_suspicious: bool,
    /// Merged line type denotes a voip/virtual line.
    pub is_virtual: bool,
    /// True when at least one validator returned a parseable payload.
    pub has_data: bool,
}

impl Default for PhoneReputation {
    fn default() -> Self {
        Self {
            is_valid: false,
            line_type: UNKNOWN.to_string(),
            carrier: UNKNOWN.to_string(),
            is_suspicious: false,
            is_virtual: false,
            has_data: false,
        }
    }
}

impl PhoneReputation {
    /// Derive the risk label from the merged evidence.
    ///
    /// With no provider data at all (keys missing, or both calls failed) the
    /// verdict stays at the Low default; the Medium and High rules only weigh
    /// evidence that actually arrived. Escalation is one-way.
    pub fn risk_level(&self) -> RiskLevel {
        if !self.has_data {
            return RiskLevel::Low;
        }

        let mut level = RiskLevel::Low;

        if !self.is_valid || self.carrier == UNKNOWN || self.line_type == "voip" {
            level = level.escalate(RiskLevel::Medium);
        }

        if self.is_suspicious || self.is_virtual {
            level = level.escalate(RiskLevel::High);
        }

        level
    }

    pub fn into_verdict(self) -> PhoneVerdict {
        let risk_level = self.risk_level();
        PhoneVerdict {
            reputation: self,
            risk_level,
        }
    }
}

/// Final per-query verdict.
///
/// Ephemeral: never stored directly. A curated report row is derived from it
/// only when the number is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneVerdict {
    #[serde(flatten)]
    pub reputation: PhoneReputation,
    pub risk_level: RiskLevel,
}

impl PhoneVerdict {
    /// Out-of-band oracle override: a true signal forces High.
    ///
    /// Leaves the suspicion flag untouched; the oracle is a third signal, not
    /// a validator.
    pub fn apply_oracle(&mut self, oracle_confirms_scam: bool) {
        if oracle_confirms_scam {
            self.risk_level = self.risk_level.escalate(RiskLevel::High);
        }
    }

    /// Medium and High verdicts warrant a caution banner in the UI.
    pub fn warrants_warning(&self) -> bool {
        self.risk_level >= RiskLevel::Medium
    }
}

impl Default for PhoneVerdict {
    fn default() -> Self {
        PhoneReputation::default().into_verdict()
    }
}
