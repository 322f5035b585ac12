use serde::{Deserialize, Serialize};

use crate::error::JoseError;

/// How much a rejected token's error reveals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorDisclosure {
    /// Algorithm mismatches and failed verification are both reported as
    /// [`JoseError::InvalidToken`].
    #[default]
    Opaque,
    /// Report them separately. For diagnostics only.
    Detailed,
}

/// Time-claim checking defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimsConfig {
    /// Clock skew tolerated on `exp`, `nbf` and `iat`, in seconds.
    pub leeway_secs: u64,
    /// Oldest acceptable `iat`, in seconds. `None` disables the check.
    pub max_age_secs: Option<u64>,
}

/// Engine configuration, built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// JOSE identifiers the engine will accept, e.g. `["ES256", "A256KW", "A256GCM"]`.
    pub allowed_algorithms: Vec<String>,
    pub error_disclosure: ErrorDisclosure,
    pub claims: ClaimsConfig,
}

impl EngineConfig {
    pub fn new<I, S>(allowed_algorithms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_algorithms: allowed_algorithms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_error_disclosure(mut self, disclosure: ErrorDisclosure) -> Self {
        self.error_disclosure = disclosure;
        self
    }

    pub fn with_claims(mut self, claims: ClaimsConfig) -> Self {
        self.claims = claims;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, JoseError> {
        serde_json::from_str(json).map_err(|e| JoseError::Config(e.to_string()))
    }
}
