//! Time-window checks for claims recovered from a verified or decrypted token.
//!
//! The engine never calls these implicitly: payloads are opaque to it.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::config::ClaimsConfig;
use crate::error::ClaimsError;

#[derive(Debug, Clone, Default)]
pub struct ClaimsValidator {
    leeway_secs: i64,
    max_age_secs: Option<i64>,
    require_exp: bool,
    now: Option<DateTime<Utc>>,
}

impl ClaimsValidator {
    pub fn new(config: &ClaimsConfig) -> Self {
        Self {
            leeway_secs: clamp(config.leeway_secs),
            max_age_secs: config.max_age_secs.map(clamp),
            require_exp: false,
            now: None,
        }
    }

    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway_secs = clamp(secs);
        self
    }

    pub fn with_max_age(mut self, secs: u64) -> Self {
        self.max_age_secs = Some(clamp(secs));
        self
    }

    /// Reject tokens without an `exp` claim.
    pub fn require_exp(mut self) -> Self {
        self.require_exp = true;
        self
    }

    /// Evaluate against a fixed instant instead of the system clock.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Parse `payload` as a JSON object and check its time claims.
    pub fn validate(&self, payload: &[u8]) -> Result<Map<String, Value>, ClaimsError> {
        let claims: Map<String, Value> =
            serde_json::from_slice(payload).map_err(|e| ClaimsError::NotAnObject(e.to_string()))?;
        self.validate_claims(&claims)?;
        Ok(claims)
    }

    pub fn validate_claims(&self, claims: &Map<String, Value>) -> Result<(), ClaimsError> {
        let now = self.now.unwrap_or_else(Utc::now).timestamp();
        let leeway = self.leeway_secs;

        match numeric_date(claims, "exp")? {
            Some(exp) if now >= exp.saturating_add(leeway) => return Err(ClaimsError::Expired),
            None if self.require_exp => return Err(ClaimsError::Missing("exp")),
            _ => {}
        }

        if let Some(nbf) = numeric_date(claims, "nbf")? {
            if now.saturating_add(leeway) < nbf {
                return Err(ClaimsError::NotYetValid);
            }
        }

        match (numeric_date(claims, "iat")?, self.max_age_secs) {
            (Some(iat), _) if now.saturating_add(leeway) < iat => {
                return Err(ClaimsError::IssuedInFuture)
            }
            (Some(iat), Some(max_age)) if now.saturating_sub(iat) > max_age.saturating_add(leeway) => {
                return Err(ClaimsError::TooOld)
            }
            (None, Some(_)) => return Err(ClaimsError::Missing("iat")),
            _ => {}
        }
        Ok(())
    }
}

fn numeric_date(claims: &Map<String, Value>, name: &'static str) -> Result<Option<i64>, ClaimsError> {
    match claims.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or(ClaimsError::InvalidNumericDate(name)),
    }
}

fn clamp(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX)
}
