//! Engine runtime configuration.
//!
//! Configuration is resolved once at process startup and handed to the engine
//! as a value. Nothing here reads process-wide environment variables during
//! request handling; that leads to inconsistent behaviour in multi-threaded
//! runtimes and test harnesses, so the binaries pass resolved values in.

use std::net::SocketAddr;

use crate::{TriageError, TriageResult};

/// Default address the REST server binds to when none is configured.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Engine configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    rest_addr: SocketAddr,
    jitter_seed: Option<u64>,
}

impl EngineConfig {
    /// Create a new `EngineConfig`.
    pub fn new(rest_addr: SocketAddr, jitter_seed: Option<u64>) -> Self {
        Self {
            rest_addr,
            jitter_seed,
        }
    }

    pub fn rest_addr(&self) -> SocketAddr {
        self.rest_addr
    }

    /// Seed for the scoring and wait-time jitter. `None` means seed from
    /// operating-system entropy; a fixed value makes every draw reproducible.
    pub fn jitter_seed(&self) -> Option<u64> {
        self.jitter_seed
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rest_addr: default_rest_addr(),
            jitter_seed: None,
        }
    }
}

fn default_rest_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

/// Parse the REST bind address from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_REST_ADDR`].
pub fn rest_addr_from_env_value(value: Option<String>) -> TriageResult<SocketAddr> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        Some(v) => v
            .parse()
            .map_err(|_| TriageError::Validation(format!("invalid REST address: {v}"))),
        None => Ok(default_rest_addr()),
    }
}

/// Parse the jitter seed from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `None` and the engine
/// seeds its generator from operating-system entropy.
pub fn jitter_seed_from_env_value(value: Option<String>) -> TriageResult<Option<u64>> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    value
        .map(|v| {
            v.parse::<u64>()
                .map_err(|_| TriageError::Validation(format!("invalid jitter seed: {v}")))
        })
        .transpose()
}
