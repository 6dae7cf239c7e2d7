//! Per-caller request budgets backed by the database ledger.

use std::time::Duration;

use database::rate_limit::check_and_record;
use database::SqlitePool;
use tracing::{error, warn};

/// Budget name for `/verify-password`.
pub const VERIFY_PASSWORD: &str = "verify-password";
/// Budget name for `/ai-analyst`.
pub const AI_ANALYST: &str = "ai-analyst";
/// Budget name for `/generate-insight`.
pub const GENERATE_INSIGHT: &str = "generate-insight";
/// Budget name for `/generate-title`.
pub const GENERATE_TITLE: &str = "generate-title";

/// Requests allowed per sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub max_requests: u32,
    pub window: Duration,
}

impl Budget {
    const fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

/// Budget for a named endpoint, if it has one.
pub fn budget_for(endpoint: &str) -> Option<Budget> {
    match endpoint {
        VERIFY_PASSWORD => Some(Budget::per_minute(5)),
        AI_ANALYST => Some(Budget::per_minute(20)),
        GENERATE_INSIGHT => Some(Budget::per_minute(30)),
        GENERATE_TITLE => Some(Budget::per_minute(60)),
        _ => None,
    }
}

/// What to do when the ledger itself cannot be read or written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Let the request through.
    #[default]
    FailOpen,
    /// Refuse the request.
    FailClosed,
}

/// Sliding-window rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    pool: SqlitePool,
    policy: FailurePolicy,
}

impl RateLimiter {
    /// Create a limiter over the given pool.
    pub fn new(pool: SqlitePool, policy: FailurePolicy) -> Self {
        Self { pool, policy }
    }

    /// The configured failure policy.
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Whether `identifier` may call `endpoint` now. Allowed calls are recorded.
    pub async fn check(&self, identifier: &str, endpoint: &str) -> bool {
        let Some(budget) = budget_for(endpoint) else {
            warn!(endpoint = %endpoint, "No rate limit configured for endpoint");
            return true;
        };

        match check_and_record(
            &self.pool,
            identifier,
            endpoint,
            budget.max_requests,
            budget.window,
        )
        .await
        {
            Ok(true) => true,
            Ok(false) => {
                warn!(
                    endpoint = %endpoint,
                    identifier = %identifier,
                    max = budget.max_requests,
                    "Rate limit exceeded"
                );
                false
            }
            Err(e) => {
                error!(endpoint = %endpoint, "Rate limit check failed: {}", e);
                self.policy == FailurePolicy::FailOpen
            }
        }
    }
}
