//! Database models.

use std::str::FromStr;

use analyst_core::Role;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A saved analyst conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    /// UUID v4 string.
    pub id: String,
    /// Sanitized title, at most 50 characters.
    pub title: String,
    /// Creation timestamp (RFC 3339, UTC).
    pub created_at: String,
    /// Bumped whenever a message is appended.
    pub updated_at: String,
}

/// One stored message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    /// `user` or `assistant`.
    pub role: String,
    pub content: String,
    pub created_at: String,
}

impl Message {
    /// Parsed role, if the stored value is one we know.
    pub fn role(&self) -> Option<Role> {
        Role::from_str(&self.role).ok()
    }
}

/// Row of `v_kpi_summary`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct KpiSummary {
    pub mrr: f64,
    pub arr: f64,
    pub total_revenue: f64,
    pub total_customers: i64,
    pub active_customers: i64,
    pub new_customers: i64,
    pub churned_customers: i64,
    /// Fraction, e.g. `0.053` for 5.3%.
    pub churn_rate: f64,
    pub cac: f64,
}

/// Row of `v_revenue_over_time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RevenuePoint {
    /// `YYYY-MM`.
    pub month: String,
    pub revenue: f64,
    pub invoice_count: i64,
    pub paid_count: i64,
}

/// Row of `v_revenue_by_plan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PlanRevenue {
    pub plan_name: String,
    pub price_monthly: f64,
    pub customer_count: i64,
    pub monthly_revenue: f64,
    /// Share of MRR as a fraction.
    pub percentage: f64,
}

/// Row of `v_acquisition_performance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChannelPerformance {
    pub channel_name: String,
    pub total_leads: i64,
    pub total_conversions: i64,
    pub total_spend: f64,
    /// Conversions per lead as a fraction.
    pub conversion_rate: f64,
    pub cost_per_acquisition: f64,
}

/// Row of `v_customer_health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CustomerHealth {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub country: String,
    pub industry: String,
    pub plan_name: Option<String>,
    pub health_score: i64,
    pub status: String,
    /// `high`, `medium` or `low`.
    pub risk_level: String,
    pub created_at: String,
}
