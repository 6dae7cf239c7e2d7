//! Readers for the aggregate metrics views.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::{ChannelPerformance, CustomerHealth, KpiSummary, PlanRevenue, RevenuePoint};

/// The single KPI row, if the view produced one.
pub async fn kpi_summary(pool: &SqlitePool) -> Result<Option<KpiSummary>> {
    let row = sqlx::query_as::<_, KpiSummary>(
        r#"
        SELECT mrr, arr, total_revenue, total_customers, active_customers,
               new_customers, churned_customers, churn_rate, cac
        FROM v_kpi_summary
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Monthly revenue, newest month first.
pub async fn revenue_over_time(pool: &SqlitePool, months: i64) -> Result<Vec<RevenuePoint>> {
    let rows = sqlx::query_as::<_, RevenuePoint>(
        r#"
        SELECT month, revenue, invoice_count, paid_count
        FROM v_revenue_over_time
        ORDER BY month DESC
        LIMIT ?
        "#,
    )
    .bind(months)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Revenue per plan, largest first.
pub async fn revenue_by_plan(pool: &SqlitePool) -> Result<Vec<PlanRevenue>> {
    let rows = sqlx::query_as::<_, PlanRevenue>(
        r#"
        SELECT plan_name, price_monthly, customer_count, monthly_revenue, percentage
        FROM v_revenue_by_plan
        ORDER BY monthly_revenue DESC, plan_name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Acquisition funnel totals per channel.
pub async fn acquisition_performance(pool: &SqlitePool) -> Result<Vec<ChannelPerformance>> {
    let rows = sqlx::query_as::<_, ChannelPerformance>(
        r#"
        SELECT channel_name, total_leads, total_conversions, total_spend,
               conversion_rate, cost_per_acquisition
        FROM v_acquisition_performance
        ORDER BY channel_name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Health of every non-churned customer, least healthy first.
pub async fn customer_health(pool: &SqlitePool) -> Result<Vec<CustomerHealth>> {
    let rows = sqlx::query_as::<_, CustomerHealth>(
        r#"
        SELECT id, name, email, company, country, industry, plan_name,
               health_score, status, risk_level, created_at
        FROM v_customer_health
        ORDER BY health_score ASC, company ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
