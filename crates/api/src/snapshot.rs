//! Metrics snapshot: the business context handed to the analyst.
//!
//! Five views are read concurrently and rendered as one Markdown block. A
//! failed query is logged and rendered as zeros or an empty section, so the
//! chat keeps working on partial data.

use database::metrics;
use database::{
    ChannelPerformance, CustomerHealth, KpiSummary, PlanRevenue, RevenuePoint, SqlitePool,
};
use tracing::warn;

/// Months of revenue history fetched.
pub const REVENUE_MONTHS: i64 = 12;

/// Months of revenue rendered in the analyst snapshot.
pub const TREND_ROWS: usize = 6;

/// Months of revenue rendered in the insight context.
pub const INSIGHT_MONTHS: usize = 3;

/// At-risk customers listed by name.
pub const AT_RISK_ROWS: usize = 5;

/// Raw view rows behind a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub kpi: KpiSummary,
    /// Newest month first.
    pub revenue: Vec<RevenuePoint>,
    pub plans: Vec<PlanRevenue>,
    pub channels: Vec<ChannelPerformance>,
    pub health: Vec<CustomerHealth>,
}

impl MetricsSnapshot {
    /// Read all five views in parallel.
    pub async fn fetch(pool: &SqlitePool) -> Self {
        let (kpi, revenue, plans, channels, health) = tokio::join!(
            metrics::kpi_summary(pool),
            metrics::revenue_over_time(pool, REVENUE_MONTHS),
            metrics::revenue_by_plan(pool),
            metrics::acquisition_performance(pool),
            metrics::customer_health(pool),
        );

        Self {
            kpi: or_empty("v_kpi_summary", kpi).unwrap_or_default(),
            revenue: or_empty("v_revenue_over_time", revenue),
            plans: or_empty("v_revenue_by_plan", plans),
            channels: or_empty("v_acquisition_performance", channels),
            health: or_empty("v_customer_health", health),
        }
    }

    fn count_risk(&self, level: &str) -> usize {
        self.health.iter().filter(|c| c.risk_level == level).count()
    }

    fn at_risk(&self) -> impl Iterator<Item = &CustomerHealth> {
        self.health
            .iter()
            .filter(|c| c.risk_level == "high" || c.risk_level == "medium")
    }

    /// Markdown block appended to the analyst system prompt.
    pub fn render(&self) -> String {
        let kpi = &self.kpi;
        let mut lines = vec![
            "## Current Business Metrics".to_string(),
            String::new(),
            "### Key Performance Indicators".to_string(),
            format!("- **MRR (Monthly Recurring Revenue):** {}", money(kpi.mrr)),
            format!("- **ARR (Annual Recurring Revenue):** {}", money(kpi.arr)),
            format!("- **Total Revenue:** {}", money(kpi.total_revenue)),
            format!("- **Total Customers:** {}", kpi.total_customers),
            format!("- **Active Customers:** {}", kpi.active_customers),
            format!("- **New Customers (this period):** {}", kpi.new_customers),
            format!("- **Churned Customers:** {}", kpi.churned_customers),
            format!("- **Churn Rate:** {}", percent(kpi.churn_rate)),
            format!("- **Customer Acquisition Cost (CAC):** {}", money(kpi.cac)),
            String::new(),
            "### Revenue by Plan".to_string(),
        ];

        lines.extend(self.plans.iter().map(|p| {
            format!(
                "- **{}:** {}/month ({} customers, {} of revenue)",
                p.plan_name,
                money(p.monthly_revenue),
                p.customer_count,
                percent(p.percentage)
            )
        }));

        lines.push(String::new());
        lines.push("### Revenue Trend (Last 12 Months)".to_string());
        lines.extend(self.revenue.iter().take(TREND_ROWS).map(|r| {
            format!(
                "- {}: {} ({} invoices, {} paid)",
                r.month,
                money(r.revenue),
                r.invoice_count,
                r.paid_count
            )
        }));

        lines.push(String::new());
        lines.push("### Acquisition Channel Performance".to_string());
        lines.extend(self.channels.iter().map(|a| {
            format!(
                "- **{}:** {} conversions, {} rate, {} CPA",
                a.channel_name,
                a.total_conversions,
                percent(a.conversion_rate),
                money(a.cost_per_acquisition.round())
            )
        }));

        lines.push(String::new());
        lines.push("### Customer Health Overview".to_string());
        lines.push(format!(
            "- **Total Customers Tracked:** {}",
            self.health.len()
        ));
        lines.push(format!(
            "- **At-Risk Customers (Medium/High Risk):** {}",
            self.at_risk().count()
        ));
        lines.push(format!("- **High Risk:** {}", self.count_risk("high")));
        lines.push(format!("- **Medium Risk:** {}", self.count_risk("medium")));
        lines.push(format!("- **Low Risk:** {}", self.count_risk("low")));

        lines.push(String::new());
        lines.push("### At-Risk Customer Details".to_string());
        lines.extend(self.at_risk().take(AT_RISK_ROWS).map(|c| {
            format!(
                "- **{}** ({}): Health Score {}, {} risk",
                c.company,
                c.plan_name.as_deref().unwrap_or("No plan"),
                c.health_score,
                c.risk_level
            )
        }));

        lines.join("\n")
    }

    /// Compact context for the one-line dashboard insight.
    pub fn insight_context(&self) -> String {
        let kpi = &self.kpi;
        let mut lines = vec![
            "Current Business Metrics:".to_string(),
            format!("- Total Revenue: {}", money(kpi.total_revenue)),
            format!("- MRR: {}", money(kpi.mrr)),
            format!("- ARR: {}", money(kpi.arr)),
            format!("- Total Customers: {}", kpi.total_customers),
            format!("- Active Customers: {}", kpi.active_customers),
            format!("- Churned Customers: {}", kpi.churned_customers),
            format!("- Churn Rate: {}", percent(kpi.churn_rate)),
            format!("- CAC: {}", money(kpi.cac)),
            String::new(),
            "Revenue by Plan:".to_string(),
        ];

        if self.plans.is_empty() {
            lines.push("No plan data".to_string());
        }
        lines.extend(self.plans.iter().map(|p| {
            format!(
                "- {}: {} ({} customers, {})",
                p.plan_name,
                money(p.monthly_revenue),
                p.customer_count,
                percent(p.percentage)
            )
        }));

        lines.push(String::new());
        lines.push("Recent Monthly Revenue:".to_string());
        if self.revenue.is_empty() {
            lines.push("No revenue data".to_string());
        }
        lines.extend(self.revenue.iter().take(INSIGHT_MONTHS).map(|r| {
            format!(
                "- {}: {} ({} paid invoices)",
                r.month,
                money(r.revenue),
                r.paid_count
            )
        }));

        lines.join("\n")
    }
}

/// Fetch and render the analyst snapshot in one step.
pub async fn build_snapshot(pool: &SqlitePool) -> String {
    MetricsSnapshot::fetch(pool).await.render()
}

fn or_empty<T: Default>(view: &str, result: database::Result<T>) -> T {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!(view = %view, "Metrics query failed, using empty data: {}", e);
            T::default()
        }
    }
}

/// `$` amount with thousands separators and at most two decimals.
pub fn money(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = group_thousands(cents / 100);
    let fraction = cents % 100;

    if fraction == 0 {
        format!("{}${}", sign, whole)
    } else {
        let digits = format!("{:02}", fraction);
        format!("{}${}.{}", sign, whole, digits.trim_end_matches('0'))
    }
}

/// Fraction rendered as a one-decimal percentage.
pub fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::{demo, Database};

    async fn test_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        db
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(0.0), "$0");
        assert_eq!(money(12345.0), "$12,345");
        assert_eq!(money(1234567.891), "$1,234,567.89");
        assert_eq!(money(1200.5), "$1,200.5");
        assert_eq!(money(999.999), "$1,000");
        assert_eq!(money(-42.25), "-$42.25");
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(percent(0.053), "5.3%");
        assert_eq!(percent(0.0), "0.0%");
        assert_eq!(percent(1.0), "100.0%");
    }

    #[tokio::test]
    async fn test_empty_database_renders_all_sections() {
        let db = test_db().await;
        let text = build_snapshot(db.pool()).await;

        for heading in [
            "## Current Business Metrics",
            "### Key Performance Indicators",
            "### Revenue by Plan",
            "### Revenue Trend (Last 12 Months)",
            "### Acquisition Channel Performance",
            "### Customer Health Overview",
            "### At-Risk Customer Details",
        ] {
            assert!(text.contains(heading), "missing {}", heading);
        }
        assert!(text.contains("- **MRR (Monthly Recurring Revenue):** $0"));
        assert!(text.contains("- **Churn Rate:** 0.0%"));
    }

    #[tokio::test]
    async fn test_snapshot_with_demo_data() {
        let db = test_db().await;
        demo::seed_demo_data(db.pool()).await.unwrap();

        let snapshot = MetricsSnapshot::fetch(db.pool()).await;
        let text = snapshot.render();

        assert!(text.contains("- **Total Customers:** 8"));
        assert!(text.contains("- **Churn Rate:** 12.5%"));
        assert!(text.contains("- **Enterprise:** $998/month (2 customers"));
        assert!(text.contains("- 2026-09:"));
        assert!(text.contains("- **Total Customers Tracked:** 7"));

        let trend_rows = text
            .lines()
            .skip_while(|l| !l.starts_with("### Revenue Trend"))
            .skip(1)
            .take_while(|l| l.starts_with("- "))
            .count();
        assert!(trend_rows <= TREND_ROWS);

        let at_risk_rows = text
            .lines()
            .skip_while(|l| !l.starts_with("### At-Risk Customer Details"))
            .skip(1)
            .filter(|l| l.starts_with("- "))
            .count();
        assert!(at_risk_rows <= AT_RISK_ROWS);
        assert!(text.contains("- **Hooli** (Growth): Health Score 22, high risk"));
    }

    #[tokio::test]
    async fn test_snapshot_is_deterministic() {
        let db = test_db().await;
        demo::seed_demo_data(db.pool()).await.unwrap();

        let first = build_snapshot(db.pool()).await;
        let second = build_snapshot(db.pool()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failed_queries_fall_back_to_empty() {
        let db = test_db().await;
        db.close().await;

        let snapshot = MetricsSnapshot::fetch(db.pool()).await;
        assert_eq!(snapshot, MetricsSnapshot::default());
        assert!(snapshot.render().contains("- **Total Customers:** 0"));
    }

    #[tokio::test]
    async fn test_insight_context_limits_months() {
        let db = test_db().await;
        demo::seed_demo_data(db.pool()).await.unwrap();

        let context = MetricsSnapshot::fetch(db.pool()).await.insight_context();
        let months = context
            .lines()
            .skip_while(|l| !l.starts_with("Recent Monthly Revenue"))
            .skip(1)
            .count();
        assert_eq!(months, INSIGHT_MONTHS);
        assert!(context.contains("- Churn Rate: 12.5%"));
    }
}
