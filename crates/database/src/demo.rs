//! Demo business data for local runs and tests.

use sqlx::SqlitePool;

use crate::error::Result;

const PLANS: &[(&str, &str, f64)] = &[
    ("plan-starter", "Starter", 49.0),
    ("plan-growth", "Growth", 149.0),
    ("plan-enterprise", "Enterprise", 499.0),
];

const CHANNELS: &[(&str, &str)] = &[
    ("ch-organic", "Organic Search"),
    ("ch-paid", "Paid Ads"),
    ("ch-referral", "Referral"),
];

// (channel, month, leads, conversions, spend)
const SPEND: &[(&str, &str, i64, i64, f64)] = &[
    ("ch-organic", "2026-08", 420, 38, 1200.0),
    ("ch-organic", "2026-09", 455, 41, 1250.0),
    ("ch-paid", "2026-08", 610, 29, 8700.0),
    ("ch-paid", "2026-09", 580, 31, 9100.0),
    ("ch-referral", "2026-08", 120, 22, 900.0),
    ("ch-referral", "2026-09", 135, 25, 950.0),
];

// (id, name, company, industry, health, status, plan, channel, created_at)
const CUSTOMERS: &[(&str, &str, &str, &str, i64, &str, &str, &str, &str)] = &[
    ("cus-01", "Ada Park", "Northwind", "Retail", 92, "active", "plan-enterprise", "ch-referral", "2025-11-03T09:00:00.000Z"),
    ("cus-02", "Ben Ortiz", "Globex", "Manufacturing", 35, "active", "plan-growth", "ch-paid", "2026-01-14T09:00:00.000Z"),
    ("cus-03", "Chen Wu", "Initech", "Software", 58, "active", "plan-starter", "ch-organic", "2026-02-20T09:00:00.000Z"),
    ("cus-04", "Dana Iyer", "Umbrella", "Healthcare", 81, "active", "plan-enterprise", "ch-organic", "2026-03-02T09:00:00.000Z"),
    ("cus-05", "Eli Novak", "Hooli", "Software", 22, "active", "plan-growth", "ch-paid", "2026-04-18T09:00:00.000Z"),
    ("cus-06", "Fay Moreau", "Vandelay", "Logistics", 67, "active", "plan-starter", "ch-referral", "2026-05-09T09:00:00.000Z"),
    ("cus-07", "Gus Tanaka", "Stark Ind", "Manufacturing", 10, "churned", "plan-growth", "ch-paid", "2026-02-01T09:00:00.000Z"),
    ("cus-08", "Hana Berg", "Wayne Co", "Finance", 74, "active", "plan-growth", "ch-organic", "2026-06-21T09:00:00.000Z"),
];

// (customer, amount, status, issued_at)
const INVOICES: &[(&str, f64, &str, &str)] = &[
    ("cus-01", 499.0, "paid", "2026-05-01"),
    ("cus-02", 149.0, "paid", "2026-05-01"),
    ("cus-03", 49.0, "paid", "2026-05-01"),
    ("cus-01", 499.0, "paid", "2026-06-01"),
    ("cus-02", 149.0, "paid", "2026-06-01"),
    ("cus-04", 499.0, "paid", "2026-06-01"),
    ("cus-01", 499.0, "paid", "2026-07-01"),
    ("cus-04", 499.0, "paid", "2026-07-01"),
    ("cus-05", 149.0, "overdue", "2026-07-01"),
    ("cus-01", 499.0, "paid", "2026-08-01"),
    ("cus-04", 499.0, "paid", "2026-08-01"),
    ("cus-08", 149.0, "paid", "2026-08-01"),
    ("cus-01", 499.0, "paid", "2026-09-01"),
    ("cus-06", 49.0, "pending", "2026-09-01"),
    ("cus-08", 149.0, "paid", "2026-09-01"),
];

/// Insert a small, fixed demo dataset. Safe to call more than once.
pub async fn seed_demo_data(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (id, name, price) in PLANS {
        sqlx::query("INSERT OR IGNORE INTO plans (id, name, price_monthly) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(price)
            .execute(&mut *tx)
            .await?;
    }

    for (id, name) in CHANNELS {
        sqlx::query("INSERT OR IGNORE INTO acquisition_channels (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    for (i, (channel, month, leads, conversions, spend)) in SPEND.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO channel_spend (id, channel_id, month, leads, conversions, spend)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(format!("spend-{:02}", i))
        .bind(channel)
        .bind(month)
        .bind(leads)
        .bind(conversions)
        .bind(spend)
        .execute(&mut *tx)
        .await?;
    }

    for (id, name, company, industry, health, status, plan, channel, created_at) in CUSTOMERS {
        let email = format!("{}@{}.example", id, company.to_lowercase().replace(' ', ""));
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO customers
                (id, name, email, company, country, industry, health_score, status,
                 plan_id, acquisition_channel_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, 'US', ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(&email)
        .bind(company)
        .bind(industry)
        .bind(health)
        .bind(status)
        .bind(plan)
        .bind(channel)
        .bind(created_at)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;
    }

    for (i, (customer, amount, status, issued_at)) in INVOICES.iter().enumerate() {
        let paid_at = (*status == "paid").then(|| issued_at.to_string());
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO invoices (id, customer_id, amount, status, issued_at, paid_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(format!("inv-{:03}", i))
        .bind(customer)
        .bind(amount)
        .bind(status)
        .bind(issued_at)
        .bind(paid_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!("Seeded demo business data");
    Ok(())
}
