use anyhow::Context;
use chrono::{Duration, NaiveDate};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::CoachError;
use crate::models::{Deal, StampedMessage, Tier, User};

const DEFAULT_MONTHLY_GOAL: i32 = 20;

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(default)]
    email: Option<String>,
    customer_name: String,
    deal_type: String,
    delivery_date: String,
    #[serde(default)]
    commission: Option<f64>,
    #[serde(default)]
    note: String,
    #[serde(default)]
    source_key: Option<String>,
}

impl CsvRow {
    fn into_deal(self) -> Deal {
        Deal {
            id: Uuid::new_v4(),
            customer_name: self.customer_name,
            deal_type: self.deal_type,
            delivery_date: self.delivery_date,
            commission: self.commission,
            note: self.note,
        }
    }
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("migrations applied");
    Ok(())
}

pub async fn seed(pool: &PgPool, today: NaiveDate) -> anyhow::Result<()> {
    let users = vec![
        (
            Uuid::parse_str("6f1c2a4e-8d3b-4f7a-9c61-2b5e8d0a4f13")?,
            "dana.ortiz@carcashpro.com",
            "Dana",
            Tier::Free,
            12,
        ),
        (
            Uuid::parse_str("a83e5b27-41d9-4c0e-b6f2-7d19c3e85a60")?,
            "marcus.hill@carcashpro.com",
            "Marcus",
            Tier::Pro,
            18,
        ),
        (
            Uuid::parse_str("c2d94f81-0b6a-4e3c-8a57-f4e21b9d6c08")?,
            "priya.shah@carcashpro.com",
            "Priya",
            Tier::Guru,
            24,
        ),
    ];

    for (id, email, first_name, tier, goal) in &users {
        upsert_user(pool, *id, email, Some(*first_name), *tier, *goal).await?;
    }

    // (email, days before today, customer, type, commission)
    let deals = vec![
        ("dana.ortiz@carcashpro.com", 0, "Kim Nguyen", "used", 325.0),
        ("dana.ortiz@carcashpro.com", 1, "Luis Romero", "new", 410.0),
        ("dana.ortiz@carcashpro.com", 3, "Ava Brooks", "certified", 380.0),
        ("dana.ortiz@carcashpro.com", 6, "Owen Price", "used", 290.0),
        ("marcus.hill@carcashpro.com", 0, "Nora Patel", "new", 650.0),
        ("marcus.hill@carcashpro.com", 0, "Eli Turner", "used", 420.0),
        ("marcus.hill@carcashpro.com", 2, "Grace Kim", "new", 575.0),
        ("marcus.hill@carcashpro.com", 35, "Sam Reed", "used", 300.0),
        ("priya.shah@carcashpro.com", 4, "Zoe Carter", "new", 820.0),
        ("priya.shah@carcashpro.com", 5, "Jack Wilson", "certified", 610.0),
        ("priya.shah@carcashpro.com", 30, "Maya Lopez", "new", 700.0),
    ];

    for (index, (email, days_ago, customer, deal_type, commission)) in deals.iter().enumerate() {
        let user_id: Uuid = sqlx::query("SELECT id FROM carcash.users WHERE email = $1")
            .bind(*email)
            .fetch_one(pool)
            .await?
            .get("id");
        let delivered = today - Duration::days(*days_ago);

        insert_deal(
            pool,
            user_id,
            &Deal {
                id: Uuid::new_v4(),
                customer_name: customer.to_string(),
                deal_type: deal_type.to_string(),
                delivery_date: delivered.format("%Y-%m-%d").to_string(),
                commission: Some(*commission),
                note: "seeded".to_string(),
            },
            &format!("seed-{:03}", index + 1),
        )
        .await?;
    }

    tracing::info!(users = users.len(), deals = deals.len(), "seed data written");
    Ok(())
}

pub async fn fetch_user(pool: &PgPool, email: &str) -> anyhow::Result<User> {
    let row = sqlx::query(
        "SELECT id, email, first_name, subscription_tier, monthly_goal \
         FROM carcash.users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| CoachError::UserNotFound(email.to_string()))?;

    let tier: String = row.get("subscription_tier");
    let goal: i32 = row.get("monthly_goal");

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        tier: tier.parse()?,
        monthly_goal: validate_goal(i64::from(goal))?,
    })
}

pub async fn fetch_deals(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Deal>> {
    let records = sqlx::query(
        "SELECT id, customer_name, deal_type, delivery_date, commission, note \
         FROM carcash.deals WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut deals = Vec::with_capacity(records.len());
    for row in records {
        deals.push(Deal {
            id: row.get("id"),
            customer_name: row.get("customer_name"),
            deal_type: row.get("deal_type"),
            delivery_date: row.get("delivery_date"),
            commission: row.get("commission"),
            note: row.get("note"),
        });
    }

    tracing::debug!(%user_id, count = deals.len(), "fetched deals");
    Ok(deals)
}

pub async fn save_message(pool: &PgPool, message: &StampedMessage) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO carcash.coach_messages
        (id, user_id, message_type, level, text, data, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(message.id)
    .bind(message.user_id)
    .bind(message.message.message_type.as_str())
    .bind(message.message.level.as_str())
    .bind(&message.message.text)
    .bind(serde_json::to_value(&message.message.data)?)
    .bind(message.created_at)
    .execute(pool)
    .await?;

    tracing::info!(message_id = %message.id, user_id = %message.user_id, "coach message saved");
    Ok(())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let email = row
            .email
            .clone()
            .with_context(|| format!("row {} has no email", line + 1))?;
        let user_id = upsert_user(
            pool,
            Uuid::new_v4(),
            &email,
            None,
            Tier::Free,
            DEFAULT_MONTHLY_GOAL,
        )
        .await?;

        let source_key = row
            .source_key
            .clone()
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        if insert_deal(pool, user_id, &row.into_deal(), &source_key).await? {
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Reads deals from a CSV file for coaching without a database.
pub fn read_deals_csv(csv_path: &std::path::Path) -> anyhow::Result<Vec<Deal>> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut deals = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        deals.push(result?.into_deal());
    }

    Ok(deals)
}

pub fn validate_goal(goal: i64) -> Result<u32, CoachError> {
    u32::try_from(goal)
        .ok()
        .filter(|value| *value > 0)
        .ok_or(CoachError::InvalidGoal(goal))
}

/// Inserts or refreshes a user keyed by email. Existing tier and goal are kept.
async fn upsert_user(
    pool: &PgPool,
    id: Uuid,
    email: &str,
    first_name: Option<&str>,
    tier: Tier,
    monthly_goal: i32,
) -> anyhow::Result<Uuid> {
    let user_id: Uuid = sqlx::query(
        r#"
        INSERT INTO carcash.users (id, email, first_name, subscription_tier, monthly_goal)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE
        SET first_name = COALESCE(EXCLUDED.first_name, carcash.users.first_name)
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(first_name)
    .bind(tier.as_str())
    .bind(monthly_goal)
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(user_id)
}

async fn insert_deal(
    pool: &PgPool,
    user_id: Uuid,
    deal: &Deal,
    source_key: &str,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO carcash.deals
        (id, user_id, customer_name, deal_type, delivery_date, commission, note, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(deal.id)
    .bind(user_id)
    .bind(&deal.customer_name)
    .bind(&deal.deal_type)
    .bind(&deal.delivery_date)
    .bind(deal.commission)
    .bind(&deal.note)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
