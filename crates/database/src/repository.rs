use crate::error::DbError;
use crate::store::StatsStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use core_types::{
    BattingLine, BattingRecord, FieldPosition, InningsPitched, Payment, PitchingLine,
    PitchingRecord, PlanType, Profile, Subscription, SubscriptionStatus,
};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

// --- Row types ---
// Postgres has no unsigned integers, so counters come back as i32 and are
// checked on the way out.

#[derive(FromRow, Debug, Clone)]
struct DbBattingRow {
    id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
    at_bats: i32,
    hits: i32,
    doubles: i32,
    triples: i32,
    home_runs: i32,
    rbi: i32,
    runs: i32,
    walks: i32,
    strikeouts: i32,
    stolen_bases: i32,
    created_at: DateTime<Utc>,
}

#[derive(FromRow, Debug, Clone)]
struct DbPitchingRow {
    id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
    outs_recorded: i32,
    hits_allowed: i32,
    runs_allowed: i32,
    earned_runs: i32,
    walks_allowed: i32,
    strikeouts: i32,
    hit_batters: i32,
    wild_pitches: i32,
    balks: i32,
    wins: i32,
    losses: i32,
    saves: i32,
    created_at: DateTime<Utc>,
}

#[derive(FromRow, Debug, Clone)]
struct DbProfileRow {
    id: Uuid,
    name: String,
    position: Option<String>,
    team: Option<String>,
    photo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow, Debug, Clone)]
struct DbSubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    plan_type: PlanType,
    status: SubscriptionStatus,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    trial_end_date: DateTime<Utc>,
    checkout_id: Option<String>,
    amount: Option<Decimal>,
    currency: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn count(field: &str, value: i32) -> Result<u32, DbError> {
    u32::try_from(value)
        .map_err(|_| DbError::CorruptRow(format!("negative value {value} in column '{field}'")))
}

fn column(field: &'static str, value: u32) -> Result<i32, DbError> {
    i32::try_from(value).map_err(|_| DbError::OutOfRange { field, value })
}

impl TryFrom<DbBattingRow> for BattingRecord {
    type Error = DbError;

    fn try_from(row: DbBattingRow) -> Result<Self, Self::Error> {
        Ok(BattingRecord {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            line: BattingLine {
                at_bats: count("at_bats", row.at_bats)?,
                hits: count("hits", row.hits)?,
                doubles: count("doubles", row.doubles)?,
                triples: count("triples", row.triples)?,
                home_runs: count("home_runs", row.home_runs)?,
                rbi: count("rbi", row.rbi)?,
                runs: count("runs", row.runs)?,
                walks: count("walks", row.walks)?,
                strikeouts: count("strikeouts", row.strikeouts)?,
                stolen_bases: count("stolen_bases", row.stolen_bases)?,
            },
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbPitchingRow> for PitchingRecord {
    type Error = DbError;

    fn try_from(row: DbPitchingRow) -> Result<Self, Self::Error> {
        Ok(PitchingRecord {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            line: PitchingLine {
                innings_pitched: InningsPitched::from_outs(count(
                    "outs_recorded",
                    row.outs_recorded,
                )?),
                hits_allowed: count("hits_allowed", row.hits_allowed)?,
                runs_allowed: count("runs_allowed", row.runs_allowed)?,
                earned_runs: count("earned_runs", row.earned_runs)?,
                walks_allowed: count("walks_allowed", row.walks_allowed)?,
                strikeouts: count("strikeouts", row.strikeouts)?,
                hit_batters: count("hit_batters", row.hit_batters)?,
                wild_pitches: count("wild_pitches", row.wild_pitches)?,
                balks: count("balks", row.balks)?,
                wins: count("wins", row.wins)?,
                losses: count("losses", row.losses)?,
                saves: count("saves", row.saves)?,
            },
            created_at: row.created_at,
        })
    }
}

impl TryFrom<DbProfileRow> for Profile {
    type Error = DbError;

    fn try_from(row: DbProfileRow) -> Result<Self, Self::Error> {
        let position = row
            .position
            .as_deref()
            .map(str::parse::<FieldPosition>)
            .transpose()
            .map_err(|e| DbError::CorruptRow(e.to_string()))?;
        Ok(Profile {
            id: row.id,
            name: row.name,
            position,
            team: row.team,
            photo_url: row.photo_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<DbSubscriptionRow> for Subscription {
    fn from(row: DbSubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            user_id: row.user_id,
            plan_type: row.plan_type,
            status: row.status,
            start_date: row.start_date,
            end_date: row.end_date,
            trial_end_date: row.trial_end_date,
            checkout_id: row.checkout_id,
            amount: row.amount,
            currency: row.currency,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const BATTING_COLUMNS: &str = "id, user_id, date, at_bats, hits, doubles, triples, home_runs, \
     rbi, runs, walks, strikeouts, stolen_bases, created_at";

const PITCHING_COLUMNS: &str = "id, user_id, date, outs_recorded, hits_allowed, runs_allowed, \
     earned_runs, walks_allowed, strikeouts, hit_batters, wild_pitches, balks, wins, losses, \
     saves, created_at";

const UPSERT_SUBSCRIPTION: &str = r#"
    INSERT INTO subscriptions (
        id, user_id, plan_type, status, start_date, end_date, trial_end_date,
        checkout_id, amount, currency, created_at, updated_at
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
    ON CONFLICT (id) DO UPDATE SET
        plan_type = EXCLUDED.plan_type,
        status = EXCLUDED.status,
        start_date = EXCLUDED.start_date,
        end_date = EXCLUDED.end_date,
        trial_end_date = EXCLUDED.trial_end_date,
        checkout_id = EXCLUDED.checkout_id,
        amount = EXCLUDED.amount,
        currency = EXCLUDED.currency,
        updated_at = EXCLUDED.updated_at
"#;

impl DbRepository {
    /// Creates a new `DbRepository` with a shared connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn upsert_subscription_query(
        subscription: &Subscription,
    ) -> sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments> {
        sqlx::query(UPSERT_SUBSCRIPTION)
            .bind(subscription.id)
            .bind(subscription.user_id)
            .bind(subscription.plan_type)
            .bind(subscription.status)
            .bind(subscription.start_date)
            .bind(subscription.end_date)
            .bind(subscription.trial_end_date)
            .bind(&subscription.checkout_id)
            .bind(subscription.amount)
            .bind(&subscription.currency)
            .bind(subscription.created_at)
            .bind(subscription.updated_at)
    }
}

#[async_trait]
impl StatsStore for DbRepository {
    async fn save_batting(&self, record: &BattingRecord) -> Result<(), DbError> {
        let line = &record.line;
        sqlx::query(&format!(
            "INSERT INTO offensive_stats ({BATTING_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        ))
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.date)
        .bind(column("at_bats", line.at_bats)?)
        .bind(column("hits", line.hits)?)
        .bind(column("doubles", line.doubles)?)
        .bind(column("triples", line.triples)?)
        .bind(column("home_runs", line.home_runs)?)
        .bind(column("rbi", line.rbi)?)
        .bind(column("runs", line.runs)?)
        .bind(column("walks", line.walks)?)
        .bind(column("strikeouts", line.strikeouts)?)
        .bind(column("stolen_bases", line.stolen_bases)?)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(record_id = %record.id, user_id = %record.user_id, "Saved batting record.");
        Ok(())
    }

    async fn list_batting(&self, user_id: Uuid) -> Result<Vec<BattingRecord>, DbError> {
        let rows = sqlx::query_as::<_, DbBattingRow>(&format!(
            "SELECT {BATTING_COLUMNS} FROM offensive_stats \
             WHERE user_id = $1 ORDER BY date ASC, created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BattingRecord::try_from).collect()
    }

    async fn list_batting_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BattingRecord>, DbError> {
        let rows = sqlx::query_as::<_, DbBattingRow>(&format!(
            "SELECT {BATTING_COLUMNS} FROM offensive_stats \
             WHERE user_id = $1 AND date = $2 ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BattingRecord::try_from).collect()
    }

    async fn save_pitching(&self, record: &PitchingRecord) -> Result<(), DbError> {
        let line = &record.line;
        sqlx::query(&format!(
            "INSERT INTO pitching_stats ({PITCHING_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        ))
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.date)
        .bind(column("outs_recorded", line.innings_pitched.outs())?)
        .bind(column("hits_allowed", line.hits_allowed)?)
        .bind(column("runs_allowed", line.runs_allowed)?)
        .bind(column("earned_runs", line.earned_runs)?)
        .bind(column("walks_allowed", line.walks_allowed)?)
        .bind(column("strikeouts", line.strikeouts)?)
        .bind(column("hit_batters", line.hit_batters)?)
        .bind(column("wild_pitches", line.wild_pitches)?)
        .bind(column("balks", line.balks)?)
        .bind(column("wins", line.wins)?)
        .bind(column("losses", line.losses)?)
        .bind(column("saves", line.saves)?)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(record_id = %record.id, user_id = %record.user_id, "Saved pitching record.");
        Ok(())
    }

    async fn list_pitching(&self, user_id: Uuid) -> Result<Vec<PitchingRecord>, DbError> {
        let rows = sqlx::query_as::<_, DbPitchingRow>(&format!(
            "SELECT {PITCHING_COLUMNS} FROM pitching_stats \
             WHERE user_id = $1 ORDER BY date ASC, created_at ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PitchingRecord::try_from).collect()
    }

    async fn list_pitching_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<PitchingRecord>, DbError> {
        let rows = sqlx::query_as::<_, DbPitchingRow>(&format!(
            "SELECT {PITCHING_COLUMNS} FROM pitching_stats \
             WHERE user_id = $1 AND date = $2 ORDER BY created_at ASC"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PitchingRecord::try_from).collect()
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, DbError> {
        let row = sqlx::query_as::<_, DbProfileRow>(
            "SELECT id, name, position, team, photo_url, created_at, updated_at \
             FROM profiles WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Profile::try_from).transpose()
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, name, position, team, photo_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                position = EXCLUDED.position,
                team = EXCLUDED.team,
                photo_url = EXCLUDED.photo_url,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.id)
        .bind(&profile.name)
        .bind(profile.position.map(|p| p.abbreviation()))
        .bind(&profile.team)
        .bind(&profile.photo_url)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest_subscription(&self, user_id: Uuid) -> Result<Option<Subscription>, DbError> {
        let row = sqlx::query_as::<_, DbSubscriptionRow>(
            "SELECT id, user_id, plan_type, status, start_date, end_date, trial_end_date, \
             checkout_id, amount, currency, created_at, updated_at \
             FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Subscription::from))
    }

    async fn save_subscription(&self, subscription: &Subscription) -> Result<(), DbError> {
        Self::upsert_subscription_query(subscription)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_activation(
        &self,
        subscription: &Subscription,
        payment: &Payment,
    ) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        Self::upsert_subscription_query(subscription)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, subscription_id, external_payment_id, amount,
                currency, status, payment_method, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(payment.id)
        .bind(payment.user_id)
        .bind(payment.subscription_id)
        .bind(&payment.external_payment_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.status)
        .bind(&payment.payment_method)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                DbError::DuplicatePayment(payment.external_payment_id.clone())
            }
            _ => e.into(),
        })?;

        tx.commit().await?;
        tracing::info!(
            subscription_id = %subscription.id,
            payment_id = %payment.id,
            amount = %payment.amount,
            "Recorded subscription activation."
        );
        Ok(())
    }
}
