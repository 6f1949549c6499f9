//! Database Module
//!
//! PostgreSQL access over a SQLx connection pool. Financial invariants
//! (balance never negative, debit and unlock record as one unit) ride on
//! ACID transactions plus the unique constraint on
//! `(company_id, candidate_id)` — the only mutual-exclusion boundary in
//! the whole core.

mod models;
mod repository;

pub use models::*;
pub use repository::{CandidateStore, DebitOutcome, LedgerStore};

#[cfg(test)]
pub use repository::mock;

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

/// Database connection and query owner.
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL.
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: 10 (adjust with traffic)
    /// - min_connections: 1 (kept while idle)
    /// - acquire_timeout: 3s
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run pending migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Health check.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Fetch tag associations for a set of candidates, grouped by candidate.
    async fn fetch_tags(&self, candidate_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<CandidateTag>>> {
        if candidate_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, CandidateTag>(
            r#"
            SELECT
                ct.candidate_id,
                t.id AS tag_id,
                t.name,
                t.category,
                ct.proficiency,
                ct.years_experience,
                t.is_verified
            FROM candidate_tags ct
            JOIN tags t ON t.id = ct.tag_id
            WHERE ct.candidate_id = ANY($1)
            ORDER BY t.name
            "#,
        )
        .bind(candidate_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<CandidateTag>> = HashMap::new();
        for row in rows {
            grouped.entry(row.candidate_id).or_default().push(row);
        }
        Ok(grouped)
    }
}

const CANDIDATE_COLUMNS: &str = r#"
    id, user_id, name, email, phone,
    linkedin_url, github_url, portfolio_url, image_url,
    title, summary, experience_level, location,
    remote_preference, availability,
    salary_min, salary_max, currency,
    is_anonymized, is_active, updated_at
"#;

#[async_trait]
impl CandidateStore for Database {
    /// Active profiles with tags, a consistent snapshot for one search
    /// request. Scoring and facet aggregation run in-process over this set.
    async fn get_active_candidates(&self) -> Result<Vec<Candidate>> {
        let profiles = sqlx::query_as::<_, CandidateProfile>(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS}
            FROM candidate_profiles
            WHERE is_active = TRUE
            ORDER BY id
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = profiles.iter().map(|p| p.id).collect();
        let mut tags = self.fetch_tags(&ids).await?;

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let tags = tags.remove(&profile.id).unwrap_or_default();
                Candidate { profile, tags }
            })
            .collect())
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        let profile = sqlx::query_as::<_, CandidateProfile>(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS}
            FROM candidate_profiles
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match profile {
            Some(profile) => {
                let mut tags = self.fetch_tags(&[profile.id]).await?;
                let tags = tags.remove(&profile.id).unwrap_or_default();
                Ok(Some(Candidate { profile, tags }))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl LedgerStore for Database {
    async fn get_credit_balance(&self, company_id: Uuid) -> Result<Option<i64>> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT balance FROM credit_ledgers WHERE company_id = $1")
                .bind(company_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(balance,)| balance))
    }

    async fn get_unlock_record(
        &self,
        company_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<UnlockRecord>> {
        let record = sqlx::query_as::<_, UnlockRecord>(
            r#"
            SELECT company_id, candidate_id, credits_spent, unlocked_at
            FROM unlock_records
            WHERE company_id = $1 AND candidate_id = $2
            "#,
        )
        .bind(company_id)
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn get_unlocked_ids(&self, company_id: Uuid) -> Result<HashSet<Uuid>> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT candidate_id FROM unlock_records WHERE company_id = $1")
                .bind(company_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Debit `cost` credits and insert the unlock record in one transaction.
    ///
    /// # Ordering
    ///
    /// 1. `INSERT ... ON CONFLICT DO NOTHING RETURNING` — under a concurrent
    ///    race the second transaction blocks on the unique index until the
    ///    first commits, then sees the conflict and charges nothing.
    /// 2. Conditional debit `WHERE balance >= cost RETURNING balance` — zero
    ///    rows means insufficient credits; the whole transaction rolls back,
    ///    so no unlock record survives without its debit.
    async fn debit_and_record_unlock(
        &self,
        company_id: Uuid,
        candidate_id: Uuid,
        cost: i64,
    ) -> Result<DebitOutcome> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, UnlockRecord>(
            r#"
            INSERT INTO unlock_records (company_id, candidate_id, credits_spent, unlocked_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (company_id, candidate_id) DO NOTHING
            RETURNING company_id, candidate_id, credits_spent, unlocked_at
            "#,
        )
        .bind(company_id)
        .bind(candidate_id)
        .bind(cost)
        .fetch_optional(&mut *tx)
        .await?;

        let record = match inserted {
            Some(record) => record,
            None => {
                // Already unlocked (possibly by a concurrent request that
                // committed first). Roll back and report the existing fact.
                tx.rollback().await?;
                let existing = self
                    .get_unlock_record(company_id, candidate_id)
                    .await?
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "unlock record for ({}, {}) vanished mid-transaction",
                            company_id,
                            candidate_id
                        )
                    })?;
                return Ok(DebitOutcome::AlreadyUnlocked(existing));
            }
        };

        let debited: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE credit_ledgers
            SET balance = balance - $2, updated_at = NOW()
            WHERE company_id = $1 AND balance >= $2
            RETURNING balance
            "#,
        )
        .bind(company_id)
        .bind(cost)
        .fetch_optional(&mut *tx)
        .await?;

        match debited {
            Some((remaining_balance,)) => {
                tx.commit().await?;
                Ok(DebitOutcome::Debited {
                    record,
                    remaining_balance,
                })
            }
            None => {
                tx.rollback().await?;
                let balance = self.get_credit_balance(company_id).await?.unwrap_or(0);
                Ok(DebitOutcome::InsufficientCredits { balance })
            }
        }
    }
}
