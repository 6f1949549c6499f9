//! Store Traits
//!
//! The core consumes two collaborator interfaces: a read-only candidate
//! record store and a credit ledger with an atomic debit-and-record
//! operation. `Database` implements both over PostgreSQL; tests use the
//! in-memory mocks below, which reproduce the same first-writer-wins
//! semantics behind a mutex instead of a database transaction.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Candidate, UnlockRecord};

/// Outcome of the single atomic debit-and-record operation.
#[derive(Debug, Clone)]
pub enum DebitOutcome {
    /// Credits were debited and the unlock record durably written.
    Debited {
        record: UnlockRecord,
        remaining_balance: i64,
    },

    /// An unlock record already existed for the pair; nothing was charged.
    /// Concurrent race losers land here as well.
    AlreadyUnlocked(UnlockRecord),

    /// Balance below the unlock cost; no state change occurred.
    InsufficientCredits { balance: i64 },
}

/// Read-only candidate record store.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// All active profiles with their tag associations. The search path
    /// only ever sees `is_active = true` rows.
    async fn get_active_candidates(&self) -> Result<Vec<Candidate>>;

    /// Single profile fetch, including inactive rows (the unlock and audit
    /// paths need those).
    async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>>;
}

/// Per-company credit ledger and unlock history.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Current balance, or `None` when the company has no ledger row.
    async fn get_credit_balance(&self, company_id: Uuid) -> Result<Option<i64>>;

    async fn get_unlock_record(
        &self,
        company_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<Option<UnlockRecord>>;

    /// Candidate ids this company has already unlocked (batch lookup for
    /// search-result redaction).
    async fn get_unlocked_ids(&self, company_id: Uuid) -> Result<HashSet<Uuid>>;

    /// The only mutating operation in the core: debit `cost` credits and
    /// insert the unlock record as one atomic unit. Concurrent calls for
    /// the same pair must serialize such that at most one debit occurs.
    async fn debit_and_record_unlock(
        &self,
        company_id: Uuid,
        candidate_id: Uuid,
        cost: i64,
    ) -> Result<DebitOutcome>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;

    /// In-memory candidate store for service tests.
    pub struct MockCandidateStore {
        candidates: HashMap<Uuid, Candidate>,
    }

    impl MockCandidateStore {
        pub fn new(candidates: Vec<Candidate>) -> Self {
            Self {
                candidates: candidates
                    .into_iter()
                    .map(|c| (c.profile.id, c))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl CandidateStore for MockCandidateStore {
        async fn get_active_candidates(&self) -> Result<Vec<Candidate>> {
            let mut active: Vec<Candidate> = self
                .candidates
                .values()
                .filter(|c| c.profile.is_active)
                .cloned()
                .collect();
            active.sort_by_key(|c| c.profile.id);
            Ok(active)
        }

        async fn get_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
            Ok(self.candidates.get(&id).cloned())
        }
    }

    #[derive(Default)]
    struct LedgerState {
        balances: HashMap<Uuid, i64>,
        unlocks: HashMap<(Uuid, Uuid), UnlockRecord>,
    }

    /// In-memory ledger. The mutex plays the role of the database
    /// transaction: check-and-debit plus record insert happen under one
    /// lock, so concurrent unlocks for the same pair see exactly one debit.
    #[derive(Default)]
    pub struct MockLedgerStore {
        state: Mutex<LedgerState>,
    }

    impl MockLedgerStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_company(self, company_id: Uuid, balance: i64) -> Self {
            self.state
                .lock()
                .unwrap()
                .balances
                .insert(company_id, balance);
            self
        }
    }

    #[async_trait]
    impl LedgerStore for MockLedgerStore {
        async fn get_credit_balance(&self, company_id: Uuid) -> Result<Option<i64>> {
            Ok(self.state.lock().unwrap().balances.get(&company_id).copied())
        }

        async fn get_unlock_record(
            &self,
            company_id: Uuid,
            candidate_id: Uuid,
        ) -> Result<Option<UnlockRecord>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .unlocks
                .get(&(company_id, candidate_id))
                .cloned())
        }

        async fn get_unlocked_ids(&self, company_id: Uuid) -> Result<HashSet<Uuid>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .unlocks
                .keys()
                .filter(|(c, _)| *c == company_id)
                .map(|(_, candidate)| *candidate)
                .collect())
        }

        async fn debit_and_record_unlock(
            &self,
            company_id: Uuid,
            candidate_id: Uuid,
            cost: i64,
        ) -> Result<DebitOutcome> {
            let mut state = self.state.lock().unwrap();

            if let Some(existing) = state.unlocks.get(&(company_id, candidate_id)) {
                return Ok(DebitOutcome::AlreadyUnlocked(existing.clone()));
            }

            let balance = match state.balances.get(&company_id).copied() {
                Some(b) => b,
                None => anyhow::bail!("no ledger row for company {}", company_id),
            };
            if balance < cost {
                return Ok(DebitOutcome::InsufficientCredits { balance });
            }

            let record = UnlockRecord {
                company_id,
                candidate_id,
                credits_spent: cost,
                unlocked_at: Utc::now(),
            };
            state.balances.insert(company_id, balance - cost);
            state
                .unlocks
                .insert((company_id, candidate_id), record.clone());

            Ok(DebitOutcome::Debited {
                record,
                remaining_balance: balance - cost,
            })
        }
    }
}
