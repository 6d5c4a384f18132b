//! Participant Registry — investment records, lock deadlines, pool balance
//!
//! The registry is the pool's only mutable accounting state. It is a plain
//! owned value: entry points borrow it around their collaborator calls, and
//! it can be exercised on its own in tests.
//!
//! Records are stored in registration order and located through an index.
//! Every deposit event also appends a slot pointing at the record it
//! credited; the participant counter is the number of slots, so it advances
//! per deposit rather than per distinct participant.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use pool_types::ids::AccountId;
use pool_types::numeric::Amount;
use serde::{Deserialize, Serialize};

use crate::config::DistributionPolicy;
use crate::errors::PoolError;

/// Principal owed to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestmentRecord {
    /// Participant counter value when the record was created
    pub sequence_id: u64,
    pub participant: AccountId,
    /// Zeroed on withdrawal; the record itself is never removed
    pub principal: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRegistry {
    records: Vec<InvestmentRecord>,
    index: HashMap<AccountId, usize>,
    /// One entry per deposit event, pointing into `records`
    slots: Vec<usize>,
    lock_deadlines: HashMap<AccountId, DateTime<Utc>>,
    participant_counter: u64,
    pool_balance: Amount,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn record(&self, participant: &AccountId) -> Option<&InvestmentRecord> {
        self.index.get(participant).map(|&pos| &self.records[pos])
    }

    /// Recorded principal, zero for unknown identities.
    pub fn principal_of(&self, participant: &AccountId) -> Amount {
        self.record(participant)
            .map(|r| r.principal)
            .unwrap_or(Amount::ZERO)
    }

    pub fn lock_deadline(&self, participant: &AccountId) -> Option<DateTime<Utc>> {
        self.lock_deadlines.get(participant).copied()
    }

    /// All lock deadlines, ordered by participant.
    pub fn lock_deadlines(&self) -> Vec<(AccountId, DateTime<Utc>)> {
        let mut deadlines: Vec<_> = self
            .lock_deadlines
            .iter()
            .map(|(id, at)| (*id, *at))
            .collect();
        deadlines.sort_by_key(|(id, _)| *id);
        deadlines
    }

    /// Records in registration order.
    pub fn records(&self) -> &[InvestmentRecord] {
        &self.records
    }

    /// Number of deposit events recorded so far.
    pub fn participant_count(&self) -> u64 {
        self.participant_counter
    }

    /// Total principal currently owed to participants.
    pub fn pool_balance(&self) -> Amount {
        self.pool_balance
    }

    /// Sum of recorded principals. Equals `pool_balance` under correct
    /// bookkeeping; `None` on overflow.
    pub fn outstanding_principal(&self) -> Option<Amount> {
        self.records
            .iter()
            .try_fold(Amount::ZERO, |acc, r| acc.checked_add(r.principal))
    }

    /// Records in the order a distribution visits them.
    ///
    /// `Faithful` yields one entry per deposit event, so a participant who
    /// deposited twice appears twice. `Corrected` yields each record once.
    pub fn distribution_order(&self, policy: DistributionPolicy) -> Vec<&InvestmentRecord> {
        match policy {
            DistributionPolicy::Faithful => {
                self.slots.iter().map(|&pos| &self.records[pos]).collect()
            }
            DistributionPolicy::Corrected => self.records.iter().collect(),
        }
    }

    // ───────────────────────── Mutations ─────────────────────────

    /// Verify that crediting `delta` to `participant` cannot overflow.
    pub fn check_credit(&self, participant: &AccountId, delta: Amount) -> Result<(), PoolError> {
        self.pool_balance
            .checked_add(delta)
            .ok_or(PoolError::Overflow)?;
        self.principal_of(participant)
            .checked_add(delta)
            .ok_or(PoolError::Overflow)?;
        self.participant_counter
            .checked_add(1)
            .ok_or(PoolError::Overflow)?;
        Ok(())
    }

    /// Verify that `debit` can come out of the pool balance.
    pub fn check_debit(&self, debit: Amount) -> Result<(), PoolError> {
        if self.pool_balance < debit {
            return Err(PoolError::PoolBalanceUnderflow {
                balance: self.pool_balance,
                debit,
            });
        }
        Ok(())
    }

    /// Credit `delta` to `participant`, creating the record on first deposit.
    ///
    /// Always refreshes the lock deadline and advances the participant
    /// counter. Nothing is mutated if any addition would overflow.
    pub fn upsert(
        &mut self,
        participant: AccountId,
        delta: Amount,
        unlocks_at: DateTime<Utc>,
    ) -> Result<InvestmentRecord, PoolError> {
        self.check_credit(&participant, delta)?;

        // check_credit guarantees none of these overflow
        let counter = self.participant_counter + 1;
        let pool_balance = self
            .pool_balance
            .checked_add(delta)
            .ok_or(PoolError::Overflow)?;

        let pos = match self.index.get(&participant) {
            Some(&pos) => {
                let record = &mut self.records[pos];
                record.principal = record
                    .principal
                    .checked_add(delta)
                    .ok_or(PoolError::Overflow)?;
                pos
            }
            None => {
                self.records.push(InvestmentRecord {
                    sequence_id: counter,
                    participant,
                    principal: delta,
                });
                let pos = self.records.len() - 1;
                self.index.insert(participant, pos);
                pos
            }
        };

        self.slots.push(pos);
        self.participant_counter = counter;
        self.pool_balance = pool_balance;
        self.lock_deadlines.insert(participant, unlocks_at);

        Ok(self.records[pos].clone())
    }

    /// Zero `participant`'s principal and take it out of the pool balance.
    ///
    /// Returns the principal that was zeroed (zero for unknown identities).
    pub fn zero(&mut self, participant: &AccountId) -> Result<Amount, PoolError> {
        let Some(&pos) = self.index.get(participant) else {
            return Ok(Amount::ZERO);
        };
        let principal = self.records[pos].principal;
        self.check_debit(principal)?;

        self.pool_balance = self.pool_balance.saturating_sub(principal);
        self.records[pos].principal = Amount::ZERO;
        Ok(principal)
    }
}
