//! Profit Distribution — pro-rata payout of custody held above the pool balance
//!
//! A round is planned in full from a single custody snapshot before any asset
//! moves. Planning fails fast, in registry order, and the payouts, fees and
//! residual sweep then leave custody as a single batch, so a failed round
//! pays nobody.
//!
//! Per visited record:
//! `claim = principal * custody / share_supply`, `profit = claim - principal`,
//! `fee = fee_percent * profit / 100`, `user_profit = profit - fee`.

use pool_types::ids::AccountId;
use pool_types::numeric::Amount;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::{DistributionPolicy, PoolConfig};
use crate::errors::PoolError;
use crate::events::{ContractEvent, ProfitDistributed, ProfitPaid};
use crate::registry::ParticipantRegistry;
use crate::vault::{CallContext, ProfitPool};

/// One payout line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub participant: AccountId,
    pub sequence_id: u64,
    pub principal: Amount,
    /// Principal plus accrued profit at the snapshot balance
    pub claim: Amount,
    pub profit: Amount,
    pub fee: Amount,
    pub user_profit: Amount,
}

/// Fully validated payouts for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionPlan {
    pub custody_balance: Amount,
    pub pool_balance: Amount,
    pub share_supply: Amount,
    pub total_profit: Amount,
    pub payouts: Vec<Payout>,
    pub total_user_profit: Amount,
    pub total_fees: Amount,
}

impl DistributionPlan {
    /// Everything the payouts move out of custody.
    pub fn total_outflow(&self) -> Option<Amount> {
        self.total_user_profit.checked_add(self.total_fees)
    }
}

/// Outcome of an executed round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReport {
    pub distribution_id: Uuid,
    pub plan: DistributionPlan,
    pub residual_swept: Amount,
}

/// Compute every payout of a round without moving anything.
pub fn plan_distribution(
    registry: &ParticipantRegistry,
    custody_balance: Amount,
    share_supply: Amount,
    config: &PoolConfig,
) -> Result<DistributionPlan, PoolError> {
    let pool_balance = registry.pool_balance();
    let total_profit = custody_balance.saturating_sub(pool_balance);
    if total_profit <= config.min_profit_threshold {
        return Err(PoolError::NoProfitAvailable {
            profit: total_profit,
            threshold: config.min_profit_threshold,
        });
    }

    let policy = config.distribution_policy;
    let mut payouts = Vec::new();
    let mut total_user_profit = Amount::ZERO;
    let mut total_fees = Amount::ZERO;

    for record in registry.distribution_order(policy) {
        if record.principal.is_zero() {
            match policy {
                DistributionPolicy::Faithful => {
                    return Err(PoolError::ParticipantHasNoInvestment {
                        participant: record.participant,
                        sequence_id: record.sequence_id,
                    });
                }
                DistributionPolicy::Corrected => continue,
            }
        }

        let claim = if share_supply.is_zero() {
            Amount::ZERO
        } else {
            record
                .principal
                .mul_div(custody_balance, share_supply)
                .ok_or(PoolError::Overflow)?
        };
        if claim <= record.principal {
            return Err(PoolError::ProfitComputationInvariantViolated {
                participant: record.participant,
                claim,
                principal: record.principal,
            });
        }

        let profit = claim.saturating_sub(record.principal);
        let fee = profit.percent(config.fee_percent).ok_or(PoolError::Overflow)?;
        let user_profit = profit.saturating_sub(fee);

        total_user_profit = total_user_profit
            .checked_add(user_profit)
            .ok_or(PoolError::Overflow)?;
        total_fees = total_fees.checked_add(fee).ok_or(PoolError::Overflow)?;

        payouts.push(Payout {
            participant: record.participant,
            sequence_id: record.sequence_id,
            principal: record.principal,
            claim,
            profit,
            fee,
            user_profit,
        });
    }

    Ok(DistributionPlan {
        custody_balance,
        pool_balance,
        share_supply,
        total_profit,
        payouts,
        total_user_profit,
        total_fees,
    })
}

impl ProfitPool {
    /// Pay every participant their pro-rata profit minus the controller fee,
    /// then sweep the residual custody balance to the controller.
    ///
    /// Controller only. Principal is left untouched, so a second round
    /// recomputes from the same principals against the then-current custody.
    pub fn distribute_profit(&self, ctx: &CallContext) -> Result<DistributionReport, PoolError> {
        let _scope = self.reentrancy_guard.enter()?;
        self.access_control.ensure_controller(&ctx.caller)?;

        let asset = self.settlement_asset();
        let controller = self.controller();
        let assets = &self.collaborators.assets;

        let custody_balance = assets.balance_of(&asset, &self.address);
        let share_supply = self.collaborators.shares.total_supply();
        let (plan, policy) = {
            let state = self.state.borrow();
            let config = self.config.borrow();
            (
                plan_distribution(&state, custody_balance, share_supply, &config)?,
                config.distribution_policy,
            )
        };

        let outflow = plan.total_outflow().ok_or(PoolError::Overflow)?;
        if outflow > custody_balance {
            return Err(PoolError::InsufficientCustodyFunds {
                required: outflow,
                available: custody_balance,
            });
        }

        // Everything left after the payouts, taken from the same snapshot
        let remaining = custody_balance.saturating_sub(outflow);
        let residual = match policy {
            DistributionPolicy::Faithful => remaining,
            DistributionPolicy::Corrected => remaining.saturating_sub(plan.pool_balance),
        };

        let mut legs = Vec::with_capacity(plan.payouts.len() * 2 + 1);
        for payout in &plan.payouts {
            legs.push((payout.participant, payout.user_profit));
            legs.push((controller, payout.fee));
        }
        if !residual.is_zero() {
            legs.push((controller, residual));
        }

        let distribution_id = Uuid::now_v7();
        if let Err(transfer_err) = assets.transfer_batch(&asset, &self.address, &legs) {
            error!(
                %distribution_id,
                legs = legs.len(),
                %transfer_err,
                "Distribution rejected by custody"
            );
            return Err(transfer_err.into());
        }

        let paid: Vec<_> = plan
            .payouts
            .iter()
            .map(|payout| {
                debug!(
                    %distribution_id,
                    participant = %payout.participant,
                    sequence_id = payout.sequence_id,
                    user_profit = %payout.user_profit,
                    fee = %payout.fee,
                    "Profit paid"
                );
                ContractEvent::ProfitPaid(ProfitPaid {
                    distribution_id,
                    participant: payout.participant,
                    sequence_id: payout.sequence_id,
                    user_profit: payout.user_profit,
                    fee: payout.fee,
                })
            })
            .collect();

        info!(
            %distribution_id,
            custody_balance = %plan.custody_balance,
            total_profit = %plan.total_profit,
            participants_paid = plan.payouts.len(),
            total_user_profit = %plan.total_user_profit,
            total_fees = %plan.total_fees,
            residual_swept = %residual,
            "Profit distributed"
        );

        for event in paid {
            self.emit(event);
        }
        self.emit(ContractEvent::ProfitDistributed(ProfitDistributed {
            distribution_id,
            custody_balance: plan.custody_balance,
            total_profit: plan.total_profit,
            participants_paid: plan.payouts.len(),
            total_user_profit: plan.total_user_profit,
            total_fees: plan.total_fees,
            residual_swept: residual,
        }));

        Ok(DistributionReport {
            distribution_id,
            plan,
            residual_swept: residual,
        })
    }
}
