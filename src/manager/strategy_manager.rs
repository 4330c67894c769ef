//! Strategy manager: capital pools, risk thresholds, strategy scans and execution

use alloy::primitives::{Address, U256};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};
use crate::{
    arbitrage::{detect_discrepancy, estimate_profit, optimal_amount},
    config::Config,
    errors::{ArbError, ArbResult, CircuitBreaker},
    execution::ArbitrageExecutor,
    types::{
        CapitalAccount, CapitalStatus, ExecutionRecord, ExecutionResult, HealthStatus, Opportunity,
        OpportunityRecord, PerformanceStats, ScanResult, SessionStats, Strategy, StrategyId,
    },
    utils::{BPS_DENOMINATOR, apply_bps, to_decimal},
    venues::VenueConfig,
};
use super::AccountCapitalProvider;

/// Operator-tunable thresholds applied before any execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskSettings {
    pub min_profit_bps: u32,
    pub min_discrepancy_bps: u32,
}

/// Best direction found for one strategy, with the thresholds it was judged against.
#[derive(Debug, Clone)]
pub struct StrategyCandidate {
    pub strategy_id: StrategyId,
    pub scan: ScanResult,
    pub sample_amount: U256,
    pub discrepancy_bps: u32,
    pub required_profit: U256,
    pub executable: bool,
}

impl StrategyCandidate {
    pub fn record(&self) -> OpportunityRecord {
        OpportunityRecord::new(
            Some(self.strategy_id),
            &self.scan.opportunity,
            self.sample_amount,
            self.scan.estimated_profit,
            self.discrepancy_bps,
        )
    }
}

pub struct StrategyManager {
    owner: Address,
    executor: ArbitrageExecutor,
    settings: RwLock<RiskSettings>,
    accounts: RwLock<HashMap<Address, Arc<Mutex<CapitalAccount>>>>,
    performance: RwLock<HashMap<Address, PerformanceStats>>,
    strategies: RwLock<Vec<Strategy>>,
    executors: RwLock<HashSet<Address>>,
    circuit_breaker: CircuitBreaker,
    session: RwLock<SessionStats>,
    journal: RwLock<Vec<ExecutionRecord>>,
    started_at: Instant,
}

impl StrategyManager {
    pub fn new(
        owner: Address,
        executor: ArbitrageExecutor,
        settings: RiskSettings,
        circuit_breaker: CircuitBreaker,
    ) -> Self {
        Self {
            owner,
            executor,
            settings: RwLock::new(settings),
            accounts: RwLock::new(HashMap::new()),
            performance: RwLock::new(HashMap::new()),
            strategies: RwLock::new(Vec::new()),
            executors: RwLock::new(HashSet::new()),
            circuit_breaker,
            session: RwLock::new(SessionStats::default()),
            journal: RwLock::new(Vec::new()),
            started_at: Instant::now(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.operator,
            ArbitrageExecutor::from_config(config),
            RiskSettings {
                min_profit_bps: config.min_profit_bps,
                min_discrepancy_bps: config.min_discrepancy_bps,
            },
            CircuitBreaker::new(config.max_consecutive_errors, config.circuit_breaker_cooldown_secs),
        )
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    // ---- authorization ----

    fn ensure_owner(&self, caller: Address) -> ArbResult<()> {
        if caller != self.owner {
            warn!("🚫 Rejected owner-only call from {}", caller);
            return Err(ArbError::UnauthorizedCaller { caller });
        }
        Ok(())
    }

    async fn ensure_executor(&self, caller: Address) -> ArbResult<()> {
        if caller == self.owner || self.executors.read().await.contains(&caller) {
            return Ok(());
        }
        warn!("🚫 Rejected execution trigger from {}", caller);
        Err(ArbError::UnauthorizedCaller { caller })
    }

    pub async fn set_executor(&self, caller: Address, executor: Address, authorized: bool) -> ArbResult<()> {
        self.ensure_owner(caller)?;
        let mut executors = self.executors.write().await;
        if authorized {
            executors.insert(executor);
        } else {
            executors.remove(&executor);
        }
        info!("Executor {} authorized: {}", executor, authorized);
        Ok(())
    }

    pub async fn is_executor(&self, address: Address) -> bool {
        address == self.owner || self.executors.read().await.contains(&address)
    }

    // ---- capital ----

    async fn account(&self, asset: Address) -> Arc<Mutex<CapitalAccount>> {
        if let Some(account) = self.accounts.read().await.get(&asset) {
            return account.clone();
        }
        self.accounts
            .write()
            .await
            .entry(asset)
            .or_insert_with(|| Arc::new(Mutex::new(CapitalAccount::default())))
            .clone()
    }

    pub async fn deposit_capital(&self, caller: Address, asset: Address, amount: U256) -> ArbResult<()> {
        self.ensure_owner(caller)?;
        if amount.is_zero() {
            return Err(ArbError::InvalidParameter("deposit must be non-zero".to_string()));
        }
        let account = self.account(asset).await;
        let mut account = account.lock().await;
        account.deposit(amount)?;
        info!(
            "💰 Deposited {:.4} of {} (available {:.4})",
            to_decimal(amount),
            asset,
            to_decimal(account.available)
        );
        Ok(())
    }

    pub async fn withdraw_capital(&self, caller: Address, asset: Address, amount: U256) -> ArbResult<()> {
        self.ensure_owner(caller)?;
        let account = self.account(asset).await;
        let mut account = account.lock().await;
        account.withdraw(asset, amount)?;
        info!(
            "💸 Withdrew {:.4} of {} (available {:.4})",
            to_decimal(amount),
            asset,
            to_decimal(account.available)
        );
        Ok(())
    }

    /// Zero removes the cap: scans then sample the whole pool.
    pub async fn set_max_capital_per_arbitrage(&self, caller: Address, asset: Address, amount: U256) -> ArbResult<()> {
        self.ensure_owner(caller)?;
        let account = self.account(asset).await;
        account.lock().await.max_per_trade = amount;
        info!("Max capital per arbitrage for {} set to {:.4}", asset, to_decimal(amount));
        Ok(())
    }

    pub async fn get_capital_status(&self, asset: Address) -> CapitalStatus {
        self.capital_account(asset).await.status()
    }

    /// Full ledger view of one asset's pool.
    pub async fn capital_account(&self, asset: Address) -> CapitalAccount {
        let account = self.accounts.read().await.get(&asset).cloned();
        match account {
            Some(account) => account.lock().await.clone(),
            None => CapitalAccount::default(),
        }
    }

    // ---- risk settings ----

    pub async fn set_min_profit_bps(&self, caller: Address, bps: u32) -> ArbResult<()> {
        self.ensure_owner(caller)?;
        check_bps(bps)?;
        self.settings.write().await.min_profit_bps = bps;
        info!("Min profit set to {} bps", bps);
        Ok(())
    }

    pub async fn set_min_discrepancy_bps(&self, caller: Address, bps: u32) -> ArbResult<()> {
        self.ensure_owner(caller)?;
        check_bps(bps)?;
        self.settings.write().await.min_discrepancy_bps = bps;
        info!("Min discrepancy set to {} bps", bps);
        Ok(())
    }

    pub async fn risk_settings(&self) -> RiskSettings {
        *self.settings.read().await
    }

    // ---- strategies ----

    pub async fn add_strategy(
        &self,
        caller: Address,
        pair_asset_a: Address,
        pair_asset_b: Address,
        candidate_cheap_venues: Vec<VenueConfig>,
        candidate_expensive_venues: Vec<VenueConfig>,
    ) -> ArbResult<StrategyId> {
        self.ensure_owner(caller)?;
        if pair_asset_a == pair_asset_b {
            return Err(ArbError::InvalidParameter("strategy pair assets must differ".to_string()));
        }
        if candidate_cheap_venues.is_empty() || candidate_expensive_venues.is_empty() {
            return Err(ArbError::InvalidParameter(
                "strategy needs at least one venue on each side".to_string(),
            ));
        }

        let mut strategies = self.strategies.write().await;
        let id = strategies.len() as StrategyId;
        let strategy = Strategy {
            id,
            pair_asset_a,
            pair_asset_b,
            candidate_cheap_venues,
            candidate_expensive_venues,
            active: true,
        };
        info!(
            "📋 Strategy #{} registered: {} / {} over {} venue pairs",
            id,
            pair_asset_a,
            pair_asset_b,
            strategy.candidate_count()
        );
        strategies.push(strategy);
        Ok(id)
    }

    pub async fn set_strategy_active(&self, caller: Address, id: StrategyId, active: bool) -> ArbResult<()> {
        self.ensure_owner(caller)?;
        let mut strategies = self.strategies.write().await;
        let strategy = strategies
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ArbError::UnknownStrategy(id))?;
        strategy.active = active;
        info!("Strategy #{} active: {}", id, active);
        Ok(())
    }

    pub async fn strategy(&self, id: StrategyId) -> ArbResult<Strategy> {
        self.strategies
            .read()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or(ArbError::UnknownStrategy(id))
    }

    pub async fn strategies(&self) -> Vec<Strategy> {
        self.strategies.read().await.clone()
    }

    // ---- scanning ----

    /// Best direction over every candidate pairing, tried both ways round.
    ///
    /// `None` when nothing shows a positive estimated profit. Pairings of a
    /// venue with itself are skipped. A failing quote fails the whole scan.
    pub async fn scan_opportunities(
        &self,
        pair_asset_a: Address,
        pair_asset_b: Address,
        cheap_candidates: &[VenueConfig],
        expensive_candidates: &[VenueConfig],
        sample_amount: U256,
    ) -> ArbResult<Option<ScanResult>> {
        if sample_amount.is_zero() {
            return Err(ArbError::InvalidParameter("sample amount must be non-zero".to_string()));
        }
        let min_profit_bps = self.settings.read().await.min_profit_bps;
        let mut best: Option<ScanResult> = None;

        for first in cheap_candidates {
            for second in expensive_candidates {
                if first.same_instance(second) {
                    continue;
                }
                for (cheap, expensive) in [(first, second), (second, first)] {
                    let opportunity = Opportunity::new(
                        pair_asset_a,
                        pair_asset_b,
                        cheap.clone(),
                        expensive.clone(),
                        min_profit_bps,
                    )?;
                    let profit = estimate_profit(&opportunity, sample_amount).await?;
                    let improves = match &best {
                        Some(current) => profit > current.estimated_profit,
                        None => !profit.is_zero(),
                    };
                    if improves {
                        best = Some(ScanResult {
                            opportunity,
                            estimated_profit: profit,
                        });
                    }
                }
            }
        }

        Ok(best)
    }

    /// Scans one strategy at its pool's trade ceiling and judges the best
    /// direction against the risk thresholds.
    async fn evaluate(&self, strategy: &Strategy, settings: RiskSettings) -> ArbResult<Option<StrategyCandidate>> {
        let sample_amount = self.account(strategy.base_asset()).await.lock().await.trade_ceiling();
        if sample_amount.is_zero() {
            debug!(strategy = strategy.id, "no capital to sample with");
            return Ok(None);
        }

        let Some(scan) = self
            .scan_opportunities(
                strategy.pair_asset_a,
                strategy.pair_asset_b,
                &strategy.candidate_cheap_venues,
                &strategy.candidate_expensive_venues,
                sample_amount,
            )
            .await?
        else {
            return Ok(None);
        };

        let discrepancy_bps = detect_discrepancy(&scan.opportunity, sample_amount).await?;
        let required_profit = apply_bps(sample_amount, settings.min_profit_bps)?;
        let executable = discrepancy_bps > 0
            && discrepancy_bps >= settings.min_discrepancy_bps
            && scan.estimated_profit >= required_profit;

        debug!(
            strategy = strategy.id,
            route = %scan.opportunity.route(),
            profit = %scan.estimated_profit,
            %required_profit,
            discrepancy_bps,
            executable,
            "strategy evaluated"
        );

        Ok(Some(StrategyCandidate {
            strategy_id: strategy.id,
            scan,
            sample_amount,
            discrepancy_bps,
            required_profit,
            executable,
        }))
    }

    /// Evaluates every active strategy; read-only.
    pub async fn survey(&self) -> ArbResult<Vec<StrategyCandidate>> {
        let settings = *self.settings.read().await;
        let strategies: Vec<Strategy> = self
            .strategies
            .read()
            .await
            .iter()
            .filter(|s| s.active)
            .cloned()
            .collect();

        let mut candidates = Vec::new();
        for strategy in &strategies {
            if let Some(candidate) = self.evaluate(strategy, settings).await? {
                candidates.push(candidate);
            }
        }
        Ok(candidates)
    }

    /// `(has_any, best_profit)` over executable candidates; `(false, 0)` when none clear the thresholds.
    pub async fn check_for_opportunities(&self) -> ArbResult<(bool, U256)> {
        let candidates = self.survey().await?;
        let best = best_executable(&candidates).map(|c| c.scan.estimated_profit);
        Ok((best.is_some(), best.unwrap_or(U256::ZERO)))
    }

    /// One monitoring pass: surveys every active strategy and counts the
    /// cycle in the session stats. Venue faults count toward the breaker.
    pub async fn scan_cycle(&self) -> ArbResult<Vec<StrategyCandidate>> {
        let candidates = self.survey_or_trip().await?;
        let mut session = self.session.write().await;
        session.scan_cycles += 1;
        if best_executable(&candidates).is_some() {
            session.opportunities_detected += 1;
        }
        Ok(candidates)
    }

    async fn survey_or_trip(&self) -> ArbResult<Vec<StrategyCandidate>> {
        let outcome = self.survey().await;
        if let Err(e) = &outcome {
            self.record_failure(e).await;
        }
        outcome
    }

    // ---- execution ----

    pub async fn scan_and_execute_strategy(&self, caller: Address, id: StrategyId) -> ArbResult<Option<ExecutionResult>> {
        self.ensure_executor(caller).await?;
        self.circuit_breaker.ensure_closed().await?;

        let strategy = self.strategy(id).await?;
        if !strategy.active {
            debug!(strategy = id, "inactive strategy not scanned");
            return Ok(None);
        }
        let settings = *self.settings.read().await;
        let evaluated = match self.evaluate(&strategy, settings).await {
            Ok(evaluated) => evaluated,
            Err(e) => {
                self.record_failure(&e).await;
                return Err(e);
            }
        };
        match evaluated {
            Some(candidate) if candidate.executable => self.execute_candidate(&candidate, settings).await.map(Some),
            _ => Ok(None),
        }
    }

    /// Scans every active strategy and executes only the single most profitable one.
    pub async fn scan_all_strategies(&self, caller: Address) -> ArbResult<Option<ExecutionResult>> {
        self.ensure_executor(caller).await?;
        self.circuit_breaker.ensure_closed().await?;

        let candidates = self.survey_or_trip().await?;
        self.execute_most_profitable(&candidates).await
    }

    /// Executes the most profitable of already surveyed candidates.
    pub async fn execute_best(&self, caller: Address, candidates: &[StrategyCandidate]) -> ArbResult<Option<ExecutionResult>> {
        self.ensure_executor(caller).await?;
        self.circuit_breaker.ensure_closed().await?;
        self.execute_most_profitable(candidates).await
    }

    async fn execute_most_profitable(&self, candidates: &[StrategyCandidate]) -> ArbResult<Option<ExecutionResult>> {
        let settings = *self.settings.read().await;
        match best_executable(candidates) {
            Some(candidate) => self.execute_candidate(candidate, settings).await.map(Some),
            None => Ok(None),
        }
    }

    async fn execute_candidate(&self, candidate: &StrategyCandidate, settings: RiskSettings) -> ArbResult<ExecutionResult> {
        let opportunity = &candidate.scan.opportunity;
        warn!(
            "🎯 Strategy #{} opportunity on {}: est. profit {:.6}, gap {} bps",
            candidate.strategy_id,
            opportunity.route(),
            to_decimal(candidate.scan.estimated_profit),
            candidate.discrepancy_bps
        );

        let amount_in = optimal_amount(opportunity, candidate.sample_amount).await?;
        let min_profit = apply_bps(amount_in, settings.min_profit_bps)?;
        self.execute_locked(Some(candidate.strategy_id), opportunity, amount_in, min_profit)
            .await
    }

    /// Direct execution of a caller-built opportunity.
    pub async fn execute_arbitrage(
        &self,
        caller: Address,
        opportunity: &Opportunity,
        amount_in: U256,
        min_profit: U256,
    ) -> ArbResult<ExecutionResult> {
        self.ensure_executor(caller).await?;
        if amount_in.is_zero() {
            return Err(ArbError::InvalidParameter("amount in must be non-zero".to_string()));
        }

        let status = self.get_capital_status(opportunity.base_asset()).await;
        if amount_in > status.available {
            return Err(ArbError::InsufficientCapital {
                asset: opportunity.base_asset(),
                required: amount_in,
                available: status.available,
            });
        }

        let min_discrepancy_bps = self.settings.read().await.min_discrepancy_bps;
        let discrepancy_bps = detect_discrepancy(opportunity, amount_in).await?;
        if discrepancy_bps == 0 || discrepancy_bps < min_discrepancy_bps {
            return Err(ArbError::PriceDiscrepancyTooLow {
                actual_bps: discrepancy_bps,
                required_bps: min_discrepancy_bps,
            });
        }

        self.execute_locked(None, opportunity, amount_in, min_profit).await
    }

    /// Runs the executor against the base asset's pool, holding its lock
    /// from reservation to settlement. A failed attempt releases the
    /// reservation, which leaves the account exactly as it was.
    async fn execute_locked(
        &self,
        strategy_id: Option<StrategyId>,
        opportunity: &Opportunity,
        amount_in: U256,
        min_profit: U256,
    ) -> ArbResult<ExecutionResult> {
        let asset = opportunity.base_asset();
        let account = self.account(asset).await;
        let mut account = account.lock().await;

        if amount_in > account.available {
            return Err(ArbError::InsufficientCapital {
                asset,
                required: amount_in,
                available: account.available,
            });
        }

        self.session.write().await.executions_attempted += 1;
        let started = Instant::now();

        let outcome = {
            let mut provider = AccountCapitalProvider::new(asset, &mut *account);
            self.executor
                .execute_arbitrage(opportunity, amount_in, min_profit, &mut provider)
                .await
        };

        match outcome {
            Ok(result) => {
                let execution_time_ms = started.elapsed().as_millis() as u64;
                self.performance
                    .write()
                    .await
                    .entry(asset)
                    .or_default()
                    .record(&result, Utc::now());
                self.session.write().await.executions_succeeded += 1;
                self.journal.write().await.push(ExecutionRecord::new(
                    strategy_id,
                    opportunity,
                    &result,
                    execution_time_ms,
                ));
                self.circuit_breaker.record_success().await;

                if !account.is_conserved() {
                    error!("Capital ledger for {} no longer conserves funds: {:?}", asset, *account);
                }
                info!(
                    "💰 Profit {:.6} credited to {} (available {:.4}, {}ms)",
                    to_decimal(result.profit),
                    asset,
                    to_decimal(account.available),
                    execution_time_ms
                );
                Ok(result)
            }
            Err(e) => {
                account.release();
                self.session.write().await.executions_failed += 1;
                self.record_failure(&e).await;
                Err(e)
            }
        }
    }

    /// Counts venue and execution faults; lost races are not faults.
    async fn record_failure(&self, e: &ArbError) {
        if !e.is_market_condition() && self.circuit_breaker.record_error().await {
            error!("Circuit breaker tripped after repeated failures: {}", e);
        }
    }

    // ---- monitoring ----

    pub async fn get_performance_stats(&self, asset: Address) -> PerformanceStats {
        self.performance
            .read()
            .await
            .get(&asset)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn session_stats(&self) -> SessionStats {
        self.session.read().await.clone()
    }

    /// Hands over execution records accumulated since the last call.
    pub async fn drain_execution_records(&self) -> Vec<ExecutionRecord> {
        std::mem::take(&mut *self.journal.write().await)
    }

    pub async fn health(&self) -> HealthStatus {
        let active_strategies = self.strategies.read().await.iter().filter(|s| s.active).count();
        let circuit_breaker_active = !self.circuit_breaker.can_proceed().await;
        let consecutive_errors = *self.circuit_breaker.consecutive_errors.read().await;
        HealthStatus {
            oracle_connection: true,
            last_oracle_update: None,
            consecutive_errors,
            circuit_breaker_active,
            active_strategies,
            uptime_seconds: self.started_at.elapsed().as_secs(),
        }
    }
}

fn check_bps(bps: u32) -> ArbResult<()> {
    if u64::from(bps) > BPS_DENOMINATOR {
        return Err(ArbError::InvalidParameter(format!("{bps} bps exceeds 100%")));
    }
    Ok(())
}

fn best_executable(candidates: &[StrategyCandidate]) -> Option<&StrategyCandidate> {
    candidates
        .iter()
        .filter(|c| c.executable)
        .max_by_key(|c| c.scan.estimated_profit)
}
