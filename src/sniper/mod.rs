//! Opportunity loop: poll one market until a shot is taken or the market
//! can no longer be sniped.
//!
//! Each cycle fetches a snapshot, checks the market lifecycle, evaluates the
//! book and, when every check passes, submits the plan exactly once. Cycles
//! never overlap and state is threaded explicitly through [`LoopState`].

pub mod state;

use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::arbitrage::{evaluate_snapshot, AllocationPlan, Decision, Evaluation};
use crate::config::{Config, RiskParameters};
use crate::error::{BotError, ExecutionError, Result};
use crate::market::{MarketDataProvider, MarketSnapshot, MarketStatus};
use crate::metrics;
use crate::trading::{submit_batch, ExecutionGateway, ExecutionReport};
use crate::utils::ShutdownFlag;

pub use state::{AbortReason, CycleOutcome, LoopState, Phase, RunSummary, Termination, WaitReason};

/// Single-market dutching sniper.
pub struct Sniper<P, G> {
    market_id: String,
    risk: RiskParameters,
    provider: P,
    gateway: G,
    poll_interval: Duration,
}

impl<P, G> Sniper<P, G>
where
    P: MarketDataProvider,
    G: ExecutionGateway,
{
    /// Create a sniper for one market.
    pub fn new(
        market_id: impl Into<String>,
        risk: RiskParameters,
        provider: P,
        gateway: G,
    ) -> Self {
        Self {
            market_id: market_id.into(),
            risk,
            provider,
            gateway,
            poll_interval: Duration::from_secs(7),
        }
    }

    /// Create a sniper from loaded configuration.
    pub fn from_config(config: &Config, provider: P, gateway: G) -> Self {
        Self::new(config.market_id.clone(), config.risk_parameters(), provider, gateway)
            .with_poll_interval(config.poll_interval())
    }

    /// Set the wait between polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Market being watched.
    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    /// Risk settings in force.
    pub fn risk(&self) -> &RiskParameters {
        &self.risk
    }

    /// Snapshot source.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Bet destination.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Poll until done, aborted or cancelled.
    ///
    /// Feed and gateway failures end the run with an error. Cancellation
    /// is honoured between cycles and during the wait.
    pub async fn run(&self, mut shutdown: ShutdownFlag) -> Result<RunSummary> {
        let mut state = LoopState::new();
        info!(
            market = %self.market_id,
            side = %self.risk.side,
            provider = self.provider.name(),
            gateway = self.gateway.name(),
            live = self.gateway.is_live(),
            "Starting sniper"
        );

        loop {
            if shutdown.is_triggered() {
                info!(polls = state.polls, "Shutdown requested, stopping");
                return Ok(RunSummary {
                    termination: Termination::Cancelled,
                    state,
                });
            }

            let termination = match self.step(&mut state).await? {
                CycleOutcome::Submitted(report) => Some(Termination::Done(report)),
                CycleOutcome::Aborted(reason) => Some(Termination::Aborted(reason)),
                _ => None,
            };
            if let Some(termination) = termination {
                return Ok(RunSummary { termination, state });
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.triggered() => {
                    info!(polls = state.polls, "Shutdown requested while waiting, stopping");
                    return Ok(RunSummary {
                        termination: Termination::Cancelled,
                        state,
                    });
                }
            }
        }
    }

    /// Run exactly one cycle.
    ///
    /// Refuses to run once the loop has finished: a fired shot gives
    /// `AlreadySubmitted`, any other terminal phase gives `LoopFinished`.
    #[instrument(skip(self, state), fields(market = %self.market_id, poll = state.polls + 1))]
    pub async fn step(&self, state: &mut LoopState) -> Result<CycleOutcome> {
        if state.shot_fired {
            return Err(ExecutionError::AlreadySubmitted {
                market_id: self.market_id.clone(),
            }
            .into());
        }
        if state.phase.is_terminal() {
            return Err(BotError::LoopFinished { phase: state.phase });
        }

        state.begin_poll();
        metrics::inc_polls();

        let fetched = {
            let _timer = metrics::timer_snapshot_fetch();
            self.provider.fetch_snapshot(&self.market_id).await
        };
        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Failed to get prices, aborting");
                state.phase = Phase::Aborted;
                return Err(e.into());
            }
        };

        if let Some(outcome) = self.check_lifecycle(&snapshot, state) {
            return Ok(outcome);
        }

        state.phase = Phase::Evaluating;
        let evaluation = match evaluate_snapshot(&snapshot, &self.risk) {
            Ok(evaluation) => evaluation,
            Err(e) => {
                warn!(reason = %e, "Incomplete book");
                metrics::inc_incomplete_books();
                state.phase = Phase::Polling;
                return Ok(CycleOutcome::IncompleteBook(e));
            }
        };

        state.last_overround = Some(evaluation.overround);
        metrics::set_overround(evaluation.overround);

        match evaluation.decision.clone() {
            Decision::Idle => {
                info!(poll = state.polls, "{}", evaluation);
                state.phase = Phase::Idle;
                Ok(CycleOutcome::Idle {
                    overround: evaluation.overround,
                    threshold: evaluation.threshold,
                })
            }
            Decision::Rejected { reason } => {
                state.phase = Phase::Triggered;
                state.opportunities += 1;
                state.rejections += 1;
                metrics::inc_opportunities_detected();
                metrics::inc_plans_rejected(reason.reason());
                warn!(
                    overround = %evaluation.overround,
                    reason = reason.reason(),
                    "{}, won't take the shot",
                    reason
                );
                Ok(CycleOutcome::Rejected {
                    overround: evaluation.overround,
                    reason,
                })
            }
            Decision::Fire { plan } => {
                state.phase = Phase::Triggered;
                state.opportunities += 1;
                metrics::inc_opportunities_detected();
                self.report_plan(&evaluation, &plan);

                let report = self.fire(state, &plan).await?;
                Ok(CycleOutcome::Submitted(report))
            }
        }
    }

    /// Map market status and in-play state to a wait or an abort.
    ///
    /// Only closed and suspended markets are held back by status; any other
    /// status is evaluated, subject to the in-play rule.
    fn check_lifecycle(
        &self,
        snapshot: &MarketSnapshot,
        state: &mut LoopState,
    ) -> Option<CycleOutcome> {
        let outcome = match snapshot.status() {
            MarketStatus::Closed => CycleOutcome::Aborted(AbortReason::Closed),
            MarketStatus::Suspended if self.risk.abort_on_suspend => {
                CycleOutcome::Aborted(AbortReason::Suspended)
            }
            MarketStatus::Suspended => CycleOutcome::Waiting(WaitReason::Suspended),
            _ if snapshot.is_in_play() && !self.risk.bet_in_play => {
                CycleOutcome::Aborted(AbortReason::InPlay)
            }
            MarketStatus::Active | MarketStatus::Inactive => return None,
        };

        match &outcome {
            CycleOutcome::Aborted(reason) => {
                info!(
                    status = %snapshot.status(),
                    delay = snapshot.delay(),
                    "{}, stopping",
                    reason
                );
                state.phase = Phase::Aborted;
            }
            CycleOutcome::Waiting(reason) => {
                info!(status = %snapshot.status(), "{}, waiting", reason);
                state.phase = Phase::Polling;
            }
            _ => {}
        }
        Some(outcome)
    }

    fn report_plan(&self, evaluation: &Evaluation, plan: &AllocationPlan) {
        info!("{}", "*".repeat(72));
        info!(
            "Sniping opportunity found! Overround is {:.1}",
            evaluation.overround
        );
        for leg in &plan.legs {
            info!(
                selection = %leg.runner.key,
                runner = %leg.runner.label(),
                side = %plan.side,
                stake = %leg.stake.round_dp(2),
                price = %leg.runner.price,
                available = %leg.runner.available,
                profit = %leg.profit.round_dp(2),
                "Leg"
            );
        }
        if !evaluation.excluded.is_empty() {
            let ignored: Vec<String> = evaluation.excluded.iter().map(|k| k.to_string()).collect();
            info!(
                ignored = ?ignored,
                ceiling = %self.risk.exclude_over,
                "Ignoring runners over the price ceiling"
            );
        }
        info!(
            total_stake = %plan.total_stake.round_dp(2),
            min_profit = %plan.min_profit.round_dp(2),
            average_profit = %plan.average_profit.round_dp(2),
            worst_case_roi = %plan.worst_case_roi().round_dp(2),
            "{:.2} required for avg profit of {:.2}",
            plan.total_stake,
            plan.average_profit
        );
    }

    /// Submit the plan. The shot counts as fired before the gateway answers.
    async fn fire(&self, state: &mut LoopState, plan: &AllocationPlan) -> Result<ExecutionReport> {
        state.shot_fired = true;

        let report = match submit_batch(&self.gateway, plan.instructions(&self.market_id)).await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Failed to place bets");
                state.phase = Phase::Aborted;
                return Err(e.into());
            }
        };

        if report.all_succeeded() {
            info!(
                gateway = %report.gateway,
                legs = report.outcomes.len(),
                matched = %report.total_matched(),
                "Bets placed"
            );
        } else {
            for failure in report.failures() {
                error!(selection = %failure.selection, code = %failure.result_code, "Bet failed");
            }
        }

        state.phase = Phase::Done;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AllocationError, FeedError, ValuationError};
    use crate::market::{MarketSnapshot, MockConfig, MockExchange, MockSnapshotBuilder};
    use crate::trading::{PlaceResultCode, Side};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const MARKET: &str = "1.20771785";

    fn sniper(
        exchange: &MockExchange,
        risk: RiskParameters,
    ) -> Sniper<MockExchange, MockExchange> {
        Sniper::new(MARKET, risk, exchange.clone(), exchange.clone())
            .with_poll_interval(Duration::from_secs(7))
    }

    fn book(prices: [Decimal; 3], available: [Decimal; 3]) -> MarketSnapshot {
        MockSnapshotBuilder::new(MARKET)
            .back(1, prices[0], available[0])
            .back(2, prices[1], available[1])
            .back(3, prices[2], available[2])
            .build()
            .unwrap()
    }

    fn balanced() -> MarketSnapshot {
        book([dec!(2.0), dec!(3.0), dec!(6.0)], [dec!(100); 3])
    }

    fn underround() -> MarketSnapshot {
        book([dec!(2.0), dec!(3.2), dec!(7.0)], [dec!(100); 3])
    }

    fn status(status: MarketStatus) -> MarketSnapshot {
        MockSnapshotBuilder::new(MARKET)
            .status(status)
            .back(1, dec!(2.0), dec!(100))
            .back(2, dec!(2.0), dec!(100))
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn balanced_book_keeps_polling() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(balanced());
        let sniper = sniper(&exchange, RiskParameters::default());

        let mut state = LoopState::new();
        let outcome = sniper.step(&mut state).await.unwrap();

        assert!(matches!(outcome, CycleOutcome::Idle { threshold, .. } if threshold == dec!(99)));
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.polls, 1);
        assert!(exchange.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn underround_book_fires_once_and_finishes() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(balanced());
        exchange.push_snapshot(underround());
        let sniper = sniper(&exchange, RiskParameters::default());

        let summary = sniper.run(ShutdownFlag::never()).await.unwrap();

        let Termination::Done(report) = summary.termination else {
            panic!("expected a shot, got {:?}", summary.termination);
        };
        assert!(report.all_succeeded());
        assert_eq!(summary.state.phase, Phase::Done);
        assert_eq!(summary.state.polls, 2);
        assert_eq!(summary.state.opportunities, 1);
        assert!(summary.state.shot_fired);

        let submissions = exchange.submissions();
        assert_eq!(submissions.len(), 1);
        let stakes: Vec<Decimal> = submissions[0].iter().map(|b| b.stake.round_dp(3)).collect();
        assert_eq!(stakes, vec![dec!(7.000), dec!(4.375), dec!(2.000)]);
    }

    #[tokio::test(start_paused = true)]
    async fn thin_market_is_not_sniped() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(book(
            [dec!(2.0), dec!(3.2), dec!(7.0)],
            [dec!(100), dec!(100), dec!(1.00)],
        ));
        let sniper = sniper(&exchange, RiskParameters::default());

        let mut state = LoopState::new();
        let outcome = sniper.step(&mut state).await.unwrap();

        match outcome {
            CycleOutcome::Rejected {
                reason: AllocationError::InsufficientLiquidity { shortfalls },
                ..
            } => assert_eq!(shortfalls.len(), 1),
            other => panic!("expected liquidity rejection, got {:?}", other),
        }
        assert_eq!(state.rejections, 1);
        assert!(!state.shot_fired);
        assert!(exchange.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn suspension_waits_then_resumes() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(balanced());
        exchange.push_snapshot(status(MarketStatus::Suspended));
        exchange.push_snapshot(underround());
        let sniper = sniper(&exchange, RiskParameters::default());

        let mut state = LoopState::new();
        assert!(matches!(sniper.step(&mut state).await.unwrap(), CycleOutcome::Idle { .. }));
        let overround = state.last_overround;

        let outcome = sniper.step(&mut state).await.unwrap();
        assert_eq!(outcome, CycleOutcome::Waiting(WaitReason::Suspended));
        // nothing evaluated while suspended
        assert_eq!(state.last_overround, overround);

        let outcome = sniper.step(&mut state).await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Submitted(_)));
        assert_eq!(exchange.submissions().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn suspension_aborts_when_configured() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(status(MarketStatus::Suspended));
        let risk = RiskParameters {
            abort_on_suspend: true,
            ..Default::default()
        };

        let summary = sniper(&exchange, risk).run(ShutdownFlag::never()).await.unwrap();

        assert_eq!(summary.termination, Termination::Aborted(AbortReason::Suspended));
        assert_eq!(summary.state.phase, Phase::Aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_market_aborts() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(balanced());
        exchange.push_snapshot(status(MarketStatus::Closed));

        let summary = sniper(&exchange, RiskParameters::default())
            .run(ShutdownFlag::never())
            .await
            .unwrap();

        assert_eq!(summary.termination, Termination::Aborted(AbortReason::Closed));
        assert_eq!(summary.state.polls, 2);
        assert!(exchange.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn inactive_market_is_evaluated() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(
            MockSnapshotBuilder::new(MARKET)
                .status(MarketStatus::Inactive)
                .back(1, dec!(2.0), dec!(100))
                .back(2, dec!(3.2), dec!(100))
                .back(3, dec!(7.0), dec!(100))
                .build()
                .unwrap(),
        );
        let risk = RiskParameters {
            abort_on_suspend: true,
            ..Default::default()
        };

        let mut state = LoopState::new();
        let outcome = sniper(&exchange, risk).step(&mut state).await.unwrap();

        assert!(matches!(outcome, CycleOutcome::Submitted(_)));
        assert_eq!(exchange.submissions().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn inactive_market_in_play_aborts() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(
            MockSnapshotBuilder::new(MARKET)
                .status(MarketStatus::Inactive)
                .delay(5)
                .back(1, dec!(2.0), dec!(100))
                .back(2, dec!(3.2), dec!(100))
                .build()
                .unwrap(),
        );

        let mut state = LoopState::new();
        let outcome = sniper(&exchange, RiskParameters::default())
            .step(&mut state)
            .await
            .unwrap();

        assert_eq!(outcome, CycleOutcome::Aborted(AbortReason::InPlay));
        assert_eq!(state.phase, Phase::Aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_loop_refuses_further_cycles() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(status(MarketStatus::Closed));
        exchange.push_snapshot(underround());
        let sniper = sniper(&exchange, RiskParameters::default());

        let mut state = LoopState::new();
        let outcome = sniper.step(&mut state).await.unwrap();
        assert_eq!(outcome, CycleOutcome::Aborted(AbortReason::Closed));

        let err = sniper.step(&mut state).await.unwrap_err();
        assert!(matches!(
            err,
            BotError::LoopFinished {
                phase: Phase::Aborted
            }
        ));
        assert_eq!(state.polls, 1);
        assert_eq!(exchange.fetch_count(), 1);
        assert!(exchange.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn bad_price_skips_the_cycle() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(book(
            [dec!(2.0), dec!(-3.2), dec!(7.0)],
            [dec!(100); 3],
        ));
        exchange.push_snapshot(underround());
        let sniper = sniper(&exchange, RiskParameters::default());

        let mut state = LoopState::new();
        let outcome = sniper.step(&mut state).await.unwrap();
        assert!(matches!(
            outcome,
            CycleOutcome::IncompleteBook(ValuationError::InvalidPrice { .. })
        ));
        assert_eq!(state.phase, Phase::Polling);

        let outcome = sniper.step(&mut state).await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Submitted(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn in_play_market_aborts_unless_allowed() {
        let in_play = MockSnapshotBuilder::new(MARKET)
            .delay(5)
            .back(1, dec!(2.0), dec!(100))
            .back(2, dec!(3.2), dec!(100))
            .back(3, dec!(7.0), dec!(100))
            .build()
            .unwrap();

        let exchange = MockExchange::new();
        exchange.push_snapshot(in_play.clone());
        let mut state = LoopState::new();
        let outcome = sniper(&exchange, RiskParameters::default())
            .step(&mut state)
            .await
            .unwrap();
        assert_eq!(outcome, CycleOutcome::Aborted(AbortReason::InPlay));

        let exchange = MockExchange::new();
        exchange.push_snapshot(in_play);
        let risk = RiskParameters {
            bet_in_play: true,
            ..Default::default()
        };
        let mut state = LoopState::new();
        let outcome = sniper(&exchange, risk).step(&mut state).await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Submitted(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn incomplete_book_skips_the_cycle() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(
            MockSnapshotBuilder::new(MARKET)
                .back(1, dec!(2.0), dec!(100))
                .unpriced(2)
                .build()
                .unwrap(),
        );
        exchange.push_snapshot(underround());
        let sniper = sniper(&exchange, RiskParameters::default());

        let mut state = LoopState::new();
        let outcome = sniper.step(&mut state).await.unwrap();
        assert!(matches!(outcome, CycleOutcome::IncompleteBook(ValuationError::Unpriced { .. })));
        assert_eq!(state.phase, Phase::Polling);
        assert_eq!(state.last_overround, None);

        assert!(matches!(sniper.step(&mut state).await.unwrap(), CycleOutcome::Submitted(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_is_fatal() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(balanced());
        exchange.push_failure("session expired");

        let err = sniper(&exchange, RiskParameters::default())
            .run(ShutdownFlag::never())
            .await
            .unwrap_err();

        assert!(matches!(err, BotError::Feed(FeedError::FetchFailed { .. })));
        assert_eq!(exchange.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stake_limit_rejection_waits_for_next_poll() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(underround());
        exchange.push_snapshot(status(MarketStatus::Closed));
        let risk = RiskParameters {
            max_total_stake: dec!(10),
            ..Default::default()
        };

        let summary = sniper(&exchange, risk).run(ShutdownFlag::never()).await.unwrap();

        assert_eq!(summary.termination, Termination::Aborted(AbortReason::Closed));
        assert_eq!(summary.state.rejections, 1);
        assert!(exchange.submissions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_bets_still_finish_the_run() {
        let exchange = MockExchange::with_config(MockConfig {
            reject_with: Some(PlaceResultCode::EventSuspended),
            ..Default::default()
        });
        exchange.push_snapshot(underround());
        exchange.push_snapshot(underround());

        let summary = sniper(&exchange, RiskParameters::default())
            .run(ShutdownFlag::never())
            .await
            .unwrap();

        let Termination::Done(report) = summary.termination else {
            panic!("expected the run to finish");
        };
        assert!(!report.all_succeeded());
        assert_eq!(exchange.submissions().len(), 1);
        assert_eq!(exchange.remaining_steps(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gateway_failure_is_fatal_and_not_retried() {
        let exchange = MockExchange::with_config(MockConfig {
            fail_submit: true,
            ..Default::default()
        });
        exchange.push_snapshot(underround());
        exchange.push_snapshot(underround());
        let sniper = sniper(&exchange, RiskParameters::default());

        let mut state = LoopState::new();
        let err = sniper.step(&mut state).await.unwrap_err();
        assert!(matches!(err, BotError::Execution(ExecutionError::SubmissionFailed(_))));
        assert!(state.shot_fired);

        let err = sniper.step(&mut state).await.unwrap_err();
        assert!(matches!(err, BotError::Execution(ExecutionError::AlreadySubmitted { .. })));
        assert_eq!(exchange.submissions().len(), 1);
        assert_eq!(exchange.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_between_cycles() {
        let exchange = MockExchange::new();
        for _ in 0..10 {
            exchange.push_snapshot(balanced());
        }
        let sniper = sniper(&exchange, RiskParameters::default());
        let (tx, flag) = ShutdownFlag::new();

        let canceller = async {
            tokio::time::sleep(Duration::from_secs(15)).await;
            tx.send(true).unwrap();
        };
        let (summary, _) = tokio::join!(sniper.run(flag), canceller);
        let summary = summary.unwrap();

        assert_eq!(summary.termination, Termination::Cancelled);
        // polls at t=0, 7 and 14; cancelled while waiting for t=21
        assert_eq!(summary.state.polls, 3);
        assert_eq!(exchange.fetch_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_start_never_polls() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(underround());
        let (tx, flag) = ShutdownFlag::new();
        tx.send(true).unwrap();

        let summary = sniper(&exchange, RiskParameters::default())
            .run(flag)
            .await
            .unwrap();

        assert_eq!(summary.termination, Termination::Cancelled);
        assert_eq!(exchange.fetch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn lay_side_fires_on_overbroke_book() {
        let exchange = MockExchange::new();
        exchange.push_snapshot(
            MockSnapshotBuilder::new(MARKET)
                .runner(1, (dec!(1.55), dec!(50)), (dec!(1.6), dec!(50)))
                .runner(2, (dec!(1.95), dec!(50)), (dec!(2.0), dec!(50)))
                .build()
                .unwrap(),
        );
        let risk = RiskParameters {
            side: Side::Lay,
            ..Default::default()
        };

        let summary = sniper(&exchange, risk).run(ShutdownFlag::never()).await.unwrap();

        assert!(matches!(summary.termination, Termination::Done(_)));
        let bets = &exchange.submissions()[0];
        assert!(bets.iter().all(|b| b.side == Side::Lay));
        assert_eq!(bets[0].stake, dec!(2.5));
        assert_eq!(bets[1].stake, dec!(2));
    }
}
