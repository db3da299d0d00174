// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::catalog::TradingPair;
use crate::domain::constants::{DAILY_BATCH_CYCLES, DAILY_PERIOD};
use crate::services::swap::approvals::ApprovalManager;
use crate::services::swap::context::SwapContext;
use crate::services::swap::executor::SwapExecutor;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Resolved by the CLI layer before the scheduler starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Manual { cycles: u32 },
    Daily,
}

#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub index: u32,
    pub total: u32,
    pub approvals_ok: usize,
    pub approvals_failed: usize,
    pub attempted: Vec<TradingPair>,
    pub swaps_ok: usize,
    pub swaps_failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: u64,
    pub cycles: u64,
    pub swaps_ok: u64,
    pub swaps_failed: u64,
    pub triggers_skipped: u64,
}

impl RunSummary {
    fn absorb(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.swaps_ok += report.swaps_ok as u64;
        self.swaps_failed += report.swaps_failed as u64;
    }
}

/// Daily trigger arithmetic, anchored at the first batch.
///
/// Triggers fire at `anchor + k * period`. A trigger that passes while a
/// batch is still running is skipped, not queued.
#[derive(Debug, Clone, Copy)]
pub struct DailyCadence {
    anchor: Duration,
    period: Duration,
    last_index: u64,
}

impl DailyCadence {
    pub fn new(anchor: Duration, period: Duration) -> Self {
        Self {
            anchor,
            period: period.max(Duration::from_secs(1)),
            last_index: 0,
        }
    }

    /// Next trigger strictly after `now`, plus how many triggers were missed.
    pub fn next_after(&mut self, now: Duration) -> (Duration, u64) {
        let elapsed = now.saturating_sub(self.anchor);
        let index = (elapsed.as_nanos() / self.period.as_nanos()) as u64 + 1;
        let index = index.max(self.last_index + 1);
        let skipped = index - self.last_index - 1;
        self.last_index = index;
        let offset = u32::try_from(index)
            .ok()
            .and_then(|k| self.period.checked_mul(k))
            .unwrap_or(Duration::MAX);
        (self.anchor.saturating_add(offset), skipped)
    }
}

/// Runs cycles: approvals for every token, then each pair exactly once.
#[derive(Clone)]
pub struct CycleScheduler {
    ctx: Arc<SwapContext>,
    approvals: ApprovalManager,
    executor: SwapExecutor,
}

impl CycleScheduler {
    pub fn new(ctx: Arc<SwapContext>) -> Self {
        Self {
            approvals: ApprovalManager::new(ctx.clone()),
            executor: SwapExecutor::new(ctx.clone()),
            ctx,
        }
    }

    pub fn approvals(&self) -> &ApprovalManager {
        &self.approvals
    }

    /// The shuffled pair sequence for one cycle; a permutation of the catalog.
    pub fn cycle_order(&self) -> Vec<TradingPair> {
        let mut order = self.ctx.catalog.pairs().to_vec();
        self.ctx.rng.shuffle(&mut order);
        order
    }

    pub async fn run_cycle(&self, index: u32, total: u32) -> CycleReport {
        tracing::info!(target: "scheduler", cycle = index, total, "Cycle start");
        let mut report = CycleReport {
            index,
            total,
            ..CycleReport::default()
        };

        for token in self.ctx.catalog.tokens() {
            if self.approvals.ensure_approved(token).await {
                report.approvals_ok += 1;
            } else {
                report.approvals_failed += 1;
                tracing::warn!(target: "scheduler", token = %token.name, "Continuing despite failed approval");
            }
        }

        let max_retries = self.ctx.policy.max_retries;
        for pair in self.cycle_order() {
            let outcome = self.executor.swap(&pair, max_retries).await;
            report.attempted.push(pair);
            if outcome.is_success() {
                report.swaps_ok += 1;
                self.ctx.clock.sleep(self.ctx.policy.inter_swap_pause).await;
            } else {
                report.swaps_failed += 1;
            }
        }

        tracing::info!(
            target: "scheduler",
            cycle = index,
            total,
            swaps_ok = report.swaps_ok,
            swaps_failed = report.swaps_failed,
            approvals_failed = report.approvals_failed,
            "Cycle complete"
        );
        report
    }

    /// `cycles` cycles back to back; shutdown is honoured between cycles.
    pub async fn run_batch(&self, cycles: u32, shutdown: &CancellationToken, summary: &mut RunSummary) {
        summary.batches += 1;
        for index in 1..=cycles {
            if shutdown.is_cancelled() {
                tracing::info!(target: "scheduler", cycle = index, "Shutdown requested; stopping before cycle");
                return;
            }
            let report = self.run_cycle(index, cycles).await;
            summary.absorb(&report);
        }
    }

    pub async fn run(&self, mode: RunMode, shutdown: CancellationToken) -> RunSummary {
        match mode {
            RunMode::Manual { cycles } => self.run_manual(cycles, &shutdown).await,
            RunMode::Daily => self.run_daily(&shutdown).await,
        }
    }

    pub async fn run_manual(&self, cycles: u32, shutdown: &CancellationToken) -> RunSummary {
        tracing::info!(target: "scheduler", cycles, "Manual mode");
        let mut summary = RunSummary::default();
        self.run_batch(cycles, shutdown, &mut summary).await;
        tracing::info!(
            target: "scheduler",
            cycles = summary.cycles,
            swaps_ok = summary.swaps_ok,
            swaps_failed = summary.swaps_failed,
            "Run complete"
        );
        summary
    }

    /// Three cycles now, then three more at every 24h mark until shutdown.
    pub async fn run_daily(&self, shutdown: &CancellationToken) -> RunSummary {
        tracing::info!(target: "scheduler", cycles = DAILY_BATCH_CYCLES, "Daily mode");
        let mut summary = RunSummary::default();
        let mut cadence = DailyCadence::new(self.ctx.clock.now(), DAILY_PERIOD);

        while !shutdown.is_cancelled() {
            tracing::info!(
                target: "scheduler",
                batch = summary.batches + 1,
                unix = self.ctx.clock.unix_now(),
                "Daily batch start"
            );
            self.run_batch(DAILY_BATCH_CYCLES, shutdown, &mut summary).await;

            let now = self.ctx.clock.now();
            let (next, skipped) = cadence.next_after(now);
            if skipped > 0 {
                summary.triggers_skipped += skipped;
                tracing::warn!(
                    target: "scheduler",
                    skipped,
                    "Batch overran the daily period; skipped overlapping triggers"
                );
            }
            let wait = next.saturating_sub(now);
            tracing::info!(target: "scheduler", wait_secs = wait.as_secs(), "Waiting for next daily batch");
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.ctx.clock.sleep(wait) => {}
            }
        }

        tracing::info!(
            target: "scheduler",
            batches = summary.batches,
            cycles = summary.cycles,
            "Daily mode stopped"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(86_400);

    #[test]
    fn cadence_fires_on_day_boundaries() {
        let mut cadence = DailyCadence::new(Duration::ZERO, DAY);
        assert_eq!(cadence.next_after(Duration::from_secs(900)), (DAY, 0));
        assert_eq!(cadence.next_after(DAY + Duration::from_secs(900)), (DAY * 2, 0));
    }

    #[test]
    fn cadence_skips_triggers_missed_during_overrun() {
        let mut cadence = DailyCadence::new(Duration::from_secs(10), DAY);
        // Batch ran for 2.5 days: triggers at day 1 and 2 passed mid-batch.
        let now = Duration::from_secs(10) + DAY * 5 / 2;
        let (next, skipped) = cadence.next_after(now);
        assert_eq!(next, Duration::from_secs(10) + DAY * 3);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn cadence_never_repeats_a_trigger() {
        let mut cadence = DailyCadence::new(Duration::ZERO, DAY);
        let (first, _) = cadence.next_after(Duration::ZERO);
        // A clock that has not moved still yields the following trigger.
        let (second, skipped) = cadence.next_after(Duration::ZERO);
        assert_eq!(first, DAY);
        assert_eq!(second, DAY * 2);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn cadence_stays_ahead_of_very_late_clocks() {
        let period = Duration::from_secs(1);
        let mut cadence = DailyCadence::new(Duration::ZERO, period);
        let now = Duration::from_secs(u64::from(u32::MAX) * 2);
        let (next, skipped) = cadence.next_after(now);
        assert!(next > now);
        assert_eq!(skipped, u64::from(u32::MAX) * 2);
    }
}
