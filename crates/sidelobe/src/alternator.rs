//! The alternator: control case, test case, repeat.
//!
//! Before each test case the alternator re-establishes that the observation
//! channel is healthy by sending a control case and checking that the
//! harness sees it. A missed control case is an environment failure, never
//! a finding: the alternator resets the target if the harness can, and
//! retries the control case until it passes. Only then is the test case
//! sent and its verdict recorded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sidelobe_gen::CaseGenerator;
use sidelobe_harness::Harness;
use sidelobe_io::Transceiver;
use sidelobe_types::{Case, ConstraintSet, Verdict};
use tracing::{debug, info, warn};

use crate::result::{RAW_CONTROL_CASE, RAW_TEST_CASE};
use crate::{GeneratorInfo, HarnessInfo, Result, ResultSet, RunError, RunStats, TestResult};

/// How cases are sent and recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlternatorMode {
    /// Check validity immediately after each transmit; record verdicts only.
    Plain,
    /// Wait `settle` after each transmit and record the hex of every control
    /// and test case. Meant for over-the-air harnesses, where evidence lags
    /// transmission.
    #[default]
    RxFrame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlternatorConfig {
    pub mode: AlternatorMode,
    /// Delay between transmit and validity check in `RxFrame` mode.
    pub settle: Duration,
    /// Fail the run after this many consecutive control misses. `None`
    /// retries indefinitely.
    pub max_control_attempts: Option<u32>,
    /// Without reset support, repeat the retry warning every this many
    /// attempts.
    pub warn_every: u32,
}

impl Default for AlternatorConfig {
    fn default() -> Self {
        Self {
            mode: AlternatorMode::RxFrame,
            settle: Duration::from_millis(500),
            max_control_attempts: None,
            warn_every: 10,
        }
    }
}

impl AlternatorConfig {
    /// Plain mode with no settle delay.
    pub fn plain() -> Self {
        Self {
            mode: AlternatorMode::Plain,
            settle: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// A control case that was observed, and what it took.
struct ControlPass {
    control: Case,
    resets: u32,
}

/// Drives one generator, one harness and one transmit interface through a
/// run.
pub struct Alternator {
    generator: Box<dyn CaseGenerator>,
    harness: Box<dyn Harness>,
    link: Arc<dyn Transceiver>,
    config: AlternatorConfig,
    constraints: ConstraintSet,
    stop: Arc<AtomicBool>,
}

impl Alternator {
    pub fn new(
        generator: Box<dyn CaseGenerator>,
        harness: Box<dyn Harness>,
        link: Arc<dyn Transceiver>,
        config: AlternatorConfig,
    ) -> Self {
        Self {
            generator,
            harness,
            link,
            config,
            constraints: ConstraintSet::new(),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Per-call constraints for every `test_cases` call of the run.
    pub fn with_constraints(mut self, constraints: ConstraintSet) -> Self {
        self.constraints = constraints;
        self
    }

    /// Shares an externally owned stop flag, e.g. one set by a signal handler.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Setting the flag ends the run at the next case boundary or control
    /// retry, with a finalized partial result set.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn config(&self) -> &AlternatorConfig {
        &self.config
    }

    pub fn generator(&self) -> &dyn CaseGenerator {
        self.generator.as_ref()
    }

    pub fn harness(&self) -> &dyn Harness {
        self.harness.as_ref()
    }

    /// Runs `iterations` passes over the generator's test cases.
    ///
    /// Constraint errors are reported before the interface or harness is
    /// touched. The harness is closed before this returns, on success or
    /// failure; the interface is left open.
    pub fn run(&mut self, iterations: u32) -> Result<ResultSet> {
        self.generator.test_cases(1, &self.constraints)?;

        if !self.link.is_running() {
            self.link.open()?;
        }
        self.harness.open()?;

        let mut results = ResultSet::start(
            self.link.status(),
            HarnessInfo {
                name: self.harness.name().to_string(),
                supports_reset: self.harness.supports_reset(),
            },
            GeneratorInfo {
                name: self.generator.name().to_string(),
                includes_phy: self.generator.includes_phy(),
                includes_mac: self.generator.includes_mac(),
            },
        );
        info!(
            interface = self.link.name(),
            harness = self.harness.name(),
            generator = self.generator.name(),
            iterations,
            "run started"
        );

        let mut stats = RunStats::default();
        let outcome = self.run_iterations(iterations, &mut results, &mut stats);
        stats.evidence_dropped = self.harness.dropped_evidence();
        let closed = self.harness.close();
        outcome?;
        closed?;

        results.finalize(stats);
        info!(
            results = results.len(),
            control_misses = stats.control_misses,
            resets = stats.resets_attempted,
            interrupted = stats.interrupted,
            "run finished"
        );
        Ok(results)
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    fn run_iterations(
        &mut self,
        iterations: u32,
        results: &mut ResultSet,
        stats: &mut RunStats,
    ) -> Result<()> {
        for iteration in 0..iterations {
            let mut cases = self.generator.test_cases(1, &self.constraints)?;
            debug!(iteration, cases = cases.len(), "iteration started");

            let mut case_index = 0usize;
            while cases.remaining() > 0 {
                let Some(pass) = self.control_gate(stats)? else {
                    info!(iteration, case_index, "stop requested");
                    stats.interrupted = true;
                    return Ok(());
                };
                // Drawn after the control case passes, so it carries the next
                // sequence number in transmit order.
                let Some(test_case) = cases.next_case(&mut *self.generator) else {
                    break;
                };
                let test_case = test_case?;

                let mut result = TestResult::new(case_index, iteration);
                result.resets = pass.resets;
                if self.config.mode == AlternatorMode::RxFrame {
                    result
                        .raw
                        .insert(RAW_CONTROL_CASE.to_string(), pass.control.to_hex());
                    result
                        .raw
                        .insert(RAW_TEST_CASE.to_string(), test_case.to_hex());
                }
                result.verdict = self.throw_test_case(&test_case, case_index)?;
                info!(
                    iteration,
                    case_index,
                    verdict = %result.verdict,
                    case = %test_case.to_hex(),
                    "test verdict"
                );
                results.record(result);
                case_index += 1;
            }
        }
        Ok(())
    }

    /// Sends control cases until one is observed.
    ///
    /// Returns `None` if the stop flag is raised first.
    fn control_gate(&mut self, stats: &mut RunStats) -> Result<Option<ControlPass>> {
        let mut attempts = 0u32;
        let mut resets = 0u32;
        loop {
            if self.stopped() {
                return Ok(None);
            }

            let control = self.generator.control_case()?;
            attempts += 1;
            stats.control_attempts += 1;
            self.harness.set_expected(&control);
            let sent = self.link.transmit(control.as_bytes())?;
            self.settle();
            if sent && self.harness.is_valid()? == Verdict::Valid {
                return Ok(Some(ControlPass { control, resets }));
            }

            stats.control_misses += 1;
            warn!(attempt = attempts, sent, sequence = %control.sequence(), "control case not observed");
            if let Some(max) = self.config.max_control_attempts
                && attempts >= max
            {
                return Err(RunError::ControlGateExhausted { attempts });
            }

            if self.harness.supports_reset() {
                resets += 1;
                stats.resets_attempted += 1;
                warn!(harness = self.harness.name(), "resetting target");
                if self.harness.reset()? {
                    stats.resets_succeeded += 1;
                    info!("reset succeeded");
                } else {
                    warn!("reset failed, retrying control case anyway");
                }
            } else if attempts % self.config.warn_every.max(1) == 0 {
                warn!(
                    attempts,
                    harness = self.harness.name(),
                    "harness cannot reset; still retrying control case, check the target"
                );
            }
        }
    }

    fn throw_test_case(&mut self, test_case: &Case, case_index: usize) -> Result<Verdict> {
        self.harness.set_expected(test_case);
        if !self.link.transmit(test_case.as_bytes())? {
            return Err(RunError::TransmitRejected { case_index });
        }
        self.settle();
        Ok(self.harness.is_valid()?)
    }

    fn settle(&self) {
        if self.config.mode == AlternatorMode::RxFrame && !self.config.settle.is_zero() {
            thread::sleep(self.config.settle);
        }
    }
}
