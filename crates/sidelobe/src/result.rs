//! Test results and the result set handed back at the end of a run.
//!
//! JSON shape:
//!
//! ```text
//! {
//!   "interface": { "name", "driver", "running", "channel", "freq_hz", "tx_gain" },
//!   "harness": { "name", "supports_reset" },
//!   "generator": { "name", "includes_phy", "includes_mac" },
//!   "start_time": "...", "end_time": "...",
//!   "results": { "0": [ { "case", "iteration", "valid", "resets", "raw" }, ... ] },
//!   "stats": { ... }
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sidelobe_io::InterfaceStatus;
use sidelobe_types::Verdict;

/// Raw-map key for the hex of the last control case sent.
pub const RAW_CONTROL_CASE: &str = "control_case";
/// Raw-map key for the hex of the test case sent.
pub const RAW_TEST_CASE: &str = "test_case";

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    #[serde(rename = "case")]
    pub case_index: usize,
    #[serde(default)]
    pub iteration: u32,
    #[serde(rename = "valid")]
    pub verdict: Verdict,
    /// Resets performed to re-establish the control case before this one.
    #[serde(default)]
    pub resets: u32,
    #[serde(default)]
    pub raw: BTreeMap<String, String>,
}

impl TestResult {
    pub fn new(case_index: usize, iteration: u32) -> Self {
        Self {
            case_index,
            iteration,
            verdict: Verdict::Unknown,
            resets: 0,
            raw: BTreeMap::new(),
        }
    }

    pub fn test_case_hex(&self) -> Option<&str> {
        self.raw.get(RAW_TEST_CASE).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessInfo {
    pub name: String,
    #[serde(default)]
    pub supports_reset: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorInfo {
    pub name: String,
    pub includes_phy: bool,
    pub includes_mac: bool,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStats {
    pub control_attempts: u64,
    pub control_misses: u64,
    pub resets_attempted: u64,
    pub resets_succeeded: u64,
    pub evidence_dropped: u64,
    /// The run was stopped before every iteration completed.
    pub interrupted: bool,
}

/// Everything recorded during one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub interface: InterfaceStatus,
    pub harness: HarnessInfo,
    pub generator: GeneratorInfo,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub results: BTreeMap<usize, Vec<TestResult>>,
    #[serde(default)]
    pub stats: RunStats,
}

impl ResultSet {
    /// Starts a result set timestamped now.
    pub fn start(interface: InterfaceStatus, harness: HarnessInfo, generator: GeneratorInfo) -> Self {
        Self {
            interface,
            harness,
            generator,
            start_time: Utc::now(),
            end_time: None,
            results: BTreeMap::new(),
            stats: RunStats::default(),
        }
    }

    /// Appends a result under its case index.
    pub fn record(&mut self, result: TestResult) {
        self.results.entry(result.case_index).or_default().push(result);
    }

    pub fn finalize(&mut self, stats: RunStats) {
        self.stats = stats;
        self.end_time = Some(Utc::now());
    }

    pub fn is_finalized(&self) -> bool {
        self.end_time.is_some()
    }

    /// Results recorded for `case_index`, oldest first.
    pub fn get(&self, case_index: usize) -> &[TestResult] {
        self.results
            .get(&case_index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every result in recording order within each case index.
    pub fn iter(&self) -> impl Iterator<Item = &TestResult> {
        self.results.values().flatten()
    }

    /// Total number of results.
    pub fn len(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_set() -> ResultSet {
        ResultSet::start(
            InterfaceStatus {
                name: "loopback".to_string(),
                driver: "in-memory echo".to_string(),
                running: true,
                channel: None,
                freq_hz: None,
                tx_gain: None,
            },
            HarnessInfo {
                name: "received-frame".to_string(),
                supports_reset: true,
            },
            GeneratorInfo {
                name: "preamble-fill".to_string(),
                includes_phy: true,
                includes_mac: true,
            },
        )
    }

    fn result(case_index: usize, iteration: u32, verdict: Verdict) -> TestResult {
        TestResult {
            verdict,
            ..TestResult::new(case_index, iteration)
        }
    }

    #[test]
    fn results_accumulate_per_case() {
        let mut set = empty_set();
        set.record(result(0, 0, Verdict::Valid));
        set.record(result(1, 0, Verdict::Invalid));
        set.record(result(0, 1, Verdict::Invalid));
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(0).len(), 2);
        assert_eq!(set.get(0)[1].iteration, 1);
        assert!(set.get(7).is_empty());
    }

    #[test]
    fn finalize_stamps_end_time() {
        let mut set = empty_set();
        assert!(!set.is_finalized());
        set.finalize(RunStats {
            resets_attempted: 2,
            ..RunStats::default()
        });
        assert!(set.is_finalized());
        assert!(set.end_time.unwrap() >= set.start_time);
        assert_eq!(set.stats.resets_attempted, 2);
    }

    #[test]
    fn json_uses_record_field_names() {
        let mut set = empty_set();
        let mut r = result(3, 0, Verdict::Valid);
        r.raw.insert(RAW_TEST_CASE.to_string(), "beef".to_string());
        set.record(r);
        set.finalize(RunStats::default());

        let json: serde_json::Value = serde_json::from_str(&set.to_json_pretty().unwrap()).unwrap();
        let first = &json["results"]["3"][0];
        assert_eq!(first["case"], 3);
        assert_eq!(first["valid"], true);
        assert_eq!(first["raw"]["test_case"], "beef");
        assert_eq!(json["generator"]["includes_phy"], true);

        let back = ResultSet::from_json(&set.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn unknown_verdict_is_null() {
        let json = serde_json::to_value(result(0, 0, Verdict::Unknown)).unwrap();
        assert!(json["valid"].is_null());
    }
}
