//! Coreference metric score types
//!
//! The external scorer reports a small fixed family of metrics, each as
//! recall/precision/F1 fractions in [0,1]. `ScoreSet` is the parsed
//! result of one scoring run; an empty set signals a parse failure and
//! is never the same thing as a legitimate all-zero score.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Metric families reported by the scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Mention identification (MUC-like)
    Muc,
    /// Coreference links (B³-like)
    Bcub,
    /// Non-coreference links (CEAF-m slot)
    Ceafm,
    /// CEAF-e placeholder; stored but excluded from the leaderboard average
    Ceafe,
    /// BLANC
    Blanc,
    /// Generic key used by the fallback heuristic when no labeled
    /// pattern matched anywhere in the scorer output
    Overall,
}

impl Metric {
    /// Stable string key used in JSON payloads and database columns
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Muc => "muc",
            Metric::Bcub => "bcub",
            Metric::Ceafm => "ceafm",
            Metric::Ceafe => "ceafe",
            Metric::Blanc => "blanc",
            Metric::Overall => "overall",
        }
    }
}

/// One metric's recall/precision/F1 triple
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricScores {
    pub recall: f64,
    pub precision: f64,
    pub f1: f64,
}

/// Parsed scores of one scoring run, keyed by metric.
///
/// Insertion-ordered; a metric can only be inserted once, so the first
/// successful parse for a label wins and later duplicate-labeled lines
/// never overwrite it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSet {
    entries: Vec<(Metric, MetricScores)>,
}

impl ScoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no metric was parsed; callers treat this as a failure
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.entries.iter().any(|(m, _)| *m == metric)
    }

    /// Insert unless the metric is already present. Returns whether the
    /// entry was added.
    pub fn insert_if_absent(&mut self, metric: Metric, scores: MetricScores) -> bool {
        if self.contains(metric) {
            return false;
        }
        self.entries.push((metric, scores));
        true
    }

    pub fn get(&self, metric: Metric) -> Option<MetricScores> {
        self.entries
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Metric, MetricScores)> {
        self.entries.iter()
    }

    /// F1 of `metric`, if present
    pub fn f1(&self, metric: Metric) -> Option<f64> {
        self.get(metric).map(|s| s.f1)
    }
}

impl Serialize for ScoreSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (metric, scores) in &self.entries {
            map.serialize_entry(metric.key(), scores)?;
        }
        map.end()
    }
}

/// Leaderboard average F1 over the MUC, B³, CEAF-m and BLANC families.
///
/// Missing values count as zero and the divisor stays fixed at 4, so
/// both the SQL and the in-memory leaderboard paths order identically.
/// CEAF-e is excluded from the average.
pub fn average_f1(
    muc_f1: Option<f64>,
    bcub_f1: Option<f64>,
    ceafm_f1: Option<f64>,
    blanc_f1: Option<f64>,
) -> f64 {
    (muc_f1.unwrap_or(0.0)
        + bcub_f1.unwrap_or(0.0)
        + ceafm_f1.unwrap_or(0.0)
        + blanc_f1.unwrap_or(0.0))
        / 4.0
}
