//! Scorer output parsing
//!
//! The external scorer prints human-readable multi-line text. Each
//! metric arrives on its own labeled line, e.g.
//!
//! ```text
//! Identification of Mentions: Recall: (291 / 291) 100%  Precision: (291 / 291) 100%  F1: 100%
//! ```
//!
//! Lines are scanned in order against a fixed set of labeled patterns;
//! the first successful parse for a label wins and later duplicates are
//! ignored. When no labeled pattern matches anywhere, a generic
//! percentage heuristic salvages an "overall" triple from the first
//! qualifying line. An empty result signals a parse failure and must be
//! treated by callers as an error, never as an all-zero score.

use corefboard_common::metrics::{Metric, MetricScores, ScoreSet};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RECALL_PCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Recall:\s*\([^)]+\)\s*([\d.]+)%").unwrap());
static PRECISION_PCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Precision:\s*\([^)]+\)\s*([\d.]+)%").unwrap());
static F1_PCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"F1:\s*([\d.]+)%").unwrap());

static STANDARD_MUC_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)MUC.*?Recall:.*?Precision:.*?F1:").unwrap());
static RECALL_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Recall:\s*([\d.]+)").unwrap());
static PRECISION_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Precision:\s*([\d.]+)").unwrap());
static F1_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"F1:\s*([\d.]+)").unwrap());

static PERCENT_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([\d.]+)%").unwrap());

/// Parse the raw text output of a scoring run into a `ScoreSet`.
///
/// Returns an empty set when the output is blank or nothing matched.
pub fn parse_scorer_output(output: &str) -> ScoreSet {
    let mut scores = ScoreSet::new();

    if output.trim().is_empty() {
        return scores;
    }

    for raw_line in output.lines() {
        let line = raw_line.trim();

        if line.contains("Identification of Mentions:") {
            if let Some(parsed) = parse_labeled_line(line) {
                if scores.insert_if_absent(Metric::Muc, parsed) {
                    debug!(?parsed, "parsed mention identification (MUC) line");
                }
            }
        } else if line.contains("Coreference links:") {
            if let Some(parsed) = parse_labeled_line(line) {
                if scores.insert_if_absent(Metric::Bcub, parsed) {
                    debug!(?parsed, "parsed coreference links (B3) line");
                }
            }
        } else if line.contains("Non-coreference links:") {
            if let Some(parsed) = parse_labeled_line(line) {
                if scores.insert_if_absent(Metric::Ceafm, parsed) {
                    debug!(?parsed, "parsed non-coreference links (CEAF-m) line");
                }
            }
        } else if line.contains("BLANC:") {
            if let Some(parsed) = parse_labeled_line(line) {
                if scores.insert_if_absent(Metric::Blanc, parsed) {
                    debug!(?parsed, "parsed BLANC line");
                }
            }
        } else if STANDARD_MUC_LINE.is_match(line) {
            // Standard-format values are stored exactly as printed,
            // without the /100 normalization the labeled patterns apply.
            if let Some(parsed) = parse_standard_line(line) {
                if scores.insert_if_absent(Metric::Muc, parsed) {
                    debug!(?parsed, "parsed standard-format MUC line");
                }
            }
        }
    }

    if scores.is_empty() {
        if let Some(parsed) = fallback_overall(output) {
            debug!(?parsed, "no labeled metric matched; using percentage heuristic");
            scores.insert_if_absent(Metric::Overall, parsed);
        }
    }

    scores
}

/// Parse a "Label: Recall: (a/b) X%  Precision: (c/d) Y%  F1: Z%" line.
/// Percentages are normalized to fractions in [0,1].
fn parse_labeled_line(line: &str) -> Option<MetricScores> {
    let recall = capture_f64(&RECALL_PCT, line)?;
    let precision = capture_f64(&PRECISION_PCT, line)?;
    let f1 = capture_f64(&F1_PCT, line)?;

    Some(MetricScores {
        recall: recall / 100.0,
        precision: precision / 100.0,
        f1: f1 / 100.0,
    })
}

/// Parse a bare "Recall: X ... Precision: Y ... F1: Z" line, unnormalized
fn parse_standard_line(line: &str) -> Option<MetricScores> {
    let recall = capture_f64(&RECALL_BARE, line)?;
    let precision = capture_f64(&PRECISION_BARE, line)?;
    let f1 = capture_f64(&F1_BARE, line)?;

    Some(MetricScores {
        recall,
        precision,
        f1,
    })
}

/// Last-resort heuristic: the first line mentioning Recall or Precision
/// together with a percent sign, carrying at least three percentages,
/// read positionally as recall/precision/F1. A line whose tokens fail
/// to parse is abandoned whole and the scan moves to the next line.
fn fallback_overall(output: &str) -> Option<MetricScores> {
    for raw_line in output.lines() {
        let line = raw_line.trim();
        if !line.contains('%') || !(line.contains("Recall") || line.contains("Precision")) {
            continue;
        }

        let tokens: Vec<&str> = PERCENT_VALUE
            .captures_iter(line)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();
        if tokens.len() < 3 {
            continue;
        }

        // A malformed token (e.g. "1.2.3%") invalidates the whole line;
        // positions must never shift
        let parsed: std::result::Result<Vec<f64>, _> =
            tokens[..3].iter().map(|t| t.parse::<f64>()).collect();
        if let Ok(values) = parsed {
            return Some(MetricScores {
                recall: values[0] / 100.0,
                precision: values[1] / 100.0,
                f1: values[2] / 100.0,
            });
        }
    }

    None
}

fn capture_f64(re: &Regex, line: &str) -> Option<f64> {
    re.captures(line)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_OUTPUT: &str = "\
====== TOTALS =======
Identification of Mentions: Recall: (291 / 291) 100%\tPrecision: (291 / 291) 100%\tF1: 100%
--------------------------------------------------------------------------
Coreference links: Recall: (602 / 602) 90.5%\tPrecision: (602 / 665) 85%\tF1: 87.66%
Non-coreference links: Recall: (3200 / 3200) 72.25%\tPrecision: (3200 / 3300) 70%\tF1: 71.1%
BLANC: Recall: (1 / 1) 60%\tPrecision: (1 / 2) 50%\tF1: 54.55%
";

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parses_all_labeled_metrics() {
        let scores = parse_scorer_output(FULL_OUTPUT);
        assert_eq!(scores.len(), 4);

        let muc = scores.get(Metric::Muc).unwrap();
        assert!(approx(muc.recall, 1.0));
        assert!(approx(muc.precision, 1.0));
        assert!(approx(muc.f1, 1.0));

        let bcub = scores.get(Metric::Bcub).unwrap();
        assert!(approx(bcub.recall, 0.905));
        assert!(approx(bcub.precision, 0.85));
        assert!(approx(bcub.f1, 0.8766));

        let ceafm = scores.get(Metric::Ceafm).unwrap();
        assert!(approx(ceafm.recall, 0.7225));

        let blanc = scores.get(Metric::Blanc).unwrap();
        assert!(approx(blanc.f1, 0.5455));
    }

    #[test]
    fn test_percentages_normalized_to_fractions() {
        let line = "Identification of Mentions: Recall: (10 / 20) 50%  Precision: (10 / 40) 25%  F1: 33.33%";
        let scores = parse_scorer_output(line);

        let muc = scores.get(Metric::Muc).unwrap();
        assert!(approx(muc.recall, 0.5));
        assert!(approx(muc.precision, 0.25));
        assert!(approx(muc.f1, 0.3333));
    }

    #[test]
    fn test_duplicate_label_does_not_overwrite() {
        let output = "\
Identification of Mentions: Recall: (5 / 10) 50%  Precision: (5 / 10) 50%  F1: 50%
Identification of Mentions: Recall: (9 / 10) 90%  Precision: (9 / 10) 90%  F1: 90%
";
        let scores = parse_scorer_output(output);
        assert_eq!(scores.len(), 1);
        assert!(approx(scores.get(Metric::Muc).unwrap().f1, 0.5));
    }

    #[test]
    fn test_standard_format_kept_unnormalized() {
        let output = "MUC scores -- Recall: 61.2 Precision: 58.9 F1: 60.03";
        let scores = parse_scorer_output(output);

        let muc = scores.get(Metric::Muc).unwrap();
        assert!(approx(muc.recall, 61.2));
        assert!(approx(muc.precision, 58.9));
        assert!(approx(muc.f1, 60.03));
    }

    #[test]
    fn test_labeled_line_beats_standard_format() {
        let output = "\
Identification of Mentions: Recall: (5 / 10) 50%  Precision: (5 / 10) 50%  F1: 50%
MUC scores -- Recall: 61.2 Precision: 58.9 F1: 60.03
";
        let scores = parse_scorer_output(output);
        assert!(approx(scores.get(Metric::Muc).unwrap().f1, 0.5));
    }

    #[test]
    fn test_empty_output_yields_empty_set() {
        assert!(parse_scorer_output("").is_empty());
        assert!(parse_scorer_output("   \n\t\n").is_empty());
    }

    #[test]
    fn test_unparseable_output_yields_empty_set() {
        let scores = parse_scorer_output("version 8.01\nreading gold file...\ndone.\n");
        assert!(scores.is_empty());
    }

    #[test]
    fn test_fallback_heuristic_first_qualifying_line() {
        let output = "\
scoring complete
totals -- Recall 81.5% / Precision 77.25% / F-score 79.3%
totals -- Recall 10% / Precision 10% / F-score 10%
";
        let scores = parse_scorer_output(output);
        assert_eq!(scores.len(), 1);

        let overall = scores.get(Metric::Overall).unwrap();
        assert!(approx(overall.recall, 0.815));
        assert!(approx(overall.precision, 0.7725));
        assert!(approx(overall.f1, 0.793));
    }

    #[test]
    fn test_fallback_malformed_token_abandons_line() {
        // "1.2.3" is captured by the percent pattern but is not a number;
        // the heuristic must move to the next line rather than slide the
        // remaining values into earlier positions
        let output = "\
totals -- Recall 1.2.3% / Precision 77.25% / F-score 79.3% / extra 11.1%
totals -- Recall 81.5% / Precision 77.25% / F-score 79.3%
";
        let scores = parse_scorer_output(output);
        assert_eq!(scores.len(), 1);

        let overall = scores.get(Metric::Overall).unwrap();
        assert!(approx(overall.recall, 0.815));
        assert!(approx(overall.precision, 0.7725));
        assert!(approx(overall.f1, 0.793));
    }

    #[test]
    fn test_fallback_all_lines_malformed_yields_empty() {
        let output = "totals -- Recall 1.2.3% / Precision 4.5.6% / F-score 7.8.9%\n";
        assert!(parse_scorer_output(output).is_empty());
    }

    #[test]
    fn test_fallback_requires_three_percentages() {
        let output = "totals -- Recall 81.5% / Precision 77.25%\n";
        assert!(parse_scorer_output(output).is_empty());
    }

    #[test]
    fn test_fallback_not_used_when_labeled_metric_present() {
        let output = "\
BLANC: Recall: (1 / 1) 60%  Precision: (1 / 2) 50%  F1: 54.55%
totals -- Recall 81.5% / Precision 77.25% / F-score 79.3%
";
        let scores = parse_scorer_output(output);
        assert!(scores.contains(Metric::Blanc));
        assert!(!scores.contains(Metric::Overall));
    }

    #[test]
    fn test_malformed_labeled_line_ignored() {
        // Missing the precision group entirely
        let output = "Identification of Mentions: Recall: (291 / 291) 100%\n";
        assert!(parse_scorer_output(output).is_empty());
    }
}
