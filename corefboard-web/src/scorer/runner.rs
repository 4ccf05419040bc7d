//! External scorer invocation
//!
//! The scorer is a Perl program (`scorer.pl` plus its companion
//! `CorScorer.pm`) living under the scorer directory of the data root.
//! Environment problems (missing script, missing perl, missing Perl
//! modules) are configuration failures reported with installation
//! guidance; they are never degraded into demo scores.

use super::parse::parse_scorer_output;
use corefboard_common::metrics::ScoreSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

/// Upper bound on one scoring run; exceeding it is a failure, not a
/// partial result
pub const SCORER_TIMEOUT: Duration = Duration::from_secs(120);

/// Perl modules the scorer requires at runtime
pub const REQUIRED_PERL_MODULES: [&str; 2] = ["Math::Combinatorics", "Algorithm::Munkres"];

/// Scorer invocation errors
#[derive(Debug, Error)]
pub enum ScorerError {
    /// scorer.pl is not installed under the scorer directory
    #[error("Scorer script not found at {}. Upload scorer.pl through the admin panel.", .0.display())]
    ScriptMissing(PathBuf),

    /// CorScorer.pm is not installed next to scorer.pl
    #[error("CorScorer.pm module not found in the scorer directory. Upload the complete CorScorer package.")]
    CompanionModuleMissing(PathBuf),

    /// The perl binary is absent from the system
    #[error("Perl not installed. Install Perl and restart the server.")]
    PerlNotFound,

    /// Required Perl modules are missing
    #[error("Missing required Perl modules: {}. Install each with `cpan install <module>`.", .0.join(", "))]
    PerlModulesMissing(Vec<String>),

    /// Gold dataset file vanished from disk
    #[error("Gold dataset file not found: {}", .0.display())]
    GoldFileMissing(PathBuf),

    /// Uploaded prediction file vanished from disk
    #[error("System file not found: {}", .0.display())]
    SystemFileMissing(PathBuf),

    /// Run exceeded SCORER_TIMEOUT
    #[error("Scorer execution timeout (>120 seconds)")]
    Timeout,

    /// Non-zero exit from the scorer
    #[error("Scorer failed: {0}")]
    Failed(String),

    /// Output produced but nothing could be parsed from it
    #[error("Could not parse scorer output. Raw output: {0}")]
    Unparseable(String),

    /// Failed to spawn or talk to the child process
    #[error("Failed to execute scorer: {0}")]
    Io(#[from] std::io::Error),
}

impl ScorerError {
    /// True for environment/installation problems, as opposed to
    /// failures of a particular scoring run
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScorerError::ScriptMissing(_)
                | ScorerError::CompanionModuleMissing(_)
                | ScorerError::PerlNotFound
                | ScorerError::PerlModulesMissing(_)
        )
    }
}

/// Check whether the perl binary responds at all
pub async fn check_perl_available() -> bool {
    let probe = timeout(
        Duration::from_secs(5),
        Command::new("perl").arg("-v").output(),
    )
    .await;
    matches!(probe, Ok(Ok(output)) if output.status.success())
}

/// Return the required Perl modules that fail to load
pub async fn check_missing_perl_modules() -> Vec<String> {
    let mut missing = Vec::new();

    for module in REQUIRED_PERL_MODULES {
        let program = format!("use {}; print \"OK\";", module);
        let probe = timeout(
            Duration::from_secs(10),
            Command::new("perl").arg("-e").arg(&program).output(),
        )
        .await;

        let loaded = matches!(probe, Ok(Ok(ref output)) if output.status.success());
        if !loaded {
            missing.push(module.to_string());
        }
    }

    missing
}

/// Handle on the scorer installation directory
#[derive(Debug, Clone)]
pub struct Scorer {
    scorer_dir: PathBuf,
}

impl Scorer {
    pub fn new(scorer_dir: PathBuf) -> Self {
        Self { scorer_dir }
    }

    /// Score `system_path` against `gold_path` and parse the result.
    ///
    /// Runs `perl -I <dir> scorer.pl all <gold> <system>` with the
    /// scorer directory as working directory and on PERL5LIB.
    pub async fn score(
        &self,
        gold_path: &Path,
        system_path: &Path,
    ) -> Result<ScoreSet, ScorerError> {
        let script = self.scorer_dir.join("scorer.pl");
        if !script.exists() {
            return Err(ScorerError::ScriptMissing(script));
        }

        if !check_perl_available().await {
            return Err(ScorerError::PerlNotFound);
        }

        let companion = self.scorer_dir.join("CorScorer.pm");
        if !companion.exists() {
            return Err(ScorerError::CompanionModuleMissing(companion));
        }

        let missing = check_missing_perl_modules().await;
        if !missing.is_empty() {
            return Err(ScorerError::PerlModulesMissing(missing));
        }

        // Absolute paths; the child runs with a different cwd
        let gold = gold_path
            .canonicalize()
            .map_err(|_| ScorerError::GoldFileMissing(gold_path.to_path_buf()))?;
        let system = system_path
            .canonicalize()
            .map_err(|_| ScorerError::SystemFileMissing(system_path.to_path_buf()))?;

        let perl5lib = match std::env::var_os("PERL5LIB") {
            Some(existing) => {
                let mut paths = vec![self.scorer_dir.clone()];
                paths.extend(std::env::split_paths(&existing));
                std::env::join_paths(paths)
                    .map_err(|e| ScorerError::Failed(format!("Bad PERL5LIB: {}", e)))?
            }
            None => self.scorer_dir.clone().into_os_string(),
        };

        info!(
            "Executing scorer: perl -I {} {} all {} {}",
            self.scorer_dir.display(),
            script.display(),
            gold.display(),
            system.display()
        );

        let mut command = Command::new("perl");
        command
            .arg("-I")
            .arg(&self.scorer_dir)
            .arg(&script)
            .arg("all")
            .arg(&gold)
            .arg(&system)
            .current_dir(&self.scorer_dir)
            .env("PERL5LIB", &perl5lib)
            .kill_on_drop(true);

        let output = match timeout(SCORER_TIMEOUT, command.output()).await {
            Ok(result) => result?,
            Err(_) => return Err(ScorerError::Timeout),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("scorer stdout:\n{}", stdout);
        if !stderr.is_empty() {
            debug!("scorer stderr:\n{}", stderr);
        }

        if !output.status.success() {
            return Err(classify_failure(output.status.code(), &stderr));
        }

        let scores = parse_scorer_output(&stdout);
        if scores.is_empty() {
            return Err(ScorerError::Unparseable(stdout));
        }

        info!("Parsed {} metric(s) from scorer output", scores.len());
        Ok(scores)
    }
}

/// Map a non-zero exit to the most specific error the stderr admits
fn classify_failure(code: Option<i32>, stderr: &str) -> ScorerError {
    if stderr.contains("Can't locate Math/Combinatorics.pm") {
        return ScorerError::PerlModulesMissing(vec!["Math::Combinatorics".to_string()]);
    }
    if stderr.contains("Can't locate Algorithm/Munkres.pm") {
        return ScorerError::PerlModulesMissing(vec!["Algorithm::Munkres".to_string()]);
    }

    let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
    if stderr.contains("Can't locate") {
        ScorerError::Failed(format!(
            "exit code {}. Missing Perl modules; install the required dependencies.",
            code
        ))
    } else if stderr.trim().is_empty() {
        ScorerError::Failed(format!("exit code {}", code))
    } else {
        ScorerError::Failed(format!("exit code {}: {}", code, stderr.trim()))
    }
}
