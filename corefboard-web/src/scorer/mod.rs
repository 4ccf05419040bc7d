//! External scorer integration: process invocation and output parsing

mod parse;
mod runner;

pub use parse::parse_scorer_output;
pub use runner::{
    check_missing_perl_modules, check_perl_available, Scorer, ScorerError, REQUIRED_PERL_MODULES,
    SCORER_TIMEOUT,
};
