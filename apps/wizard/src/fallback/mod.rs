//! Local Fallback Simulators: deterministic stand-ins used when the gateway is unavailable.
//!
//! Each simulator sleeps for the configured delay before resolving so loading states
//! stay observable. Keyword extraction has no simulator: no keywords is a valid outcome.
//! Download has none either: a PDF can only come from the gateway.

pub mod match_analysis;
pub mod resume_generation;

pub use match_analysis::simulate_match_analysis;
pub use resume_generation::simulate_resume_generation;
