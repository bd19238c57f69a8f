pub mod calculator;
mod service;

pub use calculator::{JellyBeanScorer, JELLY_BEANS_REFERENCE_COUNT};
pub use service::{PlayerRoundScore, ScoringHandler, ScoringService, StageScoring};
