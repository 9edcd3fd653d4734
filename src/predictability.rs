use crate::dataset::Round;
use crate::round_metrics::{RoundBreakdown, nan_mean};

/// How strongly match outcomes tracked player rankings across the four
/// target rounds.
#[derive(Debug, Clone, Copy)]
pub struct PredictabilityScore {
    /// Mean of the four rounds' average winner rank, skipping rounds with
    /// no data.
    pub avg_winner_rank: f64,
    /// Relative change in average winner rank from Round-of-16 to Final.
    /// Positive: finalists ranked worse than Round-of-16 winners.
    pub rank_drop: f64,
    pub avg_fave_ratio: f64,
}

pub fn compute_predictability(by_round: &RoundBreakdown) -> PredictabilityScore {
    let avg_winner_rank = nan_mean(by_round.iter().map(|(_, r)| r.avg_rank));
    let avg_fave_ratio = nan_mean(by_round.iter().map(|(_, r)| r.fave_ratio));

    let r16 = by_round.get(Round::RoundOf16).avg_rank;
    let last = by_round.get(Round::Final).avg_rank;
    let rank_drop = if r16.is_nan() || r16 == 0.0 {
        f64::NAN
    } else {
        (last - r16) / r16
    };

    PredictabilityScore {
        avg_winner_rank,
        rank_drop,
        avg_fave_ratio,
    }
}
