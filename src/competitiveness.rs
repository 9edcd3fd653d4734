use crate::dataset::TourneyLevel;
use crate::round_metrics::{RoundBreakdown, nan_mean};

/// Maximum games realistically reachable in a single set under the scoring
/// format in scope (7-6 via tiebreak). Fixed domain constant.
const MAX_GAMES_PER_SET: f64 = 13.0;

#[derive(Debug, Clone, Copy)]
pub struct CompetitivenessScore {
    /// Games played relative to the level-dependent maximum, averaged over
    /// the four target rounds.
    pub match_tightness: f64,
    /// 1 minus the normalized average game spread; 1.0 means every set went
    /// to the wire.
    pub match_balance: f64,
}

pub fn max_possible_games(level: TourneyLevel) -> f64 {
    MAX_GAMES_PER_SET * f64::from(level.best_of())
}

pub fn compute_competitiveness(
    by_round: &RoundBreakdown,
    level: TourneyLevel,
) -> CompetitivenessScore {
    let max_games = max_possible_games(level);

    let match_tightness = nan_mean(by_round.iter().map(|(_, r)| r.avg_tot_games / max_games));

    // A round where every match was a walkover has avg_tot_games == 0; its
    // 0/0 term is NaN and falls out of the mean rather than dividing by zero.
    let match_balance = 1.0
        - nan_mean(
            by_round
                .iter()
                .map(|(_, r)| r.avg_diff_games / r.avg_tot_games),
        );

    CompetitivenessScore {
        match_tightness,
        match_balance,
    }
}
