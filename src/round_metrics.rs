use crate::dataset::{MatchRecord, Round};
use crate::score_parse;

/// Summary indicators for one group of matches. NaN is the undefined
/// sentinel: an empty group has count 0 and NaN averages, never zeros.
#[derive(Debug, Clone, Copy)]
pub struct RoundIndicators {
    pub matches: usize,
    pub avg_sets: f64,
    pub avg_diff_games: f64,
    pub avg_tot_games: f64,
    /// Mean winner rank over matches where the rank is present.
    pub avg_rank: f64,
    /// Fraction of matches won by the better-ranked player, over matches
    /// where both ranks are present.
    pub fave_ratio: f64,
}

impl RoundIndicators {
    pub fn empty() -> Self {
        Self {
            matches: 0,
            avg_sets: f64::NAN,
            avg_diff_games: f64::NAN,
            avg_tot_games: f64::NAN,
            avg_rank: f64::NAN,
            fave_ratio: f64::NAN,
        }
    }
}

/// Indicators for each target round, in canonical order R16 -> QF -> SF -> F.
#[derive(Debug, Clone, Copy)]
pub struct RoundBreakdown {
    rounds: [RoundIndicators; 4],
}

impl RoundBreakdown {
    pub fn new(rounds: [RoundIndicators; 4]) -> Self {
        Self { rounds }
    }

    pub fn get(&self, round: Round) -> &RoundIndicators {
        &self.rounds[round.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Round, &RoundIndicators)> {
        Round::ALL.iter().map(|round| (*round, self.get(*round)))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TournamentMetrics {
    pub overall: RoundIndicators,
    pub by_round: RoundBreakdown,
}

/// Base indicators for one group of matches (a tournament, or one round of
/// one tournament).
pub fn compute_indicators(matches: &[&MatchRecord]) -> RoundIndicators {
    if matches.is_empty() {
        return RoundIndicators::empty();
    }

    let mut sets_sum = 0.0;
    let mut sets_n = 0usize;
    let mut diff_sum = 0.0;
    let mut tot_sum = 0.0;
    let mut rank_sum = 0.0;
    let mut rank_n = 0usize;
    let mut fave_wins = 0usize;
    let mut ranked_pairs = 0usize;

    for m in matches {
        let score = m.score.as_deref();
        // Missing score: difference/total contribute explicit zeros, while
        // the sets count is unknown and stays out of the avg_sets mean.
        if let Some(sets) = score_parse::sets_count(score) {
            sets_sum += f64::from(sets);
            sets_n += 1;
        }
        let breakdown = score_parse::parse_score(score);
        diff_sum += f64::from(breakdown.games_diff);
        tot_sum += f64::from(breakdown.games_total);

        if let Some(rank) = m.winner_rank {
            rank_sum += rank;
            rank_n += 1;
        }
        if let (Some(winner), Some(loser)) = (m.winner_rank, m.loser_rank) {
            ranked_pairs += 1;
            if winner < loser {
                fave_wins += 1;
            }
        }
    }

    let n = matches.len() as f64;
    RoundIndicators {
        matches: matches.len(),
        avg_sets: mean_or_nan(sets_sum, sets_n),
        avg_diff_games: diff_sum / n,
        avg_tot_games: tot_sum / n,
        avg_rank: mean_or_nan(rank_sum, rank_n),
        fave_ratio: mean_or_nan(fave_wins as f64, ranked_pairs),
    }
}

/// Overall indicators plus the four-round breakdown for one tournament's
/// matches. Rounds outside the target four are aggregated into `overall`
/// only.
pub fn tournament_metrics(matches: &[&MatchRecord]) -> TournamentMetrics {
    let overall = compute_indicators(matches);
    let rounds = Round::ALL.map(|round| {
        let subset: Vec<&MatchRecord> = matches
            .iter()
            .copied()
            .filter(|m| m.round == Some(round))
            .collect();
        compute_indicators(&subset)
    });
    TournamentMetrics {
        overall,
        by_round: RoundBreakdown::new(rounds),
    }
}

/// Mean of the values that are not NaN; NaN when none are.
pub fn nan_mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        if !v.is_nan() {
            sum += v;
            n += 1;
        }
    }
    mean_or_nan(sum, n)
}

fn mean_or_nan(sum: f64, n: usize) -> f64 {
    if n == 0 { f64::NAN } else { sum / n as f64 }
}
