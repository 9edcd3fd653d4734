/// Match-ending markers where full set-by-set play did not occur. Any of
/// these anywhere in the string forces the difference/total to zero.
const VOID_MARKERS: [&str; 3] = ["W/O", "RET", "DEF"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    /// Sum over accepted set tokens of (winner games - loser games).
    pub games_diff: i32,
    /// Sum over accepted set tokens of (winner games + loser games).
    pub games_total: u32,
    pub tokens_accepted: usize,
    pub tokens_skipped: usize,
}

/// Game difference and total games for one match. A missing score or a
/// walkover/retirement/default marker yields explicit zeros, never NaN:
/// "no games played" is a real value, distinct from "no data".
pub fn parse_score(score: Option<&str>) -> ScoreBreakdown {
    let Some(raw) = score else {
        return ScoreBreakdown::default();
    };
    if VOID_MARKERS.iter().any(|marker| raw.contains(marker)) {
        return ScoreBreakdown::default();
    }

    let mut out = ScoreBreakdown::default();
    for token in raw.split_whitespace() {
        match parse_set_token(token) {
            Some((won, lost)) => {
                out.games_diff += won as i32 - lost as i32;
                out.games_total += won + lost;
                out.tokens_accepted += 1;
            }
            None => out.tokens_skipped += 1,
        }
    }
    out
}

/// Winner's games across the match: the first operand of every accepted set
/// token (score strings list the match winner's games first in each set).
///
/// Deliberately does NOT apply the walkover/retirement zero-policy of
/// [`parse_score`]: "6-3 RET" counts 6 winner games while its difference and
/// total are forced to 0.
pub fn winner_games(score: Option<&str>) -> u32 {
    let Some(raw) = score else {
        return 0;
    };
    raw.split_whitespace()
        .filter_map(parse_set_token)
        .map(|(won, _)| won)
        .sum()
}

/// Sets played, counted as '-' characters in the raw, unstripped string.
/// Tiebreaks written with an inner hyphen ("7-6(10-8)") inflate this by one;
/// kept raw so avg_sets stays comparable with historical output.
pub fn sets_count(score: Option<&str>) -> Option<u32> {
    score.map(|raw| raw.matches('-').count() as u32)
}

/// One set token -> (winner games, loser games). Strips every parenthesized
/// tiebreak span, then requires exactly two hyphen-separated integers.
fn parse_set_token(token: &str) -> Option<(u32, u32)> {
    let cleaned = strip_tiebreaks(token);
    let mut parts = cleaned.split('-');
    let won = parts.next()?.trim().parse::<u32>().ok()?;
    let lost = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((won, lost))
}

/// Removes complete "(...)" spans; an unmatched '(' is left in place and the
/// token then fails integer parsing and gets skipped upstream.
fn strip_tiebreaks(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut rest = token;
    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        out.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::{ScoreBreakdown, parse_score, sets_count, strip_tiebreaks, winner_games};

    #[test]
    fn straight_sets_breakdown() {
        let b = parse_score(Some("6-4 6-4 6-4"));
        assert_eq!(b.games_diff, 6);
        assert_eq!(b.games_total, 30);
        assert_eq!(b.tokens_accepted, 3);
        assert_eq!(b.tokens_skipped, 0);
        assert_eq!(winner_games(Some("6-4 6-4 6-4")), 18);
    }

    #[test]
    fn dropped_set_subtracts_from_difference() {
        let b = parse_score(Some("6-3 4-6 7-5"));
        assert_eq!(b.games_diff, 3);
        assert_eq!(b.games_total, 31);
        assert_eq!(winner_games(Some("6-3 4-6 7-5")), 17);
    }

    #[test]
    fn tiebreak_annotations_are_stripped() {
        assert_eq!(strip_tiebreaks("7-6(7)"), "7-6");
        assert_eq!(strip_tiebreaks("7-6(10-8)"), "7-6");
        let b = parse_score(Some("7-6(7) 6-3"));
        assert_eq!(b.games_diff, 4);
        assert_eq!(b.games_total, 22);
    }

    #[test]
    fn void_markers_force_explicit_zeros() {
        for score in ["W/O", "6-3 RET", "2-1 DEF", "6-4 2-2 RET"] {
            let b = parse_score(Some(score));
            assert_eq!(b.games_diff, 0, "score {score:?}");
            assert_eq!(b.games_total, 0, "score {score:?}");
            assert_eq!(b.tokens_accepted, 0, "score {score:?}");
        }
        assert_eq!(parse_score(None), ScoreBreakdown::default());
    }

    #[test]
    fn winner_games_ignores_the_void_policy() {
        // The retirement zero-policy is intentionally not applied here.
        assert_eq!(winner_games(Some("6-3 RET")), 6);
        assert_eq!(winner_games(Some("W/O")), 0);
        assert_eq!(winner_games(None), 0);
    }

    #[test]
    fn unparseable_tokens_are_skipped_silently() {
        let b = parse_score(Some("6-4 ab 6-3"));
        assert_eq!(b.games_diff, 5);
        assert_eq!(b.games_total, 19);
        assert_eq!(b.tokens_accepted, 2);
        assert_eq!(b.tokens_skipped, 1);

        // Bracketed super-tiebreaks don't clean up into two integers.
        let b = parse_score(Some("6-4 [10-8]"));
        assert_eq!(b.tokens_accepted, 1);
        assert_eq!(b.tokens_skipped, 1);
        assert_eq!(winner_games(Some("6-4 [10-8]")), 6);

        // Three hyphen-separated parts is not a set token.
        let b = parse_score(Some("6-4-2"));
        assert_eq!(b.tokens_accepted, 0);
        assert_eq!(b.tokens_skipped, 1);
    }

    #[test]
    fn sets_count_uses_the_raw_string() {
        assert_eq!(sets_count(Some("6-4 6-4 6-4")), Some(3));
        // Inner tiebreak hyphen counts too; raw-text behavior is kept.
        assert_eq!(sets_count(Some("7-6(10-8) 6-2")), Some(3));
        assert_eq!(sets_count(Some("W/O")), Some(0));
        assert_eq!(sets_count(None), None);
    }
}
