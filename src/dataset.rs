use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tournament tier, from the one-letter level code in the source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TourneyLevel {
    GrandSlam,
    Masters,
    Other,
}

impl TourneyLevel {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "G" => Self::GrandSlam,
            "M" => Self::Masters,
            _ => Self::Other,
        }
    }

    /// Best-of-N sets for the tier. Everything below a Grand Slam plays
    /// best-of-3 in the scoring format in scope.
    pub fn best_of(self) -> u32 {
        match self {
            Self::GrandSlam => 5,
            Self::Masters | Self::Other => 3,
        }
    }
}

/// The four elimination rounds used for predictability/competitiveness
/// scoring. Earlier rounds count toward a tournament's overall indicators
/// only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Round {
    RoundOf16,
    Quarterfinal,
    Semifinal,
    Final,
}

impl Round {
    pub const ALL: [Round; 4] = [
        Round::RoundOf16,
        Round::Quarterfinal,
        Round::Semifinal,
        Round::Final,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "R16" => Some(Self::RoundOf16),
            "QF" => Some(Self::Quarterfinal),
            "SF" => Some(Self::Semifinal),
            "F" => Some(Self::Final),
            _ => None,
        }
    }

    /// Round code as written in the source files and in per-round column
    /// suffixes.
    pub fn code(self) -> &'static str {
        match self {
            Self::RoundOf16 => "R16",
            Self::Quarterfinal => "QF",
            Self::Semifinal => "SF",
            Self::Final => "F",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One match row as loaded for a year. Immutable after load.
#[derive(Debug, Clone)]
pub struct MatchRecord {
    pub tourney_id: String,
    pub tourney_name: String,
    /// Raw one-letter level code, kept verbatim for the output tables.
    pub level_code: String,
    pub level: TourneyLevel,
    pub surface: String,
    /// `None` for rounds outside the four target rounds.
    pub round: Option<Round>,
    pub winner_rank: Option<f64>,
    pub loser_rank: Option<f64>,
    pub score: Option<String>,
}

/// Raw CSV row; only the columns this pipeline reads. The source files carry
/// dozens more (serve stats, ids, dates) which the csv reader ignores.
#[derive(Debug, Deserialize)]
struct RawMatchRow {
    tourney_id: String,
    tourney_name: String,
    surface: Option<String>,
    tourney_level: String,
    round: Option<String>,
    winner_rank: Option<f64>,
    loser_rank: Option<f64>,
    score: Option<String>,
}

impl From<RawMatchRow> for MatchRecord {
    fn from(raw: RawMatchRow) -> Self {
        let level = TourneyLevel::from_code(&raw.tourney_level);
        let round = raw.round.as_deref().and_then(Round::from_name);
        MatchRecord {
            tourney_id: raw.tourney_id,
            tourney_name: raw.tourney_name,
            level_code: raw.tourney_level,
            level,
            surface: raw.surface.unwrap_or_default(),
            round,
            winner_rank: raw.winner_rank,
            loser_rank: raw.loser_rank,
            score: raw.score,
        }
    }
}

/// Loads one year's match rows from `atp_matches_{year}.csv` in `input_dir`,
/// in file order. A missing or unreadable file is fatal to the whole run;
/// partial-year output would be silently incomplete.
pub fn load_year_matches(input_dir: &Path, year: i32) -> Result<Vec<MatchRecord>> {
    let path = input_dir.join(format!("atp_matches_{year}.csv"));
    let mut reader = csv::Reader::from_path(&path)
        .with_context(|| format!("open match file {}", path.display()))?;

    let mut out = Vec::new();
    for row in reader.deserialize::<RawMatchRow>() {
        let row = row.with_context(|| format!("decode match row in {}", path.display()))?;
        out.push(MatchRecord::from(row));
    }
    Ok(out)
}

/// Keeps only matches whose raw level code is in `level_codes`, preserving
/// source order.
pub fn filter_levels(matches: Vec<MatchRecord>, level_codes: &[String]) -> Vec<MatchRecord> {
    matches
        .into_iter()
        .filter(|m| level_codes.iter().any(|code| *code == m.level_code))
        .collect()
}
