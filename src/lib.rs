pub mod competitiveness;
pub mod dataset;
pub mod predictability;
pub mod report_export;
pub mod round_metrics;
pub mod run_manifest;
pub mod score_parse;
pub mod season_report;
