pub mod assessment;
pub mod client;
pub mod config;
pub mod error;
pub mod payload;
pub mod ranking;
pub mod report;


pub use client::{FetchedReport, ServerDataClient};
pub use error::ReportError;
pub use payload::{parse_response, parse_server_record, Quantity, ServerRecord, StrategyScores};
pub use ranking::{display_label, rank_strategies, RankedStrategy, StrategyRanking};
