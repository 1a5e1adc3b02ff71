use thiserror::Error;

/// Failures produced while fetching and decoding a server report.
///
/// Only `OuterDecodeFailed`, `FetchFailed` and `MissingServerId` ever reach
/// the user. `NestedDecodeFailed` is logged by the parser and replaced with an
/// empty container; `EmptyScoreSet` makes callers skip the ranking chart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Invalid response body: {0}")]
    OuterDecodeFailed(String),
    #[error("Could not decode {field}: {reason}")]
    NestedDecodeFailed { field: &'static str, reason: String },
    #[error("Error fetching data: {0}")]
    FetchFailed(String),
    #[error("No strategy scores to rank")]
    EmptyScoreSet,
    #[error("Please enter a valid server number.")]
    MissingServerId,
}

impl ReportError {
    /// True for the failures that should be shown to the user.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::OuterDecodeFailed(_) | Self::FetchFailed(_) | Self::MissingServerId
        )
    }
}
