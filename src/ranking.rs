use crate::error::ReportError;
use crate::payload::StrategyScores;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStrategy {
    pub name: String,
    pub label: String,
    pub score: f64,
}

/// Strategy scores ordered for charting, highest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyRanking {
    pub ordered: Vec<RankedStrategy>,
    pub top: String,
}

impl StrategyRanking {
    pub fn top_entry(&self) -> Option<&RankedStrategy> {
        self.ordered.iter().find(|s| s.name == self.top)
    }

    pub fn max_score(&self) -> f64 {
        self.ordered.first().map(|s| s.score).unwrap_or(0.0)
    }
}

/// Ranks strategy scores.
///
/// `top` is chosen left to right over payload order and only replaced by a
/// strictly greater score, so ties go to the strategy listed first. The sort is
/// stable for the same reason.
pub fn rank_strategies(scores: &StrategyScores) -> Result<StrategyRanking, ReportError> {
    let mut entries = scores.iter();
    let (first_name, first_score) = entries.next().ok_or(ReportError::EmptyScoreSet)?;

    let mut top = (first_name, first_score);
    for (name, score) in entries {
        if score > top.1 {
            top = (name, score);
        }
    }

    let mut ordered: Vec<RankedStrategy> = scores
        .iter()
        .map(|(name, score)| RankedStrategy {
            name: name.to_string(),
            label: display_label(name),
            score,
        })
        .collect();
    ordered.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(StrategyRanking {
        ordered,
        top: top.0.to_string(),
    })
}

/// `lift_and_shift` -> `LIFT AND SHIFT`
pub fn display_label(name: &str) -> String {
    name.replace('_', " ").to_uppercase()
}
