use serverscope::ranking::StrategyRanking;
use serverscope::report::format_quantity;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartBar {
    pub label: String,
    /// 0..=100, relative to the highest score.
    pub height: u64,
    pub text: String,
}

/// Everything the bar chart widget needs for one report.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyChart {
    pub title: String,
    pub bars: Vec<ChartBar>,
}

impl StrategyChart {
    pub fn from_ranking(ranking: &StrategyRanking) -> Self {
        let max = ranking.max_score();
        let bars = ranking
            .ordered
            .iter()
            .map(|s| ChartBar {
                label: s.label.clone(),
                height: if max > 0.0 && s.score > 0.0 {
                    ((s.score / max) * 100.0).round() as u64
                } else {
                    0
                },
                text: format_quantity(s.score),
            })
            .collect();

        let top = ranking
            .top_entry()
            .map(|s| s.label.clone())
            .unwrap_or_else(|| ranking.top.clone());

        Self {
            title: format!(" Strategy Scores (top: {}) ", top),
            bars,
        }
    }
}

/// Owns the chart currently on screen. A chart is only ever released through
/// `replace` or `clear`.
#[derive(Debug, Default)]
pub struct ChartSlot {
    current: Option<StrategyChart>,
}

impl ChartSlot {
    pub fn current(&self) -> Option<&StrategyChart> {
        self.current.as_ref()
    }

    /// Installs `chart` and hands back the one it displaced.
    pub fn replace(&mut self, chart: StrategyChart) -> Option<StrategyChart> {
        self.current.replace(chart)
    }

    pub fn clear(&mut self) -> Option<StrategyChart> {
        self.current.take()
    }
}
