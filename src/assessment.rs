//! Local migration assessment.
//!
//! Scores raw utilization metrics the same way the migration backend does when
//! it ingests a server, so an inventory file can be previewed without the API.

use crate::payload::{parse_number, StrategyScores};
use crate::ranking::{rank_strategies, StrategyRanking};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub const LIFT_AND_SHIFT: &str = "lift_and_shift";
pub const REFACTOR: &str = "refactor";
pub const REBUILD: &str = "rebuild";
pub const HYBRID: &str = "hybrid";

/// Fixed evaluation order; the primary strategy is the first maximum in it.
pub const STRATEGIES: [&str; 4] = [LIFT_AND_SHIFT, REFACTOR, REBUILD, HYBRID];

const BASE_MIGRATION_COST: f64 = 500.0;

pub const UNKNOWN_SERVER: &str = "Unknown Server";

/// Inventory entry as uploaded to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerMetrics {
    pub server_name: String,
    pub cpu_utilization: f64,
    pub memory_utilization: f64,
    pub network_utilization: f64,
    pub software: Vec<String>,
}

impl ServerMetrics {
    /// Accepts `cpu`/`cpu_utilization`, `memory`/`memory_utilization` and
    /// `software_dependencies`/`software`. Numbers may be strings; anything
    /// unreadable counts as 0.
    pub fn from_value(value: &Value) -> Self {
        let number = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| value.get(*key).filter(|v| !v.is_null()))
                .and_then(|v| match v {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => parse_number(s),
                    _ => None,
                })
                .unwrap_or(0.0)
        };

        let server_name = match value.get("server_name") {
            Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => UNKNOWN_SERVER.to_string(),
        };

        let software = ["software_dependencies", "software"]
            .iter()
            .find_map(|key| value.get(*key))
            .and_then(|v| Vec::<String>::deserialize(v).ok())
            .unwrap_or_default();

        Self {
            server_name,
            cpu_utilization: number(&["cpu", "cpu_utilization"][..]),
            memory_utilization: number(&["memory", "memory_utilization"][..]),
            network_utilization: number(&["network_utilization"][..]),
            software,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub server_name: String,
    pub primary_strategy: String,
    pub strategy_scores: StrategyScores,
    pub estimated_cost: f64,
}

impl Assessment {
    pub fn ranking(&self) -> Option<StrategyRanking> {
        rank_strategies(&self.strategy_scores).ok()
    }
}

pub fn assess_migration(metrics: &ServerMetrics) -> Assessment {
    let mut points = [0u32; 4];
    let [lift, refactor, rebuild, hybrid] = [0, 1, 2, 3];

    let cpu = metrics.cpu_utilization;
    if cpu < 30.0 {
        points[lift] += 2;
        points[hybrid] += 1;
    } else if cpu < 70.0 {
        points[refactor] += 2;
        points[hybrid] += 1;
    } else {
        points[rebuild] += 2;
        points[hybrid] += 1;
    }

    let memory = metrics.memory_utilization;
    if memory < 40.0 {
        points[lift] += 1;
    } else if memory < 80.0 {
        points[refactor] += 1;
        points[hybrid] += 1;
    } else {
        points[rebuild] += 1;
    }

    let network = metrics.network_utilization;
    if network < 50.0 {
        points[lift] += 1;
    } else if network < 80.0 {
        points[hybrid] += 1;
    } else {
        points[refactor] += 1;
    }

    let mut primary = 0;
    for (i, score) in points.iter().enumerate() {
        if *score > points[primary] {
            primary = i;
        }
    }

    let strategy_scores: StrategyScores = STRATEGIES
        .iter()
        .zip(points.iter())
        .map(|(name, score)| (*name, f64::from(*score)))
        .collect();
    let estimated_cost = estimate_migration_cost(&strategy_scores);

    Assessment {
        server_name: metrics.server_name.clone(),
        primary_strategy: STRATEGIES[primary].to_string(),
        strategy_scores,
        estimated_cost,
    }
}

/// Average of the four per-strategy costs, rounded to cents.
pub fn estimate_migration_cost(scores: &StrategyScores) -> f64 {
    let weights = [
        (LIFT_AND_SHIFT, 0.2),
        (REFACTOR, 0.3),
        (REBUILD, 0.5),
        (HYBRID, 0.4),
    ];
    let total: f64 = weights
        .iter()
        .map(|(name, weight)| {
            BASE_MIGRATION_COST * (1.0 + weight * scores.get(name).unwrap_or(0.0))
        })
        .sum();
    let average = total / weights.len() as f64;
    (average * 100.0).round() / 100.0
}

/// A file holds either one server object or an array of them.
pub fn load_inventory(path: &Path) -> Result<Vec<ServerMetrics>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read inventory file: {:?}", path))?;
    parse_inventory(&content).with_context(|| format!("Invalid inventory file: {:?}", path))
}

pub fn parse_inventory(content: &str) -> Result<Vec<ServerMetrics>> {
    let value: Value = serde_json::from_str(content).context("Inventory is not valid JSON")?;
    match value {
        Value::Array(items) => Ok(items.iter().map(ServerMetrics::from_value).collect()),
        obj @ Value::Object(_) => Ok(vec![ServerMetrics::from_value(&obj)]),
        _ => anyhow::bail!("Inventory must be a server object or an array of them"),
    }
}
