use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// How the greedy pass picks the next seat for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementStrategy {
    /// Walk seats in row-major order, choosing a class per seat.
    #[default]
    SeatScan,
    /// Walk classes per row, choosing the lowest-scoring column per class.
    ColumnScore,
}

impl FromStr for PlacementStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seat-scan" | "seatscan" => Ok(PlacementStrategy::SeatScan),
            "column-score" | "columnscore" => Ok(PlacementStrategy::ColumnScore),
            other => Err(format!("unknown placement strategy: {}", other)),
        }
    }
}

/// Upper bounds on request sizes, checked before anything is expanded or allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLimits {
    /// Most seats a single hall may declare.
    pub max_hall_seats: usize,
    /// Most candidates a single class roster may expand to.
    pub max_roster_size: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_hall_seats: 10_000,
            max_roster_size: 10_000,
        }
    }
}

/// Tuning knobs for the seat allocator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Full grid rebuilds before falling back to backtracking.
    pub max_attempts: usize,
    /// Queued candidates of a preferred class tried per seat.
    pub lookahead: usize,
    /// Largest residual handed to the backtracking completer.
    pub backtrack_limit: usize,
    /// Upper bound on placement trials inside one backtracking run.
    pub backtrack_step_budget: u64,
    pub strategy: PlacementStrategy,
    pub seed: Option<u64>,
    pub limits: InputLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            lookahead: 3,
            backtrack_limit: 15,
            backtrack_step_budget: 2_000_000,
            strategy: PlacementStrategy::SeatScan,
            seed: None,
            limits: InputLimits::default(),
        }
    }
}

impl EngineConfig {
    /// Reads overrides from `SEATING_*` environment variables.
    pub fn from_env() -> Result<Self, LoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, starting from the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("SEATING_MAX_ATTEMPTS") {
            config.max_attempts = parse_value("SEATING_MAX_ATTEMPTS", &v)?;
        }
        if let Some(v) = lookup("SEATING_LOOKAHEAD") {
            config.lookahead = parse_value("SEATING_LOOKAHEAD", &v)?;
        }
        if let Some(v) = lookup("SEATING_BACKTRACK_LIMIT") {
            config.backtrack_limit = parse_value("SEATING_BACKTRACK_LIMIT", &v)?;
        }
        if let Some(v) = lookup("SEATING_STEP_BUDGET") {
            config.backtrack_step_budget = parse_value("SEATING_STEP_BUDGET", &v)?;
        }
        if let Some(v) = lookup("SEATING_STRATEGY") {
            config.strategy = parse_value("SEATING_STRATEGY", &v)?;
        }
        if let Some(v) = lookup("SEATING_SEED") {
            config.seed = Some(parse_value("SEATING_SEED", &v)?);
        }

        if let Some(v) = lookup("SEATING_MAX_HALL_SEATS") {
            config.limits.max_hall_seats = parse_value("SEATING_MAX_HALL_SEATS", &v)?;
        }
        if let Some(v) = lookup("SEATING_MAX_ROSTER_SIZE") {
            config.limits.max_roster_size = parse_value("SEATING_MAX_ROSTER_SIZE", &v)?;
        }

        if config.max_attempts == 0 {
            return Err(LoadError::Config {
                key: "SEATING_MAX_ATTEMPTS".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_strategy(mut self, strategy: PlacementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Random source for one planning request.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, LoadError> {
    value.trim().parse().map_err(|_| LoadError::Config {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl ServerConfig {
    /// Port from the optional CLI argument (default 8080), address from `SEATING_BIND`.
    pub fn from_args(port_arg: Option<&str>) -> Self {
        let port = port_arg
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let bind = std::env::var("SEATING_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
        Self { bind, port }
    }
}
