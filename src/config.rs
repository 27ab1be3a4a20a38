use anyhow::{bail, Context};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_PATH: &str = "eval_params.json";

static CACHED: Lazy<EvalParams> = Lazy::new(EvalParams::load_or_default);

/// Search and evaluation parameters.
///
/// Loaded once and then shared read-only with every worker. Field defaults
/// apply to anything missing from the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalParams {
    /// How many plies ahead the search looks.
    pub max_depth: u32,
    /// Upper bound on evaluated boards for one search.
    pub max_boards: u64,
    /// Wall-clock budget for one search, in seconds.
    pub timeout_secs: f64,

    pub parity_weight: f64,
    pub mobility_weight: f64,
    pub stability_weight: f64,

    pub use_pruning: bool,
    pub use_move_ordering: bool,
    /// Depth of the shallow probe that pre-ranks moves.
    pub move_ordering_depth: u32,
    /// Distribute the tree search across workers.
    pub parallel_search: bool,
    /// Average jobs per worker in the initial pool.
    pub load_factor: usize,
    /// Assumed branching factor for the pruned-node estimate.
    pub avg_branch_factor: u32,

    pub use_static_evaluation: bool,
    pub corner_weight: i32,
    pub x_square_weight: i32,
    pub c_square_weight: i32,
    pub edge_weight: i32,
    pub inner_weight: i32,

    pub stats: StatsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub enabled: bool,
    pub job_log: PathBuf,
    pub run_log: PathBuf,
    pub static_eval_log: PathBuf,
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig {
            enabled: true,
            job_log: PathBuf::from("job_stats.csv"),
            run_log: PathBuf::from("parallel_search_stats.csv"),
            static_eval_log: PathBuf::from("static_eval_stats.csv"),
        }
    }
}

impl Default for EvalParams {
    fn default() -> Self {
        EvalParams {
            max_depth: 6,
            max_boards: 10_000_000,
            timeout_secs: 10.0,
            parity_weight: 30.0,
            mobility_weight: 30.0,
            stability_weight: 40.0,
            use_pruning: true,
            use_move_ordering: false,
            move_ordering_depth: 1,
            parallel_search: true,
            load_factor: 10,
            avg_branch_factor: 7,
            use_static_evaluation: false,
            corner_weight: 10,
            x_square_weight: -8,
            c_square_weight: -4,
            edge_weight: 2,
            inner_weight: 1,
            stats: StatsConfig::default(),
        }
    }
}

impl EvalParams {
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading parameters from {}", path.display()))?;
        let params: EvalParams = serde_json::from_str(&raw)
            .with_context(|| format!("parsing parameters in {}", path.display()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            log::debug!("using default parameters: {:#}", e);
            Self::default()
        })
    }

    /// Process-wide parameters, loaded from `eval_params.json` on first use.
    pub fn get() -> &'static EvalParams {
        &CACHED
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let weights = [
            ("parity_weight", self.parity_weight),
            ("mobility_weight", self.mobility_weight),
            ("stability_weight", self.stability_weight),
            ("timeout_secs", self.timeout_secs),
        ];
        for (name, value) in weights {
            if !value.is_finite() {
                bail!("{} must be finite, got {}", name, value);
            }
        }
        if self.timeout_secs < 0.0 {
            bail!("timeout_secs must not be negative");
        }
        if self.load_factor == 0 {
            bail!("load_factor must be at least 1");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs.max(0.0)).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let params: EvalParams =
            serde_json::from_str(r#"{ "max_depth": 3, "use_pruning": false }"#).unwrap();
        assert_eq!(params.max_depth, 3);
        assert!(!params.use_pruning);
        assert_eq!(params.load_factor, EvalParams::default().load_factor);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn zero_load_factor_is_rejected() {
        let params = EvalParams {
            load_factor: 0,
            ..EvalParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn load_from_reports_missing_file() {
        let err = EvalParams::load_from("definitely/not/here.json").unwrap_err();
        assert!(format!("{:#}", err).contains("definitely/not/here.json"));
    }
}
