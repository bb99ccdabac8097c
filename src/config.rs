use clap::Parser;

use crate::report::AnalysisSettings;

/// Cricket match analytics engine
#[derive(Parser, Debug, Clone)]
#[command(name = "cricket-analytics", version, about)]
pub struct Config {
    /// JSON match feed to analyse
    #[arg(long, env = "MATCH_FILE", default_value = "data/sample_match.json")]
    pub match_file: String,

    /// JSON API listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "127.0.0.1:8000")]
    pub listen_addr: String,

    /// Print the full report as JSON and exit instead of serving
    #[arg(long, env = "PRINT_REPORT", default_value = "false")]
    pub print_report: bool,

    /// Maximum overs a single bowler may bowl
    #[arg(long, env = "MAX_OVERS_PER_BOWLER", default_value = "4")]
    pub max_overs_per_bowler: u32,

    /// Momentum window size in overs
    #[arg(long, env = "POWERPLAY_OVERS", default_value = "6")]
    pub powerplay_overs: usize,

    /// Run thresholds reported as `batters_above_<t>` (comma separated)
    #[arg(long, env = "RUN_THRESHOLDS", default_value = "30,50", value_delimiter = ',')]
    pub run_thresholds: Vec<u32>,

    /// Name prefixes reported under `player_search` (comma separated)
    #[arg(long, env = "SEARCH_PREFIXES", default_value = "sh,mo,ab", value_delimiter = ',')]
    pub search_prefixes: Vec<String>,

    /// Reference run rate for the chase model; defaults to the first innings' rate
    #[arg(long, env = "PAR_RUN_RATE")]
    pub par_run_rate: Option<f64>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_overs_per_bowler == 0 {
            anyhow::bail!("max_overs_per_bowler must be at least 1");
        }
        if self.powerplay_overs == 0 {
            anyhow::bail!("powerplay_overs must be at least 1");
        }
        if self.run_thresholds.is_empty() {
            anyhow::bail!("at least one run threshold is required");
        }
        if let Some(par) = self.par_run_rate {
            if !par.is_finite() || par <= 0.0 {
                anyhow::bail!("par_run_rate must be a positive number");
            }
        }
        Ok(())
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            max_overs_per_bowler: self.max_overs_per_bowler,
            powerplay_overs: self.powerplay_overs,
            run_thresholds: self.run_thresholds.clone(),
            search_prefixes: self
                .search_prefixes
                .iter()
                .map(|p| p.trim().to_string())
                .collect(),
            par_run_rate: self.par_run_rate,
        }
    }
}
