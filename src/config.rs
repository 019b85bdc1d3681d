use crate::types::{ReportType, ServiceKind};
use clap::Parser;
use once_cell::sync::Lazy;
use std::path::PathBuf;

pub const DEFAULT_LOGO_TIMEOUT_MS: u64 = 2000;

pub static APP_CONFIG: Lazy<Config> = Lazy::new(Config::parse);

/// WMSU health services report exporter.
#[derive(Debug, Parser, Clone)]
#[command(version, about)]
pub struct Config {
    /// JSON file with `stats` and `userTypes`.
    #[clap(long, env = "REPORT_INPUT", default_value = "report_data.json")]
    pub input: PathBuf,

    #[clap(long, env = "REPORT_OUTPUT_DIR", default_value = "reports")]
    pub output_dir: PathBuf,

    #[clap(long, env = "REPORT_TYPE", value_enum, default_value_t = ReportType::Monthly)]
    pub report_type: ReportType,

    /// Optional logo drawn in every page banner.
    #[clap(long, env = "REPORT_LOGO")]
    pub logo: Option<PathBuf>,

    #[clap(long, env = "REPORT_LOGO_TIMEOUT_MS", default_value_t = DEFAULT_LOGO_TIMEOUT_MS)]
    pub logo_timeout_ms: u64,

    #[clap(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Export once and exit instead of showing the menu.
    #[clap(long, env = "REPORT_BATCH", default_value_t = false)]
    pub batch: bool,

    /// In batch mode, also export the demographics PDF for this service.
    #[clap(long, env = "REPORT_SERVICE")]
    pub service: Option<ServiceKind>,
}

impl Config {
    pub fn default_log_filter(&self) -> String {
        format!("wmsu_health_reports={}", self.log_level)
    }
}
