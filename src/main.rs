// Entry point and high-level CLI flow.
//
// - Option [1] loads the report data exported by the health services backend.
// - Options [2]-[4] lay out and save the PDF, CSV and per-service reports.
// - `--batch` skips the menu and exports everything once.
mod config;
mod csv_report;
mod demographics;
mod error;
mod layout;
mod loader;
mod output;
mod pdf_render;
mod pdf_report;
mod recommendations;
mod types;
mod util;

use chrono::Local;
use config::{Config, APP_CONFIG};
use error::ReportError;
use pdf_render::LogoAsset;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use types::{ReportInput, ServiceKind};

/// Session for one CLI run; populated by option [1], dropped on exit.
struct AppState {
    input: Option<ReportInput>,
    logo: Option<LogoAsset>,
    logo_attempted: bool,
}

impl AppState {
    fn new() -> Self {
        Self { input: None, logo: None, logo_attempted: false }
    }

    /// Loads the logo on first use only; a failed load is not retried.
    fn ensure_logo(&mut self, config: &Config) {
        if self.logo_attempted {
            return;
        }
        self.logo_attempted = true;
        self.logo = config
            .logo
            .as_deref()
            .and_then(|path| pdf_render::load_logo(path, Duration::from_millis(config.logo_timeout_ms)));
    }
}

/// `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn handle_load(state: &mut AppState, config: &Config) -> Result<(), ReportError> {
    let (input, load_report) = loader::load_report_input(&config.input)?;
    let all = input.stats.combined();
    println!(
        "Loaded {} user types, {} services ({} completed).",
        util::format_int(load_report.user_types),
        util::format_int(all.total),
        util::format_int(all.completed)
    );
    if load_report.derived_totals > 0 {
        println!(
            "Info: Derived transaction totals for {} user types.",
            util::format_int(load_report.derived_totals)
        );
    }
    if load_report.disabled_user_types > 0 {
        println!(
            "Note: {} user types are disabled in the portal.",
            util::format_int(load_report.disabled_user_types)
        );
    }
    println!();
    output::preview_table_rows(&output::user_type_rows(&input.user_types), 5);
    tracing::info!(
        path = %config.input.display(),
        user_types = load_report.user_types,
        "report input loaded"
    );
    state.input = Some(input);
    Ok(())
}

fn export_pdf(state: &mut AppState, config: &Config) -> Result<PathBuf, ReportError> {
    let today = Local::now().date_naive();
    state.ensure_logo(config);
    let input = state.input.as_ref().ok_or_else(no_data)?;
    let bytes = pdf_report::generate_pdf_report(
        &input.stats,
        &input.user_types,
        config.report_type,
        today,
        state.logo.as_ref(),
    )?;
    let filename = util::report_filename(config.report_type, "pdf", today);
    output::save_report(&config.output_dir, &filename, &bytes)
}

fn export_csv(state: &AppState, config: &Config) -> Result<PathBuf, ReportError> {
    let now = Local::now().naive_local();
    let input = state.input.as_ref().ok_or_else(no_data)?;
    let text = csv_report::build_csv_report(&input.stats, &input.user_types, config.report_type, now)?;
    let filename = util::report_filename(config.report_type, "csv", now.date());
    output::save_report(&config.output_dir, &filename, text.as_bytes())
}

fn export_service_pdf(
    state: &mut AppState,
    config: &Config,
    service: ServiceKind,
) -> Result<PathBuf, ReportError> {
    let today = Local::now().date_naive();
    state.ensure_logo(config);
    let input = state.input.as_ref().ok_or_else(no_data)?;
    let bytes = pdf_report::generate_service_pdf_report(
        service,
        &input.stats,
        &input.user_types,
        config.report_type,
        today,
        state.logo.as_ref(),
    )?;
    let filename = util::service_report_filename(service, config.report_type, today);
    output::save_report(&config.output_dir, &filename, &bytes)
}

fn no_data() -> ReportError {
    ReportError::InvalidInput("no data loaded; load the report data first (option 1)".into())
}

fn prompt_service() -> Option<ServiceKind> {
    println!("Service: [1] Medical  [2] Dental  [3] Certificates");
    match read_choice()?.as_str() {
        "1" => Some(ServiceKind::Medical),
        "2" => Some(ServiceKind::Dental),
        "3" => Some(ServiceKind::Certificates),
        _ => None,
    }
}

fn report_outcome(result: Result<PathBuf, ReportError>) {
    match result {
        Ok(path) => println!("Saved {}\n", path.display()),
        Err(e) => eprintln!("Error: {}\n", e),
    }
}

fn run_batch(state: &mut AppState, config: &Config) -> Result<(), ReportError> {
    handle_load(state, config)?;
    let pdf = export_pdf(state, config)?;
    println!("Saved {}", pdf.display());
    let csv = export_csv(state, config)?;
    println!("Saved {}", csv.display());
    if let Some(service) = config.service {
        let path = export_service_pdf(state, config, service)?;
        println!("Saved {}", path.display());
    }
    Ok(())
}

fn run_menu(state: &mut AppState, config: &Config) {
    loop {
        println!("WMSU Health Services Reports ({})", config.report_type);
        println!("[1] Load report data");
        println!("[2] Export PDF report");
        println!("[3] Export CSV report");
        println!("[4] Export service demographics PDF");
        println!("[5] Exit\n");
        let Some(choice) = read_choice() else {
            println!();
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Err(e) = handle_load(state, config) {
                    eprintln!("Failed to load file: {}\n", e);
                }
            }
            "2" => report_outcome(export_pdf(state, config)),
            "3" => report_outcome(export_csv(state, config)),
            "4" => match prompt_service() {
                Some(service) => report_outcome(export_service_pdf(state, config, service)),
                None => println!("Invalid service. Please enter 1, 2 or 3.\n"),
            },
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1 to 5.\n"),
        }
    }
}

fn main() -> ExitCode {
    let config: &Config = &APP_CONFIG;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .init();

    let mut state = AppState::new();
    if config.batch {
        if let Err(e) = run_batch(&mut state, config) {
            tracing::error!(error = %e, "batch export failed");
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }
    run_menu(&mut state, config);
    ExitCode::SUCCESS
}
