use crossterm::style::Stylize;
use std::sync::Arc;

use salve_viewer::config::cli::CliOptions;
use salve_viewer::config::config::Config;
use salve_viewer::data::datasets::Datasets;
use salve_viewer::services::batch_runner::run_batch;
use salve_viewer::ui::app::run_salve_tui;

fn print_help() {
    println!("{}", "Salve - clinic patient viewer".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  salve [OPTIONS]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}   - Print the patients as a table and exit", "--print".green());
    println!("  {}   - Select a clinic id first (\"1\" is dataset A)", "--clinic ID".green());
    println!(
        "  {}  - Click a column; repeat to click again (id, clinic_id, first_name, last_name, date_of_birth)",
        "--sort FIELD".green()
    );
    println!("  {} - Write the patients to FILE (.json or .csv)", "--export FILE".green());
    println!("  {} - Use a specific config file", "--config FILE".green());
    println!("  {}   - ASCII markers instead of Unicode glyphs", "--ascii".green());
    println!("  {} - Write a commented default config", "--generate-config".green());
    println!("  {}    - Show this help", "--help".green());
    println!();
    println!("{}", "In the viewer:".yellow());
    println!("  {}     - Choose clinic", "c".green());
    println!("  {}   - Sort by a field (each press flips the direction)", "1-5".green());
    println!("  {} - Help", "F1 / ?".green());
    println!("  {}     - Quit", "q".green());
    println!();
}

fn generate_config() -> anyhow::Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, Config::create_default_with_comments())?;
    println!("Configuration file created at: {:?}", path);
    Ok(())
}

fn load_config(options: &CliOptions) -> anyhow::Result<Config> {
    let mut config = Config::load_or_default(options.config_file.as_deref())?;
    if options.ascii {
        config.display.use_glyphs = false;
    }
    Ok(config)
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match CliOptions::parse(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if options.show_help {
        print_help();
        return;
    }

    if options.generate_config {
        if let Err(e) = generate_config() {
            eprintln!("Error writing config file: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let dual_logger = salve_viewer::utils::logging::init_tracing_with_dual_logging();
    if !options.is_batch() {
        eprintln!("Debug logs: {}", dual_logger.log_path().display());
    }

    let config = match load_config(&options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", format!("Error loading config: {:#}", e).red());
            std::process::exit(1);
        }
    };
    let datasets = match Datasets::load(&config.data) {
        Ok(datasets) => Arc::new(datasets),
        Err(e) => {
            eprintln!("{}", format!("Error loading data: {:#}", e).red());
            std::process::exit(1);
        }
    };

    let result = if options.is_batch() {
        run_batch(datasets, &config, &options)
    } else {
        run_salve_tui(datasets, config, &options)
    };

    if let Err(e) = result {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}
