//! TurtleBot 4 Setup - Main CLI Application
//!
//! Reads the robot's configuration files, applies one edit and writes the
//! files back.

use clap::Parser;
use std::process;
use turtlebot4_setup::{
    cli::{Cli, Command},
    config::{display_settings_summary, load_settings, validate_config, EnvManager, ValidationLevel},
    error::{AppError, ErrorReporter, Result},
    logging::LoggerFactory,
    models::{Category, ConfigValue, SetOutcome, Settings},
    orchestrator::ConfigOrchestrator,
    output::{OutputFormatter, OutputFormatterFactory},
    PKG_NAME, VERSION,
};

fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("Please report this issue with the command that triggered it.");
        process::exit(99);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = run_application(cli) {
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
fn run_application(cli: Cli) -> Result<()> {
    if cli.command == Command::Env {
        return show_env_help();
    }

    let settings = load_settings(cli.clone())?;
    if !settings.enable_color {
        colored::control::set_override(false);
    }

    let factory = LoggerFactory::new(settings.clone());
    let logger = factory.create_logger(PKG_NAME);

    if settings.debug {
        logger
            .debug(&format!("{} v{} ({}, built {})", PKG_NAME, VERSION, env!("GIT_COMMIT"), env!("BUILD_TIME")))
            .log();
        logger.debug(&cli.get_config_summary()).log();
        logger.debug(&display_settings_summary(&settings)).log();
    }

    let mut orchestrator = ConfigOrchestrator::from_settings(&settings, logger.named("orchestrator"));
    orchestrator.read()?;

    let formatter = match cli.command {
        Command::Show { json: true, .. } => OutputFormatterFactory::create_json_formatter(),
        _ => OutputFormatterFactory::create_formatter(settings.enable_color, settings.verbose),
    };

    match cli.command {
        Command::Show { category, .. } => {
            println!("{}", formatter.format_model(orchestrator.model(), category)?);
        }
        Command::Get { key } => {
            println!("{}", formatter.format_value(key, &orchestrator.get(key))?);
        }
        Command::Set { key, value, dry_run } => {
            let outcome = orchestrator.set(key, ConfigValue::from(value))?;
            if let SetOutcome::Rejected(reason) = &outcome {
                return Err(AppError::validation(format!("{} left unchanged: {}", key, reason)));
            }
            println!("{}", formatter.format_set_outcome(key, &outcome, &orchestrator.get(key))?);
            save(&mut orchestrator, key.category(), dry_run, formatter.as_ref(), &settings)?;
        }
        Command::Reset { category, dry_run } => {
            orchestrator.apply_default(category);
            println!("{}", formatter.format_model(orchestrator.model(), Some(category))?);
            save(&mut orchestrator, category, dry_run, formatter.as_ref(), &settings)?;
        }
        Command::Apply => {
            orchestrator.write()?;
            println!("{}", formatter.format_success("Configuration written")?);
        }
        Command::Discovery { create3 } => {
            let line = if create3 {
                formatter.format_discovery("Create 3 server list", &orchestrator.create3_server_str())?
            } else {
                formatter.format_discovery("ROS_DISCOVERY_SERVER", &orchestrator.discovery_str())?
            };
            println!("{}", line);
        }
        Command::Validate => {
            let warnings = validate_config(orchestrator.model());
            println!("{}", formatter.format_warnings(&warnings)?);

            let errors = warnings.iter().filter(|w| w.level == ValidationLevel::Error).count();
            if errors > 0 {
                return Err(AppError::validation(format!("{} error(s) in the configuration", errors)));
            }
        }
        // Handled before the configuration is read
        Command::Env => {}
    }

    Ok(())
}

/// Write the files touched by an edit, or list them for a dry run
fn save(
    orchestrator: &mut ConfigOrchestrator,
    category: Category,
    dry_run: bool,
    formatter: &dyn OutputFormatter,
    settings: &Settings,
) -> Result<()> {
    if dry_run {
        let writes = match category {
            Category::Discovery => orchestrator.plan_discovery()?,
            _ => orchestrator.plan_write()?,
        };
        for write in writes {
            let line = format!("Would write {} ({} bytes)", write.path.display(), write.contents.len());
            println!("{}", formatter.format_warning(&line)?);
            if settings.verbose {
                println!("{}", write.contents);
            }
        }
        return Ok(());
    }

    match category {
        Category::Discovery => orchestrator.write_discovery()?,
        _ => orchestrator.write()?,
    }
    println!("{}", formatter.format_success("Configuration written")?);
    Ok(())
}

fn show_env_help() -> Result<()> {
    println!("{}", EnvManager::display_env_help());

    for warning in EnvManager::validate_current_env() {
        eprintln!("{}", warning);
    }
    Ok(())
}
