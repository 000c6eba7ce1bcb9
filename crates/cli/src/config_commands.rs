use {anyhow::Result, clap::Subcommand};

use sapphire_config::{SapphireConfig, Severity, ValidationResult, validate};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the effective configuration and report errors/warnings.
    Check,
    /// Print the effective configuration as TOML.
    Show,
    /// Print where the user-global config file lives.
    Path,
}

pub fn handle_config(action: ConfigAction, config: &SapphireConfig) -> Result<()> {
    match action {
        ConfigAction::Check => check(config),
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        },
        ConfigAction::Path => {
            match sapphire_config::config_dir() {
                Some(dir) => println!("{}", dir.join("sapphire.toml").display()),
                None => eprintln!("no home directory; only ./sapphire.toml is searched"),
            }
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(config: &SapphireConfig) -> Result<()> {
    let result = validate(config);
    eprint!("{}", render(&result));

    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn render(result: &ValidationResult) -> String {
    let mut out = String::new();
    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        out.push_str(&format!(
            "  {BOLD}{color}{label}{RESET} {}: {}\n",
            d.path, d.message
        ));
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    if errors == 0 && warnings == 0 {
        out.push_str("No issues found.\n");
    } else {
        out.push_str(&format!("\n{errors} error(s), {warnings} warning(s)\n"));
    }
    out
}
