//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `lifeweeks_core` linkage and storage bootstrap from a shell.
//! - Given a birth date (`YYYY-MM-DD`) and optional life expectancy, print
//!   where in the life grid today falls.
//!
//! Output is `key=value` lines so scripts can grep it.

use clap::Parser;
use lifeweeks_core::calendar::week_calculator::{
    age_in_years, current_week_number, format_week_span, life_progress, total_weeks,
    validate_birth_date, validate_life_expectancy, week_dates,
};
use lifeweeks_core::{
    core_version, init_logging_from_config, Clock, CoreConfig, EntryStore, SqliteKvBackend,
    SystemClock,
};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "lifeweeks_cli", version)]
#[command(about = "Shows where today falls in a life grid of weeks")]
struct Cli {
    /// Birth date as YYYY-MM-DD
    birth_date: Option<String>,

    /// Life expectancy in whole years (defaults to the configured value)
    #[arg(requires = "birth_date")]
    life_expectancy: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CoreConfig::from_env();
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    println!("lifeweeks_core version={}", core_version());

    if let Some(birth_input) = cli.birth_date.as_deref() {
        if let Err(message) = print_grid_position(&config, birth_input, cli.life_expectancy) {
            eprintln!("error={message}");
            return ExitCode::FAILURE;
        }
    }

    match print_storage_info(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error={message}");
            ExitCode::FAILURE
        }
    }
}

fn print_grid_position(
    config: &CoreConfig,
    birth_input: &str,
    years_input: Option<u32>,
) -> Result<(), String> {
    let today = SystemClock.today();
    let birth_date =
        validate_birth_date(birth_input, today, &config.rules).map_err(|err| err.to_string())?;
    let years = years_input.unwrap_or(config.rules.default_life_expectancy);
    let years = validate_life_expectancy(years, &config.rules).map_err(|err| err.to_string())?;

    let current = current_week_number(birth_date, today);
    println!("birth_date={birth_date}");
    println!("current_week={current}");
    println!("total_weeks={}", total_weeks(years));
    println!("age_years={}", age_in_years(birth_date, today));
    println!("life_progress={:.1}", life_progress(birth_date, years, today));
    if let Ok(week_number) = u32::try_from(current) {
        println!(
            "current_week_range={}",
            format_week_span(week_dates(birth_date, week_number))
        );
    }
    Ok(())
}

async fn print_storage_info(config: &CoreConfig) -> Result<(), String> {
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|err| format!("cannot create `{}`: {err}", parent.display()))?;
    }
    let backend = SqliteKvBackend::open(&config.db_path).map_err(|err| err.to_string())?;
    let info = EntryStore::new(backend)
        .storage_info()
        .await
        .map_err(|err| err.to_string())?;

    println!("db_path={}", config.db_path.display());
    println!("profile_exists={}", info.profile_exists);
    println!("entry_count={}", info.entry_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::{CommandFactory, Parser};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_birth_date_and_life_expectancy() {
        let cli = Cli::try_parse_from(["lifeweeks_cli", "1990-05-17", "85"]).unwrap();
        assert_eq!(cli.birth_date.as_deref(), Some("1990-05-17"));
        assert_eq!(cli.life_expectancy, Some(85));

        let cli = Cli::try_parse_from(["lifeweeks_cli"]).unwrap();
        assert!(cli.birth_date.is_none());
        assert!(cli.life_expectancy.is_none());
    }

    #[test]
    fn non_numeric_life_expectancy_is_a_usage_error() {
        let err = Cli::try_parse_from(["lifeweeks_cli", "1990-05-17", "abc"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
