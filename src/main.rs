//! devtab - dashboard settings and widget data from the terminal
//!
//! Reads and edits the same settings document the new-tab dashboard uses and
//! fetches weather and GitHub data through the shared TTL cache.

use std::error::Error;
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use clap::Parser;

use devtab::cache::CacheManager;
use devtab::cli::{parse_setting_value, Cli, Command, SettingsCommand};
use devtab::data::{GithubClient, GithubData, WeatherClient, WeatherReport};
use devtab::settings::{GithubSettings, SettingsStore, WeatherSettings};

/// Prints the forecast slots for the first day of the report
fn render_weather(report: &WeatherReport) {
    println!("{} ({})", report.area_name, report.location);

    let Some(today) = report.days.first() else {
        println!("  no forecast available");
        return;
    };
    let current = report.slot_at(Local::now().time());

    for hour in &today.hours {
        let marker = if current == Some(hour) { ">" } else { " " };
        println!(
            "{} {}  {}  {:>5}  {:>3}%  {}",
            marker,
            hour.time.format("%H:%M"),
            hour.condition().emoji(),
            report.format_temperature(hour.temperature),
            hour.humidity,
            hour.description
        );
    }
}

/// Prints the profile summary, honoring the GitHub section's display toggles
fn render_github(data: &GithubData, settings: &GithubSettings) {
    let user = &data.user;
    if settings.show_user_info {
        match &user.name {
            Some(name) => println!("{} ({})", name, user.login),
            None => println!("{}", user.login),
        }
        println!(
            "  followers {}  following {}  public repos {}",
            user.followers, user.following, user.public_repos
        );
    }
    if settings.show_stats {
        println!(
            "  stars {}  commits {}",
            data.total_stars(),
            data.total_commits()
        );
    }
    if settings.show_language_stats {
        let languages = data.top_languages(5, &settings.excluded_languages);
        if !languages.is_empty() {
            let listed: Vec<String> = languages
                .iter()
                .map(|(lang, repos)| format!("{} ({})", lang, repos))
                .collect();
            println!("  languages {}", listed.join(", "));
        }
    }
    if settings.show_commit_activity {
        for (quarter, commits) in data.quarter_commit_count.iter().rev().take(4) {
            println!("  {}  {}", quarter, commits);
        }
    }
}

fn run_settings(store: &mut SettingsStore, action: SettingsCommand) -> Result<(), Box<dyn Error>> {
    match action {
        SettingsCommand::Show { section: None } | SettingsCommand::Export => {
            println!("{}", store.export_json());
        }
        SettingsCommand::Show {
            section: Some(section),
        } => match store.document().get(section) {
            Some(value) => println!("{:#}", value),
            None => println!("null"),
        },
        SettingsCommand::Import { file } => {
            let text = fs::read_to_string(&file)?;
            store.import_json(&text)?;
            println!("Imported settings from {}", file.display());
        }
        SettingsCommand::Set {
            section,
            field,
            value,
        } => {
            let document = store.update_setting(section, &field, parse_setting_value(&value))?;
            if let Some(value) = document.get(section) {
                println!("{:#}", value);
            }
        }
        SettingsCommand::Reset { section: Some(section) } => {
            store.reset_section(section)?;
            println!("Reset {} settings", section);
        }
        SettingsCommand::Reset { section: None } => {
            store.reset_all()?;
            println!("Reset all settings");
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut store = SettingsStore::open(Arc::new(cli.settings_storage()?));
    if let Err(e) = store.adopt_legacy_keys() {
        log::warn!("could not adopt legacy settings: {}", e);
    }

    let cache = CacheManager::new(Arc::new(cli.cache_storage()?));

    match cli.command {
        Command::Settings { action } => run_settings(&mut store, action)?,
        Command::Weather { location, scale } => {
            let mut settings: WeatherSettings = store.section();
            if let Some(location) = location {
                settings.location = location;
            }
            if let Some(scale) = scale {
                settings.temp_scale = scale;
            }
            let report = WeatherClient::new().fetch_cached(&cache, &settings).await?;
            render_weather(&report);
        }
        Command::Github { username } => {
            let mut settings: GithubSettings = store.section();
            if let Some(username) = username {
                settings.username = username;
            }
            let data = GithubClient::new().fetch_cached(&cache, &settings).await?;
            render_github(&data, &settings);
        }
        Command::Dashboard => {
            let weather_settings: WeatherSettings = store.section();
            let github_settings: GithubSettings = store.section();
            let weather_client = WeatherClient::new();
            let github_client = GithubClient::new();

            let (weather, github) = futures::join!(
                weather_client.fetch_cached(&cache, &weather_settings),
                github_client.fetch_cached(&cache, &github_settings)
            );

            let mut failures = 0;
            match weather {
                Ok(report) => render_weather(&report),
                Err(e) => {
                    failures += 1;
                    eprintln!("weather: {}", e);
                }
            }
            println!();
            match github {
                Ok(data) => render_github(&data, &github_settings),
                Err(e) => {
                    failures += 1;
                    eprintln!("github: {}", e);
                }
            }
            if failures == 2 {
                return Err("no widget data could be loaded".into());
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("devtab: {}", e);
            ExitCode::FAILURE
        }
    }
}
