// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use theme_switch::{
    config::Settings,
    path::{default_settings_path, Environment},
    registry::{ThemeId, UnknownTheme},
    switcher::{SwitchError, Switcher},
    template,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::Select;
use std::{fs, path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "\n  theme [options] <theme>\n  theme [options] <command>",
    subcommand_help_heading = "Commands",
    args_conflicts_with_subcommands = true,
    arg_required_else_help = true,
    version
)]
struct Cli {
    /// Theme to apply.
    #[arg(value_name = "theme")]
    pub identifier: Option<String>,

    /// Path to settings file.
    #[arg(short, long, global = true, value_name = "path")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    fn run(self) -> Result<()> {
        // INVARIANT: Reject unknown themes before settings can fail to load.
        if let Some(identifier) = self.requested_theme() {
            identifier.parse::<ThemeId>()?;
        }

        let settings = load_settings(self.settings)?;
        let env = Environment::try_from_process()?;

        match (self.command, self.identifier) {
            (Some(Command::List), _) => run_list(),
            (Some(Command::Status), _) => run_status(&settings, env),
            (Some(Command::Render(opts)), _) => run_render(opts, &settings, env),
            (Some(Command::Pick), _) => run_pick(&settings, env),
            (None, Some(identifier)) => run_apply(&identifier, &settings, env),
            (None, None) => Ok(()),
        }
    }

    fn requested_theme(&self) -> Option<&str> {
        match (&self.command, &self.identifier) {
            (Some(Command::Render(opts)), _) => Some(opts.identifier.as_str()),
            (None, Some(identifier)) => Some(identifier.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List supported themes.
    #[command(override_usage = "theme list [options]")]
    List,

    /// Show which themes are active in each target file.
    #[command(override_usage = "theme status [options]")]
    Status,

    /// Render template file with attribute values of a theme.
    #[command(override_usage = "theme render [options] <theme> <template>")]
    Render(RenderOptions),

    /// Select theme to apply from an interactive menu.
    #[command(override_usage = "theme pick [options]")]
    Pick,
}

#[derive(Parser, Clone, Debug)]
#[command(author, about, long_about)]
struct RenderOptions {
    /// Theme to take attribute values from.
    #[arg(required = true, value_name = "theme")]
    pub identifier: String,

    /// Path to template file.
    #[arg(required = true, value_name = "template")]
    pub template: PathBuf,

    /// Write rendered text to file instead of standard output.
    #[arg(short, long, value_name = "path")]
    pub output: Option<PathBuf>,
}

fn main() {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false)
        .with_timer(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        if let Some(unknown) = unknown_theme(&error) {
            println!("{unknown}");
        } else {
            error!("{error:?}");
        }
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn unknown_theme(error: &anyhow::Error) -> Option<&UnknownTheme> {
    match error.downcast_ref::<SwitchError>() {
        Some(SwitchError::UnknownTheme(unknown)) => Some(unknown),
        _ => error.downcast_ref::<UnknownTheme>(),
    }
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings> {
    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (default_settings_path()?, false),
    };

    if !explicit && !path.exists() {
        info!("no settings at {:?}, use defaults", path.display());
        return Ok(Settings::default());
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings {:?}", path.display()))?;
    let settings = data
        .parse::<Settings>()
        .with_context(|| format!("invalid settings {:?}", path.display()))?;

    Ok(settings)
}

fn run_apply(identifier: &str, settings: &Settings, env: Environment) -> Result<()> {
    let mut switcher = Switcher::new(settings, env);
    let report = switcher.apply(identifier)?;

    if !report.notices.is_empty() {
        warn!(
            "applied {} with {} warning(s)",
            report.theme,
            report.notices.len()
        );
    } else {
        info!("applied {}", report.theme);
    }

    Ok(())
}

fn run_list() -> Result<()> {
    for id in ThemeId::ALL {
        println!("{id}");
    }

    Ok(())
}

fn run_status(settings: &Settings, env: Environment) -> Result<()> {
    let switcher = Switcher::new(settings, env);
    for entry in switcher.status()? {
        let active = match entry.active {
            Some(active) if active.is_empty() => "none".to_string(),
            Some(active) => active
                .iter()
                .map(ThemeId::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            None => "missing".to_string(),
        };
        println!("{:<12} {:<10} {}", entry.surface.as_str(), active, entry.path.display());
    }

    Ok(())
}

fn run_render(opts: RenderOptions, settings: &Settings, env: Environment) -> Result<()> {
    let switcher = Switcher::new(settings, env.clone());
    let theme = switcher.registry().lookup(&opts.identifier)?;
    let text = fs::read_to_string(&opts.template)
        .with_context(|| format!("failed to read template {:?}", opts.template.display()))?;
    let rendered = template::render(&text, &template::theme_variables(theme, &env));

    match opts.output {
        Some(path) => fs::write(&path, rendered)
            .with_context(|| format!("failed to write {:?}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(())
}

fn run_pick(settings: &Settings, env: Environment) -> Result<()> {
    let choice = Select::new("Theme to apply:", ThemeId::ALL.to_vec()).prompt()?;
    run_apply(choice.as_str(), settings, env)
}
