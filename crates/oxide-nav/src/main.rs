//! oxide-nav CLI
//!
//! Command-line tool for inspecting route tables and replaying navigation.

use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_nav::prelude::*;
use oxide_route::{expand_optionals, resolve_path, score_route};

/// Route matching and navigation history tools.
#[derive(Parser)]
#[command(name = "oxide-nav")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the route a location selects, as JSON.
    Match {
        /// Router configuration file.
        #[arg(short, long, env = "OXIDE_NAV_CONFIG")]
        config: PathBuf,

        /// Location to match.
        location: String,
    },

    /// Resolve a path against a base and an optional current location.
    Resolve {
        /// Router base path.
        #[arg(short, long, default_value = "")]
        base: String,

        /// Location to resolve relative paths against.
        #[arg(short, long)]
        from: Option<String>,

        /// Path to resolve.
        path: String,
    },

    /// Print the optional-segment expansions of patterns with their scores.
    Expand {
        /// Route patterns.
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Drive an in-memory history through a sequence of steps.
    Replay {
        /// Router configuration file.
        #[arg(short, long, env = "OXIDE_NAV_CONFIG")]
        config: PathBuf,

        /// Refuse every backward traversal.
        #[arg(long)]
        block_back: bool,

        /// Steps: push:PATH, replace:PATH, go:N, back, forward, retry, retry!
        #[arg(required = true)]
        steps: Vec<Step>,
    },
}

/// One replay step.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Push(String),
    Replace(String),
    Go(isize),
    Back,
    Forward,
    Retry { force: bool },
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("push", path)) => Ok(Self::Push(path.to_string())),
            Some(("replace", path)) => Ok(Self::Replace(path.to_string())),
            Some(("go", delta)) => delta
                .parse()
                .map(Self::Go)
                .map_err(|e| format!("invalid delta '{delta}': {e}")),
            Some((kind, _)) => Err(format!("unknown step '{kind}'")),
            None => match s {
                "back" => Ok(Self::Back),
                "forward" => Ok(Self::Forward),
                "retry" => Ok(Self::Retry { force: false }),
                "retry!" => Ok(Self::Retry { force: true }),
                _ => Err(format!("unknown step '{s}'")),
            },
        }
    }
}

fn describe(outcome: &NavigationOutcome) -> String {
    match outcome {
        NavigationOutcome::Committed(_) => "committed".to_string(),
        NavigationOutcome::Blocked => "blocked".to_string(),
        NavigationOutcome::Unchanged => "unchanged".to_string(),
        NavigationOutcome::External(url) => format!("external {url}"),
        NavigationOutcome::Traversed(delta) => format!("traversed {delta}"),
    }
}

fn run_step(router: &Router, step: &Step) -> anyhow::Result<String> {
    let note = match step {
        Step::Push(path) => describe(&router.navigate(path, NavigateOptions::default())?),
        Step::Replace(path) => describe(
            &router.navigate(path, NavigateOptions::default().replace(true))?,
        ),
        Step::Go(delta) => {
            router.go(*delta)?;
            format!("go {delta}")
        }
        Step::Back => {
            router.back()?;
            "back".to_string()
        }
        Step::Forward => {
            router.forward()?;
            "forward".to_string()
        }
        Step::Retry { force } => router
            .retry(*force)?
            .map_or_else(|| "nothing to retry".to_string(), |outcome| describe(&outcome)),
    };
    Ok(note)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Match { config, location } => {
            let config = RouterConfig::from_file(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let table = RouteTable::new(&config.base, config.route_definitions()?)?;

            let Some(m) = table.match_path(&location) else {
                bail!("no route matches '{location}'");
            };
            let levels: Vec<_> = m
                .matches()
                .iter()
                .map(|level| {
                    json!({
                        "pattern": level.route.pattern,
                        "path": level.path,
                        "params": level.params,
                    })
                })
                .collect();
            let report = json!({
                "name": m.name(),
                "pattern": m.pattern(),
                "path": m.best().path,
                "params": m.params(),
                "levels": levels,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Resolve { base, from, path } => {
            let resolved = resolve_path(&base, &path, from.as_deref());
            println!("{}", resolved.as_deref().unwrap_or("external"));
        }

        Commands::Expand { patterns } => {
            for pattern in &patterns {
                println!("{pattern}");
                for expansion in expand_optionals(pattern) {
                    println!("  {:>4}  {expansion}", score_route(&expansion));
                }
            }
        }

        Commands::Replay {
            config,
            block_back,
            steps,
        } => {
            let config = RouterConfig::from_file(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let history = Rc::new(MemoryHistory::new());
            let router = Router::new(history.clone(), &config)?;

            let _guard = block_back.then(|| {
                router.on_before_leave(|event| {
                    if event.delta().is_some() {
                        info!(from = %event.from().value, "Backward navigation refused");
                        event.prevent_default();
                    }
                })
            });

            println!("{:>3}  {:<24} start", router.depth(), router.location().value);
            for step in &steps {
                let note = run_step(&router, step)?;
                println!(
                    "{:>3}  {:<24} {note}",
                    router.depth(),
                    router.location().value
                );
            }
            println!("entries: {}", history.entries().join(" "));
            router.dispose();
        }
    }

    Ok(())
}
