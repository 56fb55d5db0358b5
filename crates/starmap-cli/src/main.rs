//! Starmap CLI - headless driver for the intel map tracker.
//!
//! - `starmap route` - shortest route between two systems
//! - `starmap alerts` - feed intel reports and print the resulting alert state
//! - `starmap config` - show the effective configuration

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use starmap_core::{LocationId, LocationRecord, Tracker, TrackerConfig, TriggerCheck};
use starmap_nav::LocationGraph;

#[derive(Parser)]
#[command(name = "starmap")]
#[command(about = "Intel map route and alert tracker", version)]
struct Cli {
    /// Directory containing .starmap/config.yaml
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the shortest route between two systems
    Route {
        /// JSON file with location records
        #[arg(long)]
        map: PathBuf,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        /// Systems to route around (repeatable)
        #[arg(long)]
        block: Vec<String>,
    },

    /// Report intel in the given systems and print the alert state
    Alerts {
        /// JSON file with location records
        #[arg(long)]
        map: PathBuf,

        /// Home system (overrides the configured one)
        #[arg(long)]
        home: Option<String>,

        /// Character location as NAME=SYSTEM (repeatable)
        #[arg(long = "character", value_parser = parse_character)]
        characters: Vec<(String, String)>,

        /// Systems to report, in order
        #[arg(required = true)]
        systems: Vec<String>,
    },

    /// Print the effective configuration as YAML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let root = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let config = TrackerConfig::load_from_dir(&root)?;

    match cli.command {
        Commands::Route {
            map,
            from,
            to,
            block,
        } => show_route(&map, &config, &from, &to, &block),
        Commands::Alerts {
            map,
            home,
            characters,
            systems,
        } => report_alerts(&map, config, home, &characters, &systems),
        Commands::Config => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

fn parse_character(arg: &str) -> std::result::Result<(String, String), String> {
    arg.split_once('=')
        .map(|(name, system)| (name.trim().to_string(), system.trim().to_string()))
        .filter(|(name, system)| !name.is_empty() && !system.is_empty())
        .ok_or_else(|| format!("expected NAME=SYSTEM, got '{arg}'"))
}

fn read_map(path: &Path) -> Result<Vec<LocationRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read map from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse map from {}", path.display()))
}

fn load_tracker(map: &Path, config: &TrackerConfig) -> Result<Tracker> {
    let mut tracker = Tracker::new(config);
    if !tracker.load_graph(read_map(map)?) {
        bail!("No usable locations in {}", map.display());
    }
    tracker.apply_config(config)?;
    Ok(tracker)
}

fn lookup(graph: &LocationGraph, name: &str) -> Result<LocationId> {
    graph
        .find_by_name(name)
        .with_context(|| format!("Unknown system '{name}'"))
}

fn system_name(tracker: &Tracker, id: LocationId) -> String {
    tracker
        .graph()
        .and_then(|graph| graph.get(id))
        .map(|location| location.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn show_route(
    map: &Path,
    config: &TrackerConfig,
    from: &str,
    to: &str,
    block: &[String],
) -> Result<()> {
    let tracker = load_tracker(map, config)?;
    let graph = tracker.graph().context("Map not loaded")?;

    for name in block {
        graph.set_blocked(lookup(graph, name)?, true);
    }
    let origin = lookup(graph, from)?;
    let destination = lookup(graph, to)?;

    let path = tracker
        .find_path(origin, destination)
        .context("Route endpoints not in map")?;
    if path.is_unreachable() {
        println!("No route from {from} to {to}");
        return Ok(());
    }

    let names: Vec<String> = path
        .systems
        .iter()
        .map(|&id| system_name(&tracker, id))
        .collect();
    println!("{} jumps: {}", path.total_jumps, names.join(" -> "));
    Ok(())
}

fn report_alerts(
    map: &Path,
    config: TrackerConfig,
    home: Option<String>,
    characters: &[(String, String)],
    systems: &[String],
) -> Result<()> {
    let mut tracker = load_tracker(map, &config)?;
    let graph = std::sync::Arc::clone(tracker.graph().context("Map not loaded")?);

    if let Some(name) = home {
        tracker.set_home(lookup(&graph, &name)?);
    }

    let mut roster = BTreeMap::new();
    for (name, system) in characters {
        roster.insert(name.clone(), lookup(&graph, system)?);
    }
    // Only one character location is tracked; the roster is for triggers.
    if let Some(&location) = roster.values().next() {
        tracker.set_character_location(location);
    }

    let mut reported = Vec::with_capacity(systems.len());
    for name in systems {
        let id = lookup(&graph, name)?;
        let outcome = tracker.add_alert(id);
        for evicted in outcome.evicted {
            tracing::info!(system = %system_name(&tracker, evicted), "Alert evicted");
        }
        reported.push(id);
    }

    let tick = Duration::from_millis(config.path_tick_ms.max(1));
    let mut pending: Vec<(LocationId, usize)> = reported
        .iter()
        .flat_map(|&target| (0..config.triggers.len()).map(move |index| (target, index)))
        .collect();
    while !pending.is_empty() {
        wait_for_paths(&mut tracker, tick);

        let mut waiting = Vec::new();
        for (target, index) in pending {
            let trigger = &config.triggers[index];
            match tracker.evaluate_trigger(trigger, target, &roster) {
                TriggerCheck::Fired { from, jumps } => println!(
                    "[{}] {} is {} jumps from {}",
                    trigger.name,
                    system_name(&tracker, target),
                    jumps,
                    system_name(&tracker, from)
                ),
                TriggerCheck::Pending => waiting.push((target, index)),
                TriggerCheck::NotFired | TriggerCheck::Unresolved => {}
            }
        }
        pending = waiting;
    }
    wait_for_paths(&mut tracker, tick);

    println!("Alerting systems:");
    let red: Vec<LocationId> = tracker.ledger().red().collect();
    for id in red.iter().rev() {
        let reports = tracker
            .get_stats(*id)
            .map(|stat| stat.report_count)
            .unwrap_or(0);
        let jumps = tracker
            .home()
            .and_then(|home| tracker.jumps_between(home, *id))
            .map(|jumps| format!("{jumps} jumps from home"))
            .unwrap_or_else(|| "no route from home".to_string());
        println!("  {} ({reports} reports, {jumps})", system_name(&tracker, *id));
    }

    let summary = tracker.rebuild_summary_if_stale().clone();
    println!("Marker summary ({} of {}):", summary.len(), red.len());
    for (id, size, _) in summary.entries() {
        println!("  {} size={size:.1}", system_name(&tracker, id));
    }
    Ok(())
}

/// Pump the path queue on the configured tick until it goes idle.
fn wait_for_paths(tracker: &mut Tracker, tick: Duration) {
    while tracker.is_processing_paths() {
        tracker.pump_path_queue();
        if tracker.is_processing_paths() {
            std::thread::sleep(tick);
        }
    }
}
