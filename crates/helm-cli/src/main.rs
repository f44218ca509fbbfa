use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tracing::{info, warn};

use helm_geo::SectorPolicy;
use helm_nav::{doctor as nav_doctor, runtime, DisplayState, NavFix, NavigationController, Waypoint};
use helm_nav::{FileTrigger, FixSource, StaticWaypoint};
use helm_proto::{FixSample, WaypointMsg};

#[derive(Debug, Parser)]
#[command(name = "helmnav", version, about = "helmnav - helmet navigation direction & trigger engine")]
struct Cli {
    #[arg(long)]
    config: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Doctor,
    Run,
    /// One-shot direction computation against the configured waypoint.
    Direction {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lon: f64,
        #[arg(long)]
        heading: f64,
    },
}

#[derive(Debug, serde::Deserialize)]
struct Config {
    waypoint: WaypointCfg,
    nav: NavCfg,
    trigger: TriggerCfg,
    fix: FixCfg,
}

#[derive(Debug, serde::Deserialize)]
struct WaypointCfg {
    latitude: f64,
    longitude: f64,
    set_by: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct NavCfg {
    arrival_radius_m: Option<f64>,
    policy: SectorPolicy,
    fix_interval_ms: Option<u64>,
    call_timeout_ms: Option<u64>,
}

#[derive(Debug, serde::Deserialize)]
struct TriggerCfg {
    variable_name: String,
    poll_interval_ms: Option<u64>,
    debounce_ms: Option<u64>,
    state_file: String,
    triggered_by: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct FixCfg {
    source: String,
    replay_file: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    azimuth: Option<f64>,
}

fn load_config(path: &str) -> Result<Config> {
    let s = std::fs::read_to_string(path).context("read config")?;
    Ok(toml::from_str(&s).context("parse config toml")?)
}

fn runtime_config(cfg: &Config) -> runtime::RuntimeConfig {
    let mut rc = runtime::RuntimeConfig::default_for(
        cfg.trigger.variable_name.clone(),
        cfg.trigger.triggered_by.clone().unwrap_or_else(|| "helmnav".to_string()),
    );
    if let Some(ms) = cfg.nav.fix_interval_ms {
        rc.fix_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = cfg.trigger.poll_interval_ms {
        rc.poll_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = cfg.trigger.debounce_ms {
        rc.debounce_window = Duration::from_millis(ms);
    }
    if let Some(ms) = cfg.nav.call_timeout_ms {
        rc.call_timeout = Duration::from_millis(ms);
    }
    rc
}

fn build_controller(cfg: &Config) -> NavigationController {
    let set_by = cfg.waypoint.set_by.clone().unwrap_or_else(|| "config".to_string());
    NavigationController::new(
        Waypoint::new(cfg.waypoint.latitude, cfg.waypoint.longitude, set_by),
        cfg.nav.policy,
        cfg.nav.arrival_radius_m.unwrap_or(helm_geo::DEFAULT_ARRIVAL_RADIUS_M),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    match cli.cmd {
        Command::Doctor => doctor(&cfg)?,
        Command::Run => run(&cfg).await?,
        Command::Direction { lat, lon, heading } => direction(&cfg, lat, lon, heading)?,
    }
    Ok(())
}

fn doctor(cfg: &Config) -> Result<()> {
    info!("doctor: starting");

    nav_doctor::check_waypoint(cfg.waypoint.latitude, cfg.waypoint.longitude)?;
    nav_doctor::check_arrival_radius(
        cfg.nav.arrival_radius_m.unwrap_or(helm_geo::DEFAULT_ARRIVAL_RADIUS_M),
    )?;
    let rc = runtime_config(cfg);
    nav_doctor::check_timing(
        rc.fix_interval.as_millis() as u64,
        rc.poll_interval.as_millis() as u64,
        rc.debounce_window.as_millis() as u64,
        rc.call_timeout.as_millis() as u64,
    )?;
    nav_doctor::check_trigger_variable(&cfg.trigger.variable_name)?;
    if cfg.fix.source == "replay" {
        let path = cfg.fix.replay_file.as_ref().context("fix.replay_file missing")?;
        nav_doctor::check_replay_file(path)?;
    }

    info!("doctor: OK");
    Ok(())
}

fn direction(cfg: &Config, lat: f64, lon: f64, heading: f64) -> Result<()> {
    let controller = build_controller(cfg);
    let fix = NavFix::try_from(FixSample {
        latitude: lat,
        longitude: lon,
        azimuth: Some(heading),
        timestamp: 0,
    })?;
    let report = controller.compute(&fix).to_report();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run(cfg: &Config) -> Result<()> {
    info!("run: starting");

    let fixes = match cfg.fix.source.as_str() {
        "replay" => {
            let path = cfg.fix.replay_file.as_ref().context("fix.replay_file missing")?;
            FixSource::replay(path).await?
        }
        "static" => FixSource::fixed(FixSample {
            latitude: cfg.fix.latitude.context("fix.latitude missing")?,
            longitude: cfg.fix.longitude.context("fix.longitude missing")?,
            azimuth: cfg.fix.azimuth,
            timestamp: 0,
        }),
        other => anyhow::bail!("unknown fix.source: {}", other),
    };

    let waypoints = StaticWaypoint(WaypointMsg {
        latitude: cfg.waypoint.latitude,
        longitude: cfg.waypoint.longitude,
        set_by: cfg.waypoint.set_by.clone(),
    });
    let trigger = FileTrigger::new(cfg.trigger.state_file.clone(), cfg.trigger.variable_name.clone());

    let rc = runtime_config(cfg);
    let controller = build_controller(cfg);

    let (button_tx, button_rx) = mpsc::channel(16);
    let (display_tx, display_rx) = mpsc::channel(16);

    tokio::spawn(stdin_buttons(button_tx, rc.debounce_window));
    tokio::spawn(print_display(display_rx));

    runtime::run(rc, controller, fixes, waypoints, trigger, button_rx, display_tx).await
}

/// Keyboard stand-in for the helmet button: each `press` line becomes a
/// settled low-then-high level pair on the raw button channel.
async fn stdin_buttons(tx: mpsc::Sender<bool>, debounce: Duration) {
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => return,
            Err(e) => {
                warn!("stdin read failed: {:#}", e);
                return;
            }
        };
        match line.trim() {
            "" => {}
            "press" | "p" => {
                if tx.send(false).await.is_err() {
                    return;
                }
                tokio::time::sleep(debounce * 2).await;
                if tx.send(true).await.is_err() {
                    return;
                }
            }
            other => warn!("unknown command: {} (try: press)", other),
        }
    }
}

async fn print_display(mut rx: mpsc::Receiver<DisplayState>) {
    let mut last = String::new();
    while let Some(state) = rx.recv().await {
        let line = render(&state);
        if line != last {
            println!("{}", line);
            last = line;
        }
    }
}

fn render(state: &DisplayState) -> String {
    match state {
        DisplayState::Idle => "IDLE".to_string(),
        DisplayState::Waiting(reason) => format!("WAIT: {}", reason),
        DisplayState::Navigating(c) => format!(
            "{}  {:.0} m  (bearing {:.0}, off by {:+.0})",
            c.direction, c.distance_m, c.bearing_deg, c.heading_diff_deg
        ),
        DisplayState::Arrived(c) => format!("ARRIVED  ({:.1} m)", c.distance_m),
    }
}
