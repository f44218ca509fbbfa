//! Tick scheduling around the navigation core.
//!
//! One owner task holds all mutable state, driven by three named timers plus
//! the button event channel:
//!
//! - `fix_timer`: the navigation tick (activation check, fix fetch, geo
//!   pipeline, display update).
//! - `poll_timer`: remote trigger poll.
//! - `debounce_timer`: re-evaluates the pending raw button level so a settled
//!   press is accepted even when no further raw edges arrive.
//!
//! Every external call is wrapped in a timeout; a timed-out or failed call
//! leaves stale state in place and the next scheduled tick is the retry.
//! Observable ordering is fixed: debounce, then local trigger, then remote
//! push, then display update.

use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use helm_proto::{extract_triggered, TriggerPush};
use helm_trigger::{Debouncer, Edge};

use crate::controller::{DisplayState, FixInput, NavigationController, TriggerSync, Waypoint};
use crate::fix::NavFix;
use crate::sources::{FixProvider, TriggerEndpoint, WaypointSource};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub fix_interval: Duration,
    pub poll_interval: Duration,
    pub debounce_window: Duration,
    pub call_timeout: Duration,
    /// Remote trigger variable this device is keyed on.
    pub variable_name: String,
    /// Identity reported on pushes.
    pub triggered_by: String,
}

impl RuntimeConfig {
    pub fn default_for(variable_name: impl Into<String>, triggered_by: impl Into<String>) -> Self {
        Self {
            fix_interval: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(1000),
            debounce_window: Duration::from_millis(50),
            call_timeout: Duration::from_millis(2000),
            variable_name: variable_name.into(),
            triggered_by: triggered_by.into(),
        }
    }
}

/// Run the engine until shutdown (ctrl-c) or until the display consumer goes
/// away. `button_rx` carries raw (undebounced) button levels, true = high.
pub async fn run<F, W, T>(
    cfg: RuntimeConfig,
    mut controller: NavigationController,
    mut fixes: F,
    mut waypoints: W,
    mut trigger: T,
    mut button_rx: mpsc::Receiver<bool>,
    display_tx: mpsc::Sender<DisplayState>,
) -> Result<()>
where
    F: FixProvider,
    W: WaypointSource,
    T: TriggerEndpoint,
{
    let mut debouncer = Debouncer::new(cfg.debounce_window);

    let mut fix_timer = interval(cfg.fix_interval);
    let mut poll_timer = interval(cfg.poll_interval);
    let mut debounce_timer = interval((cfg.debounce_window / 2).max(Duration::from_millis(5)));
    fix_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    poll_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debounce_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(
        variable = %cfg.variable_name,
        fix_interval_ms = cfg.fix_interval.as_millis() as u64,
        poll_interval_ms = cfg.poll_interval.as_millis() as u64,
        "navigation runtime started"
    );

    loop {
        tokio::select! {
            Some(level) = button_rx.recv() => {
                if debouncer.sample(level, Instant::now()) == Some(Edge::Falling) {
                    controller.on_press();
                }
            }

            _ = debounce_timer.tick() => {
                if debouncer.poll(Instant::now()) == Some(Edge::Falling) {
                    controller.on_press();
                }
            }

            _ = poll_timer.tick() => {
                match timeout(cfg.call_timeout, trigger.poll()).await {
                    Ok(Ok(value)) => {
                        let flag = extract_triggered(&value, &cfg.variable_name);
                        debug!(flag, "remote trigger polled");
                        controller.on_remote_poll(flag);
                    }
                    // Stale flag kept in both cases; next poll is the retry.
                    Ok(Err(e)) => warn!("trigger poll failed: {:#}", e),
                    Err(_) => warn!("trigger poll timed out"),
                }
            }

            _ = fix_timer.tick() => {
                let pre = controller.pre_tick();
                if let Some(sync) = pre.sync {
                    push_sync(&mut trigger, &cfg, sync).await;
                }

                let display = if !pre.active {
                    DisplayState::Idle
                } else {
                    refresh_waypoint(&mut controller, &mut waypoints, &cfg).await;

                    let input = match timeout(cfg.call_timeout, fixes.fetch_fix()).await {
                        Ok(Ok(sample)) => match NavFix::try_from(sample) {
                            Ok(f) => FixInput::Valid(f),
                            Err(e) => FixInput::Invalid(e),
                        },
                        Ok(Err(e)) => {
                            warn!("fix fetch failed: {:#}", e);
                            FixInput::Unavailable
                        }
                        Err(_) => {
                            warn!("fix fetch timed out");
                            FixInput::Unavailable
                        }
                    };

                    let out = controller.navigate(input);
                    if let Some(sync) = out.sync {
                        push_sync(&mut trigger, &cfg, sync).await;
                    }
                    out.display
                };

                if display_tx.send(display).await.is_err() {
                    info!("display consumer gone; stopping runtime");
                    return Ok(());
                }
            }

            _ = &mut shutdown => {
                info!("shutdown requested");
                return Ok(());
            }
        }
    }
}

async fn refresh_waypoint<W: WaypointSource>(
    controller: &mut NavigationController,
    waypoints: &mut W,
    cfg: &RuntimeConfig,
) {
    match timeout(cfg.call_timeout, waypoints.fetch_waypoint()).await {
        Ok(Ok(msg)) => {
            let wp = controller.waypoint();
            if wp.lat != msg.latitude || wp.lon != msg.longitude {
                controller.set_waypoint(Waypoint::from_msg(msg));
            }
        }
        Ok(Err(e)) => warn!("waypoint fetch failed: {:#}", e),
        Err(_) => warn!("waypoint fetch timed out"),
    }
}

async fn push_sync<T: TriggerEndpoint>(trigger: &mut T, cfg: &RuntimeConfig, sync: TriggerSync) {
    let push = TriggerPush {
        variable_name: cfg.variable_name.clone(),
        triggered: matches!(sync, TriggerSync::Activate),
        triggered_by: cfg.triggered_by.clone(),
    };
    match timeout(cfg.call_timeout, trigger.push(&push)).await {
        Ok(Ok(())) => info!(?sync, "trigger sync pushed"),
        Ok(Err(e)) => warn!("trigger sync push failed: {:#}", e),
        Err(_) => warn!("trigger sync push timed out"),
    }
}
