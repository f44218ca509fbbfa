//! External collaborator seams and their file-backed reference
//! implementations.
//!
//! The engine only ever sees the traits; transport (HTTP, serial, BLE) lives
//! with the deployment. The file implementations exist for bench runs and
//! tests: a JSON-lines fix replay, a static waypoint, and a JSON state file
//! standing in for the remote trigger variable store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use helm_proto::{FixSample, TriggerPush, WaypointMsg};

pub trait FixProvider {
    async fn fetch_fix(&mut self) -> Result<FixSample>;
}

pub trait WaypointSource {
    async fn fetch_waypoint(&mut self) -> Result<WaypointMsg>;
}

pub trait TriggerEndpoint {
    /// Fetch the raw poll object; the caller applies the key fallback chain.
    async fn poll(&mut self) -> Result<Value>;
    /// Best-effort state write toward the remote side.
    async fn push(&mut self, push: &TriggerPush) -> Result<()>;
}

// ---- fix sources ----

pub enum FixSource {
    /// JSON-lines file, one `FixSample` per line; rewinds at EOF.
    Replay {
        path: PathBuf,
        reader: BufReader<fs::File>,
    },
    /// Fixed sample, returned every fetch.
    Static(FixSample),
}

impl FixSource {
    pub async fn replay(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let f = fs::File::open(&path)
            .await
            .with_context(|| format!("open fix replay {}", path.display()))?;
        Ok(Self::Replay {
            path,
            reader: BufReader::new(f),
        })
    }

    pub fn fixed(sample: FixSample) -> Self {
        Self::Static(sample)
    }
}

impl FixProvider for FixSource {
    async fn fetch_fix(&mut self) -> Result<FixSample> {
        match self {
            FixSource::Static(s) => Ok(s.clone()),
            FixSource::Replay { path, reader } => {
                let mut line = String::new();
                loop {
                    line.clear();
                    let n = reader.read_line(&mut line).await?;
                    if n == 0 {
                        // EOF: rewind and keep replaying
                        debug!("fix replay: rewind {}", path.display());
                        let f = fs::File::open(&*path)
                            .await
                            .with_context(|| format!("reopen fix replay {}", path.display()))?;
                        *reader = BufReader::new(f);
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                        continue;
                    }
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return serde_json::from_str(trimmed)
                        .with_context(|| format!("parse fix line: {}", trimmed));
                }
            }
        }
    }
}

// ---- waypoint source ----

/// Waypoint fixed at startup (typically from the config file).
#[derive(Debug, Clone)]
pub struct StaticWaypoint(pub WaypointMsg);

impl WaypointSource for StaticWaypoint {
    async fn fetch_waypoint(&mut self) -> Result<WaypointMsg> {
        Ok(self.0.clone())
    }
}

// ---- trigger endpoint ----

/// Trigger variable store backed by a JSON state file, shaped like the
/// backend's `{"variables": {"<name>": {"triggered": ..}}}` document.
#[derive(Debug, Clone)]
pub struct FileTrigger {
    path: PathBuf,
    variable_name: String,
}

impl FileTrigger {
    pub fn new(path: impl Into<PathBuf>, variable_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            variable_name: variable_name.into(),
        }
    }
}

impl TriggerEndpoint for FileTrigger {
    async fn poll(&mut self) -> Result<Value> {
        let bytes = match fs::read(&self.path).await {
            Ok(b) => b,
            // Variable never set: the backend answers "triggered: false" for
            // unknown variables, so a missing file is not an error.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(json!({ "triggered": false }));
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read trigger state {}", self.path.display()))
            }
        };
        let root: Value = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse trigger state {}", self.path.display()))?;
        // Per-variable object when nested, else the root itself.
        let v = root
            .get("variables")
            .and_then(|m| m.get(&self.variable_name))
            .cloned()
            .unwrap_or(root);
        Ok(v)
    }

    async fn push(&mut self, push: &TriggerPush) -> Result<()> {
        let mut root: serde_json::Map<String, Value> = match fs::read(&self.path).await {
            Ok(b) => serde_json::from_slice::<Value>(&b)
                .ok()
                .and_then(|v| v.as_object().cloned())
                .unwrap_or_default(),
            Err(_) => Default::default(),
        };
        let vars = root
            .entry("variables".to_string())
            .or_insert_with(|| json!({}));
        if !vars.is_object() {
            *vars = json!({});
        }
        vars[push.variable_name.as_str()] = json!({
            "triggered": push.triggered,
            "timestamp": OffsetDateTime::now_utc().unix_timestamp(),
            "triggered_by": push.triggered_by,
        });
        let out = serde_json::to_vec_pretty(&Value::Object(root))?;
        fs::write(&self.path, out)
            .await
            .with_context(|| format!("write trigger state {}", self.path.display()))?;
        debug!(
            variable = %push.variable_name,
            triggered = push.triggered,
            "trigger state pushed"
        );
        Ok(())
    }
}
