//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/desktopd/config.json`.
//! Every field is optional; a minimal `{}` file is valid and all sections
//! fall back to their compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "desktops": {
//!     "count": 4,
//!     "names": ["web", "code", "chat"],
//!     "startup_desktop": 0
//!   },
//!   "headless": {
//!     "monitors": [
//!       { "x": 0, "y": 0, "width": 1920, "height": 1080 },
//!       { "x": 1920, "y": 0, "width": 1280, "height": 1024 }
//!     ],
//!     "dock_strut": { "bottom": 32 },
//!     "windows": [
//!       { "id": 1, "kind": "Desktop", "desktop": "All" },
//!       { "id": 2, "desktop": { "Index": 0 }, "strut": { "top": 24 } }
//!     ],
//!     "hint_file": "/tmp/desktopd-hints.json"
//!   }
//! }
//! ```

use crate::desktop::DesktopId;
use crate::geometry::{Rect, Strut};
use crate::traits::WindowKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Desktop count, names and the desktop to start on.
    #[serde(default)]
    pub desktops: DesktopsConfig,

    /// Scene and hint storage for the headless window system.
    #[serde(default)]
    pub headless: HeadlessConfig,
}

/// Desktop settings applied at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopsConfig {
    /// Number of desktops.  Zero is treated as one.
    pub count: usize,
    /// Names for the first desktops; the rest are left unnamed.
    pub names: Vec<String>,
    /// Desktop to show first.  Falls back to 0 when out of range.
    pub startup_desktop: usize,
}

impl Default for DesktopsConfig {
    fn default() -> Self {
        Self {
            count: 4,
            names: Vec::new(),
            startup_desktop: 0,
        }
    }
}

/// A window pre-populated into the headless window system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub id: u32,
    #[serde(default = "default_window_desktop")]
    pub desktop: DesktopId,
    #[serde(default)]
    pub kind: WindowKind,
    #[serde(default)]
    pub strut: Strut,
    #[serde(default)]
    pub minimized: bool,
}

fn default_window_desktop() -> DesktopId {
    DesktopId::Index(0)
}

/// Headless window-system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// Screen number reported in log lines and errors.
    pub screen: u32,
    /// Physical monitors, in order.
    pub monitors: Vec<Rect>,
    /// Space reserved by the dock.
    pub dock_strut: Strut,
    /// Managed windows, top of the stack first.
    pub windows: Vec<WindowSpec>,
    /// Where published hints are stored.  Defaults to
    /// `$XDG_RUNTIME_DIR/desktopd-hints.json`.
    pub hint_file: Option<PathBuf>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            screen: 0,
            monitors: vec![Rect::new(0, 0, 1920, 1080)],
            dock_strut: Strut::default(),
            windows: Vec::new(),
            hint_file: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
