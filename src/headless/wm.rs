//! In-memory [`WindowSystem`].
//!
//! The scene comes from [`HeadlessConfig`]: monitors, the dock strut and a
//! list of windows, top of the stack first.  Showing, hiding, desktop moves,
//! focus and the root cursor are all recorded so they can be inspected.

use crate::config::{HeadlessConfig, WindowSpec};
use crate::desktop::DesktopId;
use crate::geometry::{Rect, Strut};
use crate::traits::{ClientInfo, Cursor, FocusFallback, Ownership, WindowSystem};
use log::{debug, info};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

/// Window system without a display server.
pub struct HeadlessWm {
    monitors: RefCell<Vec<Rect>>,
    /// Top of the stack first.
    windows: RefCell<Vec<ClientInfo<u32>>>,
    dock: Strut,
    focused: Cell<Option<u32>>,
    cursor: Cell<Cursor>,
    /// Created by `annex` to claim the screen, removed by `release`.
    lock_file: Option<PathBuf>,
}

/// Errors produced by the headless window system.
#[derive(Debug, thiserror::Error)]
pub enum HeadlessError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no monitors configured")]
    NoMonitors,
}

impl HeadlessWm {
    /// Build the scene from `config`.  Windows start visible when they
    /// belong on `desktop`.
    pub fn new(config: &HeadlessConfig, desktop: usize) -> Self {
        let windows = config
            .windows
            .iter()
            .map(|spec| client_from_spec(spec, desktop))
            .collect();
        Self {
            monitors: RefCell::new(config.monitors.clone()),
            windows: RefCell::new(windows),
            dock: config.dock_strut,
            focused: Cell::new(None),
            cursor: Cell::new(Cursor::Pointer),
            lock_file: None,
        }
    }

    /// Claim the screen through `path` when annexing.  A second instance
    /// pointing at the same file finds the screen already managed.
    pub fn with_lock_file(mut self, path: impl AsRef<Path>) -> Self {
        self.lock_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replace the monitor layout, as on a hot-plug.
    pub fn set_monitors(&self, monitors: Vec<Rect>) {
        *self.monitors.borrow_mut() = monitors;
    }

    /// The window holding focus, if any.
    pub fn focused(&self) -> Option<u32> {
        self.focused.get()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor.get()
    }

    /// Ids of mapped windows, top first.
    pub fn visible(&self) -> Vec<u32> {
        self.windows
            .borrow()
            .iter()
            .filter(|w| w.visible)
            .map(|w| w.window)
            .collect()
    }

    fn update(&self, window: u32, f: impl FnOnce(&mut ClientInfo<u32>)) {
        if let Some(w) = self
            .windows
            .borrow_mut()
            .iter_mut()
            .find(|w| w.window == window)
        {
            f(w);
        }
    }

    fn can_focus(&self, window: u32) -> bool {
        self.windows
            .borrow()
            .iter()
            .any(|w| w.window == window && w.visible)
    }
}

fn client_from_spec(spec: &WindowSpec, desktop: usize) -> ClientInfo<u32> {
    let mut client = ClientInfo {
        window: spec.id,
        desktop: spec.desktop,
        strut: spec.strut,
        kind: spec.kind,
        minimized: spec.minimized,
        visible: false,
    };
    client.visible = client.should_show(desktop, false);
    client
}

impl WindowSystem for HeadlessWm {
    type Window = u32;
    type Error = HeadlessError;

    fn annex(&self) -> Result<Ownership, HeadlessError> {
        let Some(path) = &self.lock_file else {
            return Ok(Ownership::Acquired);
        };
        if let Ok(contents) = std::fs::read_to_string(path) {
            let pid = contents.trim().parse::<u32>().ok();
            if let Some(pid) = pid.filter(|pid| Path::new("/proc").join(pid.to_string()).exists()) {
                info!("screen held by process {}", pid);
                return Ok(Ownership::AlreadyManaged);
            }
            debug!("removing stale lock {}", path.display());
        }
        std::fs::write(path, std::process::id().to_string()).map_err(|source| {
            HeadlessError::Io {
                path: path.clone(),
                source,
            }
        })?;
        Ok(Ownership::Acquired)
    }

    fn release(&self) {
        if let Some(path) = &self.lock_file {
            let _ = std::fs::remove_file(path);
        }
    }

    fn monitors(&self) -> Result<Vec<Rect>, HeadlessError> {
        let monitors = self.monitors.borrow();
        if monitors.is_empty() {
            return Err(HeadlessError::NoMonitors);
        }
        Ok(monitors.clone())
    }

    fn clients(&self) -> Vec<ClientInfo<u32>> {
        self.windows.borrow().clone()
    }

    fn stacking_order(&self) -> Vec<u32> {
        self.windows.borrow().iter().map(|w| w.window).collect()
    }

    fn show(&self, window: u32) {
        self.update(window, |w| w.visible = true);
    }

    fn hide(&self, window: u32) {
        self.update(window, |w| w.visible = false);
        if self.focused.get() == Some(window) {
            self.focused.set(None);
        }
    }

    fn reconfigure(&self, window: u32) {
        debug!("reconfigure {}", window);
    }

    fn move_to_desktop(&self, window: u32, desktop: DesktopId) {
        self.update(window, |w| w.desktop = desktop);
    }

    fn move_onscreen(&self, window: u32) {
        debug!("move {} onscreen", window);
    }

    fn discard_crossing_events(&self) {}

    fn focus_fallback(&self, fallback: FocusFallback<u32>) {
        let target = match fallback {
            FocusFallback::Desktop(candidates) => {
                candidates.into_iter().find(|&w| self.can_focus(w))
            }
            FocusFallback::NoFocus => None,
        };
        debug!("focus fallback to {:?}", target);
        self.focused.set(target);
    }

    fn try_focus(&self, window: u32) -> bool {
        if self.can_focus(window) {
            self.focused.set(Some(window));
            true
        } else {
            false
        }
    }

    fn dock_strut(&self) -> Strut {
        self.dock
    }

    fn set_root_cursor(&self, cursor: Cursor) {
        self.cursor.set(cursor);
    }
}
