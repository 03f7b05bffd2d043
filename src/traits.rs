//! Core traits that decouple the screen engine from any specific display
//! server or transport mechanism.
//!
//! The [`ScreenState`](crate::screen::ScreenState) only depends on these
//! abstractions plus [`PropertyPublisher`](crate::hints::PropertyPublisher).

use crate::command::Command;
use crate::desktop::DesktopId;
use crate::geometry::{Rect, Strut};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::mpsc;

/// What kind of window a managed client is.
///
/// Only the kind matters to the screen engine: desktop windows survive
/// show-desktop mode and can take focus while it is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowKind {
    /// The desktop background (file-manager icons and the like).
    Desktop,
    Dock,
    Splash,
    #[default]
    Normal,
}

impl WindowKind {
    /// Normal windows are hidden by show-desktop mode; desktops, docks and
    /// splash screens are not.
    pub fn is_normal(self) -> bool {
        !matches!(self, WindowKind::Desktop | WindowKind::Dock | WindowKind::Splash)
    }
}

/// A snapshot of one managed window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo<W> {
    pub window: W,
    pub desktop: DesktopId,
    pub strut: Strut,
    pub kind: WindowKind,
    /// Iconified windows are never shown by a desktop switch.
    pub minimized: bool,
    /// Whether the frame is currently mapped.
    pub visible: bool,
}

impl<W> ClientInfo<W> {
    /// Whether this window belongs on screen while `desktop` is current and
    /// show-desktop mode is `showing`.
    pub fn should_show(&self, desktop: usize, showing: bool) -> bool {
        if self.minimized || !self.desktop.shows_on(desktop) {
            return false;
        }
        !(showing && self.kind.is_normal())
    }
}

/// How the focus collaborator should pick a new focus target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusFallback<W> {
    /// The active desktop changed.  The candidates are that desktop's focus
    /// order, most recent first; focus the first one that can take it, or
    /// leave focus alone.
    Desktop(Vec<W>),
    /// Focus nothing in particular.
    NoFocus,
}

/// Root-window cursor shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cursor {
    Pointer,
    Busy,
}

/// Result of trying to take over the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Acquired,
    /// Another window manager already owns the root window.
    AlreadyManaged,
}

/// Abstraction over the display server and the window-manager subsystems
/// that the screen engine drives but does not own: monitors, the client
/// list, stacking order, focus and the dock.
///
/// Methods take `&self`; implementations that keep state use interior
/// mutability.
pub trait WindowSystem {
    /// Handle identifying a managed window.
    type Window: Copy + Eq + Hash + Debug;

    /// The error type produced by this window system.
    type Error: std::error::Error + Send + 'static;

    /// Claim the root window for this manager.
    fn annex(&self) -> Result<Ownership, Self::Error>;

    /// Give the root window back on shutdown.
    fn release(&self);

    /// Physical monitor rectangles, in a stable order.
    fn monitors(&self) -> Result<Vec<Rect>, Self::Error>;

    /// Snapshot of every managed window.
    fn clients(&self) -> Vec<ClientInfo<Self::Window>>;

    /// Managed windows from top to bottom.
    fn stacking_order(&self) -> Vec<Self::Window>;

    /// Map a window's frame.
    fn show(&self, window: Self::Window);

    /// Unmap a window's frame.
    fn hide(&self, window: Self::Window);

    /// Ask a window to recompute its geometry (maximized windows follow the
    /// work area).
    fn reconfigure(&self, window: Self::Window);

    /// Reassign a window to another desktop.
    fn move_to_desktop(&self, window: Self::Window, desktop: DesktopId);

    /// Pull a window back inside the visible screen area.
    fn move_onscreen(&self, window: Self::Window);

    /// Drop pointer enter/leave events that are already queued.
    fn discard_crossing_events(&self);

    /// Pick a new focus target.
    fn focus_fallback(&self, fallback: FocusFallback<Self::Window>);

    /// Try to focus `window`; `false` if it refused.
    fn try_focus(&self, window: Self::Window) -> bool;

    /// Space reserved by the dock.
    fn dock_strut(&self) -> Strut;

    /// Set the root-window cursor.
    fn set_root_cursor(&self, cursor: Cursor);
}

/// Notifications emitted by the [`ScreenState`](crate::screen::ScreenState)
/// over an [`mpsc`](std::sync::mpsc) channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    DesktopCountChanged { new: usize, old: usize },
    DesktopChanged { new: usize, old: usize },
    ShowDesktopChanged(bool),
    BusyChanged(bool),
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport and forward parsed commands
/// into the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
