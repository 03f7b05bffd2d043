//! The set of virtual desktops.
//!
//! [`DesktopSet`] owns the desktop count, the current and show-desktop
//! state, the desktop names, the resolved [`DesktopLayout`] and the
//! per-desktop focus-order partitions.  It performs no I/O; the
//! [`ScreenState`](crate::screen::ScreenState) drives it and publishes the
//! results.

use crate::layout::DesktopLayout;
use serde::{Deserialize, Serialize};

/// Name given to desktops that nobody has named.
pub const UNNAMED_DESKTOP: &str = "Unnamed Desktop";

/// The wire value meaning "on every desktop".
pub const DESKTOP_ALL_RAW: u32 = 0xFFFF_FFFF;

/// Which desktop a window lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesktopId {
    Index(usize),
    /// Sticky: shown on every desktop.
    All,
}

impl DesktopId {
    pub fn from_raw(raw: u32) -> Self {
        if raw == DESKTOP_ALL_RAW {
            DesktopId::All
        } else {
            DesktopId::Index(raw as usize)
        }
    }

    pub fn to_raw(self) -> u32 {
        match self {
            DesktopId::Index(i) => u32::try_from(i).unwrap_or(DESKTOP_ALL_RAW - 1),
            DesktopId::All => DESKTOP_ALL_RAW,
        }
    }

    /// Whether a window with this assignment belongs on desktop `index`.
    pub fn shows_on(self, index: usize) -> bool {
        match self {
            DesktopId::Index(i) => i == index,
            DesktopId::All => true,
        }
    }
}

/// Desktop bookkeeping, generic over the window handle type `W` used in the
/// focus-order lists.
#[derive(Debug, Clone)]
pub struct DesktopSet<W> {
    count: usize,
    current: usize,
    showing_desktop: bool,
    names: Vec<String>,
    layout: DesktopLayout,
    /// One list per desktop, most recently focused first.
    focus_order: Vec<Vec<W>>,
}

impl<W> Default for DesktopSet<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> DesktopSet<W> {
    /// An empty set.  The count is zero until the first
    /// [`resize`](DesktopSet::resize).
    pub fn new() -> Self {
        Self {
            count: 0,
            current: 0,
            showing_desktop: false,
            names: Vec::new(),
            layout: DesktopLayout::default_for(1),
            focus_order: Vec::new(),
        }
    }

    //  Accessors

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn showing_desktop(&self) -> bool {
        self.showing_desktop
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn layout(&self) -> &DesktopLayout {
        &self.layout
    }

    /// Focus order of `desktop`, most recent first.  Empty for an unknown
    /// desktop.
    pub fn focus_order(&self, desktop: usize) -> &[W] {
        self.focus_order
            .get(desktop)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of focus-order partitions; always equal to the count.
    pub fn focus_partitions(&self) -> usize {
        self.focus_order.len()
    }

    //  Mutation

    /// Change the desktop count, returning the old one.
    ///
    /// Focus lists for removed desktops are dropped and new desktops get
    /// empty lists.  `count` must be non-zero; the caller checks.
    pub(crate) fn resize(&mut self, count: usize) -> usize {
        debug_assert!(count > 0);
        let old = self.count;
        self.count = count;
        self.focus_order.truncate(count);
        self.focus_order.resize_with(count, Vec::new);
        old
    }

    pub(crate) fn set_current(&mut self, desktop: usize) -> usize {
        std::mem::replace(&mut self.current, desktop)
    }

    pub(crate) fn set_showing_desktop(&mut self, show: bool) {
        self.showing_desktop = show;
    }

    pub(crate) fn set_layout(&mut self, layout: DesktopLayout) {
        self.layout = layout;
    }

    /// Replace the names with `names`, cut to the count and padded with
    /// [`UNNAMED_DESKTOP`].
    pub(crate) fn set_names(&mut self, mut names: Vec<String>) {
        names.truncate(self.count);
        while names.len() < self.count {
            names.push(UNNAMED_DESKTOP.to_string());
        }
        self.names = names;
    }
}

impl<W: Copy + PartialEq> DesktopSet<W> {
    /// Add a newly managed window to the back of its desktop's focus list,
    /// or of every list for a sticky window.
    pub fn add_to_focus_order(&mut self, window: W, desktop: DesktopId) {
        for (index, list) in self.focus_order.iter_mut().enumerate() {
            if desktop.shows_on(index) && !list.contains(&window) {
                list.push(window);
            }
        }
    }

    /// Move `window` to the front of every list it appears in.
    pub fn raise_in_focus_order(&mut self, window: W) {
        for list in &mut self.focus_order {
            if let Some(pos) = list.iter().position(|w| *w == window) {
                let w = list.remove(pos);
                list.insert(0, w);
            }
        }
    }

    /// Drop `window` from every list.
    pub fn remove_from_focus_order(&mut self, window: W) {
        for list in &mut self.focus_order {
            list.retain(|w| *w != window);
        }
    }
}
