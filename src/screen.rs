//! The screen engine: desktops, work areas, desktop switching and
//! show-desktop mode.
//!
//! [`ScreenState`] owns every piece of screen-wide state and reacts to
//! requests by updating it, driving the [`WindowSystem`] and publishing the
//! results through a [`PropertyPublisher`].  It is single-threaded: each
//! call runs to completion before the next one starts.

use crate::busy::{BusyTracker, StartupEvent};
use crate::command::Command;
use crate::config::DesktopsConfig;
use crate::desktop::{DesktopId, DesktopSet};
use crate::geometry::Rect;
use crate::hints::{Hint, HintValue, PropertyPublisher, SUPPORTED_HINTS};
use crate::layout::{DesktopLayout, RawLayout};
use crate::traits::{
    ClientInfo, Cursor, FocusFallback, Ownership, ScreenEvent, WindowKind, WindowSystem,
};
use crate::workarea::{aggregate_struts, WorkAreaTable};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Instant;

/// Name published in [`Hint::SupportingWmName`].
pub const WM_NAME: &str = "desktopd";

/// Possible errors from the screen engine.
#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    /// A caller broke a precondition (zero desktops, out-of-range index).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    /// The window system returned an error.
    #[error("window system error: {0}")]
    WindowSystem(String),
    /// Another window manager owns the screen.
    #[error("a window manager is already running on screen {screen}")]
    AlreadyManaged { screen: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Starting,
    Running,
}

/// Screen-wide state and the operations on it.
///
/// # Typical usage
///
/// ```ignore
/// let mut screen = ScreenState::new(wm, hints, 0);
/// screen.annex()?;
/// screen.startup(&config.desktops)?;
/// screen.handle(Command::SetDesktop(1))?;
/// let (wm, hints) = screen.shutdown();
/// ```
pub struct ScreenState<W: WindowSystem, P: PropertyPublisher> {
    wm: W,
    hints: P,
    screen: u32,
    phase: Phase,
    desktops: DesktopSet<W::Window>,
    /// Physical monitors as last reported by the window system.
    monitors: Vec<Rect>,
    areas: WorkAreaTable,
    /// The layout descriptor last published by us, if the hint holds ours.
    own_layout: Option<[u32; 4]>,
    /// Created on the first startup-notification event.
    busy: Option<BusyTracker>,
    events: Option<mpsc::Sender<ScreenEvent>>,
}

impl<W: WindowSystem, P: PropertyPublisher> ScreenState<W, P> {
    /// Create the state for screen number `screen`.  Nothing is published
    /// until [`annex`](Self::annex) and [`startup`](Self::startup).
    pub fn new(wm: W, hints: P, screen: u32) -> Self {
        Self {
            wm,
            hints,
            screen,
            phase: Phase::Starting,
            desktops: DesktopSet::new(),
            monitors: Vec::new(),
            areas: WorkAreaTable::default(),
            own_layout: None,
            busy: None,
            events: None,
        }
    }

    /// Attach a listener for [`ScreenEvent`]s.
    pub fn set_listener(&mut self, tx: mpsc::Sender<ScreenEvent>) {
        self.events = Some(tx);
    }

    //  Accessors

    pub fn wm(&self) -> &W {
        &self.wm
    }

    pub fn hints(&self) -> &P {
        &self.hints
    }

    pub fn desktops(&self) -> &DesktopSet<W::Window> {
        &self.desktops
    }

    pub fn num_desktops(&self) -> usize {
        self.desktops.count()
    }

    pub fn current_desktop(&self) -> usize {
        self.desktops.current()
    }

    pub fn showing_desktop(&self) -> bool {
        self.desktops.showing_desktop()
    }

    pub fn layout(&self) -> &DesktopLayout {
        self.desktops.layout()
    }

    pub fn work_areas(&self) -> &WorkAreaTable {
        &self.areas
    }

    /// Number of physical heads.
    pub fn num_heads(&self) -> usize {
        self.monitors.len()
    }

    /// Pending startup sequences.
    pub fn busy_count(&self) -> u32 {
        self.busy.as_ref().map_or(0, BusyTracker::pending)
    }

    //  Lifecycle

    /// Take over the screen.
    ///
    /// Fails with [`ScreenError::AlreadyManaged`] if another manager is
    /// running; nothing is published in that case.
    pub fn annex(&mut self) -> Result<(), ScreenError> {
        let ownership = self
            .wm
            .annex()
            .map_err(|e| ScreenError::WindowSystem(e.to_string()))?;
        if ownership == Ownership::AlreadyManaged {
            return Err(ScreenError::AlreadyManaged {
                screen: self.screen,
            });
        }
        info!("managing screen {}", self.screen);

        self.update_cursor();
        self.publish(Hint::ManagerPid, HintValue::Cardinal(std::process::id()));
        self.publish(Hint::SupportingWmName, HintValue::Text(WM_NAME.to_string()));
        self.publish(Hint::Supported, HintValue::Hints(SUPPORTED_HINTS.to_vec()));
        Ok(())
    }

    /// Publish the initial screen state from `config`.
    pub fn startup(&mut self, config: &DesktopsConfig) -> Result<(), ScreenError> {
        self.phase = Phase::Starting;
        self.resize()?;

        self.publish(Hint::DesktopNames, HintValue::Strings(config.names.clone()));
        self.set_desktop_count(config.count.max(1))?;

        let start = if config.startup_desktop < self.desktops.count() {
            config.startup_desktop
        } else {
            0
        };
        self.desktops.set_current(start);
        self.publish_current_desktop();

        self.desktops.set_showing_desktop(false);
        self.publish(Hint::ShowingDesktop, HintValue::from(false));

        self.phase = Phase::Running;
        Ok(())
    }

    /// Retract the hints that only make sense while this manager runs and
    /// hand back the collaborators.
    pub fn shutdown(self) -> (W, P) {
        self.wm.release();
        for hint in [Hint::ManagerPid, Hint::Supported, Hint::ShowingDesktop] {
            if let Err(e) = self.hints.erase(hint) {
                warn!("failed to erase {}: {}", hint, e);
            }
        }
        info!("released screen {}", self.screen);
        (self.wm, self.hints)
    }

    /// React to a change of the display geometry.
    pub fn resize(&mut self) -> Result<(), ScreenError> {
        let monitors = self
            .wm
            .monitors()
            .map_err(|e| ScreenError::WindowSystem(e.to_string()))?;
        let size = Rect::union_of(&monitors).unwrap_or_default();
        self.publish(
            Hint::DesktopGeometry,
            HintValue::Cardinals(vec![size.width.max(0) as u32, size.height.max(0) as u32]),
        );
        self.monitors = monitors;

        if self.phase == Phase::Starting {
            return Ok(());
        }

        self.update_areas();
        for client in self.wm.clients() {
            self.wm.move_onscreen(client.window);
        }
        Ok(())
    }

    //  Desktop set

    /// Change the number of desktops.
    pub fn set_desktop_count(&mut self, count: usize) -> Result<(), ScreenError> {
        if count == 0 {
            return Err(ScreenError::InvariantViolation(
                "desktop count must be at least 1".to_string(),
            ));
        }

        let old = self.desktops.resize(count);
        info!("{} desktop(s), was {}", count, old);
        self.publish(Hint::NumberOfDesktops, HintValue::Cardinal(raw_count(count)));
        self.publish(Hint::DesktopViewport, HintValue::Cardinals(vec![0; count * 2]));

        self.update_layout();
        self.update_desktop_names();

        // Windows on desktops that no longer exist land on the last one.
        let last = DesktopId::Index(count - 1);
        let mut moved = HashMap::new();
        for mut client in self.wm.clients() {
            if let DesktopId::Index(i) = client.desktop {
                if i >= count {
                    debug!("moving {:?} from desktop {} to {}", client.window, i, count - 1);
                    self.wm.move_to_desktop(client.window, last);
                    self.desktops.add_to_focus_order(client.window, last);
                    client.desktop = last;
                    moved.insert(client.window, client);
                }
            }
        }
        self.show_relocated(&moved);

        self.update_areas();
        self.emit(ScreenEvent::DesktopCountChanged { new: count, old });

        if self.desktops.current() >= count {
            self.set_desktop(count - 1)?;
        }
        Ok(())
    }

    /// Re-read the layout hint and resolve it against the current count.
    ///
    /// A descriptor set by another client is only read, never rewritten, so
    /// it is resolved afresh on every count change.  When no client has set
    /// one, the default layout is published.
    pub fn update_layout(&mut self) {
        let raw = self
            .read_hint(Hint::DesktopLayout)
            .and_then(|v| v.as_cardinals())
            .filter(|raw| Some(raw.as_slice()) != self.own_layout.as_ref().map(|l| &l[..]));
        let parsed = raw.as_deref().and_then(RawLayout::parse);
        if raw.is_some() && parsed.is_none() {
            warn!("ignoring malformed desktop layout {:?}", raw);
        }

        let layout = DesktopLayout::resolve(parsed.as_ref(), raw_count(self.desktops.count()));
        debug!("desktop layout {:?}", layout);
        self.desktops.set_layout(layout);

        if raw.is_none() {
            let normalised = layout.to_raw();
            self.publish(Hint::DesktopLayout, HintValue::Cardinals(normalised.to_vec()));
            self.own_layout = Some(normalised);
        } else {
            self.own_layout = None;
        }
    }

    /// Re-read the names hint, fit it to the current count and publish the
    /// result.
    pub fn update_desktop_names(&mut self) {
        let external = self
            .read_hint(Hint::DesktopNames)
            .and_then(|v| v.as_strings().map(<[String]>::to_vec));
        let names = external
            .clone()
            .unwrap_or_else(|| self.desktops.names().to_vec());
        self.desktops.set_names(names);

        if external.as_deref() != Some(self.desktops.names()) {
            self.publish(
                Hint::DesktopNames,
                HintValue::Strings(self.desktops.names().to_vec()),
            );
        }
    }

    /// Another client changed `hint`; pick up the new value.
    pub fn property_changed(&mut self, hint: Hint) {
        match hint {
            Hint::DesktopLayout => self.update_layout(),
            Hint::DesktopNames => self.update_desktop_names(),
            other => debug!("ignoring change of {}", other),
        }
    }

    //  Focus order

    /// Start tracking a newly managed window in the focus order.
    pub fn manage_focus(&mut self, window: W::Window, desktop: DesktopId) {
        self.desktops.add_to_focus_order(window, desktop);
    }

    /// `window` received focus.
    pub fn focused(&mut self, window: W::Window) {
        self.desktops.raise_in_focus_order(window);
    }

    /// `window` is no longer managed.
    pub fn unmanage_focus(&mut self, window: W::Window) {
        self.desktops.remove_from_focus_order(window);
    }

    //  Work areas

    /// Rebuild the work-area table and publish it.
    ///
    /// The new table replaces the old one before any window is asked to
    /// reconfigure, so windows always see consistent areas.
    pub fn update_areas(&mut self) {
        match self.wm.monitors() {
            Ok(monitors) => self.monitors = monitors,
            Err(e) => warn!("monitor query failed, keeping previous layout: {}", e),
        }

        let count = self.desktops.count();
        let clients = self.wm.clients();
        let struts = aggregate_struts(
            count,
            clients.iter().map(|c| (c.desktop, c.strut)),
            self.wm.dock_strut(),
        );
        self.areas = WorkAreaTable::build(&self.monitors, &struts);

        for row in 0..=count {
            for client in &clients {
                let on_row = match client.desktop {
                    DesktopId::Index(i) => row < count && i == row,
                    DesktopId::All => row == count,
                };
                if on_row {
                    self.wm.reconfigure(client.window);
                }
            }
        }

        self.publish(Hint::Workarea, HintValue::Integers(self.areas.flatten()));
    }

    /// Usable area of `desktop` across all heads.
    pub fn screen_area(&self, desktop: DesktopId) -> Option<Rect> {
        self.areas.lookup(desktop, self.areas.heads())
    }

    /// Usable area of `desktop` on `head`; `head == num_heads()` means the
    /// union of all heads.
    pub fn screen_area_on_head(&self, desktop: DesktopId, head: usize) -> Option<Rect> {
        self.areas.lookup(desktop, head)
    }

    /// Bounding box of all physical heads.
    pub fn physical_area(&self) -> Option<Rect> {
        self.physical_area_on_head(self.monitors.len())
    }

    /// Physical rectangle of `head`, ignoring struts.
    pub fn physical_area_on_head(&self, head: usize) -> Option<Rect> {
        match head.cmp(&self.monitors.len()) {
            std::cmp::Ordering::Less => self.monitors.get(head).copied(),
            std::cmp::Ordering::Equal => Some(Rect::union_of(&self.monitors).unwrap_or_default()),
            std::cmp::Ordering::Greater => None,
        }
    }

    //  Desktop switching

    /// Make `target` the current desktop.
    ///
    /// Windows that become visible are shown top to bottom first, then the
    /// ones that must go are hidden bottom to top, so the pointer sees as
    /// few enter/leave crossings as possible.  Crossing events caused by the
    /// switch are discarded before focus moves.
    pub fn set_desktop(&mut self, target: usize) -> Result<(), ScreenError> {
        let count = self.desktops.count();
        if target >= count {
            return Err(ScreenError::InvariantViolation(format!(
                "desktop {} out of range (have {})",
                target, count
            )));
        }

        let old = self.desktops.current();
        if target == old {
            return Ok(());
        }
        info!("moving to desktop {}", target + 1);
        self.desktops.set_current(target);

        let showing = self.desktops.showing_desktop();
        let clients = self.client_map();
        let stacking = self.wm.stacking_order();

        for window in &stacking {
            if let Some(c) = clients.get(window) {
                if !c.visible && c.should_show(target, showing) {
                    debug!("  show {:?}", window);
                    self.wm.show(*window);
                }
            }
        }
        for window in stacking.iter().rev() {
            if let Some(c) = clients.get(window) {
                if c.visible && !c.should_show(target, showing) {
                    debug!("  hide {:?}", window);
                    self.wm.hide(*window);
                }
            }
        }

        self.wm.discard_crossing_events();
        self.wm.focus_fallback(FocusFallback::Desktop(
            self.desktops.focus_order(target).to_vec(),
        ));

        self.publish_current_desktop();
        self.emit(ScreenEvent::DesktopChanged { new: target, old });
        Ok(())
    }

    /// Enter or leave show-desktop mode.
    pub fn show_desktop(&mut self, show: bool) {
        if show == self.desktops.showing_desktop() {
            return;
        }
        info!("{} show-desktop mode", if show { "entering" } else { "leaving" });
        self.desktops.set_showing_desktop(show);

        let current = self.desktops.current();
        let clients = self.client_map();
        let stacking = self.wm.stacking_order();

        if show {
            for window in stacking.iter().rev() {
                if let Some(c) = clients.get(window) {
                    if c.visible && !c.should_show(current, true) {
                        debug!("  hide {:?}", window);
                        self.wm.hide(*window);
                    }
                }
            }

            let order = self.desktops.focus_order(current).to_vec();
            for window in order {
                let is_desktop = clients
                    .get(&window)
                    .is_some_and(|c| c.kind == WindowKind::Desktop);
                if is_desktop && self.wm.try_focus(window) {
                    break;
                }
            }
        } else {
            for window in &stacking {
                if let Some(c) = clients.get(window) {
                    if !c.visible && c.should_show(current, false) {
                        debug!("  show {:?}", window);
                        self.wm.show(*window);
                    }
                }
            }
            self.wm.focus_fallback(FocusFallback::NoFocus);
        }

        self.publish(Hint::ShowingDesktop, HintValue::from(show));
        self.emit(ScreenEvent::ShowDesktopChanged(show));
    }

    //  Startup notification

    /// Feed a startup-notification event received at `now`.
    pub fn handle_startup_event(&mut self, event: &StartupEvent, now: Instant) {
        let tracker = self.busy.get_or_insert_with(BusyTracker::new);
        if let Some(busy) = tracker.handle(event, now) {
            self.busy_changed(busy);
        }
    }

    /// When [`poll_timers`](Self::poll_timers) next needs to run.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.busy.as_ref().and_then(BusyTracker::deadline)
    }

    /// Fire any timer due at `now`.
    pub fn poll_timers(&mut self, now: Instant) {
        if let Some(busy) = self.busy.as_mut().and_then(|t| t.poll(now)) {
            self.busy_changed(busy);
        }
    }

    //  Commands

    /// Process a single external [`Command`].
    ///
    /// Requests are validated here; an out-of-range desktop is ignored and
    /// a zero desktop count is raised to one.
    pub fn handle(&mut self, cmd: Command) -> Result<(), ScreenError> {
        match cmd {
            Command::SetDesktop(n) => {
                if n < self.desktops.count() {
                    self.set_desktop(n)?;
                } else {
                    warn!(
                        "ignoring switch to desktop {} (have {})",
                        n,
                        self.desktops.count()
                    );
                }
            }
            Command::SetDesktopCount(n) => self.set_desktop_count(n.max(1))?,
            Command::ShowDesktop(show) => self.show_desktop(show),
            Command::ToggleShowDesktop => {
                let show = !self.desktops.showing_desktop();
                self.show_desktop(show);
            }
            Command::Startup(event) => self.handle_startup_event(&event, Instant::now()),
            Command::MonitorsChanged => self.resize()?,
            Command::PropertyChanged(hint) => self.property_changed(hint),
            // Ending the session is up to the owner of the event loop, which
            // calls `shutdown`.
            Command::Shutdown => debug!("shutdown requested"),
        }
        Ok(())
    }

    //  Internal

    /// Show relocated windows that now belong on the current desktop, top
    /// to bottom.
    fn show_relocated(&self, moved: &HashMap<W::Window, ClientInfo<W::Window>>) {
        if moved.is_empty() {
            return;
        }
        let current = self.desktops.current();
        let showing = self.desktops.showing_desktop();
        for window in self.wm.stacking_order() {
            if let Some(c) = moved.get(&window) {
                if !c.visible && c.should_show(current, showing) {
                    debug!("  show {:?}", window);
                    self.wm.show(window);
                }
            }
        }
    }

    fn client_map(&self) -> HashMap<W::Window, ClientInfo<W::Window>> {
        self.wm
            .clients()
            .into_iter()
            .map(|c| (c.window, c))
            .collect()
    }

    fn busy_changed(&self, busy: bool) {
        debug!("busy: {}", busy);
        self.update_cursor();
        self.emit(ScreenEvent::BusyChanged(busy));
    }

    fn update_cursor(&self) {
        let cursor = if self.busy_count() > 0 {
            Cursor::Busy
        } else {
            Cursor::Pointer
        };
        self.wm.set_root_cursor(cursor);
    }

    fn publish_current_desktop(&self) {
        self.publish(
            Hint::CurrentDesktop,
            HintValue::Cardinal(raw_count(self.desktops.current())),
        );
    }

    fn publish(&self, hint: Hint, value: HintValue) {
        if let Err(e) = self.hints.set(hint, value) {
            warn!("failed to publish {}: {}", hint, e);
        }
    }

    fn read_hint(&self, hint: Hint) -> Option<HintValue> {
        match self.hints.get(hint) {
            Ok(value) => value,
            Err(e) => {
                warn!("failed to read {}: {}", hint, e);
                None
            }
        }
    }

    fn emit(&self, event: ScreenEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

fn raw_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::busy::StartupEventKind;
    use crate::geometry::Strut;
    use crate::layout::{Corner, Orientation};
    use std::cell::{Cell, RefCell};
    use std::convert::Infallible;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Show(u32),
        Hide(u32),
        Reconfigure(u32),
        MoveTo(u32, DesktopId),
        Onscreen(u32),
        DiscardCrossing,
        Fallback(FocusFallback<u32>),
        TryFocus(u32),
        Cursor(Cursor),
        Release,
    }

    /// Record-keeping mock window system.  Stacking order is the order of
    /// `clients`, top first.
    #[derive(Debug, Default)]
    struct RecorderWs {
        monitors: RefCell<Vec<Rect>>,
        clients: RefCell<Vec<ClientInfo<u32>>>,
        dock: Cell<Strut>,
        calls: RefCell<Vec<Call>>,
        /// Windows that accept focus.
        focusable: RefCell<Vec<u32>>,
        other_manager: Cell<bool>,
        monitors_fail: Cell<bool>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("recorder error")]
    struct RecorderErr;

    impl RecorderWs {
        fn log(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn clear(&self) {
            self.calls.borrow_mut().clear();
        }

        fn visible(&self) -> Vec<u32> {
            self.clients
                .borrow()
                .iter()
                .filter(|c| c.visible)
                .map(|c| c.window)
                .collect()
        }

        fn set_visible(&self, window: u32, visible: bool) {
            for c in self.clients.borrow_mut().iter_mut() {
                if c.window == window {
                    c.visible = visible;
                }
            }
        }
    }

    impl WindowSystem for RecorderWs {
        type Window = u32;
        type Error = RecorderErr;

        fn annex(&self) -> Result<Ownership, RecorderErr> {
            Ok(if self.other_manager.get() {
                Ownership::AlreadyManaged
            } else {
                Ownership::Acquired
            })
        }

        fn release(&self) {
            self.log(Call::Release);
        }

        fn monitors(&self) -> Result<Vec<Rect>, RecorderErr> {
            if self.monitors_fail.get() {
                return Err(RecorderErr);
            }
            Ok(self.monitors.borrow().clone())
        }

        fn clients(&self) -> Vec<ClientInfo<u32>> {
            self.clients.borrow().clone()
        }

        fn stacking_order(&self) -> Vec<u32> {
            self.clients.borrow().iter().map(|c| c.window).collect()
        }

        fn show(&self, window: u32) {
            self.set_visible(window, true);
            self.log(Call::Show(window));
        }

        fn hide(&self, window: u32) {
            self.set_visible(window, false);
            self.log(Call::Hide(window));
        }

        fn reconfigure(&self, window: u32) {
            self.log(Call::Reconfigure(window));
        }

        fn move_to_desktop(&self, window: u32, desktop: DesktopId) {
            for c in self.clients.borrow_mut().iter_mut() {
                if c.window == window {
                    c.desktop = desktop;
                }
            }
            self.log(Call::MoveTo(window, desktop));
        }

        fn move_onscreen(&self, window: u32) {
            self.log(Call::Onscreen(window));
        }

        fn discard_crossing_events(&self) {
            self.log(Call::DiscardCrossing);
        }

        fn focus_fallback(&self, fallback: FocusFallback<u32>) {
            self.log(Call::Fallback(fallback));
        }

        fn try_focus(&self, window: u32) -> bool {
            self.log(Call::TryFocus(window));
            self.focusable.borrow().contains(&window)
        }

        fn dock_strut(&self) -> Strut {
            self.dock.get()
        }

        fn set_root_cursor(&self, cursor: Cursor) {
            self.log(Call::Cursor(cursor));
        }
    }

    /// In-memory hint storage.
    #[derive(Debug, Default)]
    struct MapHints {
        map: RefCell<HashMap<Hint, HintValue>>,
        erased: RefCell<Vec<Hint>>,
    }

    impl MapHints {
        fn value(&self, hint: Hint) -> Option<HintValue> {
            self.map.borrow().get(&hint).cloned()
        }
    }

    impl PropertyPublisher for MapHints {
        type Error = Infallible;

        fn set(&self, hint: Hint, value: HintValue) -> Result<(), Infallible> {
            self.map.borrow_mut().insert(hint, value);
            Ok(())
        }

        fn get(&self, hint: Hint) -> Result<Option<HintValue>, Infallible> {
            Ok(self.value(hint))
        }

        fn erase(&self, hint: Hint) -> Result<(), Infallible> {
            self.map.borrow_mut().remove(&hint);
            self.erased.borrow_mut().push(hint);
            Ok(())
        }
    }

    fn client(window: u32, desktop: DesktopId, visible: bool) -> ClientInfo<u32> {
        ClientInfo {
            window,
            desktop,
            strut: Strut::default(),
            kind: WindowKind::Normal,
            minimized: false,
            visible,
        }
    }

    fn desktop_window(window: u32) -> ClientInfo<u32> {
        ClientInfo {
            kind: WindowKind::Desktop,
            ..client(window, DesktopId::All, true)
        }
    }

    fn single_monitor() -> Vec<Rect> {
        vec![Rect::new(0, 0, 1000, 800)]
    }

    fn dual_monitor() -> Vec<Rect> {
        vec![Rect::new(0, 0, 1000, 800), Rect::new(1000, 0, 800, 800)]
    }

    fn config(count: usize, startup_desktop: usize) -> DesktopsConfig {
        DesktopsConfig {
            count,
            names: Vec::new(),
            startup_desktop,
        }
    }

    fn make_screen(
        monitors: Vec<Rect>,
        clients: Vec<ClientInfo<u32>>,
        count: usize,
        start: usize,
    ) -> ScreenState<RecorderWs, MapHints> {
        let wm = RecorderWs::default();
        *wm.monitors.borrow_mut() = monitors;
        *wm.clients.borrow_mut() = clients.clone();
        let mut s = ScreenState::new(wm, MapHints::default(), 0);
        s.annex().unwrap();
        s.startup(&config(count, start)).unwrap();
        for c in &clients {
            s.manage_focus(c.window, c.desktop);
        }
        s.wm.clear();
        s
    }

    fn collect_events(s: &mut ScreenState<RecorderWs, MapHints>) -> mpsc::Receiver<ScreenEvent> {
        let (tx, rx) = mpsc::channel();
        s.set_listener(tx);
        rx
    }

    //  Lifecycle

    #[test]
    fn annex_publishes_identity_and_support() {
        let mut s = ScreenState::new(RecorderWs::default(), MapHints::default(), 0);
        s.annex().unwrap();
        assert_eq!(
            s.hints.value(Hint::ManagerPid),
            Some(HintValue::Cardinal(std::process::id()))
        );
        assert_eq!(
            s.hints.value(Hint::SupportingWmName),
            Some(HintValue::Text(WM_NAME.into()))
        );
        assert_eq!(
            s.hints.value(Hint::Supported),
            Some(HintValue::Hints(SUPPORTED_HINTS.to_vec()))
        );
        assert_eq!(s.wm.calls(), vec![Call::Cursor(Cursor::Pointer)]);
    }

    #[test]
    fn annex_refuses_when_another_manager_runs() {
        let wm = RecorderWs::default();
        wm.other_manager.set(true);
        let mut s = ScreenState::new(wm, MapHints::default(), 3);
        let err = s.annex().unwrap_err();
        assert!(matches!(err, ScreenError::AlreadyManaged { screen: 3 }));
        assert!(s.hints.map.borrow().is_empty());
    }

    #[test]
    fn startup_publishes_initial_state() {
        let s = make_screen(single_monitor(), vec![], 3, 1);
        let h = &s.hints;
        assert_eq!(h.value(Hint::NumberOfDesktops), Some(HintValue::Cardinal(3)));
        assert_eq!(h.value(Hint::CurrentDesktop), Some(HintValue::Cardinal(1)));
        assert_eq!(h.value(Hint::ShowingDesktop), Some(HintValue::Cardinal(0)));
        assert_eq!(h.value(Hint::DesktopViewport), Some(HintValue::Cardinals(vec![0; 6])));
        assert_eq!(
            h.value(Hint::DesktopGeometry),
            Some(HintValue::Cardinals(vec![1000, 800]))
        );
        assert_eq!(
            h.value(Hint::DesktopNames),
            Some(HintValue::Strings(vec!["Unnamed Desktop".into(); 3]))
        );
        assert_eq!(
            h.value(Hint::DesktopLayout),
            Some(HintValue::Cardinals(vec![0, 3, 1, 0]))
        );
        assert_eq!(
            h.value(Hint::Workarea),
            Some(HintValue::Integers([0, 0, 1000, 800].repeat(3)))
        );
        assert_eq!(s.current_desktop(), 1);
        assert!(!s.showing_desktop());
    }

    #[test]
    fn startup_desktop_out_of_range_falls_back_to_first() {
        let s = make_screen(single_monitor(), vec![], 2, 9);
        assert_eq!(s.current_desktop(), 0);
    }

    #[test]
    fn startup_zero_desktops_means_one() {
        let s = make_screen(single_monitor(), vec![], 0, 0);
        assert_eq!(s.num_desktops(), 1);
    }

    #[test]
    fn configured_names_are_kept_and_padded() {
        let wm = RecorderWs::default();
        *wm.monitors.borrow_mut() = single_monitor();
        let mut s = ScreenState::new(wm, MapHints::default(), 0);
        let cfg = DesktopsConfig {
            count: 3,
            names: vec!["web".into(), "code".into()],
            startup_desktop: 0,
        };
        s.startup(&cfg).unwrap();
        assert_eq!(s.desktops().names(), &["web", "code", "Unnamed Desktop"]);
    }

    #[test]
    fn shutdown_retracts_hints() {
        let s = make_screen(single_monitor(), vec![], 2, 0);
        let (wm, hints) = s.shutdown();
        assert_eq!(wm.calls(), vec![Call::Release]);
        assert_eq!(
            *hints.erased.borrow(),
            vec![Hint::ManagerPid, Hint::Supported, Hint::ShowingDesktop]
        );
        assert!(hints.value(Hint::ShowingDesktop).is_none());
        // Plain state hints stay for the next manager to read.
        assert!(hints.value(Hint::NumberOfDesktops).is_some());
    }

    //  Desktop count

    #[test]
    fn desktop_count_round_trips_with_one_focus_list_each() {
        let mut s = make_screen(single_monitor(), vec![], 1, 0);
        for n in [1, 5, 2, 8, 3] {
            s.set_desktop_count(n).unwrap();
            assert_eq!(s.num_desktops(), n);
            assert_eq!(s.desktops().focus_partitions(), n);
            assert_eq!(s.hints.value(Hint::NumberOfDesktops), Some(HintValue::Cardinal(n as u32)));
            assert_eq!(s.work_areas().desktops(), n);
        }
    }

    #[test]
    fn new_desktops_have_empty_focus_lists() {
        let mut s = make_screen(single_monitor(), vec![client(1, DesktopId::Index(0), true)], 1, 0);
        s.set_desktop_count(3).unwrap();
        assert_eq!(s.desktops().focus_order(0), &[1]);
        assert!(s.desktops().focus_order(1).is_empty());
        assert!(s.desktops().focus_order(2).is_empty());
    }

    #[test]
    fn zero_desktop_count_is_an_invariant_violation() {
        let mut s = make_screen(single_monitor(), vec![], 2, 0);
        let err = s.set_desktop_count(0).unwrap_err();
        assert!(matches!(err, ScreenError::InvariantViolation(_)));
        assert_eq!(s.num_desktops(), 2);
    }

    #[test]
    fn relocated_windows_appear_when_landing_on_current_desktop() {
        let clients = vec![
            client(8, DesktopId::Index(1), true),
            client(9, DesktopId::Index(2), false),
        ];
        let mut s = make_screen(single_monitor(), clients, 3, 1);
        s.set_desktop_count(2).unwrap();

        assert_eq!(s.current_desktop(), 1);
        let calls = s.wm.calls();
        let moved = calls
            .iter()
            .position(|c| *c == Call::MoveTo(9, DesktopId::Index(1)))
            .unwrap();
        let shown = calls.iter().position(|c| *c == Call::Show(9)).unwrap();
        assert!(moved < shown);
        assert_eq!(s.wm.visible(), vec![8, 9]);
    }

    #[test]
    fn relocated_windows_stay_hidden_in_show_desktop_mode() {
        let mut s = make_screen(single_monitor(), vec![client(9, DesktopId::Index(2), false)], 3, 1);
        s.show_desktop(true);
        s.set_desktop_count(2).unwrap();
        assert!(s.wm.visible().is_empty());
    }

    #[test]
    fn shrinking_relocates_windows_and_switches_desktop() {
        let clients = vec![
            client(1, DesktopId::Index(3), true),
            client(2, DesktopId::Index(1), false),
            client(3, DesktopId::All, true),
        ];
        let mut s = make_screen(single_monitor(), clients, 4, 3);
        let rx = collect_events(&mut s);

        s.set_desktop_count(2).unwrap();

        let calls = s.wm.calls();
        assert!(calls.contains(&Call::MoveTo(1, DesktopId::Index(1))));
        assert!(!calls.iter().any(|c| matches!(c, Call::MoveTo(3, _))));
        assert!(!calls.iter().any(|c| matches!(c, Call::MoveTo(2, _))));
        assert_eq!(s.current_desktop(), 1);
        assert!(s.desktops().focus_order(1).contains(&1));

        let events: Vec<ScreenEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                ScreenEvent::DesktopCountChanged { new: 2, old: 4 },
                ScreenEvent::DesktopChanged { new: 1, old: 3 },
            ]
        );
    }

    #[test]
    fn count_change_shrinks_layout_and_viewport() {
        let mut s = make_screen(single_monitor(), vec![], 4, 0);
        s.set_desktop_count(2).unwrap();
        assert_eq!(s.hints.value(Hint::DesktopViewport), Some(HintValue::Cardinals(vec![0; 4])));
        assert_eq!(s.layout().columns, 2);
    }

    //  Layout and names

    #[test]
    fn layout_hint_is_resolved_against_count() {
        let mut s = make_screen(single_monitor(), vec![], 1, 0);
        s.hints
            .set(Hint::DesktopLayout, HintValue::Cardinals(vec![1, 0, 2, 1]))
            .unwrap();
        s.set_desktop_count(6).unwrap();
        let l = s.layout();
        assert_eq!(l.orientation, Orientation::Vertical);
        assert_eq!(l.start_corner, Corner::TopRight);
        assert_eq!((l.rows, l.columns), (2, 3));
        // The client's descriptor is left as it wrote it.
        assert_eq!(
            s.hints.value(Hint::DesktopLayout),
            Some(HintValue::Cardinals(vec![1, 0, 2, 1]))
        );
    }

    #[test]
    fn external_layout_is_resolved_again_when_count_grows() {
        let wm = RecorderWs::default();
        *wm.monitors.borrow_mut() = single_monitor();
        let hints = MapHints::default();
        hints
            .set(Hint::DesktopLayout, HintValue::Cardinals(vec![0, 0, 2, 0]))
            .unwrap();
        let mut s = ScreenState::new(wm, hints, 0);
        s.startup(&config(4, 0)).unwrap();
        assert_eq!((s.layout().rows, s.layout().columns), (2, 2));

        s.set_desktop_count(8).unwrap();
        assert_eq!((s.layout().rows, s.layout().columns), (2, 4));
        assert_eq!(
            s.hints.value(Hint::DesktopLayout),
            Some(HintValue::Cardinals(vec![0, 0, 2, 0]))
        );
    }

    #[test]
    fn own_default_layout_follows_count() {
        let mut s = make_screen(single_monitor(), vec![], 4, 0);
        assert_eq!(
            s.hints.value(Hint::DesktopLayout),
            Some(HintValue::Cardinals(vec![0, 4, 1, 0]))
        );
        s.set_desktop_count(8).unwrap();
        assert_eq!((s.layout().rows, s.layout().columns), (1, 8));
        assert_eq!(
            s.hints.value(Hint::DesktopLayout),
            Some(HintValue::Cardinals(vec![0, 8, 1, 0]))
        );
    }

    #[test]
    fn malformed_layout_hint_gives_default() {
        let mut s = make_screen(single_monitor(), vec![], 6, 0);
        s.hints
            .set(Hint::DesktopLayout, HintValue::Cardinals(vec![1, 2]))
            .unwrap();
        s.property_changed(Hint::DesktopLayout);
        assert_eq!(*s.layout(), DesktopLayout::default_for(6));
    }

    #[test]
    fn external_names_are_padded_and_cut() {
        let mut s = make_screen(single_monitor(), vec![], 3, 0);
        s.hints
            .set(
                Hint::DesktopNames,
                HintValue::Strings(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
            )
            .unwrap();
        s.property_changed(Hint::DesktopNames);
        assert_eq!(s.desktops().names(), &["a", "b", "c"]);

        s.hints
            .set(Hint::DesktopNames, HintValue::Strings(vec!["x".into()]))
            .unwrap();
        s.property_changed(Hint::DesktopNames);
        assert_eq!(s.desktops().names(), &["x", "Unnamed Desktop", "Unnamed Desktop"]);
        assert_eq!(
            s.hints.value(Hint::DesktopNames),
            Some(HintValue::Strings(vec![
                "x".into(),
                "Unnamed Desktop".into(),
                "Unnamed Desktop".into()
            ]))
        );
    }

    //  Work areas

    #[test]
    fn window_strut_shrinks_its_desktop() {
        let mut panel = client(9, DesktopId::Index(0), true);
        panel.strut = Strut::new(0, 20, 0, 0);
        let s = make_screen(single_monitor(), vec![panel], 2, 0);
        assert_eq!(s.screen_area(DesktopId::Index(0)), Some(Rect::new(0, 20, 1000, 780)));
        assert_eq!(s.screen_area(DesktopId::Index(1)), Some(Rect::new(0, 0, 1000, 800)));
        assert_eq!(
            s.hints.value(Hint::Workarea),
            Some(HintValue::Integers(vec![0, 20, 1000, 780, 0, 0, 1000, 800]))
        );
    }

    #[test]
    fn dock_strut_applies_to_every_desktop() {
        let wm = RecorderWs::default();
        *wm.monitors.borrow_mut() = dual_monitor();
        wm.dock.set(Strut::new(50, 0, 0, 0));
        let mut s = ScreenState::new(wm, MapHints::default(), 0);
        s.startup(&config(2, 0)).unwrap();
        for d in [DesktopId::Index(0), DesktopId::Index(1), DesktopId::All] {
            assert_eq!(s.screen_area_on_head(d, 0), Some(Rect::new(50, 0, 950, 800)));
            assert_eq!(s.screen_area_on_head(d, 1), Some(Rect::new(1000, 0, 800, 800)));
        }
    }

    #[test]
    fn union_head_and_out_of_range_lookups() {
        let s = make_screen(dual_monitor(), vec![], 2, 0);
        let heads = s.num_heads();
        assert_eq!(heads, 2);
        assert_eq!(
            s.screen_area_on_head(DesktopId::Index(1), heads),
            s.screen_area(DesktopId::Index(1))
        );
        assert_eq!(s.screen_area_on_head(DesktopId::Index(0), heads + 1), None);
        assert_eq!(s.screen_area(DesktopId::Index(2)), None);
        assert!(s.screen_area(DesktopId::All).is_some());
    }

    #[test]
    fn physical_area_ignores_struts() {
        let mut panel = client(9, DesktopId::All, true);
        panel.strut = Strut::new(0, 30, 0, 0);
        let s = make_screen(dual_monitor(), vec![panel], 1, 0);
        assert_eq!(s.physical_area_on_head(1), Some(Rect::new(1000, 0, 800, 800)));
        assert_eq!(s.physical_area(), Some(Rect::new(0, 0, 1800, 800)));
        assert_eq!(s.physical_area_on_head(3), None);
        assert_eq!(s.screen_area(DesktopId::Index(0)), Some(Rect::new(0, 30, 1800, 770)));
    }

    #[test]
    fn recompute_twice_gives_identical_tables() {
        let mut panel = client(9, DesktopId::Index(1), true);
        panel.strut = Strut::new(10, 0, 0, 25);
        let mut s = make_screen(dual_monitor(), vec![panel], 3, 0);
        s.update_areas();
        let first = s.work_areas().clone();
        s.update_areas();
        assert_eq!(*s.work_areas(), first);
    }

    #[test]
    fn recompute_reconfigures_row_by_row() {
        let clients = vec![
            client(1, DesktopId::All, true),
            client(2, DesktopId::Index(1), false),
            client(3, DesktopId::Index(0), true),
        ];
        let mut s = make_screen(single_monitor(), clients, 2, 0);
        s.update_areas();
        assert_eq!(
            s.wm.calls(),
            vec![Call::Reconfigure(3), Call::Reconfigure(2), Call::Reconfigure(1)]
        );
    }

    #[test]
    fn failed_monitor_query_keeps_previous_heads() {
        let mut s = make_screen(dual_monitor(), vec![], 2, 0);
        s.wm.monitors_fail.set(true);
        s.update_areas();
        assert_eq!(s.num_heads(), 2);
        assert_eq!(s.screen_area(DesktopId::Index(0)), Some(Rect::new(0, 0, 1800, 800)));
        assert!(s.resize().is_err());
    }

    #[test]
    fn resize_rebuilds_and_moves_windows_onscreen() {
        let mut s = make_screen(single_monitor(), vec![client(4, DesktopId::Index(0), true)], 1, 0);
        *s.wm.monitors.borrow_mut() = dual_monitor();
        s.handle(Command::MonitorsChanged).unwrap();
        assert_eq!(s.num_heads(), 2);
        assert_eq!(
            s.hints.value(Hint::DesktopGeometry),
            Some(HintValue::Cardinals(vec![1800, 800]))
        );
        assert!(s.wm.calls().contains(&Call::Onscreen(4)));
    }

    //  Desktop switching

    #[test]
    fn switch_shows_before_hiding() {
        let clients = vec![
            client(1, DesktopId::Index(0), false), // A
            client(2, DesktopId::Index(1), true),  // B
        ];
        let mut s = make_screen(single_monitor(), clients, 2, 1);
        s.set_desktop(0).unwrap();
        let calls = s.wm.calls();
        let show_a = calls.iter().position(|c| *c == Call::Show(1)).unwrap();
        let hide_b = calls.iter().position(|c| *c == Call::Hide(2)).unwrap();
        assert!(show_a < hide_b);
        assert_eq!(s.wm.visible(), vec![1]);
    }

    #[test]
    fn switch_walks_stacking_order_in_both_directions() {
        let clients = vec![
            client(1, DesktopId::Index(1), false),
            client(2, DesktopId::Index(0), true),
            client(3, DesktopId::Index(1), false),
            client(4, DesktopId::Index(0), true),
            client(5, DesktopId::All, true),
        ];
        let mut s = make_screen(single_monitor(), clients, 2, 0);
        s.set_desktop(1).unwrap();
        let visibility: Vec<Call> = s
            .wm
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Show(_) | Call::Hide(_)))
            .collect();
        assert_eq!(
            visibility,
            vec![Call::Show(1), Call::Show(3), Call::Hide(4), Call::Hide(2)]
        );
    }

    #[test]
    fn switch_discards_crossings_then_falls_back_to_desktop_focus_order() {
        let clients = vec![
            client(1, DesktopId::Index(1), false),
            client(2, DesktopId::Index(1), false),
        ];
        let mut s = make_screen(single_monitor(), clients, 2, 0);
        s.focused(2);
        s.set_desktop(1).unwrap();
        let calls = s.wm.calls();
        let tail = &calls[calls.len() - 2..];
        assert_eq!(
            tail,
            &[Call::DiscardCrossing, Call::Fallback(FocusFallback::Desktop(vec![2, 1]))]
        );
    }

    #[test]
    fn switch_publishes_and_notifies() {
        let mut s = make_screen(single_monitor(), vec![], 3, 0);
        let rx = collect_events(&mut s);
        s.set_desktop(2).unwrap();
        assert_eq!(s.hints.value(Hint::CurrentDesktop), Some(HintValue::Cardinal(2)));
        let events: Vec<ScreenEvent> = rx.try_iter().collect();
        assert_eq!(events, vec![ScreenEvent::DesktopChanged { new: 2, old: 0 }]);
    }

    #[test]
    fn switch_to_current_is_a_no_op() {
        let mut s = make_screen(single_monitor(), vec![client(1, DesktopId::Index(0), true)], 2, 0);
        let rx = collect_events(&mut s);
        s.set_desktop(0).unwrap();
        assert!(s.wm.calls().is_empty());
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn switch_out_of_range_is_rejected() {
        let mut s = make_screen(single_monitor(), vec![], 2, 0);
        assert!(matches!(
            s.set_desktop(2),
            Err(ScreenError::InvariantViolation(_))
        ));
        assert_eq!(s.current_desktop(), 0);
    }

    #[test]
    fn minimized_windows_stay_hidden_on_switch() {
        let mut iconic = client(1, DesktopId::Index(1), false);
        iconic.minimized = true;
        let mut s = make_screen(single_monitor(), vec![iconic], 2, 0);
        s.set_desktop(1).unwrap();
        assert!(s.wm.visible().is_empty());
    }

    //  Show desktop

    #[test]
    fn show_desktop_hides_normal_windows_bottom_to_top() {
        let clients = vec![
            client(1, DesktopId::Index(0), true),
            desktop_window(2),
            client(3, DesktopId::Index(0), true),
        ];
        let mut s = make_screen(single_monitor(), clients, 1, 0);
        s.show_desktop(true);
        let hides: Vec<Call> = s
            .wm
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Hide(_)))
            .collect();
        assert_eq!(hides, vec![Call::Hide(3), Call::Hide(1)]);
        assert_eq!(s.wm.visible(), vec![2]);
        assert_eq!(s.hints.value(Hint::ShowingDesktop), Some(HintValue::Cardinal(1)));
    }

    #[test]
    fn show_desktop_focuses_first_desktop_window_that_accepts() {
        let clients = vec![
            client(1, DesktopId::Index(0), true),
            desktop_window(2),
            desktop_window(3),
            desktop_window(4),
        ];
        let mut s = make_screen(single_monitor(), clients, 1, 0);
        s.wm.focusable.borrow_mut().extend([3, 4]);
        s.show_desktop(true);
        let tries: Vec<Call> = s
            .wm
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::TryFocus(_)))
            .collect();
        // Window 1 is not a desktop window, 2 refuses, 3 wins, 4 is never tried.
        assert_eq!(tries, vec![Call::TryFocus(2), Call::TryFocus(3)]);
    }

    #[test]
    fn leaving_show_desktop_uses_no_focus_fallback() {
        let mut s = make_screen(single_monitor(), vec![client(1, DesktopId::Index(0), true)], 1, 0);
        s.show_desktop(true);
        s.wm.clear();
        s.show_desktop(false);
        assert_eq!(
            s.wm.calls(),
            vec![Call::Show(1), Call::Fallback(FocusFallback::NoFocus)]
        );
    }

    #[test]
    fn show_desktop_round_trip_restores_visibility() {
        let clients = vec![
            client(1, DesktopId::Index(0), true),
            desktop_window(2),
            client(3, DesktopId::Index(1), false),
            client(4, DesktopId::All, true),
            ClientInfo {
                kind: WindowKind::Dock,
                ..client(5, DesktopId::All, true)
            },
            ClientInfo {
                minimized: true,
                ..client(6, DesktopId::Index(0), false)
            },
        ];
        let mut s = make_screen(single_monitor(), clients, 2, 0);
        let before = s.wm.visible();
        s.show_desktop(true);
        assert_ne!(s.wm.visible(), before);
        s.show_desktop(false);
        assert_eq!(s.wm.visible(), before);
    }

    #[test]
    fn show_desktop_unchanged_is_a_no_op() {
        let mut s = make_screen(single_monitor(), vec![client(1, DesktopId::Index(0), true)], 1, 0);
        let rx = collect_events(&mut s);
        s.show_desktop(false);
        assert!(s.wm.calls().is_empty());
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn toggle_command_flips_mode() {
        let mut s = make_screen(single_monitor(), vec![], 1, 0);
        let rx = collect_events(&mut s);
        s.handle(Command::ToggleShowDesktop).unwrap();
        assert!(s.showing_desktop());
        s.handle(Command::ToggleShowDesktop).unwrap();
        assert!(!s.showing_desktop());
        let events: Vec<ScreenEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                ScreenEvent::ShowDesktopChanged(true),
                ScreenEvent::ShowDesktopChanged(false)
            ]
        );
    }

    #[test]
    fn switching_while_showing_desktop_keeps_normal_windows_hidden() {
        let clients = vec![client(1, DesktopId::Index(1), false), desktop_window(2)];
        let mut s = make_screen(single_monitor(), clients, 2, 0);
        s.show_desktop(true);
        s.set_desktop(1).unwrap();
        assert_eq!(s.wm.visible(), vec![2]);
    }

    //  Commands

    #[test]
    fn out_of_range_switch_request_is_ignored() {
        let mut s = make_screen(single_monitor(), vec![], 2, 0);
        s.handle(Command::SetDesktop(7)).unwrap();
        assert_eq!(s.current_desktop(), 0);
    }

    #[test]
    fn zero_count_request_is_clamped() {
        let mut s = make_screen(single_monitor(), vec![], 3, 2);
        s.handle(Command::SetDesktopCount(0)).unwrap();
        assert_eq!(s.num_desktops(), 1);
        assert_eq!(s.current_desktop(), 0);
    }

    #[test]
    fn shutdown_command_leaves_state_alone() {
        let mut s = make_screen(single_monitor(), vec![], 2, 1);
        s.handle(Command::Shutdown).unwrap();
        assert_eq!(s.current_desktop(), 1);
        assert!(s.wm.calls().is_empty());
    }

    #[derive(Debug, thiserror::Error)]
    #[error("scripted source error")]
    struct ScriptedError;

    /// Emits a fixed list of commands.
    struct ScriptedSource(Vec<Command>);

    impl crate::traits::CommandSource for ScriptedSource {
        type Error = ScriptedError;

        fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), ScriptedError> {
            for cmd in self.0.drain(..) {
                sink.send(cmd).map_err(|_| ScriptedError)?;
            }
            Ok(())
        }
    }

    #[test]
    fn commands_from_a_source_drive_the_screen() {
        use crate::traits::CommandSource;

        let clients = vec![
            client(1, DesktopId::Index(0), true),
            client(2, DesktopId::Index(1), false),
        ];
        let mut s = make_screen(single_monitor(), clients, 2, 0);
        let mut source = ScriptedSource(vec![
            Command::SetDesktopCount(3),
            Command::SetDesktop(2),
            Command::SetDesktop(9),
            Command::ToggleShowDesktop,
        ]);
        let (tx, rx) = mpsc::channel();
        source.run(tx).unwrap();
        for cmd in rx {
            s.handle(cmd).unwrap();
        }

        assert_eq!(s.num_desktops(), 3);
        assert_eq!(s.current_desktop(), 2);
        assert!(s.showing_desktop());
        assert!(s.wm.visible().is_empty());
    }

    //  Busy cursor

    #[test]
    fn busy_tracker_is_created_lazily() {
        let s = make_screen(single_monitor(), vec![], 1, 0);
        assert!(s.busy.is_none());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn startup_events_drive_cursor() {
        let mut s = make_screen(single_monitor(), vec![], 1, 0);
        let rx = collect_events(&mut s);
        let now = Instant::now();
        let start = |id: &str| StartupEvent::new(StartupEventKind::Initiated, id, "xterm");
        let done = |id: &str| StartupEvent::new(StartupEventKind::Completed, id, "xterm");

        s.handle_startup_event(&start("a"), now);
        s.handle_startup_event(&start("b"), now + Duration::from_secs(1));
        s.handle_startup_event(&done("a"), now + Duration::from_secs(2));
        assert_eq!(s.busy_count(), 1);
        assert_eq!(s.next_deadline(), Some(now + Duration::from_secs(31)));
        s.handle_startup_event(&done("b"), now + Duration::from_secs(3));
        assert_eq!(s.busy_count(), 0);

        assert_eq!(
            s.wm.calls(),
            vec![Call::Cursor(Cursor::Busy), Call::Cursor(Cursor::Pointer)]
        );
        let events: Vec<ScreenEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![ScreenEvent::BusyChanged(true), ScreenEvent::BusyChanged(false)]
        );
    }

    #[test]
    fn startup_timeout_resets_cursor() {
        let mut s = make_screen(single_monitor(), vec![], 1, 0);
        let now = Instant::now();
        s.handle_startup_event(&StartupEvent::new(StartupEventKind::Initiated, "a", "slow"), now);
        s.poll_timers(now + Duration::from_secs(10));
        assert_eq!(s.busy_count(), 1);
        s.poll_timers(now + Duration::from_secs(30));
        assert_eq!(s.busy_count(), 0);
        assert_eq!(s.next_deadline(), None);
        assert_eq!(
            s.wm.calls(),
            vec![Call::Cursor(Cursor::Busy), Call::Cursor(Cursor::Pointer)]
        );
    }
}
