//! **desktopd**: the screen half of a window manager.
//!
//! This crate owns everything that is screen-wide rather than per-window:
//! the set of virtual desktops and their names and layout, the usable
//! *work area* of every desktop on every monitor once panels have reserved
//! their struts, switching between desktops, show-desktop mode, and the busy
//! cursor shown while applications are launching.
//!
//! # Architecture
//!
//! The crate is organised around three seams:
//!
//! * [`traits::WindowSystem`]: the display server plus the client, stacking
//!   and focus subsystems the engine drives but does not own.
//! * [`hints::PropertyPublisher`]: where screen state is published for
//!   pagers and taskbars.
//! * [`traits::CommandSource`]: the transport that delivers requests (a Unix
//!   socket in the daemon).
//!
//! [`screen::ScreenState`] ties them together.  The pure building blocks it
//! uses ([`desktop`], [`layout`], [`workarea`], [`busy`]) have no I/O and are
//! tested on their own.  [`headless`] provides an in-memory window system and
//! a file-backed hint store so the daemon can run without a display server.

pub mod busy;
pub mod command;
pub mod config;
pub mod desktop;
pub mod geometry;
pub mod headless;
pub mod hints;
pub mod ipc;
pub mod layout;
pub mod screen;
pub mod traits;
pub mod workarea;
