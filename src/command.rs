//! Commands accepted by the screen engine.
//!
//! Commands arrive as newline-delimited JSON on the control socket and are
//! handled by [`ScreenState::handle`](crate::screen::ScreenState::handle).
//! Values coming from scripts are accepted loosely: desktop numbers may be
//! JSON numbers or strings, and the show-desktop flag may be a boolean, a
//! number, or one of `"on"`/`"off"`/`"true"`/`"false"`.

use crate::busy::StartupEvent;
use crate::hints::Hint;
use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Every action the screen engine can perform on request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Switch to desktop `n` (0-based).  Out-of-range requests are ignored.
    SetDesktop(#[serde(deserialize_with = "loose_index")] usize),

    /// Change the number of desktops.  Zero is treated as one.
    SetDesktopCount(#[serde(deserialize_with = "loose_index")] usize),

    /// Enter or leave show-desktop mode.
    ShowDesktop(#[serde(deserialize_with = "loose_bool")] bool),

    /// Flip show-desktop mode.
    ToggleShowDesktop,

    /// A startup-notification event from a launcher.
    Startup(StartupEvent),

    /// The display geometry changed; re-read the monitors.
    MonitorsChanged,

    /// Someone else changed a root hint (e.g. a pager set the layout).
    PropertyChanged(Hint),

    /// Stop the daemon, retracting the session hints.
    Shutdown,
}

/// Accept `3` or `"3"`.
fn loose_index<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    struct V;
    impl<'de> Visitor<'de> for V {
        type Value = usize;
        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "non-negative integer or string")
        }
        fn visit_u64<E>(self, n: u64) -> Result<usize, E>
        where
            E: DeError,
        {
            usize::try_from(n).map_err(|_| DeError::custom("desktop number too large"))
        }
        fn visit_i64<E>(self, n: i64) -> Result<usize, E>
        where
            E: DeError,
        {
            usize::try_from(n).map_err(|_| DeError::custom("desktop number must be non-negative"))
        }
        fn visit_str<E>(self, s: &str) -> Result<usize, E>
        where
            E: DeError,
        {
            s.trim()
                .parse()
                .map_err(|_| DeError::custom(format!("expected desktop number, got {:?}", s)))
        }
    }
    deserializer.deserialize_any(V)
}

/// Accept `true`, `1`, `"on"`, `"true"` and their opposites.
fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct V;
    impl<'de> Visitor<'de> for V {
        type Value = bool;
        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boolean, number or \"on\"/\"off\"")
        }
        fn visit_bool<E>(self, b: bool) -> Result<bool, E> {
            Ok(b)
        }
        fn visit_u64<E>(self, n: u64) -> Result<bool, E> {
            Ok(n != 0)
        }
        fn visit_i64<E>(self, n: i64) -> Result<bool, E> {
            Ok(n != 0)
        }
        fn visit_str<E>(self, s: &str) -> Result<bool, E>
        where
            E: DeError,
        {
            match s.trim().to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => Ok(true),
                "off" | "false" | "0" => Ok(false),
                _ => Err(DeError::custom(format!("expected on/off, got {:?}", s))),
            }
        }
    }
    deserializer.deserialize_any(V)
}
