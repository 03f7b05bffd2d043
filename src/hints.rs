//! Root-window hints: the vocabulary used to publish screen state for
//! pagers and taskbars, and the [`PropertyPublisher`] trait that stores
//! them.
//!
//! The screen engine never knows how a hint is encoded; it hands a
//! [`HintValue`] to the publisher and reads values back on demand.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every hint the screen engine reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hint {
    /// Process id of the running manager.
    ManagerPid,
    /// List of hints this manager understands.
    Supported,
    /// Name of the running manager.
    SupportingWmName,
    /// `[width, height]` of the combined screen.
    DesktopGeometry,
    NumberOfDesktops,
    /// Two zeroes per desktop; kept only for old pagers.
    DesktopViewport,
    DesktopNames,
    CurrentDesktop,
    ShowingDesktop,
    /// Orientation, columns, rows, starting corner.
    DesktopLayout,
    /// `x, y, width, height` per desktop.
    Workarea,
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Hints advertised in [`Hint::Supported`].
pub const SUPPORTED_HINTS: &[Hint] = &[
    Hint::SupportingWmName,
    Hint::DesktopGeometry,
    Hint::NumberOfDesktops,
    Hint::DesktopViewport,
    Hint::DesktopNames,
    Hint::CurrentDesktop,
    Hint::ShowingDesktop,
    Hint::DesktopLayout,
    Hint::Workarea,
];

/// The value stored in a hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintValue {
    Cardinal(u32),
    Cardinals(Vec<u32>),
    /// Signed coordinates, used for work areas.
    Integers(Vec<i32>),
    Text(String),
    Strings(Vec<String>),
    Hints(Vec<Hint>),
}

impl HintValue {
    /// View the value as a list of cardinals; a single cardinal is a
    /// one-element list.
    pub fn as_cardinals(&self) -> Option<Vec<u32>> {
        match self {
            HintValue::Cardinal(v) => Some(vec![*v]),
            HintValue::Cardinals(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&[String]> {
        match self {
            HintValue::Strings(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for HintValue {
    fn from(v: bool) -> Self {
        HintValue::Cardinal(u32::from(v))
    }
}

/// Storage for root-window hints.
///
/// On X11 this would write properties on the root window; the daemon uses a
/// JSON file.  Failures are advisory: the screen engine logs them and
/// carries on.
pub trait PropertyPublisher {
    /// The error type produced by this publisher.
    type Error: std::error::Error + Send + 'static;

    /// Store `value` under `hint`, replacing any previous value.
    fn set(&self, hint: Hint, value: HintValue) -> Result<(), Self::Error>;

    /// Read the current value of `hint`, or `None` if it is not set.
    fn get(&self, hint: Hint) -> Result<Option<HintValue>, Self::Error>;

    /// Remove `hint` entirely.
    fn erase(&self, hint: Hint) -> Result<(), Self::Error>;
}
