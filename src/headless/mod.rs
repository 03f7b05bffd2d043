//! A display-server-free backend.
//!
//! [`wm::HeadlessWm`] keeps a scene of monitors and windows in memory and
//! implements [`WindowSystem`](crate::traits::WindowSystem) over it;
//! [`hints::JsonHintStore`] publishes root hints to a JSON file that pagers
//! and scripts can read.

pub mod hints;
pub mod wm;
