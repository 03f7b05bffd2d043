//! IPC listener that accepts commands over a Unix socket.
//!
//! Launchers, pagers and key-bind scripts connect to the socket and send
//! newline-delimited JSON commands.  Termination signals are turned into a
//! [`Shutdown`](crate::command::Command::Shutdown) command by
//! [`signals::SignalListener`].

pub mod listener;
pub mod signals;
