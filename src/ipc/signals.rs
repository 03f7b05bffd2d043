//! [`CommandSource`] that turns termination signals into
//! [`Command::Shutdown`].

use crate::command::Command;
use crate::traits::CommandSource;
use log::info;
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::sync::mpsc;

/// Listens for SIGINT and SIGTERM.
///
/// The handlers are installed by [`new`](SignalListener::new), so signals
/// arriving before [`run`](CommandSource::run) starts are not lost.
pub struct SignalListener {
    signals: Signals,
}

/// Errors produced by the signal listener.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SignalListener {
    pub fn new() -> Result<Self, SignalError> {
        Self::with_signals(&[SIGINT, SIGTERM])
    }

    /// Listen for `signals` instead of the default pair.
    pub fn with_signals(signals: &[i32]) -> Result<Self, SignalError> {
        let signals = Signals::new(signals).map_err(std::io::Error::other)?;
        Ok(Self { signals })
    }
}

impl CommandSource for SignalListener {
    type Error = SignalError;

    /// Block until the first signal, send a single [`Command::Shutdown`]
    /// and return.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        if let Some(signal) = self.signals.forever().next() {
            info!("received signal {}, shutting down", signal);
            let _ = sink.send(Command::Shutdown);
        }
        Ok(())
    }
}
