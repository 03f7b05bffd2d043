//! Entry point for the **desktopd** daemon.
//!
//! Builds the headless window system and the JSON hint store from the
//! config file, takes over the screen, and then processes commands from the
//! Unix socket on the main thread.  Startup-notification timeouts are fired
//! from the same loop by waiting on the command channel with a timeout.
//! SIGINT, SIGTERM or a `"Shutdown"` command end the loop, after which the
//! session hints are retracted.

use desktopd::command::Command;
use desktopd::config::{Config, HeadlessConfig};
use desktopd::headless::hints::JsonHintStore;
use desktopd::headless::wm::HeadlessWm;
use desktopd::hints::PropertyPublisher;
use desktopd::ipc::listener::UnixSocketListener;
use desktopd::ipc::signals::SignalListener;
use desktopd::screen::ScreenState;
use desktopd::traits::{CommandSource, WindowSystem};
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Instant;

/// `$XDG_RUNTIME_DIR`, or `/tmp` when unset.
fn runtime_dir() -> PathBuf {
    PathBuf::from(std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into()))
}

/// Default socket path for the command listener.
fn default_socket_path() -> PathBuf {
    runtime_dir().join("desktopd.sock")
}

/// Lock file marking the screen as managed.
fn lock_path(screen: u32) -> PathBuf {
    runtime_dir().join(format!("desktopd-{}.lock", screen))
}

fn hint_path(config: &HeadlessConfig) -> PathBuf {
    config
        .hint_file
        .clone()
        .unwrap_or_else(|| runtime_dir().join("desktopd-hints.json"))
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/desktopd`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("desktopd")
}

/// Try to load the config from `$XDG_CONFIG_HOME/desktopd/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();
    let headless = &config.headless;

    let wm = HeadlessWm::new(headless, config.desktops.startup_desktop)
        .with_lock_file(lock_path(headless.screen));
    let hints = JsonHintStore::new(hint_path(headless));
    info!("publishing hints to {}", hints.path().display());

    let mut screen = ScreenState::new(wm, hints, headless.screen);
    if let Err(e) = screen.annex() {
        error!("{}", e);
        std::process::exit(1);
    }
    if let Err(e) = screen.startup(&config.desktops) {
        error!("startup failed: {}", e);
        screen.shutdown();
        std::process::exit(1);
    }
    for window in &headless.windows {
        screen.manage_focus(window.id, window.desktop);
    }

    let signals = match SignalListener::new() {
        Ok(signals) => signals,
        Err(e) => {
            error!("failed to install signal handlers: {}", e);
            screen.shutdown();
            std::process::exit(1);
        }
    };

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx, signals);

    run_event_loop(&mut screen, cmd_rx);
    screen.shutdown();
    let _ = std::fs::remove_file(default_socket_path());
}

//  Event loop

fn run_event_loop<W: WindowSystem, P: PropertyPublisher>(
    screen: &mut ScreenState<W, P>,
    cmd_rx: mpsc::Receiver<Command>,
) {
    info!("desktopd running");
    loop {
        let cmd = match screen.next_deadline() {
            Some(deadline) => {
                match cmd_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(cmd) => Some(cmd),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match cmd_rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            },
        };

        if cmd == Some(Command::Shutdown) {
            break;
        }
        if let Some(cmd) = cmd {
            if let Err(e) = screen.handle(cmd) {
                error!("command error: {}", e);
            }
        }
        screen.poll_timers(Instant::now());
    }
    info!("event loop finished, exiting");
}

//  Helpers

fn spawn_command_sources(tx: mpsc::Sender<Command>, mut signals: SignalListener) {
    {
        let tx = tx.clone();
        let path = default_socket_path();
        std::thread::spawn(move || {
            let mut source = UnixSocketListener::new(&path);
            if let Err(e) = source.run(tx) {
                error!("socket listener error: {}", e);
            }
        });
    }

    std::thread::spawn(move || {
        if let Err(e) = signals.run(tx) {
            error!("signal listener error: {}", e);
        }
    });
}
