//! Signal handling for the dawnlight daemon.
//!
//! A dedicated thread owns the `signal_hook` iterator and turns process signals
//! into [`SignalMessage`]s sent over a channel. The scheduler loop waits on that
//! channel instead of sleeping, so a shutdown request ends a sleep immediately.
//!
//! - `SIGINT`, `SIGTERM`: shut down
//! - `SIGHUP`, `SIGUSR2`: reload the configuration file

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{Receiver, Sender},
    thread,
};

/// Messages delivered from the signal thread to the scheduler loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalMessage {
    /// Configuration reload request (SIGHUP, SIGUSR2)
    Reload,
    /// Shutdown request (SIGINT, SIGTERM)
    Shutdown,
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Atomic flag indicating if the application should keep running
    pub running: Arc<AtomicBool>,
    /// Channel receiver for signal messages
    pub signal_receiver: Receiver<SignalMessage>,
    /// Channel sender, kept so tests and the simulator can inject messages
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// State with no OS signal thread attached; messages only arrive through
    /// `signal_sender`.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = std::sync::mpsc::channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Register the signal handlers and spawn the forwarding thread.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running = state.running.clone();
    let sender = state.signal_sender.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            let message = match sig {
                SIGHUP | SIGUSR2 => {
                    if debug_enabled {
                        log_pipe!();
                        log_debug!("Received reload signal ({sig})");
                    }
                    SignalMessage::Reload
                }
                _ => {
                    log_pipe!();
                    log_info!("Received shutdown signal");
                    running.store(false, Ordering::SeqCst);
                    SignalMessage::Shutdown
                }
            };

            // The receiver is gone once the loop has exited
            if sender.send(message).is_err() {
                break;
            }
        }
    });

    Ok(state)
}
