use log::{info, warn};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::utils::error::BeaconError;

/// Why [`MainLoop::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// `quit` was called, with the reason given.
    Quit(String),
    /// Ctrl-C was received.
    Interrupted,
}

#[derive(Debug)]
enum LoopEvent {
    Quit(String),
}

/// Cloneable handle for scheduling work on, and quitting, a [`MainLoop`].
#[derive(Debug, Clone)]
pub struct LoopHandle {
    events: mpsc::UnboundedSender<LoopEvent>,
}

impl LoopHandle {
    /// Asks the loop to stop. Only the first request is observed.
    pub fn quit(&self, reason: impl Into<String>) {
        if self.events.send(LoopEvent::Quit(reason.into())).is_err() {
            warn!("⚠️ Main loop already stopped");
        }
    }

    /// Calls `callback` every `period`, first after one full period, until it
    /// resolves to `false`.
    pub fn timeout_add<F, Fut>(&self, period: Duration, mut callback: F) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !callback().await {
                    break;
                }
            }
        })
    }

    /// Runs `call` without blocking the loop and hands its outcome to
    /// `on_reply` or `on_error`.
    pub fn call_async<Fut, T, R, E>(&self, call: Fut, on_reply: R, on_error: E) -> JoinHandle<()>
    where
        Fut: Future<Output = Result<T, BeaconError>> + Send + 'static,
        T: Send + 'static,
        R: FnOnce(T) + Send + 'static,
        E: FnOnce(BeaconError, &LoopHandle) + Send + 'static,
    {
        let handle = self.clone();
        tokio::spawn(async move {
            match call.await {
                Ok(reply) => on_reply(reply),
                Err(e) => on_error(e, &handle),
            }
        })
    }
}

/// Event loop of the peripheral. Bus dispatch, timers and call completions
/// all run as tasks on the surrounding runtime; the loop itself only waits
/// for a quit request or Ctrl-C.
pub struct MainLoop {
    handle: LoopHandle,
    events: mpsc::UnboundedReceiver<LoopEvent>,
}

impl MainLoop {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            handle: LoopHandle { events: tx },
            events: rx,
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub async fn run(mut self) -> LoopExit {
        info!("🔄 Main loop running, press Ctrl+C to stop");
        tokio::select! {
            event = self.events.recv() => match event {
                Some(LoopEvent::Quit(reason)) => {
                    info!("🛑 Main loop quit: {}", reason);
                    LoopExit::Quit(reason)
                }
                None => LoopExit::Quit("event channel closed".to_string()),
            },
            Ok(()) = tokio::signal::ctrl_c() => {
                info!("🛑 Interrupted, stopping main loop...");
                LoopExit::Interrupted
            }
        }
    }
}

impl Default for MainLoop {
    fn default() -> Self {
        Self::new()
    }
}
