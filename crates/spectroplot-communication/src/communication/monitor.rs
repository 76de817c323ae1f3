//! Background link monitor
//!
//! A dedicated `link-monitor` thread polls the plotter every cycle: it
//! writes the status query and drains the input under the link lock, then
//! sleeps outside the lock. The loop ends when the shutdown flag is set or
//! the link reports a disconnect.

use crate::communication::link::Link;
use spectroplot_core::{cancel_flag, CancelFlag, Error, Result};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default poll interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle to the running monitor thread
pub struct LinkMonitor {
    link: Arc<Link>,
    shutdown: CancelFlag,
    handle: Option<JoinHandle<()>>,
}

impl LinkMonitor {
    /// Start polling `link` every `poll_interval`
    pub fn spawn(link: Arc<Link>, poll_interval: Duration) -> Result<Self> {
        let shutdown = cancel_flag();
        let thread_link = link.clone();
        let thread_shutdown = shutdown.clone();

        let handle = thread::Builder::new()
            .name("link-monitor".to_string())
            .spawn(move || run_loop(&thread_link, &thread_shutdown, poll_interval))
            .map_err(Error::Io)?;

        tracing::info!("Link monitor started ({:?} interval)", poll_interval);
        Ok(Self {
            link,
            shutdown,
            handle: Some(handle),
        })
    }

    /// Whether the poll thread is still alive
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the thread and close the link. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Link monitor thread panicked");
            }
            tracing::info!("Link monitor stopped");
        }
        self.link.close();
    }
}

impl Drop for LinkMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(link: &Link, shutdown: &CancelFlag, poll_interval: Duration) {
    while !shutdown.load(Ordering::SeqCst) {
        thread::sleep(poll_interval);
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        match link.poll_once() {
            Ok(outcome) => {
                if outcome.dropped > 0 {
                    tracing::debug!("{} malformed frame(s) this cycle", outcome.dropped);
                }
            }
            Err(e) => {
                tracing::error!("Link monitor exiting: {}", e);
                break;
            }
        }
    }
}
