//! Command execution off the event loop.
//!
//! The store only queues [`Command`]s. The runtime hands them to a worker
//! thread that owns the real collaborators, and the event loop polls the
//! completion channel between events. Store state is only touched on the
//! event-loop thread; the worker never sees it.

use crate::model::{CacheKeyError, ScanError, Suggestion};
use crate::source::{CacheKeyLister, SuggestionScanner};
use crate::state::{Command, SleuthState};
use std::cell::Cell;
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Result of one command, sent back from the worker.
#[derive(Debug)]
enum Completion {
    Suggestions(Result<Vec<Suggestion>, ScanError>),
    CacheKeys {
        generation: u64,
        result: Result<Vec<String>, CacheKeyError>,
    },
}

fn execute(
    scanner: &dyn SuggestionScanner,
    lister: &dyn CacheKeyLister,
    command: Command,
) -> Completion {
    debug!(?command, "Executing command");
    match command {
        Command::ScanSuggestions => Completion::Suggestions(scanner.scan()),
        Command::ListCacheKeys {
            generation,
            cache_path,
        } => Completion::CacheKeys {
            generation,
            result: lister.list_keys(&cache_path),
        },
    }
}

/// Executes store commands on a background thread.
///
/// Dropping the runtime closes the job channel; the worker exits after the
/// command it is running, and its result is discarded.
pub struct Runtime {
    jobs: Sender<Command>,
    completions: Receiver<Completion>,
    in_flight: Cell<usize>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("in_flight", &self.in_flight.get())
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Spawn the worker that owns the collaborators.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the worker thread cannot be spawned.
    pub fn new(
        scanner: impl SuggestionScanner + Send + 'static,
        lister: impl CacheKeyLister + Send + 'static,
    ) -> io::Result<Self> {
        let (jobs, job_rx) = mpsc::channel::<Command>();
        let (done_tx, completions) = mpsc::channel();

        thread::Builder::new()
            .name("sleuth-runtime".to_string())
            .spawn(move || {
                for command in job_rx {
                    let completion = execute(&scanner, &lister, command);
                    if done_tx.send(completion).is_err() {
                        break;
                    }
                }
                debug!("Runtime worker stopped");
            })?;

        Ok(Self {
            jobs,
            completions,
            in_flight: Cell::new(0),
        })
    }

    /// Whether any submitted command has not been delivered yet.
    pub fn is_busy(&self) -> bool {
        self.in_flight.get() > 0
    }

    /// Hand queued commands to the worker. Returns how many were sent.
    pub fn submit(&self, state: &mut SleuthState) -> usize {
        let mut sent = 0;
        for command in state.take_commands() {
            match self.jobs.send(command) {
                Ok(()) => {
                    self.in_flight.set(self.in_flight.get() + 1);
                    sent += 1;
                }
                Err(mpsc::SendError(command)) => {
                    warn!(?command, "Runtime worker is gone, dropping command");
                }
            }
        }
        sent
    }

    /// Deliver every completion that is ready, without blocking. Returns
    /// how many were delivered.
    pub fn poll(&self, state: &mut SleuthState) -> usize {
        let mut delivered = 0;
        loop {
            match self.completions.try_recv() {
                Ok(completion) => {
                    self.deliver(state, completion);
                    delivered += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.worker_lost();
                    break;
                }
            }
        }
        delivered
    }

    /// One event-loop step: submit, deliver what is ready, then submit
    /// anything the deliveries queued. Returns how many were delivered.
    pub fn pump(&self, state: &mut SleuthState) -> usize {
        self.submit(state);
        let delivered = self.poll(state);
        if delivered > 0 {
            self.submit(state);
        }
        delivered
    }

    /// Block until nothing is queued or in flight, or `timeout` elapses.
    /// Returns true when the runtime went idle.
    pub fn settle(&self, state: &mut SleuthState, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.submit(state);
            if !self.is_busy() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.completions.recv_timeout(remaining) {
                Ok(completion) => self.deliver(state, completion),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    self.worker_lost();
                    return false;
                }
            }
        }
    }

    fn deliver(&self, state: &mut SleuthState, completion: Completion) {
        self.in_flight.set(self.in_flight.get().saturating_sub(1));
        match completion {
            Completion::Suggestions(result) => state.receive_suggestions(result),
            Completion::CacheKeys { generation, result } => {
                state.receive_cache_keys(generation, result)
            }
        }
    }

    fn worker_lost(&self) {
        if self.is_busy() {
            warn!(lost = self.in_flight.get(), "Runtime worker exited with commands in flight");
            self.in_flight.set(0);
        }
    }
}
