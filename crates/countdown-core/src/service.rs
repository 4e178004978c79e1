//! Host scheduler for a [`TimerEngine`].
//!
//! One tokio task owns the engine and is its only writer. Callers talk to it
//! through a cloneable [`TimerHandle`]: every action is queued on a single
//! mpsc channel and answered over a oneshot, so actions and ticks are applied
//! strictly one after another.
//!
//! The recurring tick is a [`tokio::time::Interval`] that exists only while
//! the engine reports an active schedule. After each action the interval is
//! brought in line with the engine *before* the reply is sent, so a caller
//! that sees `pause()` return can rely on no further decrement happening.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::debug;

use crate::alert::AlertSignal;
use crate::error::TimerError;
use crate::events::Event;
use crate::timer::{Preset, ScheduleHandle, TimerEngine, TimerSnapshot};

/// Interval between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const COMMAND_BUFFER: usize = 32;
const EVENT_BUFFER: usize = 64;

enum Command {
    Configure {
        minutes: u32,
        seconds: u32,
        reply: oneshot::Sender<Result<Event, TimerError>>,
    },
    Preset {
        preset: Preset,
        reply: oneshot::Sender<Result<Event, TimerError>>,
    },
    Start {
        reply: oneshot::Sender<Result<Option<Event>, TimerError>>,
    },
    Pause {
        reply: oneshot::Sender<Option<Event>>,
    },
    Reset {
        reply: oneshot::Sender<Result<Event, TimerError>>,
    },
    Snapshot {
        reply: oneshot::Sender<TimerSnapshot>,
    },
    Shutdown,
}

struct Ticker {
    handle: ScheduleHandle,
    interval: Interval,
}

/// Task that owns a [`TimerEngine`] and drives its tick.
pub struct TimerService<A> {
    engine: TimerEngine<A>,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<TimerSnapshot>,
    events: broadcast::Sender<Event>,
    ticker: Option<Ticker>,
}

impl<A: AlertSignal + 'static> TimerService<A> {
    /// Build the service and a handle to it without starting the task.
    pub fn new(engine: TimerEngine<A>) -> (Self, TimerHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let (event_tx, event_rx) = broadcast::channel(EVENT_BUFFER);

        let handle = TimerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            events: event_rx,
        };
        let service = Self {
            engine,
            commands: command_rx,
            snapshots: snapshot_tx,
            events: event_tx,
            ticker: None,
        };
        (service, handle)
    }

    /// Spawn the service on the current runtime.
    pub fn spawn(engine: TimerEngine<A>) -> (TimerHandle, JoinHandle<()>) {
        let (service, handle) = Self::new(engine);
        let task = tokio::spawn(service.run());
        (handle, task)
    }

    /// Process actions and ticks until shut down or every handle is dropped.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                handle = next_tick(&mut self.ticker) => {
                    let event = self.engine.tick(handle);
                    self.settle(event.as_ref());
                }
            }
        }
        debug!("timer service stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Configure {
                minutes,
                seconds,
                reply,
            } => {
                let result = self.engine.configure(minutes, seconds);
                self.settle(result.as_ref().ok());
                let _ = reply.send(result);
            }
            Command::Preset { preset, reply } => {
                let result = self.engine.apply_preset(preset);
                self.settle(result.as_ref().ok());
                let _ = reply.send(result);
            }
            Command::Start { reply } => {
                let result = self.engine.start();
                self.settle(result.as_ref().ok().and_then(Option::as_ref));
                let _ = reply.send(result);
            }
            Command::Pause { reply } => {
                let event = self.engine.pause();
                self.settle(event.as_ref());
                let _ = reply.send(event);
            }
            Command::Reset { reply } => {
                let result = self.engine.reset();
                self.settle(result.as_ref().ok());
                let _ = reply.send(result);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.engine.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    /// Align the interval with the engine, then publish what changed.
    fn settle(&mut self, event: Option<&Event>) {
        self.reconcile_ticker();
        if let Some(event) = event {
            // No subscribers is fine.
            let _ = self.events.send(event.clone());
            self.snapshots.send_replace(self.engine.snapshot());
        }
    }

    fn reconcile_ticker(&mut self) {
        let wanted = self.engine.active_schedule();
        if wanted == self.ticker.as_ref().map(|t| t.handle) {
            return;
        }
        self.ticker = wanted.map(|handle| {
            debug!(generation = handle.generation(), "scheduling tick");
            let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Ticker { handle, interval }
        });
    }
}

async fn next_tick(ticker: &mut Option<Ticker>) -> ScheduleHandle {
    match ticker {
        Some(ticker) => {
            ticker.interval.tick().await;
            ticker.handle
        }
        None => std::future::pending().await,
    }
}

/// Client side of a running [`TimerService`].
///
/// The service holds the only event sender, so subscribers see
/// `RecvError::Closed` once the service task has exited.
pub struct TimerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<TimerSnapshot>,
    events: broadcast::Receiver<Event>,
}

impl Clone for TimerHandle {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            snapshots: self.snapshots.clone(),
            events: self.events.resubscribe(),
        }
    }
}

impl TimerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, TimerError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| TimerError::ServiceStopped)?;
        response.await.map_err(|_| TimerError::ServiceStopped)
    }

    pub async fn configure(&self, minutes: u32, seconds: u32) -> Result<Event, TimerError> {
        self.request(|reply| Command::Configure {
            minutes,
            seconds,
            reply,
        })
        .await?
    }

    pub async fn apply_preset(&self, preset: Preset) -> Result<Event, TimerError> {
        self.request(|reply| Command::Preset { preset, reply })
            .await?
    }

    pub async fn start(&self) -> Result<Option<Event>, TimerError> {
        self.request(|reply| Command::Start { reply }).await?
    }

    pub async fn pause(&self) -> Result<Option<Event>, TimerError> {
        self.request(|reply| Command::Pause { reply }).await
    }

    pub async fn reset(&self) -> Result<Event, TimerError> {
        self.request(|reply| Command::Reset { reply }).await?
    }

    pub async fn snapshot(&self) -> Result<TimerSnapshot, TimerError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Most recently published snapshot, without a round trip.
    pub fn latest(&self) -> TimerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that sees a new snapshot after every state change.
    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshots.clone()
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.resubscribe()
    }

    /// Ask the service task to exit. Later requests fail with `ServiceStopped`.
    pub async fn shutdown(&self) -> Result<(), TimerError> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| TimerError::ServiceStopped)
    }
}
