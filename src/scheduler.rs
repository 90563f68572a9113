//! Fixed-cadence tick driver
//!
//! The simulation runs on its own thread and owns the [`Session`]. Input
//! threads talk to it through a [`SchedulerHandle`]: commands go in over a
//! channel and are drained at the start of the next tick, frames come out
//! through a shared slot and the render hook.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::sim::{Command, Frame, Session, SessionPhase, tick};

/// Receives a frame after every tick, on the simulation thread
pub trait RenderHook: Send + 'static {
    fn render(&mut self, frame: &Frame);
}

impl<F> RenderHook for F
where
    F: FnMut(&Frame) + Send + 'static,
{
    fn render(&mut self, frame: &Frame) {
        (*self)(frame)
    }
}

/// Simulation loop state, moved onto the worker thread
pub struct Scheduler {
    session: Session,
    hook: Box<dyn RenderHook>,
    commands: Receiver<Command>,
    running: Arc<AtomicBool>,
    latest: Arc<Mutex<Frame>>,
    tick_interval: Duration,
    idle_interval: Duration,
}

impl Scheduler {
    /// Start the loop on a dedicated thread
    pub fn spawn<H: RenderHook>(session: Session, hook: H) -> io::Result<SchedulerHandle> {
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let latest = Arc::new(Mutex::new(session.frame()));

        let scheduler = Scheduler {
            tick_interval: session.settings().tick_interval(),
            idle_interval: session.settings().idle_interval(),
            session,
            hook: Box::new(hook),
            commands: rx,
            running: Arc::clone(&running),
            latest: Arc::clone(&latest),
        };

        let thread = thread::Builder::new()
            .name("broomsticks-sim".into())
            .spawn(move || scheduler.run())?;

        Ok(SchedulerHandle {
            commands: Some(tx),
            running,
            latest,
            thread: Some(thread),
        })
    }

    fn run(mut self) -> Session {
        log::info!(
            "Scheduler running: tick {:?}, idle {:?}",
            self.tick_interval,
            self.idle_interval
        );
        let mut pending = Vec::new();

        while self.running.load(Ordering::Acquire) {
            if self.session.phase() == SessionPhase::Playing {
                let started = Instant::now();
                pending.extend(self.commands.try_iter());
                self.step(&pending);
                pending.clear();

                let elapsed = started.elapsed();
                if elapsed < self.tick_interval {
                    thread::sleep(self.tick_interval - elapsed);
                } else {
                    log::warn!(
                        "Tick took {:?}, exceeding budget of {:?}",
                        elapsed,
                        self.tick_interval
                    );
                }
                continue;
            }

            // Idle: wake early for input so start/restart feel immediate
            match self.commands.recv_timeout(self.idle_interval) {
                Ok(command) => {
                    pending.push(command);
                    pending.extend(self.commands.try_iter());
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log::debug!("Command channel closed, scheduler exiting");
                    break;
                }
            }
            self.step(&pending);
            pending.clear();
        }

        log::info!("Scheduler stopped after {} play ticks", self.session.play_ticks());
        self.session
    }

    /// Run one tick and publish the resulting frame
    fn step(&mut self, commands: &[Command]) {
        let session = &mut self.session;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| tick(session, commands))) {
            log::error!("Tick panicked: {}", panic_message(payload.as_ref()));
        }

        let frame = self.session.frame();
        let hook = &mut self.hook;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| hook.render(&frame))) {
            log::error!("Render hook panicked: {}", panic_message(payload.as_ref()));
        }

        match self.latest.lock() {
            Ok(mut slot) => *slot = frame,
            Err(poisoned) => *poisoned.into_inner() = frame,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Control surface for a running [`Scheduler`]. Dropping it stops the loop.
pub struct SchedulerHandle {
    commands: Option<Sender<Command>>,
    running: Arc<AtomicBool>,
    latest: Arc<Mutex<Frame>>,
    thread: Option<JoinHandle<Session>>,
}

impl SchedulerHandle {
    /// Queue a command for the next tick. Returns false if the loop has exited.
    pub fn send(&self, command: Command) -> bool {
        let sent = self
            .commands
            .as_ref()
            .is_some_and(|tx| tx.send(command).is_ok());
        if !sent {
            log::warn!("Dropping {command:?}: simulation thread is gone");
        }
        sent
    }

    /// Frame published by the most recent tick
    pub fn frame(&self) -> Frame {
        match self.latest.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Ask the loop to stop after the in-flight tick and wait for it.
    /// Returns the final session, or `None` if the thread panicked.
    pub fn stop(mut self) -> Option<Session> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<Session> {
        self.running.store(false, Ordering::Release);
        // Closing the channel wakes an idle loop immediately
        self.commands.take();
        let thread = self.thread.take()?;
        match thread.join() {
            Ok(session) => Some(session),
            Err(_) => {
                log::error!("Simulation thread panicked");
                None
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
