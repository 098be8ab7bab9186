/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The peers' meeting process.
//!
//! Once its listener is up, a peer meets other hosts on a fixed schedule: a first meeting after an initial delay,
//! then one meeting every period. The period is drawn once per process from `[5000, 14000)` milliseconds, in
//! whole seconds, so that peers started together drift apart instead of meeting in lockstep.
//!
//! The schedule runs on its own thread, owned by a [RecurringTask]. A meeting blocks that thread for as long as
//! it runs; the wait for the next meeting starts when it returns.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::context::LocalContext;
use crate::logging;
use crate::messages::ExchangeMessage;
use crate::networking::Transport;

/// Draw a meeting period: a whole number of seconds in `[5, 14)`, in milliseconds.
pub fn jittered_period<R: Rng>(rng: &mut R) -> Duration {
    let seconds = rng.gen_range(0u64, 9) + 5;
    Duration::from_millis(seconds * 1000)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeetingSchedule {
    pub initial_delay: Duration,
    period: Duration,
}

impl MeetingSchedule {
    pub fn jittered<R: Rng>(initial_delay: Duration, rng: &mut R) -> MeetingSchedule {
        MeetingSchedule {
            initial_delay,
            period: jittered_period(rng),
        }
    }

    /// A schedule whose period is drawn from a generator seeded with the current time.
    pub fn from_clock(initial_delay: Duration) -> MeetingSchedule {
        let seed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|since_epoch| since_epoch.as_millis() as u64)
            .unwrap_or(0);
        Self::jittered(initial_delay, &mut StdRng::seed_from_u64(seed))
    }

    /// A schedule with a given period. Used where the jitter gets in the way, e.g. in tests.
    pub fn fixed(initial_delay: Duration, period: Duration) -> MeetingSchedule {
        MeetingSchedule { initial_delay, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

/// One meeting. May be invoked while a previous invocation is still running.
pub trait Meeting: Send + Sync {
    fn meet(&self);
}

impl<F: Fn() + Send + Sync> Meeting for F {
    fn meet(&self) {
        self()
    }
}

/// Meets a uniformly random known host of the local routing view by sending it the local host.
pub struct ExchangeMeeting<T: Transport> {
    context: Arc<LocalContext>,
    transport: T,
}

impl<T: Transport> ExchangeMeeting<T> {
    pub fn new(context: Arc<LocalContext>, transport: T) -> ExchangeMeeting<T> {
        ExchangeMeeting { context, transport }
    }
}

impl<T: Transport> Meeting for ExchangeMeeting<T> {
    fn meet(&self) {
        let Some(view) = self.context.routing_view() else {
            log::warn!("Skipping meeting: the local routing view is not set");
            return;
        };
        let Some(peer) = view.hosts().choose(&mut rand::thread_rng()) else {
            log::debug!("Skipping meeting: no known hosts");
            return;
        };

        let meet = ExchangeMessage::Meet {
            origin: view.localhost().clone(),
        };
        match self.transport.send(peer, &meet.into()) {
            Ok(()) => logging::debug::met(peer),
            Err(err) => log::warn!("Failed to meet {}: {}", peer.name(), err),
        }
    }
}

/// Start calling `meeting` on `schedule` from a new thread.
pub fn start_meetings<M: Meeting + 'static>(schedule: MeetingSchedule, meeting: Arc<M>) -> RecurringTask {
    let (cancel, cancelled) = mpsc::channel::<()>();
    let thread = thread::spawn(move || {
        let mut wait = schedule.initial_delay;
        loop {
            match cancelled.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => meeting.meet(),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
            wait = schedule.period;
        }
    });
    logging::info::started_meetings(schedule.initial_delay, schedule.period);

    RecurringTask {
        period: schedule.period,
        thread: Some(thread),
        cancel,
    }
}

/// A running schedule. When this value is dropped, the schedule is cancelled and its thread joined.
pub struct RecurringTask {
    period: Duration,
    thread: Option<JoinHandle<()>>,
    cancel: Sender<()>,
}

impl RecurringTask {
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stop the schedule. A meeting in progress runs to completion first.
    pub fn cancel(mut self) {
        self.stop()
    }

    fn stop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.cancel.send(());
            let _ = thread.join();
        }
    }
}

impl Drop for RecurringTask {
    fn drop(&mut self) {
        self.stop()
    }
}
