use std::collections::HashMap;
use std::convert::TryFrom;
use std::sync::mpsc;

use log::debug;

use crate::util::config::Config;

/// Sent when an elevator has reached `floor` and its door wait is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arrival {
    pub id: usize,
    pub floor: u8,
}

/// Time from leaving `from` until the elevator is free again at `to`.
/// Saturates rather than overflowing for configs that skipped validation.
pub fn travel_time(config: &Config, from: u8, to: u8) -> chrono::Duration {
    let floors = if to > from { to - from } else { from - to };
    let millis = u64::from(floors)
        .saturating_mul(config.speed_per_floor_ms)
        .saturating_add(config.door_wait_ms)
        .min(MAX_TRAVEL_MS);
    chrono::Duration::milliseconds(i64::try_from(millis).unwrap_or(i64::MAX))
}

// A year. Well inside what chrono and the timer thread accept.
const MAX_TRAVEL_MS: u64 = 365 * 24 * 3_600_000;

/// Stands in for the animation layer: schedules one arrival per moving elevator.
pub struct TravelTimer {
    config: Config,
    timer: timer::MessageTimer<Arrival>,
    trips: HashMap<usize, timer::Guard>,
}

impl TravelTimer {
    pub fn new(config: Config) -> (TravelTimer, mpsc::Receiver<Arrival>) {
        let (arrival_tx, arrival_rx) = mpsc::channel::<Arrival>();
        let travel_timer = TravelTimer {
            config: config,
            timer: timer::MessageTimer::new(arrival_tx),
            trips: HashMap::new(),
        };
        (travel_timer, arrival_rx)
    }

    /// Starts a trip for `id`. A trip already running for `id` is cancelled.
    pub fn schedule(&mut self, id: usize, from: u8, to: u8) {
        let delay = travel_time(&self.config, from, to);
        debug!("Elevator {} travelling {} -> {} ({} ms)", id, from, to, delay.num_milliseconds());
        let guard = self.timer.schedule_with_delay(delay, Arrival { id: id, floor: to });
        self.trips.insert(id, guard);
    }

    /// Forgets the trip once its arrival has been handled.
    pub fn on_arrival(&mut self, arrival: Arrival) {
        self.trips.remove(&arrival.id);
    }

    pub fn cancel_all(&mut self) {
        self.trips.clear();
    }

    pub fn in_flight(&self) -> usize {
        self.trips.len()
    }
}
