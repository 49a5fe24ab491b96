use std::sync::Arc;

use log::debug;

use crate::registry::elevator::Elevator;
use crate::store::state_store::{self, StateStore};
use crate::util::config::Config;
use crate::util::constants::{QUEUE_KEY, STATE_KEY};
use crate::util::error::{DispatchError, Result, StoreError};

/// Reads and transitions the roster. Every call re-fetches from the store and
/// writes back a complete roster, never a single field.
///
/// Callers are expected to hold the dispatch lock around a read-decide-write
/// sequence; the registry itself does no locking.
#[derive(Clone)]
pub struct ElevatorRegistry {
    store: Arc<dyn StateStore>,
    config: Config,
}

impl ElevatorRegistry {
    pub fn new(store: Arc<dyn StateStore>, config: Config) -> ElevatorRegistry {
        ElevatorRegistry {
            store: store,
            config: config,
        }
    }

    /// Current roster. Synthesizes and persists the initial roster if none is stored.
    pub fn get_all(&self) -> Result<Vec<Elevator>> {
        match state_store::get_json::<Vec<Elevator>>(self.store.as_ref(), STATE_KEY)? {
            Some(roster) => Ok(roster),
            None => {
                let roster = self.initial_roster();
                debug!("No roster stored, initializing {} elevators", roster.len());
                self.save(&roster)?;
                Ok(roster)
            }
        }
    }

    pub fn dispatch(&self, id: usize, target_floor: u8) -> Result<()> {
        self.modify(id, |elevator| elevator.dispatch(target_floor))
    }

    pub fn release(&self, id: usize) -> Result<()> {
        self.modify(id, |elevator| elevator.release())
    }

    /// Forces every elevator idle where it stands.
    pub fn release_all(&self) -> Result<Vec<Elevator>> {
        let mut roster = self.get_all()?;
        for elevator in roster.iter_mut() {
            elevator.force_idle();
        }
        self.save(&roster)?;
        Ok(roster)
    }

    /// Discards the stored roster and call queue.
    pub fn reset(&self) -> Result<()> {
        self.store.forget(STATE_KEY)?;
        self.store.forget(QUEUE_KEY)?;
        Ok(())
    }

    pub fn initial_roster(&self) -> Vec<Elevator> {
        (1..=self.config.elevator_count)
            .map(|id| Elevator::new(id, self.config.initial_floor))
            .collect()
    }

    /// Writes `roster` as the complete stored roster.
    pub fn save(&self, roster: &[Elevator]) -> Result<()> {
        let serialized = serde_json::to_string(roster).map_err(StoreError::from)?;
        debug!("{}", serialized);
        self.store.put(STATE_KEY, serialized)?;
        Ok(())
    }

    fn modify<F: FnOnce(&mut Elevator)>(&self, id: usize, transition: F) -> Result<()> {
        let mut roster = self.get_all()?;
        apply(&mut roster, id, transition)?;
        self.save(&roster)
    }
}

/// Runs `transition` on elevator `id` of an in-memory roster.
pub fn apply<F: FnOnce(&mut Elevator)>(roster: &mut [Elevator], id: usize, transition: F) -> Result<()> {
    match roster.iter_mut().find(|elevator| elevator.id == id) {
        Some(elevator) => {
            transition(elevator);
            Ok(())
        }
        None => Err(DispatchError::NotFound { id: id }),
    }
}
