use std::convert::TryFrom;
use std::sync::{Arc, MutexGuard};

use log::{info, warn};
use serde;

use crate::dispatch::call_dispatcher::{self, CallDispatcher};
use crate::registry::elevator::Elevator;
use crate::registry::elevator_registry::{self, ElevatorRegistry};
use crate::store::state_store::StateStore;
use crate::util::config::Config;
use crate::util::error::{DispatchError, Result};

/// Result of a call. Only the boundary turns `Queued` into elevator number 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CallOutcome {
    Assigned(usize),
    Queued,
}

impl CallOutcome {
    pub fn elevator_number(&self) -> usize {
        match self {
            CallOutcome::Assigned(id) => *id,
            CallOutcome::Queued => 0,
        }
    }
}

/// What the presentation layer needs when a session starts.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionSnapshot {
    pub config: Config,
    pub elevators: Vec<Elevator>,
}

/// Public dispatch operations.
///
/// Every operation runs its whole read-decide-write sequence inside the
/// store's exclusive section, so two concurrent calls never see the same idle
/// elevator and a reset never lands in the middle of a dispatch. Controllers
/// built over one store share that section.
pub struct DispatchController {
    config: Config,
    store: Arc<dyn StateStore>,
    registry: ElevatorRegistry,
    dispatcher: CallDispatcher,
}

impl DispatchController {
    pub fn new(store: Arc<dyn StateStore>, config: Config) -> DispatchController {
        DispatchController {
            registry: ElevatorRegistry::new(store.clone(), config.clone()),
            dispatcher: CallDispatcher::new(store.clone()),
            store: store,
            config: config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sends the closest idle elevator to `floor`, or queues the call if nobody is idle.
    pub fn call_elevator(&self, floor: i64) -> Result<CallOutcome> {
        if !self.config.is_valid_floor(floor) {
            warn!("Rejected call to floor {}", floor);
            return Err(DispatchError::InvalidFloor { floor: floor });
        }
        let floor = u8::try_from(floor).map_err(|_| DispatchError::InvalidFloor { floor: floor })?;

        let _section = self.lock()?;
        let roster = self.registry.get_all()?;
        match call_dispatcher::select_elevator(floor, &roster) {
            Some(id) => {
                self.registry.dispatch(id, floor)?;
                info!("Elevator number {} is moving to floor {}", id, floor);
                Ok(CallOutcome::Assigned(id))
            }
            None => {
                self.dispatcher.enqueue(floor)?;
                info!("No idle elevator, queued call to floor {}", floor);
                Ok(CallOutcome::Queued)
            }
        }
    }

    /// Releases elevator `id` at its target and hands it the oldest queued call, if any.
    pub fn elevator_became_idle(&self, id: usize) -> Result<Option<u8>> {
        if !self.config.is_valid_id(id) {
            warn!("Rejected release of unknown elevator {}", id);
            return Err(DispatchError::NotFound { id: id });
        }

        let _section = self.lock()?;
        let mut roster = self.registry.get_all()?;
        let mut queue = self.dispatcher.pending()?;
        elevator_registry::apply(&mut roster, id, |elevator| elevator.release())?;
        let next_floor = call_dispatcher::pop_front(&mut queue);
        if let Some(next_floor) = next_floor {
            elevator_registry::apply(&mut roster, id, |elevator| elevator.dispatch(next_floor))?;
        }

        // Roster before queue: a failed queue write leaves the call queued for the retry.
        self.registry.save(&roster)?;
        match next_floor {
            Some(next_floor) => {
                if let Err(e) = self.dispatcher.save(&queue) {
                    warn!("Elevator number {} left floor {} queued: {}", id, next_floor, e);
                    return Err(e);
                }
                info!("Next floor for elevator number {} is {}", id, next_floor);
            }
            None => info!("Elevator number {} is idle, no more floors to catch", id),
        }
        Ok(next_floor)
    }

    /// Clears roster and queue and returns the freshly initialized roster.
    pub fn reset_system(&self) -> Result<Vec<Elevator>> {
        let _section = self.lock()?;
        self.registry.reset()?;
        let roster = self.registry.get_all()?;
        info!("Elevator system reset, {} elevators at floor {}", roster.len(), self.config.initial_floor);
        Ok(roster)
    }

    pub fn get_state(&self) -> Result<Vec<Elevator>> {
        let _section = self.lock()?;
        self.registry.get_all()
    }

    pub fn pending_calls(&self) -> Result<Vec<u8>> {
        let _section = self.lock()?;
        self.dispatcher.pending()
    }

    /// Forces every elevator idle where it stands, clearing state left over
    /// from an earlier session.
    pub fn open_session(&self) -> Result<SessionSnapshot> {
        let _section = self.lock()?;
        let elevators = self.registry.release_all()?;
        Ok(SessionSnapshot {
            config: self.config.clone(),
            elevators: elevators,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        Ok(self.store.lock()?)
    }
}
