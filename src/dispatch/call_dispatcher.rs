use std::sync::Arc;

use crate::registry::elevator::Elevator;
use crate::store::state_store::{self, StateStore};
use crate::util::constants::QUEUE_KEY;
use crate::util::error::Result;

/// Picks the idle elevator closest to `floor`.
///
/// Ties go to the first elevator in roster order, which is the lowest id for
/// rosters built by the registry. Returns `None` when nobody is idle.
pub fn select_elevator(floor: u8, roster: &[Elevator]) -> Option<usize> {
    let mut lowest_cost_id: Option<usize> = None;
    let mut lowest_cost: u8 = u8::MAX;

    for elevator in roster.iter().filter(|elevator| elevator.is_idle()) {
        let cost = elevator.distance_to(floor);
        if lowest_cost_id.is_none() || cost < lowest_cost {
            lowest_cost_id = Some(elevator.id);
            lowest_cost = cost;
        }
    }
    lowest_cost_id
}

/// Owner of the pending call queue. Floors only, served first come first served
/// by whichever elevator frees up next.
#[derive(Clone)]
pub struct CallDispatcher {
    store: Arc<dyn StateStore>,
}

impl CallDispatcher {
    pub fn new(store: Arc<dyn StateStore>) -> CallDispatcher {
        CallDispatcher { store: store }
    }

    pub fn enqueue(&self, floor: u8) -> Result<()> {
        let mut queue = self.pending()?;
        queue.push(floor);
        self.save(&queue)
    }

    pub fn dequeue(&self) -> Result<Option<u8>> {
        let mut queue = self.pending()?;
        let next_floor = pop_front(&mut queue);
        if next_floor.is_some() {
            self.save(&queue)?;
        }
        Ok(next_floor)
    }

    /// Writes `queue` as the complete stored queue.
    pub fn save(&self, queue: &[u8]) -> Result<()> {
        state_store::put_json(self.store.as_ref(), QUEUE_KEY, &queue)?;
        Ok(())
    }

    /// Snapshot of the queue, head first.
    pub fn pending(&self) -> Result<Vec<u8>> {
        let queue = state_store::get_json::<Vec<u8>>(self.store.as_ref(), QUEUE_KEY)?;
        Ok(queue.unwrap_or_default())
    }
}

/// Takes the oldest call off an in-memory queue.
pub fn pop_front(queue: &mut Vec<u8>) -> Option<u8> {
    if queue.is_empty() {
        return None;
    }
    Some(queue.remove(0))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::state_store::MemoryStore;

    fn moving(id: usize, floor: u8, target: u8) -> Elevator {
        let mut elevator = Elevator::new(id, floor);
        elevator.dispatch(target);
        elevator
    }

    #[test]
    fn it_picks_the_closest_idle_elevator() {
        let roster = vec![Elevator::new(1, 0), Elevator::new(2, 6), Elevator::new(3, 9)];
        assert_eq!(select_elevator(7, &roster), Some(2));
        assert_eq!(select_elevator(9, &roster), Some(3));
        assert_eq!(select_elevator(1, &roster), Some(1));
    }

    #[test]
    fn it_breaks_ties_by_roster_order() {
        let roster = vec![Elevator::new(1, 0), Elevator::new(2, 0)];
        assert_eq!(select_elevator(5, &roster), Some(1));

        let roster = vec![Elevator::new(1, 2), Elevator::new(2, 6)];
        assert_eq!(select_elevator(4, &roster), Some(1));
    }

    #[test]
    fn it_skips_busy_elevators() {
        let roster = vec![moving(1, 5, 8), Elevator::new(2, 0)];
        assert_eq!(select_elevator(5, &roster), Some(2));
    }

    #[test]
    fn it_finds_nobody_when_all_are_busy() {
        let roster = vec![moving(1, 0, 3), moving(2, 4, 1)];
        assert_eq!(select_elevator(2, &roster), None);
        assert_eq!(select_elevator(2, &[]), None);
    }

    #[test]
    fn it_treats_arrived_as_busy() {
        let mut arrived = Elevator::new(1, 3);
        arrived.dispatch(3);
        arrived.state = crate::registry::elevator::State::Arrived;
        assert_eq!(select_elevator(3, &[arrived]), None);
    }

    #[test]
    fn it_serves_calls_first_in_first_out() {
        let dispatcher = CallDispatcher::new(Arc::new(MemoryStore::new()));
        dispatcher.enqueue(3).unwrap();
        dispatcher.enqueue(7).unwrap();
        dispatcher.enqueue(2).unwrap();
        dispatcher.enqueue(7).unwrap();
        assert_eq!(dispatcher.pending().unwrap(), vec![3, 7, 2, 7]);

        assert_eq!(dispatcher.dequeue().unwrap(), Some(3));
        assert_eq!(dispatcher.dequeue().unwrap(), Some(7));
        assert_eq!(dispatcher.dequeue().unwrap(), Some(2));
        assert_eq!(dispatcher.dequeue().unwrap(), Some(7));
        assert_eq!(dispatcher.dequeue().unwrap(), None);
    }

    #[test]
    fn it_pops_the_oldest_call() {
        let mut queue = vec![5, 1, 5];
        assert_eq!(pop_front(&mut queue), Some(5));
        assert_eq!(queue, vec![1, 5]);
        assert_eq!(pop_front(&mut Vec::new()), None);
    }

    #[test]
    fn it_dequeues_nothing_from_a_fresh_store() {
        let dispatcher = CallDispatcher::new(Arc::new(MemoryStore::new()));
        assert_eq!(dispatcher.dequeue().unwrap(), None);
        assert!(dispatcher.pending().unwrap().is_empty());
    }

    #[test]
    fn it_shares_the_queue_through_the_store() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let first = CallDispatcher::new(store.clone());
        let second = CallDispatcher::new(store);
        first.enqueue(4).unwrap();
        assert_eq!(second.dequeue().unwrap(), Some(4));
        assert_eq!(first.pending().unwrap(), Vec::<u8>::new());
    }
}
