use serde;

/// Canonical dispatch states. `Arrived` is only ever shown by the presentation layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Idle,
    Moving,
    Arrived,
}

/// A single car in the roster.
///
/// `target_floor` is `Some` exactly when `state` is not `Idle`; the transition
/// methods below are the only way the registry changes an elevator.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Elevator {
    pub id: usize,
    pub current_floor: u8,
    pub target_floor: Option<u8>,
    pub state: State,
}

impl Elevator {
    pub fn new(id: usize, floor: u8) -> Elevator {
        Elevator {
            id: id,
            current_floor: floor,
            target_floor: None,
            state: State::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Number of floors between the elevator and `floor`.
    pub fn distance_to(&self, floor: u8) -> u8 {
        if floor > self.current_floor {
            floor - self.current_floor
        } else {
            self.current_floor - floor
        }
    }

    pub fn dispatch(&mut self, target_floor: u8) {
        self.state = State::Moving;
        self.target_floor = Some(target_floor);
    }

    /// The elevator has arrived: it now stands at its former target.
    pub fn release(&mut self) {
        if let Some(target) = self.target_floor.take() {
            self.current_floor = target;
        }
        self.state = State::Idle;
    }

    /// Idle without moving, dropping whatever target was stale.
    pub fn force_idle(&mut self) {
        self.target_floor = None;
        self.state = State::Idle;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_starts_idle_without_target() {
        let elevator = Elevator::new(1, 3);
        assert!(elevator.is_idle());
        assert_eq!(elevator.current_floor, 3);
        assert_eq!(elevator.target_floor, None);
    }

    #[test]
    fn it_moves_to_target_on_release() {
        let mut elevator = Elevator::new(1, 0);
        elevator.dispatch(7);
        assert_eq!(elevator.state, State::Moving);
        assert_eq!(elevator.target_floor, Some(7));
        assert_eq!(elevator.current_floor, 0);

        elevator.release();
        assert_eq!(elevator, Elevator { id: 1, current_floor: 7, target_floor: None, state: State::Idle });
    }

    #[test]
    fn it_stays_put_when_released_while_idle() {
        let mut elevator = Elevator::new(2, 4);
        elevator.release();
        elevator.release();
        assert_eq!(elevator, Elevator::new(2, 4));
    }

    #[test]
    fn it_drops_target_when_forced_idle() {
        let mut elevator = Elevator::new(1, 2);
        elevator.dispatch(9);
        elevator.force_idle();
        assert_eq!(elevator, Elevator::new(1, 2));
    }

    #[test]
    fn it_measures_distance_both_ways() {
        let elevator = Elevator::new(1, 4);
        assert_eq!(elevator.distance_to(9), 5);
        assert_eq!(elevator.distance_to(1), 3);
        assert_eq!(elevator.distance_to(4), 0);
    }

    #[test]
    fn it_serializes_like_the_stored_roster() {
        let mut elevator = Elevator::new(1, 0);
        elevator.dispatch(5);
        let json = serde_json::to_string(&elevator).unwrap();
        assert_eq!(json, r#"{"id":1,"currentFloor":0,"targetFloor":5,"state":"moving"}"#);

        let idle: Elevator =
            serde_json::from_str(r#"{"id":2,"currentFloor":3,"targetFloor":null,"state":"idle"}"#).unwrap();
        assert_eq!(idle, Elevator::new(2, 3));
    }
}
