pub const DEFAULT_ELEVATOR_COUNT: usize = 5;
pub const DEFAULT_FLOOR_COUNT: u8 = 10;
pub const DEFAULT_SPEED_PER_FLOOR_MS: u64 = 1000;
pub const DEFAULT_DOOR_WAIT_MS: u64 = 2000;
pub const DEFAULT_INITIAL_FLOOR: u8 = 0;

/// Upper bound for per-floor travel and door wait: one hour.
pub const MAX_TIMING_MS: u64 = 3_600_000;

pub const STATE_KEY: &str = "elevator:state";
pub const QUEUE_KEY: &str = "elevator:queue";

pub const ENV_ELEVATOR_COUNT: &str = "ELEVATOR_COUNT";
pub const ENV_FLOOR_COUNT: &str = "ELEVATOR_FLOORS";
pub const ENV_SPEED_PER_FLOOR: &str = "ELEVATOR_FLOOR_TRAVEL_MS";
pub const ENV_DOOR_WAIT: &str = "ELEVATOR_DOOR_WAIT";
pub const ENV_INITIAL_FLOOR: &str = "ELEVATOR_INITIAL_POSITIONS";
