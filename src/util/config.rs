use std::env;
use std::str::FromStr;

use serde;

use crate::util::constants as setting;
use crate::util::error::ConfigError;

/// Static building parameters. Loaded once and never mutated by the dispatch core.
///
/// * `elevator_count` - number of elevators, ids run `1..=elevator_count`
/// * `floor_count` - number of floors, floors run `0..floor_count`
/// * `speed_per_floor_ms` - travel time for a single floor
/// * `door_wait_ms` - time spent at a floor before the elevator is free again
/// * `initial_floor` - floor every elevator starts at
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub elevator_count: usize,
    pub floor_count: u8,
    pub speed_per_floor_ms: u64,
    pub door_wait_ms: u64,
    pub initial_floor: u8,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            elevator_count: setting::DEFAULT_ELEVATOR_COUNT,
            floor_count: setting::DEFAULT_FLOOR_COUNT,
            speed_per_floor_ms: setting::DEFAULT_SPEED_PER_FLOOR_MS,
            door_wait_ms: setting::DEFAULT_DOOR_WAIT_MS,
            initial_floor: setting::DEFAULT_INITIAL_FLOOR,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key lookup. Unset, empty or `null` values use the default.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let config = Config {
            elevator_count: parse_or(&lookup, setting::ENV_ELEVATOR_COUNT, defaults.elevator_count)?,
            floor_count: parse_or(&lookup, setting::ENV_FLOOR_COUNT, defaults.floor_count)?,
            speed_per_floor_ms: parse_or(&lookup, setting::ENV_SPEED_PER_FLOOR, defaults.speed_per_floor_ms)?,
            door_wait_ms: parse_or(&lookup, setting::ENV_DOOR_WAIT, defaults.door_wait_ms)?,
            initial_floor: parse_or(&lookup, setting::ENV_INITIAL_FLOOR, defaults.initial_floor)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elevator_count == 0 {
            return Err(ConfigError::NoElevators);
        }
        if self.floor_count == 0 {
            return Err(ConfigError::NoFloors);
        }
        if self.initial_floor >= self.floor_count {
            return Err(ConfigError::InitialFloorOutOfRange {
                initial_floor: self.initial_floor,
                floor_count: self.floor_count,
            });
        }
        check_timing(setting::ENV_SPEED_PER_FLOOR, self.speed_per_floor_ms)?;
        check_timing(setting::ENV_DOOR_WAIT, self.door_wait_ms)?;
        Ok(())
    }

    pub fn is_valid_floor(&self, floor: i64) -> bool {
        floor >= 0 && floor < i64::from(self.floor_count)
    }

    pub fn is_valid_id(&self, id: usize) -> bool {
        id >= 1 && id <= self.elevator_count
    }
}

fn check_timing(key: &str, millis: u64) -> Result<(), ConfigError> {
    if millis > setting::MAX_TIMING_MS {
        return Err(ConfigError::TimingTooLong {
            key: key.to_string(),
            millis: millis,
            max: setting::MAX_TIMING_MS,
        });
    }
    Ok(())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                return Ok(default);
            }
            trimmed.parse::<T>().map_err(|e| ConfigError::InvalidNumber {
                key: key.to_string(),
                invalid: raw.clone(),
                reason: e.to_string(),
            })
        }
        None => Ok(default),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn it_falls_back_to_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.elevator_count, 5);
        assert_eq!(config.floor_count, 10);
    }

    #[test]
    fn it_reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("ELEVATOR_COUNT", "2"),
            ("ELEVATOR_FLOORS", "12"),
            ("ELEVATOR_FLOOR_TRAVEL_MS", "50"),
            ("ELEVATOR_DOOR_WAIT", " 10 "),
            ("ELEVATOR_INITIAL_POSITIONS", "4"),
        ]))
        .unwrap();
        assert_eq!(config.elevator_count, 2);
        assert_eq!(config.floor_count, 12);
        assert_eq!(config.speed_per_floor_ms, 50);
        assert_eq!(config.door_wait_ms, 10);
        assert_eq!(config.initial_floor, 4);
    }

    #[test]
    fn it_treats_null_initial_position_as_ground_floor() {
        let config = Config::from_lookup(lookup_from(&[("ELEVATOR_INITIAL_POSITIONS", "null")])).unwrap();
        assert_eq!(config.initial_floor, 0);
    }

    #[test]
    fn it_rejects_garbage_numbers() {
        let res = Config::from_lookup(lookup_from(&[("ELEVATOR_FLOORS", "ten")]));
        match res {
            Err(ConfigError::InvalidNumber { key, invalid, .. }) => {
                assert_eq!(key, "ELEVATOR_FLOORS");
                assert_eq!(invalid, "ten");
            }
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
    }

    #[test]
    fn it_rejects_empty_buildings() {
        assert_eq!(
            Config::from_lookup(lookup_from(&[("ELEVATOR_COUNT", "0")])),
            Err(ConfigError::NoElevators)
        );
        assert_eq!(
            Config::from_lookup(lookup_from(&[("ELEVATOR_FLOORS", "0")])),
            Err(ConfigError::NoFloors)
        );
    }

    #[test]
    fn it_rejects_initial_floor_outside_building() {
        assert_eq!(
            Config::from_lookup(lookup_from(&[("ELEVATOR_FLOORS", "4"), ("ELEVATOR_INITIAL_POSITIONS", "4")])),
            Err(ConfigError::InitialFloorOutOfRange { initial_floor: 4, floor_count: 4 })
        );
    }

    #[test]
    fn it_rejects_timings_longer_than_an_hour() {
        assert_eq!(
            Config::from_lookup(lookup_from(&[("ELEVATOR_FLOOR_TRAVEL_MS", "18446744073709551615")])),
            Err(ConfigError::TimingTooLong {
                key: "ELEVATOR_FLOOR_TRAVEL_MS".to_string(),
                millis: u64::MAX,
                max: 3_600_000,
            })
        );
        match Config::from_lookup(lookup_from(&[("ELEVATOR_DOOR_WAIT", "3600001")])) {
            Err(ConfigError::TimingTooLong { key, .. }) => assert_eq!(key, "ELEVATOR_DOOR_WAIT"),
            other => panic!("expected TimingTooLong, got {:?}", other),
        }
        let config = Config::from_lookup(lookup_from(&[("ELEVATOR_DOOR_WAIT", "3600000")])).unwrap();
        assert_eq!(config.door_wait_ms, 3_600_000);
    }

    #[test]
    fn it_checks_floor_and_id_ranges() {
        let config = Config::default();
        assert!(config.is_valid_floor(0));
        assert!(config.is_valid_floor(9));
        assert!(!config.is_valid_floor(10));
        assert!(!config.is_valid_floor(-1));
        assert!(!config.is_valid_id(0));
        assert!(config.is_valid_id(1));
        assert!(config.is_valid_id(5));
        assert!(!config.is_valid_id(6));
    }
}
