use std::env;
use std::process;
use std::sync::Arc;
use std::thread::*;
use std::time;

use crossbeam_channel as cbc;
use log::{error, info, warn};
use rand::Rng;

use elevator::dispatch::controller::DispatchController;
use elevator::dispatch::server::{self, DispatchHandle};
use elevator::registry::elevator::{Elevator, State};
use elevator::simulation::travel::{Arrival, TravelTimer};
use elevator::store::state_store::{FileStore, MemoryStore, StateStore};
use elevator::util::config::Config;

struct Args {
    calls: usize,
    store_dir: Option<String>,
    reset: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        calls: 10,
        store_dir: None,
        reset: false,
    };
    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--calls" => match iter.next().and_then(|v| v.parse().ok()) {
                Some(n) => args.calls = n,
                None => warn!("--calls expects a number, keeping {}", args.calls),
            },
            "--store" => args.store_dir = iter.next(),
            "--reset" => args.reset = true,
            other => warn!("Ignoring unknown argument {}", other),
        }
    }
    args
}

fn open_store(dir: &Option<String>) -> Arc<dyn StateStore> {
    match dir {
        Some(dir) => match FileStore::open(dir) {
            Ok(store) => {
                info!("Keeping elevator state in {}", dir);
                Arc::new(store)
            }
            Err(e) => {
                error!("Could not open state directory {}: {}", dir, e);
                process::exit(1);
            }
        },
        None => Arc::new(MemoryStore::new()),
    }
}

fn current_floor(handle: &DispatchHandle, id: usize) -> Option<u8> {
    match handle.get_state() {
        Ok(roster) => roster.iter().find(|e| e.id == id).map(|e| e.current_floor),
        Err(e) => {
            error!("Could not read roster: {}", e);
            None
        }
    }
}

fn all_idle(roster: &[Elevator]) -> bool {
    roster.iter().all(|e| e.state == State::Idle)
}

/// Hands queued calls to idle elevators. Nothing else wakes them when the queue
/// was left behind by an earlier run.
fn serve_queue(handle: &DispatchHandle, travel: &mut TravelTimer, roster: &[Elevator]) {
    for elevator in roster.iter().filter(|e| e.is_idle()) {
        match handle.next_floor(elevator.id) {
            Ok(reply) => {
                info!("{}", reply.message);
                match reply.next_floor {
                    Some(next_floor) => travel.schedule(elevator.id, elevator.current_floor, next_floor),
                    None => return,
                }
            }
            Err(e) => warn!("Release of elevator {} failed: {}", elevator.id, e),
        }
    }
}

fn main() {
    env_logger::init();
    let args = parse_args();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid elevator configuration: {}", e);
            process::exit(1);
        }
    };
    info!("Elevator system started:\n{:#?}", config);

    let store = open_store(&args.store_dir);
    let controller = Arc::new(DispatchController::new(store, config.clone()));
    let (handle, roster_update_rx, server) = server::start(controller);

    // Stand-in for the browser: log every roster the server publishes.
    spawn(move || {
        for roster in roster_update_rx.iter() {
            info!("{}", serde_json::to_string(&roster).unwrap_or_default());
        }
    });

    if args.reset {
        match handle.reset() {
            Ok(reply) => info!("{}", reply.message),
            Err(e) => warn!("Reset failed: {}", e),
        }
    }
    match handle.open_session() {
        Ok(session) => info!("Session opened with {} elevators", session.elevators.len()),
        Err(e) => {
            error!("Could not open session: {}", e);
            process::exit(1);
        }
    }

    let (mut travel, arrival_rx) = TravelTimer::new(config.clone());
    let (arrival_tx, arrival_cbc_rx) = cbc::unbounded::<Arrival>();
    spawn(move || {
        for arrival in arrival_rx.iter() {
            if arrival_tx.send(arrival).is_err() {
                return;
            }
        }
    });

    let call_period = time::Duration::from_millis((config.speed_per_floor_ms / 2).max(1));
    let call_ticker = cbc::tick(call_period);
    let mut rng = rand::thread_rng();
    let mut calls_made = 0;

    loop {
        cbc::select! {
            recv(call_ticker) -> _ => {
                if calls_made < args.calls {
                    calls_made += 1;
                    let floor = rng.gen_range(0i64, i64::from(config.floor_count));
                    match handle.call_elevator(floor) {
                        Ok(reply) => {
                            info!("{}", reply.message);
                            if reply.elevator_number > 0 {
                                let from = current_floor(&handle, reply.elevator_number).unwrap_or(floor as u8);
                                travel.schedule(reply.elevator_number, from, floor as u8);
                            }
                        }
                        Err(e) => warn!("Call to floor {} failed: {}", floor, e),
                    }
                }
            },
            recv(arrival_cbc_rx) -> a => {
                let arrival = match a {
                    Ok(arrival) => arrival,
                    Err(_) => break,
                };
                travel.on_arrival(arrival);
                match handle.next_floor(arrival.id) {
                    Ok(reply) => {
                        info!("{}", reply.message);
                        if let Some(next_floor) = reply.next_floor {
                            travel.schedule(arrival.id, arrival.floor, next_floor);
                        }
                    }
                    Err(e) => warn!("Release of elevator {} failed: {}", arrival.id, e),
                }
            },
        }

        if calls_made >= args.calls && travel.in_flight() == 0 {
            let roster = match handle.get_state() {
                Ok(roster) => roster,
                Err(e) => {
                    error!("Could not read roster: {}", e);
                    break;
                }
            };
            if !all_idle(&roster) {
                continue;
            }
            match handle.pending_calls() {
                Ok(pending) if pending.is_empty() => {
                    println!("{:#?}", roster);
                    break;
                }
                Ok(pending) => {
                    info!("{} calls left in the queue, putting idle elevators to work", pending.len());
                    serve_queue(&handle, &mut travel, &roster);
                }
                Err(e) => {
                    error!("Could not read call queue: {}", e);
                    break;
                }
            }
        }
    }

    travel.cancel_all();
    drop(handle);
    if server.join().is_err() {
        error!("Dispatch server panicked");
    }
}
