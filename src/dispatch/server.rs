//! Inbound command interface. One thread owns the controller and answers
//! requests in arrival order; every mutation is followed by a roster update on
//! a fire-and-forget channel for whoever wants to redraw.

use std::sync::Arc;
use std::thread::*;

use crossbeam_channel as cbc;
use log::{debug, error};
use serde;

use crate::dispatch::controller::{CallOutcome, DispatchController, SessionSnapshot};
use crate::registry::elevator::Elevator;
use crate::util::error::{DispatchError, Result};

#[derive(Debug)]
pub enum Request {
    Call { floor: i64, reply: cbc::Sender<Result<CallOutcome>> },
    BecameIdle { id: usize, reply: cbc::Sender<Result<Option<u8>>> },
    Reset { reply: cbc::Sender<Result<Vec<Elevator>>> },
    GetState { reply: cbc::Sender<Result<Vec<Elevator>>> },
    PendingCalls { reply: cbc::Sender<Result<Vec<u8>>> },
    OpenSession { reply: cbc::Sender<Result<SessionSnapshot>> },
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReply {
    pub message: String,
    pub elevator_number: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NextFloorReply {
    pub message: String,
    pub next_floor: Option<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResetReply {
    pub message: String,
    pub data: Vec<Elevator>,
}

/// Serves requests until every `DispatchHandle` is dropped.
pub fn run(
    controller: Arc<DispatchController>,
    request_rx: cbc::Receiver<Request>,
    roster_update_tx: cbc::Sender<Vec<Elevator>>,
) {
    loop {
        let request = match request_rx.recv() {
            Ok(request) => request,
            Err(_) => {
                debug!("All dispatch handles dropped, stopping server");
                return;
            }
        };
        debug!("{:?}", request);

        let mutated = match request {
            Request::Call { floor, reply } => {
                let res = controller.call_elevator(floor);
                let mutated = res.is_ok();
                let _ = reply.send(res);
                mutated
            }
            Request::BecameIdle { id, reply } => {
                let res = controller.elevator_became_idle(id);
                let mutated = res.is_ok();
                let _ = reply.send(res);
                mutated
            }
            Request::Reset { reply } => {
                let res = controller.reset_system();
                let mutated = res.is_ok();
                let _ = reply.send(res);
                mutated
            }
            Request::GetState { reply } => {
                let _ = reply.send(controller.get_state());
                false
            }
            Request::PendingCalls { reply } => {
                let _ = reply.send(controller.pending_calls());
                false
            }
            Request::OpenSession { reply } => {
                let res = controller.open_session();
                let mutated = res.is_ok();
                let _ = reply.send(res);
                mutated
            }
        };

        if mutated {
            publish_roster(&controller, &roster_update_tx);
        }
    }
}

fn publish_roster(controller: &DispatchController, roster_update_tx: &cbc::Sender<Vec<Elevator>>) {
    match controller.get_state() {
        // Nobody listening is fine.
        Ok(roster) => {
            let _ = roster_update_tx.try_send(roster);
        }
        Err(e) => error!("Could not read roster for update: {}", e),
    }
}

/// Starts the server thread. Returns the client handle and the roster update stream.
pub fn start(controller: Arc<DispatchController>) -> (DispatchHandle, cbc::Receiver<Vec<Elevator>>, JoinHandle<()>) {
    let (request_tx, request_rx) = cbc::unbounded::<Request>();
    let (roster_update_tx, roster_update_rx) = cbc::unbounded::<Vec<Elevator>>();
    let server = spawn(move || run(controller, request_rx, roster_update_tx));
    (DispatchHandle { request_tx: request_tx }, roster_update_rx, server)
}

/// Blocking client for the boundary layer.
#[derive(Clone, Debug)]
pub struct DispatchHandle {
    request_tx: cbc::Sender<Request>,
}

impl DispatchHandle {
    pub fn new(request_tx: cbc::Sender<Request>) -> DispatchHandle {
        DispatchHandle { request_tx: request_tx }
    }

    pub fn call_elevator(&self, floor: i64) -> Result<CallReply> {
        let outcome = self.request(|reply| Request::Call { floor: floor, reply: reply })?;
        let message = match outcome {
            CallOutcome::Assigned(id) => format!("Elevator number {} is moving to floor {}", id, floor),
            CallOutcome::Queued => format!("All elevators are busy, call to floor {} is queued", floor),
        };
        Ok(CallReply {
            message: message,
            elevator_number: outcome.elevator_number(),
        })
    }

    pub fn next_floor(&self, id: usize) -> Result<NextFloorReply> {
        let next_floor = self.request(|reply| Request::BecameIdle { id: id, reply: reply })?;
        let message = match next_floor {
            Some(floor) => format!("Next floor for elevator number {} is {}", id, floor),
            None => "No more floors to catch".to_string(),
        };
        Ok(NextFloorReply {
            message: message,
            next_floor: next_floor,
        })
    }

    pub fn reset(&self) -> Result<ResetReply> {
        let data = self.request(|reply| Request::Reset { reply: reply })?;
        Ok(ResetReply {
            message: "Elevator system reset successfully".to_string(),
            data: data,
        })
    }

    pub fn get_state(&self) -> Result<Vec<Elevator>> {
        self.request(|reply| Request::GetState { reply: reply })
    }

    /// Floors still waiting for an elevator, oldest first.
    pub fn pending_calls(&self) -> Result<Vec<u8>> {
        self.request(|reply| Request::PendingCalls { reply: reply })
    }

    pub fn open_session(&self) -> Result<SessionSnapshot> {
        self.request(|reply| Request::OpenSession { reply: reply })
    }

    fn request<T, F>(&self, build: F) -> Result<T>
    where
        F: FnOnce(cbc::Sender<Result<T>>) -> Request,
    {
        let (reply_tx, reply_rx) = cbc::bounded::<Result<T>>(1);
        self.request_tx
            .send(build(reply_tx))
            .map_err(|_| DispatchError::Disconnected)?;
        reply_rx.recv().map_err(|_| DispatchError::Disconnected)?
    }
}
