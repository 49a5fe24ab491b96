pub mod dispatch {
    pub mod call_dispatcher;
    pub mod controller;
    pub mod server;
}

pub mod registry {
    pub mod elevator;
    pub mod elevator_registry;
}

pub mod store {
    pub mod state_store;
}

pub mod simulation {
    pub mod travel;
}

pub mod util {
    pub mod config;
    pub mod constants;
    pub mod error;
}
