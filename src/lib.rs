#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{manage_config, Config, ConfigFairing, DatabaseFairing};
use crate::logging::LoggerFairing;
use crate::store::SharedStore;

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;

/// Build the production server: config and MongoDB are loaded by fairings at ignition.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(LoggerFairing)
}

/// Build a server around an already-constructed store and config.
pub fn rocket_for_store(store: SharedStore, config: Config) -> Rocket<Build> {
    let rocket = rocket::build()
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .manage(store);
    manage_config(rocket, config)
}
