use std::sync::Arc;

use chrono::Duration;
use mongodb::Client as MongoClient;
use rocket::futures::TryFutureExt;
use rocket::tokio::sync::Mutex;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::cache::TtlCache;
use crate::engine::RankingSession;
use crate::model::{
    common::{EditionId, GroupId, MemberId},
    db::member::Member,
    mongodb::{ensure_counters_exist, ensure_indexes_exist, Coll},
};
use crate::store::{MongoStore, SharedStore};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    session_ttl: u32,
    cache_ttl: u32,
}

impl Config {
    pub fn new(session_ttl: u32, cache_ttl: u32) -> Self {
        Self {
            session_ttl,
            cache_ttl,
        }
    }

    /// How long an untouched ranking session is kept before it is discarded.
    pub fn session_ttl(&self) -> Duration {
        Duration::seconds(self.session_ttl.into())
    }

    /// How long a fetched group roster may be reused.
    pub fn cache_ttl(&self) -> Duration {
        Duration::seconds(self.cache_ttl.into())
    }
}

/// In-progress ranking sessions, one per (edition, voter).
pub type SessionCache = Mutex<TtlCache<(EditionId, MemberId), RankingSession>>;

/// Active rosters by group.
pub type RosterCache = Mutex<TtlCache<GroupId, Vec<Member>>>;

/// Put the config and the caches it sizes into managed state.
pub fn manage_config(rocket: Rocket<Build>, config: Config) -> Rocket<Build> {
    rocket
        .manage(SessionCache::new(TtlCache::new(config.session_ttl())))
        .manage(RosterCache::new(TtlCache::new(config.cache_ttl())))
        .manage(config)
}

/// A fairing that loads the application config and puts it in managed state,
/// along with the session and roster caches.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!(
            "Sessions live for {}s, rosters are cached for {}s",
            config.session_ttl, config.cache_ttl
        );

        // Manage the state.
        Ok(manage_config(rocket, config))
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
    // non-secrets
    db_name: Option<String>,
}

const DEFAULT_DB_NAME: &str = "awards";

/// A fairing that loads the MongoDB config, connects to the database,
/// performs any setup necessary, and places the `Client`, the `Database` and a
/// [`MongoStore`] (as the [`SharedStore`]) into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db_name = config.db_name.as_deref().unwrap_or(DEFAULT_DB_NAME);
        let db = client.database(db_name);

        // Ensure the required indexes and ID counters exist.
        let counters = Coll::from_db(&db);
        if let Err(e) = ensure_indexes_exist(&db)
            .and_then(|_| ensure_counters_exist(&counters))
            .await
        {
            error!("Failed to set up database {db_name}: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        let store: SharedStore = Arc::new(MongoStore::new(&db));
        rocket = rocket.manage(client).manage(db).manage(store);
        Ok(rocket)
    }
}
