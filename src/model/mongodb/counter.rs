use mongodb::{
    bson::doc,
    error::Error as DbError,
    options::{FindOneAndUpdateOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::{is_duplicate_key_error, Coll};

/// Counter handing out vote row IDs.
pub const VOTE_ID_COUNTER_ID: &str = "vote_id";
/// Counter handing out submission batch IDs.
pub const VOTE_BATCH_COUNTER_ID: &str = "vote_batch_id";

/// A counter object used to implement auto-increment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u32,
}

impl Counter {
    /// Create a new `Counter` with the given ID, starting at the given value.
    pub fn new(id: impl Into<String>, start: u32) -> Self {
        Self {
            id: id.into(),
            next: start,
        }
    }

    /// Atomically reserve `count` consecutive values, returning the first.
    ///
    /// Returns `None` if the counter does not exist.
    pub async fn reserve(
        counters: &Coll<Counter>,
        id: &str,
        count: u32,
    ) -> Result<Option<u32>, DbError> {
        let update = doc! {
            "$inc": { "next": count }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?;
        Ok(counter.map(|c| c.next))
    }
}

/// Ensure the vote ID and batch ID counters exist, without resetting them if they do.
pub async fn ensure_counters_exist(counters: &Coll<Counter>) -> Result<(), DbError> {
    for id in [VOTE_ID_COUNTER_ID, VOTE_BATCH_COUNTER_ID] {
        let result = counters.insert_one(Counter::new(id, 1), None).await;
        if is_duplicate_key_error(result.as_ref()) {
            continue;
        }
        result?;
    }
    Ok(())
}
