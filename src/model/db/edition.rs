use serde::{Deserialize, Serialize};

use crate::model::common::{EditionId, GroupId};

/// A single voting round, scoped to exactly one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    #[serde(rename = "_id")]
    pub id: EditionId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub group_id: GroupId,
    /// If set, voters are never asked to rank themselves.
    #[serde(default)]
    pub no_self_vote: bool,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Edition {
        pub fn example() -> Self {
            Self {
                id: 1,
                title: "Peer Awards 2026".to_string(),
                description: Some("Yearly peer recognition".to_string()),
                group_id: 1,
                no_self_vote: true,
            }
        }

        pub fn example_self_vote() -> Self {
            Self {
                id: 2,
                title: "Open Awards 2026".to_string(),
                description: None,
                group_id: 1,
                no_self_vote: false,
            }
        }

        /// Single-member group with self votes disabled: nobody left to rank.
        pub fn example_solo() -> Self {
            Self {
                id: 3,
                title: "Night Shift Awards".to_string(),
                description: None,
                group_id: 2,
                no_self_vote: true,
            }
        }
    }
}
