use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::common::{GroupId, MemberId};

/// A member of one or more groups, as stored in the database.
///
/// Group membership is many-to-many; the membership relation is embedded as `group_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: MemberId,
    pub display_name: String,
    /// Login email, used to resolve voters who are identified by email only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub group_ids: BTreeSet<GroupId>,
    /// Absent means active: only an explicit `false` deactivates a member.
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
    /// Super admins may additionally delete votes.
    #[serde(default)]
    pub is_super_admin: bool,
}

fn active_by_default() -> bool {
    true
}

impl Member {
    /// Create an active, non-admin member of the given groups.
    pub fn new(
        id: MemberId,
        display_name: impl Into<String>,
        email: impl Into<Option<String>>,
        group_ids: &[GroupId],
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email: email.into(),
            group_ids: group_ids.iter().copied().collect(),
            is_active: true,
            is_admin: false,
            is_super_admin: false,
        }
    }

    pub fn is_in_group(&self, group_id: GroupId) -> bool {
        self.group_ids.contains(&group_id)
    }
}
