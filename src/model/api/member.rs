use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::{
    common::{GroupId, MemberId},
    db::member::Member,
};

/// An API-friendly member description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDesc {
    pub id: MemberId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub group_ids: BTreeSet<GroupId>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
}

fn active_by_default() -> bool {
    true
}

impl From<Member> for MemberDesc {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            display_name: member.display_name,
            email: member.email,
            group_ids: member.group_ids,
            is_active: member.is_active,
            is_admin: member.is_admin,
        }
    }
}

/// Members supplied by a caller never carry privileges.
impl From<MemberDesc> for Member {
    fn from(desc: MemberDesc) -> Self {
        Self {
            id: desc.id,
            display_name: desc.display_name,
            email: desc.email,
            group_ids: desc.group_ids,
            is_active: desc.is_active,
            is_admin: false,
            is_super_admin: false,
        }
    }
}
