use rocket::{
    outcome::try_outcome,
    request::{FromRequest, Outcome},
    Request,
};

use crate::error::Error;
use crate::model::{
    common::{GroupId, MemberId},
    db::member::Member,
};
use crate::store::Store;

/// Header through which the upstream gateway identifies the signed-in member.
pub const MEMBER_ID_HEADER: &str = "X-Member-Id";

/// The member making the request.
///
/// Authentication happens upstream; this only trusts the gateway's header and
/// checks that it names a known, active member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Member);

impl Caller {
    /// May this caller see the results of an edition held in the given group?
    pub fn can_view_group(&self, group_id: GroupId) -> bool {
        self.0.is_admin || self.0.is_in_group(group_id)
    }
}

fn fail<T>(err: Error) -> Outcome<T, Error> {
    Outcome::Failure((err.status(), err))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Caller {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(raw) = req.headers().get_one(MEMBER_ID_HEADER) else {
            return fail(Error::Unauthorized(format!("Missing {MEMBER_ID_HEADER} header")));
        };
        let Ok(id) = raw.trim().parse::<MemberId>() else {
            return fail(Error::BadRequest(format!("Malformed {MEMBER_ID_HEADER}: {raw}")));
        };

        let store = try_outcome!(req
            .guard::<Store>()
            .await
            .map_failure(|(status, err)| (status, Error::DataAccess(err))));
        match store.member(id).await {
            Ok(Some(member)) if member.is_active => Outcome::Success(Caller(member)),
            Ok(Some(_)) => fail(Error::Forbidden(format!("Member {id} is deactivated"))),
            Ok(None) => fail(Error::Unauthorized(format!("Unknown member {id}"))),
            Err(e) => fail(e.into()),
        }
    }
}

/// A caller holding the super-admin flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperAdmin(pub Member);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SuperAdmin {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Caller(member) = try_outcome!(req.guard::<Caller>().await);
        if member.is_super_admin {
            Outcome::Success(SuperAdmin(member))
        } else {
            fail(Error::Forbidden(format!(
                "Member {} is not a super admin",
                member.id
            )))
        }
    }
}
