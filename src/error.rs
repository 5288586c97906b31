use rocket::{
    http::{Status, StatusClass},
    response::{self, Responder},
    serde::json::Json,
    Request, Response,
};
use serde::Serialize;
use thiserror::Error;

use crate::model::common::{EditionId, MemberId};
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Incomplete ranking: {0}")]
    IncompleteRanking(String),
    #[error("Nothing to rank in edition {0}")]
    NothingToRank(EditionId),
    #[error("Member {voter} has already voted in edition {edition}")]
    AlreadyVoted { edition: EditionId, voter: MemberId },
    #[error("Invalid reorder: {0}")]
    InvalidReorder(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Data access failed: {0}")]
    DataAccess(#[from] StoreError),
    #[error("Vote submission failed, some rows may have been recorded: {0}")]
    Submission(StoreError),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Short machine-readable name for this kind of error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::IncompleteRanking(_) => "IncompleteRanking",
            Self::NothingToRank(_) => "NothingToRank",
            Self::AlreadyVoted { .. } => "AlreadyVoted",
            Self::InvalidReorder(_) => "InvalidReorder",
            Self::BadRequest(_) => "BadRequest",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Forbidden(_) => "Forbidden",
            Self::DataAccess(_) => "DataAccessError",
            Self::Submission(_) => "SubmissionError",
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::NotFound(_) => Status::NotFound,
            Self::IncompleteRanking(_) | Self::NothingToRank(_) => Status::UnprocessableEntity,
            Self::AlreadyVoted { .. } => Status::Conflict,
            Self::InvalidReorder(_) | Self::BadRequest(_) => Status::BadRequest,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::Forbidden(_) => Status::Forbidden,
            Self::DataAccess(_) => Status::InternalServerError,
            Self::Submission(_) => Status::ServiceUnavailable,
        }
    }
}

/// JSON body sent alongside every error status.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if matches!(status.class(), StatusClass::ServerError) {
            error!("{self}");
        } else {
            debug!("{self}");
        }
        let body = ErrorBody {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        Response::build_from(Json(body).respond_to(req)?)
            .status(status)
            .ok()
    }
}
