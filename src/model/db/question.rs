use serde::{Deserialize, Serialize};

use crate::model::common::{EditionId, QuestionId};

/// A question members are ranked on. Questions can be reused across editions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: QuestionId,
    pub text: String,
}

/// Link table entry associating a question with an edition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditionQuestion {
    pub edition_id: EditionId,
    pub question_id: QuestionId,
}
