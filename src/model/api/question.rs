use serde::{Deserialize, Serialize};

use crate::model::{common::QuestionId, db::question::Question};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDesc {
    pub id: QuestionId,
    pub text: String,
}

impl From<Question> for QuestionDesc {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            text: question.text,
        }
    }
}

impl From<QuestionDesc> for Question {
    fn from(desc: QuestionDesc) -> Self {
        Self {
            id: desc.id,
            text: desc.text,
        }
    }
}
