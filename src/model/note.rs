/// A note as the backend stores it.
///
/// # Resource Framework
/// `Note` satisfies [`Entity`](crate::framework::Entity) through its serde derives, so a
/// [`ResourceReducer<Note>`](crate::framework::ResourceReducer) keeps notes in typed
/// form while drafts and payloads stay plain JSON.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl Note {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            done: false,
        }
    }
}
