use serde::Serialize;
use warp::reject;

use crate::errors::LibraryError;
use crate::validation::ValidationErrors;

/// A failed request, with the operation it failed in.
#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: LibraryError,
}

impl Rejection {
    pub fn new(context: Context, error: LibraryError) -> Self {
        Rejection { context, error }
    }

    pub fn flatten(&self) -> FlattenedRejection {
        match &self.error {
            LibraryError::Validation(errors) => FlattenedRejection {
                errors: ErrorMessage::Fields(errors.clone()),
            },
            e => FlattenedRejection::message(format!("{}: {}", self.context.description(), e)),
        }
    }
}

impl reject::Reject for Rejection {}

/// A request body that couldn't be read in full.
#[derive(Debug)]
pub enum BodyRejection {
    TooLarge,
    Unreadable,
}

impl reject::Reject for BodyRejection {}

/// The body of every error response.
#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    pub(crate) errors: ErrorMessage,
}

impl FlattenedRejection {
    pub fn message(message: impl Into<String>) -> Self {
        FlattenedRejection {
            errors: ErrorMessage::Message(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Message(String),
    Fields(ValidationErrors),
}

#[derive(Clone, Debug)]
pub enum Context {
    Add,
    Update,
    Delete { id: String },
    Lyrics { id: String },
    List,
}

impl Context {
    pub fn add() -> Context {
        Context::Add
    }

    pub fn update() -> Context {
        Context::Update
    }

    pub fn delete(id: String) -> Context {
        Context::Delete { id }
    }

    pub fn lyrics(id: String) -> Context {
        Context::Lyrics { id }
    }

    pub fn list() -> Context {
        Context::List
    }

    fn description(&self) -> &'static str {
        match self {
            Context::Add => "failed to add song",
            Context::Update => "failed to update song info",
            Context::Delete { .. } => "failed to delete song",
            Context::Lyrics { .. } => "failed to get song lyrics",
            Context::List => "failed to get filtered list",
        }
    }
}
