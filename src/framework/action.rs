//! # Action Records
//!
//! This module defines the protocol shared by the action factory and the reducer.
//!
//! On the wire an action is the record `{ type, payload, meta, error }` where `type`
//! is the composite key `"<RESOURCE>/<DOMAIN>/<METHOD>"`, for example
//! `NOTES/FETCH/SUCCESS` or `NOTES/CHANGESET/UPDATE`. Inside the crate the key is a
//! tagged union ([`ActionKind`]) so the reducer routes with an exhaustive `match`
//! instead of splitting strings. [`ActionType`] converts between the two forms.

use crate::framework::error::{wire_name, ResourceError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One of the four remote operations. Each has its own status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Destroy,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Fetch,
        Operation::Create,
        Operation::Update,
        Operation::Destroy,
    ];

    /// Lower-case name, used as the status key.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Destroy => "destroy",
        }
    }

    /// Upper-case domain token used in the wire type.
    pub fn token(self) -> &'static str {
        match self {
            Operation::Fetch => "FETCH",
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Destroy => "DESTROY",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ResourceError::UnknownOperation(s.to_string()))
    }
}

/// Phase of an operation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Start,
    Success,
    Failure,
}

impl Phase {
    pub fn token(self) -> &'static str {
        match self {
            Phase::Start => "START",
            Phase::Success => "SUCCESS",
            Phase::Failure => "FAILURE",
        }
    }
}

/// Methods of the `CHANGESET` domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangesetMethod {
    Create,
    Update,
    Destroy,
}

impl ChangesetMethod {
    pub fn token(self) -> &'static str {
        match self {
            ChangesetMethod::Create => "CREATE",
            ChangesetMethod::Update => "UPDATE",
            ChangesetMethod::Destroy => "DESTROY",
        }
    }
}

/// The `(domain, method)` half of an action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// `<OPERATION>/START|SUCCESS|FAILURE`
    Operation(Operation, Phase),
    /// `CHANGESET/CREATE|UPDATE|DESTROY`
    Changeset(ChangesetMethod),
    /// `STATUS/CLEAR`. The targeted operation travels in [`ActionMeta::operation`].
    StatusClear,
}

impl ActionKind {
    pub fn domain_token(&self) -> &'static str {
        match self {
            ActionKind::Operation(op, _) => op.token(),
            ActionKind::Changeset(_) => "CHANGESET",
            ActionKind::StatusClear => "STATUS",
        }
    }

    pub fn method_token(&self) -> &'static str {
        match self {
            ActionKind::Operation(_, phase) => phase.token(),
            ActionKind::Changeset(method) => method.token(),
            ActionKind::StatusClear => "CLEAR",
        }
    }

    /// True iff the method is `FAILURE`.
    pub fn is_failure(&self) -> bool {
        matches!(self, ActionKind::Operation(_, Phase::Failure))
    }

    fn parse(domain: &str, method: &str) -> Option<Self> {
        let kind = match domain {
            "CHANGESET" => ActionKind::Changeset(match method {
                "CREATE" => ChangesetMethod::Create,
                "UPDATE" => ChangesetMethod::Update,
                "DESTROY" => ChangesetMethod::Destroy,
                _ => return None,
            }),
            "STATUS" => match method {
                "CLEAR" => ActionKind::StatusClear,
                _ => return None,
            },
            _ => {
                let op = Operation::ALL.into_iter().find(|op| op.token() == domain)?;
                let phase = match method {
                    "START" => Phase::Start,
                    "SUCCESS" => Phase::Success,
                    "FAILURE" => Phase::Failure,
                    _ => return None,
                };
                ActionKind::Operation(op, phase)
            }
        };
        Some(kind)
    }
}

/// Fully qualified action type: upper-cased resource name plus [`ActionKind`].
///
/// Serializes to and from the `"RESOURCE/DOMAIN/METHOD"` string so actions can be
/// exchanged with dispatchers that only speak the wire encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionType {
    resource: String,
    kind: ActionKind,
}

impl ActionType {
    /// Builds a type for `resource_name`, which is upper-cased.
    ///
    /// # Errors
    /// [`ResourceError::MissingResourceName`] for an empty name and
    /// [`ResourceError::InvalidResourceName`] when the name contains `/`.
    pub fn new(resource_name: &str, kind: ActionKind) -> Result<Self, ResourceError> {
        Ok(Self {
            resource: wire_name(resource_name)?,
            kind,
        })
    }

    /// Skips validation; `resource` must already be a wire name.
    pub(crate) fn from_wire_name(resource: &str, kind: ActionKind) -> Self {
        Self {
            resource: resource.to_string(),
            kind,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.resource,
            self.kind.domain_token(),
            self.kind.method_token()
        )
    }
}

impl FromStr for ActionType {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ResourceError::InvalidActionType(s.to_string());
        let mut parts = s.split('/');
        let (Some(resource), Some(domain), Some(method), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if resource.is_empty() {
            return Err(invalid());
        }
        let kind = ActionKind::parse(domain, method).ok_or_else(invalid)?;
        Ok(Self {
            resource: resource.to_string(),
            kind,
        })
    }
}

impl TryFrom<String> for ActionType {
    type Error = ResourceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActionType> for String {
    fn from(value: ActionType) -> Self {
        value.to_string()
    }
}

/// Metadata carried next to the payload.
///
/// The reducer only reads `form`, `field` and `operation`; everything else lands in
/// `extra` and is handed untouched to the entity and error reducers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ActionMeta {
    /// Meta addressing the changeset stored under `form`.
    pub fn form(form: impl Into<String>) -> Self {
        Self {
            form: Some(form.into()),
            ..Self::default()
        }
    }

    /// Meta addressing the status slice of `operation`.
    pub fn operation(operation: Operation) -> Self {
        Self {
            operation: Some(operation),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A dispatched action record.
///
/// # Interop boundary
/// Deserialization accepts only this crate's protocol: a `type` of exactly three
/// segments with known domain and method tokens. Foreign records sharing a stream
/// (`"@@redux/INIT"`, `"NOTES/SYNC/DONE"`) fail to decode with
/// [`ResourceError::InvalidActionType`] instead of reaching a reducer; a mixed
/// dispatcher drops them at decode time, which has the same effect as a reducer
/// returning its state unchanged. Records for other resources do decode and are
/// ignored by [`ResourceReducer::reduce`](crate::framework::ResourceReducer::reduce).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ActionMeta>,
    #[serde(default)]
    pub error: bool,
}

impl Action {
    /// Builds an action, deriving `error` from the method.
    pub fn new(action_type: ActionType, payload: Option<Value>, meta: Option<ActionMeta>) -> Self {
        let error = action_type.kind().is_failure();
        Self {
            action_type,
            payload,
            meta,
            error,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.action_type.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_type_round_trips_through_display_and_parse() {
        let ty = ActionType::new("notes", ActionKind::Operation(Operation::Fetch, Phase::Success)).unwrap();
        assert_eq!(ty.to_string(), "NOTES/FETCH/SUCCESS");
        assert_eq!("NOTES/FETCH/SUCCESS".parse::<ActionType>().unwrap(), ty);

        let clear: ActionType = "NOTES/STATUS/CLEAR".parse().unwrap();
        assert_eq!(clear.kind(), ActionKind::StatusClear);

        let update: ActionType = "NOTES/CHANGESET/UPDATE".parse().unwrap();
        assert_eq!(update.kind(), ActionKind::Changeset(ChangesetMethod::Update));
    }

    #[test]
    fn test_parse_rejects_unknown_tokens() {
        for raw in [
            "NOTES/FETCH",
            "NOTES/FETCH/DONE",
            "NOTES/LIST/START",
            "NOTES/STATUS/RESET",
            "/FETCH/START",
            "A/B/C/D",
            "@@INIT",
        ] {
            assert!(
                matches!(raw.parse::<ActionType>(), Err(ResourceError::InvalidActionType(_))),
                "{raw} should not parse"
            );
        }
    }

    #[test]
    fn test_empty_resource_name_is_rejected() {
        let result = ActionType::new("", ActionKind::StatusClear);
        assert!(matches!(result, Err(ResourceError::MissingResourceName)));
    }

    #[test]
    fn test_error_flag_follows_method() {
        let failure = ActionType::new("notes", ActionKind::Operation(Operation::Create, Phase::Failure)).unwrap();
        let success = ActionType::new("notes", ActionKind::Operation(Operation::Create, Phase::Success)).unwrap();
        assert!(Action::new(failure, None, None).error);
        assert!(!Action::new(success, None, None).error);
    }

    #[test]
    fn test_action_deserializes_from_wire_record() {
        let action: Action = serde_json::from_value(json!({
            "type": "NOTES/CHANGESET/UPDATE",
            "payload": "b",
            "meta": { "form": "create", "field": "name", "requestId": 4 }
        }))
        .unwrap();

        assert_eq!(action.kind(), ActionKind::Changeset(ChangesetMethod::Update));
        let meta = action.meta.unwrap();
        assert_eq!(meta.form.as_deref(), Some("create"));
        assert_eq!(meta.field.as_deref(), Some("name"));
        assert_eq!(meta.extra.get("requestId"), Some(&json!(4)));
    }

    #[test]
    fn test_foreign_records_are_rejected_at_decode_time() {
        for foreign in ["@@redux/INIT", "NOTES/SYNC/DONE", "NOTES/FETCH/RETRY", "/FETCH/START"] {
            let decoded = serde_json::from_value::<Action>(json!({ "type": foreign }));
            assert!(decoded.is_err(), "{foreign} should not decode");
        }
        let other_resource: Action = serde_json::from_value(json!({ "type": "USERS/FETCH/START" })).unwrap();
        assert_eq!(other_resource.action_type.resource(), "USERS");
    }

    #[test]
    fn test_operation_parses_case_insensitively() {
        assert_eq!("UPDATE".parse::<Operation>().unwrap(), Operation::Update);
        assert_eq!("fetch".parse::<Operation>().unwrap(), Operation::Fetch);
        assert!("edit".parse::<Operation>().is_err());
    }
}
