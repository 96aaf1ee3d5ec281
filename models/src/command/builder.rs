use crate::command::Command;
use crate::{Action, Deferred, ErrorLocation, FieldType, ModelError};

use common::RedactedSecret;

use std::panic::Location;

use serde_json::Value;

/// Fields a verb may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Username,
    Password,
    BucketName,
    Key,
    SearchField,
    MaxKey,
    Field,
    Data,
}

impl Slot {
    fn wire_name(self) -> &'static str {
        match self {
            Slot::Username => "username",
            Slot::Password => "password",
            Slot::BucketName => "bucketname",
            Slot::Key => "key",
            Slot::SearchField => "searchfield",
            Slot::MaxKey => "maxkey",
            Slot::Field => "field",
            Slot::Data => "data",
        }
    }
}

/// How strictly a required slot is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Need {
    /// Must be set; an empty string is allowed (lookup values, time bounds).
    Present,
    /// Must be set and non-empty (identifiers).
    Identifier,
}

use Need::{Identifier, Present};
use Slot::{BucketName, Data, Field, Key, MaxKey, Password, SearchField, Username};

fn requirements(action: Action) -> &'static [(Slot, Need)] {
    match action {
        Action::Login => &[(Username, Identifier), (Password, Identifier)],
        Action::Insert => &[(BucketName, Identifier), (Data, Present)],
        Action::Update => &[(BucketName, Identifier), (Key, Identifier), (Data, Present)],
        Action::Delete => &[(BucketName, Identifier), (Key, Identifier)],
        Action::Query => &[(BucketName, Identifier), (Data, Present)],
        Action::ReadOne | Action::ReadFind => &[
            (BucketName, Identifier),
            (Key, Present),
            (SearchField, Present),
            (Field, Present),
        ],
        Action::ReadRange => &[
            (BucketName, Identifier),
            (Key, Present),
            (SearchField, Present),
            (MaxKey, Present),
            (Field, Present),
        ],
        Action::ReadAll | Action::RegisterEvent | Action::UnregisterEvent => {
            &[(BucketName, Identifier)]
        }
        Action::IndexCreate => &[(Key, Identifier), (SearchField, Identifier)],
        Action::IndexDrop => &[(Key, Identifier)],
        Action::Logs => &[(Key, Present), (MaxKey, Present)],
        Action::PutConfig | Action::EmailAlert | Action::SetUserSetting => &[(Data, Present)],
        Action::Logout
        | Action::IndexList
        | Action::GetTime
        | Action::Stats
        | Action::GetUsers
        | Action::GetConfig => &[],
    }
}

/// Builder for creating validated [`Command`] instances.
///
/// Each verb has a fixed table of required fields (see the wire reference in
/// the crate docs). `build` rejects a command whose required fields are
/// missing, or whose identifiers are empty, before anything is serialized.
#[derive(Debug)]
pub struct CommandBuilder {
    action: Action,
    username: Option<String>,
    password: Option<RedactedSecret>,
    bucket_name: Option<String>,
    key: Option<String>,
    search_field: Option<String>,
    max_key: Option<String>,
    field: Option<FieldType>,
    deferred: Option<Deferred>,
    data: Option<Value>,
}

impl CommandBuilder {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            username: None,
            password: None,
            bucket_name: None,
            key: None,
            search_field: None,
            max_key: None,
            field: None,
            deferred: None,
            data: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<RedactedSecret>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_bucket_name(mut self, bucket_name: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket_name.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_search_field(mut self, search_field: impl Into<String>) -> Self {
        self.search_field = Some(search_field.into());
        self
    }

    pub fn with_max_key(mut self, max_key: impl Into<String>) -> Self {
        self.max_key = Some(max_key.into());
        self
    }

    pub fn with_field_type(mut self, field: FieldType) -> Self {
        self.field = Some(field);
        self
    }

    /// `None` leaves the hint off the frame.
    pub fn with_deferred(mut self, deferred: Option<Deferred>) -> Self {
        self.deferred = deferred;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Build the command with validation.
    #[track_caller]
    pub fn build(self) -> Result<Command, ModelError> {
        for &(slot, need) in requirements(self.action) {
            let present = match slot {
                Username => text_state(self.username.as_deref()),
                Password => self.password.as_ref().map(|p| !p.is_empty()),
                BucketName => text_state(self.bucket_name.as_deref()),
                Key => text_state(self.key.as_deref()),
                SearchField => text_state(self.search_field.as_deref()),
                MaxKey => text_state(self.max_key.as_deref()),
                Field => self.field.map(|_| true),
                Data => self.data.as_ref().map(|_| true),
            };

            match (present, need) {
                (None, _) => {
                    return Err(ModelError::Validation {
                        message: format!(
                            "{} command requires '{}'",
                            self.action,
                            slot.wire_name()
                        ),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
                (Some(false), Identifier) => {
                    return Err(ModelError::Validation {
                        message: format!(
                            "{} command requires a non-empty '{}'",
                            self.action,
                            slot.wire_name()
                        ),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
                _ => {}
            }
        }

        if self.deferred.is_some() && !self.action.accepts_deferred() {
            return Err(ModelError::Validation {
                message: format!("{} command does not accept 'defered'", self.action),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Command {
            action: self.action,
            username: self.username,
            password: self.password,
            bucket_name: self.bucket_name,
            key: self.key,
            search_field: self.search_field,
            max_key: self.max_key,
            field: self.field,
            deferred: self.deferred,
            data: self.data,
        })
    }
}

/// `None` when unset, `Some(false)` when set but empty.
fn text_state(value: Option<&str>) -> Option<bool> {
    value.map(|text| !text.is_empty())
}
