//! Request verbs and response discriminants.

use std::fmt::{Display, Formatter, Result as FormatResult};

use serde::{Deserialize, Serialize};

/// Verb carried in the `action` field of every outbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Login,
    Logout,
    Insert,
    Update,
    Delete,
    Query,
    ReadOne,
    ReadFind,
    ReadRange,
    ReadAll,
    IndexCreate,
    IndexDrop,
    IndexList,
    GetTime,
    Stats,
    GetUsers,
    GetConfig,
    PutConfig,
    Logs,
    RegisterEvent,
    UnregisterEvent,
    EmailAlert,
    SetUserSetting,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Login => "LOGIN",
            Action::Logout => "LOGOUT",
            Action::Insert => "INSERT",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::Query => "QUERY",
            Action::ReadOne => "READONE",
            Action::ReadFind => "READFIND",
            Action::ReadRange => "READRANGE",
            Action::ReadAll => "READALL",
            Action::IndexCreate => "INDEXCREATE",
            Action::IndexDrop => "INDEXDROP",
            Action::IndexList => "INDEXLIST",
            Action::GetTime => "GETTIME",
            Action::Stats => "STATS",
            Action::GetUsers => "GETUSERS",
            Action::GetConfig => "GETCONFIG",
            Action::PutConfig => "PUTCONFIG",
            Action::Logs => "LOGS",
            Action::RegisterEvent => "REGISTEREVENT",
            Action::UnregisterEvent => "UNREGISTEREVENT",
            Action::EmailAlert => "EMAILALERT",
            Action::SetUserSetting => "SETUSERSETTING",
        }
    }

    /// Write verbs accept the optional `defered` hint.
    pub const fn accepts_deferred(self) -> bool {
        matches!(self, Action::Insert | Action::Update | Action::Delete)
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}

/// Discriminant of an inbound reply or push frame.
///
/// The literal table is closed: anything not listed here is dropped by the
/// router without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseAction {
    Login,
    Logout,
    Message,
    Read,
    Stats,
    Update,
    Delete,
    Insert,
    GetTime,
    ReadIndexes,
    RegisterEvent,
    UnregisterEvent,
}

impl ResponseAction {
    pub const ALL: [ResponseAction; 12] = [
        ResponseAction::Login,
        ResponseAction::Logout,
        ResponseAction::Message,
        ResponseAction::Read,
        ResponseAction::Stats,
        ResponseAction::Update,
        ResponseAction::Delete,
        ResponseAction::Insert,
        ResponseAction::GetTime,
        ResponseAction::ReadIndexes,
        ResponseAction::RegisterEvent,
        ResponseAction::UnregisterEvent,
    ];

    /// Exact wire literal, casing included.
    pub const fn literal(self) -> &'static str {
        match self {
            ResponseAction::Login => "login",
            ResponseAction::Logout => "logout",
            ResponseAction::Message => "message",
            ResponseAction::Read => "read",
            ResponseAction::Stats => "stats",
            ResponseAction::Update => "UPDATE",
            ResponseAction::Delete => "DELETE",
            ResponseAction::Insert => "INSERT",
            ResponseAction::GetTime => "gettime",
            ResponseAction::ReadIndexes => "readindexes",
            ResponseAction::RegisterEvent => "registerevent",
            ResponseAction::UnregisterEvent => "unregisterevent",
        }
    }

    /// Case-sensitive lookup. `"insert"` and `"LOGIN"` are not recognized.
    pub fn from_literal(literal: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.literal() == literal)
    }
}

impl Display for ResponseAction {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.literal())
    }
}
