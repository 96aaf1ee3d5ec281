//! Command encoder.
//!
//! One function per operation. Each validates its arguments and returns a
//! [`Command`] ready for the sender; nothing here looks at the session; the
//! connection check happens in [`BarnClient`](crate::BarnClient) before any of
//! these run.
//!
//! Record identity is taken from the reserved `$id` property. `update` also
//! takes the bucket from `$bucketname`; `insert` and `delete` take it as an
//! argument.

use crate::error::client::ClientError;

use common::{ErrorLocation, RedactedSecret};
use models::record::{record_bucket, record_id};
use models::{Action, Command, CommandBuilder, Deferred, FieldType};

use std::panic::Location;

use serde_json::{Value, json};

pub fn login(username: &str, password: impl Into<RedactedSecret>) -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::Login)
        .with_username(username)
        .with_password(password)
        .build()?)
}

pub fn logout() -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::Logout).build()?)
}

/// `key` is sent only when the record carries a non-empty `$id`.
pub fn insert(
    bucket_name: &str,
    record: &Value,
    deferred: Option<Deferred>,
) -> Result<Command, ClientError> {
    let mut builder = CommandBuilder::new(Action::Insert)
        .with_bucket_name(bucket_name)
        .with_data(record.clone())
        .with_deferred(deferred);

    if let Some(key) = record_id(record) {
        builder = builder.with_key(key);
    }

    Ok(builder.build()?)
}

#[track_caller]
pub fn update(record: &Value, deferred: Option<Deferred>) -> Result<Command, ClientError> {
    let key = record_id(record).ok_or_else(|| missing_property("update", "$id"))?;
    let bucket_name =
        record_bucket(record).ok_or_else(|| missing_property("update", "$bucketname"))?;

    Ok(CommandBuilder::new(Action::Update)
        .with_bucket_name(bucket_name)
        .with_key(key)
        .with_data(record.clone())
        .with_deferred(deferred)
        .build()?)
}

#[track_caller]
pub fn delete(
    bucket_name: &str,
    record: &Value,
    deferred: Option<Deferred>,
) -> Result<Command, ClientError> {
    let key = record_id(record).ok_or_else(|| missing_property("delete", "$id"))?;

    Ok(CommandBuilder::new(Action::Delete)
        .with_bucket_name(bucket_name)
        .with_key(key)
        .with_deferred(deferred)
        .build()?)
}

pub fn query(bucket_name: &str, pattern: &Value) -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::Query)
        .with_bucket_name(bucket_name)
        .with_data(pattern.clone())
        .build()?)
}

/// First record whose `search_field` equals `value`.
pub fn one(
    bucket_name: &str,
    search_field: &str,
    value: &str,
    field_type: &str,
) -> Result<Command, ClientError> {
    lookup(Action::ReadOne, bucket_name, search_field, value, field_type)
}

/// Every record whose `search_field` equals `value`.
pub fn many(
    bucket_name: &str,
    search_field: &str,
    value: &str,
    field_type: &str,
) -> Result<Command, ClientError> {
    lookup(Action::ReadFind, bucket_name, search_field, value, field_type)
}

pub fn range(
    bucket_name: &str,
    search_field: &str,
    min_value: &str,
    max_value: &str,
    field_type: &str,
) -> Result<Command, ClientError> {
    let field_type: FieldType = field_type.parse()?;

    Ok(CommandBuilder::new(Action::ReadRange)
        .with_bucket_name(bucket_name)
        .with_key(min_value)
        .with_search_field(search_field)
        .with_max_key(max_value)
        .with_field_type(field_type)
        .build()?)
}

pub fn all(bucket_name: &str) -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::ReadAll)
        .with_bucket_name(bucket_name)
        .build()?)
}

pub fn index_create(index_name: &str, field: &str) -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::IndexCreate)
        .with_key(index_name)
        .with_search_field(field)
        .build()?)
}

pub fn index_drop(index_name: &str) -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::IndexDrop)
        .with_key(index_name)
        .build()?)
}

pub fn index_list() -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::IndexList).build()?)
}

pub fn time() -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::GetTime).build()?)
}

pub fn stats() -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::Stats).build()?)
}

pub fn get_users() -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::GetUsers).build()?)
}

pub fn get_config() -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::GetConfig).build()?)
}

pub fn put_config(config: &Value) -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::PutConfig)
        .with_data(config.clone())
        .build()?)
}

/// Server log lines between two timestamps, passed through as given.
pub fn get_logs(start_time: &str, end_time: &str) -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::Logs)
        .with_key(start_time)
        .with_max_key(end_time)
        .build()?)
}

pub fn register_event(bucket_name: &str) -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::RegisterEvent)
        .with_bucket_name(bucket_name)
        .build()?)
}

pub fn unregister_event(bucket_name: &str) -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::UnregisterEvent)
        .with_bucket_name(bucket_name)
        .build()?)
}

#[track_caller]
pub fn email_alert(email: &str, buckets: &[&str]) -> Result<Command, ClientError> {
    if email.trim().is_empty() {
        return Err(ClientError::Validation {
            message: "EMAILALERT command requires a non-empty email address".to_string(),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(CommandBuilder::new(Action::EmailAlert)
        .with_data(json!({ "email": email, "buckets": buckets }))
        .build()?)
}

pub fn user_settings(settings: &Value) -> Result<Command, ClientError> {
    Ok(CommandBuilder::new(Action::SetUserSetting)
        .with_data(settings.clone())
        .build()?)
}

fn lookup(
    action: Action,
    bucket_name: &str,
    search_field: &str,
    value: &str,
    field_type: &str,
) -> Result<Command, ClientError> {
    let field_type: FieldType = field_type.parse()?;

    Ok(CommandBuilder::new(action)
        .with_bucket_name(bucket_name)
        .with_key(value)
        .with_search_field(search_field)
        .with_field_type(field_type)
        .build()?)
}

#[track_caller]
fn missing_property(operation: &str, property: &str) -> ClientError {
    ClientError::Validation {
        message: format!("Cannot {operation} a record without a non-empty '{property}'"),
        location: ErrorLocation::from(Location::caller()),
    }
}
