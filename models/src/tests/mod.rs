mod deferred;
mod field_type;
