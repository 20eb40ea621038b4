/// Server-assigned identifiers are integer primary keys.
pub type DbId = i64;
