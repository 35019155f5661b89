/// Project identifiers are opaque strings (`proj_<base36 millis>_<suffix>`).
pub type ProjectId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
