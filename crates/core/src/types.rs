/// Scene numbers are positive and unique within one request.
pub type SceneNumber = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
