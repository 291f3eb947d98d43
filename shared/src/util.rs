/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Milliseconds in one day
pub const DAY_MILLIS: i64 = 86_400_000;

/// Generate a new random document id (UUID v4)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
