use serde::{Deserialize, Serialize};

/// Persisted countdown state. Times are epoch / duration milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub start_time: i64,
    pub elapsed_time: i64,
    pub is_running: bool,
    #[serde(default)]
    pub time_limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}
