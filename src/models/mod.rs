pub mod answer;
pub mod progress;
pub mod question;
pub mod quiz;
pub mod quiz_result;
pub mod timer_state;
