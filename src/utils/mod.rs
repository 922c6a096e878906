pub mod option_id;
pub mod time;
pub mod validation;
