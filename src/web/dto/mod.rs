pub mod profile;
pub mod progress;
