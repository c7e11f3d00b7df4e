pub mod config;
pub mod lecture;
pub mod reminder;
pub mod run;
