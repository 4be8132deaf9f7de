pub mod app;
pub mod core;
pub mod mappings;
pub mod notifications;
pub mod scanner;

include!(concat!(env!("OUT_DIR"), "/version.rs"));
