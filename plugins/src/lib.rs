pub mod correlate;
pub mod evidence;
pub mod factory;
pub mod report;
pub mod runtime;
pub mod services;

mod time;
