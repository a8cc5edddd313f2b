//! Concrete adapter implementations for ports.

pub mod file_config_adapter;
pub mod log_notifier;
pub mod paper_broker;
pub mod system_clock;
