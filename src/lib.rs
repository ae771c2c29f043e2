pub mod config;
pub mod db;
pub mod demo;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod notifier;
pub mod resp;

pub use config::{Config, DemoConfig, Mode};
pub use db::RendezvousMap;
pub use notifier::Notifier;
