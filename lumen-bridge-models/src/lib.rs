//! Shared data models for Lumen Bridge: configuration, channel mappings,
//! ingress data points and the REST response envelope.

pub mod channel;
pub mod constants;
pub mod point;
pub mod settings;
pub mod web;

pub use channel::ChannelMapping;
pub use point::DataPoint;
pub use settings::Settings;
