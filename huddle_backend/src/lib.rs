//! Simulated backend services for the Huddle community app: in-memory
//! collections behind asynchronous methods that model network latency.
//! The frontend crate performs optimistic mutations against these services
//! and reconciles with whatever they return.

pub mod badges;
pub mod cli;
pub mod community;
pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod members;
pub mod messaging;
pub mod models;
pub mod posts;
pub mod seed;
pub mod services;
pub mod telemetry;
