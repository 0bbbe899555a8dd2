//! Headless app core for the Huddle community client. Owns the per-feature
//! view state and the optimistic mutation protocol: every mutating service
//! call is applied tentatively to local state first, then committed or
//! rolled back when the simulated backend resolves.

pub mod app;

pub use app::App;
