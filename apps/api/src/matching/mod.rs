// Consultant ↔ project request matching.
// Upload publishes an event; the worker runs the matching service off the request path.

pub mod events;
pub mod handlers;
pub mod scoring;
pub mod service;
