// Consultants: CV upload, profile extraction and storage.

pub mod handlers;
pub mod ingest;
pub mod prompts;
pub mod repository;
