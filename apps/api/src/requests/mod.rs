// Customer project requests: upload, parsing, storage and the match trigger.

pub mod handlers;
pub mod ingest;
pub mod prompts;
pub mod repository;
