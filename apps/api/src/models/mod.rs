pub mod consultant;
pub mod project_request;
