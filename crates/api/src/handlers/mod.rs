pub mod automation;
pub mod composition;
pub mod projects;
