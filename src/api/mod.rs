pub(crate) mod bulk_operations;
pub(crate) mod companies;
pub(crate) mod completions;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod notifications;
pub(crate) mod progress;
pub(crate) mod projects;
pub(crate) mod reports;
pub(crate) mod router;
pub(crate) mod sub_projects;
pub(crate) mod tasks;
pub(crate) mod validation;
