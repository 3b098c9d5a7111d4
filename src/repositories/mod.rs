pub(crate) mod assignments;
pub(crate) mod companies;
pub(crate) mod completions;
pub(crate) mod dates;
pub(crate) mod health;
pub(crate) mod notifications;
pub(crate) mod progress;
pub(crate) mod projects;
pub(crate) mod reports;
pub(crate) mod tasks;
