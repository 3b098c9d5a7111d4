pub(crate) mod assignment_cascade;
pub(crate) mod bulk_dates;
pub(crate) mod completion_pipeline;
pub(crate) mod progress;
pub(crate) mod rates;
pub(crate) mod selection;
