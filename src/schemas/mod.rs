use std::collections::HashMap;

use serde::Serialize;

pub(crate) mod assignment;
pub(crate) mod bulk;
pub(crate) mod completion;
pub(crate) mod dates;
pub(crate) mod entity;
pub(crate) mod notification;
pub(crate) mod progress;
pub(crate) mod report;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) api_prefix: String,
}
