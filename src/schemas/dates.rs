use serde::{Deserialize, Serialize};

use crate::core::time::{format_date, format_primitive};
use crate::db::models::CompanyDates;
use crate::db::types::AssignmentLevel;
use crate::repositories::dates::CompanyDatesView;
use crate::schemas::assignment::ItemError;

/// `POST /projects/{id}/dates` body.
#[derive(Debug, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub(crate) enum DatesOperationRequest {
    SetDates(SetDatesRequest),
    RemoveDates(RemoveDatesRequest),
}

impl DatesOperationRequest {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::SetDates(_) => "set_dates",
            Self::RemoveDates(_) => "remove_dates",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetDatesRequest {
    pub(crate) level: AssignmentLevel,
    #[serde(flatten)]
    pub(crate) selection: DateSelection,
}

/// Either one company and one range for every selected item, or an explicit
/// list of (item, company, range) pairs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DateSelection {
    PerPair(PerPairDates),
    Uniform(UniformDates),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UniformDates {
    pub(crate) item_ids: Vec<String>,
    pub(crate) company_id: String,
    #[serde(default)]
    pub(crate) start_date: Option<String>,
    #[serde(default)]
    pub(crate) end_date: Option<String>,
    #[serde(default)]
    pub(crate) is_flexible: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PerPairDates {
    pub(crate) pairs: Vec<PairDates>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PairDates {
    pub(crate) item_id: String,
    pub(crate) company_id: String,
    #[serde(default)]
    pub(crate) start_date: Option<String>,
    #[serde(default)]
    pub(crate) end_date: Option<String>,
    #[serde(default)]
    pub(crate) is_flexible: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemoveDatesRequest {
    pub(crate) level: AssignmentLevel,
    pub(crate) item_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompanyDatesResponse {
    pub(crate) id: String,
    pub(crate) entity_id: String,
    pub(crate) company_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) company_name: Option<String>,
    pub(crate) start_date: Option<String>,
    pub(crate) end_date: Option<String>,
    pub(crate) is_flexible: bool,
    pub(crate) updated_at: String,
}

impl CompanyDatesResponse {
    pub(crate) fn from_db(dates: CompanyDates) -> Self {
        Self {
            id: dates.id,
            entity_id: dates.entity_id,
            company_id: dates.company_id,
            company_name: None,
            start_date: dates.start_date.map(format_date),
            end_date: dates.end_date.map(format_date),
            is_flexible: dates.is_flexible,
            updated_at: format_primitive(dates.updated_at),
        }
    }

    pub(crate) fn from_view(view: CompanyDatesView) -> Self {
        let mut response = Self::from_db(view.dates);
        response.company_name = Some(view.company_name);
        response
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DatesOperationResponse {
    pub(crate) success: bool,
    pub(crate) operation: &'static str,
    pub(crate) successful: usize,
    pub(crate) failed: usize,
    pub(crate) results: Vec<CompanyDatesResponse>,
    pub(crate) errors: Vec<ItemError>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProjectDatesResponse {
    pub(crate) project_id: String,
    pub(crate) project: Vec<CompanyDatesResponse>,
    pub(crate) sub_projects: Vec<CompanyDatesResponse>,
    pub(crate) tasks: Vec<CompanyDatesResponse>,
}
