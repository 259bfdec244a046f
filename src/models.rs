use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CompanyRecord {
    pub id: i64,
    pub notification_date: NaiveDate,
    pub company_name: String,
    pub type_of_offer: String,
    pub branches_allowed: Option<String>,
    pub eligibility_cgpa: Option<String>,
    pub job_roles: String,
    pub ctc_stipend: String,
    pub students_selected: i32,
    pub process: String,
}

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub notification_date: NaiveDate,
    pub company_name: String,
    pub type_of_offer: String,
    pub branches_allowed: Option<String>,
    pub eligibility_cgpa: Option<String>,
    pub job_roles: String,
    pub ctc_stipend: String,
    pub students_selected: i32,
    pub process: String,
    pub source_key: Option<String>,
}

/// Partial update; `None` fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct CompanyPatch {
    pub notification_date: Option<NaiveDate>,
    pub company_name: Option<String>,
    pub type_of_offer: Option<String>,
    pub branches_allowed: Option<String>,
    pub eligibility_cgpa: Option<String>,
    pub job_roles: Option<String>,
    pub ctc_stipend: Option<String>,
    pub students_selected: Option<i32>,
    pub process: Option<String>,
}

/// An extracted amount paired with the number of students it applies to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedSample {
    pub value: f64,
    pub weight: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlacementStats {
    pub total_unique_companies: usize,
    pub on_campus: usize,
    pub ppo: usize,
    pub average_stipend: f64,
    pub average_ctc: f64,
    pub median_ctc: f64,
    pub average_ctc_weighted: f64,
    pub students_selected: i64,
    pub intern_count: i64,
    pub fte_count: i64,
    pub intern_fte_count: i64,
}

#[derive(Debug, Clone)]
pub struct OfferTypeSummary {
    pub type_of_offer: String,
    pub drive_count: usize,
    pub students_selected: i64,
}
