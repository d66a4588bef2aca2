pub mod auth;
pub mod config;
pub mod garden;
pub mod review;

/// The operator's calendar day.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
