//! Page controllers. Each is built per request around a data source, fills a
//! [`Page`](crate::page::Page) and falls back to sample data when a fetch fails.

pub mod profile;
pub mod reports;
pub mod summary;

pub use profile::UserProfileController;
pub use reports::ReportsController;
pub use summary::AttendanceSummaryController;
