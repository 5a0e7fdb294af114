pub mod dashboard;

pub use dashboard::{DashboardContent, DashboardService, DateSection, PageData};
