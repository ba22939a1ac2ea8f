//! Report generation over tagged journals.

mod generator;
mod page;

pub use generator::{ReportGenerator, TagMonthReportGenerator};
pub use page::get_tag_report_page;
