pub mod billing;
pub mod report;
pub mod student;
