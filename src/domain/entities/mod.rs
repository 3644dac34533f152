pub mod plan;
pub mod student;
pub mod training_day;
