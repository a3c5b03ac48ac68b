pub mod constants;
pub mod grader;
pub mod junit;
pub mod report;
pub mod runner;
pub mod types;
pub mod utils;
