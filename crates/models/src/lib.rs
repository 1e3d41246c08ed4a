pub mod artifact;
pub mod domain;
pub mod error;
pub mod flow;
pub mod report;
