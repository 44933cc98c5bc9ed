pub mod credential;
pub mod outcome;
pub mod plan;
pub mod target;
