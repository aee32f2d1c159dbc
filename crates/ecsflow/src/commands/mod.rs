pub mod plan;
pub mod provision;
pub mod status;
pub mod wait;
