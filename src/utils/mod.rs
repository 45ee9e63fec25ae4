pub mod patch;
pub mod path_validator;
pub mod pattern;

pub use path_validator::PathValidator;
