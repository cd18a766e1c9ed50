pub mod advice;
pub mod estimate;
pub mod profile;
