pub mod hris;
pub mod response;
