pub mod cover;
pub mod sort;
pub mod validate;
pub mod year;
