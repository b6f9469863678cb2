pub mod bands;
pub mod batch;
pub mod epochs;
pub mod run;
pub mod validate;
