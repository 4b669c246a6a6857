//! Object storage adapters

mod s3;

pub use s3::{parse_s3_location, S3Location, S3Storage};
