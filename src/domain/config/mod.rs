//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, AwsConfig, DEFAULT_LANGUAGE_CODE, DEFAULT_REGION, DEFAULT_STATUS_QUERY_RETRIES,
};
