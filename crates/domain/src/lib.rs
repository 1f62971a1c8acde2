pub mod config;
pub mod error;
pub mod model;
pub mod request;
pub mod response;
pub mod stream;
pub mod trace;
pub mod video;
