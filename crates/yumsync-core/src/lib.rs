use error::YumError;

pub mod backend;
pub mod backends;
pub mod constants;
pub mod error;
pub mod package;
pub mod repository;
pub mod sync;
pub mod version;

pub type YumResult<T> = std::result::Result<T, YumError>;
