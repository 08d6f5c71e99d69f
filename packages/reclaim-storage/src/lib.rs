pub mod documents;
pub mod files;
pub mod legacy;
pub mod retention;

mod error;

pub use error::Error;
pub use files::FileStore;

pub type Result<T, E = Error> = std::result::Result<T, E>;
