pub mod config;
pub mod error;
pub mod mode;

pub use error::{SjclError, SjclResult};
pub use mode::{KeySize, Mode};

/// Only block cipher family the envelope format carries
pub const CIPHER: &str = "aes";

/// Only envelope format version
pub const VERSION: u32 = 1;

/// PBKDF2 salt size in bytes
pub const SALT_SIZE: usize = 8;

/// Random IV size generated at encrypt time, in bytes
pub const IV_SIZE: usize = 16;

/// PBKDF2 iteration count used when the caller does not choose one
pub const DEFAULT_ITERATIONS: u32 = 1000;
