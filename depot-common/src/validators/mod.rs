//! Input validation functions
//!
//! Reusable validators shared by every entry point that accepts a client
//! supplied file name. Validation here is about the *name*; containment
//! under the upload directory is enforced separately by the server's path
//! resolution.

mod file_name;

pub use file_name::{
    FileNameError, MAX_FILE_NAME_LENGTH, PARTIAL_UPLOAD_SUFFIX, validate_file_name,
};
