use mongodb::error::{Error, ErrorKind, WriteFailure};

/// Server error code raised when a unique index rejects a write
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Whether `err` is a unique index violation.
///
/// `insert_one` reports it as a write error, `find_one_and_update` as a
/// command error; both are recognised.
pub fn is_duplicate_key(err: &Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
