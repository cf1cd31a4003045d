//! Internal helper macros shared across the crate.

/// Returns early with the given error when the predicate does not hold.
///
/// The decoding paths use this for guard clauses where `assert!` would be
/// wrong: a malformed peer must surface as an `Err`, never as a panic.
///
/// # Example
///
/// ```ignore
/// ensure!(code.len() == 3, ParseError::malformed_status_line("short code"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
