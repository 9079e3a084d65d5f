use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Lookups never fail: a missing mapping is represented as `None` and name resolution falls
/// back to echoing the obfuscated identifier. Errors are reserved for malformed input text,
/// broken invariants inside the merge engine, and failures surfaced by merge handlers.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - A type descriptor or signature could not be parsed
///
/// ## Merge Errors
/// - [`Error::InvalidState`] - The merge dispatcher reached an impossible pairing
/// - [`Error::InconsistentMerge`] - A merge handler returned a mapping the target does not own
/// - [`Error::MergeFailed`] - A parallel merge task failed; wraps the first failure
/// - [`Error::ThreadPool`] - The worker pool for a merge could not be built
///
/// # Examples
///
/// ```rust
/// use mapscope::{Error, signatures::MethodDescriptor};
///
/// match MethodDescriptor::parse("(ILjava/lang/String)V") {
///     Ok(desc) => println!("Parsed {desc}"),
///     Err(Error::Malformed { message, .. }) => eprintln!("Bad descriptor: {message}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The descriptor or signature text is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An internal invariant was violated.
    ///
    /// This indicates a logic defect (for example the merge dispatcher being asked to merge
    /// a pairing in which neither side is present), not recoverable input.
    #[error("Invalid state - {0}")]
    InvalidState(String),

    /// A merge handler produced a result that is inconsistent with the merge target.
    ///
    /// Raised when a handler returns a mapping that does not belong to the scope it was
    /// asked to populate. The merge is aborted; nothing is silently corrected.
    #[error("Inconsistent merge result - {0}")]
    InconsistentMerge(String),

    /// A parallel merge task failed.
    ///
    /// The first failure observed is wrapped and returned; no partial mapping set is
    /// handed back to the caller.
    #[error("Mapping merge failed: {source}")]
    MergeFailed {
        /// The failure raised inside the merge task
        #[source]
        source: Box<Error>,
    },

    /// The worker pool for a parallel merge could not be created.
    #[error("{0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Generic error for miscellaneous failures.
    ///
    /// Used by custom merge handlers and inheritance providers for errors that don't fit
    /// into other categories.
    #[error("{0}")]
    Error(String),
}
