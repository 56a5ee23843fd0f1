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
/// Every failure is scoped to the record or operation being processed; nothing in this crate
/// is fatal to the embedding host. Decoders report errors upward as result values and the
/// orchestration layer decides whether to skip the record, retry with relaxed assumptions, or
/// surface a message to the user.
///
/// # Error Categories
///
/// ## Address Errors
/// - [`Error::InvalidAddress`] - Sentinel or null address where a real address is required
/// - [`Error::OutOfBounds`] - Attempted to read beyond the image boundaries
///
/// ## Record Errors
/// - [`Error::Malformed`] - Structurally inconsistent data (unterminated name, odd pattern, ...)
///
/// ## Annotation Errors
/// - [`Error::AnnotationFailed`] - The address space rejected an annotation write
///
/// # Examples
///
/// ```rust
/// use rttiscope::{Error, Image, Address, rtti::BaseClassDescriptor};
///
/// let mut image = Image::from_mem(vec![0u8; 64]);
/// match BaseClassDescriptor::decode(&mut image, Address::INVALID) {
///     Ok(descriptor) => println!("Decoded {}", descriptor.base_name),
///     Err(Error::InvalidAddress) => eprintln!("No record at a null/unset address"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed record: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A sentinel or null address was passed where a real address is required.
    ///
    /// RTTI records chain through embedded pointers; a pointer that is zero or
    /// [`crate::Address::INVALID`] means "no record here". Non-retryable - the caller
    /// must skip the record.
    #[error("No record at a null or invalid address")]
    InvalidAddress,

    /// An out of bound access was attempted while reading the image.
    ///
    /// This error occurs when trying to read data beyond the end of the binary image.
    /// It's a safety check to prevent buffer overruns when following corrupt pointers.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The record is damaged and could not be decoded.
    ///
    /// This error indicates that the data at the given address does not conform to the
    /// expected MSVC RTTI layout - an unterminated type name, a name without the RTTI
    /// tag, or a malformed byte pattern. The error includes the source location where
    /// the malformation was detected for debugging purposes.
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

    /// The address space rejected an annotation write.
    ///
    /// Annotation writes (names, comments, field markup) are best-effort; most callers
    /// ignore individual rejections. This error is only surfaced where the annotation
    /// is the whole point of the operation, e.g. the constructor rename at the end of
    /// candidate disambiguation. Non-fatal - processing continues without it.
    #[error("Annotation rejected - {0}")]
    AnnotationFailed(String),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur while opening or mapping an image
    /// file from disk.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
