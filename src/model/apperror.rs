use std::fmt;

/**
 * Represents the type of error that can occur within the application.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorType {
    /**
     * Startup failed, configuration, logging, database or TLS setup.
     */
    Initialization,
    /**
     * Malformed month string or a date that does not exist in the calendar.
     */
    InvalidFormat,
    /**
     * Numeric field out of its allowed range or malformed payload.
     */
    Validation,
    /**
     * A record already exists for the month.
     */
    Conflict,
    /**
     * No record exists for the month.
     */
    NotFound,
    /**
     * Anything the storage layer reports that is not anticipated.
     */
    DatabaseError,
}

/**
 * Represents an error that occurs within the application.
 */
#[derive(Debug, Clone)]
pub struct ApplicationError {
    /**
     * Error type.
     */
    pub error_type: ErrorType,
    /**
     * Error message describing problem.
     */
    pub message: String,
}

impl ApplicationError {
    /**
     * Creates a new ApplicationError.
     *
     * #Arguments
     * `error_type`: The type of error.
     * `message`: A description of the error.
     */
    pub fn new(error_type: ErrorType, message: String) -> Self {
        ApplicationError { error_type, message }
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApplicationError {}

impl From<ApplicationError> for std::io::Error {
    fn from(err: ApplicationError) -> Self {
        std::io::Error::other(err.message)
    }
}
