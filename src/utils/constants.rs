pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DOWNSTREAM_URL: &str = "http://localhost:8000";

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
// headroom for boundaries, part headers and the question field
pub const SERVER_REQUEST_BODY_LIMIT: usize = MAX_FILE_SIZE + 1024 * 1024;

pub const DOCUMENT_FIELD: &str = "document";
pub const QUESTION_FIELD: &str = "question";
pub const FORWARDED_FILE_FIELD: &str = "file";
pub const FORWARDED_QUESTION_FIELD: &str = "question";
pub const ANALYZE_DOCUMENT_PATH: &str = "/analyze_document";
// same default browsers and form parsers assume for an untyped part
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

pub const GREETING: &str = "Hello from AION Analyze API!";

pub const MISSING_FILE_MESSAGE: &str = "file not found";
pub const FILE_TOO_LARGE_MESSAGE: &str = "file exceeds the 10 MiB upload limit";
pub const REQUEST_TOO_LARGE_MESSAGE: &str = "request body exceeds the 11 MiB upload limit";
pub const MALFORMED_MULTIPART_MESSAGE: &str = "malformed multipart body";
pub const DOWNSTREAM_FAILURE_MESSAGE: &str =
    "document analysis failed on the AI service side";
pub const DOWNSTREAM_UNREACHABLE_MESSAGE: &str =
    "could not connect to the AI service, make sure the AI server is running";
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";
