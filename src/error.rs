/// Process-level failure: a message for the user plus the exit code `rate` returns.
///
/// Workflow failures never end up here; they become status notices instead.
/// This type covers terminal setup, configuration, and CLI input problems.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

/// Exit code for bad input or configuration.
pub const EXIT_USAGE: u8 = 2;
/// Exit code for runtime failures (terminal, network, submission).
pub const EXIT_RUNTIME: u8 = 4;

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
