use crate::exit_codes::ExitCode;

#[derive(Debug)]
pub enum RunError {
    InvalidInput(anyhow::Error),
    RuntimeError(anyhow::Error),
}

impl RunError {
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidInput(_) => ExitCode::InvalidInput,
            Self::RuntimeError(_) => ExitCode::RuntimeError,
        }
    }

    #[must_use]
    pub fn anyhow(&self) -> &anyhow::Error {
        match self {
            Self::InvalidInput(e) | Self::RuntimeError(e) => e,
        }
    }
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#}", self.anyhow())
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.anyhow().as_ref())
    }
}

impl From<cachestorm_core::runner::Error> for RunError {
    fn from(err: cachestorm_core::runner::Error) -> Self {
        use cachestorm_core::runner::Error;

        match err {
            Error::UndefinedMode { .. } | Error::TooManyThreads { .. } => {
                Self::InvalidInput(anyhow::Error::new(err))
            }
            Error::Join(_) => Self::RuntimeError(anyhow::Error::new(err).context("workload failed")),
        }
    }
}
