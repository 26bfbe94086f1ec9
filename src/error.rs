use swc_core::common::Span;

/// Fatal conditions raised while expanding `perenv.macro` calls.
///
/// None of these are recovered from: the host reports them against `span`
/// and the build for the module stops.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PerEnvError {
    #[error("Cannot find reference: {name} in perenv.macro")]
    UnknownReference { name: String, span: Span },

    #[error("It seems you're trying to use an identifier that already exists with perenv.macro: {name}")]
    DuplicateIdentifier { name: String, span: Span },

    #[error("Entry not found in loadPerEnvMap, {envar}:{value}")]
    EntryNotFound {
        envar: String,
        value: String,
        span: Span,
    },

    #[error("Unsupported argument shape in {callee}: {reason}")]
    InvalidArgument {
        callee: &'static str,
        reason: String,
        span: Span,
    },

    #[error("{callee} from perenv.macro must be called as a top-level statement or variable initializer")]
    UnsupportedCallSite { callee: String, span: Span },
}

impl PerEnvError {
    pub fn span(&self) -> Span {
        match self {
            PerEnvError::UnknownReference { span, .. }
            | PerEnvError::DuplicateIdentifier { span, .. }
            | PerEnvError::EntryNotFound { span, .. }
            | PerEnvError::InvalidArgument { span, .. }
            | PerEnvError::UnsupportedCallSite { span, .. } => *span,
        }
    }

    pub(crate) fn invalid(callee: &'static str, reason: impl Into<String>, span: Span) -> Self {
        PerEnvError::InvalidArgument {
            callee,
            reason: reason.into(),
            span,
        }
    }
}

pub type Result<T, E = PerEnvError> = std::result::Result<T, E>;
