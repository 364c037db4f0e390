//! Error types for registration, argument resolution and dispatch

use crate::messages::MessageKey;

/// Error returned by a command handler body
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by command handlers
pub type HandlerResult = Result<(), HandlerError>;

/// A user-facing argument failure raised by a context resolver, a condition
/// or a handler body.
///
/// Rendering is deferred to the manager so the message can be looked up in
/// the issuer's catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    /// Message looked up by key, with `<placeholder>` substitutions
    #[error("{key}")]
    Message {
        key: MessageKey,
        replacements: Vec<(String, String)>,
    },

    /// Literal message sent as-is
    #[error("{0}")]
    Literal(String),

    /// No message, show the command usage instead
    #[error("invalid command syntax")]
    Syntax,
}

impl ArgumentError {
    /// Create an error rendered from a catalog key
    pub fn new(key: MessageKey) -> Self {
        Self::Message {
            key,
            replacements: Vec::new(),
        }
    }

    /// Create an error with a literal message
    pub fn literal(message: impl Into<String>) -> Self {
        Self::Literal(message.into())
    }

    /// Create an error that shows the command syntax
    pub fn syntax() -> Self {
        Self::Syntax
    }

    /// Add a `<placeholder>` replacement. Ignored for non-keyed errors.
    pub fn with(mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Message { replacements, .. } = &mut self {
            replacements.push((placeholder.into(), value.into()));
        }
        self
    }

    /// Returns true if this error asks for the usage line instead of a message
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax)
    }
}

/// The single failure surfaced for one dispatch
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// A token could not be resolved to the parameter's type
    #[error("invalid argument{}: {source}", .parameter.as_deref().map(|p| format!(" for '{p}'")).unwrap_or_default())]
    InvalidArgument {
        /// Parameter being resolved, `None` when raised by the handler body
        parameter: Option<String>,
        #[source]
        source: ArgumentError,
    },

    /// The token cursor ran out before a required parameter
    #[error("missing required argument '{parameter}'")]
    MissingRequiredArgument { parameter: String },

    /// Tokens were left over after binding
    #[error("too many arguments ({extra} unconsumed)")]
    TooManyArguments { extra: usize },

    /// The issuer lacks one or more required permission nodes
    #[error("permission denied (requires {})", .required.join(","))]
    PermissionDenied { required: Vec<String> },

    /// No candidate exists for the input
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// The handler body failed
    #[error("command handler failed: {source}")]
    Handler {
        /// Whether an exception handler claimed the error
        handled: bool,
        #[source]
        source: HandlerError,
    },
}

/// Registration-time fatal errors
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// A parameter type has no resolver and no enum/array fallback
    #[error("parameter '{parameter}' ({type_name}) of '{command}' has no applicable context resolver")]
    UnresolvableType {
        command: String,
        parameter: String,
        type_name: &'static str,
    },

    /// The parameter list breaks a layout rule
    #[error("invalid parameter '{parameter}' of '{command}': {reason}")]
    InvalidParameter {
        command: String,
        parameter: String,
        reason: String,
    },

    /// A dependency was requested but never registered
    #[error("could not find a registered instance of {type_name} with key {key}")]
    UnresolvedDependency { type_name: &'static str, key: String },

    /// A dependency with the same type and key already exists
    #[error("there is already an instance of {type_name} with the key {key} registered")]
    DuplicateDependency { type_name: &'static str, key: String },

    /// A sub-command was declared without a handler
    #[error("sub-command '{command}' has no handler")]
    MissingHandler { command: String },

    /// The command group has no usable root label
    #[error("command group has an empty name")]
    EmptyName,
}

/// Errors from typed access to bound arguments inside a handler
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgsError {
    /// No value was bound under this name
    #[error("no value bound for argument '{0}'")]
    Missing(String),

    /// A value exists but has a different type
    #[error("argument '{name}' is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },
}

/// A panic caught while running a handler body
#[derive(Debug, Clone, thiserror::Error)]
#[error("handler panicked: {message}")]
pub struct HandlerPanic {
    pub message: String,
}

impl HandlerPanic {
    /// Build from a `catch_unwind` payload
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self { message }
    }
}
