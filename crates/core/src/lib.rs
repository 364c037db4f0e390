//! ACF core - Annotation-free command framework
//!
//! Routes text command lines from an issuer (player, console, ...) to typed
//! handlers. Each root label owns a table of sub-commands; dispatch picks the
//! candidates for the input, binds tokens to parameters through the context
//! resolver registry and runs the first candidate that binds.
//!
//! # Modules
//!
//! - [`commands`] - registration, routing, binding and dispatch
//! - [`contexts`] - type-keyed context resolvers
//! - [`help`] - paginated, searchable help
//! - [`messages`] - message keys, catalog and rendering
//! - [`config`] - TOML-backed settings
//! - [`tasks`] - primary thread queue and async dispatch

// Allow the crate to refer to itself as `acf_core` for proc macro compatibility
extern crate self as acf_core;

pub mod commands;
pub mod config;
pub mod contexts;
pub mod error;
pub mod help;
pub mod issuer;
pub mod messages;
pub mod permissions;
pub mod tasks;
pub mod util;

// Re-export commonly used items
pub use commands::{
    current_issuer, current_operation, CommandArgs, CommandGroup, CommandInvocation, CommandKey,
    CommandManager, ExceptionContext, GroupKey, ParameterSpec, SubcommandSpec,
};
pub use config::{ConfigError, ConfigResult, ManagerConfig, TomlConfig};
pub use contexts::{ArgType, CommandContexts, CommandEnum, ContextResolver};
pub use error::{
    ArgsError, ArgumentError, CommandError, HandlerError, HandlerPanic, HandlerResult,
    RegistrationError,
};
pub use help::{CommandHelp, CommandHelpFormatter};
pub use issuer::{CommandIssuer, IssuerRef};
pub use messages::{MessageKey, MessageProvider, MessageType, Messages};
pub use tasks::{AsyncDispatcher, QueuedIssuer, TaskQueue};

// Re-export macros
pub use acf_macros::CommandEnum;
