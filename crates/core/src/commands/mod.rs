//! Command registration, routing and dispatch
//!
//! # Architecture
//!
//! ```text
//! command line → CommandManager::dispatch → route (root table) → bind (resolvers)
//!              → conditions → handler → exception handlers
//! ```
//!
//! A plugin describes a root label and its sub-commands as a [`CommandGroup`]
//! and hands it to [`CommandManager::register_command`]. Several groups may
//! share a root; their sub-commands are merged into one [`RootCommand`] table.
//!
//! # Example
//!
//! ```ignore
//! use acf_core::commands::{CommandGroup, CommandManager, ParameterSpec, SubcommandSpec};
//!
//! let manager = CommandManager::new();
//! manager.register_command(
//!     CommandGroup::new("ping").subcommand(
//!         SubcommandSpec::default_command()
//!             .param(ParameterSpec::string("message").optional())
//!             .handler(|inv, args| {
//!                 let reply = args.get::<String>("message").map_or("Pong!", String::as_str);
//!                 inv.reply(reply);
//!                 Ok(())
//!             }),
//!     ),
//! )?;
//! manager.dispatch(&issuer, "ping")?;
//! ```

mod binding;
mod completion;
mod conditions;
mod dependencies;
mod execution;
mod group;
mod invocation;
mod manager;
mod operation;
mod parameter;
mod registered;
mod replacements;
mod root;
mod router;

pub use completion::{CommandCompletions, CompletionContext, CompletionFn};
pub use conditions::{parse_conditions, CommandConditions, ConditionContext};
pub use dependencies::Dependencies;
pub use execution::{CommandExecutionContext, FlagSet};
pub use group::{
    CommandGroup, CommandHandler, ExceptionHandler, ParameterSpec, SubcommandKind, SubcommandSpec,
};
pub use invocation::{CommandArgs, CommandInvocation, ExceptionContext};
pub use manager::CommandManager;
pub use operation::{
    current_issuer, current_operation, operation_depth, push_operation, CommandOperationContext,
    OperationGuard,
};
pub use parameter::{CommandParameter, FlagKind, ParamFlags};
pub use registered::{CommandKey, GroupKey, RegisteredCommand};
pub use replacements::CommandReplacements;
pub use root::{RootCommand, CATCH_UNKNOWN_LABEL, DEFAULT_LABEL};
