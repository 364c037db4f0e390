//! What a handler sees: the invocation and its bound arguments

use std::any::Any;
use std::sync::Arc;

use super::operation::CommandOperationContext;
use super::registered::RegisteredCommand;
use super::CommandManager;
use crate::contexts::ArgValue;
use crate::error::ArgsError;
use crate::help::CommandHelp;
use crate::issuer::{CommandIssuer, IssuerRef};
use crate::messages::{MessageKey, MessageType};

struct ArgEntry {
    name: String,
    value: Option<ArgValue>,
}

/// Values bound to a sub-command's parameters, in declaration order
///
/// Optional parameters left unbound are present with no value.
#[derive(Default)]
pub struct CommandArgs {
    entries: Vec<ArgEntry>,
}

impl CommandArgs {
    pub(crate) fn push(&mut self, name: &str, value: Option<ArgValue>) {
        self.entries.push(ArgEntry {
            name: name.to_string(),
            value,
        });
    }

    fn entry(&self, name: &str) -> Option<&ArgEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Bound value of `name`, if present and of type `T`
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.entry(name)?.value.as_ref()?.downcast_ref::<T>()
    }

    /// Bound value of `name`, or why it is not available
    pub fn value<T: Any>(&self, name: &str) -> Result<&T, ArgsError> {
        let value = self
            .entry(name)
            .and_then(|e| e.value.as_ref())
            .ok_or_else(|| ArgsError::Missing(name.to_string()))?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| ArgsError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Value of a switch flag; false when absent
    pub fn flag(&self, name: &str) -> bool {
        self.get::<bool>(name).copied().unwrap_or(false)
    }

    /// Value by declaration index
    pub fn at<T: Any>(&self, index: usize) -> Option<&T> {
        self.entries.get(index)?.value.as_ref()?.downcast_ref::<T>()
    }

    /// Move a value out
    pub fn take<T: Any>(&mut self, name: &str) -> Option<T> {
        let entry = self.entries.iter_mut().find(|e| e.name == name)?;
        if !entry.value.as_ref()?.is::<T>() {
            return None;
        }
        let value = entry.value.take()?;
        value.downcast::<T>().ok().map(|b| *b)
    }

    /// Whether `name` has a bound value
    pub fn is_present(&self, name: &str) -> bool {
        self.entry(name).is_some_and(|e| e.value.is_some())
    }

    /// The bound issuer, if the sub-command declares one
    pub fn issuer(&self) -> Option<&IssuerRef> {
        self.entries
            .iter()
            .find_map(|e| e.value.as_ref()?.downcast_ref::<IssuerRef>())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for CommandArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|e| (&e.name, e.value.is_some())))
            .finish()
    }
}

/// A running sub-command, as seen by its handler
pub struct CommandInvocation<'a> {
    pub(crate) manager: &'a CommandManager,
    pub(crate) command: &'a Arc<RegisteredCommand>,
    pub(crate) operation: &'a CommandOperationContext,
}

impl<'a> CommandInvocation<'a> {
    pub fn manager(&self) -> &'a CommandManager {
        self.manager
    }

    pub fn command(&self) -> &'a RegisteredCommand {
        self.command
    }

    pub fn issuer(&self) -> &'a IssuerRef {
        self.operation.issuer()
    }

    /// Root label as typed
    pub fn label(&self) -> &'a str {
        self.operation.label()
    }

    /// Raw argument tokens after the root label
    pub fn args(&self) -> &'a [String] {
        self.operation.args()
    }

    pub fn is_async(&self) -> bool {
        self.operation.is_async()
    }

    pub fn operation(&self) -> &'a CommandOperationContext {
        self.operation
    }

    /// Send plain text to the issuer
    pub fn reply(&self, message: &str) {
        self.manager.send_message(self.issuer().as_ref(), MessageType::Plain, message);
    }

    pub fn reply_info(&self, message: &str) {
        self.manager.send_message(self.issuer().as_ref(), MessageType::Info, message);
    }

    pub fn reply_error(&self, message: &str) {
        self.manager.send_message(self.issuer().as_ref(), MessageType::Error, message);
    }

    /// Send a catalog message with `<placeholder>` replacements
    pub fn send_key(&self, kind: MessageType, key: MessageKey, replacements: &[(&str, &str)]) {
        self.manager.send_key(self.issuer().as_ref(), kind, key, replacements);
    }

    /// Send the usage line of this sub-command
    pub fn show_syntax(&self) {
        self.manager.show_syntax(self.issuer().as_ref(), self.command);
    }

    /// Help for this command's root
    pub fn help(&self) -> CommandHelp {
        self.manager
            .generate_command_help(self.issuer(), self.command.root_name())
    }

    /// Check a comma separated permission string against the issuer
    pub fn has_permission(&self, permission: &str) -> bool {
        crate::permissions::has_permission(self.issuer().as_ref(), permission)
    }
}

/// Where a handler error happened, passed to exception handlers
pub struct ExceptionContext<'a> {
    pub manager: &'a CommandManager,
    pub command: &'a RegisteredCommand,
    pub issuer: &'a dyn CommandIssuer,
    pub args: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CommandArgs {
        let mut args = CommandArgs::default();
        args.push("name", Some(Box::new("bob".to_string())));
        args.push("count", Some(Box::new(3i32)));
        args.push("verbose", Some(Box::new(true)));
        args.push("page", None);
        args
    }

    #[test]
    fn test_typed_access() {
        let args = sample();
        assert_eq!(args.get::<String>("name").map(String::as_str), Some("bob"));
        assert_eq!(args.value::<i32>("count"), Ok(&3));
        assert_eq!(args.at::<i32>(1), Some(&3));
        assert!(args.flag("verbose"));
        assert!(!args.flag("quiet"));
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn test_access_errors() {
        let args = sample();
        assert_eq!(
            args.value::<i32>("page"),
            Err(ArgsError::Missing("page".to_string()))
        );
        assert!(matches!(
            args.value::<i64>("count"),
            Err(ArgsError::TypeMismatch { .. })
        ));
        assert!(!args.is_present("page"));
        assert!(args.is_present("name"));
    }

    #[test]
    fn test_take() {
        let mut args = sample();
        assert_eq!(args.take::<i64>("count"), None);
        assert_eq!(args.take::<i32>("count"), Some(3));
        assert_eq!(args.take::<i32>("count"), None);
        assert!(!args.is_present("count"));
    }
}
