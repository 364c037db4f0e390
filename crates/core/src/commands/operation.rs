//! Thread-local stack of running invocations
//!
//! Pushed right before a handler runs and popped when the returned guard
//! drops, so nested dispatches (a handler running another command) always
//! see their own entry on top, including while unwinding.

use std::cell::RefCell;
use std::fmt;

use super::registered::CommandKey;
use crate::issuer::IssuerRef;

/// One running invocation
#[derive(Clone)]
pub struct CommandOperationContext {
    issuer: IssuerRef,
    label: String,
    args: Vec<String>,
    command: CommandKey,
    is_async: bool,
}

impl CommandOperationContext {
    pub(crate) fn new(
        issuer: IssuerRef,
        label: &str,
        args: &[String],
        command: CommandKey,
        is_async: bool,
    ) -> Self {
        Self {
            issuer,
            label: label.to_string(),
            args: args.to_vec(),
            command,
            is_async,
        }
    }

    pub fn issuer(&self) -> &IssuerRef {
        &self.issuer
    }

    /// Root label as typed
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn command(&self) -> CommandKey {
        self.command
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }
}

impl fmt::Debug for CommandOperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandOperationContext")
            .field("issuer", &self.issuer.unique_id())
            .field("label", &self.label)
            .field("args", &self.args)
            .field("command", &self.command)
            .field("is_async", &self.is_async)
            .finish()
    }
}

thread_local! {
    static OPERATIONS: RefCell<Vec<CommandOperationContext>> = const { RefCell::new(Vec::new()) };
}

/// Pops its operation on drop
#[must_use = "the operation is popped as soon as the guard drops"]
pub struct OperationGuard {
    depth: usize,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        OPERATIONS.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.len() != self.depth {
                tracing::warn!(
                    "Operation stack depth {} does not match guard depth {}",
                    stack.len(),
                    self.depth
                );
            }
            stack.truncate(self.depth.saturating_sub(1));
        });
    }
}

/// Push an operation for the current thread
pub fn push_operation(operation: CommandOperationContext) -> OperationGuard {
    let depth = OPERATIONS.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.push(operation);
        stack.len()
    });
    OperationGuard { depth }
}

/// Innermost running invocation on this thread
pub fn current_operation() -> Option<CommandOperationContext> {
    OPERATIONS.with(|stack| stack.borrow().last().cloned())
}

/// Issuer of the innermost running invocation
pub fn current_issuer() -> Option<IssuerRef> {
    OPERATIONS.with(|stack| stack.borrow().last().map(|op| op.issuer.clone()))
}

/// Number of nested invocations on this thread
pub fn operation_depth() -> usize {
    OPERATIONS.with(|stack| stack.borrow().len())
}
