//! Context resolver registry
//!
//! Maps a parameter's type to the function that turns input tokens (and the
//! issuer) into a value of that type. Lookups are exact by [`TypeId`]; when a
//! type has no resolver of its own, enum types get a name-matching resolver
//! and array types a comma-splitting collector built from their element's
//! resolver.
//!
//! # Example
//!
//! ```ignore
//! manager.contexts().register_context::<Money, _>(|ctx| {
//!     let token = ctx.pop_first_arg().ok_or_else(ArgumentError::syntax)?;
//!     Money::parse(&token).ok_or_else(|| ArgumentError::literal("Not an amount"))
//! });
//! ```

mod builtin;
mod enums;

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

pub use enums::CommandEnum;

use crate::commands::CommandExecutionContext;
use crate::error::ArgumentError;
use crate::messages::MessageKey;

/// A resolved, type-erased argument value
pub type ArgValue = Box<dyn Any + Send + Sync>;

/// Type-erased resolver function
pub type ResolverFn =
    dyn Fn(&mut CommandExecutionContext<'_>) -> Result<ArgValue, ArgumentError> + Send + Sync;

/// Collects resolved array elements into the final container value
pub type CollectFn = fn(Vec<ArgValue>) -> Option<ArgValue>;

/// Declared value set of an enum type
#[derive(Clone, Copy)]
pub struct EnumInfo {
    /// Value names in declaration order
    pub variants: &'static [&'static str],
    /// Builds the value at a declaration index
    pub construct: fn(usize) -> Option<ArgValue>,
}

/// Structural shape of an [`ArgType`], used for fallback resolution
#[derive(Clone)]
pub enum ArgShape {
    Plain,
    Enum(EnumInfo),
    Array {
        element: Box<ArgType>,
        collect: CollectFn,
    },
}

/// Semantic type tag of a parameter
#[derive(Clone)]
pub struct ArgType {
    id: TypeId,
    name: &'static str,
    shape: ArgShape,
}

impl ArgType {
    /// Tag for a plain type
    pub fn of<T: Any + Send + Sync>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            shape: ArgShape::Plain,
        }
    }

    /// Tag for an enum with a declared value set
    pub fn enumeration<E: CommandEnum>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
            shape: ArgShape::Enum(enums::enum_info::<E>()),
        }
    }

    /// Tag for `Vec<T>` of a plain element type
    pub fn array<T: Any + Send + Sync>() -> Self {
        Self::array_of::<T>(Self::of::<T>())
    }

    /// Tag for `Vec<E>` of an enum element type
    pub fn enum_array<E: CommandEnum>() -> Self {
        Self::array_of::<E>(Self::enumeration::<E>())
    }

    fn array_of<T: Any + Send + Sync>(element: ArgType) -> Self {
        Self {
            id: TypeId::of::<Vec<T>>(),
            name: std::any::type_name::<Vec<T>>(),
            shape: ArgShape::Array {
                element: Box::new(element),
                collect: collect_vec::<T>,
            },
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> &ArgShape {
        &self.shape
    }

    /// Check if this tag is for `T`
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Declared value names for enum tags
    pub fn enum_values(&self) -> Option<&'static [&'static str]> {
        match &self.shape {
            ArgShape::Enum(info) => Some(info.variants),
            _ => None,
        }
    }
}

impl fmt::Debug for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArgType").field(&self.name).finish()
    }
}

impl PartialEq for ArgType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

fn collect_vec<T: Any + Send + Sync>(items: Vec<ArgValue>) -> Option<ArgValue> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        out.push(*item.downcast::<T>().ok()?);
    }
    Some(Box::new(out))
}

/// What a resolver needs from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    /// Pops one or more tokens
    Token,
    /// May look at the issuer and pop a token only if it wants to
    IssuerAware,
    /// Never touches the tokens
    IssuerOnly,
}

/// A registered resolver and its capability kind
#[derive(Clone)]
pub struct ContextResolver {
    kind: ResolverKind,
    func: Arc<ResolverFn>,
}

impl ContextResolver {
    /// Wrap an already type-erased function
    pub fn raw(kind: ResolverKind, func: Arc<ResolverFn>) -> Self {
        Self { kind, func }
    }

    fn typed<T, F>(kind: ResolverKind, f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut CommandExecutionContext<'_>) -> Result<T, ArgumentError> + Send + Sync + 'static,
    {
        let func: Arc<ResolverFn> = Arc::new(move |ctx: &mut CommandExecutionContext<'_>| {
            f(ctx).map(|value| Box::new(value) as ArgValue)
        });
        Self { kind, func }
    }

    /// Resolver that consumes input tokens
    pub fn token<T, F>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut CommandExecutionContext<'_>) -> Result<T, ArgumentError> + Send + Sync + 'static,
    {
        Self::typed(ResolverKind::Token, f)
    }

    /// Resolver that does not require input
    pub fn issuer_aware<T, F>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut CommandExecutionContext<'_>) -> Result<T, ArgumentError> + Send + Sync + 'static,
    {
        Self::typed(ResolverKind::IssuerAware, f)
    }

    /// Resolver that works from issuer state alone
    pub fn issuer_only<T, F>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&mut CommandExecutionContext<'_>) -> Result<T, ArgumentError> + Send + Sync + 'static,
    {
        Self::typed(ResolverKind::IssuerOnly, f)
    }

    pub fn kind(&self) -> ResolverKind {
        self.kind
    }

    /// Issuer-aware and issuer-only resolvers make their parameter optional
    pub fn is_optional_resolver(&self) -> bool {
        self.kind != ResolverKind::Token
    }

    pub fn resolve(&self, ctx: &mut CommandExecutionContext<'_>) -> Result<ArgValue, ArgumentError> {
        (self.func)(ctx)
    }
}

impl fmt::Debug for ContextResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextResolver")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Per-manager resolver registry
pub struct CommandContexts {
    resolvers: DashMap<TypeId, ContextResolver>,
}

impl Default for CommandContexts {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandContexts {
    /// Registry pre-populated with the built-in resolvers
    pub fn new() -> Self {
        let contexts = Self::empty();
        builtin::register_defaults(&contexts);
        contexts
    }

    /// Registry with no resolvers at all
    pub fn empty() -> Self {
        Self {
            resolvers: DashMap::new(),
        }
    }

    /// Register a token-consuming resolver for `T`
    pub fn register_context<T, F>(&self, f: F)
    where
        T: Any + Send + Sync,
        F: Fn(&mut CommandExecutionContext<'_>) -> Result<T, ArgumentError> + Send + Sync + 'static,
    {
        self.register_resolver::<T>(ContextResolver::token(f));
    }

    /// Register an issuer-aware resolver for `T`
    pub fn register_issuer_aware_context<T, F>(&self, f: F)
    where
        T: Any + Send + Sync,
        F: Fn(&mut CommandExecutionContext<'_>) -> Result<T, ArgumentError> + Send + Sync + 'static,
    {
        self.register_resolver::<T>(ContextResolver::issuer_aware(f));
    }

    /// Register an issuer-only resolver for `T`
    pub fn register_issuer_only_context<T, F>(&self, f: F)
    where
        T: Any + Send + Sync,
        F: Fn(&mut CommandExecutionContext<'_>) -> Result<T, ArgumentError> + Send + Sync + 'static,
    {
        self.register_resolver::<T>(ContextResolver::issuer_only(f));
    }

    /// Store a resolver for `T`. The last registration for a type wins.
    pub fn register_resolver<T: Any>(&self, resolver: ContextResolver) {
        self.register_resolver_by_id(TypeId::of::<T>(), std::any::type_name::<T>(), resolver);
    }

    fn register_resolver_by_id(&self, id: TypeId, name: &'static str, resolver: ContextResolver) {
        if self.resolvers.insert(id, resolver).is_some() {
            debug!("Replaced context resolver for {}", name);
        }
    }

    /// Find the resolver for a parameter type.
    ///
    /// Falls back to a synthesized resolver for enum and array tags.
    pub fn get_resolver(&self, ty: &ArgType) -> Option<ContextResolver> {
        if let Some(resolver) = self.resolvers.get(&ty.type_id()) {
            return Some(resolver.clone());
        }

        match ty.shape() {
            ArgShape::Plain => None,
            ArgShape::Enum(info) => Some(enums::enum_resolver(*info)),
            ArgShape::Array { element, collect } => {
                let element = self.get_resolver(element)?;
                Some(array_resolver(element, *collect))
            }
        }
    }

    pub fn has_resolver<T: Any>(&self) -> bool {
        self.resolvers.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

fn array_resolver(element: ContextResolver, collect: CollectFn) -> ContextResolver {
    let func: Arc<ResolverFn> = Arc::new(move |ctx: &mut CommandExecutionContext<'_>| {
        let token = ctx.pop_first_arg().ok_or_else(ArgumentError::syntax)?;
        let mut items = Vec::new();
        for piece in token.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            ctx.push_front_arg(piece.to_string());
            let before = ctx.remaining();
            let value = element.resolve(ctx)?;
            if ctx.remaining() == before {
                ctx.pop_first_arg();
            }
            items.push(value);
        }
        collect(items).ok_or_else(|| ArgumentError::new(MessageKey::ErrorPerformingCommand))
    });
    ContextResolver::raw(ResolverKind::Token, func)
}
