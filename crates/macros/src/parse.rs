//! Attribute parsing for the CommandEnum derive macro

use darling::{FromDeriveInput, FromVariant};
use syn::{DeriveInput, Generics, Ident};

/// Parsed #[command_enum(...)] attributes on the enum
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(command_enum), supports(enum_unit))]
pub struct CommandEnumArgs {
    /// Enum identifier
    pub ident: Ident,

    pub generics: Generics,

    /// Unit variants
    pub data: darling::ast::Data<CommandEnumVariant, ()>,
}

/// Parsed #[command_enum(...)] attributes on a variant
#[derive(Debug, FromVariant)]
#[darling(attributes(command_enum))]
pub struct CommandEnumVariant {
    /// Variant identifier
    pub ident: Ident,

    /// Name matched against input instead of the identifier
    #[darling(default)]
    pub rename: Option<String>,
}

impl CommandEnumVariant {
    /// Name the value is matched and listed by
    pub fn declared_name(&self) -> String {
        self.rename.clone().unwrap_or_else(|| self.ident.to_string())
    }
}

/// Parse a DeriveInput into CommandEnumArgs
pub fn parse_command_enum(input: &DeriveInput) -> darling::Result<CommandEnumArgs> {
    CommandEnumArgs::from_derive_input(input)
}
