//! ACF Proc Macros
//!
//! - `#[derive(CommandEnum)]` - Give a unit enum the declared value set used
//!   to resolve enum-typed command parameters
//!
//! # Example
//!
//! ```ignore
//! use acf_core::CommandEnum;
//!
//! #[derive(Debug, Clone, Copy, CommandEnum)]
//! enum GameMode {
//!     Survival,
//!     Creative,
//!     #[command_enum(rename = "spectator")]
//!     Spectate,
//! }
//!
//! // Generated:
//! // - GameMode::VARIANTS == ["Survival", "Creative", "spectator"]
//! // - GameMode::from_index(1) == Some(GameMode::Creative)
//! // - GameMode::Spectate.index() == 2
//! ```
//!
//! # Attributes
//!
//! - `#[command_enum(rename = "name")]` - Match and list the variant as `name`.

mod command_enum;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro for enum-typed command parameters
///
/// Implements `acf_core::contexts::CommandEnum` for an enum whose variants
/// all carry no data. Input is matched against the declared names
/// case-insensitively, ignoring anything that is not a letter or digit.
///
/// # Generated Code
///
/// - `const VARIANTS` - declared names in declaration order
/// - `fn from_index(usize) -> Option<Self>`
/// - `fn index(&self) -> usize`
#[proc_macro_derive(CommandEnum, attributes(command_enum))]
pub fn derive_command_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    command_enum::derive_command_enum(input).into()
}
