//! CommandEnum derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{parse_command_enum, CommandEnumArgs};

/// Generate the CommandEnum implementation
pub fn derive_command_enum(input: DeriveInput) -> TokenStream {
    match parse_command_enum(&input) {
        Ok(args) => generate_impl(args),
        Err(e) => e.write_errors(),
    }
}

fn generate_impl(args: CommandEnumArgs) -> TokenStream {
    let enum_name = &args.ident;
    let (impl_generics, ty_generics, where_clause) = args.generics.split_for_impl();

    let variants = match &args.data {
        darling::ast::Data::Enum(variants) => variants,
        darling::ast::Data::Struct(_) => {
            return syn::Error::new_spanned(enum_name, "CommandEnum can only be derived for enums")
                .to_compile_error();
        }
    };

    let names: Vec<String> = variants.iter().map(|v| v.declared_name()).collect();
    if let Some(index) = first_duplicate(&names) {
        return syn::Error::new_spanned(
            &variants[index].ident,
            format!("duplicate command enum name '{}'", names[index]),
        )
        .to_compile_error();
    }

    let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
    let indices: Vec<usize> = (0..variants.len()).collect();

    quote! {
        impl #impl_generics ::acf_core::contexts::CommandEnum for #enum_name #ty_generics #where_clause {
            const VARIANTS: &'static [&'static str] = &[#(#names),*];

            fn from_index(index: usize) -> ::core::option::Option<Self> {
                match index {
                    #(#indices => ::core::option::Option::Some(Self::#idents),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn index(&self) -> usize {
                match *self {
                    #(Self::#idents => #indices,)*
                }
            }
        }
    }
}

/// Input is matched with punctuation stripped and case folded, so names
/// must stay distinct under the same folding
fn simplify(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Index of the first name that collides with an earlier one
fn first_duplicate(names: &[String]) -> Option<usize> {
    let mut seen = std::collections::HashSet::new();
    names.iter().position(|name| !seen.insert(simplify(name)))
}
