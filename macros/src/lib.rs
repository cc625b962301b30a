//! Derive macros for the tasklist reducer architecture
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Generates classification helpers for action enums
//!
//! # Example
//!
//! ```ignore
//! use tasklist_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[command]
//!     AddTodo { text: String },
//!
//!     #[event]
//!     #[persist]
//!     TodoAdded { id: String, text: String },
//!
//!     #[event]
//!     FilterChanged { filter: String },
//! }
//!
//! // Generated methods:
//! assert!(TodoAction::AddTodo { text: "test".into() }.is_command());
//! assert!(TodoAction::TodoAdded { id: "1".into(), text: "test".into() }.persists());
//! assert!(!TodoAction::FilterChanged { filter: "all".into() }.persists());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, Variant, parse_macro_input};

/// Derive macro for Action enums
///
/// Generates helper methods for action enums:
/// - `is_command()` - Returns true if this variant is a command
/// - `is_event()` - Returns true if this variant is an event
/// - `persists()` - Returns true if this event changes persisted data
/// - `event_type()` - Returns the versioned event type name, `"unknown"` for non-events
/// - `name()` - Returns the variant name, for logging
///
/// # Attributes
///
/// - `#[command]` - Mark a variant as a command
/// - `#[event]` - Mark a variant as an event
/// - `#[persist]` - Mark an event whose application must be followed by a save
///
/// # Errors
///
/// Produces a compile error (not a runtime panic) if:
/// - Applied to a non-enum type
/// - A variant has both `#[command]` and `#[event]`
/// - `#[persist]` is used on a variant that is not an `#[event]`
#[proc_macro_derive(Action, attributes(command, event, persist))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_action(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// How a single variant was annotated
struct Classified<'a> {
    variant: &'a Variant,
    command: bool,
    event: bool,
    persist: bool,
}

impl Classified<'_> {
    fn parse(variant: &Variant) -> syn::Result<Classified<'_>> {
        let command = has_attribute(&variant.attrs, "command");
        let event = has_attribute(&variant.attrs, "event");
        let persist = has_attribute(&variant.attrs, "persist");

        if command && event {
            return Err(syn::Error::new_spanned(
                variant,
                "Variant cannot be both #[command] and #[event]",
            ));
        }
        if persist && !event {
            return Err(syn::Error::new_spanned(
                variant,
                "#[persist] is only allowed on #[event] variants",
            ));
        }

        Ok(Classified {
            variant,
            command,
            event,
            persist,
        })
    }

    /// Pattern matching this variant regardless of its field shape
    fn pattern(&self) -> TokenStream2 {
        let ident = &self.variant.ident;
        match &self.variant.fields {
            Fields::Named(_) => quote! { Self::#ident { .. } },
            Fields::Unnamed(_) => quote! { Self::#ident(..) },
            Fields::Unit => quote! { Self::#ident },
        }
    }
}

fn expand_action(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Action)] can only be used on enums",
        ));
    };

    let variants = data_enum
        .variants
        .iter()
        .map(Classified::parse)
        .collect::<syn::Result<Vec<_>>>()?;

    let is_command_arms = flag_arms(&variants, |v| v.command);
    let is_event_arms = flag_arms(&variants, |v| v.event);
    let persists_arms = flag_arms(&variants, |v| v.persist);

    let event_type_arms = variants.iter().filter(|v| v.event).map(|v| {
        let pattern = v.pattern();
        let type_name = format!("{}.v1", v.variant.ident);
        quote! { #pattern => #type_name, }
    });

    let name_arms = variants.iter().map(|v| {
        let pattern = v.pattern();
        let variant_name = v.variant.ident.to_string();
        quote! { #pattern => #variant_name, }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Returns true if this action is a command
            #[must_use]
            pub const fn is_command(&self) -> bool {
                match self {
                    #(#is_command_arms)*
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }

            /// Returns true if this action is an event
            #[must_use]
            pub const fn is_event(&self) -> bool {
                match self {
                    #(#is_event_arms)*
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }

            /// Returns true if applying this event changes persisted data
            #[must_use]
            pub const fn persists(&self) -> bool {
                match self {
                    #(#persists_arms)*
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }

            /// Returns the event type name for serialization
            ///
            /// Only events have type names. Commands return "unknown".
            #[must_use]
            pub const fn event_type(&self) -> &'static str {
                match self {
                    #(#event_type_arms)*
                    #[allow(unreachable_patterns)]
                    _ => "unknown",
                }
            }

            /// Returns the variant name
            #[must_use]
            pub const fn name(&self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }
    })
}

/// `pattern => true` arms for every variant selected by `flag`
fn flag_arms<'a>(
    variants: &'a [Classified<'a>],
    flag: impl Fn(&Classified<'_>) -> bool + 'a,
) -> impl Iterator<Item = TokenStream2> + 'a {
    variants.iter().filter(move |v| flag(v)).map(|v| {
        let pattern = v.pattern();
        quote! { #pattern => true, }
    })
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

