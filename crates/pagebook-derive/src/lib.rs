//! Derive macros for pagebook.
//!
//! - [`PageObject`] - enumerate a struct's locator fields at compile time
//! - [`PageRepository`] - turn a struct of page types into a registry
//!
//! # Example
//!
//! ```ignore
//! use pagebook::{CompoundLocator, PageObject, PageRepository};
//!
//! #[derive(Default, PageObject)]
//! #[page(platform = "web")]
//! struct LoginPage {
//!     username: CompoundLocator,
//!     #[page(name = "submitButton")]
//!     submit: CompoundLocator,
//!     #[page(list)]
//!     errors: CompoundLocator,
//!     #[page(skip)]
//!     cached_title: String,
//! }
//!
//! #[derive(PageRepository)]
//! struct Pages {
//!     login_page: LoginPage,
//!     #[page(factory = checkout_page)]
//!     checkout: CheckoutPage,
//! }
//!
//! let registry = Pages::registry();
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr, Path,
};

/// Derive `pagebook::PageObject`.
///
/// # Attributes
///
/// Struct level:
/// - `#[page(name = "LoginPage")]` - page name (defaults to the type name)
/// - `#[page(platform = "mobile")]` - owning platform (defaults to web)
///
/// Field level:
/// - `#[page(list)]` - the field locates an element list
/// - `#[page(name = "submitButton")]` - field name used for lookup
/// - `#[page(skip)]` - not an element field
///
/// Fields must be convertible into `CompoundLocator` (`CompoundLocator`
/// itself or `Selector`) and `Clone`.
#[proc_macro_derive(PageObject, attributes(page))]
pub fn derive_page_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_page_object(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive `pagebook::PageRepository`.
///
/// Every field registers its type under the field name. Pages are built
/// with `Default` unless the field carries `#[page(factory = path)]`, where
/// `path` is a `Fn() -> Result<Page, E>`.
///
/// # Attributes
///
/// - `#[page(name = "key")]` - registry key (defaults to the field name)
/// - `#[page(factory = path::to::ctor)]` - fallible constructor
/// - `#[page(skip)]` - do not register
#[proc_macro_derive(PageRepository, attributes(page))]
pub fn derive_page_repository(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_page_repository(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[derive(Default)]
struct StructAttrs {
    name: Option<String>,
    platform: Option<(String, proc_macro2::Span)>,
}

#[derive(Default)]
struct FieldAttrs {
    name: Option<String>,
    list: bool,
    skip: bool,
    factory: Option<Path>,
}

fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut out = StructAttrs::default();
    for attr in attrs.iter().filter(|a| a.path().is_ident("page")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                out.name = Some(meta.value()?.parse::<LitStr>()?.value());
                Ok(())
            } else if meta.path.is_ident("platform") {
                let lit = meta.value()?.parse::<LitStr>()?;
                out.platform = Some((lit.value(), lit.span()));
                Ok(())
            } else {
                Err(meta.error("expected `name` or `platform`"))
            }
        })?;
    }
    Ok(out)
}

fn parse_field_attrs(field: &Field) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("page")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("list") {
                out.list = true;
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else if meta.path.is_ident("name") {
                out.name = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("factory") {
                out.factory = Some(meta.value()?.parse::<Path>()?);
            } else {
                return Err(meta.error("expected `list`, `skip`, `name` or `factory`"));
            }
            Ok(())
        })?;
    }
    Ok(out)
}

fn named_fields<'a>(input: &'a DeriveInput, derive: &str) -> syn::Result<Vec<&'a Field>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields.named.iter().collect()),
            Fields::Unit => Ok(Vec::new()),
            Fields::Unnamed(_) => Err(syn::Error::new_spanned(
                &input.ident,
                format!("{derive} requires a struct with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            &input.ident,
            format!("{derive} can only be derived for structs"),
        )),
    }
}

/// Map a platform tag onto the `Platform` variant it names
fn platform_variant(tag: &str) -> Option<&'static str> {
    match tag.trim().to_ascii_lowercase().as_str() {
        "web" | "browser" => Some("Web"),
        "mobile" | "android" | "ios" | "app" => Some("Mobile"),
        _ => None,
    }
}

fn field_ident(field: &Field) -> syn::Result<&Ident> {
    field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))
}

fn expand_page_object(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let attrs = parse_struct_attrs(&input.attrs)?;
    let page_name = attrs.name.unwrap_or_else(|| ident.to_string());

    let platform = match attrs.platform {
        None => quote! { ::pagebook::Platform::Web },
        Some((tag, span)) => {
            let variant = platform_variant(&tag).ok_or_else(|| {
                syn::Error::new(span, format!("unknown platform tag '{tag}'"))
            })?;
            let variant = Ident::new(variant, span);
            quote! { ::pagebook::Platform::#variant }
        }
    };

    let mut fields = Vec::new();
    for field in named_fields(input, "PageObject")? {
        let field_attrs = parse_field_attrs(field)?;
        if field_attrs.skip {
            continue;
        }
        if let Some(factory) = &field_attrs.factory {
            return Err(syn::Error::new_spanned(
                factory,
                "`factory` is only valid on PageRepository fields",
            ));
        }
        let member = field_ident(field)?;
        let name = field_attrs.name.unwrap_or_else(|| member.to_string());
        let ctor = if field_attrs.list {
            quote! { list }
        } else {
            quote! { element }
        };
        fields.push(quote! {
            ::pagebook::PageField::#ctor(
                #name,
                ::core::convert::Into::<::pagebook::CompoundLocator>::into(
                    ::core::clone::Clone::clone(&self.#member),
                ),
            )
        });
    }

    Ok(quote! {
        impl #impl_generics ::pagebook::PageObject for #ident #ty_generics #where_clause {
            fn page_name(&self) -> &str {
                #page_name
            }

            fn platform(&self) -> ::pagebook::Platform {
                #platform
            }

            fn fields(&self) -> ::std::vec::Vec<::pagebook::PageField> {
                ::std::vec![#(#fields),*]
            }
        }
    })
}

fn expand_page_repository(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut registrations = Vec::new();
    for field in named_fields(input, "PageRepository")? {
        let field_attrs = parse_field_attrs(field)?;
        if field_attrs.skip {
            continue;
        }
        if field_attrs.list {
            return Err(syn::Error::new_spanned(
                field,
                "`list` is only valid on PageObject fields",
            ));
        }
        let member = field_ident(field)?;
        let key = field_attrs.name.unwrap_or_else(|| member.to_string());
        let ty = &field.ty;
        registrations.push(match field_attrs.factory {
            Some(factory) => quote! {
                registry.register_with::<#ty, _, _>(#key, #factory);
            },
            None => quote! {
                registry.register_default::<#ty>(#key);
            },
        });
    }

    Ok(quote! {
        impl #impl_generics ::pagebook::PageRepository for #ident #ty_generics #where_clause {
            fn register_pages(registry: &mut ::pagebook::PageObjectRegistry) {
                #(#registrations)*
            }
        }
    })
}
