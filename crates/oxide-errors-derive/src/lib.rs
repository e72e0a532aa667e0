//! Derive macro for model nodes that receive validation errors.
//!
//! This crate provides `#[derive(ErrorsConsumer)]`, which implements
//! `oxide_errors::ErrorsConsumer` from a struct definition so the set of
//! attributes a node declares is fixed at compile time.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, GenericArgument, Ident, Lit,
    PathArguments, Type,
};

/// Derives `ErrorsConsumer` for a struct with named fields.
///
/// Every named field is a declared attribute, so a response message for it
/// binds onto the struct's store.
///
/// # Attributes
///
/// - `#[errors(root = "name")]` - Default root segment of diagnostic paths
///   (optional, defaults to the struct name with a lowercase first letter)
/// - `#[errors(container = "field")]` - Redirects every message addressed
///   to this node to the singular association `field`
///
/// # Field Attributes
///
/// - `#[errors(store)]` - The `Errors` field holding this node's messages
///   (optional when the field is named `errors`)
/// - `#[errors(has_one)]` - Singular association; the field may be `T`,
///   `Box<T>`, `Option<T>` or `Option<Box<T>>`
/// - `#[errors(has_many)]` - Collection association; the field may be
///   `Vec<T>` or `Vec<Box<T>>`
/// - `#[errors(rename = "wire_name")]` - Attribute name used on the wire
/// - `#[errors(skip)]` - Not a declared attribute
///
/// # Generated Items
///
/// - `impl ErrorsConsumer for Struct`
/// - `Struct::ERROR_ATTRIBUTES`, the declared attribute names in field order
#[proc_macro_derive(ErrorsConsumer, attributes(errors))]
pub fn derive_errors_consumer(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_errors_consumer_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_errors_consumer_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let node_attrs = parse_node_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "ErrorsConsumer derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "ErrorsConsumer derive only supports structs",
            ));
        }
    };

    let mut store_field: Option<Ident> = None;
    let mut field_infos: Vec<FieldInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            continue;
        };
        let attrs = parse_field_attrs(&field.attrs)?;

        if attrs.store {
            if store_field.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field may be marked #[errors(store)]",
                ));
            }
            store_field = Some(field_name);
            continue;
        }

        let kind = match (attrs.has_one, attrs.has_many) {
            (true, true) => {
                return Err(syn::Error::new_spanned(
                    field,
                    "a field cannot be both has_one and has_many",
                ));
            }
            (true, false) => FieldKind::One(one_shape(&field.ty)),
            (false, true) => FieldKind::Many(many_shape(&field.ty).ok_or_else(|| {
                syn::Error::new_spanned(&field.ty, "has_many fields must be Vec<T> or Vec<Box<T>>")
            })?),
            (false, false) => FieldKind::Plain,
        };

        field_infos.push(FieldInfo {
            attr_name: attrs
                .rename
                .unwrap_or_else(|| field_name.unraw().to_string()),
            field_name,
            kind,
            skip: attrs.skip,
        });
    }

    // Fall back to a field literally named `errors`.
    let store_field = match store_field {
        Some(name) => name,
        None => {
            let position = field_infos
                .iter()
                .position(|f| f.field_name == "errors")
                .ok_or_else(|| {
                    syn::Error::new_spanned(
                        input,
                        "ErrorsConsumer derive needs an `errors` field or #[errors(store)]",
                    )
                })?;
            field_infos.remove(position).field_name
        }
    };

    let attribute_names: Vec<&str> = field_infos
        .iter()
        .filter(|f| !f.skip)
        .map(|f| f.attr_name.as_str())
        .collect();

    let association_arms: Vec<TokenStream2> = field_infos
        .iter()
        .filter(|f| !f.skip)
        .filter_map(|f| association_arm(f).map(|accessor| (f, accessor)))
        .map(|(f, accessor)| {
            let attr_name = &f.attr_name;
            quote! { #attr_name => #accessor, }
        })
        .collect();

    let container_impl = match &node_attrs.container {
        Some(container) => {
            let info = field_infos
                .iter()
                .find(|f| f.field_name == container.as_str())
                .ok_or_else(|| {
                    syn::Error::new_spanned(
                        input,
                        format!("container `{container}` is not a field of this struct"),
                    )
                })?;
            let field_name = &info.field_name;
            let target = match info.kind {
                FieldKind::One(OneShape::Plain) => quote! { &mut self.#field_name },
                FieldKind::One(OneShape::Boxed) => quote! { &mut *self.#field_name },
                _ => {
                    return Err(syn::Error::new_spanned(
                        input,
                        format!(
                            "container `{container}` must be a has_one field of type T or Box<T>"
                        ),
                    ));
                }
            };
            quote! {
                fn error_container_for(
                    &mut self,
                    _attr: &str,
                ) -> &mut dyn ::oxide_errors::ErrorsConsumer {
                    #target
                }
            }
        }
        None => quote! {},
    };

    let root_path = node_attrs
        .root
        .unwrap_or_else(|| lowercase_first(&struct_name.unraw().to_string()));

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics #struct_name #ty_generics #where_clause {
            /// Attribute names this node declares, in field order.
            pub const ERROR_ATTRIBUTES: &'static [&'static str] = &[#(#attribute_names),*];
        }

        impl #impl_generics ::oxide_errors::ErrorsConsumer
            for #struct_name #ty_generics #where_clause
        {
            fn errors(&self) -> &::oxide_errors::Errors {
                &self.#store_field
            }

            fn errors_mut(&mut self) -> &mut ::oxide_errors::Errors {
                &mut self.#store_field
            }

            fn has_attribute(&self, name: &str) -> bool {
                Self::ERROR_ATTRIBUTES.contains(&name)
            }

            #[allow(clippy::match_single_binding)]
            fn association(
                &mut self,
                name: &str,
            ) -> ::core::option::Option<::oxide_errors::Association<'_>> {
                match name {
                    #(#association_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            #container_impl

            fn root_path(&self) -> ::std::string::String {
                ::std::string::String::from(#root_path)
            }
        }
    };

    Ok(expanded)
}

struct FieldInfo {
    field_name: Ident,
    attr_name: String,
    kind: FieldKind,
    skip: bool,
}

enum FieldKind {
    Plain,
    One(OneShape),
    Many(ManyShape),
}

enum OneShape {
    Plain,
    Boxed,
    Optional,
    OptionalBoxed,
}

enum ManyShape {
    Plain,
    Boxed,
}

#[derive(Default)]
struct NodeAttrs {
    root: Option<String>,
    container: Option<String>,
}

#[derive(Default)]
struct FieldAttrs {
    store: bool,
    has_one: bool,
    has_many: bool,
    skip: bool,
    rename: Option<String>,
}

fn association_arm(info: &FieldInfo) -> Option<TokenStream2> {
    let field_name = &info.field_name;
    let accessor = match &info.kind {
        FieldKind::Plain => return None,
        FieldKind::One(OneShape::Plain) => quote! {
            ::core::option::Option::Some(::oxide_errors::Association::One(&mut self.#field_name))
        },
        FieldKind::One(OneShape::Boxed) => quote! {
            ::core::option::Option::Some(::oxide_errors::Association::One(&mut *self.#field_name))
        },
        FieldKind::One(OneShape::Optional) => quote! {
            self.#field_name
                .as_mut()
                .map(|child| ::oxide_errors::Association::One(child))
        },
        FieldKind::One(OneShape::OptionalBoxed) => quote! {
            self.#field_name
                .as_deref_mut()
                .map(|child| ::oxide_errors::Association::One(child))
        },
        FieldKind::Many(ManyShape::Plain) => quote! {
            ::core::option::Option::Some(::oxide_errors::Association::Many(
                self.#field_name
                    .iter_mut()
                    .map(|child| child as &mut dyn ::oxide_errors::ErrorsConsumer)
                    .collect(),
            ))
        },
        FieldKind::Many(ManyShape::Boxed) => quote! {
            ::core::option::Option::Some(::oxide_errors::Association::Many(
                self.#field_name
                    .iter_mut()
                    .map(|child| &mut **child as &mut dyn ::oxide_errors::ErrorsConsumer)
                    .collect(),
            ))
        },
    };
    Some(accessor)
}

/// Returns the single generic argument of `ty` if its last path segment is `wrapper`.
fn unwrap_type<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn one_shape(ty: &Type) -> OneShape {
    if let Some(inner) = unwrap_type(ty, "Option") {
        if unwrap_type(inner, "Box").is_some() {
            OneShape::OptionalBoxed
        } else {
            OneShape::Optional
        }
    } else if unwrap_type(ty, "Box").is_some() {
        OneShape::Boxed
    } else {
        OneShape::Plain
    }
}

fn many_shape(ty: &Type) -> Option<ManyShape> {
    let inner = unwrap_type(ty, "Vec")?;
    if unwrap_type(inner, "Box").is_some() {
        Some(ManyShape::Boxed)
    } else {
        Some(ManyShape::Plain)
    }
}

fn parse_string(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = &value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(value, "expected a string literal"))
}

fn parse_node_attrs(attrs: &[Attribute]) -> syn::Result<NodeAttrs> {
    let mut result = NodeAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("errors") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("root") {
                    result.root = Some(parse_string(&meta)?);
                } else if meta.path.is_ident("container") {
                    result.container = Some(parse_string(&meta)?);
                } else {
                    return Err(meta.error("unsupported errors attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("errors") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("store") {
                    result.store = true;
                } else if meta.path.is_ident("has_one") {
                    result.has_one = true;
                } else if meta.path.is_ident("has_many") {
                    result.has_many = true;
                } else if meta.path.is_ident("skip") {
                    result.skip = true;
                } else if meta.path.is_ident("rename") {
                    result.rename = Some(parse_string(&meta)?);
                } else {
                    return Err(meta.error("unsupported errors field attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}
