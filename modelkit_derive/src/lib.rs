use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, parse_macro_input, spanned::Spanned};

/// Derive the `Model` trait for a named-field struct.
///
/// ```ignore
/// #[derive(Model, Default)]
/// #[model(table = "users")]
/// struct User {
///     id: Option<i64>,
///     name: String,
///     #[model(skip)]
///     dirty: bool,
/// }
/// ```
///
/// Struct-level options: `table = ".."` (required),
/// `primary_key = ".."` (defaults to `id`). Field-level: `skip`
/// excludes a field from the attribute surface.
#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_model(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct ModelOptions {
    table: Option<LitStr>,
    primary_key: Option<LitStr>,
}

fn parse_struct_options(input: &DeriveInput) -> syn::Result<ModelOptions> {
    let mut options = ModelOptions {
        table: None,
        primary_key: None,
    };

    for attr in &input.attrs {
        if !attr.path().is_ident("model") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                options.table = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("primary_key") {
                options.primary_key = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown #[model(..)] option; expected `table` or `primary_key`"))
            }
        })?;
    }

    Ok(options)
}

fn field_is_skipped(field: &syn::Field) -> syn::Result<bool> {
    let mut skipped = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("model") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skipped = true;
                Ok(())
            } else {
                Err(meta.error("unknown #[model(..)] field option; expected `skip`"))
            }
        })?;
    }
    Ok(skipped)
}

fn expand_model(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "#[derive(Model)] only supports structs",
        ));
    };

    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(
            input.span(),
            "#[derive(Model)] requires named fields",
        ));
    };

    let options = parse_struct_options(&input)?;
    let Some(table) = options.table else {
        return Err(syn::Error::new(
            input.span(),
            "#[derive(Model)] needs #[model(table = \"..\")]",
        ));
    };

    let mut names: Vec<String> = Vec::new();
    let mut idents: Vec<&Ident> = Vec::new();

    for field in &fields.named {
        if field_is_skipped(field)? {
            continue;
        }
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;
        names.push(ident.to_string());
        idents.push(ident);
    }

    if names.is_empty() {
        return Err(syn::Error::new(
            input.span(),
            "#[derive(Model)] needs at least one non-skipped field",
        ));
    }

    let primary_key = options.primary_key.map(|pk| {
        quote! {
            fn primary_key() -> &'static str {
                #pk
            }
        }
    });

    let get_arms = names.iter().zip(&idents).map(|(name, ident)| {
        quote! {
            #name => ::core::option::Option::Some(
                ::modelkit::core::Value::from(self.#ident.clone())
            ),
        }
    });

    let set_arms = names.iter().zip(&idents).map(|(name, ident)| {
        quote! {
            #name => {
                self.#ident = ::modelkit::core::FromValue::from_value(value)?;
                ::core::result::Result::Ok(())
            }
        }
    });

    Ok(quote! {
        impl ::modelkit::model::Model for #struct_name {
            fn table() -> &'static str {
                #table
            }

            #primary_key

            fn attribute_names() -> &'static [&'static str] {
                &[#(#names),*]
            }

            fn attribute(&self, name: &str) -> ::core::option::Option<::modelkit::core::Value> {
                match name {
                    #(#get_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set_attribute(
                &mut self,
                name: &str,
                value: ::modelkit::core::Value,
            ) -> ::modelkit::core::Result<()> {
                match name {
                    #(#set_arms)*
                    other => ::core::result::Result::Err(
                        ::modelkit::core::ModelError::UnknownAttribute(other.to_string())
                    ),
                }
            }
        }
    })
}
