use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, LitStr, Path, Visibility};

/// Derive macro for the `conv` runtime type model.
///
/// Generates `conv::reflect::Reflect` and `conv::reflect::Typed` for a structure with
/// named fields. The structure must also implement `Default` and `Clone`.
///
/// Field attributes:
///
/// - `#[tag(key = "value", ...)]` - free-form tags; `conv` and `json` name the field,
///   `format` gives a time format
/// - `#[reflect(embed)]` - promote the member's fields into this structure
/// - `#[reflect(skip)]` - leave the field out of the type model
///
/// Structure attributes:
///
/// - `#[reflect(display)]` - expose `Display` as the stringification capability
/// - `#[reflect(marshal)]` - expose `serde::Serialize` as the JSON marshal capability
/// - `#[reflect(schema_message)]` - mark the type as a schema message
/// - `#[reflect(method(call = path, name = "Name", guard = "ok" | "err"))]` - expose a
///   zero-argument method as a virtual field
///
/// # Example
///
/// ```ignore
/// #[derive(Reflect, Default, Clone)]
/// #[reflect(method(call = full_name, name = "FullName"))]
/// pub struct User {
///     #[tag(json = "first_name,omitempty")]
///     pub first: String,
///     pub last: String,
/// }
///
/// impl User {
///     fn full_name(&self) -> String {
///         format!("{} {}", self.first, self.last)
///     }
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect, tag))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

#[derive(Default)]
struct TypeOptions {
    display: bool,
    marshal: bool,
    schema_message: bool,
    methods: Vec<MethodSpec>,
}

struct MethodSpec {
    call: Path,
    name: String,
    guard: Guard,
}

#[derive(Clone, Copy)]
enum Guard {
    None,
    Ok,
    Err,
}

fn derive_impl(input: &DeriveInput) -> Result<TokenStream2, syn::Error> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Reflect only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Reflect only supports structs")),
    };

    let options = parse_type_options(input)?;

    let mut field_tokens = Vec::new();
    let mut zero_checks = Vec::new();

    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let ty = &field.ty;

        let mut skip = false;
        let mut embedded = false;
        let mut tags: Vec<(String, String)> = Vec::new();

        for attr in &field.attrs {
            if attr.path().is_ident("reflect") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("skip") {
                        skip = true;
                        Ok(())
                    } else if meta.path.is_ident("embed") {
                        embedded = true;
                        Ok(())
                    } else {
                        Err(meta.error("expected `skip` or `embed`"))
                    }
                })?;
            } else if attr.path().is_ident("tag") {
                attr.parse_nested_meta(|meta| {
                    let key = meta
                        .path
                        .get_ident()
                        .map(ToString::to_string)
                        .ok_or_else(|| meta.error("expected a tag key"))?;
                    let value: LitStr = meta.value()?.parse()?;
                    tags.push((key, value.value()));
                    Ok(())
                })?;
            }
        }

        if skip {
            continue;
        }

        let ident_str = unraw(ident);
        let exported = matches!(field.vis, Visibility::Public(_));
        let tag_keys = tags.iter().map(|(k, _)| k);
        let tag_values = tags.iter().map(|(_, v)| v);

        field_tokens.push(quote! {
            ::conv::reflect::FieldInfo {
                ident: #ident_str,
                ty: <#ty as ::conv::reflect::Typed>::type_info,
                tags: &[#((#tag_keys, #tag_values)),*],
                exported: #exported,
                embedded: #embedded,
                get: |owner| {
                    owner
                        .downcast_ref::<Self>()
                        .map(|owner| &owner.#ident as &dyn ::conv::reflect::Reflect)
                },
                get_mut: |owner| {
                    owner
                        .downcast_mut::<Self>()
                        .map(|owner| &mut owner.#ident as &mut dyn ::conv::reflect::Reflect)
                },
            }
        });
        zero_checks.push(quote! {
            && ::conv::reflect::Reflect::is_zero(&self.#ident)
        });
    }

    let method_tokens = options.methods.iter().map(method_tokens);

    let mut capabilities = TokenStream2::new();
    if options.display {
        capabilities.extend(quote!(.with_display::<Self>()));
    }
    if options.marshal {
        capabilities.extend(quote!(.with_marshal::<Self>()));
    }
    if options.schema_message {
        capabilities.extend(quote!(.schema_message()));
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::conv::reflect::Reflect for #name #ty_generics #where_clause {
            fn info(&self) -> &'static ::conv::reflect::TypeInfo {
                <Self as ::conv::reflect::Typed>::type_info()
            }

            fn is_zero(&self) -> bool {
                true #(#zero_checks)*
            }
        }

        impl #impl_generics ::conv::reflect::Typed for #name #ty_generics #where_clause {
            fn type_info() -> &'static ::conv::reflect::TypeInfo {
                ::conv::reflect::type_info_of::<Self>(|| {
                    ::conv::reflect::TypeInfo::structure::<Self>(
                        ::conv::reflect::StructInfo::new(
                            ::std::vec![#(#field_tokens),*],
                            ::std::vec![#(#method_tokens),*],
                        ),
                    )
                    #capabilities
                })
            }
        }
    })
}

fn parse_type_options(input: &DeriveInput) -> Result<TypeOptions, syn::Error> {
    let mut options = TypeOptions::default();
    for attr in &input.attrs {
        if !attr.path().is_ident("reflect") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("display") {
                options.display = true;
            } else if meta.path.is_ident("marshal") {
                options.marshal = true;
            } else if meta.path.is_ident("schema_message") {
                options.schema_message = true;
            } else if meta.path.is_ident("method") {
                let mut call: Option<Path> = None;
                let mut name: Option<String> = None;
                let mut guard = Guard::None;
                meta.parse_nested_meta(|inner| {
                    if inner.path.is_ident("call") {
                        call = Some(inner.value()?.parse()?);
                    } else if inner.path.is_ident("name") {
                        let value: LitStr = inner.value()?.parse()?;
                        name = Some(value.value());
                    } else if inner.path.is_ident("guard") {
                        let value: LitStr = inner.value()?.parse()?;
                        guard = match value.value().as_str() {
                            "ok" => Guard::Ok,
                            "err" => Guard::Err,
                            _ => return Err(inner.error("guard must be \"ok\" or \"err\"")),
                        };
                    } else {
                        return Err(inner.error("expected `call`, `name` or `guard`"));
                    }
                    Ok(())
                })?;
                let call = call.ok_or_else(|| meta.error("missing `call = ...`"))?;
                let name = match name {
                    Some(name) => name,
                    None => call
                        .segments
                        .last()
                        .map(|segment| unraw(&segment.ident))
                        .ok_or_else(|| meta.error("empty method path"))?,
                };
                options.methods.push(MethodSpec { call, name, guard });
            } else {
                return Err(meta.error(
                    "expected `display`, `marshal`, `schema_message` or `method(...)`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

fn method_tokens(spec: &MethodSpec) -> TokenStream2 {
    let name = &spec.name;
    let call = match spec.call.get_ident() {
        Some(ident) => quote!(Self::#ident),
        None => spec.call.to_token_stream(),
    };
    let (guard, returns, wrap) = match spec.guard {
        Guard::None => (
            quote!(::conv::reflect::Guard::None),
            quote!(::conv::reflect::returns),
            quote!(::core::option::Option::Some(#call(owner))),
        ),
        Guard::Ok => (
            quote!(::conv::reflect::Guard::Ok),
            quote!(::conv::reflect::returns_ok),
            quote!(#call(owner)),
        ),
        Guard::Err => (
            quote!(::conv::reflect::Guard::Err),
            quote!(::conv::reflect::returns_err),
            quote!(#call(owner).ok()),
        ),
    };

    quote! {
        ::conv::reflect::MethodInfo {
            name: #name,
            output: || #returns(#call),
            guard: #guard,
            call: |owner| {
                let owner = owner.downcast_ref::<Self>()?;
                #wrap.map(|value| {
                    ::std::boxed::Box::new(value) as ::std::boxed::Box<dyn ::conv::reflect::Reflect>
                })
            },
        }
    }
}

fn unraw(ident: &Ident) -> String {
    let s = ident.to_string();
    s.strip_prefix("r#").map(ToString::to_string).unwrap_or(s)
}
