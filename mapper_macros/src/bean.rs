//! Bean derive macro implementation

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::Data;
use syn::DeriveInput;
use syn::Fields;
use syn::Ident;
use syn::Type;
use syn::ext::IdentExt;
use syn::parse_macro_input;

use crate::attributes::FieldAttrs;
use crate::attributes::parse_field;
use crate::attributes::parse_struct;

/// Implementation of the Bean derive macro
pub fn derive_bean_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct BeanField<'a> {
    ident: &'a Ident,
    name:  String,
    ty:    &'a Type,
    attrs: FieldAttrs,
}

struct ParentField<'a> {
    ident: &'a Ident,
    name:  String,
    ty:    &'a Type,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Bean cannot be derived for generic types",
        ));
    }

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Bean can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "Bean can only be derived for structs with named fields",
        ));
    };

    let bean_attrs = parse_struct(&input.attrs)?;

    let mut parent: Option<ParentField<'_>> = None;
    let mut fields = Vec::new();
    for field in &named.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_field(field)?;
        let name = ident.unraw().to_string();

        if attrs.skip {
            continue;
        }
        if attrs.parent {
            if parent.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be marked #[bean(parent)]",
                ));
            }
            parent = Some(ParentField {
                ident,
                name,
                ty: &field.ty,
            });
            continue;
        }
        fields.push(BeanField {
            ident,
            name,
            ty: &field.ty,
            attrs,
        });
    }

    let struct_name = &input.ident;
    let struct_name_str = struct_name.unraw().to_string();

    let declarations = fields.iter().map(property_declaration);

    let parent_link = parent.as_ref().map(|parent| {
        let name = &parent.name;
        let ty = parent.ty;
        quote! {
            .parent(#name, ::beanmapper::BeanTypeRef::new(<#ty as ::beanmapper::BeanClass>::class))
        }
    });

    let constructor = (!bean_attrs.no_default).then(|| {
        quote! {
            .constructor(|| ::std::boxed::Box::new(<Self as ::core::default::Default>::default()))
        }
    });

    let instantiate = if bean_attrs.no_default {
        quote!(::core::option::Option::None)
    } else {
        quote!(::core::option::Option::Some(<Self as ::core::default::Default>::default()))
    };

    let read_arms = fields
        .iter()
        .filter(|field| !field.attrs.write_only)
        .map(|field| {
            let name = &field.name;
            let ident = field.ident;
            quote! {
                #name => ::core::option::Option::Some(::beanmapper::Property::view(&self.#ident)),
            }
        });

    let write_arms = fields
        .iter()
        .filter(|field| !field.attrs.read_only)
        .map(|field| {
            let name = &field.name;
            let ident = field.ident;
            quote! {
                #name => ::core::option::Option::Some(::beanmapper::Property::view_mut(&mut self.#ident)),
            }
        });

    let (read_fallback, write_fallback) = match &parent {
        Some(parent) => {
            let ident = parent.ident;
            (
                quote!(_ => ::beanmapper::Bean::property(&self.#ident, name),),
                quote!(_ => ::beanmapper::Bean::property_mut(&mut self.#ident, name),),
            )
        }
        None => (
            quote!(_ => ::core::option::Option::None,),
            quote!(_ => ::core::option::Option::None,),
        ),
    };

    Ok(quote! {
        #[automatically_derived]
        impl ::beanmapper::BeanClass for #struct_name {
            fn class() -> &'static ::beanmapper::BeanType {
                static CLASS: ::std::sync::OnceLock<::beanmapper::BeanType> = ::std::sync::OnceLock::new();
                CLASS.get_or_init(|| {
                    ::beanmapper::BeanType::builder::<Self>(#struct_name_str)
                        #parent_link
                        #(#declarations)*
                        #constructor
                        .build()
                })
            }
        }

        #[automatically_derived]
        impl ::beanmapper::Bean for #struct_name {
            fn bean_type(&self) -> &'static ::beanmapper::BeanType {
                <Self as ::beanmapper::BeanClass>::class()
            }

            fn property(&self, name: &str) -> ::core::option::Option<::beanmapper::PropertyView<'_>> {
                match name {
                    #(#read_arms)*
                    #read_fallback
                }
            }

            fn property_mut(&mut self, name: &str) -> ::core::option::Option<::beanmapper::PropertyViewMut<'_>> {
                match name {
                    #(#write_arms)*
                    #write_fallback
                }
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }

        #[automatically_derived]
        impl ::beanmapper::Property for #struct_name {
            fn declared_type() -> ::beanmapper::DeclaredType {
                ::beanmapper::DeclaredType::Bean(::beanmapper::BeanTypeRef::new(
                    <Self as ::beanmapper::BeanClass>::class,
                ))
            }

            fn instantiate() -> ::core::option::Option<Self> {
                #instantiate
            }

            fn view(&self) -> ::beanmapper::PropertyView<'_> {
                ::beanmapper::PropertyView::Bean(self)
            }

            fn view_mut(&mut self) -> ::beanmapper::PropertyViewMut<'_> {
                ::beanmapper::PropertyViewMut::Bean(self)
            }
        }
    })
}

/// Builder call declaring one property with its metadata
fn property_declaration(field: &BeanField<'_>) -> TokenStream2 {
    let name = &field.name;
    let ty = field.ty;
    let attrs = &field.attrs;

    let ignored = attrs.ignore.then(|| quote!(.ignored()));
    let alias = attrs.name.as_ref().map(|alias| quote!(.alias(#alias)));
    let default = attrs
        .default
        .as_ref()
        .map(|literal| quote!(.default_value(#literal)));
    let collection = attrs.collection.map(|strategy| {
        let strategy = strategy.to_tokens();
        quote!(.collection(#strategy))
    });
    let unwrap = attrs.unwrap.then(|| quote!(.unwrap_nested()));
    let read_only = attrs.read_only.then(|| quote!(.read_only()));
    let write_only = attrs.write_only.then(|| quote!(.write_only()));

    quote! {
        .property(
            ::beanmapper::PropertyDecl::new::<#ty>(#name)
                #ignored
                #alias
                #default
                #collection
                #unwrap
                #read_only
                #write_only
        )
    }
}
