//! Parsing of `#[bean(...)]` attributes

use proc_macro2::TokenStream;
use quote::quote;
use syn::Attribute;
use syn::Field;
use syn::LitStr;
use syn::meta::ParseNestedMeta;

const ATTRIBUTE: &str = "bean";

/// Struct-level options
#[derive(Default)]
pub struct BeanAttrs {
    pub no_default: bool,
}

/// Collection strategy named in `collection = "..."`
#[derive(Clone, Copy)]
pub enum CollectionChoice {
    Replace,
    ClearAndRefill,
}

impl CollectionChoice {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        match lit.value().as_str() {
            "replace" => Ok(Self::Replace),
            "clear" | "clear_and_refill" => Ok(Self::ClearAndRefill),
            other => Err(syn::Error::new_spanned(
                lit,
                format!(
                    "unknown collection strategy `{other}`, expected \"replace\", \"clear\" or \
                     \"clear_and_refill\""
                ),
            )),
        }
    }

    pub fn to_tokens(self) -> TokenStream {
        match self {
            Self::Replace => quote!(::beanmapper::CollectionStrategy::Replace),
            Self::ClearAndRefill => quote!(::beanmapper::CollectionStrategy::ClearAndRefill),
        }
    }
}

/// Field-level options
#[derive(Default)]
pub struct FieldAttrs {
    pub ignore:     bool,
    pub name:       Option<LitStr>,
    pub default:    Option<LitStr>,
    pub collection: Option<CollectionChoice>,
    pub unwrap:     bool,
    pub parent:     bool,
    pub skip:       bool,
    pub read_only:  bool,
    pub write_only: bool,
}

impl FieldAttrs {
    fn has_property_options(&self) -> bool {
        self.ignore
            || self.name.is_some()
            || self.default.is_some()
            || self.collection.is_some()
            || self.unwrap
            || self.read_only
            || self.write_only
    }

    fn validate(&self, field: &Field) -> syn::Result<()> {
        if self.parent && self.skip {
            return Err(syn::Error::new_spanned(
                field,
                "`parent` and `skip` cannot be combined",
            ));
        }
        if (self.parent || self.skip) && self.has_property_options() {
            return Err(syn::Error::new_spanned(
                field,
                "`parent` and `skip` fields are not properties and take no other bean options",
            ));
        }
        if self.read_only && self.write_only {
            return Err(syn::Error::new_spanned(
                field,
                "`read_only` and `write_only` cannot be combined",
            ));
        }
        Ok(())
    }
}

pub fn parse_struct(attrs: &[Attribute]) -> syn::Result<BeanAttrs> {
    let mut parsed = BeanAttrs::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident(ATTRIBUTE)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("no_default") {
                parsed.no_default = true;
                Ok(())
            } else {
                Err(meta.error("unsupported bean struct attribute, expected `no_default`"))
            }
        })?;
    }
    Ok(parsed)
}

pub fn parse_field(field: &Field) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident(ATTRIBUTE)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("ignore") {
                parsed.ignore = true;
            } else if meta.path.is_ident("name") {
                let name = string_value(&meta)?;
                validate_binding_key(&name)?;
                parsed.name = Some(name);
            } else if meta.path.is_ident("default") {
                parsed.default = Some(string_value(&meta)?);
            } else if meta.path.is_ident("collection") {
                parsed.collection = Some(CollectionChoice::parse(&string_value(&meta)?)?);
            } else if meta.path.is_ident("unwrap") {
                parsed.unwrap = true;
            } else if meta.path.is_ident("parent") {
                parsed.parent = true;
            } else if meta.path.is_ident("skip") {
                parsed.skip = true;
            } else if meta.path.is_ident("read_only") {
                parsed.read_only = true;
            } else if meta.path.is_ident("write_only") {
                parsed.write_only = true;
            } else {
                return Err(meta.error("unsupported bean field attribute"));
            }
            Ok(())
        })?;
    }
    parsed.validate(field)?;
    Ok(parsed)
}

fn string_value(meta: &ParseNestedMeta<'_>) -> syn::Result<LitStr> {
    meta.value()?.parse()
}

fn validate_binding_key(name: &LitStr) -> syn::Result<()> {
    let value = name.value();
    if value.split('.').any(str::is_empty) {
        return Err(syn::Error::new_spanned(
            name,
            "binding key segments must not be empty",
        ));
    }
    Ok(())
}
