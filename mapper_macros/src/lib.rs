//! Procedural macros for beanmapper

mod attributes;
mod bean;

use proc_macro::TokenStream;

/// Derives `Bean`, `BeanClass` and `Property` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// #[derive(Bean, Default)]
/// struct PersonForm {
///     #[bean(parent)]
///     base: Entity,
///
///     #[bean(name = "place")]
///     city: String,
///
///     #[bean(default = "NL")]
///     country: String,
///
///     #[bean(ignore)]
///     password: String,
///
///     #[bean(collection = "clear")]
///     tags: Vec<String>,
///
///     #[bean(unwrap)]
///     address: Address,
///
///     #[bean(skip)]
///     cache: SomethingUnmappable,
/// }
/// ```
///
/// Field attributes:
/// - `ignore`: never read as a source nor written as a target
/// - `name = "..."`: bind under another key; dots address nested properties
/// - `default = "..."`: literal used when the source offers no value
/// - `collection = "replace" | "clear" | "clear_and_refill"`: reconciliation strategy
/// - `unwrap`: flatten the nested bean as a source, encapsulate as a target
/// - `parent`: the field embeds an ancestor whose properties are inherited
/// - `skip`: the field is not a property at all
/// - `read_only` / `write_only`: restrict access
///
/// The struct attribute `#[bean(no_default)]` declares that the type cannot be
/// constructed by the mapper; it then needs no `Default` impl and can only be a source
/// or an existing target.
#[proc_macro_derive(Bean, attributes(bean))]
pub fn derive_bean(input: TokenStream) -> TokenStream {
    bean::derive_bean_impl(input)
}
