//! Attribute parsing for the Record derive macro.
//!
//! The same `#[record(...)]` attribute is accepted on the struct and on its
//! fields; [`parse_container_attrs`] and [`parse_field_attrs`] reject the
//! keys that do not belong at each level.

use proc_macro2::Span;
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Error, Lit, Meta, Result, Token,
};

/// Contents of one `#[record(...)]` attribute.
#[derive(Debug, Clone)]
pub struct RecordAttr {
    /// Exclude the field from the schema.
    pub skip: bool,
    /// Field name used in paths (default: the Rust field name).
    pub rename: Option<String>,
    /// Schema name (container only).
    pub name: Option<String>,
    /// The span for error reporting.
    pub span: Span,
}

impl Default for RecordAttr {
    fn default() -> Self {
        RecordAttr {
            skip: false,
            rename: None,
            name: None,
            span: Span::call_site(),
        }
    }
}

fn string_value(value: &syn::Expr, key: &str) -> Result<String> {
    match value {
        syn::Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => Ok(s.value()),
        other => Err(Error::new(
            other.span(),
            format!("{key} must be a string literal"),
        )),
    }
}

impl Parse for RecordAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attr = RecordAttr {
            span: input.span(),
            ..RecordAttr::default()
        };

        let content: Punctuated<Meta, Token![,]> = Punctuated::parse_terminated(input)?;

        for meta in content {
            match &meta {
                Meta::Path(p) if p.is_ident("skip") => attr.skip = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                    let rename = string_value(&nv.value, "rename")?;
                    if !is_segment(&rename) {
                        return Err(Error::new(
                            nv.value.span(),
                            "rename must be non-empty and contain only ASCII letters, digits or '_'",
                        ));
                    }
                    attr.rename = Some(rename);
                }
                Meta::NameValue(nv) if nv.path.is_ident("name") => {
                    attr.name = Some(string_value(&nv.value, "name")?);
                }
                _ => {
                    return Err(Error::new(
                        meta.span(),
                        "unknown record attribute. Expected: skip, rename = \"...\", or name = \"...\"",
                    ));
                }
            }
        }

        Ok(attr)
    }
}

/// Whether `name` can appear as one segment of a field path.
pub fn is_segment(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn find_record_attr(attrs: &[Attribute]) -> Result<RecordAttr> {
    for attr in attrs {
        if attr.path().is_ident("record") {
            return attr.parse_args::<RecordAttr>();
        }
    }
    Ok(RecordAttr::default())
}

/// Extract `#[record(...)]` from a struct.
pub fn parse_container_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    let attr = find_record_attr(attrs)?;
    if attr.skip || attr.rename.is_some() {
        return Err(Error::new(
            attr.span,
            "only name = \"...\" is allowed on the struct",
        ));
    }
    Ok(attr)
}

/// Extract `#[record(...)]` from a field.
pub fn parse_field_attrs(attrs: &[Attribute]) -> Result<RecordAttr> {
    let attr = find_record_attr(attrs)?;
    if attr.name.is_some() {
        return Err(Error::new(
            attr.span,
            "name = \"...\" belongs on the struct; use rename on fields",
        ));
    }
    Ok(attr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parse_record(tokens: &str) -> Result<RecordAttr> {
        syn::parse_str::<RecordAttr>(tokens)
    }

    #[test]
    fn skip() {
        let attr = parse_record("skip").unwrap();
        assert!(attr.skip);
        assert_eq!(attr.rename, None);
    }

    #[test]
    fn rename() {
        let attr = parse_record(r#"rename = "display_name""#).unwrap();
        assert_eq!(attr.rename, Some("display_name".to_string()));
        assert!(!attr.skip);
    }

    #[test]
    fn rename_must_be_a_segment() {
        let err = parse_record(r#"rename = "author.name""#).unwrap_err();
        assert!(err.to_string().contains("ASCII letters"));
        assert!(parse_record(r#"rename = """#).is_err());
    }

    #[test]
    fn rename_must_be_a_string() {
        let err = parse_record("rename = 3").unwrap_err();
        assert!(err.to_string().contains("string literal"));
    }

    #[test]
    fn unknown_key() {
        let err = parse_record("flatten").unwrap_err();
        assert!(err.to_string().contains("unknown record attribute"));
    }

    #[test]
    fn container_name() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[record(name = "library.Book")])];
        let attr = parse_container_attrs(&attrs).unwrap();
        assert_eq!(attr.name, Some("library.Book".to_string()));
    }

    #[test]
    fn container_rejects_field_keys() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[record(skip)])];
        assert!(parse_container_attrs(&attrs).is_err());
    }

    #[test]
    fn field_rejects_name() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[record(name = "x")])];
        assert!(parse_field_attrs(&attrs).is_err());
    }

    #[test]
    fn missing_attribute_is_default() {
        let attrs: Vec<Attribute> = vec![parse_quote!(#[serde(default)])];
        let attr = parse_field_attrs(&attrs).unwrap();
        assert!(!attr.skip);
        assert_eq!(attr.rename, None);
    }

    #[test]
    fn segments() {
        assert!(is_segment("page_count"));
        assert!(is_segment("v2"));
        assert!(!is_segment("a-b"));
        assert!(!is_segment(""));
    }
}
