//! Conditional-compilation evaluation.
//!
//! The loader runs as if a fixed set of cfg flags were enabled (by default
//! just `sszgen`). Files and items switched off under those flags are
//! invisible to the generator, which is how generated output guarded with
//! `#![cfg(not(sszgen))]` stays out of later runs.

use std::collections::BTreeSet;
use syn::punctuated::Punctuated;
use syn::{Attribute, Meta, Token};

pub struct CfgFlags {
    enabled: BTreeSet<String>,
}

impl CfgFlags {
    pub fn new<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: flags.into_iter().map(Into::into).collect(),
        }
    }

    /* Evaluate one cfg predicate */
    pub fn eval(&self, predicate: &Meta) -> syn::Result<bool> {
        match predicate {
            Meta::Path(path) => Ok(path
                .get_ident()
                .map(|ident| self.enabled.contains(&ident.to_string()))
                .unwrap_or(false)),
            /* `feature = "..."` and friends are never set */
            Meta::NameValue(_) => Ok(false),
            Meta::List(list) => {
                let nested =
                    list.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
                if list.path.is_ident("not") {
                    if nested.len() != 1 {
                        return Err(syn::Error::new_spanned(
                            list,
                            "cfg(not(..)) takes exactly one predicate",
                        ));
                    }
                    return Ok(!self.eval(&nested[0])?);
                }
                if list.path.is_ident("all") {
                    for meta in &nested {
                        if !self.eval(meta)? {
                            return Ok(false);
                        }
                    }
                    return Ok(true);
                }
                if list.path.is_ident("any") {
                    for meta in &nested {
                        if self.eval(meta)? {
                            return Ok(true);
                        }
                    }
                    return Ok(false);
                }
                Err(syn::Error::new_spanned(&list.path, "unknown cfg predicate"))
            }
        }
    }

    /* True unless some `cfg` attribute in `attrs` switches the item off */
    pub fn enabled(&self, attrs: &[Attribute]) -> syn::Result<bool> {
        for attr in attrs.iter().filter(|a| a.path().is_ident("cfg")) {
            let predicate: Meta = attr.parse_args()?;
            if !self.eval(&predicate)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Expands `#[cfg_attr(pred, a, b)]` into the attribute metas that apply.
    pub fn active_cfg_attrs(&self, attrs: &[Attribute]) -> syn::Result<Vec<Meta>> {
        let mut active = Vec::new();
        for attr in attrs.iter().filter(|a| a.path().is_ident("cfg_attr")) {
            let args = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
            let mut args = args.into_iter();
            let Some(predicate) = args.next() else {
                return Err(syn::Error::new_spanned(attr, "empty cfg_attr"));
            };
            if self.eval(&predicate)? {
                active.extend(args);
            }
        }
        Ok(active)
    }
}
