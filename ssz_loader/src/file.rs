//! Source File Declarations
//!
//! Walks one parsed source file and turns its struct declarations into
//! descriptors. Declaration problems are collected rather than returned so
//! that one run reports every broken declaration in the package.

use crate::cfg::CfgFlags;
use crate::error::DeclarationError;
use crate::package::child_dir;
use quote::ToTokens;
use ssz_types::{FieldDescriptor, ScalarType, Shape, TypeDescriptor};
use std::path::{Path, PathBuf};
use syn::ext::IdentExt;
use syn::{
    Attribute, Expr, ExprLit, Fields, GenericArgument, Item, ItemStruct, Lit, Meta, PathArguments,
    Type, Visibility,
};

/* Standard types that have no encoding; reported instead of looked up */
const KNOWN_UNSUPPORTED: &[&str] = &[
    "String", "str", "char", "usize", "isize", "i8", "i16", "i32", "i64", "i128", "f32", "f64",
    "Option", "Box", "Rc", "Arc", "HashMap", "BTreeMap", "HashSet", "BTreeSet", "VecDeque",
];

pub struct SourceFile<'a> {
    pub path: &'a Path,
    pub module_path: String,
    pub flags: &'a CfgFlags,
}

impl<'a> SourceFile<'a> {
    /* Collect descriptors from a parsed file, honouring cfg attributes */
    pub fn collect(
        &self,
        file: &syn::File,
        types: &mut Vec<TypeDescriptor>,
        errors: &mut Vec<DeclarationError>,
    ) {
        match self.flags.enabled(&file.attrs) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(path = %self.path.display(), "skipping file disabled by cfg");
                return;
            }
            Err(err) => {
                errors.push(DeclarationError::new(self.path, err.to_string()));
                return;
            }
        }
        self.collect_items(&file.items, &self.module_path, types, errors);
    }

    fn collect_items(
        &self,
        items: &[Item],
        module_path: &str,
        types: &mut Vec<TypeDescriptor>,
        errors: &mut Vec<DeclarationError>,
    ) {
        for item in items {
            match item {
                Item::Struct(item_struct) => match self.flags.enabled(&item_struct.attrs) {
                    Ok(true) => {
                        if let Some(desc) = self.describe_struct(item_struct, module_path, errors) {
                            types.push(desc);
                        }
                    }
                    Ok(false) => {}
                    Err(err) => errors.push(DeclarationError::new(self.path, err.to_string())),
                },
                Item::Mod(item_mod) => {
                    let Some((_, content)) = &item_mod.content else {
                        continue;
                    };
                    match self.flags.enabled(&item_mod.attrs) {
                        Ok(true) => {
                            let nested = format!("{}::{}", module_path, item_mod.ident);
                            self.collect_items(content, &nested, types, errors);
                        }
                        Ok(false) => {}
                        Err(err) => errors.push(DeclarationError::new(self.path, err.to_string())),
                    }
                }
                _ => {}
            }
        }
    }

    /// Paths of the files behind out-of-line `mod` declarations that cfg
    /// switches off. A directory entry covers every file beneath it.
    pub fn disabled_modules(
        &self,
        file: &syn::File,
        errors: &mut Vec<DeclarationError>,
    ) -> Vec<PathBuf> {
        let mut disabled = Vec::new();
        if !matches!(self.flags.enabled(&file.attrs), Ok(true)) {
            return disabled;
        }
        let base = self.path.parent().unwrap_or(Path::new(""));
        self.scan_modules(&file.items, &child_dir(self.path), base, &mut disabled, errors);
        disabled
    }

    /* `dir` holds child module files; `base` anchors `#[path]` values */
    fn scan_modules(
        &self,
        items: &[Item],
        dir: &Path,
        base: &Path,
        disabled: &mut Vec<PathBuf>,
        errors: &mut Vec<DeclarationError>,
    ) {
        for item in items {
            let Item::Mod(item_mod) = item else {
                continue;
            };
            let enabled = match self.flags.enabled(&item_mod.attrs) {
                Ok(enabled) => enabled,
                /* inline modules are reported when their items are collected */
                Err(err) => {
                    if item_mod.content.is_none() {
                        errors.push(DeclarationError::new(self.path, err.to_string()));
                    }
                    continue;
                }
            };
            let nested = dir.join(item_mod.ident.unraw().to_string());
            match (&item_mod.content, enabled) {
                (Some((_, content)), true) => {
                    self.scan_modules(content, &nested, &nested, disabled, errors)
                }
                (Some(_), false) => disabled.push(nested),
                (None, true) => {}
                (None, false) => match path_attr(&item_mod.attrs) {
                    Some(relative) => {
                        let target = base.join(relative);
                        disabled.push(child_dir(&target));
                        disabled.push(target);
                    }
                    None => {
                        disabled.push(nested.with_extension("rs"));
                        disabled.push(nested);
                    }
                },
            }
        }
    }

    fn describe_struct(
        &self,
        item: &ItemStruct,
        module_path: &str,
        errors: &mut Vec<DeclarationError>,
    ) -> Option<TypeDescriptor> {
        let name = item.ident.to_string();

        if !item.generics.params.is_empty() {
            tracing::debug!(type_name = %name, "skipping generic struct");
            return None;
        }
        let Fields::Named(named) = &item.fields else {
            tracing::debug!(type_name = %name, "skipping struct without named fields");
            return None;
        };

        let mut fields = Vec::with_capacity(named.named.len());
        for field in &named.named {
            let Some(ident) = &field.ident else {
                continue;
            };
            match self.flags.enabled(&field.attrs) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    errors.push(DeclarationError::new(self.path, err.to_string()));
                    continue;
                }
            }
            let max = match self.field_max(&field.attrs) {
                Ok(max) => max,
                Err(err) => {
                    errors.push(DeclarationError::new(
                        self.path,
                        format!("{}.{}: {}", name, ident, err),
                    ));
                    None
                }
            };
            fields.push(FieldDescriptor {
                name: ident.to_string(),
                rust_type: type_text(&field.ty),
                shape: shape_of(&field.ty),
                max,
            });
        }

        Some(TypeDescriptor {
            name,
            module_path: module_path.to_string(),
            exported: !matches!(item.vis, Visibility::Inherited),
            fields,
        })
    }

    /* `#[ssz(max = N)]`, directly or behind an active `cfg_attr` */
    fn field_max(&self, attrs: &[Attribute]) -> syn::Result<Option<usize>> {
        let mut metas: Vec<Meta> = attrs
            .iter()
            .filter(|a| a.path().is_ident("ssz"))
            .map(|a| a.meta.clone())
            .collect();
        metas.extend(
            self.flags
                .active_cfg_attrs(attrs)?
                .into_iter()
                .filter(|m| m.path().is_ident("ssz")),
        );

        let mut max = None;
        for meta in metas {
            let list = match meta {
                Meta::List(list) => list,
                other => return Err(syn::Error::new_spanned(other, "expected ssz(...)")),
            };
            list.parse_nested_meta(|nested| {
                if nested.path.is_ident("max") {
                    let lit: syn::LitInt = nested.value()?.parse()?;
                    max = Some(lit.base10_parse::<usize>()?);
                    Ok(())
                } else {
                    Err(nested.error("unsupported ssz attribute"))
                }
            })?;
        }
        Ok(max)
    }
}

/* Value of a `#[path = "..."]` attribute */
fn path_attr(attrs: &[Attribute]) -> Option<String> {
    attrs.iter().find_map(|attr| match &attr.meta {
        Meta::NameValue(nv) if nv.path.is_ident("path") => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(lit), ..
            }) => Some(lit.value()),
            _ => None,
        },
        _ => None,
    })
}

/* Declared type as compact source text, e.g. `Vec<[u8; 32]>` */
pub fn type_text(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" :: ", "::")
        .replace(" <", "<")
        .replace("< ", "<")
        .replace(" >", ">")
        .replace(" ;", ";")
        .replace("& ", "&")
}

/* Map a declared type to its shape */
pub fn shape_of(ty: &Type) -> Shape {
    match ty {
        Type::Paren(inner) => shape_of(&inner.elem),
        Type::Group(inner) => shape_of(&inner.elem),
        Type::Array(array) => {
            let Some(len) = literal_usize(&array.len) else {
                return Shape::Unsupported(format!(
                    "{} (array length must be an integer literal)",
                    type_text(ty)
                ));
            };
            match shape_of(&array.elem) {
                Shape::Scalar(ScalarType::U8) => Shape::ByteArray(len),
                elem => Shape::Array {
                    elem: Box::new(elem),
                    len,
                },
            }
        }
        Type::Path(type_path) if type_path.qself.is_none() => path_shape(&type_path.path, ty),
        _ => Shape::Unsupported(type_text(ty)),
    }
}

fn path_shape(path: &syn::Path, ty: &Type) -> Shape {
    let Some(last) = path.segments.last() else {
        return Shape::Unsupported(type_text(ty));
    };
    let ident = last.ident.to_string();

    match &last.arguments {
        PathArguments::None => {
            if let Some(scalar) = ScalarType::from_ident(&ident) {
                return Shape::Scalar(scalar);
            }
            if ident == "BitList" {
                return Shape::BitList;
            }
            if KNOWN_UNSUPPORTED.contains(&ident.as_str()) {
                return Shape::Unsupported(type_text(ty));
            }
            Shape::Named(ident)
        }
        PathArguments::AngleBracketed(args) => {
            let args: Vec<&GenericArgument> = args.args.iter().collect();
            match (ident.as_str(), args.as_slice()) {
                ("Vec", [GenericArgument::Type(elem)]) => Shape::List(Box::new(shape_of(elem))),
                ("BitVector", [GenericArgument::Const(len)]) => match literal_usize(len) {
                    Some(len) => Shape::BitVector(len),
                    None => Shape::Unsupported(format!(
                        "{} (bit-vector length must be an integer literal)",
                        type_text(ty)
                    )),
                },
                _ => Shape::Unsupported(type_text(ty)),
            }
        }
        PathArguments::Parenthesized(_) => Shape::Unsupported(type_text(ty)),
    }
}

fn literal_usize(expr: &Expr) -> Option<usize> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(lit), ..
        }) => lit.base10_parse().ok(),
        Expr::Block(block) if block.block.stmts.len() == 1 => match &block.block.stmts[0] {
            syn::Stmt::Expr(inner, None) => literal_usize(inner),
            _ => None,
        },
        Expr::Paren(inner) => literal_usize(&inner.expr),
        Expr::Group(inner) => literal_usize(&inner.expr),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use syn::parse_quote;

    fn collect(source: &str) -> (Vec<TypeDescriptor>, Vec<DeclarationError>) {
        let flags = CfgFlags::new(["sszgen"]);
        let path = PathBuf::from("types.rs");
        let file = syn::parse_file(source).expect("valid source");
        let source_file = SourceFile {
            path: &path,
            module_path: "crate::types".to_string(),
            flags: &flags,
        };
        let mut types = Vec::new();
        let mut errors = Vec::new();
        source_file.collect(&file, &mut types, &mut errors);
        (types, errors)
    }

    #[test]
    fn maps_supported_shapes() {
        assert_eq!(shape_of(&parse_quote!(u64)), Shape::Scalar(ScalarType::U64));
        assert_eq!(shape_of(&parse_quote!([u8; 32])), Shape::ByteArray(32));
        assert_eq!(
            shape_of(&parse_quote!([u16; 4])),
            Shape::Array {
                elem: Box::new(Shape::Scalar(ScalarType::U16)),
                len: 4
            }
        );
        assert_eq!(
            shape_of(&parse_quote!(std::vec::Vec<u8>)),
            Shape::List(Box::new(Shape::Scalar(ScalarType::U8)))
        );
        assert_eq!(shape_of(&parse_quote!(BitVector<64>)), Shape::BitVector(64));
        assert_eq!(shape_of(&parse_quote!(ssz_runtime::BitList)), Shape::BitList);
        assert_eq!(
            shape_of(&parse_quote!(Checkpoint)),
            Shape::Named("Checkpoint".to_string())
        );
    }

    #[test]
    fn flags_unsupported_shapes() {
        let cases: Vec<Type> = vec![
            parse_quote!(String),
            parse_quote!(HashMap<u8, u8>),
            parse_quote!(Option<u64>),
            parse_quote!(&'static [u8]),
            parse_quote!((u8, u8)),
            parse_quote!(fn(u8) -> u8),
            parse_quote!(Box<dyn Fn()>),
            parse_quote!(i32),
        ];
        for ty in cases {
            assert!(
                matches!(shape_of(&ty), Shape::Unsupported(_)),
                "{} should be unsupported",
                type_text(&ty)
            );
        }
        assert!(matches!(
            shape_of(&parse_quote!([u8; LEN])),
            Shape::Unsupported(_)
        ));
    }

    #[test]
    fn type_text_is_compact() {
        assert_eq!(type_text(&parse_quote!(Vec<[u8; 32]>)), "Vec<[u8; 32]>");
        assert_eq!(type_text(&parse_quote!(Vec<Vec<u8>>)), "Vec<Vec<u8>>");
        assert_eq!(type_text(&parse_quote!(crate::a::B)), "crate::a::B");
    }

    #[test]
    fn collects_structs_in_declaration_order() {
        let (types, errors) = collect(
            r#"
            pub struct Foo { pub a: u64, pub b: Vec<u8> }
            struct Hidden { x: u8 }
            pub struct Tuple(u8);
            pub struct Generic<T> { t: T }
            pub mod inner {
                pub struct Bar { pub c: [u8; 4] }
            }
            #[cfg(test)]
            pub struct TestOnly { pub z: u8 }
            "#,
        );
        assert!(errors.is_empty());
        let names: Vec<&str> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Foo", "Hidden", "Bar"]);
        assert!(types[0].exported);
        assert!(!types[1].exported);
        assert_eq!(types[2].module_path, "crate::types::inner");
        assert_eq!(types[0].fields[1].rust_type, "Vec<u8>");
    }

    #[test]
    fn skips_files_disabled_for_the_generator() {
        let (types, errors) = collect(
            r#"
            #![cfg(not(sszgen))]
            pub struct Generated { pub a: u8 }
            "#,
        );
        assert!(errors.is_empty());
        assert!(types.is_empty());
    }

    #[test]
    fn reads_list_limits() {
        let (types, errors) = collect(
            r#"
            pub struct Limited {
                #[cfg_attr(sszgen, ssz(max = 16))]
                pub a: Vec<u8>,
                #[ssz(max = 2)]
                pub b: BitList,
                pub c: Vec<u8>,
            }
            "#,
        );
        assert!(errors.is_empty());
        let fields = &types[0].fields;
        assert_eq!(fields[0].max, Some(16));
        assert_eq!(fields[1].max, Some(2));
        assert_eq!(fields[2].max, None);
    }

    #[test]
    fn reports_bad_attributes() {
        let (_, errors) = collect(
            r#"
            pub struct Bad {
                #[ssz(min = 1)]
                pub a: Vec<u8>,
            }
            "#,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Bad.a"));
    }
}
