use indexmap::{IndexMap, IndexSet};
use ssz_types::{FieldDescriptor, Package, Shape, SizeClass, TypeDescriptor};
use std::collections::{BTreeSet, VecDeque};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("circular type dependency detected: {0:?}")]
    CyclicType(Vec<String>),

    #[error("{type_name}.{field}: unknown type {target}")]
    UnknownType {
        type_name: String,
        field: String,
        target: String,
    },

    #[error("{type_name}.{field}: unsupported field type {shape}")]
    UnsupportedShape {
        type_name: String,
        field: String,
        shape: String,
    },

    #[error("{type_name}.{field}: ssz(max) only applies to Vec and BitList fields")]
    MaxOnFixed { type_name: String, field: String },

    #[error("{type_name}.{field}: private type {target} has no generated encoding")]
    PrivateType {
        type_name: String,
        field: String,
        target: String,
    },

    #[error("{type_name}.{field}: sequence elements must not be zero-sized")]
    ZeroSizedElement { type_name: String, field: String },
}

/// Struct dependency graph; edges follow `Named` references at any depth.
#[derive(Debug)]
pub struct TypeGraph {
    nodes: IndexMap<String, TypeNode>,
}

#[derive(Debug, Clone)]
pub struct TypeNode {
    pub name: String,
    pub deps: BTreeSet<String>,
}

impl TypeGraph {
    pub fn build<'a>(types: impl IntoIterator<Item = &'a TypeDescriptor>) -> Self {
        let mut nodes = IndexMap::new();
        for desc in types {
            let mut deps = BTreeSet::new();
            for field in &desc.fields {
                collect_dependencies(&field.shape, &mut deps);
            }
            /* Self references stay: a struct cannot contain itself */
            nodes.insert(
                desc.name.clone(),
                TypeNode {
                    name: desc.name.clone(),
                    deps,
                },
            );
        }
        Self { nodes }
    }

    /// Dependencies-first ordering using Kahn's algorithm. Ties keep
    /// insertion order so the result is deterministic.
    pub fn topo_order(&self) -> Result<Vec<String>, ClassifyError> {
        let mut in_degree: IndexMap<&str, usize> = IndexMap::new();
        let mut dependents: IndexMap<&str, Vec<&str>> = IndexMap::new();

        for (name, node) in &self.nodes {
            in_degree.entry(name.as_str()).or_insert(0);
            for dep in node.deps.iter().filter(|d| self.nodes.contains_key(*d)) {
                dependents.entry(dep.as_str()).or_default().push(name.as_str());
                *in_degree.entry(name.as_str()).or_insert(0) += 1;
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(name) = queue.pop_front() {
            tracing::trace!(type_name = name, "classify order");
            order.push(name.to_string());

            for child in dependents.get(name).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(*child);
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            let cycle = in_degree
                .into_iter()
                .filter(|(_, degree)| *degree > 0)
                .map(|(name, _)| name.to_string())
                .collect();
            Err(ClassifyError::CyclicType(cycle))
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TypeNode> {
        self.nodes.values()
    }
}

fn collect_dependencies(shape: &Shape, deps: &mut BTreeSet<String>) {
    match shape {
        Shape::Named(name) => {
            deps.insert(name.clone());
        }
        Shape::Array { elem, .. } | Shape::List(elem) => collect_dependencies(elem, deps),
        Shape::Scalar(_)
        | Shape::ByteArray(_)
        | Shape::BitVector(_)
        | Shape::BitList
        | Shape::Unsupported(_) => {}
    }
}

/// Assigns a size class to every struct the selected types depend on.
pub struct Classifier<'a> {
    package: &'a Package,
}

impl<'a> Classifier<'a> {
    pub fn new(package: &'a Package) -> Self {
        Self { package }
    }

    /* Classify every struct in the package */
    pub fn classify_all(&self) -> Result<IndexMap<String, SizeClass>, ClassifyError> {
        let roots: Vec<&TypeDescriptor> = self.package.types.iter().collect();
        self.classify(&roots)
    }

    /* Classify `roots` and everything they reference */
    pub fn classify(
        &self,
        roots: &[&'a TypeDescriptor],
    ) -> Result<IndexMap<String, SizeClass>, ClassifyError> {
        let reachable = self.reachable(roots)?;
        let order = TypeGraph::build(reachable.iter().copied()).topo_order()?;

        let mut classes = IndexMap::with_capacity(order.len());
        for name in order {
            let Some(desc) = reachable.iter().find(|d| d.name == name) else {
                continue;
            };
            check_elements(desc, &classes)?;
            let class = type_class(desc, &classes);
            tracing::debug!(type_name = %name, class = ?class, "classified type");
            classes.insert(name, class);
        }
        Ok(classes)
    }

    /* Walk references from the roots, validating each field on the way */
    fn reachable(
        &self,
        roots: &[&'a TypeDescriptor],
    ) -> Result<Vec<&'a TypeDescriptor>, ClassifyError> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        let mut found = Vec::new();
        let mut pending: VecDeque<&'a TypeDescriptor> = roots.iter().copied().collect();

        while let Some(desc) = pending.pop_front() {
            if !seen.insert(desc.name.as_str()) {
                continue;
            }
            for field in &desc.fields {
                self.check_field(desc, field)?;
                let mut deps = BTreeSet::new();
                collect_dependencies(&field.shape, &mut deps);
                for dep in deps {
                    if let Some(target) = self.package.get(&dep) {
                        pending.push_back(target);
                    }
                }
            }
            found.push(desc);
        }
        Ok(found)
    }

    fn check_field(
        &self,
        desc: &TypeDescriptor,
        field: &FieldDescriptor,
    ) -> Result<(), ClassifyError> {
        check_shape(self.package, desc, field, &field.shape)?;
        if field.max.is_some() && !field.shape.is_limitable() {
            return Err(ClassifyError::MaxOnFixed {
                type_name: desc.name.clone(),
                field: field.name.clone(),
            });
        }
        Ok(())
    }
}

fn check_shape(
    package: &Package,
    desc: &TypeDescriptor,
    field: &FieldDescriptor,
    shape: &Shape,
) -> Result<(), ClassifyError> {
    match shape {
        Shape::Unsupported(description) => Err(ClassifyError::UnsupportedShape {
            type_name: desc.name.clone(),
            field: field.name.clone(),
            shape: description.clone(),
        }),
        Shape::Named(target) => match package.get(target) {
            None => Err(ClassifyError::UnknownType {
                type_name: desc.name.clone(),
                field: field.name.clone(),
                target: target.clone(),
            }),
            Some(found) if !found.exported => Err(ClassifyError::PrivateType {
                type_name: desc.name.clone(),
                field: field.name.clone(),
                target: target.clone(),
            }),
            Some(_) => Ok(()),
        },
        Shape::Array { elem, .. } | Shape::List(elem) => check_shape(package, desc, field, elem),
        _ => Ok(()),
    }
}

/* Zero-sized elements would make a sequence's length unrecoverable */
fn check_elements(
    desc: &TypeDescriptor,
    classes: &IndexMap<String, SizeClass>,
) -> Result<(), ClassifyError> {
    for field in &desc.fields {
        let mut shape = &field.shape;
        while let Shape::Array { elem, .. } | Shape::List(elem) = shape {
            if field_class(elem, classes) == Some(SizeClass::Fixed(0)) {
                return Err(ClassifyError::ZeroSizedElement {
                    type_name: desc.name.clone(),
                    field: field.name.clone(),
                });
            }
            shape = elem.as_ref();
        }
    }
    Ok(())
}

/* A struct is variable as soon as one field is */
fn type_class(desc: &TypeDescriptor, classes: &IndexMap<String, SizeClass>) -> SizeClass {
    let mut size = 0usize;
    for field in &desc.fields {
        match field_class(&field.shape, classes) {
            Some(SizeClass::Fixed(n)) => size = size.saturating_add(n),
            Some(SizeClass::Variable) | None => return SizeClass::Variable,
        }
    }
    SizeClass::Fixed(size)
}

/// Size class of a field shape. `None` for unsupported shapes and for
/// references to types not yet classified.
pub fn field_class(shape: &Shape, classes: &IndexMap<String, SizeClass>) -> Option<SizeClass> {
    match shape {
        Shape::Scalar(scalar) => Some(SizeClass::Fixed(scalar.size())),
        Shape::ByteArray(len) => Some(SizeClass::Fixed(*len)),
        Shape::BitVector(bits) => Some(SizeClass::Fixed(bits.div_ceil(8))),
        Shape::Array { elem, len } => match field_class(elem, classes)? {
            SizeClass::Fixed(size) => Some(SizeClass::Fixed(size.saturating_mul(*len))),
            SizeClass::Variable => Some(SizeClass::Variable),
        },
        Shape::List(_) | Shape::BitList => Some(SizeClass::Variable),
        Shape::Named(name) => classes.get(name).copied(),
        Shape::Unsupported(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssz_types::ScalarType;
    use std::path::PathBuf;

    fn field(name: &str, shape: Shape) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            rust_type: shape.to_string(),
            shape,
            max: None,
        }
    }

    fn desc(name: &str, fields: Vec<FieldDescriptor>) -> TypeDescriptor {
        TypeDescriptor {
            name: name.to_string(),
            module_path: "crate".to_string(),
            exported: true,
            fields,
        }
    }

    fn package(types: Vec<TypeDescriptor>) -> Package {
        Package {
            name: "demo".to_string(),
            source_root: PathBuf::from("src"),
            types,
        }
    }

    fn named(name: &str) -> Shape {
        Shape::Named(name.to_string())
    }

    fn u64_shape() -> Shape {
        Shape::Scalar(ScalarType::U64)
    }

    #[test]
    fn nested_types_classify_first() {
        let pkg = package(vec![
            desc("Outer", vec![field("inner", named("Inner"))]),
            desc("Inner", vec![field("a", u64_shape()), field("b", Shape::ByteArray(4))]),
        ]);
        let classes = Classifier::new(&pkg).classify_all().unwrap();
        let order: Vec<&str> = classes.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["Inner", "Outer"]);
        assert_eq!(classes["Inner"], SizeClass::Fixed(12));
        assert_eq!(classes["Outer"], SizeClass::Fixed(12));
    }

    #[test]
    fn variability_propagates() {
        let pkg = package(vec![
            desc("Leaf", vec![field("data", Shape::List(Box::new(u64_shape())))]),
            desc(
                "Holder",
                vec![field(
                    "leaves",
                    Shape::Array {
                        elem: Box::new(named("Leaf")),
                        len: 2,
                    },
                )],
            ),
        ]);
        let classes = Classifier::new(&pkg).classify_all().unwrap();
        assert_eq!(classes["Leaf"], SizeClass::Variable);
        assert_eq!(classes["Holder"], SizeClass::Variable);
    }

    #[test]
    fn field_class_policy() {
        let classes = IndexMap::new();
        assert_eq!(
            field_class(&Shape::BitVector(10), &classes),
            Some(SizeClass::Fixed(2))
        );
        assert_eq!(
            field_class(
                &Shape::Array {
                    elem: Box::new(Shape::Scalar(ScalarType::U16)),
                    len: 3
                },
                &classes
            ),
            Some(SizeClass::Fixed(6))
        );
        assert_eq!(field_class(&Shape::BitList, &classes), Some(SizeClass::Variable));
        assert_eq!(field_class(&named("Missing"), &classes), None);
    }

    #[test]
    fn detects_cycle() {
        let pkg = package(vec![
            desc("X", vec![field("y", Shape::List(Box::new(named("Y"))))]),
            desc("Y", vec![field("x", named("X"))]),
        ]);
        assert_eq!(
            Classifier::new(&pkg).classify_all(),
            Err(ClassifyError::CyclicType(vec!["X".to_string(), "Y".to_string()]))
        );
    }

    #[test]
    fn detects_self_reference() {
        let pkg = package(vec![desc(
            "Node",
            vec![field("children", Shape::List(Box::new(named("Node"))))],
        )]);
        assert!(matches!(
            Classifier::new(&pkg).classify_all(),
            Err(ClassifyError::CyclicType(names)) if names == vec!["Node".to_string()]
        ));
    }

    #[test]
    fn reports_unknown_reference() {
        let pkg = package(vec![desc("A", vec![field("b", named("B"))])]);
        assert_eq!(
            Classifier::new(&pkg).classify_all(),
            Err(ClassifyError::UnknownType {
                type_name: "A".to_string(),
                field: "b".to_string(),
                target: "B".to_string(),
            })
        );
    }

    #[test]
    fn reports_unsupported_shape() {
        let pkg = package(vec![desc(
            "A",
            vec![field(
                "m",
                Shape::List(Box::new(Shape::Unsupported("String".to_string()))),
            )],
        )]);
        let err = Classifier::new(&pkg).classify_all().unwrap_err();
        assert_eq!(err.to_string(), "A.m: unsupported field type String");
    }

    #[test]
    fn rejects_max_on_fixed_field() {
        let mut limited = field("a", u64_shape());
        limited.max = Some(4);
        let pkg = package(vec![desc("A", vec![limited])]);
        assert!(matches!(
            Classifier::new(&pkg).classify_all(),
            Err(ClassifyError::MaxOnFixed { .. })
        ));
    }

    #[test]
    fn unreferenced_types_are_not_checked() {
        let pkg = package(vec![
            desc("Good", vec![field("a", u64_shape())]),
            desc(
                "Settings",
                vec![field("name", Shape::Unsupported("String".to_string()))],
            ),
        ]);
        let classifier = Classifier::new(&pkg);
        let roots = vec![&pkg.types[0]];
        let classes = classifier.classify(&roots).unwrap();
        assert_eq!(classes.len(), 1);
        assert!(classifier.classify_all().is_err());
    }

    #[test]
    fn rejects_zero_sized_elements() {
        let empty_list = package(vec![
            desc("Empty", vec![]),
            desc("Holder", vec![field("e", Shape::List(Box::new(named("Empty"))))]),
        ]);
        assert_eq!(
            Classifier::new(&empty_list).classify_all(),
            Err(ClassifyError::ZeroSizedElement {
                type_name: "Holder".to_string(),
                field: "e".to_string(),
            })
        );

        let empty_array = package(vec![
            desc("Empty", vec![]),
            desc(
                "Holder",
                vec![field(
                    "e",
                    Shape::Array {
                        elem: Box::new(named("Empty")),
                        len: 2,
                    },
                )],
            ),
        ]);
        assert!(matches!(
            Classifier::new(&empty_array).classify_all(),
            Err(ClassifyError::ZeroSizedElement { .. })
        ));

        let nested = package(vec![desc(
            "Holder",
            vec![field(
                "e",
                Shape::List(Box::new(Shape::List(Box::new(Shape::ByteArray(0))))),
            )],
        )]);
        assert!(matches!(
            Classifier::new(&nested).classify_all(),
            Err(ClassifyError::ZeroSizedElement { .. })
        ));
    }

    #[test]
    fn empty_struct_as_plain_field_is_accepted() {
        let pkg = package(vec![
            desc("Empty", vec![]),
            desc("Holder", vec![field("e", named("Empty")), field("a", u64_shape())]),
        ]);
        let classes = Classifier::new(&pkg).classify_all().unwrap();
        assert_eq!(classes["Holder"], SizeClass::Fixed(8));
    }

    #[test]
    fn reports_private_reference() {
        let mut hidden = desc("Hidden", vec![field("a", u64_shape())]);
        hidden.exported = false;
        let pkg = package(vec![desc("A", vec![field("b", named("Hidden"))]), hidden]);
        let classifier = Classifier::new(&pkg);
        let roots = vec![&pkg.types[0]];
        assert_eq!(
            classifier.classify(&roots),
            Err(ClassifyError::PrivateType {
                type_name: "A".to_string(),
                field: "b".to_string(),
                target: "Hidden".to_string(),
            })
        );
    }

    #[test]
    fn graph_nodes_record_dependencies() {
        let types = vec![
            desc("A", vec![field("b", named("B")), field("c", named("C"))]),
            desc("B", vec![]),
        ];
        let graph = TypeGraph::build(&types);
        let a = graph.nodes().next().unwrap();
        assert_eq!(a.deps.len(), 2);
    }
}
