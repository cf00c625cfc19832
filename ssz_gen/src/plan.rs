//! Encoding-Plan Synthesis
//!
//! Lays out one struct: every fixed field gets a static byte range in the
//! fixed region, every variable field gets a 4-byte offset slot there, and
//! variable payloads follow the fixed region in field order.

use crate::classifier::field_class;
use indexmap::IndexMap;
use serde_derive::Serialize;
use ssz_types::{Shape, SizeClass, TypeDescriptor};
use thiserror::Error;

/* Width of one offset-table entry */
pub const BYTES_PER_OFFSET: usize = 4;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("{type_name}: fixed region of {size} bytes does not fit 32-bit offsets")]
    FixedRegionTooLarge { type_name: String, size: usize },

    #[error("{type_name}.{field}: field type was not classified")]
    Unclassified { type_name: String, field: String },
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Placement {
    /// Field bytes live at `offset..offset + size` of the fixed region.
    Fixed { offset: usize, size: usize },
    /// The 4-byte offset slot for the field's payload lives at `offset`.
    Variable { slot: usize, offset: usize },
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct PlannedField {
    pub name: String,
    pub rust_type: String,
    #[serde(with = "serde_yml::with::singleton_map_recursive")]
    pub shape: Shape,
    pub placement: Placement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl PlannedField {
    pub fn is_variable(&self) -> bool {
        matches!(self.placement, Placement::Variable { .. })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct EncodingPlan {
    pub type_name: String,
    /* `crate::...` path of the planned type */
    pub type_path: String,
    pub fixed_size: usize,
    pub fields: Vec<PlannedField>,
    /* Indices into `fields` of the variable fields, in slot order */
    pub variable: Vec<usize>,
}

impl EncodingPlan {
    pub fn build(
        desc: &TypeDescriptor,
        classes: &IndexMap<String, SizeClass>,
    ) -> Result<Self, PlanError> {
        let mut cursor = 0usize;
        let mut fields = Vec::with_capacity(desc.fields.len());
        let mut variable = Vec::new();

        for (idx, field) in desc.fields.iter().enumerate() {
            let class =
                field_class(&field.shape, classes).ok_or_else(|| PlanError::Unclassified {
                    type_name: desc.name.clone(),
                    field: field.name.clone(),
                })?;

            let (placement, width) = match class {
                SizeClass::Fixed(size) => (
                    Placement::Fixed {
                        offset: cursor,
                        size,
                    },
                    size,
                ),
                SizeClass::Variable => {
                    let slot = variable.len();
                    variable.push(idx);
                    (
                        Placement::Variable {
                            slot,
                            offset: cursor,
                        },
                        BYTES_PER_OFFSET,
                    )
                }
            };
            cursor = cursor
                .checked_add(width)
                .ok_or_else(|| PlanError::FixedRegionTooLarge {
                    type_name: desc.name.clone(),
                    size: usize::MAX,
                })?;

            fields.push(PlannedField {
                name: field.name.clone(),
                rust_type: field.rust_type.clone(),
                shape: field.shape.clone(),
                placement,
                max: field.max,
            });
        }

        if u32::try_from(cursor).is_err() {
            return Err(PlanError::FixedRegionTooLarge {
                type_name: desc.name.clone(),
                size: cursor,
            });
        }

        let plan = Self {
            type_name: desc.name.clone(),
            type_path: desc.path(),
            fixed_size: cursor,
            fields,
            variable,
        };
        tracing::debug!(
            type_name = %plan.type_name,
            fixed_size = plan.fixed_size,
            variable = plan.variable.len(),
            "built encoding plan"
        );
        Ok(plan)
    }

    /* True when every value of the type encodes to `fixed_size` bytes */
    pub fn is_fixed(&self) -> bool {
        self.variable.is_empty()
    }

    pub fn variable_fields(&self) -> impl Iterator<Item = &PlannedField> {
        self.variable.iter().map(|idx| &self.fields[*idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssz_types::{FieldDescriptor, ScalarType};

    fn field(name: &str, shape: Shape) -> FieldDescriptor {
        FieldDescriptor {
            name: name.to_string(),
            rust_type: shape.to_string(),
            shape,
            max: None,
        }
    }

    fn desc(fields: Vec<FieldDescriptor>) -> TypeDescriptor {
        TypeDescriptor {
            name: "Foo".to_string(),
            module_path: "crate::types".to_string(),
            exported: true,
            fields,
        }
    }

    fn bytes() -> Shape {
        Shape::List(Box::new(Shape::Scalar(ScalarType::U8)))
    }

    #[test]
    fn scenario_layout() {
        let desc = desc(vec![
            field("a", Shape::Scalar(ScalarType::U64)),
            field("b", bytes()),
        ]);
        let plan = EncodingPlan::build(&desc, &IndexMap::new()).unwrap();
        assert_eq!(plan.fixed_size, 12);
        assert_eq!(plan.type_path, "crate::types::Foo");
        assert_eq!(
            plan.fields[0].placement,
            Placement::Fixed { offset: 0, size: 8 }
        );
        assert_eq!(
            plan.fields[1].placement,
            Placement::Variable { slot: 0, offset: 8 }
        );
        assert_eq!(plan.variable, vec![1]);
        assert!(!plan.is_fixed());
    }

    #[test]
    fn slots_interleave_with_fixed_fields() {
        let desc = desc(vec![
            field("x", bytes()),
            field("flag", Shape::Scalar(ScalarType::Bool)),
            field("y", Shape::BitList),
            field("root", Shape::ByteArray(32)),
        ]);
        let plan = EncodingPlan::build(&desc, &IndexMap::new()).unwrap();
        let placements: Vec<Placement> = plan.fields.iter().map(|f| f.placement).collect();
        assert_eq!(
            placements,
            vec![
                Placement::Variable { slot: 0, offset: 0 },
                Placement::Fixed { offset: 4, size: 1 },
                Placement::Variable { slot: 1, offset: 5 },
                Placement::Fixed { offset: 9, size: 32 },
            ]
        );
        assert_eq!(plan.fixed_size, 41);
        let names: Vec<&str> = plan.variable_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn all_fixed_type_has_no_offset_table() {
        let mut classes = IndexMap::new();
        classes.insert("Checkpoint".to_string(), SizeClass::Fixed(40));
        let desc = desc(vec![
            field("epoch", Shape::Scalar(ScalarType::U64)),
            field("source", Shape::Named("Checkpoint".to_string())),
        ]);
        let plan = EncodingPlan::build(&desc, &classes).unwrap();
        assert!(plan.is_fixed());
        assert_eq!(plan.fixed_size, 48);
    }

    #[test]
    fn oversized_fixed_region_is_rejected() {
        let desc = desc(vec![field("huge", Shape::ByteArray(u32::MAX as usize + 1))]);
        assert!(matches!(
            EncodingPlan::build(&desc, &IndexMap::new()),
            Err(PlanError::FixedRegionTooLarge { .. })
        ));
    }

    #[test]
    fn unclassified_reference_is_an_error() {
        let desc = desc(vec![field("other", Shape::Named("Other".to_string()))]);
        assert_eq!(
            EncodingPlan::build(&desc, &IndexMap::new()),
            Err(PlanError::Unclassified {
                type_name: "Foo".to_string(),
                field: "other".to_string(),
            })
        );
    }

    #[test]
    fn plan_serializes_to_yaml() {
        let desc = desc(vec![field("a", Shape::Scalar(ScalarType::U16))]);
        let plan = EncodingPlan::build(&desc, &IndexMap::new()).unwrap();
        let yaml = serde_yml::to_string(&plan).unwrap();
        assert!(yaml.contains("fixed-size: 2"));
        assert!(yaml.contains("kind: fixed"));
    }
}
