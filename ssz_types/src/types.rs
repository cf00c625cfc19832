use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
}

impl ScalarType {
    /* Map a primitive type identifier to its scalar type */
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "bool" => Some(ScalarType::Bool),
            "u8" => Some(ScalarType::U8),
            "u16" => Some(ScalarType::U16),
            "u32" => Some(ScalarType::U32),
            "u64" => Some(ScalarType::U64),
            "u128" => Some(ScalarType::U128),
            _ => None,
        }
    }

    /* Encoded width in bytes */
    pub fn size(self) -> usize {
        match self {
            ScalarType::Bool | ScalarType::U8 => 1,
            ScalarType::U16 => 2,
            ScalarType::U32 => 4,
            ScalarType::U64 => 8,
            ScalarType::U128 => 16,
        }
    }

    pub fn rust_name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
            ScalarType::U128 => "u128",
        }
    }
}

/// Declared shape of a field, as seen by the loader.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    Scalar(ScalarType),
    /// `[u8; N]`
    ByteArray(usize),
    /// `[T; N]` for any `T` other than `u8`
    Array { elem: Box<Shape>, len: usize },
    /// `Vec<T>`
    List(Box<Shape>),
    /// `BitVector<N>`
    BitVector(usize),
    BitList,
    /// Another struct declared in the same package
    Named(String),
    /// Anything the loader could not map; carries a description of the declared type.
    Unsupported(String),
}

impl Shape {
    /* True for shapes that accept an element limit */
    pub fn is_limitable(&self) -> bool {
        matches!(self, Shape::List(_) | Shape::BitList)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar(scalar) => write!(f, "{}", scalar.rust_name()),
            Shape::ByteArray(len) => write!(f, "[u8; {}]", len),
            Shape::Array { elem, len } => write!(f, "[{}; {}]", elem, len),
            Shape::List(elem) => write!(f, "Vec<{}>", elem),
            Shape::BitVector(len) => write!(f, "BitVector<{}>", len),
            Shape::BitList => write!(f, "BitList"),
            Shape::Named(name) => write!(f, "{}", name),
            Shape::Unsupported(desc) => write!(f, "{}", desc),
        }
    }
}

/// Encoded size class of a field or type.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum SizeClass {
    Fixed(usize),
    Variable,
}

impl SizeClass {
    pub fn is_fixed(&self) -> bool {
        matches!(self, SizeClass::Fixed(_))
    }

    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            SizeClass::Fixed(size) => Some(*size),
            SizeClass::Variable => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct FieldDescriptor {
    pub name: String,
    /* Declared type as source text, used verbatim by emitted code */
    pub rust_type: String,
    #[serde(with = "serde_yml::with::singleton_map_recursive")]
    pub shape: Shape,
    /* Element limit from `#[ssz(max = N)]` */
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct TypeDescriptor {
    pub name: String,
    /* Module the type is declared in, e.g. `crate::beacon::block` */
    pub module_path: String,
    /* Reachable from a sibling module (any `pub` visibility) */
    pub exported: bool,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /* Fully qualified path usable in a `use` declaration */
    pub fn path(&self) -> String {
        format!("{}::{}", self.module_path, self.name)
    }
}

/// Every struct declaration of one package, in declaration order.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Package {
    pub name: String,
    pub source_root: PathBuf,
    pub types: Vec<TypeDescriptor>,
}

impl Package {
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.iter().find(|t| t.name == name)
    }
}
