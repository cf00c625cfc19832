use ssz_types::{Package, TypeDescriptor};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("no type {type_name} in package {package}")]
    NotFound { package: String, type_name: String },

    #[error("type {type_name} in package {package} is not exported")]
    NotExported { package: String, type_name: String },
}

/* Pick the types to generate for: one named type, or every exported struct in declaration order */
pub fn select<'a>(
    package: &'a Package,
    type_name: Option<&str>,
) -> Result<Vec<&'a TypeDescriptor>, SelectError> {
    let Some(type_name) = type_name else {
        return Ok(package.types.iter().filter(|t| t.exported).collect());
    };

    let desc = package.get(type_name).ok_or_else(|| SelectError::NotFound {
        package: package.name.clone(),
        type_name: type_name.to_string(),
    })?;
    if !desc.exported {
        return Err(SelectError::NotExported {
            package: package.name.clone(),
            type_name: type_name.to_string(),
        });
    }
    Ok(vec![desc])
}
