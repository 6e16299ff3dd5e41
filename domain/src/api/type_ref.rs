//! Type references for operation parameters, results and record fields.
//!
//! A [`TypeRef`] is the language-neutral shape of a value in the API surface.
//! It renders to a Python annotation for the generated stubs and parses back
//! from the annotation syntax used in function descriptors, so it serializes
//! as that string.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape of a value crossing the API boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    Str,
    Int,
    Float,
    Bool,
    Any,
    NoneType,
    List(Box<TypeRef>),
    /// Mapping with string keys
    Dict(Box<TypeRef>),
    Optional(Box<TypeRef>),
    /// Reference to a [`DomainType`](super::entities::DomainType) by name
    Named(String),
}

impl TypeRef {
    pub fn list(item: TypeRef) -> Self {
        TypeRef::List(Box::new(item))
    }

    pub fn dict(value: TypeRef) -> Self {
        TypeRef::Dict(Box::new(value))
    }

    /// Wrap in `Optional`, without nesting an already optional type.
    pub fn optional(inner: TypeRef) -> Self {
        match inner {
            TypeRef::Optional(_) | TypeRef::NoneType | TypeRef::Any => inner,
            other => TypeRef::Optional(Box::new(other)),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeRef::Optional(_) | TypeRef::NoneType | TypeRef::Any)
    }

    /// Render as a Python type annotation.
    pub fn to_python(&self) -> String {
        match self {
            TypeRef::Str => "str".to_string(),
            TypeRef::Int => "int".to_string(),
            TypeRef::Float => "float".to_string(),
            TypeRef::Bool => "bool".to_string(),
            TypeRef::Any => "Any".to_string(),
            TypeRef::NoneType => "None".to_string(),
            TypeRef::List(item) => format!("List[{}]", item.to_python()),
            TypeRef::Dict(value) => format!("Dict[str, {}]", value.to_python()),
            TypeRef::Optional(inner) => format!("Optional[{}]", inner.to_python()),
            TypeRef::Named(name) => name.clone(),
        }
    }

    /// Collect every named type this reference mentions.
    pub fn named_types(&self) -> Vec<&str> {
        match self {
            TypeRef::Named(name) => vec![name.as_str()],
            TypeRef::List(inner) | TypeRef::Dict(inner) | TypeRef::Optional(inner) => {
                inner.named_types()
            }
            _ => Vec::new(),
        }
    }

    /// Parse a Python-style annotation.
    ///
    /// Unions other than `T | None` degrade to `Any`.
    pub fn parse(expr: &str) -> Result<Self, DomainError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(DomainError::InvalidType("empty type expression".to_string()));
        }

        let parts = split_top_level(expr, '|')?;
        if parts.len() > 1 {
            let concrete: Vec<&str> = parts
                .iter()
                .map(|p| p.trim())
                .filter(|p| *p != "None")
                .collect();
            let has_none = concrete.len() < parts.len();
            if concrete.len() != 1 {
                return Ok(TypeRef::Any);
            }
            let inner = Self::parse(concrete[0])?;
            return Ok(if has_none { Self::optional(inner) } else { inner });
        }

        if let Some(open) = expr.find('[') {
            if !expr.ends_with(']') {
                return Err(DomainError::InvalidType(expr.to_string()));
            }
            let head = expr[..open].trim();
            let args = split_top_level(&expr[open + 1..expr.len() - 1], ',')?;
            let last = args
                .last()
                .ok_or_else(|| DomainError::InvalidType(expr.to_string()))?;

            return match head {
                "list" | "List" | "Sequence" | "Iterable" | "set" | "Set" => {
                    Ok(Self::list(Self::parse(last)?))
                }
                "dict" | "Dict" | "Mapping" => Ok(Self::dict(Self::parse(last)?)),
                "Optional" => Ok(Self::optional(Self::parse(last)?)),
                _ => Err(DomainError::InvalidType(expr.to_string())),
            };
        }

        Ok(match expr {
            "str" | "string" => TypeRef::Str,
            "int" | "integer" => TypeRef::Int,
            "float" | "number" => TypeRef::Float,
            "bool" | "boolean" => TypeRef::Bool,
            "Any" | "any" | "object" => TypeRef::Any,
            "None" | "null" => TypeRef::NoneType,
            "list" | "List" => Self::list(TypeRef::Any),
            "dict" | "Dict" => Self::dict(TypeRef::Any),
            name if is_identifier(name) => TypeRef::Named(name.to_string()),
            _ => return Err(DomainError::InvalidType(expr.to_string())),
        })
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_python())
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_python()
    }
}

impl TryFrom<String> for TypeRef {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TypeRef::parse(&value)
    }
}

impl std::str::FromStr for TypeRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeRef::parse(s)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Split on `sep` outside of brackets.
fn split_top_level(s: &str, sep: char) -> Result<Vec<&str>, DomainError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| DomainError::InvalidType(s.to_string()))?;
            }
            c if c == sep && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(DomainError::InvalidType(s.to_string()));
    }
    parts.push(s[start..].trim());
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitives() {
        assert_eq!(TypeRef::parse("str").unwrap(), TypeRef::Str);
        assert_eq!(TypeRef::parse("integer").unwrap(), TypeRef::Int);
        assert_eq!(TypeRef::parse(" float ").unwrap(), TypeRef::Float);
        assert_eq!(TypeRef::parse("None").unwrap(), TypeRef::NoneType);
        assert_eq!(TypeRef::parse("Order").unwrap(), TypeRef::named("Order"));
    }

    #[test]
    fn test_parse_generics() {
        assert_eq!(
            TypeRef::parse("list[Order]").unwrap(),
            TypeRef::list(TypeRef::named("Order"))
        );
        assert_eq!(
            TypeRef::parse("Dict[str, List[int]]").unwrap(),
            TypeRef::dict(TypeRef::list(TypeRef::Int))
        );
        assert_eq!(
            TypeRef::parse("Optional[str]").unwrap(),
            TypeRef::optional(TypeRef::Str)
        );
    }

    #[test]
    fn test_parse_unions() {
        assert_eq!(
            TypeRef::parse("str | None").unwrap(),
            TypeRef::optional(TypeRef::Str)
        );
        assert_eq!(TypeRef::parse("int | str").unwrap(), TypeRef::Any);
        assert_eq!(
            TypeRef::parse("list[int | None]").unwrap(),
            TypeRef::list(TypeRef::optional(TypeRef::Int))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TypeRef::parse("").is_err());
        assert!(TypeRef::parse("list[int").is_err());
        assert!(TypeRef::parse("Tuple[int, str]").is_err());
        assert!(TypeRef::parse("not a type").is_err());
    }

    #[test]
    fn test_optional_does_not_nest() {
        let once = TypeRef::optional(TypeRef::Int);
        assert_eq!(TypeRef::optional(once.clone()), once);
        assert_eq!(TypeRef::optional(TypeRef::Any), TypeRef::Any);
    }

    #[test]
    fn test_to_python_roundtrips_through_serde() {
        let ty = TypeRef::dict(TypeRef::list(TypeRef::optional(TypeRef::named("Seat"))));
        assert_eq!(ty.to_python(), "Dict[str, List[Optional[Seat]]]");

        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, "\"Dict[str, List[Optional[Seat]]]\"");
        let back: TypeRef = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }

    #[test]
    fn test_named_types() {
        let ty = TypeRef::list(TypeRef::optional(TypeRef::named("Seat")));
        assert_eq!(ty.named_types(), vec!["Seat"]);
        assert!(TypeRef::Int.named_types().is_empty());
    }
}
