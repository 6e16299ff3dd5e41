//! Function list domain source
//!
//! Reads a JSON descriptor of the callable functions of an application:
//!
//! ```json
//! {
//!   "modules": ["bank"],
//!   "types": [
//!     {"kind": "record", "name": "Receipt", "fields": [{"name": "id", "type": "str"}]}
//!   ],
//!   "functions": [
//!     {
//!       "name": "transfer",
//!       "module": "bank.payments",
//!       "description": "Move money between accounts",
//!       "parameters": [{"name": "amount", "type": "float"}],
//!       "returns": "Receipt"
//!     }
//!   ]
//! }
//! ```
//!
//! Every function must live in one of the declared top-level modules.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use toolguard_application::{DomainSourceError, DomainSourcePort};
use toolguard_domain::{DomainType, Operation, Parameter, RuntimeDomain, TypeRef};
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

fn default_required() -> bool {
    true
}

impl ParameterDescriptor {
    fn to_parameter(&self) -> Parameter {
        let parameter = if self.required {
            Parameter::required(&self.name, self.type_ref.clone())
        } else {
            Parameter::optional(&self.name, self.type_ref.clone())
        };
        parameter.with_description(&self.description)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    /// Dotted module path the function is defined in
    pub module: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(default = "default_returns")]
    pub returns: TypeRef,
}

fn default_returns() -> TypeRef {
    TypeRef::NoneType
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    Record {
        name: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        fields: Vec<ParameterDescriptor>,
    },
    Alias {
        name: String,
        #[serde(default)]
        description: String,
        target: TypeRef,
    },
}

impl TypeDescriptor {
    fn to_domain_type(&self) -> DomainType {
        match self {
            TypeDescriptor::Record {
                name,
                description,
                fields,
            } => DomainType::record(name, fields.iter().map(ParameterDescriptor::to_parameter).collect())
                .with_description(description),
            TypeDescriptor::Alias {
                name,
                description,
                target,
            } => DomainType::alias(name, target.clone()).with_description(description),
        }
    }
}

/// Parsed function list descriptor
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionListDescriptor {
    /// Top-level module names the functions belong to
    pub modules: Vec<String>,
    pub functions: Vec<FunctionDescriptor>,
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
}

impl FunctionListDescriptor {
    /// Build the domain, rejecting empty lists and undeclared modules.
    pub fn into_domain(self, app_name: &str) -> Result<RuntimeDomain, DomainSourceError> {
        if self.functions.is_empty() {
            return Err(DomainSourceError::EmptyFunctionList);
        }

        let mut operations = Vec::with_capacity(self.functions.len());
        for function in &self.functions {
            let top_level = function.module.split('.').next().unwrap_or_default();
            if !self.modules.iter().any(|m| m == top_level) {
                return Err(DomainSourceError::UndeclaredModule {
                    function: format!("{}.{}", function.module, function.name),
                    declared: self.modules.join(", "),
                });
            }

            let mut operation = Operation::new(&function.name, function.returns.clone())
                .with_description(&function.description);
            for parameter in &function.parameters {
                operation = operation.with_parameter(parameter.to_parameter());
            }
            operations.push(operation);
        }

        let types = self.types.iter().map(TypeDescriptor::to_domain_type).collect();
        Ok(RuntimeDomain::assemble(app_name, operations, types)?)
    }
}

/// Domain source reading a function list descriptor file
pub struct FunctionListSource {
    path: PathBuf,
}

impl FunctionListSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(content: &str, path: &str) -> Result<FunctionListDescriptor, DomainSourceError> {
        serde_json::from_str(content).map_err(|e| DomainSourceError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl DomainSourcePort for FunctionListSource {
    fn describe(&self) -> String {
        format!("function list {}", self.path.display())
    }

    async fn load(&self, app_name: &str) -> Result<RuntimeDomain, DomainSourceError> {
        let path = self.path.display().to_string();
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DomainSourceError::Read {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let descriptor = Self::parse(&content, &path)?;
        debug!(
            "{} declares {} functions in modules {:?}",
            path,
            descriptor.functions.len(),
            descriptor.modules
        );
        descriptor.into_domain(app_name)
    }
}
