//! API surface entities
//!
//! The [`RuntimeDomain`] enumerates every operation generated code may call,
//! together with the record types those operations exchange. It is built
//! once per run by a domain source adapter and shared read-only by all
//! guard generators.

use super::stubs;
use super::type_ref::TypeRef;
use crate::core::error::DomainError;
use crate::core::string::{to_pascal_case, to_snake_case};
use crate::files::FileTwin;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named input of an operation, or a field of a record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_ref: TypeRef,
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Parameter {
    pub fn required(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            required: true,
            description: String::new(),
        }
    }

    pub fn optional(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            required: false,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Python annotation, widened to `Optional` for non-required values.
    pub fn annotation(&self) -> String {
        if self.required {
            self.type_ref.to_python()
        } else {
            TypeRef::optional(self.type_ref.clone()).to_python()
        }
    }
}

/// One callable operation of the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub result: TypeRef,
}

impl Operation {
    pub fn new(name: impl Into<String>, result: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameters: Vec::new(),
            result,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Parameters with required ones first, preserving declared order otherwise.
    pub fn ordered_parameters(&self) -> Vec<&Parameter> {
        let (required, optional): (Vec<_>, Vec<_>) =
            self.parameters.iter().partition(|p| p.required);
        required.into_iter().chain(optional).collect()
    }
}

/// What a [`DomainType`] declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainTypeKind {
    Record { fields: Vec<Parameter> },
    Alias { target: TypeRef },
}

/// A named type exchanged by operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainType {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub kind: DomainTypeKind,
}

impl DomainType {
    pub fn record(name: impl Into<String>, fields: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind: DomainTypeKind::Record { fields },
        }
    }

    pub fn alias(name: impl Into<String>, target: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            kind: DomainTypeKind::Alias { target },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// The callable surface available to generated guards and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeDomain {
    pub app_name: String,
    /// Name of the `Protocol` class exposing the operations
    pub api_class_name: String,
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub types: Vec<DomainType>,
    /// `PolicyViolationException` and other shared runtime support
    pub common_file: FileTwin,
    pub types_file: FileTwin,
    pub api_file: FileTwin,
}

impl RuntimeDomain {
    /// Build the domain and render its Python stub files.
    pub fn assemble(
        app_name: impl Into<String>,
        operations: Vec<Operation>,
        types: Vec<DomainType>,
    ) -> Result<Self, DomainError> {
        let app_name = app_name.into();
        if operations.is_empty() {
            return Err(DomainError::EmptyDomain);
        }

        let mut seen = HashSet::new();
        for op in &operations {
            if !seen.insert(op.name.as_str()) {
                return Err(DomainError::DuplicateOperation(op.name.clone()));
            }
            let mut parameters = HashSet::new();
            for parameter in &op.parameters {
                if !parameters.insert(parameter.name.as_str()) {
                    return Err(DomainError::DuplicateParameter {
                        operation: op.name.clone(),
                        parameter: parameter.name.clone(),
                    });
                }
            }
        }

        let package = to_snake_case(&app_name);
        let api_class_name = format!("{}Api", to_pascal_case(&app_name));

        let common_file = FileTwin::new(
            format!("{package}/{}.py", stubs::COMMON_MODULE),
            stubs::render_common(),
        );
        let types_file = FileTwin::new(
            format!("{package}/{}.py", stubs::TYPES_MODULE),
            stubs::render_types(&app_name, &types),
        );
        let api_file = FileTwin::new(
            format!("{package}/{}.py", stubs::API_MODULE),
            stubs::render_api(&app_name, &package, &api_class_name, &operations, &types),
        );

        Ok(Self {
            app_name,
            api_class_name,
            operations,
            types,
            common_file,
            types_file,
            api_file,
        })
    }

    /// Python package all generated code lives in.
    pub fn package_name(&self) -> String {
        to_snake_case(&self.app_name)
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Dotted module path of a stub module (`"domain_api"` -> `"bank.domain_api"`).
    pub fn module_path(&self, module: &str) -> String {
        format!("{}.{module}", self.package_name())
    }

    pub fn stub_files(&self) -> [&FileTwin; 3] {
        [&self.common_file, &self.types_file, &self.api_file]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> Operation {
        Operation::new("transfer", TypeRef::named("Receipt"))
            .with_description("Move money between accounts")
            .with_parameter(Parameter::optional("memo", TypeRef::Str))
            .with_parameter(Parameter::required("amount", TypeRef::Float))
    }

    #[test]
    fn test_assemble_renders_stub_files() {
        let domain = RuntimeDomain::assemble(
            "Retail Bank",
            vec![transfer()],
            vec![DomainType::record(
                "Receipt",
                vec![Parameter::required("id", TypeRef::Str)],
            )],
        )
        .unwrap();

        assert_eq!(domain.package_name(), "retail_bank");
        assert_eq!(domain.api_class_name, "RetailBankApi");
        assert_eq!(domain.api_file.file_name, "retail_bank/domain_api.py");
        assert_eq!(domain.types_file.file_name, "retail_bank/domain_types.py");
        assert_eq!(domain.common_file.file_name, "retail_bank/toolguard_common.py");
        assert!(domain.api_file.content.contains("class RetailBankApi(Protocol):"));
        assert_eq!(domain.module_path("domain_api"), "retail_bank.domain_api");
    }

    #[test]
    fn test_assemble_rejects_empty_domain() {
        let err = RuntimeDomain::assemble("bank", vec![], vec![]).unwrap_err();
        assert!(matches!(err, DomainError::EmptyDomain));
    }

    #[test]
    fn test_assemble_rejects_duplicate_operations() {
        let err = RuntimeDomain::assemble("bank", vec![transfer(), transfer()], vec![])
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateOperation(name) if name == "transfer"));
    }

    #[test]
    fn test_assemble_rejects_duplicate_parameters() {
        let op = Operation::new("update_order", TypeRef::NoneType)
            .with_parameter(Parameter::required("id", TypeRef::Str))
            .with_parameter(Parameter::optional("id", TypeRef::optional(TypeRef::Str)));
        let err = RuntimeDomain::assemble("shop", vec![op], vec![]).unwrap_err();
        assert!(matches!(
            err,
            DomainError::DuplicateParameter { ref operation, ref parameter }
                if operation == "update_order" && parameter == "id"
        ));
    }

    #[test]
    fn test_ordered_parameters_puts_required_first() {
        let op = transfer();
        let names: Vec<_> = op.ordered_parameters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["amount", "memo"]);
    }

    #[test]
    fn test_operation_lookup() {
        let domain = RuntimeDomain::assemble("bank", vec![transfer()], vec![]).unwrap();
        assert!(domain.operation("transfer").is_some());
        assert!(domain.operation("refund").is_none());
    }

    #[test]
    fn test_domain_type_serde_shape() {
        let alias = DomainType::alias("AccountId", TypeRef::Str);
        let json = serde_json::to_value(&alias).unwrap();
        assert_eq!(json["kind"], "alias");
        assert_eq!(json["target"], "str");
    }
}
