//! OpenAPI domain source
//!
//! Turns an OpenAPI 3 document (JSON or YAML) into a [`RuntimeDomain`]:
//! every operation becomes a function, `components.schemas` become types.
//! Local `$ref`s are resolved; header and cookie parameters are not part of
//! the function signature.

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use std::path::PathBuf;
use toolguard_application::{DomainSourceError, DomainSourcePort};
use toolguard_domain::core::string::{python_identifier, to_pascal_case};
use toolguard_domain::{DomainType, Operation, Parameter, RuntimeDomain, TypeRef};
use tracing::{debug, warn};

const METHODS: [&str; 7] = ["get", "put", "post", "delete", "patch", "head", "options"];

/// Response codes tried in order for the operation result
const RESULT_CODES: [&str; 4] = ["200", "201", "2XX", "default"];

const MAX_REF_DEPTH: usize = 32;

static NULL: Value = Value::Null;

/// Parsed OpenAPI document
pub struct OpenApiDocument {
    root: Value,
    path_placeholder: Regex,
}

impl OpenApiDocument {
    /// Parse a JSON or YAML document.
    pub fn parse(content: &str, path: &str) -> Result<Self, DomainSourceError> {
        let parse_error = |message: String| DomainSourceError::Parse {
            path: path.to_string(),
            message,
        };

        // YAML is a superset of JSON, but serde_json gives better errors for JSON input
        let root: Value = if content.trim_start().starts_with('{') {
            serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?
        } else {
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?
        };
        if !root.is_object() || root.get("paths").is_none() {
            return Err(parse_error("document has no `paths` object".to_string()));
        }

        let path_placeholder =
            Regex::new(r"\{([^}]+)\}").map_err(|e| parse_error(e.to_string()))?;
        Ok(Self {
            root,
            path_placeholder,
        })
    }

    /// Follow `$ref` chains until a concrete node is reached.
    fn resolve<'a>(&'a self, mut node: &'a Value) -> &'a Value {
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = node.get("$ref").and_then(Value::as_str) else {
                return node;
            };
            match reference
                .strip_prefix('#')
                .and_then(|pointer| self.root.pointer(pointer))
            {
                Some(target) => node = target,
                None => {
                    warn!("Unresolvable reference {}", reference);
                    return &NULL;
                }
            }
        }
        warn!("Reference chain deeper than {}", MAX_REF_DEPTH);
        &NULL
    }

    /// Name a schema reference points at, if it is a component schema.
    fn ref_name(node: &Value) -> Option<String> {
        node.get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix("#/components/schemas/"))
            .map(to_pascal_case)
    }

    pub fn schema_to_type(&self, schema: &Value) -> TypeRef {
        if let Some(name) = Self::ref_name(schema) {
            return TypeRef::named(name);
        }
        let schema = self.resolve(schema);

        for key in ["anyOf", "oneOf"] {
            if let Some(variants) = schema.get(key).and_then(Value::as_array) {
                let (nulls, others): (Vec<&Value>, Vec<&Value>) = variants
                    .iter()
                    .partition(|v| v.get("type").and_then(Value::as_str) == Some("null"));
                return match others.as_slice() {
                    [single] if !nulls.is_empty() => TypeRef::optional(self.schema_to_type(single)),
                    [single] => self.schema_to_type(single),
                    _ => TypeRef::Any,
                };
            }
        }

        let base = match schema.get("type").and_then(Value::as_str) {
            Some("string") => TypeRef::Str,
            Some("integer") => TypeRef::Int,
            Some("number") => TypeRef::Float,
            Some("boolean") => TypeRef::Bool,
            Some("array") => TypeRef::list(
                schema
                    .get("items")
                    .map(|items| self.schema_to_type(items))
                    .unwrap_or(TypeRef::Any),
            ),
            Some("object") => match schema.get("additionalProperties") {
                Some(values @ Value::Object(_)) => TypeRef::dict(self.schema_to_type(values)),
                _ => TypeRef::dict(TypeRef::Any),
            },
            _ => TypeRef::Any,
        };

        if schema.get("nullable").and_then(Value::as_bool) == Some(true) {
            TypeRef::optional(base)
        } else {
            base
        }
    }

    fn description(node: &Value) -> String {
        node.get("summary")
            .or_else(|| node.get("description"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    fn operation_name(&self, method: &str, path: &str, operation: &Value) -> String {
        if let Some(id) = operation.get("operationId").and_then(Value::as_str) {
            return python_identifier(id);
        }
        let slug = self.path_placeholder.replace_all(path, "by_$1");
        python_identifier(&format!("{method}_{slug}"))
    }

    fn parameter(&self, node: &Value) -> Option<Parameter> {
        let node = self.resolve(node);
        let location = node.get("in").and_then(Value::as_str).unwrap_or("query");
        if matches!(location, "header" | "cookie") {
            return None;
        }
        let name = node.get("name").and_then(Value::as_str)?;
        let type_ref = node
            .get("schema")
            .map(|schema| self.schema_to_type(schema))
            .unwrap_or(TypeRef::Any);
        let required = location == "path" || node.get("required").and_then(Value::as_bool) == Some(true);

        let identifier = python_identifier(name);
        let parameter = if required {
            Parameter::required(identifier, type_ref)
        } else {
            Parameter::optional(identifier, TypeRef::optional(type_ref))
        };
        Some(parameter.with_description(Self::description(node)))
    }

    fn body_parameters(&self, operation: &Value) -> Vec<Parameter> {
        let Some(body) = operation.get("requestBody").map(|b| self.resolve(b)) else {
            return Vec::new();
        };
        let required = body.get("required").and_then(Value::as_bool) == Some(true);
        let Some(schema) = body.pointer("/content/application~1json/schema") else {
            return vec![Parameter::required("body", TypeRef::Any)];
        };

        let resolved = self.resolve(schema);
        let properties = resolved.get("properties").and_then(Value::as_object);
        match properties {
            Some(properties) if !properties.is_empty() => {
                self.properties_to_fields(resolved, properties)
            }
            _ => {
                let type_ref = self.schema_to_type(schema);
                if required {
                    vec![Parameter::required("body", type_ref)]
                } else {
                    vec![Parameter::optional("body", TypeRef::optional(type_ref))]
                }
            }
        }
    }

    fn properties_to_fields(&self, schema: &Value, properties: &Map<String, Value>) -> Vec<Parameter> {
        let required: Vec<&str> = schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        properties
            .iter()
            .map(|(name, property)| {
                let type_ref = self.schema_to_type(property);
                let identifier = python_identifier(name);
                let field = if required.contains(&name.as_str()) {
                    Parameter::required(identifier, type_ref)
                } else {
                    Parameter::optional(identifier, TypeRef::optional(type_ref))
                };
                field.with_description(Self::description(self.resolve(property)))
            })
            .collect()
    }

    fn result_type(&self, operation: &Value) -> TypeRef {
        let Some(responses) = operation.get("responses") else {
            return TypeRef::NoneType;
        };
        RESULT_CODES
            .iter()
            .filter_map(|code| responses.get(*code))
            .find_map(|response| {
                self.resolve(response)
                    .pointer("/content/application~1json/schema")
                    .map(|schema| self.schema_to_type(schema))
            })
            .unwrap_or(TypeRef::NoneType)
    }

    pub fn operations(&self) -> Vec<Operation> {
        let Some(paths) = self.root.get("paths").and_then(Value::as_object) else {
            return Vec::new();
        };

        let mut operations = Vec::new();
        for (path, item) in paths {
            let item = self.resolve(item);
            let shared: Vec<&Value> = item
                .get("parameters")
                .and_then(Value::as_array)
                .map(|p| p.iter().collect())
                .unwrap_or_default();

            for method in METHODS {
                let Some(node) = item.get(method) else {
                    continue;
                };
                let name = self.operation_name(method, path, node);
                let mut operation =
                    Operation::new(&name, self.result_type(node)).with_description(Self::description(node));

                // Operation-level parameters override path-level ones with the same name
                let own: Vec<&Value> = node
                    .get("parameters")
                    .and_then(Value::as_array)
                    .map(|p| p.iter().collect())
                    .unwrap_or_default();
                let mut parameters: Vec<Parameter> = Vec::new();
                for parameter in shared.iter().chain(own.iter()).filter_map(|p| self.parameter(p)) {
                    parameters.retain(|existing| existing.name != parameter.name);
                    parameters.push(parameter);
                }
                for mut field in self.body_parameters(node) {
                    // Body fields shadowed by a path or query parameter get a `body_` prefix
                    if parameters.iter().any(|p| p.name == field.name) {
                        field.name = format!("body_{}", field.name);
                    }
                    if parameters.iter().any(|p| p.name == field.name) {
                        warn!(
                            "{} {}: dropping body field {} clashing with a parameter",
                            method, path, field.name
                        );
                        continue;
                    }
                    parameters.push(field);
                }

                for parameter in parameters {
                    operation = operation.with_parameter(parameter);
                }
                debug!("{} {} -> {}", method.to_uppercase(), path, name);
                operations.push(operation);
            }
        }
        operations
    }

    pub fn types(&self) -> Vec<DomainType> {
        let Some(schemas) = self
            .root
            .pointer("/components/schemas")
            .and_then(Value::as_object)
        else {
            return Vec::new();
        };

        schemas
            .iter()
            .map(|(name, schema)| {
                let name = to_pascal_case(name);
                let resolved = self.resolve(schema);
                let domain_type = match resolved.get("properties").and_then(Value::as_object) {
                    Some(properties) => {
                        DomainType::record(&name, self.properties_to_fields(resolved, properties))
                    }
                    None => DomainType::alias(&name, self.schema_to_type(schema)),
                };
                domain_type.with_description(Self::description(resolved))
            })
            .collect()
    }

    pub fn into_domain(self, app_name: &str) -> Result<RuntimeDomain, DomainSourceError> {
        let operations = self.operations();
        if operations.is_empty() {
            return Err(DomainSourceError::NoOperations);
        }
        Ok(RuntimeDomain::assemble(app_name, operations, self.types())?)
    }
}

/// Domain source reading an OpenAPI document
pub struct OpenApiSource {
    path: PathBuf,
}

impl OpenApiSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DomainSourcePort for OpenApiSource {
    fn describe(&self) -> String {
        format!("OpenAPI document {}", self.path.display())
    }

    async fn load(&self, app_name: &str) -> Result<RuntimeDomain, DomainSourceError> {
        let path = self.path.display().to_string();
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DomainSourceError::Read {
                path: path.clone(),
                message: e.to_string(),
            })?;
        OpenApiDocument::parse(&content, &path)?.into_domain(app_name)
    }
}
