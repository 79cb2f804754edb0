//! OpenAPI 3.1 document model
//!
//! Maps are ordered so the generated document is stable across runs.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use ferrule_common::http::HttpMethod;
use ferrule_validation::{StringFormat, TypeDescriptor};

/// Prefix for component schema references
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

/// OpenAPI 3.1 Specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,
    pub info: Info,
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiSpec {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: "3.1.0".to_string(),
            info: Info {
                title: title.into(),
                version: version.into(),
            },
            paths: BTreeMap::new(),
            components: None,
        }
    }

    /// Add a schema to components
    pub fn add_schema(&mut self, name: impl Into<String>, schema: Schema) {
        let components = self.components.get_or_insert_with(Components::default);
        components.schemas.insert(name.into(), schema);
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
}

impl PathItem {
    pub fn set(&mut self, method: HttpMethod, operation: Operation) {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Options => &mut self.options,
        };
        *slot = Some(operation);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Keyed by status code
    pub responses: BTreeMap<String, Response>,
}

impl Operation {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterIn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, location: ParameterIn, schema: Schema) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: false,
            schema: Some(schema),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

/// Where an OpenAPI parameter lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    Query,
    Header,
    Path,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content: BTreeMap<String, MediaType>,
    #[serde(default)]
    pub required: bool,
}

impl RequestBody {
    /// Single `application/json` body
    pub fn json(schema: Schema, required: bool) -> Self {
        let mut content = BTreeMap::new();
        content.insert("application/json".to_string(), MediaType { schema: Some(schema) });
        Self {
            description: None,
            content,
            required,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Schema>,
}

/// JSON Schema (subset for OpenAPI)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    // String constraints
    #[serde(skip_serializing_if = "Option::is_none", rename = "minLength")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "maxLength")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    // Numeric constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "exclusiveMinimum")]
    pub exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "exclusiveMaximum")]
    pub exclusive_maximum: Option<f64>,
    // Array constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "minItems")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "maxItems")]
    pub max_items: Option<usize>,
    // Object constraints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "additionalProperties")]
    pub additional: Option<Box<Schema>>,
    // Composition
    #[serde(skip_serializing_if = "Option::is_none", rename = "oneOf")]
    pub one_of: Option<Vec<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "anyOf")]
    pub any_of: Option<Vec<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "enum")]
    pub enum_values: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "$ref")]
    pub reference: Option<String>,
}

impl Schema {
    pub fn new(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..Default::default()
        }
    }

    pub fn string() -> Self {
        Self::new("string")
    }

    pub fn integer() -> Self {
        Self::new("integer")
    }

    pub fn number() -> Self {
        Self::new("number")
    }

    pub fn boolean() -> Self {
        Self::new("boolean")
    }

    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    pub fn object() -> Self {
        Self::new("object")
    }

    /// `$ref` to a named component schema
    pub fn component(name: &str) -> Self {
        Self::reference(format!("{}{}", COMPONENTS_PREFIX, name))
    }

    pub fn reference(ref_path: impl Into<String>) -> Self {
        Self {
            reference: Some(ref_path.into()),
            ..Default::default()
        }
    }

    /// Discriminated union over `schemas`
    pub fn one_of(schemas: Vec<Schema>) -> Self {
        Self {
            one_of: Some(schemas),
            ..Default::default()
        }
    }

    /// `anyOf: [self, {"type": "null"}]`
    pub fn or_null(self) -> Self {
        Self {
            any_of: Some(vec![self, Self::new("null")]),
            ..Default::default()
        }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn default_value(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// Convert TypeDescriptor to JSON Schema
pub fn type_descriptor_to_schema(desc: &TypeDescriptor) -> Schema {
    match desc {
        TypeDescriptor::String(constraints) => {
            let mut schema = Schema::string();
            schema.min_length = constraints.min_length;
            schema.max_length = constraints.max_length;
            schema.pattern = constraints.pattern.clone();
            schema.format = constraints.format.map(|f: StringFormat| f.as_str().to_string());
            schema
        }
        TypeDescriptor::Int64(constraints) => {
            let mut schema = Schema::integer();
            schema.minimum = constraints.minimum.map(|v| v as f64);
            schema.maximum = constraints.maximum.map(|v| v as f64);
            schema.exclusive_minimum = constraints.exclusive_minimum.map(|v| v as f64);
            schema.exclusive_maximum = constraints.exclusive_maximum.map(|v| v as f64);
            schema
        }
        TypeDescriptor::Float64(constraints) => {
            let mut schema = Schema::number();
            schema.minimum = constraints.minimum;
            schema.maximum = constraints.maximum;
            schema.exclusive_minimum = constraints.exclusive_minimum;
            schema.exclusive_maximum = constraints.exclusive_maximum;
            schema
        }
        TypeDescriptor::Bool => Schema::boolean(),
        TypeDescriptor::Null => Schema::new("null"),
        TypeDescriptor::List { items, constraints } => {
            let mut schema = Schema::array(type_descriptor_to_schema(items));
            schema.min_items = constraints.min_items;
            schema.max_items = constraints.max_items;
            schema
        }
        TypeDescriptor::Object { name, fields, additional } => {
            let mut schema = Schema::object();
            schema.title = name.clone();
            let mut properties = BTreeMap::new();
            let mut required_fields = Vec::new();

            for field in fields {
                let mut field_schema = type_descriptor_to_schema(&field.type_desc);
                if let Some(ref desc) = field.description {
                    field_schema.description = Some(desc.clone());
                }
                if let Some(ref default) = field.default {
                    field_schema.default = Some(default.clone().into());
                }
                properties.insert(field.wire_name().to_string(), field_schema);
                if field.required {
                    required_fields.push(field.wire_name().to_string());
                }
            }

            schema.properties = Some(properties);
            if !required_fields.is_empty() {
                schema.required = Some(required_fields);
            }
            if let Some(ref add_props) = additional {
                schema.additional = Some(Box::new(type_descriptor_to_schema(add_props)));
            }
            schema
        }
        TypeDescriptor::Optional(inner) => type_descriptor_to_schema(inner).or_null(),
        TypeDescriptor::Union { variants, nullable } => {
            let mut any_of: Vec<Schema> = variants.iter().map(type_descriptor_to_schema).collect();
            if *nullable {
                any_of.push(Schema::new("null"));
            }
            Schema {
                any_of: Some(any_of),
                ..Default::default()
            }
        }
        TypeDescriptor::Enum { values } => Schema {
            enum_values: Some(values.iter().map(|v| v.clone().into()).collect()),
            ..Default::default()
        },
        TypeDescriptor::Uuid => Schema::string().format("uuid"),
        TypeDescriptor::Email => Schema::string().format("email"),
        TypeDescriptor::Url => Schema::string().format("uri"),
        TypeDescriptor::DateTime => Schema::string().format("date-time"),
        TypeDescriptor::Date => Schema::string().format("date"),
        TypeDescriptor::Time => Schema::string().format("time"),
        TypeDescriptor::Any => Schema::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_validation::{FieldDescriptor, ListConstraints, NumericConstraints, StringConstraints, Value};

    #[test]
    fn test_openapi_spec_creation() {
        let spec = OpenApiSpec::new("Test API", "v0.0.1");
        assert_eq!(spec.openapi, "3.1.0");
        assert_eq!(spec.info.title, "Test API");
        assert!(spec.paths.is_empty());
    }

    #[test]
    fn test_parameter_serialization() {
        let param = Parameter::new("user_id", ParameterIn::Path, Schema::integer())
            .required(true)
            .description("User identifier");
        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            serde_json::json!({
                "name": "user_id",
                "in": "path",
                "description": "User identifier",
                "required": true,
                "schema": {"type": "integer"}
            })
        );
    }

    #[test]
    fn test_schema_string_constraints() {
        let desc = TypeDescriptor::String(StringConstraints {
            min_length: Some(1),
            max_length: Some(100),
            pattern: Some(r"^[a-z]+$".to_string()),
            format: Some(StringFormat::Email),
        });

        let schema = type_descriptor_to_schema(&desc);

        assert_eq!(schema.schema_type.as_deref(), Some("string"));
        assert_eq!(schema.min_length, Some(1));
        assert_eq!(schema.max_length, Some(100));
        assert_eq!(schema.format.as_deref(), Some("email"));
    }

    #[test]
    fn test_schema_numeric_constraints() {
        let desc = TypeDescriptor::Int64(NumericConstraints {
            minimum: Some(0),
            maximum: Some(100),
            ..Default::default()
        });

        let schema = type_descriptor_to_schema(&desc);

        assert_eq!(schema.schema_type.as_deref(), Some("integer"));
        assert_eq!(schema.minimum, Some(0.0));
        assert_eq!(schema.maximum, Some(100.0));
    }

    #[test]
    fn test_schema_object_uses_wire_names() {
        let desc = TypeDescriptor::object(
            "JobResult",
            vec![
                FieldDescriptor::new("job_date", TypeDescriptor::Date).alias("date"),
                FieldDescriptor::new("id", TypeDescriptor::int()),
                FieldDescriptor::new("note", TypeDescriptor::string()).optional(),
            ],
        );

        let schema = type_descriptor_to_schema(&desc);

        assert_eq!(schema.title.as_deref(), Some("JobResult"));
        let props = schema.properties.as_ref().unwrap();
        assert!(props.contains_key("date"));
        assert!(!props.contains_key("job_date"));
        assert_eq!(schema.required, Some(vec!["date".to_string(), "id".to_string()]));
    }

    #[test]
    fn test_schema_array() {
        let desc = TypeDescriptor::List {
            items: Box::new(TypeDescriptor::string()),
            constraints: ListConstraints {
                min_items: Some(1),
                max_items: Some(10),
            },
        };

        let schema = type_descriptor_to_schema(&desc);

        assert_eq!(schema.schema_type.as_deref(), Some("array"));
        assert!(schema.items.is_some());
        assert_eq!(schema.min_items, Some(1));
    }

    #[test]
    fn test_schema_optional_and_enum() {
        let schema = type_descriptor_to_schema(&TypeDescriptor::optional(TypeDescriptor::string()));
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            serde_json::json!({"anyOf": [{"type": "string"}, {"type": "null"}]})
        );

        let desc = TypeDescriptor::Enum {
            values: vec![Value::String("active".to_string()), Value::String("inactive".to_string())],
        };
        let schema = type_descriptor_to_schema(&desc);
        assert_eq!(schema.enum_values.as_ref().map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_schema_nullable_union() {
        let desc = TypeDescriptor::Union {
            variants: vec![TypeDescriptor::int(), TypeDescriptor::string()],
            nullable: true,
        };
        let json = serde_json::to_value(type_descriptor_to_schema(&desc)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"anyOf": [{"type": "integer"}, {"type": "string"}, {"type": "null"}]})
        );
        assert!(json.get("nullable").is_none());
    }

    #[test]
    fn test_schema_special_formats() {
        let test_cases = vec![
            (TypeDescriptor::Uuid, "uuid"),
            (TypeDescriptor::Email, "email"),
            (TypeDescriptor::Url, "uri"),
            (TypeDescriptor::DateTime, "date-time"),
            (TypeDescriptor::Date, "date"),
            (TypeDescriptor::Time, "time"),
        ];

        for (desc, expected_format) in test_cases {
            let schema = type_descriptor_to_schema(&desc);
            assert_eq!(schema.format.as_deref(), Some(expected_format));
        }
    }

    #[test]
    fn test_one_of_serialization() {
        let schema = Schema::one_of(vec![Schema::component("A"), Schema::component("B")]);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"oneOf": [
                {"$ref": "#/components/schemas/A"},
                {"$ref": "#/components/schemas/B"}
            ]})
        );
    }

    #[test]
    fn test_spec_to_json_and_yaml() {
        let mut spec = OpenApiSpec::new("Test", "v0.0.1");
        let mut operation = Operation::new();
        operation.summary = Some("getUser".to_string());
        spec.paths
            .entry("/users/{id}".to_string())
            .or_default()
            .set(HttpMethod::Get, operation);

        let json = spec.to_json().unwrap();
        assert!(json.contains("getUser"));
        assert!(json.contains("/users/{id}"));

        let yaml = spec.to_yaml().unwrap();
        assert!(yaml.contains("openapi: 3.1.0"));
        assert!(yaml.contains("title: Test"));
    }

    #[test]
    fn test_schema_deserializes_from_json() {
        let schema: Schema = serde_json::from_value(serde_json::json!({
            "type": "string",
            "format": "binary"
        }))
        .unwrap();
        assert_eq!(schema.format.as_deref(), Some("binary"));
    }
}
