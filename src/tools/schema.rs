//! Tool descriptors and their JSON-schema rendering.

use serde_json::{json, Map, Value};

/// JSON-schema primitive type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

/// One named parameter of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub description: &'static str,
    pub enum_values: Option<&'static [&'static str]>,
    pub required: bool,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            enum_values: None,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            enum_values: None,
            required: false,
        }
    }

    /// Restrict a string parameter to a fixed set of values.
    pub const fn one_of(self, values: &'static [&'static str]) -> Self {
        Self {
            enum_values: Some(values),
            ..self
        }
    }
}

/// A named, schema-described callable the model may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolDescriptor {
    /// Render the parameter list as a JSON-schema object.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in self.params {
            let mut prop = json!({
                "type": param.kind.as_str(),
                "description": param.description,
            });
            if let Some(values) = param.enum_values {
                prop["enum"] = json!(values);
            }
            properties.insert(param.name.to_string(), prop);
        }

        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    pub fn required_params(&self) -> impl Iterator<Item = &'static ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS_VALUES: &[&str] = &["pending", "completed"];

    const SAMPLE: ToolDescriptor = ToolDescriptor {
        name: "sample",
        description: "A sample tool",
        params: &[
            ParamSpec::required("amount", ParamType::Number, "How much"),
            ParamSpec::optional("status", ParamType::String, "State").one_of(STATUS_VALUES),
        ],
    };

    #[test]
    fn schema_lists_properties_and_required() {
        let schema = SAMPLE.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["amount"]["type"], "number");
        assert_eq!(
            schema["properties"]["status"]["enum"],
            json!(["pending", "completed"])
        );
        assert_eq!(schema["required"], json!(["amount"]));
    }

    #[test]
    fn parameterless_schema_omits_required() {
        let tool = ToolDescriptor {
            name: "noop",
            description: "Nothing",
            params: &[],
        };
        let schema = tool.parameters_schema();
        assert_eq!(schema["properties"], json!({}));
        assert!(schema.get("required").is_none());
    }
}
