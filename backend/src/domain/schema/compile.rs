//! Compilation and evaluation of the supported JSON-Schema subset.
//!
//! Supported keywords: `type`, `properties`, `required`,
//! `additionalProperties` (boolean), `items` (single schema), `minItems`,
//! `maxItems`, `minLength`, `maxLength`, `minimum`. Annotation keywords
//! (`$schema`, `title`, `description`) are ignored; anything else is a
//! compile error so typos in a schema surface as defects instead of silently
//! relaxing validation.

use serde_json::{Map, Value};

use crate::domain::{Rejection, Violation};

const ANNOTATIONS: &[&str] = &["$schema", "title", "description"];

/// Reasons a schema document fails to compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaCompileError {
    /// The document is not JSON.
    #[error("schema document is not valid JSON: {message}")]
    Json { message: String },
    /// No document was supplied for the schema.
    #[error("schema document is missing")]
    Missing,
    /// A keyword is malformed or unsupported.
    #[error("{pointer}: {reason}")]
    Invalid { pointer: String, reason: String },
}

fn invalid(pointer: &str, reason: impl Into<String>) -> SchemaCompileError {
    SchemaCompileError::Invalid {
        pointer: display_pointer(pointer),
        reason: reason.into(),
    }
}

fn display_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_owned()
    } else {
        pointer.to_owned()
    }
}

/// Compiled schema node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Any,
    Boolean,
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Number {
        minimum: Option<f64>,
    },
    Integer {
        minimum: Option<i64>,
    },
    Array {
        items: Box<Node>,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },
    Object {
        properties: Vec<(String, Node)>,
        required: Vec<String>,
        additional: bool,
    },
}

/// Parse and compile a schema document.
pub(crate) fn compile_document(document: &str) -> Result<Node, SchemaCompileError> {
    let value: Value = serde_json::from_str(document).map_err(|error| SchemaCompileError::Json {
        message: error.to_string(),
    })?;
    compile(&value, "")
}

fn compile(schema: &Value, pointer: &str) -> Result<Node, SchemaCompileError> {
    let Some(keywords) = schema.as_object() else {
        return Err(invalid(pointer, "schema must be an object"));
    };
    let node = match keywords.get("type") {
        None => Node::Any,
        Some(Value::String(kind)) => compile_typed(kind, keywords, pointer)?,
        Some(_) => return Err(invalid(pointer, "type must be a string")),
    };
    reject_unknown_keywords(&node, keywords, pointer)?;
    Ok(node)
}

fn compile_typed(
    kind: &str,
    keywords: &Map<String, Value>,
    pointer: &str,
) -> Result<Node, SchemaCompileError> {
    match kind {
        "boolean" => Ok(Node::Boolean),
        "string" => {
            let min_length = usize_keyword(keywords, "minLength", pointer)?;
            let max_length = usize_keyword(keywords, "maxLength", pointer)?;
            ensure_ordered(min_length, max_length, "minLength", pointer)?;
            Ok(Node::String {
                min_length,
                max_length,
            })
        }
        "number" => Ok(Node::Number {
            minimum: match keywords.get("minimum") {
                None => None,
                Some(value) => Some(
                    value
                        .as_f64()
                        .ok_or_else(|| invalid(pointer, "minimum must be a number"))?,
                ),
            },
        }),
        "integer" => Ok(Node::Integer {
            minimum: match keywords.get("minimum") {
                None => None,
                Some(value) => Some(
                    value
                        .as_i64()
                        .ok_or_else(|| invalid(pointer, "minimum must be an integer"))?,
                ),
            },
        }),
        "array" => {
            let items = match keywords.get("items") {
                None => Node::Any,
                Some(items) => compile(items, &format!("{pointer}/items"))?,
            };
            let min_items = usize_keyword(keywords, "minItems", pointer)?;
            let max_items = usize_keyword(keywords, "maxItems", pointer)?;
            ensure_ordered(min_items, max_items, "minItems", pointer)?;
            Ok(Node::Array {
                items: Box::new(items),
                min_items,
                max_items,
            })
        }
        "object" => compile_object(keywords, pointer),
        other => Err(invalid(pointer, format!("unsupported type {other}"))),
    }
}

fn compile_object(keywords: &Map<String, Value>, pointer: &str) -> Result<Node, SchemaCompileError> {
    let mut properties = Vec::new();
    if let Some(declared) = keywords.get("properties") {
        let Some(declared) = declared.as_object() else {
            return Err(invalid(pointer, "properties must be an object"));
        };
        for (name, schema) in declared {
            let child = compile(schema, &format!("{pointer}/properties/{name}"))?;
            properties.push((name.clone(), child));
        }
    }

    let mut required = Vec::new();
    if let Some(list) = keywords.get("required") {
        let Some(list) = list.as_array() else {
            return Err(invalid(pointer, "required must be an array"));
        };
        for entry in list {
            let Some(name) = entry.as_str() else {
                return Err(invalid(pointer, "required entries must be strings"));
            };
            if !properties.iter().any(|(declared, _)| declared == name) {
                return Err(invalid(pointer, format!("required field {name} is not declared")));
            }
            if required.iter().any(|seen: &String| seen == name) {
                return Err(invalid(pointer, format!("required field {name} is listed twice")));
            }
            required.push(name.to_owned());
        }
    }

    let additional = match keywords.get("additionalProperties") {
        None => true,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => return Err(invalid(pointer, "additionalProperties must be a boolean")),
    };

    Ok(Node::Object {
        properties,
        required,
        additional,
    })
}

fn usize_keyword(
    keywords: &Map<String, Value>,
    name: &str,
    pointer: &str,
) -> Result<Option<usize>, SchemaCompileError> {
    match keywords.get(name) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|raw| usize::try_from(raw).ok())
            .map(Some)
            .ok_or_else(|| invalid(pointer, format!("{name} must be a non-negative integer"))),
    }
}

fn ensure_ordered(
    min: Option<usize>,
    max: Option<usize>,
    min_name: &str,
    pointer: &str,
) -> Result<(), SchemaCompileError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => {
            Err(invalid(pointer, format!("{min_name} exceeds its maximum")))
        }
        _ => Ok(()),
    }
}

fn reject_unknown_keywords(
    node: &Node,
    keywords: &Map<String, Value>,
    pointer: &str,
) -> Result<(), SchemaCompileError> {
    let allowed: &[&str] = match node {
        Node::Any | Node::Boolean => &["type"],
        Node::String { .. } => &["type", "minLength", "maxLength"],
        Node::Number { .. } | Node::Integer { .. } => &["type", "minimum"],
        Node::Array { .. } => &["type", "items", "minItems", "maxItems"],
        Node::Object { .. } => &["type", "properties", "required", "additionalProperties"],
    };
    match keywords
        .keys()
        .find(|key| !allowed.contains(&key.as_str()) && !ANNOTATIONS.contains(&key.as_str()))
    {
        Some(key) => Err(invalid(pointer, format!("unsupported keyword {key}"))),
        None => Ok(()),
    }
}

/// Check `value` against `node`, reporting the first violation found.
pub(crate) fn check(node: &Node, value: &Value, pointer: &str) -> Result<(), Rejection> {
    match node {
        Node::Any => Ok(()),
        Node::Boolean => expect_type(value.is_boolean(), pointer, "a boolean"),
        Node::String {
            min_length,
            max_length,
        } => {
            let Some(text) = value.as_str() else {
                return type_mismatch(pointer, "a string");
            };
            let length = text.chars().count();
            if min_length.is_some_and(|min| length < min) {
                return Err(violation(pointer, "min_length", "is too short"));
            }
            if max_length.is_some_and(|max| length > max) {
                return Err(violation(pointer, "max_length", "is too long"));
            }
            Ok(())
        }
        Node::Number { minimum } => {
            let Some(number) = value.as_f64() else {
                return type_mismatch(pointer, "a number");
            };
            if minimum.is_some_and(|min| number < min) {
                return Err(violation(pointer, "minimum", "is below the minimum"));
            }
            Ok(())
        }
        Node::Integer { minimum } => check_integer(*minimum, value, pointer),
        Node::Array {
            items,
            min_items,
            max_items,
        } => {
            let Some(elements) = value.as_array() else {
                return type_mismatch(pointer, "an array");
            };
            if let Some(min) = min_items.filter(|min| elements.len() < *min) {
                return Err(violation(
                    pointer,
                    "min_items",
                    format!("must contain at least {min} items"),
                ));
            }
            if let Some(max) = max_items.filter(|max| elements.len() > *max) {
                return Err(violation(
                    pointer,
                    "max_items",
                    format!("must contain at most {max} items"),
                ));
            }
            for (index, element) in elements.iter().enumerate() {
                check(items, element, &format!("{pointer}/{index}"))?;
            }
            Ok(())
        }
        Node::Object {
            properties,
            required,
            additional,
        } => {
            let Some(fields) = value.as_object() else {
                return type_mismatch(pointer, "an object");
            };
            for name in required {
                if !fields.contains_key(name) {
                    return Err(violation(
                        &format!("{pointer}/{name}"),
                        "missing_field",
                        "is required",
                    ));
                }
            }
            for (name, field) in fields {
                match properties.iter().find(|(declared, _)| declared == name) {
                    Some((_, child)) => check(child, field, &format!("{pointer}/{name}"))?,
                    None if !additional => {
                        return Err(violation(
                            &format!("{pointer}/{name}"),
                            "unexpected_field",
                            "is not an accepted field",
                        ));
                    }
                    None => {}
                }
            }
            Ok(())
        }
    }
}

fn check_integer(minimum: Option<i64>, value: &Value, pointer: &str) -> Result<(), Rejection> {
    if let Some(number) = value.as_i64() {
        if minimum.is_some_and(|min| number < min) {
            return Err(violation(pointer, "minimum", "is below the minimum"));
        }
        return Ok(());
    }
    if value.is_u64() {
        return Ok(());
    }
    type_mismatch(pointer, "an integer")
}

fn expect_type(ok: bool, pointer: &str, expected: &str) -> Result<(), Rejection> {
    if ok {
        Ok(())
    } else {
        type_mismatch(pointer, expected)
    }
}

fn type_mismatch(pointer: &str, expected: &str) -> Result<(), Rejection> {
    Err(violation(pointer, "type_mismatch", format!("must be {expected}")))
}

fn violation(pointer: &str, code: &'static str, what: impl AsRef<str>) -> Rejection {
    let field = display_pointer(pointer);
    let message = format!("{field} {}", what.as_ref());
    Rejection::PayloadInvalid(Violation::new(field, code, message))
}
