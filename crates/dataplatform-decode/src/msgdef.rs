//! ROS message definition parsing
//!
//! Schemas for `ros1msg` and `ros2msg` carry the root definition followed by
//! every dependency, each introduced by a separator line of `=` characters
//! and a `MSG: package/Type` line:
//!
//! ```text
//! std_msgs/Header header
//! float64 temperature
//! ================================================================================
//! MSG: std_msgs/Header
//! uint32 seq
//! time stamp
//! string frame_id
//! ```

use std::collections::HashMap;

use crate::error::{DecodeError, DecodeResult};

/// Definition grammar variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Ros1,
    Ros2,
}

/// Built-in field types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    String,
    WString,
    /// ROS 1 only: `uint32 sec, uint32 nsec`
    Time,
    /// ROS 1 only: `int32 sec, int32 nsec`
    Duration,
}

impl Primitive {
    /// Parse a primitive type name, bounds already stripped
    pub fn parse(name: &str, dialect: Dialect) -> Option<Self> {
        let primitive = match (name, dialect) {
            ("bool", _) => Primitive::Bool,
            ("int8", _) => Primitive::Int8,
            ("uint8", _) => Primitive::Uint8,
            ("byte", Dialect::Ros1) => Primitive::Int8,
            ("byte", Dialect::Ros2) => Primitive::Uint8,
            ("char", _) => Primitive::Uint8,
            ("int16", _) => Primitive::Int16,
            ("uint16", _) => Primitive::Uint16,
            ("int32", _) => Primitive::Int32,
            ("uint32", _) => Primitive::Uint32,
            ("int64", _) => Primitive::Int64,
            ("uint64", _) => Primitive::Uint64,
            ("float32", _) => Primitive::Float32,
            ("float64", _) => Primitive::Float64,
            ("string", _) => Primitive::String,
            ("wstring", Dialect::Ros2) => Primitive::WString,
            ("time", Dialect::Ros1) => Primitive::Time,
            ("duration", Dialect::Ros1) => Primitive::Duration,
            _ => return None,
        };
        Some(primitive)
    }

    /// Fixed encoded width, `None` for strings
    pub fn byte_size(&self) -> Option<usize> {
        match self {
            Primitive::Bool | Primitive::Int8 | Primitive::Uint8 => Some(1),
            Primitive::Int16 | Primitive::Uint16 => Some(2),
            Primitive::Int32 | Primitive::Uint32 | Primitive::Float32 => Some(4),
            Primitive::Int64 | Primitive::Uint64 | Primitive::Float64 => Some(8),
            Primitive::Time | Primitive::Duration => Some(8),
            Primitive::String | Primitive::WString => None,
        }
    }
}

/// Element type of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Primitive(Primitive),
    /// Fully qualified `package/Type` name
    Complex(String),
}

/// How many elements a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Single,
    Fixed(usize),
    /// Length-prefixed, bounded or not
    Dynamic,
}

/// A single field of a message definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub arity: Arity,
}

/// Fields of one message type, constants dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDefinition {
    pub name: String,
    pub fields: Vec<Field>,
}

/// The root definition plus all dependencies
#[derive(Debug, Clone)]
pub struct DefinitionSet {
    root: String,
    types: HashMap<String, MessageDefinition>,
}

impl DefinitionSet {
    /// Parse the definition text stored in a schema
    pub fn parse(root_name: &str, text: &str, dialect: Dialect) -> DecodeResult<Self> {
        let root = normalize_type_name(root_name);
        let mut types = HashMap::new();
        let mut current = root.clone();
        let mut lines: Vec<&str> = Vec::new();
        let mut expect_header = false;

        for line in text.lines() {
            let trimmed = line.trim();
            if is_separator(trimmed) {
                let definition = parse_block(&current, &lines, dialect)?;
                types.insert(current.clone(), definition);
                lines.clear();
                expect_header = true;
                continue;
            }
            if expect_header {
                if trimmed.is_empty() {
                    continue;
                }
                let name = trimmed.strip_prefix("MSG:").ok_or_else(|| {
                    DecodeError::Definition(format!("expected `MSG:` line, found {:?}", trimmed))
                })?;
                current = normalize_type_name(name.trim());
                expect_header = false;
                continue;
            }
            lines.push(line);
        }

        if expect_header {
            return Err(DecodeError::Definition(
                "separator without a following `MSG:` line".to_string(),
            ));
        }
        let definition = parse_block(&current, &lines, dialect)?;
        types.insert(current, definition);

        Ok(Self { root, types })
    }

    /// The root message definition
    pub fn root(&self) -> DecodeResult<&MessageDefinition> {
        self.get(&self.root)
    }

    /// Look up a type by qualified name, falling back to the bare type name
    pub fn get(&self, name: &str) -> DecodeResult<&MessageDefinition> {
        if let Some(def) = self.types.get(name) {
            return Ok(def);
        }
        let short = short_name(name);
        let mut candidates = self.types.values().filter(|d| short_name(&d.name) == short);
        match (candidates.next(), candidates.next()) {
            (Some(def), None) => Ok(def),
            _ => Err(DecodeError::UnknownType(name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn is_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '=')
}

fn short_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// `pkg/msg/Type` → `pkg/Type`
fn normalize_type_name(name: &str) -> String {
    let parts: Vec<&str> = name.split('/').collect();
    match parts.as_slice() {
        [package, "msg", ty] => format!("{}/{}", package, ty),
        _ => name.to_string(),
    }
}

fn package_of(name: &str) -> Option<&str> {
    name.rsplit_once('/').map(|(package, _)| package)
}

fn parse_block(name: &str, lines: &[&str], dialect: Dialect) -> DecodeResult<MessageDefinition> {
    let mut fields = Vec::new();
    for line in lines {
        if let Some(field) = parse_line(name, line, dialect)? {
            fields.push(field);
        }
    }
    Ok(MessageDefinition {
        name: name.to_string(),
        fields,
    })
}

fn parse_line(owner: &str, line: &str, dialect: Dialect) -> DecodeResult<Option<Field>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (type_token, rest) = match line.split_once(char::is_whitespace) {
        Some((ty, rest)) => (ty, rest.trim()),
        None => {
            return Err(DecodeError::Definition(format!(
                "field without a name in {}: {:?}",
                owner, line
            )))
        }
    };

    let declaration = rest.split('#').next().unwrap_or("").trim();
    // Constants: `int32 FOO=1`, `string BAR = text`
    if declaration.contains('=') {
        return Ok(None);
    }

    let field_name = declaration.split_whitespace().next().ok_or_else(|| {
        DecodeError::Definition(format!("field without a name in {}: {:?}", owner, line))
    })?;

    let (base, arity) = split_array_suffix(type_token)?;
    let base = strip_string_bound(base);

    let kind = match Primitive::parse(base, dialect) {
        Some(primitive) => FieldKind::Primitive(primitive),
        None => FieldKind::Complex(resolve_complex(owner, base)),
    };

    Ok(Some(Field {
        name: field_name.to_string(),
        kind,
        arity,
    }))
}

fn split_array_suffix(token: &str) -> DecodeResult<(&str, Arity)> {
    let Some(open) = token.find('[') else {
        return Ok((token, Arity::Single));
    };
    let inner = token[open + 1..]
        .strip_suffix(']')
        .ok_or_else(|| DecodeError::Definition(format!("unterminated array type {:?}", token)))?;

    let arity = if inner.is_empty() || inner.starts_with("<=") {
        Arity::Dynamic
    } else {
        let len = inner
            .parse()
            .map_err(|_| DecodeError::Definition(format!("invalid array length {:?}", token)))?;
        Arity::Fixed(len)
    };
    Ok((&token[..open], arity))
}

/// `string<=10` → `string`
fn strip_string_bound(base: &str) -> &str {
    match base.find("<=") {
        Some(pos) => &base[..pos],
        None => base,
    }
}

fn resolve_complex(owner: &str, name: &str) -> String {
    if name == "Header" {
        return "std_msgs/Header".to_string();
    }
    if name.contains('/') {
        return normalize_type_name(name);
    }
    match package_of(owner) {
        Some(package) => format!("{}/{}", package, name),
        None => name.to_string(),
    }
}
