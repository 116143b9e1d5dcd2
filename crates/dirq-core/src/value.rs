use chrono::{DateTime, SecondsFormat, Utc};
use dirq_schema::FieldType;

///
/// Value
///
/// Query-literal value set. This is deliberately smaller than a full
/// document type system: only the shapes that can appear on the right-hand
/// side of a lowered comparison exist here.
///
/// Null → the field's value is absent (database null).
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    /// Configured display string of an enum member.
    Enum(String),
    Float(f64),
    Int(i64),
    /// Ordered list of values; renders as a JSON array.
    List(Vec<Self>),
    Null,
    Text(String),
    Timestamp(DateTime<Utc>),
    Uint(u64),
}

impl Value {
    /// Render this value as an AQL literal.
    ///
    /// - strings and enum display names: quoted and JSON-escaped
    /// - floats: exactly two decimal places
    /// - integers: plain digits
    /// - booleans: the AQL keywords `true` / `false`
    /// - timestamps: quoted RFC 3339
    /// - lists: JSON arrays of rendered elements
    #[must_use]
    pub fn render_aql(&self) -> String {
        match self {
            Self::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Self::Enum(display) | Self::Text(display) => quote_json(display),
            Self::Float(f) => format!("{f:.2}"),
            Self::Int(i) => i.to_string(),
            Self::Uint(u) => u.to_string(),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(Self::render_aql).collect();
                format!("[{}]", rendered.join(","))
            }
            Self::Null => "null".to_string(),
            Self::Timestamp(ts) => quote_json(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }

    /// Structurally convert this value to a declared field type.
    ///
    /// Lists convert element-wise and collect **all** failures so the
    /// caller can raise one validation error enumerating every offending
    /// value.
    pub fn cast(&self, ty: FieldType) -> Result<Self, Vec<String>> {
        match self {
            Self::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                let mut failures = Vec::new();
                for item in items {
                    match item.cast(ty) {
                        Ok(v) => out.push(v),
                        Err(errs) => failures.extend(errs),
                    }
                }
                if failures.is_empty() {
                    Ok(Self::List(out))
                } else {
                    Err(failures)
                }
            }
            other => other.cast_scalar(ty).map_err(|msg| vec![msg]),
        }
    }

    fn cast_scalar(&self, ty: FieldType) -> Result<Self, String> {
        match (ty, self) {
            (FieldType::Text, Self::Text(_) | Self::Enum(_)) => Ok(self.clone()),
            (FieldType::Int, Self::Int(_)) => Ok(self.clone()),
            (FieldType::Int, Self::Uint(u)) => i64::try_from(*u)
                .map(Self::Int)
                .map_err(|_| format!("{u} exceeds the signed integer range")),
            (FieldType::Int, Self::Text(s)) => s
                .parse::<i64>()
                .map(Self::Int)
                .map_err(|_| format!("'{s}' is not an integer")),
            (FieldType::Uint, Self::Uint(_)) => Ok(self.clone()),
            (FieldType::Uint, Self::Int(i)) => u64::try_from(*i)
                .map(Self::Uint)
                .map_err(|_| format!("{i} is not an unsigned integer")),
            (FieldType::Uint, Self::Text(s)) => s
                .parse::<u64>()
                .map(Self::Uint)
                .map_err(|_| format!("'{s}' is not an unsigned integer")),
            (FieldType::Float, Self::Float(_)) => Ok(self.clone()),
            #[expect(clippy::cast_precision_loss)]
            (FieldType::Float, Self::Int(i)) => Ok(Self::Float(*i as f64)),
            #[expect(clippy::cast_precision_loss)]
            (FieldType::Float, Self::Uint(u)) => Ok(Self::Float(*u as f64)),
            (FieldType::Float, Self::Text(s)) => s
                .parse::<f64>()
                .map(Self::Float)
                .map_err(|_| format!("'{s}' is not a number")),
            (FieldType::Bool, Self::Bool(_)) => Ok(self.clone()),
            (FieldType::Bool, Self::Text(s)) => match s.as_str() {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => Err(format!("'{s}' is not a boolean")),
            },
            (FieldType::Timestamp, Self::Timestamp(_)) => Ok(self.clone()),
            (FieldType::Timestamp, Self::Text(s)) => DateTime::parse_from_rfc3339(s)
                .map(|ts| Self::Timestamp(ts.with_timezone(&Utc)))
                .map_err(|_| format!("'{s}' is not an RFC 3339 timestamp")),
            (_, other) => Err(format!("{other:?} cannot convert to {ty:?}")),
        }
    }

    /// Text content for LIKE-pattern construction, if this is a textual value.
    #[must_use]
    pub fn as_pattern_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }
}

/// Quote and JSON-escape a string literal.
fn quote_json(s: &str) -> String {
    // serde_json string encoding matches the escaping the database expects.
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

/// Backslash-escape the database's wildcard characters before `%` wildcards
/// are appended around a user-supplied pattern fragment.
#[must_use]
pub fn escape_like_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch == '%' || ch == '_' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
