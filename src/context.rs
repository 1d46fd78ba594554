//! Data context handed to renderers, and `{{path}}` interpolation over it.
//!
//! The preview keeps one `DataContext` per load: a JSON object keyed by
//! data-source code, or whatever literal value a host supplied for printing.
//! `ResolvedData` is the per-component view of that context.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use serde_json::{Map, Value};

/// Loaded data keyed by data-source code.
#[derive(Debug, Clone, PartialEq)]
pub struct DataContext(Value);

impl Default for DataContext {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl DataContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a caller-supplied value as-is.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Store `value` under `code`. A non-object context is replaced by an
    /// object first.
    pub fn insert(&mut self, code: impl Into<String>, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Some(map) = self.0.as_object_mut() {
            map.insert(code.into(), value);
        }
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Value> {
        self.0.get(code)
    }

    /// The array stored under `code`; anything else reads as empty.
    #[must_use]
    pub fn rows(&self, code: &str) -> &[Value] {
        match self.0.get(code) {
            Some(Value::Array(rows)) => rows,
            _ => &[],
        }
    }

    /// Resolve a dotted path such as `operations.0.operation_name`.
    ///
    /// Numeric segments index arrays; all other segments are object keys.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.0, path)
    }
}

/// Resolve a dotted path against a JSON value.
#[must_use]
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(i) => items.get(i),
            Err(_) => None,
        },
        Value::Object(map) => map.get(segment),
        _ => None,
    })
}

/// Display text of a JSON value: strings unquoted, null empty, containers as
/// compact JSON.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Read a finite number from a JSON number or a numeric string.
#[must_use]
pub fn value_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return None,
        },
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Replace every `{{path}}` in `template` with the value found at `path`.
///
/// Missing paths become empty text. An unterminated `{{` is copied through
/// literally.
#[must_use]
pub fn interpolate(template: &str, ctx: &DataContext) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        if let Some(value) = ctx.lookup(&after[..end]) {
            out.push_str(&value_text(value));
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// The data one component receives at render time.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedData<'a> {
    /// Design time: no data loaded, placeholders are shown verbatim.
    Unbound,
    /// The array bound through `dataSource.code`.
    Rows(&'a [Value]),
    /// The whole context, for free-form interpolation.
    Context(&'a DataContext),
}

impl<'a> ResolvedData<'a> {
    /// Rows for table/chart rendering. Empty unless bound.
    #[must_use]
    pub fn rows(&self) -> &'a [Value] {
        match *self {
            Self::Rows(rows) => rows,
            Self::Unbound | Self::Context(_) => &[],
        }
    }

    /// Interpolate `template` against the context; verbatim otherwise.
    #[must_use]
    pub fn interpolate(&self, template: &str) -> String {
        match *self {
            Self::Context(ctx) => interpolate(template, ctx),
            Self::Unbound | Self::Rows(_) => template.to_owned(),
        }
    }
}
