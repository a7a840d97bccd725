use serde_json::{Map, Value};

/// JSON truthiness: `null`, `false`, `0`, `""` are falsy, everything else is truthy.
pub fn is_truthy(val: &Value) -> bool {
    match val {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Follows a dotted path ("address.value") through nested objects.
pub fn parse_simple<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = obj;
    for key in path.split('.') {
        current = current.get(key)?;
    }
    Some(current)
}

/// Text of a scalar value; `None` for falsy and non-scalar values.
pub fn as_text(val: &Value) -> Option<String> {
    if !is_truthy(val) {
        return None;
    }
    match val {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text at a dotted path, `None` when absent or falsy.
pub fn get_text(obj: &Value, path: &str) -> Option<String> {
    parse_simple(obj, path).and_then(as_text)
}

/// Text of a field of a flat object.
pub fn field_text(data: &Map<String, Value>, key: &str) -> Option<String> {
    data.get(key).and_then(as_text)
}

/// `true` if every field of `data` is truthy. Non-objects never are.
pub fn fields_are_not_empty<S: AsRef<str>>(data: &Value, fields: &[S]) -> bool {
    match data.as_object() {
        Some(obj) => fields
            .iter()
            .all(|field| obj.get(field.as_ref()).map_or(false, is_truthy)),
        None => false,
    }
}

/// Elements of `array1` missing from `array2`, order preserved.
pub fn array_minus<S: AsRef<str> + Clone, T: AsRef<str>>(array1: &[S], array2: &[T]) -> Vec<S> {
    array1
        .iter()
        .filter(|el| !array2.iter().any(|other| other.as_ref() == el.as_ref()))
        .cloned()
        .collect()
}

/// Joins the truthy parts with `sep`.
pub fn join_present<I, S>(parts: I, sep: &str) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    parts
        .into_iter()
        .flatten()
        .filter(|part| !part.as_ref().is_empty())
        .map(|part| part.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Escapes characters that are not safe inside HTML text.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            '/' => result.push_str("&#x2F;"),
            _ => result.push(ch),
        }
    }
    result
}

/// Monotonic id source owned by a session: `c1`, `c2`, `i3`...
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    counter: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{}{}", prefix, self.counter)
    }
}
