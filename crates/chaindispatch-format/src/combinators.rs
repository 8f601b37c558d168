//! Formatter combinators.
//!
//! A [`Formatter`] is a pure `Value -> Value` transform. Compound formatters
//! are assembled from the combinators below and run as an explicit
//! left-to-right [`Formatter::pipeline`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chaindispatch_core::FormatError;
use serde_json::{Map, Value};

type FormatFn = dyn Fn(Value) -> Result<Value, FormatError> + Send + Sync;

/// A pure, shareable value transform.
#[derive(Clone)]
pub struct Formatter(Arc<FormatFn>);

impl Formatter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, FormatError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Returns its input unchanged.
    pub fn identity() -> Self {
        Self::new(Ok)
    }

    pub fn apply(&self, value: Value) -> Result<Value, FormatError> {
        (self.0)(value)
    }

    /// Run `self`, then `next` on its output.
    pub fn then(self, next: Formatter) -> Formatter {
        Formatter::pipeline(vec![self, next])
    }

    /// Run `stages` in order, feeding each output to the next stage.
    pub fn pipeline(stages: Vec<Formatter>) -> Formatter {
        Formatter::new(move |value| stages.iter().try_fold(value, |v, stage| stage.apply(v)))
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Formatter")
    }
}

/// Apply `formatter` only when `predicate` holds; otherwise pass through.
pub fn apply_formatter_if<P>(formatter: Formatter, predicate: P) -> Formatter
where
    P: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Formatter::new(move |value| {
        if predicate(&value) {
            formatter.apply(value)
        } else {
            Ok(value)
        }
    })
}

pub fn is_not_null(value: &Value) -> bool {
    !value.is_null()
}

pub fn is_object(value: &Value) -> bool {
    value.is_object()
}

/// Apply `formatter` unless the value is `null`.
pub fn nullable(formatter: Formatter) -> Formatter {
    apply_formatter_if(formatter, is_not_null)
}

/// Apply `formatter` to element `index` of an array, leaving the rest alone.
///
/// Fails with [`FormatError::IndexOutOfRange`] when the array is too short.
pub fn apply_formatter_at_index(formatter: Formatter, index: usize) -> Formatter {
    Formatter::new(move |value| {
        let mut items = match value {
            Value::Array(items) => items,
            other => return Err(FormatError::mismatch("array", &other)),
        };
        let len = items.len();
        let slot = items
            .get_mut(index)
            .ok_or(FormatError::IndexOutOfRange { index, len })?;
        *slot = formatter.apply(slot.take())?;
        Ok(Value::Array(items))
    })
}

/// Apply `formatter` to every element of an array, preserving order.
pub fn apply_formatter_to_array(formatter: Formatter) -> Formatter {
    Formatter::new(move |value| match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| formatter.apply(item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(FormatError::mismatch("array", &other)),
    })
}

/// Alias of [`apply_formatter_to_array`]; JSON has one sequence type.
pub fn apply_formatter_to_iterable(formatter: Formatter) -> Formatter {
    apply_formatter_to_array(formatter)
}

/// Apply per-key formatters to an object; unknown keys pass through.
pub fn apply_formatters_to_dict<I>(formatters: I) -> Formatter
where
    I: IntoIterator<Item = (&'static str, Formatter)>,
{
    apply_formatters_to_dict_with_default(formatters, Formatter::identity())
}

/// Like [`apply_formatters_to_dict`], with `default` applied to unknown keys.
pub fn apply_formatters_to_dict_with_default<I>(formatters: I, default: Formatter) -> Formatter
where
    I: IntoIterator<Item = (&'static str, Formatter)>,
{
    let formatters: HashMap<&'static str, Formatter> = formatters.into_iter().collect();
    Formatter::new(move |value| match value {
        Value::Object(fields) => fields
            .into_iter()
            .map(|(key, field)| {
                let formatter = formatters.get(key.as_str()).unwrap_or(&default);
                formatter.apply(field).map(|field| (key, field))
            })
            .collect::<Result<Map<_, _>, FormatError>>()
            .map(Value::Object),
        other => Err(FormatError::mismatch("object", &other)),
    })
}

/// Rewrite every key of an object with `formatter`, which must yield strings.
pub fn apply_key_formatter(formatter: Formatter) -> Formatter {
    Formatter::new(move |value| match value {
        Value::Object(fields) => fields
            .into_iter()
            .map(|(key, field)| match formatter.apply(Value::String(key)) {
                Ok(Value::String(key)) => Ok((key, field)),
                Ok(other) => Err(FormatError::mismatch("string key", &other)),
                Err(e) => Err(e),
            })
            .collect::<Result<Map<_, _>, FormatError>>()
            .map(Value::Object),
        other => Err(FormatError::mismatch("object", &other)),
    })
}

/// Apply `formatter` to every value of an object.
pub fn apply_formatter_to_values(formatter: Formatter) -> Formatter {
    Formatter::new(move |value| match value {
        Value::Object(fields) => fields
            .into_iter()
            .map(|(key, field)| formatter.apply(field).map(|field| (key, field)))
            .collect::<Result<Map<_, _>, FormatError>>()
            .map(Value::Object),
        other => Err(FormatError::mismatch("object", &other)),
    })
}
