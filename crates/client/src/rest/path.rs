//! Path templating and query serialization
//!
//! Templates use `:name` placeholders, where a name is a run of one or more
//! non-`/` characters. Substitution is permissive on purpose: a placeholder
//! with no matching argument resolves to the literal `undefined` rather than
//! failing, mirroring long-standing client behavior. Callers wanting strict
//! validation can install their own substitution function on the
//! [`RestClient`](crate::rest::RestClient).

use crate::request::ArgMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Characters left verbatim by `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Placeholder text produced for a missing argument
const MISSING: &str = "undefined";

/// Percent-encode a URL component
#[must_use]
pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, COMPONENT).to_string()
}

/// Encode an argument value: strings encode their raw text, everything else
/// encodes its JSON rendering
fn encode_value(value: &Value) -> String {
    match value {
        Value::String(text) => encode_component(text),
        other => encode_component(&other.to_string()),
    }
}

/// Substitute `:name` placeholders left to right, consuming matched keys.
///
/// Returns the resolved path and the residual record of unconsumed arguments.
/// A bare `:` directly before `/` or the end of the template is literal text.
#[must_use]
pub fn substitute_params(template: &str, args: &ArgMap) -> (String, ArgMap) {
    let mut residual = args.clone();
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(':') {
        resolved.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let len = after.find('/').unwrap_or(after.len());
        if len == 0 {
            resolved.push(':');
            rest = after;
            continue;
        }

        let key = &after[..len];
        match residual.shift_remove(key) {
            Some(value) => resolved.push_str(&encode_value(&value)),
            None => resolved.push_str(MISSING),
        }
        rest = &after[len..];
    }

    resolved.push_str(rest);
    (resolved, residual)
}

/// Join two path parts with exactly one separating slash
#[must_use]
pub fn join_paths(base: &str, segment: &str) -> String {
    if segment.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}

/// Serialize an argument record into a query string: `key=value` pairs joined
/// by `&`, both sides percent-encoded, in record iteration order. An empty
/// record yields an empty string.
#[must_use]
pub fn serialize_args(args: &ArgMap) -> String {
    args.iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}
