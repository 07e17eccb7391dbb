//! Trait for the external price/name oracle.

use serde_json::Value;

use crate::error::AppraisalError;

/// Highest price an appraisal may report.
pub const MAX_PRICE: u32 = 1_000_000;

/// Result of appraising one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appraisal {
    /// Short description of the item
    pub name: String,
    /// Estimated value in whole currency units, within `[0, MAX_PRICE]`
    pub price: u32,
}

/// An oracle that names and prices an item from a JPEG-encoded snapshot.
///
/// # Example
///
/// ```ignore
/// use shelfcount::{Appraisal, Appraiser, AppraisalError, parse_appraisal_response};
///
/// struct RemoteModel { /* client here */ }
///
/// impl Appraiser for RemoteModel {
///     fn appraise(&mut self, jpeg: &[u8]) -> Result<Appraisal, AppraisalError> {
///         let text = self.ask(jpeg).map_err(|e| AppraisalError::backend(e.to_string()))?;
///         parse_appraisal_response(&text)
///     }
/// }
/// ```
pub trait Appraiser {
    fn appraise(&mut self, jpeg: &[u8]) -> Result<Appraisal, AppraisalError>;
}

impl<F> Appraiser for F
where
    F: FnMut(&[u8]) -> Result<Appraisal, AppraisalError>,
{
    fn appraise(&mut self, jpeg: &[u8]) -> Result<Appraisal, AppraisalError> {
        self(jpeg)
    }
}

/// Parse an oracle reply of the form `["name of object", price]`.
///
/// Surrounding whitespace and a markdown code fence are tolerated, and the
/// name may be single-quoted (`['Oak armchair', 120]`). The price must be a
/// whole number within `[0, MAX_PRICE]`.
pub fn parse_appraisal_response(text: &str) -> Result<Appraisal, AppraisalError> {
    let body = strip_code_fence(text);
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) if body.contains('\'') => {
            serde_json::from_str(&requote_single_quoted(body)).map_err(|_| err)?
        }
        Err(err) => return Err(err.into()),
    };

    let [name, price] = match value {
        Value::Array(items) => <[Value; 2]>::try_from(items).map_err(|items| {
            AppraisalError::malformed(format!("expected 2 elements, got {}", items.len()))
        })?,
        other => {
            return Err(AppraisalError::malformed(format!(
                "expected a list, got {other}"
            )));
        }
    };

    let name = match name {
        Value::String(name) => name,
        other => {
            return Err(AppraisalError::malformed(format!(
                "expected a name string, got {other}"
            )));
        }
    };

    let price = whole_number(&price)
        .ok_or_else(|| AppraisalError::malformed(format!("expected a whole price, got {price}")))?;
    if !(0..=MAX_PRICE as i64).contains(&price) {
        return Err(AppraisalError::PriceOutOfRange(price));
    }

    Ok(Appraisal {
        name,
        price: price as u32,
    })
}

fn whole_number(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

/// Rewrite single-quoted string literals as JSON strings, leaving
/// double-quoted ones untouched.
fn requote_single_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut chars = text.chars();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match (quote, c) {
            (None, '\'' | '"') => {
                quote = Some(c);
                out.push('"');
            }
            (None, _) => out.push(c),
            (Some(q), _) if c == q => {
                quote = None;
                out.push('"');
            }
            (Some(q), '\\') => match chars.next() {
                Some('\'') if q == '\'' => out.push('\''),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            (Some('\''), '"') => out.push_str("\\\""),
            (Some(_), _) => out.push(c),
        }
    }
    out
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };
    // drop an optional language tag such as ```json
    match inner.split_once('\n') {
        Some((tag, body)) if !tag.trim_start().starts_with('[') => body.trim(),
        _ => inner.trim(),
    }
}
