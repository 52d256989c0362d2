//! Title templates with `{field}` and `{field:spec}` substitution.
//!
//! The specification mini-language follows the familiar
//! `[[fill]align][sign][0][width][.precision][type]` shape:
//! - `align` is one of `<`, `>`, `^`, `=` (`=` pads between sign and digits)
//! - `sign` is `+`, `-`, or a space and only applies to numbers
//! - a leading `0` before the width pads with zeros
//! - `type` is `s` for text, `d` for integers, or `f`/`F` for fixed-point;
//!   a float precision without a type counts significant digits
//!
//! `{{` and `}}` render literal braces. Positional fields, attribute access,
//! and conversions are rejected at parse time.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// A typed value available to templates.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatValue {
    /// Free text such as a title or a date string.
    Text(String),
    /// Whole numbers such as season and episode numbers.
    Int(i64),
    /// Fractional numbers such as ratings.
    Float(f64),
}

impl From<String> for FormatValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FormatValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FormatValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for FormatValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FormatValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Named values a template is rendered against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormatVariables {
    values: BTreeMap<String, FormatValue>,
}

impl FormatVariables {
    /// Empty variable bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FormatValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`FormatVariables::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FormatValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FormatValue> {
        self.values.get(key)
    }

    /// Names of every value in the bag, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Copy every value from `other` into this bag.
    pub fn extend(&mut self, other: Self) {
        self.values.extend(other.values);
    }
}

/// A parsed title template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        key: String,
        raw_spec: String,
        spec: FormatSpec,
    },
}

impl Template {
    /// Parse `source` into literal and field segments.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTemplate`] for unbalanced braces or
    /// unsupported field syntax and [`CoreError::InvalidFormatSpec`] for a
    /// malformed specification.
    pub fn parse(source: &str) -> CoreResult<Self> {
        let invalid = |position: usize, reason: &'static str| CoreError::InvalidTemplate {
            template: source.to_string(),
            position,
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((position, ch)) = chars.next() {
            match ch {
                '{' => {
                    if chars.peek().is_some_and(|(_, next)| *next == '{') {
                        chars.next();
                        literal.push('{');
                        continue;
                    }
                    let mut body = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(invalid(position, "nested fields are not supported")),
                            other => body.push(other),
                        }
                    }
                    if !closed {
                        return Err(invalid(position, "unclosed '{'"));
                    }
                    let (key, raw_spec) = body.split_once(':').unwrap_or((body.as_str(), ""));
                    if key.contains('!') {
                        return Err(invalid(position, "conversions are not supported"));
                    }
                    if key.is_empty() {
                        return Err(invalid(position, "positional fields are not supported"));
                    }
                    if !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
                        return Err(invalid(position, "field names must be identifiers"));
                    }
                    let spec = FormatSpec::parse(raw_spec).ok_or_else(|| {
                        CoreError::InvalidFormatSpec {
                            key: key.to_string(),
                            spec: raw_spec.to_string(),
                        }
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field {
                        key: key.to_string(),
                        raw_spec: raw_spec.to_string(),
                        spec,
                    });
                }
                '}' => {
                    if chars.peek().is_some_and(|(_, next)| *next == '}') {
                        chars.next();
                        literal.push('}');
                    } else {
                        return Err(invalid(position, "single '}' encountered"));
                    }
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Original template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Field names referenced by the template, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field { key, .. } => Some(key.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Render against `variables`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] when a referenced field is absent and
    /// [`CoreError::InvalidFormatSpec`] when a specification does not fit the
    /// value's type.
    pub fn render(&self, variables: &FormatVariables) -> CoreResult<String> {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Field {
                    key,
                    raw_spec,
                    spec,
                } => {
                    let value = variables.get(key).ok_or_else(|| CoreError::MissingField {
                        key: key.clone(),
                        template: self.source.clone(),
                    })?;
                    let rendered = spec.apply(value).ok_or_else(|| CoreError::InvalidFormatSpec {
                        key: key.clone(),
                        spec: raw_spec.clone(),
                    })?;
                    output.push_str(&rendered);
                }
            }
        }
        Ok(output)
    }
}

impl FromStr for Template {
    type Err = CoreError;

    fn from_str(source: &str) -> CoreResult<Self> {
        Self::parse(source)
    }
}

impl Display for Template {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    AfterSign,
}

impl Align {
    const fn from_char(ch: char) -> Option<Self> {
        match ch {
            '<' => Some(Self::Left),
            '>' => Some(Self::Right),
            '^' => Some(Self::Center),
            '=' => Some(Self::AfterSign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Minus,
    Plus,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Integer,
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FormatSpec {
    fill: Option<char>,
    align: Option<Align>,
    sign: Option<Sign>,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: Option<Kind>,
}

impl FormatSpec {
    fn parse(raw: &str) -> Option<Self> {
        let chars: Vec<char> = raw.chars().collect();
        let mut index = 0;
        let mut spec = Self {
            fill: None,
            align: None,
            sign: None,
            zero: false,
            width: 0,
            precision: None,
            kind: None,
        };

        if let Some(align) = chars.get(1).copied().and_then(Align::from_char) {
            spec.fill = chars.first().copied();
            spec.align = Some(align);
            index = 2;
        } else if let Some(align) = chars.first().copied().and_then(Align::from_char) {
            spec.align = Some(align);
            index = 1;
        }

        spec.sign = match chars.get(index) {
            Some('+') => Some(Sign::Plus),
            Some('-') => Some(Sign::Minus),
            Some(' ') => Some(Sign::Space),
            _ => None,
        };
        if spec.sign.is_some() {
            index += 1;
        }

        if chars.get(index) == Some(&'0') {
            spec.zero = true;
            index += 1;
        }

        let (width, next) = read_number(&chars, index);
        spec.width = width.unwrap_or(0);
        index = next;

        if chars.get(index) == Some(&'.') {
            let (precision, next) = read_number(&chars, index + 1);
            spec.precision = Some(precision?);
            index = next;
        }

        spec.kind = match chars.get(index) {
            Some('s') => Some(Kind::Text),
            Some('d') => Some(Kind::Integer),
            Some('f' | 'F') => Some(Kind::Fixed),
            _ => None,
        };
        if spec.kind.is_some() {
            index += 1;
        }

        (index == chars.len()).then_some(spec)
    }

    fn apply(&self, value: &FormatValue) -> Option<String> {
        match value {
            FormatValue::Text(text) => self.apply_text(text),
            FormatValue::Int(number) => match self.kind {
                None | Some(Kind::Integer) if self.precision.is_none() => {
                    Some(self.pad_number(*number < 0, &number.unsigned_abs().to_string()))
                }
                Some(Kind::Fixed) => self.apply_float(int_as_float(*number)),
                _ => None,
            },
            FormatValue::Float(number) => match self.kind {
                None | Some(Kind::Fixed) => self.apply_float(*number),
                _ => None,
            },
        }
    }

    fn apply_text(&self, text: &str) -> Option<String> {
        if self.sign.is_some()
            || matches!(self.kind, Some(Kind::Integer | Kind::Fixed))
            || self.align == Some(Align::AfterSign)
        {
            return None;
        }
        let body: String = match self.precision {
            Some(limit) => text.chars().take(limit).collect(),
            None => text.to_string(),
        };
        let fill = self.fill.unwrap_or(if self.zero { '0' } else { ' ' });
        Some(pad(&body, self.width, fill, self.align.unwrap_or(Align::Left)))
    }

    fn apply_float(&self, number: f64) -> Option<String> {
        let magnitude = number.abs();
        let digits = match (self.kind, self.precision) {
            (Some(Kind::Fixed), precision) => format!("{magnitude:.*}", precision.unwrap_or(6)),
            (None, Some(precision)) => general_float(magnitude, precision),
            (None, None) => shortest_float(magnitude),
            _ => return None,
        };
        Some(self.pad_number(number.is_sign_negative() && number != 0.0, &digits))
    }

    fn pad_number(&self, negative: bool, digits: &str) -> String {
        let sign = match (negative, self.sign) {
            (true, _) => "-",
            (false, Some(Sign::Plus)) => "+",
            (false, Some(Sign::Space)) => " ",
            (false, _) => "",
        };
        let (fill, align) = match (self.fill, self.align) {
            (Some(fill), Some(align)) => (fill, align),
            (None, Some(align)) => (if self.zero { '0' } else { ' ' }, align),
            (_, None) if self.zero => ('0', Align::AfterSign),
            (_, None) => (' ', Align::Right),
        };
        if align == Align::AfterSign {
            let width = self.width.saturating_sub(sign.chars().count());
            format!("{sign}{}", pad(digits, width, fill, Align::Right))
        } else {
            pad(&format!("{sign}{digits}"), self.width, fill, align)
        }
    }
}

fn read_number(chars: &[char], start: usize) -> (Option<usize>, usize) {
    let mut end = start;
    while chars.get(end).is_some_and(char::is_ascii_digit) {
        end += 1;
    }
    if end == start {
        return (None, start);
    }
    let text: String = chars[start..end].iter().collect();
    (text.parse().ok(), end)
}

#[allow(clippy::cast_precision_loss)]
const fn int_as_float(value: i64) -> f64 {
    value as f64
}

fn pad(body: &str, width: usize, fill: char, align: Align) -> String {
    let length = body.chars().count();
    if length >= width {
        return body.to_string();
    }
    let missing = width - length;
    let repeat = |count: usize| std::iter::repeat_n(fill, count).collect::<String>();
    match align {
        Align::Left => format!("{body}{}", repeat(missing)),
        Align::Center => {
            let left = missing / 2;
            format!("{}{body}{}", repeat(left), repeat(missing - left))
        }
        Align::Right | Align::AfterSign => format!("{}{body}", repeat(missing)),
    }
}

/// `precision` significant digits, switching to exponent notation for large
/// and tiny values. Fixed output keeps at least one decimal (`8.0`).
fn general_float(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return shortest_float(value);
    }
    let digits = precision.max(1);
    let scientific = format!("{value:.*e}", digits - 1);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i64 = exponent.parse().unwrap_or(0);
    let significant = i64::try_from(digits).unwrap_or(i64::MAX);
    if exponent < -4 || exponent >= significant - 1 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        );
    }
    let decimals = usize::try_from(significant - 1 - exponent).unwrap_or(0);
    let fixed = format!("{value:.decimals$}");
    let trimmed = trim_fraction(&fixed);
    if trimmed.contains('.') {
        trimmed.to_string()
    } else {
        format!("{trimmed}.0")
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// Whole floats keep one decimal (`8.0`), others print their shortest form.
fn shortest_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
