//! printf-style format templates
//!
//! Printers take their output layout as a C format string such as
//! `"%8.3f\n"`. The string is parsed once at construction into a list of
//! literal and conversion segments; the number of conversions (the arity) is
//! checked there too, so rendering an element can never fail.
//!
//! Supported syntax:
//!
//! - flags `-`, `+`, space, `0`, `#`
//! - decimal field width and `.precision`
//! - length modifiers `hh h l ll L q j z t` (accepted, no effect: every
//!   argument is already 64 bits wide)
//! - conversions `d i u o x X f F e E g G` and the literal `%%`
//!
//! Widths and precisions above [`MAX_FIELD`] are rejected, so a rendered
//! conversion is always bounded.
//!
//! Arguments are coerced to the class of their conversion: a float passed to
//! `%d` is truncated toward zero, an integer passed to `%f` is widened.

use std::fmt::Write;

/// Largest accepted field width or precision
pub const MAX_FIELD: usize = 4096;

/// Numeric argument for a template conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatArg {
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl FormatArg {
    fn as_i64(self) -> i64 {
        match self {
            FormatArg::Int(v) => v,
            FormatArg::Uint(v) => v as i64,
            FormatArg::Float(v) => v as i64,
        }
    }

    fn as_u64(self) -> u64 {
        match self {
            FormatArg::Int(v) => v as u64,
            FormatArg::Uint(v) => v,
            FormatArg::Float(v) => v as u64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            FormatArg::Int(v) => v as f64,
            FormatArg::Uint(v) => v as f64,
            FormatArg::Float(v) => v,
        }
    }
}

/// Error raised while parsing or validating a template
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unsupported conversion '%{conversion}' at byte {offset}")]
    UnsupportedConversion { conversion: char, offset: usize },

    #[error("incomplete conversion at byte {offset}")]
    Incomplete { offset: usize },

    #[error("field size {value} at byte {offset} exceeds the maximum of {max}")]
    FieldTooWide {
        value: String,
        max: usize,
        offset: usize,
    },

    #[error("template needs {expected} placeholder(s), found {found}")]
    Arity { expected: usize, found: usize },

    #[error("template allows at most {max} placeholder(s), found {found}")]
    TooManyPlaceholders { max: usize, found: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
    alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Signed,
    Unsigned,
    Octal,
    Hex { upper: bool },
    Fixed { upper: bool },
    Exp { upper: bool },
    General { upper: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Spec {
    flags: Flags,
    width: usize,
    precision: Option<usize>,
    conversion: Conversion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Spec),
}

/// Parsed, immutable format template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
    arity: usize,
}

impl Template {
    /// Parse a template with any number of placeholders
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut arity = 0;
        let mut chars = source.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            if let Some(&(_, '%')) = chars.peek() {
                chars.next();
                literal.push('%');
                continue;
            }

            let mut flags = Flags::default();
            while let Some(&(_, c)) = chars.peek() {
                match c {
                    '-' => flags.left = true,
                    '+' => flags.plus = true,
                    ' ' => flags.space = true,
                    '0' => flags.zero = true,
                    '#' => flags.alt = true,
                    _ => break,
                }
                chars.next();
            }

            let width = Self::parse_number(&mut chars)?.unwrap_or(0);

            let mut precision = None;
            if let Some(&(_, '.')) = chars.peek() {
                chars.next();
                precision = Some(Self::parse_number(&mut chars)?.unwrap_or(0));
            }

            while let Some(&(_, 'h' | 'l' | 'L' | 'q' | 'j' | 'z' | 't')) = chars.peek() {
                chars.next();
            }

            let (conv_offset, conv) = chars.next().ok_or(TemplateError::Incomplete { offset })?;
            let conversion = match conv {
                'd' | 'i' => Conversion::Signed,
                'u' => Conversion::Unsigned,
                'o' => Conversion::Octal,
                'x' => Conversion::Hex { upper: false },
                'X' => Conversion::Hex { upper: true },
                'f' => Conversion::Fixed { upper: false },
                'F' => Conversion::Fixed { upper: true },
                'e' => Conversion::Exp { upper: false },
                'E' => Conversion::Exp { upper: true },
                'g' => Conversion::General { upper: false },
                'G' => Conversion::General { upper: true },
                other => {
                    return Err(TemplateError::UnsupportedConversion {
                        conversion: other,
                        offset: conv_offset,
                    });
                }
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Placeholder(Spec {
                flags,
                width,
                precision,
                conversion,
            }));
            arity += 1;
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
            arity,
        })
    }

    /// Parse a template that must contain exactly `arity` placeholders
    pub fn with_arity(source: &str, arity: usize) -> Result<Self, TemplateError> {
        let template = Self::parse(source)?;
        if template.arity != arity {
            return Err(TemplateError::Arity {
                expected: arity,
                found: template.arity,
            });
        }
        Ok(template)
    }

    /// Parse a template that may contain up to `max` placeholders
    pub fn with_max_arity(source: &str, max: usize) -> Result<Self, TemplateError> {
        let template = Self::parse(source)?;
        if template.arity > max {
            return Err(TemplateError::TooManyPlaceholders {
                max,
                found: template.arity,
            });
        }
        Ok(template)
    }

    /// Number of placeholders
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The original template text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Append the rendered template to `out`.
    ///
    /// `args` supplies one value per placeholder in order. Missing arguments
    /// render as zero and extra arguments are ignored, like C's printf with a
    /// well-formed call.
    pub fn render(&self, out: &mut String, args: &[FormatArg]) {
        debug_assert!(
            args.len() >= self.arity,
            "template '{}' rendered with {} of {} arguments",
            self.source,
            args.len(),
            self.arity
        );

        let mut args = args.iter().copied();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(spec) => {
                    let arg = args.next().unwrap_or(FormatArg::Int(0));
                    render_one(out, spec, arg);
                }
            }
        }
    }

    /// Parse an optional decimal field size, bounded by `MAX_FIELD`
    fn parse_number(
        chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    ) -> Result<Option<usize>, TemplateError> {
        let Some(&(offset, _)) = chars.peek() else {
            return Ok(None);
        };
        let mut digits = String::new();
        while let Some(&(_, c)) = chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            chars.next();
        }
        if digits.is_empty() {
            return Ok(None);
        }

        match digits.parse::<usize>() {
            Ok(value) if value <= MAX_FIELD => Ok(Some(value)),
            _ => Err(TemplateError::FieldTooWide {
                value: digits,
                max: MAX_FIELD,
                offset,
            }),
        }
    }
}

fn render_one(out: &mut String, spec: &Spec, arg: FormatArg) {
    let flags = spec.flags;
    let mut prefix = String::new();
    let body;
    // Zero padding applies to finite numbers only, and not to integers with
    // an explicit precision
    let mut zero_pad = flags.zero && !flags.left;

    match spec.conversion {
        Conversion::Signed => {
            let v = arg.as_i64();
            if v < 0 {
                prefix.push('-');
            } else if flags.plus {
                prefix.push('+');
            } else if flags.space {
                prefix.push(' ');
            }
            body = integer_digits(v.unsigned_abs().to_string(), v == 0, spec.precision);
            zero_pad &= spec.precision.is_none();
        }
        Conversion::Unsigned => {
            let v = arg.as_u64();
            body = integer_digits(v.to_string(), v == 0, spec.precision);
            zero_pad &= spec.precision.is_none();
        }
        Conversion::Octal => {
            let v = arg.as_u64();
            let mut digits = integer_digits(format!("{:o}", v), v == 0, spec.precision);
            if flags.alt && !digits.starts_with('0') {
                digits.insert(0, '0');
            }
            body = digits;
            zero_pad &= spec.precision.is_none();
        }
        Conversion::Hex { upper } => {
            let v = arg.as_u64();
            let digits = if upper {
                format!("{:X}", v)
            } else {
                format!("{:x}", v)
            };
            if flags.alt && v != 0 {
                prefix.push_str(if upper { "0X" } else { "0x" });
            }
            body = integer_digits(digits, v == 0, spec.precision);
            zero_pad &= spec.precision.is_none();
        }
        Conversion::Fixed { upper } | Conversion::Exp { upper } | Conversion::General { upper } => {
            let v = arg.as_f64();
            if v.is_sign_negative() && !v.is_nan() {
                prefix.push('-');
            } else if flags.plus {
                prefix.push('+');
            } else if flags.space {
                prefix.push(' ');
            }

            let magnitude = v.abs();
            let precision = spec.precision.unwrap_or(6);
            body = if !v.is_finite() {
                zero_pad = false;
                let text = if v.is_nan() { "nan" } else { "inf" };
                if upper {
                    text.to_uppercase()
                } else {
                    text.to_string()
                }
            } else {
                match spec.conversion {
                    Conversion::Fixed { .. } => fixed(magnitude, precision, flags.alt),
                    Conversion::Exp { .. } => exponential(magnitude, precision, flags.alt, upper),
                    _ => general(magnitude, precision, flags.alt, upper),
                }
            };
        }
    }

    let len = prefix.len() + body.len();
    let pad = spec.width.saturating_sub(len);
    if pad == 0 {
        out.push_str(&prefix);
        out.push_str(&body);
    } else if flags.left {
        out.push_str(&prefix);
        out.push_str(&body);
        out.extend(std::iter::repeat_n(' ', pad));
    } else if zero_pad {
        out.push_str(&prefix);
        out.extend(std::iter::repeat_n('0', pad));
        out.push_str(&body);
    } else {
        out.extend(std::iter::repeat_n(' ', pad));
        out.push_str(&prefix);
        out.push_str(&body);
    }
}

/// Apply integer precision (minimum digit count; zero with precision 0 prints nothing)
fn integer_digits(digits: String, is_zero: bool, precision: Option<usize>) -> String {
    match precision {
        None => digits,
        Some(0) if is_zero => String::new(),
        Some(p) if digits.len() < p => {
            let mut padded = "0".repeat(p - digits.len());
            padded.push_str(&digits);
            padded
        }
        Some(_) => digits,
    }
}

fn fixed(magnitude: f64, precision: usize, alt: bool) -> String {
    let mut text = format!("{:.*}", precision, magnitude);
    if alt && precision == 0 {
        text.push('.');
    }
    text
}

/// Split Rust's `{:e}` output into mantissa and decimal exponent
fn split_exponent(magnitude: f64, precision: usize) -> (String, i32) {
    let text = format!("{:.*e}", precision, magnitude);
    match text.split_once('e') {
        Some((mantissa, exp)) => (mantissa.to_string(), exp.parse().unwrap_or(0)),
        None => (text, 0),
    }
}

fn join_exponent(mantissa: &str, exp: i32, upper: bool) -> String {
    let mut text = String::with_capacity(mantissa.len() + 5);
    text.push_str(mantissa);
    text.push(if upper { 'E' } else { 'e' });
    text.push(if exp < 0 { '-' } else { '+' });
    let _ = write!(text, "{:02}", exp.unsigned_abs());
    text
}

fn exponential(magnitude: f64, precision: usize, alt: bool, upper: bool) -> String {
    let (mut mantissa, exp) = split_exponent(magnitude, precision);
    if alt && precision == 0 {
        mantissa.push('.');
    }
    join_exponent(&mantissa, exp, upper)
}

fn general(magnitude: f64, precision: usize, alt: bool, upper: bool) -> String {
    let significant = precision.max(1);
    let (_, exp) = if magnitude == 0.0 {
        (String::new(), 0)
    } else {
        split_exponent(magnitude, significant - 1)
    };

    if exp >= -4 && exp < significant as i32 {
        let decimals = (significant as i32 - 1 - exp) as usize;
        let text = format!("{:.*}", decimals, magnitude);
        if alt { text } else { strip_fraction_zeros(&text).to_string() }
    } else {
        let (mantissa, exp) = split_exponent(magnitude, significant - 1);
        let mantissa = if alt {
            mantissa.as_str()
        } else {
            strip_fraction_zeros(&mantissa)
        };
        join_exponent(mantissa, exp, upper)
    }
}

fn strip_fraction_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
