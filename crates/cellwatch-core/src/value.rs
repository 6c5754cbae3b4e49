//! Sanitizing parser for raw router fields.
//!
//! Every field arrives as a string, frequently with vendor noise attached:
//! hex-encoded identifiers, unit suffixes, and "no data" sentinel values
//! that are indistinguishable from real measurements except by convention.
//! [`Value`] turns one such field into a typed scalar and remembers the last
//! good parse across cycles.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static FIRST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(\.\d+)?").expect("static regex"));

/// First signed decimal number in `s`, or an empty string when none exists.
pub fn first_number(s: &str) -> &str {
    FIRST_NUMBER.find(s).map(|m| m.as_str()).unwrap_or("")
}

/// Whether the whole string parses as a decimal number.
pub fn is_number(s: &str) -> bool {
    s.trim().parse::<f64>().is_ok()
}

/// First non-empty string in `vals`, or an empty string.
pub fn one_of<'a>(vals: &[&'a str]) -> &'a str {
    vals.iter().copied().find(|v| !v.is_empty()).unwrap_or("")
}

/// Cleanup rules applied to a raw field before parsing.
///
/// Rules compose; they are applied in the order remove → strip-non-numeric,
/// then the parse itself honors [`ParseOpts::hex`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOpts<'a> {
    hex: bool,
    strip_non_numeric: bool,
    remove: &'a [&'a str],
}

impl<'a> ParseOpts<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse integers as base-16 instead of base-10.
    pub fn hex(mut self) -> Self {
        self.hex = true;
        self
    }

    /// Reduce the input to its first signed decimal number.
    pub fn strip_non_numeric(mut self) -> Self {
        self.strip_non_numeric = true;
        self
    }

    /// Remove the given literals before parsing.
    ///
    /// A numeric literal is a sentinel: it is only removed when it matches
    /// the whole field, so a real value that merely shares leading digits
    /// ("-44.07" vs the "-44.0" sentinel) is left intact, and otherwise only
    /// as a space-separated suffix. A non-numeric literal is a unit suffix
    /// ("MHz") and is removed wherever it occurs.
    pub fn remove(mut self, literals: &'a [&'a str]) -> Self {
        self.remove = literals;
        self
    }

    fn apply<'s>(&self, raw: &'s str) -> Cow<'s, str> {
        if self.remove.is_empty() && !self.strip_non_numeric {
            return Cow::Borrowed(raw);
        }
        let mut s = raw.to_string();
        for lit in self.remove {
            if is_number(lit) {
                if s == *lit {
                    s.clear();
                } else {
                    s = s.replace(&format!(" {lit}"), "");
                }
            } else {
                s = s.replace(lit, "");
            }
        }
        if self.strip_non_numeric {
            s = first_number(&s).to_string();
        }
        Cow::Owned(s)
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
}

/// Closed set of numeric kinds a raw field can parse into.
///
/// The parse routine is picked by the value's type at the call site, never
/// by inspecting anything at runtime.
pub trait Scalar: Copy + Default + PartialOrd + sealed::Sealed {
    fn parse(cleaned: &str, hex: bool) -> Option<Self>;
    fn as_f64(self) -> f64;
}

impl Scalar for i32 {
    fn parse(cleaned: &str, hex: bool) -> Option<Self> {
        let s = cleaned.trim();
        if hex {
            let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
            i32::from_str_radix(digits, 16).ok()
        } else {
            s.parse().ok()
        }
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl Scalar for f32 {
    fn parse(cleaned: &str, _hex: bool) -> Option<Self> {
        cleaned.trim().parse().ok()
    }

    fn as_f64(self) -> f64 {
        self as f64
    }
}

/// Last good value of one raw field plus an update counter.
///
/// A failed parse leaves both untouched, which is what keeps a single
/// garbled field in an otherwise good sample from corrupting the tracked
/// state. Callers must check [`Value::ok`] before trusting [`Value::get`];
/// zero updates means the field was never observed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Value<T> {
    val: T,
    updates: u32,
}

impl<T: Copy + Default> Value<T> {
    pub fn get(&self) -> T {
        self.val
    }

    pub fn ok(&self) -> bool {
        self.updates > 0
    }

    pub fn updates(&self) -> u32 {
        self.updates
    }
}

impl<T: Scalar> Value<T> {
    /// Parse `raw` after applying `opts`. Returns whether the parse
    /// succeeded and the value was replaced.
    pub fn set(&mut self, raw: &str, opts: ParseOpts<'_>) -> bool {
        match T::parse(&opts.apply(raw), opts.hex) {
            Some(v) => {
                self.val = v;
                self.updates += 1;
                true
            }
            None => false,
        }
    }
}

impl Value<bool> {
    /// Booleans never come from strings; they are assigned directly.
    pub fn set_flag(&mut self, v: bool) {
        self.val = v;
        self.updates += 1;
    }
}
