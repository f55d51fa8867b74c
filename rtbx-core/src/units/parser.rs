//! Unit string parser with normalization.
//!
//! Spectroscopy files and meteorological inputs spell the same unit in many
//! ways. This module parses unit strings into a structured representation,
//! handling the common variations:
//!
//! - Exponents: `m^2`, `m**2`, `m2`, `m²`
//! - Negative exponents: `cm^-1`, `cm-1`, `cm⁻¹`
//! - Multiplication: `m s^-2`, `m*s^-2`, `m·s^-2`
//! - Division: `cm^2/molecule`, `cm^2 per molecule`
//! - Micro sign: `μm` and `um` are the same unit
//! - Whitespace: `m/s^2` == `m / s ^ 2`
//!
//! # Grammar
//!
//! ```text
//! unit_expr  = term (('/' | 'per') term)*
//! term       = factor (('*' | '·' | ' ') factor)*
//! factor     = base_unit ('^' | '**')? exponent?
//! base_unit  = [a-zA-Z_]+
//! exponent   = '-'? [0-9]+
//! ```

use super::dimension::Dimension;
use super::registry::UNIT_REGISTRY;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Error type for unit parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Empty unit string.
    EmptyUnit,
    /// Unknown unit symbol.
    UnknownUnit(String),
    /// Invalid exponent format.
    InvalidExponent(String),
    /// General parse error.
    ParseFailed(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUnit => write!(f, "empty unit string"),
            Self::UnknownUnit(u) => write!(f, "unknown unit: '{u}'"),
            Self::InvalidExponent(e) => write!(f, "invalid exponent: '{e}'"),
            Self::ParseFailed(msg) => write!(f, "parse failed: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A parsed unit expression.
///
/// Represents a unit as a product of base units with integer exponents.
/// For example, `cm^2/molecule` is represented as `{cm: 2, molecule: -1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedUnit {
    /// Map from base unit symbol to exponent.
    /// Using BTreeMap for deterministic ordering.
    components: BTreeMap<String, i32>,
}

impl ParsedUnit {
    /// Creates a new empty (dimensionless) parsed unit.
    #[must_use]
    pub fn dimensionless() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }

    /// Creates a parsed unit from components, dropping zero exponents.
    #[must_use]
    pub fn from_components(components: BTreeMap<String, i32>) -> Self {
        let components = components
            .into_iter()
            .filter(|(_, exp)| *exp != 0)
            .collect();
        Self { components }
    }

    /// Parses a unit string into a `ParsedUnit`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtbx_core::units::parser::ParsedUnit;
    ///
    /// let unit = ParsedUnit::parse("cm^-1").unwrap();
    /// let unit2 = ParsedUnit::parse("cm⁻¹").unwrap();
    /// assert_eq!(unit, unit2);
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = normalize_symbols(input.trim());
        if input.is_empty() {
            return Err(ParseError::EmptyUnit);
        }

        // Handle special case: "1" or "dimensionless"
        if input == "1" || input.eq_ignore_ascii_case("dimensionless") {
            return Ok(Self::dimensionless());
        }

        let mut parser = UnitParser::new(&input);
        let parsed = parser.parse_expression()?;
        parser.skip_whitespace();
        match parser.peek() {
            None => Ok(parsed),
            Some(c) => Err(ParseError::ParseFailed(format!(
                "unexpected character '{c}' in '{input}'"
            ))),
        }
    }

    /// Returns the components of this unit.
    #[must_use]
    pub fn components(&self) -> &BTreeMap<String, i32> {
        &self.components
    }

    /// Returns true if this unit has no components (explicit dimensionless).
    ///
    /// Note: A unit like "ppm" has components but is physically dimensionless.
    /// Use [`Self::dimension`] to check the physical dimension.
    #[must_use]
    pub fn has_no_components(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns true if this unit is physically dimensionless.
    pub fn is_dimensionless(&self) -> Result<bool, ParseError> {
        Ok(self.dimension()?.is_dimensionless())
    }

    /// Returns true if any component is an offset temperature scale.
    pub fn has_relative_scale(&self) -> Result<bool, ParseError> {
        for symbol in self.components.keys() {
            let info = UNIT_REGISTRY
                .lookup(symbol)
                .ok_or_else(|| ParseError::UnknownUnit(symbol.clone()))?;
            if info.relative_scale {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Computes the overall dimension of this unit.
    pub fn dimension(&self) -> Result<Dimension, ParseError> {
        let mut result = Dimension::dimensionless();

        for (symbol, &exp) in &self.components {
            let info = UNIT_REGISTRY
                .lookup(symbol)
                .ok_or_else(|| ParseError::UnknownUnit(symbol.clone()))?;
            let exp = i8::try_from(exp)
                .map_err(|_| ParseError::InvalidExponent(exp.to_string()))?;
            result = result + info.dimension.pow(exp);
        }

        Ok(result)
    }

    /// Computes the SI conversion factor for this unit.
    ///
    /// The factor is the multiplier to convert a value in this unit
    /// to the equivalent SI base units.
    pub fn to_si_factor(&self) -> Result<f64, ParseError> {
        let mut factor = 1.0;

        for (symbol, &exp) in &self.components {
            let info = UNIT_REGISTRY
                .lookup(symbol)
                .ok_or_else(|| ParseError::UnknownUnit(symbol.clone()))?;
            factor *= info.to_si_factor.powi(exp);
        }

        Ok(factor)
    }

    /// Multiplies this unit by another unit.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        let mut components = self.components.clone();
        for (symbol, exp) in &other.components {
            *components.entry(symbol.clone()).or_insert(0) += exp;
        }
        Self::from_components(components)
    }

    /// Divides this unit by another unit.
    #[must_use]
    pub fn divide(&self, other: &Self) -> Self {
        self.multiply(&other.pow(-1))
    }

    /// Raises this unit to a power.
    #[must_use]
    pub fn pow(&self, exp: i32) -> Self {
        let components = self
            .components
            .iter()
            .map(|(k, v)| (k.clone(), v * exp))
            .collect();
        Self::from_components(components)
    }

    /// Returns a normalized string representation of this unit.
    ///
    /// The normalized form is canonical: units with positive exponents
    /// first (alphabetically), then `/`, then units with negative exponents.
    #[must_use]
    pub fn normalized(&self) -> String {
        let format_part = |parts: Vec<(&str, i32)>| -> String {
            parts
                .iter()
                .map(|(s, e)| {
                    if *e == 1 {
                        s.to_string()
                    } else {
                        format!("{s}^{e}")
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        };

        // BTreeMap iteration is already sorted by symbol
        let numerator = self
            .components
            .iter()
            .filter(|&(_, &exp)| exp > 0)
            .map(|(s, &e)| (s.as_str(), e))
            .collect();
        let denominator = self
            .components
            .iter()
            .filter(|&(_, &exp)| exp < 0)
            .map(|(s, &e)| (s.as_str(), -e))
            .collect();

        let num_str = format_part(numerator);
        let den_str = format_part(denominator);

        match (num_str.is_empty(), den_str.is_empty()) {
            (true, true) => "1".to_string(),
            (false, true) => num_str,
            (true, false) => format!("1 / {den_str}"),
            (false, false) => format!("{num_str} / {den_str}"),
        }
    }
}

impl fmt::Display for ParsedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}

/// Rewrites unicode superscripts and the micro sign into their ASCII forms.
///
/// `cm⁻¹` becomes `cm^-1`, `m²` becomes `m^2`, `μm` becomes `um`.
fn normalize_symbols(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_superscript = false;

    for c in input.chars() {
        let superscript = match c {
            '⁻' => Some('-'),
            '⁰' => Some('0'),
            '¹' => Some('1'),
            '²' => Some('2'),
            '³' => Some('3'),
            '⁴' => Some('4'),
            '⁵' => Some('5'),
            '⁶' => Some('6'),
            '⁷' => Some('7'),
            '⁸' => Some('8'),
            '⁹' => Some('9'),
            _ => None,
        };

        match superscript {
            Some(ascii) => {
                if !in_superscript {
                    out.push('^');
                    in_superscript = true;
                }
                out.push(ascii);
            }
            None => {
                in_superscript = false;
                match c {
                    // Greek small mu and the micro sign
                    'μ' | 'µ' => out.push('u'),
                    _ => out.push(c),
                }
            }
        }
    }

    out
}

/// Internal parser for unit strings.
struct UnitParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> UnitParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse_expression(&mut self) -> Result<ParsedUnit, ParseError> {
        self.skip_whitespace();
        let mut result = self.parse_term()?;

        loop {
            self.skip_whitespace();
            if self.peek() == Some('/') {
                self.advance();
            } else if self.check_keyword("per") {
                self.skip_keyword("per");
            } else {
                break;
            }
            self.skip_whitespace();
            let divisor = self.parse_term()?;
            result = result.divide(&divisor);
        }

        Ok(result)
    }

    fn parse_term(&mut self) -> Result<ParsedUnit, ParseError> {
        let mut result = self.parse_factor()?;

        loop {
            self.skip_whitespace();

            match self.peek() {
                // Explicit multiplication, including the middle dot
                Some('*') | Some('\u{00B7}') => {
                    self.advance();
                    self.skip_whitespace();
                }
                // Implicit multiplication (space-separated)
                Some(c) if self.is_unit_start(c) && !self.check_keyword("per") => {}
                _ => break,
            }

            let factor = self.parse_factor()?;
            result = result.multiply(&factor);
        }

        Ok(result)
    }

    fn parse_factor(&mut self) -> Result<ParsedUnit, ParseError> {
        self.skip_whitespace();

        if self.peek() == Some('(') {
            self.advance();
            let inner = self.parse_expression()?;
            self.skip_whitespace();
            if self.peek() != Some(')') {
                return Err(ParseError::ParseFailed(
                    "missing closing parenthesis".into(),
                ));
            }
            self.advance();

            let exp = self.parse_optional_exponent()?;
            return Ok(inner.pow(exp));
        }

        let symbol = self.parse_symbol()?;
        let exp = self.parse_optional_exponent()?;

        // A bare "1" is the numerator of reciprocal units such as "1/cm"
        if symbol == "1" {
            return Ok(ParsedUnit::dimensionless());
        }

        let mut components = BTreeMap::new();
        components.insert(symbol, exp);
        Ok(ParsedUnit::from_components(components))
    }

    fn parse_symbol(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace();
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(ParseError::ParseFailed("expected unit symbol".into()));
        }

        let full_symbol = &self.input[start..self.pos];

        // Trailing digits are an implicit exponent ("cm2") unless the whole
        // symbol is itself a registered unit.
        if let Some(last_letter_idx) = full_symbol.rfind(|c: char| c.is_ascii_alphabetic()) {
            let trailing = &full_symbol[last_letter_idx + 1..];
            if !trailing.is_empty()
                && trailing.chars().all(|c| c.is_ascii_digit())
                && UNIT_REGISTRY.lookup(full_symbol).is_none()
            {
                self.pos = start + last_letter_idx + 1;
                return Ok(full_symbol[..=last_letter_idx].to_string());
            }
        }

        Ok(full_symbol.to_string())
    }

    fn parse_optional_exponent(&mut self) -> Result<i32, ParseError> {
        self.skip_whitespace();

        let has_marker = if self.input[self.pos..].starts_with("**") {
            self.pos += 2;
            true
        } else if self.peek() == Some('^') {
            self.advance();
            true
        } else {
            false
        };

        self.skip_whitespace();

        match self.peek() {
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_exponent(),
            _ if has_marker => Err(ParseError::ParseFailed("expected exponent after ^".into())),
            _ => Ok(1),
        }
    }

    fn parse_exponent(&mut self) -> Result<i32, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let exp_str = &self.input[start..self.pos];
        exp_str
            .parse()
            .map_err(|_| ParseError::InvalidExponent(exp_str.to_string()))
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn is_unit_start(&self, c: char) -> bool {
        c.is_ascii_alphabetic() || c == '_' || c == '('
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        let rest = &self.input[self.pos..];
        rest.get(..keyword.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
            && rest[keyword.len()..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_ascii_alphanumeric())
    }

    fn skip_keyword(&mut self, keyword: &str) {
        if self.check_keyword(keyword) {
            self.pos += keyword.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_unit() {
        let unit = ParsedUnit::parse("hPa").unwrap();
        assert_eq!(unit.components().get("hPa"), Some(&1));
    }

    #[test]
    fn test_parse_unit_with_exponent() {
        let unit = ParsedUnit::parse("cm^2").unwrap();
        assert_eq!(unit.components().get("cm"), Some(&2));

        let unit2 = ParsedUnit::parse("cm**2").unwrap();
        assert_eq!(unit, unit2);

        let unit3 = ParsedUnit::parse("cm2").unwrap();
        assert_eq!(unit, unit3);
    }

    #[test]
    fn test_parse_cross_section_unit() {
        let unit = ParsedUnit::parse("cm^2/molecule").unwrap();
        assert_eq!(unit.components().get("cm"), Some(&2));
        assert_eq!(unit.components().get("molecule"), Some(&-1));
        assert_eq!(unit.dimension().unwrap(), Dimension::AREA);

        let unit2 = ParsedUnit::parse("cm^2 per molecule").unwrap();
        assert_eq!(unit, unit2);
    }

    #[test]
    fn test_parse_wavenumber_variants() {
        let a = ParsedUnit::parse("cm^-1").unwrap();
        let b = ParsedUnit::parse("cm-1").unwrap();
        let c = ParsedUnit::parse("cm⁻¹").unwrap();
        let d = ParsedUnit::parse("1/cm").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(c, d);
        assert_eq!(a.dimension().unwrap(), Dimension::INVERSE_LENGTH);
    }

    #[test]
    fn test_parse_micro_sign() {
        let a = ParsedUnit::parse("μm").unwrap();
        let b = ParsedUnit::parse("um").unwrap();
        assert_eq!(a, b);
        assert!((a.to_si_factor().unwrap() - 1e-6).abs() < 1e-18);
    }

    #[test]
    fn test_parse_acceleration() {
        let unit1 = ParsedUnit::parse("m/s^2").unwrap();
        let unit2 = ParsedUnit::parse("m s^-2").unwrap();
        let unit3 = ParsedUnit::parse("m·s⁻²").unwrap();
        assert_eq!(unit1, unit2);
        assert_eq!(unit2, unit3);
        assert_eq!(unit1.dimension().unwrap(), Dimension::ACCELERATION);
    }

    #[test]
    fn test_parse_with_whitespace() {
        let unit1 = ParsedUnit::parse("g/kg").unwrap();
        let unit2 = ParsedUnit::parse("  g  /  kg  ").unwrap();
        assert_eq!(unit1, unit2);
        assert!(unit1.is_dimensionless().unwrap());
    }

    #[test]
    fn test_normalized_output() {
        let unit = ParsedUnit::parse("molecule^-1 cm^2").unwrap();
        assert_eq!(unit.normalized(), "cm^2 / molecule");
    }

    #[test]
    fn test_dimensionless() {
        let unit = ParsedUnit::parse("1").unwrap();
        assert!(unit.has_no_components());
        assert!(unit.is_dimensionless().unwrap());

        let unit2 = ParsedUnit::parse("dimensionless").unwrap();
        assert!(unit2.has_no_components());
    }

    #[test]
    fn test_kg_per_kg_cancels() {
        let unit = ParsedUnit::parse("kg/kg").unwrap();
        assert!(unit.has_no_components());
    }

    #[test]
    fn test_relative_scale_detection() {
        assert!(ParsedUnit::parse("degC").unwrap().has_relative_scale().unwrap());
        assert!(!ParsedUnit::parse("K").unwrap().has_relative_scale().unwrap());
    }

    #[test]
    fn test_to_si_factor() {
        let unit = ParsedUnit::parse("hPa").unwrap();
        assert!((unit.to_si_factor().unwrap() - 100.0).abs() < f64::EPSILON);

        let unit2 = ParsedUnit::parse("km").unwrap();
        assert!((unit2.to_si_factor().unwrap() - 1e3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_symbol_fails_on_dimension() {
        let unit = ParsedUnit::parse("furlong").unwrap();
        assert!(matches!(unit.dimension(), Err(ParseError::UnknownUnit(_))));
    }

    #[test]
    fn test_empty_unit_error() {
        assert!(matches!(ParsedUnit::parse(""), Err(ParseError::EmptyUnit)));
        assert!(matches!(
            ParsedUnit::parse("   "),
            Err(ParseError::EmptyUnit)
        ));
    }

    #[test]
    fn test_trailing_garbage_error() {
        assert!(ParsedUnit::parse("hPa)").is_err());
        assert!(ParsedUnit::parse("m^").is_err());
    }
}
