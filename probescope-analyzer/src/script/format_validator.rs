//! Format string validation for printf calls
//!
//! This module statically matches a printf-style template against the
//! types of its call-site arguments. Scanning is an explicit state machine
//! over the template's characters (flag, width digits, length modifier,
//! conversion character) so the edge cases - a trailing `%`, a doubled
//! `%%`, an unknown conversion - are explicit states instead of silent
//! non-matches.

use probescope_types::{SizedType, TypeKind};
use thiserror::Error;

/// Length modifiers accepted (and otherwise ignored) between the width
/// and the conversion character. Two-character modifiers listed first so
/// the scan is greedy.
const LENGTH_MODIFIERS: [&str; 7] = ["hh", "ll", "h", "l", "j", "z", "t"];

/// Argument class a conversion character demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionClass {
    Integer,
    String,
}

impl std::fmt::Display for ConversionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionClass::Integer => write!(f, "integer"),
            ConversionClass::String => write!(f, "string"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("printf: Unknown format string token: %{0}")]
    UnknownConversion(char),

    #[error("printf: Not enough arguments for format string ({supplied} supplied, {expected} expected)")]
    NotEnoughArguments { supplied: usize, expected: usize },

    #[error("printf: Too many arguments for format string ({supplied} supplied, {expected} expected)")]
    TooManyArguments { supplied: usize, expected: usize },

    #[error("printf: %{token} specifier for argument {position} expects a value of type {expected} ({actual} supplied)")]
    ArgumentType {
        token: char,
        /// 1-based position among the format arguments.
        position: usize,
        expected: ConversionClass,
        actual: String,
    },
}

pub struct FormatValidator;

impl FormatValidator {
    /// Validate that the template's conversion tokens match `args` exactly:
    /// same count, and each token's class satisfied by the argument type at
    /// the same position. Verification aborts at the first mismatch.
    pub fn validate_format_arguments(
        format: &str,
        args: &[SizedType],
    ) -> Result<(), FormatError> {
        let tokens = Self::scan_tokens(format);

        if args.len() < tokens.len() {
            return Err(FormatError::NotEnoughArguments {
                supplied: args.len(),
                expected: tokens.len(),
            });
        }
        if args.len() > tokens.len() {
            return Err(FormatError::TooManyArguments {
                supplied: args.len(),
                expected: tokens.len(),
            });
        }

        for (i, (conversion, arg)) in tokens.iter().zip(args).enumerate() {
            let expected = match conversion {
                'd' | 'u' | 'x' | 'X' | 'p' => ConversionClass::Integer,
                's' => ConversionClass::String,
                other => return Err(FormatError::UnknownConversion(*other)),
            };

            let satisfied = match expected {
                ConversionClass::Integer => arg.kind == TypeKind::Integer,
                ConversionClass::String => arg.is_string_compatible(),
            };
            if !satisfied {
                return Err(FormatError::ArgumentType {
                    token: *conversion,
                    position: i + 1,
                    expected,
                    actual: arg.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Scan the template for conversion tokens, returning each token's
    /// conversion character (which may be unknown - classification happens
    /// during pairing so count mismatches are reported first).
    ///
    /// Token grammar: `%` `-`? digits* length-modifier? conversion, where
    /// the conversion is any alphabetic character. A `%` not completed by
    /// an alphabetic character (trailing `%`, `%%`, `%5.`) is not a token.
    fn scan_tokens(format: &str) -> Vec<char> {
        let mut tokens = Vec::new();
        let chars: Vec<char> = format.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            if chars[i] != '%' {
                i += 1;
                continue;
            }
            i += 1;

            // flag
            if i < chars.len() && chars[i] == '-' {
                i += 1;
            }
            // width digits
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }

            if i >= chars.len() || !chars[i].is_ascii_alphabetic() {
                // Incomplete token: scanning resumes at the current
                // character, so `%%` leaves the second `%` as a literal.
                continue;
            }

            // A length modifier only counts as one when another alphabetic
            // character follows to serve as the conversion; otherwise the
            // modifier character itself is the conversion (and will be
            // rejected as unknown during pairing).
            let rest: String = chars[i..].iter().collect();
            let modifier_len = LENGTH_MODIFIERS
                .iter()
                .find(|m| {
                    rest.starts_with(**m)
                        && rest[m.len()..]
                            .chars()
                            .next()
                            .is_some_and(|c| c.is_ascii_alphabetic())
                })
                .map_or(0, |m| m.len());
            i += modifier_len;

            tokens.push(chars[i]);
            i += 1;
        }

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probescope_types::STRING_SIZE;

    fn integer() -> SizedType {
        SizedType::integer()
    }

    fn string() -> SizedType {
        SizedType::string(STRING_SIZE)
    }

    #[test]
    fn test_scan_tokens() {
        assert_eq!(FormatValidator::scan_tokens("hello world"), vec![]);
        assert_eq!(FormatValidator::scan_tokens("int: %d"), vec!['d']);
        assert_eq!(FormatValidator::scan_tokens("%d %s %d"), vec!['d', 's', 'd']);
        assert_eq!(FormatValidator::scan_tokens("%-20s"), vec!['s']);
        assert_eq!(FormatValidator::scan_tokens("%08x"), vec!['x']);

        // Length modifiers are skipped; the conversion is what remains.
        assert_eq!(FormatValidator::scan_tokens("%hhd"), vec!['d']);
        assert_eq!(FormatValidator::scan_tokens("%hd"), vec!['d']);
        assert_eq!(FormatValidator::scan_tokens("%lld"), vec!['d']);
        assert_eq!(FormatValidator::scan_tokens("%lu"), vec!['u']);
        assert_eq!(FormatValidator::scan_tokens("%jx"), vec!['x']);
        assert_eq!(FormatValidator::scan_tokens("%zX"), vec!['X']);
        assert_eq!(FormatValidator::scan_tokens("%tp"), vec!['p']);

        // Incomplete tokens are not tokens.
        assert_eq!(FormatValidator::scan_tokens("trailing %"), vec![]);
        assert_eq!(FormatValidator::scan_tokens("100%% done"), vec![]);
        assert_eq!(FormatValidator::scan_tokens("%5"), vec![]);

        // A lone modifier character is its own (unknown) conversion.
        assert_eq!(FormatValidator::scan_tokens("%h "), vec!['h']);
    }

    #[test]
    fn test_matching_arguments() {
        assert!(FormatValidator::validate_format_arguments("no tokens", &[]).is_ok());
        assert!(FormatValidator::validate_format_arguments("int: %d", &[integer()]).is_ok());
        assert!(
            FormatValidator::validate_format_arguments("%d %s", &[integer(), string()]).is_ok()
        );
        assert!(FormatValidator::validate_format_arguments("%-8lld", &[integer()]).is_ok());
    }

    #[test]
    fn test_count_mismatch_reports_literal_counts() {
        assert_eq!(
            FormatValidator::validate_format_arguments("need one: %d", &[]),
            Err(FormatError::NotEnoughArguments {
                supplied: 0,
                expected: 1
            })
        );
        assert_eq!(
            FormatValidator::validate_format_arguments("none", &[integer()]),
            Err(FormatError::TooManyArguments {
                supplied: 1,
                expected: 0
            })
        );
    }

    #[test]
    fn test_count_checked_before_conversions() {
        // An unknown conversion still counts as a token, and the count
        // check runs first.
        assert_eq!(
            FormatValidator::validate_format_arguments("%q", &[]),
            Err(FormatError::NotEnoughArguments {
                supplied: 0,
                expected: 1
            })
        );
        assert_eq!(
            FormatValidator::validate_format_arguments("%q", &[integer()]),
            Err(FormatError::UnknownConversion('q'))
        );
    }

    #[test]
    fn test_first_mismatch_aborts() {
        let err =
            FormatValidator::validate_format_arguments("%d %s %d", &[integer(), integer(), string()])
                .unwrap_err();
        assert_eq!(
            err,
            FormatError::ArgumentType {
                token: 's',
                position: 2,
                expected: ConversionClass::String,
                actual: "integer".to_string(),
            }
        );
    }

    #[test]
    fn test_symbols_are_string_compatible_here() {
        assert!(FormatValidator::validate_format_arguments("%s", &[SizedType::sym()]).is_ok());
        assert!(FormatValidator::validate_format_arguments("%s", &[SizedType::usym()]).is_ok());
        assert!(FormatValidator::validate_format_arguments("%d", &[SizedType::sym()]).is_err());
    }
}
