//! Location-string parser
//!
//! Parses device-produced addresses into [`ParsedLocation`] values.
//!
//! Grammar:
//! ```text
//! address   = [fragment] path [offset]
//! fragment  = "/body/DocFragment[" number "]"
//! path      = segment+
//! segment   = "/" tag ["[" number "]"]
//! tag       = (ALPHA | "_") (ALNUM | "_" | "-" | "." | ":")*
//! offset    = "/text()." number
//! number    = DIGIT+
//! ```
//!
//! Fragment and sibling numbers are 1-based; zero is rejected.

use super::types::{is_tag_char, is_tag_start, ParsedLocation, FRAGMENT_PREFIX, TEXT_SUFFIX};
use thiserror::Error;

/// Address parsing errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum XPointParseError {
    #[error("Empty location string")]
    Empty,

    #[error("Expected '/' at position {0}")]
    ExpectedSlash(usize),

    #[error("Expected tag name at position {0}")]
    ExpectedTagName(usize),

    #[error("Expected number at position {0}")]
    ExpectedNumber(usize),

    #[error("Number out of range at position {0}")]
    NumberOutOfRange(usize),

    #[error("Fragment number must be at least 1 (position {0})")]
    ZeroFragment(usize),

    #[error("Sibling index must be at least 1 (position {0})")]
    ZeroIndex(usize),

    #[error("Location has no path after position {0}")]
    EmptyPath(usize),

    #[error("Expected '.' and character offset after text() at position {0}")]
    MissingOffset(usize),

    #[error("Unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
}

/// Parser state
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), XPointParseError> {
        if self.skip_if(expected) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> XPointParseError {
        match self.peek() {
            Some(ch) => XPointParseError::UnexpectedChar(ch, self.pos),
            None => XPointParseError::UnexpectedChar('\0', self.pos),
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn skip_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Parse a sequence of digits as u32
    fn parse_number(&mut self) -> Result<u32, XPointParseError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(XPointParseError::ExpectedNumber(start));
        }

        self.input[start..self.pos]
            .parse()
            .map_err(|_| XPointParseError::NumberOutOfRange(start))
    }

    /// Parse `/body/DocFragment[N]` if present
    fn parse_fragment(&mut self) -> Result<Option<u32>, XPointParseError> {
        if !self.skip_str(FRAGMENT_PREFIX) {
            return Ok(None);
        }

        let start = self.pos;
        let fragment = self.parse_number()?;
        if fragment == 0 {
            return Err(XPointParseError::ZeroFragment(start));
        }
        self.expect(']')?;

        Ok(Some(fragment))
    }

    /// Parse a tag name with an optional `[N]` sibling index
    fn parse_segment(&mut self) -> Result<(), XPointParseError> {
        match self.peek() {
            Some(ch) if is_tag_start(ch) => {
                self.advance();
            }
            _ => return Err(XPointParseError::ExpectedTagName(self.pos)),
        }
        while let Some(ch) = self.peek() {
            if is_tag_char(ch) {
                self.advance();
            } else {
                break;
            }
        }

        if self.skip_if('[') {
            let start = self.pos;
            if self.parse_number()? == 0 {
                return Err(XPointParseError::ZeroIndex(start));
            }
            self.expect(']')?;
        }

        Ok(())
    }

    /// Parse `/text().N`, positioned just before `/text()`
    fn parse_offset(&mut self) -> Result<u32, XPointParseError> {
        self.skip_str(TEXT_SUFFIX);
        if !self.skip_if('.') {
            return Err(XPointParseError::MissingOffset(self.pos));
        }
        self.parse_number()
    }

    /// Parse a complete address
    fn parse_location(&mut self) -> Result<ParsedLocation, XPointParseError> {
        let fragment = self.parse_fragment()?;

        let path_start = self.pos;
        if self.peek() != Some('/') {
            return Err(XPointParseError::ExpectedSlash(self.pos));
        }

        let mut path_end = path_start;
        let mut offset = None;
        while self.peek() == Some('/') {
            if self.starts_with(TEXT_SUFFIX) {
                path_end = self.pos;
                offset = Some(self.parse_offset()?);
                break;
            }
            self.advance();
            self.parse_segment()?;
            path_end = self.pos;
        }

        if path_end == path_start {
            return Err(XPointParseError::EmptyPath(path_start));
        }

        Ok(ParsedLocation {
            fragment,
            path: self.input[path_start..path_end].to_string(),
            offset,
        })
    }
}

/// Parse a location string into a [`ParsedLocation`]
pub fn parse(input: &str) -> Result<ParsedLocation, XPointParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(XPointParseError::Empty);
    }

    let mut parser = Parser::new(input);
    let location = parser.parse_location()?;

    // Ensure we consumed all input
    if !parser.at_end() {
        return Err(parser.unexpected());
    }

    Ok(location)
}

/// Parse a location string, discarding the error
pub fn try_parse(input: &str) -> Option<ParsedLocation> {
    parse(input).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_address() {
        let location = parse("/body/DocFragment[2]/body/div[3]/p/text().37").unwrap();
        assert_eq!(location.fragment, Some(2));
        assert_eq!(location.path, "/body/div[3]/p");
        assert_eq!(location.offset, Some(37));
        assert_eq!(location.char_offset(), 37);
    }

    #[test]
    fn test_parse_without_fragment() {
        let location = parse("/body/div/p").unwrap();
        assert_eq!(location.fragment, None);
        assert_eq!(location.path, "/body/div/p");
        assert_eq!(location.char_offset(), 0);
    }

    #[test]
    fn test_parse_without_offset() {
        let location = parse("/body/DocFragment[999]/body/p").unwrap();
        assert_eq!(location.fragment, Some(999));
        assert_eq!(location.path, "/body/p");
        assert_eq!(location.offset, None);
    }

    #[test]
    fn test_parse_namespaced_and_dotted_tags() {
        let location = parse("/body/DocFragment[1]/body/epub:switch/svg.image[2]").unwrap();
        assert_eq!(location.path, "/body/epub:switch/svg.image[2]");
    }

    #[test]
    fn test_tag_named_text_is_a_segment() {
        let location = parse("/body/text[2]/p").unwrap();
        assert_eq!(location.path, "/body/text[2]/p");
    }

    #[test]
    fn test_trims_whitespace() {
        let location = parse("  /body/p[2]/text().5\n").unwrap();
        assert_eq!(location.path, "/body/p[2]");
        assert_eq!(location.char_offset(), 5);
    }

    #[test]
    fn test_roundtrip_display() {
        for original in [
            "/body/DocFragment[12]/body/div[2]/p[5]/text().42",
            "/body/div/p",
            "/body/DocFragment[3]/body/section/h2",
        ] {
            assert_eq!(parse(original).unwrap().to_string(), original);
        }
    }

    #[test]
    fn test_error_empty() {
        assert_eq!(parse("   "), Err(XPointParseError::Empty));
    }

    #[test]
    fn test_error_not_an_address() {
        assert_eq!(
            parse("not-a-valid-address"),
            Err(XPointParseError::ExpectedSlash(0))
        );
    }

    #[test]
    fn test_error_zero_fragment() {
        assert_eq!(
            parse("/body/DocFragment[0]/body/p"),
            Err(XPointParseError::ZeroFragment(18))
        );
    }

    #[test]
    fn test_error_unclosed_fragment() {
        assert!(matches!(
            parse("/body/DocFragment[3/body/p"),
            Err(XPointParseError::UnexpectedChar('/', _))
        ));
    }

    #[test]
    fn test_error_fragment_without_path() {
        assert_eq!(
            parse("/body/DocFragment[3]"),
            Err(XPointParseError::ExpectedSlash(20))
        );
        assert_eq!(
            parse("/body/DocFragment[3]/text().4"),
            Err(XPointParseError::EmptyPath(20))
        );
    }

    #[test]
    fn test_error_zero_sibling_index() {
        assert_eq!(parse("/body/p[0]"), Err(XPointParseError::ZeroIndex(8)));
    }

    #[test]
    fn test_error_text_without_offset() {
        assert_eq!(
            parse("/body/p/text()"),
            Err(XPointParseError::MissingOffset(14))
        );
    }

    #[test]
    fn test_error_trailing_garbage() {
        assert_eq!(
            parse("/body/p/text().12abc"),
            Err(XPointParseError::UnexpectedChar('a', 17))
        );
    }

    #[test]
    fn test_error_bad_segment() {
        assert_eq!(parse("/body//p"), Err(XPointParseError::ExpectedTagName(6)));
        assert_eq!(parse("/body/3p"), Err(XPointParseError::ExpectedTagName(6)));
    }

    #[test]
    fn test_error_offset_overflow() {
        assert_eq!(
            parse("/body/p/text().99999999999"),
            Err(XPointParseError::NumberOutOfRange(15))
        );
    }

    #[test]
    fn test_try_parse() {
        assert!(try_parse("/body/p").is_some());
        assert!(try_parse("garbage").is_none());
    }
}
