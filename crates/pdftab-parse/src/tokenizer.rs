//! Content stream lexer.
//!
//! Turns raw content stream bytes into a sequence of [`Operator`]s, each
//! carrying the [`Operand`] arguments that preceded it on the operand stack.
//! The lexer is incremental: [`Lexer::next_operator`] yields one operator at
//! a time, so an interpreter can keep everything emitted before a malformed
//! tail.
//!
//! Dictionaries (`<< ... >>`) are recognized and skipped; no dictionary is
//! relevant to the table pipeline's operator set. Inline images (`BI ... ID
//! ... EI`) are skipped the same way. Comments are stripped.

use crate::error::StreamError;

/// A content stream operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Integer number (e.g., `42`, `-7`).
    Integer(i64),
    /// Real (floating-point) number (e.g., `3.14`, `.5`).
    Real(f64),
    /// Name object (e.g., `/F1`). Stored without the leading `/`.
    Name(String),
    /// Literal string delimited by parentheses, stored as raw bytes.
    LiteralString(Vec<u8>),
    /// Hexadecimal string delimited by angle brackets, stored as decoded bytes.
    HexString(Vec<u8>),
    /// Array of operands (e.g., `[(A) -20 (B)]`).
    Array(Vec<Operand>),
    /// Boolean value (`true` or `false`).
    Boolean(bool),
    /// The null object.
    Null,
}

/// A content stream operator with its preceding operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    /// Operator name (e.g., `"BT"`, `"Tf"`, `"Tj"`, `"m"`).
    pub name: String,
    /// Operands that preceded this operator on the operand stack.
    pub operands: Vec<Operand>,
}

/// Incremental lexer over a content stream byte slice.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
    tokens_read: usize,
    max_tokens: Option<usize>,
    max_nesting_depth: usize,
}

impl<'a> Lexer<'a> {
    /// Create a lexer with no token cap and the default nesting cap.
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_limits(input, None, 32)
    }

    /// Create a lexer with caller-supplied resource caps.
    pub fn with_limits(
        input: &'a [u8],
        max_tokens: Option<usize>,
        max_nesting_depth: usize,
    ) -> Self {
        Self {
            input,
            pos: 0,
            tokens_read: 0,
            max_tokens,
            max_nesting_depth,
        }
    }

    /// Produce the next operator, or `None` at end of input.
    ///
    /// Operands accumulate until an operator keyword fires with them.
    /// Trailing operands with no operator are discarded at end of input.
    ///
    /// # Errors
    ///
    /// [`StreamError::MalformedStream`] on an unterminated literal string,
    /// hex string, array, or dictionary; [`StreamError::LimitExceeded`] when
    /// a configured cap is hit.
    pub fn next_operator(&mut self) -> Result<Option<Operator>, StreamError> {
        let mut operand_stack: Vec<Operand> = Vec::new();

        while self.pos < self.input.len() {
            self.skip_whitespace_and_comments();
            if self.pos >= self.input.len() {
                break;
            }

            let b = self.input[self.pos];
            match b {
                b'(' => {
                    let s = self.parse_literal_string()?;
                    self.push_operand(&mut operand_stack, Operand::LiteralString(s))?;
                }
                b'<' => {
                    if self.peek(1) == Some(b'<') {
                        self.skip_dictionary()?;
                    } else {
                        let s = self.parse_hex_string()?;
                        self.push_operand(&mut operand_stack, Operand::HexString(s))?;
                    }
                }
                b'[' => {
                    self.pos += 1;
                    let arr = self.parse_array(1)?;
                    self.push_operand(&mut operand_stack, Operand::Array(arr))?;
                }
                b'/' => {
                    let name = self.parse_name();
                    self.push_operand(&mut operand_stack, Operand::Name(name))?;
                }
                b'0'..=b'9' | b'+' | b'-' | b'.' => {
                    let num = self.parse_number()?;
                    self.push_operand(&mut operand_stack, num)?;
                }
                b'a'..=b'z' | b'A'..=b'Z' | b'*' | b'\'' | b'"' => {
                    let keyword = self.parse_keyword();
                    match keyword.as_str() {
                        "true" => {
                            self.push_operand(&mut operand_stack, Operand::Boolean(true))?;
                        }
                        "false" => {
                            self.push_operand(&mut operand_stack, Operand::Boolean(false))?;
                        }
                        "null" => {
                            self.push_operand(&mut operand_stack, Operand::Null)?;
                        }
                        "BI" => {
                            self.skip_inline_image()?;
                        }
                        _ => {
                            self.count_token()?;
                            return Ok(Some(Operator {
                                name: keyword,
                                operands: operand_stack,
                            }));
                        }
                    }
                }
                b']' => {
                    return Err(StreamError::MalformedStream(
                        "unexpected ']' outside array".to_string(),
                    ));
                }
                _ => {
                    // Skip unknown bytes
                    self.pos += 1;
                }
            }
        }

        Ok(None)
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn push_operand(
        &mut self,
        stack: &mut Vec<Operand>,
        operand: Operand,
    ) -> Result<(), StreamError> {
        self.count_token()?;
        stack.push(operand);
        Ok(())
    }

    fn count_token(&mut self) -> Result<(), StreamError> {
        self.tokens_read += 1;
        if let Some(cap) = self.max_tokens {
            if self.tokens_read > cap {
                return Err(StreamError::LimitExceeded {
                    limit_name: "max_tokens".to_string(),
                    limit_value: cap,
                    actual_value: self.tokens_read,
                });
            }
        }
        Ok(())
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.pos < self.input.len() {
            let b = self.input[self.pos];
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while self.pos < self.input.len()
                    && self.input[self.pos] != b'\n'
                    && self.input[self.pos] != b'\r'
                {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Parse a literal string `(...)` with balanced parentheses and escapes.
    /// Assumes the current byte is `(`.
    fn parse_literal_string(&mut self) -> Result<Vec<u8>, StreamError> {
        self.pos += 1; // skip opening '('

        let mut result = Vec::new();
        let mut depth = 1u32;

        while self.pos < self.input.len() {
            let b = self.input[self.pos];
            match b {
                b'(' => {
                    depth += 1;
                    result.push(b'(');
                    self.pos += 1;
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(result);
                    }
                    result.push(b')');
                    self.pos += 1;
                }
                b'\\' => {
                    self.pos += 1;
                    if self.pos >= self.input.len() {
                        return Err(StreamError::MalformedStream(
                            "unterminated escape in literal string".to_string(),
                        ));
                    }
                    let escaped = self.input[self.pos];
                    match escaped {
                        b'n' => result.push(b'\n'),
                        b'r' => result.push(b'\r'),
                        b't' => result.push(b'\t'),
                        b'b' => result.push(0x08),
                        b'f' => result.push(0x0C),
                        b'(' => result.push(b'('),
                        b')' => result.push(b')'),
                        b'\\' => result.push(b'\\'),
                        b'\r' => {
                            // Backslash + CR (or CR+LF) is a line continuation
                            self.pos += 1;
                            if self.pos < self.input.len() && self.input[self.pos] == b'\n' {
                                self.pos += 1;
                            }
                            continue;
                        }
                        b'\n' => {
                            self.pos += 1;
                            continue;
                        }
                        b'0'..=b'7' => {
                            // Octal escape (1-3 digits)
                            let mut val = escaped - b'0';
                            for _ in 0..2 {
                                match self.peek(1) {
                                    Some(d @ b'0'..=b'7') => {
                                        self.pos += 1;
                                        val = val.wrapping_mul(8).wrapping_add(d - b'0');
                                    }
                                    _ => break,
                                }
                            }
                            result.push(val);
                            self.pos += 1;
                            continue;
                        }
                        _ => {
                            // Unknown escape: keep the character itself
                            result.push(escaped);
                        }
                    }
                    self.pos += 1;
                }
                _ => {
                    result.push(b);
                    self.pos += 1;
                }
            }
        }

        Err(StreamError::MalformedStream(
            "unterminated literal string".to_string(),
        ))
    }

    /// Parse a hex string `<...>`. Assumes the current byte is `<`.
    fn parse_hex_string(&mut self) -> Result<Vec<u8>, StreamError> {
        self.pos += 1; // skip '<'

        let mut hex_chars = Vec::new();
        let mut terminated = false;
        while self.pos < self.input.len() {
            let b = self.input[self.pos];
            if b == b'>' {
                self.pos += 1;
                terminated = true;
                break;
            }
            if is_whitespace(b) {
                self.pos += 1;
                continue;
            }
            hex_chars.push(b);
            self.pos += 1;
        }
        if !terminated {
            return Err(StreamError::MalformedStream(
                "unterminated hex string".to_string(),
            ));
        }

        // Odd digit count: pad with a trailing 0
        if hex_chars.len() % 2 != 0 {
            hex_chars.push(b'0');
        }

        let mut result = Vec::with_capacity(hex_chars.len() / 2);
        for chunk in hex_chars.chunks(2) {
            let hi = hex_digit(chunk[0])?;
            let lo = hex_digit(chunk[1])?;
            result.push((hi << 4) | lo);
        }
        Ok(result)
    }

    /// Parse an array until `]`. Assumes `[` already consumed.
    fn parse_array(&mut self, depth: usize) -> Result<Vec<Operand>, StreamError> {
        if depth > self.max_nesting_depth {
            return Err(StreamError::LimitExceeded {
                limit_name: "max_nesting_depth".to_string(),
                limit_value: self.max_nesting_depth,
                actual_value: depth,
            });
        }

        let mut elements = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.input.len() {
                return Err(StreamError::MalformedStream(
                    "unterminated array".to_string(),
                ));
            }

            let b = self.input[self.pos];
            match b {
                b']' => {
                    self.pos += 1;
                    return Ok(elements);
                }
                b'(' => {
                    let s = self.parse_literal_string()?;
                    self.count_token()?;
                    elements.push(Operand::LiteralString(s));
                }
                b'<' => {
                    let s = self.parse_hex_string()?;
                    self.count_token()?;
                    elements.push(Operand::HexString(s));
                }
                b'[' => {
                    self.pos += 1;
                    let arr = self.parse_array(depth + 1)?;
                    self.count_token()?;
                    elements.push(Operand::Array(arr));
                }
                b'/' => {
                    let name = self.parse_name();
                    self.count_token()?;
                    elements.push(Operand::Name(name));
                }
                b'0'..=b'9' | b'+' | b'-' | b'.' => {
                    let num = self.parse_number()?;
                    self.count_token()?;
                    elements.push(num);
                }
                b'a'..=b'z' | b'A'..=b'Z' => {
                    let keyword = self.parse_keyword();
                    self.count_token()?;
                    match keyword.as_str() {
                        "true" => elements.push(Operand::Boolean(true)),
                        "false" => elements.push(Operand::Boolean(false)),
                        "null" => elements.push(Operand::Null),
                        // Operators never appear in arrays; keep the bytes
                        _ => elements.push(Operand::Name(keyword)),
                    }
                }
                _ => {
                    return Err(StreamError::MalformedStream(format!(
                        "unexpected byte in array: 0x{b:02X}"
                    )));
                }
            }
        }
    }

    /// Skip a dictionary `<< ... >>` through its matching terminator,
    /// honoring nested dictionaries, strings, and comments. Assumes the
    /// current bytes are `<<`.
    fn skip_dictionary(&mut self) -> Result<(), StreamError> {
        let mut depth = 0usize;
        while self.pos < self.input.len() {
            let b = self.input[self.pos];
            if b == b'<' && self.peek(1) == Some(b'<') {
                depth += 1;
                self.pos += 2;
                if depth > self.max_nesting_depth {
                    return Err(StreamError::LimitExceeded {
                        limit_name: "max_nesting_depth".to_string(),
                        limit_value: self.max_nesting_depth,
                        actual_value: depth,
                    });
                }
            } else if b == b'>' && self.peek(1) == Some(b'>') {
                self.pos += 2;
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            } else if b == b'(' {
                self.parse_literal_string()?;
            } else if b == b'<' {
                self.parse_hex_string()?;
            } else if b == b'%' {
                self.skip_whitespace_and_comments();
            } else {
                self.pos += 1;
            }
        }
        Err(StreamError::MalformedStream(
            "unterminated dictionary".to_string(),
        ))
    }

    /// Skip an inline image `BI <dict> ID <data> EI`. Called after the `BI`
    /// keyword has been consumed. The image contributes nothing to the
    /// table pipeline.
    fn skip_inline_image(&mut self) -> Result<(), StreamError> {
        // Find the ID keyword that separates the dictionary from the data.
        let mut found_id = false;
        while self.pos + 1 < self.input.len() {
            if self.input[self.pos] == b'I'
                && self.input[self.pos + 1] == b'D'
                && self
                    .peek(2)
                    .map(is_whitespace)
                    .unwrap_or(true)
            {
                self.pos += 2;
                if self.pos < self.input.len() && is_whitespace(self.input[self.pos]) {
                    self.pos += 1;
                }
                found_id = true;
                break;
            }
            self.pos += 1;
        }
        if !found_id {
            return Err(StreamError::MalformedStream(
                "unterminated inline image (missing ID)".to_string(),
            ));
        }

        // Scan the binary data for a whitespace-delimited EI.
        let data_start = self.pos;
        while self.pos + 1 < self.input.len() {
            if (self.pos == data_start || is_whitespace(self.input[self.pos - 1]))
                && self.input[self.pos] == b'E'
                && self.input[self.pos + 1] == b'I'
                && self
                    .peek(2)
                    .map(|b| is_whitespace(b) || is_delimiter(b))
                    .unwrap_or(true)
            {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(StreamError::MalformedStream(
            "unterminated inline image (missing EI)".to_string(),
        ))
    }

    /// Parse a `/Name` token with `#XX` hex escapes. Assumes the current
    /// byte is `/`.
    fn parse_name(&mut self) -> String {
        self.pos += 1; // skip '/'

        let start = self.pos;
        while self.pos < self.input.len()
            && !is_whitespace(self.input[self.pos])
            && !is_delimiter(self.input[self.pos])
        {
            self.pos += 1;
        }

        let raw = &self.input[start..self.pos];
        let mut name = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                if let (Ok(hi), Ok(lo)) = (hex_digit(raw[i + 1]), hex_digit(raw[i + 2])) {
                    name.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
            name.push(raw[i]);
            i += 1;
        }
        String::from_utf8_lossy(&name).into_owned()
    }

    /// Parse a number (integer or real).
    fn parse_number(&mut self) -> Result<Operand, StreamError> {
        let start = self.pos;
        let mut has_dot = false;

        if self.pos < self.input.len()
            && (self.input[self.pos] == b'+' || self.input[self.pos] == b'-')
        {
            self.pos += 1;
        }
        while self.pos < self.input.len() {
            let b = self.input[self.pos];
            if b == b'.' {
                if has_dot {
                    break; // second dot ends the token
                }
                has_dot = true;
                self.pos += 1;
            } else if b.is_ascii_digit() {
                self.pos += 1;
            } else {
                break;
            }
        }

        let token = &self.input[start..self.pos];
        let s = std::str::from_utf8(token)
            .map_err(|_| StreamError::MalformedStream("invalid number token".to_string()))?;

        if has_dot {
            let val: f64 = s
                .parse()
                .map_err(|_| StreamError::MalformedStream(format!("invalid real number: {s}")))?;
            Ok(Operand::Real(val))
        } else {
            let val: i64 = s
                .parse()
                .map_err(|_| StreamError::MalformedStream(format!("invalid integer: {s}")))?;
            Ok(Operand::Integer(val))
        }
    }

    /// Parse a keyword (letters plus `*`, `'`, `"`).
    fn parse_keyword(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.input.len() {
            let b = self.input[self.pos];
            if b.is_ascii_alphabetic() || b == b'*' || b == b'\'' || b == b'"' {
                self.pos += 1;
            } else {
                break;
            }
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }
}

/// Lex an entire content stream into operators.
///
/// Convenience wrapper over [`Lexer`] for callers that want the full
/// sequence up front.
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, StreamError> {
    let mut lexer = Lexer::new(input);
    let mut ops = Vec::new();
    while let Some(op) = lexer.next_operator()? {
        ops.push(op);
    }
    Ok(ops)
}

/// Returns `true` for the six content-stream whitespace bytes.
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

/// Returns `true` for delimiter bytes.
fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Convert a hex digit character to its value (0-15).
fn hex_digit(b: u8) -> Result<u8, StreamError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(StreamError::MalformedStream(format!(
            "invalid hex digit: {:?}",
            b as char
        ))),
    }
}
