//! LC-T decoder, grounded in `lc_t_codec.py`'s `LCTDecoder`.

use crate::error::CodecError;
use hlx_value::{Contract, Digest, Handle, Object, Value, TAG_GENERIC};

/// Decodes a complete LC-T string to a `Value`. Trailing non-whitespace
/// content after a valid value is an error (mirrors `LCTDecoder.decode`'s
/// "unexpected content after value" check).
pub fn decode_value(text: &str) -> Result<Value, CodecError> {
    let chars: Vec<char> = text.chars().collect();
    let mut p = Parser { chars, pos: 0 };
    if p.chars.is_empty() {
        return Err(CodecError::LcDecode("empty input".into()));
    }
    let value = p.parse_value()?;
    p.skip_whitespace();
    if p.pos < p.chars.len() {
        return Err(CodecError::LcDecode(format!(
            "unexpected content after value at position {}",
            p.pos
        )));
    }
    Ok(value)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Tries to match a bare keyword (`NULL`/`TRUE`/`FALSE`) at the
    /// current position, requiring a word boundary right after it so
    /// `NULLish` doesn't get mistaken for `NULL`.
    fn try_match_keyword(&mut self, keyword: &str) -> bool {
        let kw: Vec<char> = keyword.chars().collect();
        if self.pos + kw.len() > self.chars.len() {
            return false;
        }
        if self.chars[self.pos..self.pos + kw.len()] != kw[..] {
            return false;
        }
        let end = self.pos + kw.len();
        let boundary_ok = self.chars.get(end).map_or(true, |c| !(c.is_alphanumeric() || *c == '_'));
        if boundary_ok {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn parse_value(&mut self) -> Result<Value, CodecError> {
        self.skip_whitespace();
        let ch = self.peek().ok_or_else(|| CodecError::LcDecode("unexpected end of input".into()))?;

        if self.try_match_keyword("NULL") {
            return Ok(Value::Null);
        }
        if self.try_match_keyword("TRUE") {
            return Ok(Value::Bool(true));
        }
        if self.try_match_keyword("FALSE") {
            return Ok(Value::Bool(false));
        }

        match ch {
            '@' => {
                self.pos += 1;
                let ident = self.read_identifier()?;
                self.handle_from_ident(&ident)
            }
            '#' => {
                self.pos += 1;
                let hex_str = self.read_hex();
                let bytes = hex::decode(&hex_str)
                    .map_err(|e| CodecError::LcDecode(format!("malformed hex bytes literal: {e}")))?;
                Ok(Value::Bytes(bytes))
            }
            '"' => self.read_string().map(Value::Text),
            '[' => self.parse_array(),
            '{' => self.parse_brace(),
            '-' => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier()?;
                self.handle_from_ident(&ident)
            }
            other => Err(CodecError::LcDecode(format!(
                "unexpected character '{other}' at position {}",
                self.pos
            ))),
        }
    }

    /// The grammar only defines `handle := '@' ident`, but
    /// `lc_t_codec.py`'s `_parse_value` also falls back to treating a
    /// bare identifier as a handle reference. Both forms require the
    /// identifier to be a 64-hex-character digest here, since `Handle`
    /// has no free-form name slot the way the original's string-typed
    /// handles did.
    fn handle_from_ident(&self, ident: &str) -> Result<Value, CodecError> {
        let digest = Digest::from_hex(ident)
            .map_err(|_| CodecError::LcDecode(format!("'{ident}' is not a valid handle digest")))?;
        Ok(Value::Handle(Handle::new(TAG_GENERIC, digest)))
    }

    fn parse_brace(&mut self) -> Result<Value, CodecError> {
        self.pos += 1; // '{'
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.pos += 1;
            return Ok(Value::Object(Object::new()));
        }
        if self.chars[self.pos..].starts_with(&['C', ':']) {
            self.parse_contract()
        } else {
            self.parse_object()
        }
    }

    fn parse_contract(&mut self) -> Result<Value, CodecError> {
        self.pos += 2; // 'C:'
        let contract_id: u32 = self
            .read_number_str()
            .parse()
            .map_err(|_| CodecError::LcDecode("malformed contract id".into()))?;

        let mut fields = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                Some(',') => {
                    self.pos += 1;
                    self.skip_whitespace();
                }
                None => return Err(CodecError::LcDecode("unterminated contract".into())),
                _ => {}
            }
            if self.peek() == Some('}') {
                self.pos += 1;
                break;
            }

            let idx: u32 = self
                .read_number_str()
                .parse()
                .map_err(|_| CodecError::LcDecode("malformed contract field index".into()))?;
            self.skip_whitespace();
            if self.peek() != Some('=') {
                return Err(CodecError::LcDecode(format!(
                    "expected '=' after field index at position {}",
                    self.pos
                )));
            }
            self.pos += 1;
            self.skip_whitespace();
            let value = self.parse_value()?;
            fields.push((idx, value));
        }

        Ok(Value::Contract(Contract::new(contract_id, fields)?))
    }

    fn parse_array(&mut self) -> Result<Value, CodecError> {
        self.pos += 1; // '['
        self.skip_whitespace();
        let mut items = Vec::new();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(Value::Array(items));
        }
        loop {
            self.skip_whitespace();
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(',') => self.pos += 1,
                _ => {
                    return Err(CodecError::LcDecode(format!(
                        "expected ',' or ']' in array at position {}",
                        self.pos
                    )))
                }
            }
        }
        Ok(Value::Array(items))
    }

    fn parse_object(&mut self) -> Result<Value, CodecError> {
        let mut pairs = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(CodecError::LcDecode("unterminated object".into())),
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                _ => {}
            }
            let key = self.read_identifier()?;
            self.skip_whitespace();
            if self.peek() != Some(':') {
                return Err(CodecError::LcDecode(format!(
                    "expected ':' after key '{key}' at position {}",
                    self.pos
                )));
            }
            self.pos += 1;
            self.skip_whitespace();
            let value = self.parse_value()?;
            pairs.push((key, value));
            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.pos += 1;
            }
        }
        Ok(Value::Object(Object::from_pairs(pairs)?))
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        self.pos += 1; // opening quote
        let mut result = String::new();
        loop {
            let ch = self.peek().ok_or_else(|| CodecError::LcDecode("unterminated string".into()))?;
            if ch == '"' {
                self.pos += 1;
                return Ok(result);
            }
            if ch == '\\' {
                self.pos += 1;
                let escaped = self
                    .peek()
                    .ok_or_else(|| CodecError::LcDecode("unterminated escape sequence".into()))?;
                result.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    other => other,
                });
                self.pos += 1;
            } else {
                result.push(ch);
                self.pos += 1;
            }
        }
    }

    fn read_number(&mut self) -> Result<Value, CodecError> {
        let s = self.read_number_str();
        if s.contains('.') || s.to_ascii_lowercase().contains('e') {
            let f: f64 = s.parse().map_err(|_| CodecError::LcDecode(format!("malformed float '{s}'")))?;
            Ok(Value::Float(f))
        } else {
            let i: i64 = s.parse().map_err(|_| CodecError::LcDecode(format!("malformed int '{s}'")))?;
            Ok(Value::Int(i))
        }
    }

    fn read_number_str(&mut self) -> String {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.pos += 1;
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.pos += 1;
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn read_identifier(&mut self) -> Result<String, CodecError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(CodecError::LcDecode(format!("expected identifier at position {}", self.pos)));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn read_hex(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }
}
