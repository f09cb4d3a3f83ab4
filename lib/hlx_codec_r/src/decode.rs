//! LC-R decoder, grounded in `lc_r_codec.py`'s `LCRDecoder`. Full inverse
//! of `encode_value`.

use crate::error::CodecError;
use crate::glyphs as g;
use hlx_value::{Contract, Digest, Handle, Object, Value, TAG_GENERIC};

pub fn decode_value(text: &str) -> Result<Value, CodecError> {
    let chars: Vec<char> = text.chars().collect();
    let mut p = Parser { chars, pos: 0 };
    let value = p.parse_value()?;
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

    fn expect(&mut self, c: char) -> Result<(), CodecError> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(CodecError::LcDecode(format!("expected '{c}' at position {}", self.pos)))
        }
    }

    fn parse_value(&mut self) -> Result<Value, CodecError> {
        let ch = self.peek().ok_or_else(|| CodecError::LcDecode("unexpected end of input".into()))?;
        match ch {
            c if c == g::NULL => {
                self.pos += 1;
                Ok(Value::Null)
            }
            c if c == g::TRUE => {
                self.pos += 1;
                Ok(Value::Bool(true))
            }
            c if c == g::FALSE => {
                self.pos += 1;
                Ok(Value::Bool(false))
            }
            c if c == g::HANDLE => {
                self.pos += 1;
                let hex_str = self.read_hex_run();
                let digest = Digest::from_hex(&hex_str)
                    .map_err(|_| CodecError::LcDecode(format!("'{hex_str}' is not a valid handle digest")))?;
                Ok(Value::Handle(Handle::new(TAG_GENERIC, digest)))
            }
            c if c == g::INT => {
                self.pos += 1;
                let s = self.read_numeric_run();
                s.parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| CodecError::LcDecode(format!("malformed int '{s}'")))
            }
            c if c == g::FLOAT => {
                self.pos += 1;
                let s = self.read_numeric_run();
                s.parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| CodecError::LcDecode(format!("malformed float '{s}'")))
            }
            c if c == g::TEXT => {
                self.pos += 1;
                self.read_string().map(Value::Text)
            }
            c if c == g::BYTES => {
                self.pos += 1;
                let hex_str = self.read_hex_run();
                hex::decode(&hex_str)
                    .map(Value::Bytes)
                    .map_err(|e| CodecError::LcDecode(format!("malformed hex bytes: {e}")))
            }
            c if c == g::ARRAY => {
                self.pos += 1;
                self.parse_array()
            }
            c if c == g::OBJECT => {
                self.pos += 1;
                self.parse_object()
            }
            c if c == g::CONTRACT_START => {
                self.pos += 1;
                self.parse_contract()
            }
            other => Err(CodecError::LcDecode(format!("unexpected character '{other}' at position {}", self.pos))),
        }
    }

    fn parse_array(&mut self) -> Result<Value, CodecError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            if self.peek() == Some(']') {
                self.pos += 1;
                break;
            }
            items.push(self.parse_value()?);
            if self.peek() == Some(g::SEPARATOR) {
                self.pos += 1;
            }
        }
        Ok(Value::Array(items))
    }

    fn parse_object(&mut self) -> Result<Value, CodecError> {
        self.expect('{')?;
        let mut pairs = Vec::new();
        loop {
            if self.peek() == Some('}') {
                self.pos += 1;
                break;
            }
            self.expect(g::TEXT)?;
            let key = self.read_string()?;
            if self.peek() != Some(g::BIND) {
                return Err(CodecError::LcDecode(format!("expected bind glyph at position {}", self.pos)));
            }
            self.pos += 1;
            let value = self.parse_value()?;
            pairs.push((key, value));
            if self.peek() == Some(g::SEPARATOR) {
                self.pos += 1;
            }
        }
        Ok(Value::Object(Object::from_pairs(pairs)?))
    }

    fn parse_contract(&mut self) -> Result<Value, CodecError> {
        let id_str = self.read_digit_run();
        let contract_id: u32 = id_str
            .parse()
            .map_err(|_| CodecError::LcDecode(format!("malformed contract id '{id_str}'")))?;

        let mut fields = Vec::new();
        loop {
            match self.peek() {
                Some(c) if c == g::CONTRACT_END => {
                    self.pos += 1;
                    break;
                }
                Some(c) if c == g::FIELD => {
                    self.pos += 1;
                }
                _ => {
                    return Err(CodecError::LcDecode(format!(
                        "expected field separator at position {}",
                        self.pos
                    )))
                }
            }
            let idx_str = self.read_digit_run();
            let idx: u32 = idx_str
                .parse()
                .map_err(|_| CodecError::LcDecode(format!("malformed field index '{idx_str}'")))?;
            while self.peek() == Some(' ') {
                self.pos += 1;
            }
            let value = self.parse_value()?;
            fields.push((idx, value));
        }
        Ok(Value::Contract(Contract::new(contract_id, fields)?))
    }

    fn read_string(&mut self) -> Result<String, CodecError> {
        self.expect('"')?;
        let mut result = String::new();
        let mut escaped = false;
        loop {
            let ch = self.peek().ok_or_else(|| CodecError::LcDecode("unterminated string".into()))?;
            self.pos += 1;
            if escaped {
                result.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                return Ok(result);
            } else {
                result.push(ch);
            }
        }
    }

    fn read_numeric_run(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn read_digit_run(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn read_hex_run(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }
}
