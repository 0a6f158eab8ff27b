use super::{Error, Result, Value};
use std::collections::BTreeMap;

/// Strict decoder over a byte slice.
///
/// Only canonical input is accepted: integers without leading zeros or `-0`,
/// and dictionaries whose keys are strictly ascending.
pub struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Decodes one value and returns it with the unread tail.
    pub fn decode_partial(&mut self) -> Result<(Value, &'a [u8])> {
        let v = self.next_value()?;
        let input = self.input;
        Ok((v, &input[self.pos..]))
    }

    /// Decodes one value and requires the whole input to be consumed.
    pub fn decode(&mut self) -> Result<Value> {
        let (v, remain) = self.decode_partial()?;
        if !remain.is_empty() {
            return Err(Error::Decode(format!(
                "{} trailing bytes after value",
                remain.len()
            )));
        }
        Ok(v)
    }

    fn next_value(&mut self) -> Result<Value> {
        let v = match self.peek_byte()? {
            b'i' => Value::Integer(self.read_integer()?),
            b'l' => Value::List(self.read_list()?),
            b'd' => Value::Dictionary(self.read_dictionary()?),
            b'0'..=b'9' => Value::Bytes(self.read_bytes()?),
            b => {
                return Err(Error::Decode(format!(
                    "unrecognized data type: {:?} at offset {}",
                    b as char, self.pos
                )))
            }
        };
        Ok(v)
    }

    fn read_dictionary(&mut self) -> Result<BTreeMap<Vec<u8>, Value>> {
        self.consume_byte(b'd')?;

        let mut m: BTreeMap<Vec<u8>, Value> = Default::default();
        let mut last_key: Option<Vec<u8>> = None;
        loop {
            match self.peek_byte()? {
                b'e' => {
                    self.consume_byte(b'e')?;
                    break;
                }
                b'0'..=b'9' => {
                    let key = self.read_bytes()?;
                    if let Some(last) = &last_key {
                        if &key <= last {
                            return Err(Error::Decode(format!(
                                "dictionary key {:?} out of order",
                                String::from_utf8_lossy(&key)
                            )));
                        }
                    }
                    let value = self.next_value()?;
                    last_key = Some(key.clone());
                    m.insert(key, value);
                }
                _ => return Err(Error::Decode("key is not a byte string".into())),
            }
        }
        Ok(m)
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_length()?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.input.len())
            .ok_or_else(|| Error::Decode(format!("byte string of {len} bytes truncated")))?;
        let buf = self.input[self.pos..end].to_vec();
        self.pos = end;
        Ok(buf)
    }

    fn read_list(&mut self) -> Result<Vec<Value>> {
        self.consume_byte(b'l')?;
        let mut v = vec![];
        loop {
            match self.peek_byte()? {
                b'e' => {
                    self.consume_byte(b'e')?;
                    break;
                }
                _ => v.push(self.next_value()?),
            }
        }
        Ok(v)
    }

    fn read_integer(&mut self) -> Result<i64> {
        self.consume_byte(b'i')?;
        let digits = self.take_until(b'e')?;

        let unsigned = digits.strip_prefix(b"-").unwrap_or(digits);
        if unsigned.is_empty() || !unsigned.iter().all(u8::is_ascii_digit) {
            return Err(Error::Decode("malformed integer".into()));
        }
        if unsigned.len() > 1 && unsigned[0] == b'0' {
            return Err(Error::Decode("integer has leading zero".into()));
        }
        if digits == b"-0" {
            return Err(Error::Decode("negative zero".into()));
        }

        let s = String::from_utf8_lossy(digits);
        s.parse::<i64>()
            .map_err(|e| Error::Decode(format!("{e}")))
    }

    fn read_length(&mut self) -> Result<usize> {
        let digits = self.take_until(b':')?;
        if digits.len() > 1 && digits[0] == b'0' {
            return Err(Error::Decode("length has leading zero".into()));
        }
        String::from_utf8_lossy(digits)
            .parse::<usize>()
            .map_err(|e| Error::Decode(format!("{e}")))
    }

    // returns the bytes before `delim` and skips past it
    fn take_until(&mut self, delim: u8) -> Result<&'a [u8]> {
        let input = self.input;
        let rest = &input[self.pos..];
        let idx = rest
            .iter()
            .position(|&b| b == delim)
            .ok_or_else(|| Error::Decode(format!("missing {:?}", delim as char)))?;
        self.pos += idx + 1;
        Ok(&rest[..idx])
    }

    fn consume_byte(&mut self, expected: u8) -> Result<()> {
        match self.peek_byte()? {
            actual if actual == expected => {
                self.pos += 1;
                Ok(())
            }
            b => Err(Error::Decode(format!(
                "expect byte: {:?}, actually got: {:?}",
                expected as char, b as char
            ))),
        }
    }

    fn peek_byte(&self) -> Result<u8> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or_else(|| Error::Decode("unexpected end of input".into()))
    }
}
