use super::{Result, Value};
use byteorder::WriteBytesExt;
use std::io::Write;

/// Writes the canonical encoding of a [`Value`] to `W`.
pub struct Encoder<W> {
    w: W,
}

impl<W: Write> Encoder<W> {
    pub fn new(output: W) -> Self {
        Self { w: output }
    }

    fn write_bytes(&mut self, b: &[u8]) -> Result<()> {
        self.w.write_all(b.len().to_string().as_bytes())?;
        self.w.write_u8(b':')?;
        self.w.write_all(b)?;
        Ok(())
    }

    fn write_value(&mut self, v: &Value) -> Result<()> {
        match v {
            Value::Bytes(b) => self.write_bytes(b)?,
            Value::Integer(i) => {
                self.w.write_u8(b'i')?;
                self.w.write_all(i.to_string().as_bytes())?;
                self.w.write_u8(b'e')?;
            }
            Value::List(list) => {
                self.w.write_u8(b'l')?;
                for vv in list {
                    self.write_value(vv)?;
                }
                self.w.write_u8(b'e')?;
            }
            Value::Dictionary(m) => {
                // BTreeMap<Vec<u8>, _> iterates in ascending byte order
                self.w.write_u8(b'd')?;
                for (k, v) in m {
                    self.write_bytes(k)?;
                    self.write_value(v)?;
                }
                self.w.write_u8(b'e')?;
            }
        }
        Ok(())
    }

    pub fn encode(&mut self, v: &Value) -> Result<()> {
        self.write_value(v)
    }

    pub fn into_inner(self) -> W {
        self.w
    }
}

/// Encodes `v` into a fresh buffer.
pub fn encode(v: &Value) -> Vec<u8> {
    let mut enc = Encoder::new(Vec::new());
    match enc.encode(v) {
        Ok(()) => enc.into_inner(),
        // io::Write for Vec<u8> never returns an error
        Err(err) => unreachable!("encoding into a Vec failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn scalars() {
        assert_eq!(encode(&Value::from("spam")), b"4:spam");
        assert_eq!(encode(&Value::from("")), b"0:");
        assert_eq!(encode(&Value::from(0)), b"i0e");
        assert_eq!(encode(&Value::from(42)), b"i42e");
        assert_eq!(encode(&Value::from(-3)), b"i-3e");
        assert_eq!(encode(&Value::Integer(i64::MIN)), b"i-9223372036854775808e");
    }

    #[test]
    fn nested() {
        let list = Value::List(vec!["spam".into(), 7.into(), Value::List(vec![])]);
        assert_eq!(encode(&list), b"l4:spami7elee");

        let mut d = Value::dict();
        d.insert("cow", "moo");
        d.insert("spam", list);
        assert_eq!(encode(&d), b"d3:cow3:moo4:spaml4:spami7eleee");
    }

    #[test]
    fn dict_order_is_independent_of_insertion() {
        let mut a = BTreeMap::new();
        a.insert(b"b".to_vec(), Value::from(1));
        a.insert(b"a".to_vec(), Value::from(2));

        let mut b = BTreeMap::new();
        b.insert(b"a".to_vec(), Value::from(2));
        b.insert(b"b".to_vec(), Value::from(1));

        assert_eq!(encode(&a.into()), b"d1:ai2e1:bi1ee");
        assert_eq!(encode(&b.into()), b"d1:ai2e1:bi1ee");
    }

    #[test]
    fn raw_bytes_are_not_escaped() {
        let v = Value::Bytes(vec![0x00, 0xff, b'e', b':']);
        assert_eq!(encode(&v), b"4:\x00\xffe:");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn encoder_streams_into_writer() {
        let mut d = Value::dict();
        d.insert("pieces", vec![0xabu8; 2]);
        d.insert("private", 1);

        let mut enc = Encoder::new(vec![]);
        enc.encode(&d).unwrap();
        assert_eq!(enc.into_inner(), b"d6:pieces2:\xab\xab7:privatei1ee");

        let mut enc = Encoder::new(FailingWriter);
        assert!(matches!(enc.encode(&d), Err(crate::Error::Io(_))));
    }
}
