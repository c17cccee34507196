//! `.npy` v1.0 codec for the event record dtype
//!
//! Layout of a member file:
//!
//! ```text
//! \x93NUMPY | major | minor | header_len (u16 LE) | header dict | payload
//! ```
//!
//! The header dict is a Python literal padded with spaces and terminated by
//! `\n` so that the payload starts on a 64-byte boundary. The payload is the
//! raw little-endian records, 64 bytes each.

use crate::ContainerError;
use num_bigint::BigInt;
use py_literal::Value;
use types::record::{EventRecord, RECORD_FIELDS, RECORD_SIZE};

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;
/// magic + version + u16 header length
const PREAMBLE_V1: usize = 10;
/// magic + version + u32 header length
const PREAMBLE_V2: usize = 12;

/// Structured dtype of the record as a Python literal,
/// `[('ev', '<u8'), ('exch_ts', '<i8'), ...]`.
pub fn descr() -> Value {
    Value::List(
        RECORD_FIELDS
            .iter()
            .map(|(name, code)| {
                Value::Tuple(vec![
                    Value::String(name.to_string()),
                    Value::String(code.to_string()),
                ])
            })
            .collect(),
    )
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn literal(value: &Value) -> String {
    value.format_ascii().unwrap_or_else(|_| format!("{:?}", value))
}

/// Build the complete header (preamble + padded dict) for `count` records.
pub fn encode_header(count: usize) -> Result<Vec<u8>, ContainerError> {
    let dict = Value::Dict(vec![
        (key("descr"), descr()),
        (key("fortran_order"), Value::Boolean(false)),
        (key("shape"), Value::Tuple(vec![Value::Integer(BigInt::from(count))])),
    ])
    .format_ascii()
    .map_err(|e| ContainerError::Header(e.to_string()))?;

    // dict + padding + '\n' brings the total to a multiple of ALIGN
    let unpadded = PREAMBLE_V1 + dict.len() + 1;
    let padding = (ALIGN - unpadded % ALIGN) % ALIGN;
    let header_len = u16::try_from(dict.len() + padding + 1)
        .map_err(|_| ContainerError::Header("header dict exceeds a v1.0 header".into()))?;

    let mut out = Vec::with_capacity(PREAMBLE_V1 + header_len as usize);
    out.extend_from_slice(MAGIC);
    out.push(1);
    out.push(0);
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out.extend(std::iter::repeat(b' ').take(padding));
    out.push(b'\n');
    Ok(out)
}

/// Encode records into a complete `.npy` file image.
pub fn encode(records: &[EventRecord]) -> Result<Vec<u8>, ContainerError> {
    let mut out = encode_header(records.len())?;
    out.reserve(records.len() * RECORD_SIZE);
    for record in records {
        out.extend_from_slice(&record.to_le_bytes());
    }
    Ok(out)
}

/// Parsed header: where the payload starts and how many rows it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub data_offset: usize,
    pub count: usize,
}

/// Parse and validate a `.npy` header against the record dtype.
pub fn parse_header(buf: &[u8]) -> Result<Header, ContainerError> {
    if buf.len() < PREAMBLE_V1 || &buf[..6] != MAGIC {
        return Err(ContainerError::Header("missing NUMPY magic".into()));
    }
    let (dict_start, header_len) = match buf[6] {
        1 => (PREAMBLE_V1, u16::from_le_bytes([buf[8], buf[9]]) as usize),
        2 | 3 => {
            if buf.len() < PREAMBLE_V2 {
                return Err(ContainerError::Header("truncated preamble".into()));
            }
            let len = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]) as usize;
            (PREAMBLE_V2, len)
        }
        major => {
            return Err(ContainerError::Header(format!(
                "unsupported format version {}.{}",
                major, buf[7]
            )))
        }
    };
    let data_offset = dict_start + header_len;
    if buf.len() < data_offset {
        return Err(ContainerError::Header("header extends past end of file".into()));
    }
    let text = std::str::from_utf8(&buf[dict_start..data_offset])
        .map_err(|_| ContainerError::Header("header is not valid UTF-8".into()))?;
    let dict: Value = text
        .trim()
        .parse()
        .map_err(|e: py_literal::ParseError| ContainerError::Header(e.to_string()))?;
    let entries = dict
        .as_dict()
        .ok_or_else(|| ContainerError::Header("header is not a dict".into()))?;

    let found = field(entries, "descr")?;
    let expected = descr();
    if *found != expected {
        return Err(ContainerError::Dtype {
            expected: literal(&expected),
            found: literal(found),
        });
    }
    match field(entries, "fortran_order")?.as_boolean() {
        Some(false) => {}
        Some(true) => return Err(ContainerError::Header("fortran order is not supported".into())),
        None => return Err(ContainerError::Header("'fortran_order' is not a boolean".into())),
    }
    let count = shape_len(field(entries, "shape")?)?;

    Ok(Header { data_offset, count })
}

/// Decode a complete `.npy` file image into records.
pub fn decode(buf: &[u8]) -> Result<Vec<EventRecord>, ContainerError> {
    let header = parse_header(buf)?;
    let payload = &buf[header.data_offset..];
    let expected = header
        .count
        .checked_mul(RECORD_SIZE)
        .ok_or_else(|| ContainerError::Header(format!("shape ({},) overflows", header.count)))?;
    if payload.len() < expected {
        return Err(ContainerError::Truncated {
            expected,
            actual: payload.len(),
        });
    }
    if payload.len() > expected {
        tracing::warn!(
            trailing = payload.len() - expected,
            "Ignoring trailing bytes after record payload"
        );
    }

    let mut records = Vec::with_capacity(header.count);
    for chunk in payload[..expected].chunks_exact(RECORD_SIZE) {
        let row = <&[u8; RECORD_SIZE]>::try_from(chunk).map_err(|_| ContainerError::Truncated {
            expected,
            actual: payload.len(),
        })?;
        records.push(EventRecord::from_le_bytes(row));
    }
    Ok(records)
}

fn field<'a>(entries: &'a [(Value, Value)], name: &str) -> Result<&'a Value, ContainerError> {
    entries
        .iter()
        .find(|(k, _)| k.as_string().map(String::as_str) == Some(name))
        .map(|(_, v)| v)
        .ok_or_else(|| ContainerError::Header(format!("header has no '{}'", name)))
}

fn shape_len(shape: &Value) -> Result<usize, ContainerError> {
    let dims = shape
        .as_tuple()
        .ok_or_else(|| ContainerError::Header("'shape' is not a tuple".into()))?;
    match dims.as_slice() {
        [Value::Integer(n)] => usize::try_from(n)
            .map_err(|_| ContainerError::Header(format!("invalid shape dimension {}", n))),
        _ => Err(ContainerError::Header(format!(
            "expected a one-dimensional shape, got {}",
            literal(shape)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> Vec<EventRecord> {
        (0..n)
            .map(|i| EventRecord {
                flags: 0xE000_0001,
                exch_ts: i as i64,
                local_ts: i as i64 + 1,
                price: 100.0 + i as f64,
                quantity: 0.001,
                ..Default::default()
            })
            .collect()
    }

    /// v1.0 file image with a caller-written header dict and no payload.
    fn raw_header(dict: &str) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&((dict.len() + 1) as u16).to_le_bytes());
        out.extend_from_slice(dict.as_bytes());
        out.push(b'\n');
        out
    }

    #[test]
    fn test_header_is_aligned() {
        for count in [0, 1, 9, 10, 99_999, 1_000_000_000] {
            let header = encode_header(count).unwrap();
            assert_eq!(header.len() % ALIGN, 0, "count {}", count);
            assert_eq!(*header.last().unwrap(), b'\n');
        }
    }

    #[test]
    fn test_header_dict_contents() {
        let header = encode_header(3).unwrap();
        let text = String::from_utf8_lossy(&header[PREAMBLE_V1..]);
        assert!(text.starts_with("{'descr': [('ev', '<u8'), ('exch_ts', '<i8')"));
        assert!(text.contains("('fval', '<f8')]"));
        assert!(text.contains("'fortran_order': False"));
        assert!(text.contains("'shape': (3,)"));
    }

    #[test]
    fn test_encode_decode() {
        let records = sample(5);
        let bytes = encode(&records).unwrap();
        assert_eq!(bytes.len(), encode_header(5).unwrap().len() + 5 * RECORD_SIZE);
        assert_eq!(decode(&bytes).unwrap(), records);
    }

    #[test]
    fn test_decode_empty() {
        let bytes = encode(&[]).unwrap();
        assert!(decode(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_decode_truncated_payload() {
        let mut bytes = encode(&sample(3)).unwrap();
        bytes.truncate(bytes.len() - 10);
        assert!(matches!(
            decode(&bytes),
            Err(ContainerError::Truncated { expected: 192, actual: 182 })
        ));
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode(&sample(1)).unwrap();
        bytes[1] = b'X';
        assert!(matches!(decode(&bytes), Err(ContainerError::Header(_))));
    }

    #[test]
    fn test_dtype_mismatch() {
        let mut bytes = encode(&sample(1)).unwrap();
        let pos = bytes.windows(4).position(|w| w == b"<f8'").unwrap();
        bytes[pos + 2] = b'4';
        match decode(&bytes) {
            Err(ContainerError::Dtype { expected, found }) => {
                assert!(expected.contains("('px', '<f8')"));
                assert!(found.contains("('px', '<f4')"));
            }
            other => panic!("expected dtype error, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_double_quoted_header() {
        let fields: Vec<String> = RECORD_FIELDS
            .iter()
            .map(|(name, code)| format!("(\"{}\",\"{}\")", name, code))
            .collect();
        let dict = format!(
            "{{\"descr\": [{}], \"fortran_order\": False, \"shape\": (0,), }}   ",
            fields.join(",")
        );
        let header = parse_header(&raw_header(&dict)).unwrap();
        assert_eq!(header.count, 0);
    }

    #[test]
    fn test_rejects_two_dimensional_shape() {
        let dict = format!(
            "{{'descr': {}, 'fortran_order': False, 'shape': (2, 3), }}",
            literal(&descr())
        );
        let err = parse_header(&raw_header(&dict)).unwrap_err();
        assert!(err.to_string().contains("one-dimensional"));
    }

    #[test]
    fn test_rejects_fortran_order() {
        let dict = format!(
            "{{'descr': {}, 'fortran_order': True, 'shape': (1,), }}",
            literal(&descr())
        );
        assert!(matches!(
            parse_header(&raw_header(&dict)),
            Err(ContainerError::Header(_))
        ));
    }

    #[test]
    fn test_rejects_missing_shape() {
        let dict = format!("{{'descr': {}, 'fortran_order': False}}", literal(&descr()));
        let err = parse_header(&raw_header(&dict)).unwrap_err();
        assert!(err.to_string().contains("'shape'"));
    }
}
