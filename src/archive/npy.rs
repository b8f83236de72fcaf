//! Minimal NPY (format version 1.0) codec for 1-D arrays
//!
//! Only the two dtypes the archive needs are supported: little-endian
//! `int64` (`<i8`) and fixed-width UTF-32 strings (`<U{width}`).

use crate::error::{FreqError, FreqResult};

const MAGIC: &[u8] = b"\x93NUMPY";
const HEADER_ALIGN: usize = 64;
/// magic + version + u16 header length
const PREAMBLE_LEN: usize = MAGIC.len() + 2 + 2;

/// Encode a 1-D `<i8` array.
pub fn encode_i64(values: &[i64]) -> Vec<u8> {
    let mut out = header("<i8", values.len());
    out.reserve(values.len() * 8);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Encode a 1-D `<U{width}` array. Width is the longest string in chars,
/// never less than 1.
pub fn encode_unicode(values: &[String]) -> Vec<u8> {
    let width = values
        .iter()
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
        .max(1);
    let mut out = header(&format!("<U{}", width), values.len());
    out.reserve(values.len() * width * 4);
    for s in values {
        let mut written = 0;
        for ch in s.chars() {
            out.extend_from_slice(&(ch as u32).to_le_bytes());
            written += 1;
        }
        out.resize(out.len() + (width - written) * 4, 0);
    }
    out
}

/// Decode a 1-D `<i8` array.
pub fn decode_i64(bytes: &[u8]) -> FreqResult<Vec<i64>> {
    let (descr, len, data) = parse(bytes)?;
    if descr != "<i8" {
        return Err(FreqError::Archive(format!(
            "expected dtype '<i8', found '{}'",
            descr
        )));
    }
    expect_data_len(data, payload_len(len, 8)?)?;
    Ok(data
        .chunks_exact(8)
        .map(|c| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(c);
            i64::from_le_bytes(buf)
        })
        .collect())
}

/// Decode a 1-D `<U{width}` array, dropping trailing NUL padding.
pub fn decode_unicode(bytes: &[u8]) -> FreqResult<Vec<String>> {
    let (descr, len, data) = parse(bytes)?;
    let width: usize = descr
        .strip_prefix("<U")
        .and_then(|w| w.parse().ok())
        .ok_or_else(|| {
            FreqError::Archive(format!("expected a '<U' string dtype, found '{}'", descr))
        })?;
    if width == 0 {
        if len > 0 {
            return Err(FreqError::Archive(
                "zero-width string dtype with a non-empty shape".to_string(),
            ));
        }
        return Ok(Vec::new());
    }
    let item_size = width
        .checked_mul(4)
        .ok_or_else(|| FreqError::Archive(format!("string width {} is too large", width)))?;
    expect_data_len(data, payload_len(len, item_size)?)?;

    let mut values = Vec::with_capacity(len);
    for item in data.chunks_exact(item_size) {
        let mut s = String::with_capacity(width);
        for unit in item.chunks_exact(4) {
            let code = u32::from_le_bytes([unit[0], unit[1], unit[2], unit[3]]);
            if code == 0 {
                break;
            }
            let ch = char::from_u32(code).ok_or_else(|| {
                FreqError::Archive(format!("invalid code point {:#x} in string array", code))
            })?;
            s.push(ch);
        }
        values.push(s);
    }
    Ok(values)
}

fn header(descr: &str, len: usize) -> Vec<u8> {
    let mut dict = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': ({},), }}",
        descr, len
    );
    // Pad with spaces so the data starts on an aligned offset; '\n' terminates.
    let unpadded = PREAMBLE_LEN + dict.len() + 1;
    let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
    dict.extend(std::iter::repeat(' ').take(padding));
    dict.push('\n');

    let mut out = Vec::with_capacity(PREAMBLE_LEN + dict.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out
}

/// Split an NPY buffer into (descr, length, data).
fn parse(bytes: &[u8]) -> FreqResult<(String, usize, &[u8])> {
    if bytes.len() < PREAMBLE_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(FreqError::Archive("missing NPY magic".to_string()));
    }
    let major = bytes[MAGIC.len()];
    let (header_len, header_start) = match major {
        1 => (
            u16::from_le_bytes([bytes[8], bytes[9]]) as usize,
            PREAMBLE_LEN,
        ),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(FreqError::Archive("truncated NPY preamble".to_string()));
            }
            (
                u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
                12,
            )
        }
        v => {
            return Err(FreqError::Archive(format!(
                "unsupported NPY version {}",
                v
            )))
        }
    };
    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err(FreqError::Archive("truncated NPY header".to_string()));
    }
    let dict = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|_| FreqError::Archive("NPY header is not UTF-8".to_string()))?;

    let descr = quoted_value(dict, "descr")
        .ok_or_else(|| FreqError::Archive("NPY header has no 'descr'".to_string()))?;
    if dict_value(dict, "fortran_order").is_some_and(|v| v.starts_with("True")) {
        return Err(FreqError::Archive(
            "fortran-ordered arrays are not supported".to_string(),
        ));
    }
    let len = shape_len(dict)?;
    Ok((descr.to_string(), len, &bytes[data_start..]))
}

fn dict_value<'a>(dict: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("'{}':", key);
    let at = dict.find(&needle)? + needle.len();
    Some(dict[at..].trim_start())
}

fn quoted_value<'a>(dict: &'a str, key: &str) -> Option<&'a str> {
    let rest = dict_value(dict, key)?.strip_prefix('\'')?;
    let end = rest.find('\'')?;
    Some(&rest[..end])
}

fn shape_len(dict: &str) -> FreqResult<usize> {
    let rest = dict_value(dict, "shape")
        .and_then(|v| v.strip_prefix('('))
        .ok_or_else(|| FreqError::Archive("NPY header has no 'shape'".to_string()))?;
    let end = rest
        .find(')')
        .ok_or_else(|| FreqError::Archive("unterminated NPY shape".to_string()))?;
    let dims: Vec<&str> = rest[..end]
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .collect();
    match dims.as_slice() {
        [len] => len
            .parse()
            .map_err(|_| FreqError::Archive(format!("bad NPY dimension '{}'", len))),
        _ => Err(FreqError::Archive(format!(
            "expected a 1-D array, found shape ({})",
            &rest[..end]
        ))),
    }
}

/// Payload size implied by the header; shapes that overflow are rejected
fn payload_len(len: usize, item_size: usize) -> FreqResult<usize> {
    len.checked_mul(item_size).ok_or_else(|| {
        FreqError::Archive(format!(
            "NPY shape ({},) with {}-byte items overflows",
            len, item_size
        ))
    })
}

fn expect_data_len(data: &[u8], expected: usize) -> FreqResult<()> {
    if data.len() != expected {
        return Err(FreqError::Archive(format!(
            "NPY payload is {} bytes, expected {}",
            data.len(),
            expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_aligned_and_terminated() {
        let bytes = encode_i64(&[1, 2, 3]);
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((PREAMBLE_LEN + header_len) % HEADER_ALIGN, 0);
        assert_eq!(bytes[PREAMBLE_LEN + header_len - 1], b'\n');
        let dict = std::str::from_utf8(&bytes[PREAMBLE_LEN..PREAMBLE_LEN + header_len]).unwrap();
        assert!(dict.starts_with("{'descr': '<i8', 'fortran_order': False, 'shape': (3,), }"));
        assert_eq!(bytes.len(), PREAMBLE_LEN + header_len + 24);
    }

    #[test]
    fn test_unicode_width_and_padding() {
        let values = vec!["b c".to_string(), "é".to_string()];
        let bytes = encode_unicode(&values);
        let (descr, len, data) = parse(&bytes).unwrap();
        assert_eq!(descr, "<U3");
        assert_eq!(len, 2);
        assert_eq!(data.len(), 2 * 3 * 4);
        assert_eq!(&data[12..16], &(0xe9u32).to_le_bytes());
        assert!(data[16..].iter().all(|b| *b == 0));
        assert_eq!(decode_unicode(&bytes).unwrap(), values);
    }

    #[test]
    fn test_empty_arrays() {
        let strings = encode_unicode(&[]);
        assert_eq!(parse(&strings).unwrap().0, "<U1");
        assert!(decode_unicode(&strings).unwrap().is_empty());
        assert!(decode_i64(&encode_i64(&[])).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_dtype() {
        let bytes = encode_unicode(&["a".to_string()]);
        assert!(matches!(decode_i64(&bytes), Err(FreqError::Archive(_))));
        let bytes = encode_i64(&[5]);
        assert!(matches!(decode_unicode(&bytes), Err(FreqError::Archive(_))));
    }

    #[test]
    fn test_decode_rejects_truncated_payload() {
        let mut bytes = encode_i64(&[1, 2]);
        bytes.truncate(bytes.len() - 3);
        assert!(decode_i64(&bytes).is_err());
        assert!(decode_i64(b"not numpy").is_err());
    }

    #[test]
    fn test_decode_accepts_unpadded_numpy_header() {
        // Older writers align to 16 bytes rather than 64.
        let dict = "{'descr': '<i8', 'fortran_order': False, 'shape': (1,), }    \n";
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        bytes.extend_from_slice(dict.as_bytes());
        bytes.extend_from_slice(&42i64.to_le_bytes());
        assert_eq!(decode_i64(&bytes).unwrap(), vec![42]);
    }

    fn raw_npy(descr: &str, len: &str, payload: &[u8]) -> Vec<u8> {
        let dict = format!(
            "{{'descr': '{}', 'fortran_order': False, 'shape': ({},), }}\n",
            descr, len
        );
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        bytes.extend_from_slice(dict.as_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_decode_rejects_oversized_shapes() {
        let huge = usize::MAX.to_string();
        assert!(matches!(
            decode_i64(&raw_npy("<i8", &huge, &[])),
            Err(FreqError::Archive(_))
        ));
        assert!(matches!(
            decode_unicode(&raw_npy("<U4", &huge, &[])),
            Err(FreqError::Archive(_))
        ));
        let wide = format!("<U{}", usize::MAX);
        assert!(matches!(
            decode_unicode(&raw_npy(&wide, "1", &[])),
            Err(FreqError::Archive(_))
        ));
        assert!(matches!(
            decode_unicode(&raw_npy("<U0", &huge, &[])),
            Err(FreqError::Archive(_))
        ));
        assert!(decode_unicode(&raw_npy("<U0", "0", &[])).unwrap().is_empty());
    }
}
