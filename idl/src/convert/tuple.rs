//! Tuple shapes that only legacy descriptors carry.

use crate::dialect::legacy::LegacyType;
use crate::error::{IdlError, Result};
use crate::types::Primitive;

/// Parses a leaf string of the form `(u8,[u8;N])` (or `(u8,[u8,N])`) and
/// returns `N`.
pub fn parse_leaf_tuple(input: &str) -> Result<usize> {
    let invalid = |msg: String| Err(IdlError::InvalidLeafTuple(msg));

    let s = input.trim();
    if !s.starts_with('(') || !s.ends_with(')') || s.len() < 2 {
        return invalid(format!(r#"Expected tuple like "(u8,[u8;N])": got "{input}""#));
    }
    let inner = s[1..s.len() - 1].trim();

    let Some(bracket_start) = inner.find('[') else {
        return invalid(format!(r#"Expected array like "[u8;N]": got "{inner}""#));
    };
    let Some(comma) = inner[..bracket_start].rfind(',') else {
        return invalid(format!(r#"Expected tuple with two items: "{inner}""#));
    };

    let left = inner[..comma].trim();
    let right = inner[comma + 1..].trim();
    if left != "u8" {
        return invalid(format!(r#"First tuple item must be "u8": "{left}""#));
    }
    if !right.starts_with('[') || !right.ends_with(']') || right.len() < 2 {
        return invalid(format!(r#"Expected array like "[u8;N]": got "{right}""#));
    }

    let body = right[1..right.len() - 1].trim();
    let Some(sep) = body.find(';').or_else(|| body.find(',')) else {
        return invalid(format!(r#"Missing ';' or ',' in array body: "{body}""#));
    };
    let elem = body[..sep].trim();
    let len = body[sep + 1..].trim();

    if elem != "u8" {
        return invalid(format!(r#"Only "u8" element supported here: "{elem}""#));
    }
    if len.is_empty() {
        return invalid(format!(r#"Missing array length: "{body}""#));
    }
    len.parse::<usize>().or_else(|_| {
        invalid(format!(
            r#"Array length must be a non-negative integer: "{len}""#
        ))
    })
}

/// Cheap shape check followed by the strict parse. Never fails.
pub fn is_leaf_tuple_u8(input: &str) -> bool {
    let s = input.trim();
    if !s.starts_with('(') || !s.ends_with(')') || s.len() < 2 {
        return false;
    }
    let inner = s[1..s.len() - 1].trim();
    let Some(bracket_start) = inner.find('[') else {
        return false;
    };
    let Some(comma) = inner[..bracket_start].rfind(',') else {
        return false;
    };
    let (left, right) = (inner[..comma].trim(), inner[comma + 1..].trim());
    if left.is_empty() || !right.starts_with('[') || !right.ends_with(']') || right.len() < 2 {
        return false;
    }
    let body = &right[1..right.len() - 1];
    if !body.contains(';') && !body.contains(',') {
        return false;
    }
    parse_leaf_tuple(input).is_ok()
}

/// `[T, T, ...]` of one scalar type, as `(T, len)`.
pub fn parse_homogeneous_tuple(items: &[LegacyType]) -> Option<(Primitive, usize)> {
    let first = match items.first()? {
        LegacyType::Primitive(p) => *p,
        _ => return None,
    };
    items
        .iter()
        .all(|item| *item == LegacyType::Primitive(first))
        .then_some((first, items.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("(u8,[u8;32])", 32 ; "canonical")]
    #[test_case("(  u8 ,  [ u8 ; 32 ]  )", 32 ; "whitespace")]
    #[test_case("(u8,[u8,32])", 32 ; "comma separator")]
    #[test_case("(u8,[u8;0])", 0 ; "zero length")]
    #[test_case("(u8,[u8;255])", 255 ; "bigger length")]
    fn parses_leaf_tuples(input: &str, expected: usize) {
        assert_eq!(parse_leaf_tuple(input).unwrap(), expected);
        assert!(is_leaf_tuple_u8(input));
    }

    #[test_case("(u8,[u8;32]", "Expected tuple like" ; "missing closing paren")]
    #[test_case("(u8,[u8;32],u8)", "Expected array like" ; "extra items")]
    #[test_case("(u16,[u8;32])", r#"First tuple item must be "u8""# ; "wrong first item")]
    #[test_case("(u8,u8)", "Expected array like" ; "right side not an array")]
    #[test_case("(u8,[u8 32])", "Missing ';' or ',' in array body" ; "no separator")]
    #[test_case("(u8,[u16;32])", r#"Only "u8" element supported"# ; "wrong element")]
    #[test_case("(u8,[u8;3.2])", "non-negative integer" ; "fractional length")]
    #[test_case("(u8,[u8;-1])", "non-negative integer" ; "negative length")]
    #[test_case("(u8,[u8;])", "Missing array length" ; "empty length")]
    fn rejects_malformed_leaf_tuples(input: &str, message: &str) {
        let err = parse_leaf_tuple(input).unwrap_err().to_string();
        assert!(err.contains(message), "{err}");
        assert!(!is_leaf_tuple_u8(input));
    }

    #[test]
    fn shape_check_rejects_non_tuples() {
        assert!(!is_leaf_tuple_u8("u8,[u8;32]"));
        assert!(!is_leaf_tuple_u8(""));
        assert!(!is_leaf_tuple_u8("Pool"));
    }

    #[test]
    fn homogeneous_tuples() {
        use crate::dialect::legacy::LegacyType::Primitive as P;
        assert_eq!(
            parse_homogeneous_tuple(&[P(Primitive::U64), P(Primitive::U64)]),
            Some((Primitive::U64, 2))
        );
        assert_eq!(
            parse_homogeneous_tuple(&vec![P(Primitive::String); 3]),
            Some((Primitive::String, 3))
        );
        assert_eq!(parse_homogeneous_tuple(&[P(Primitive::U8)]), Some((Primitive::U8, 1)));
        assert_eq!(parse_homogeneous_tuple(&[]), None);
        assert_eq!(parse_homogeneous_tuple(&[P(Primitive::U64), P(Primitive::U32)]), None);
        let vec_u8 = LegacyType::Vec(Box::new(P(Primitive::U8)));
        assert_eq!(parse_homogeneous_tuple(&[vec_u8.clone(), vec_u8]), None);
    }
}
