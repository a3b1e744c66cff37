use crate::{JsonPointerError, Path};

/// Unescapes one JSON Pointer token component.
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes one JSON Pointer token component.
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse an RFC 6901 absolute pointer into unescaped path components.
///
/// Examples:
/// - `"" -> []`
/// - `"/" -> [""]`
/// - `"/a~1b/~0k/0" -> ["a/b", "~k", "0"]`
pub fn parse_json_pointer(pointer: &str) -> Result<Path, JsonPointerError> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    if !pointer.starts_with('/') {
        return Err(JsonPointerError::NotAbsolute);
    }
    Ok(pointer.split('/').skip(1).map(unescape_component).collect())
}

/// Format unescaped path components into an RFC 6901 pointer string.
pub fn format_json_pointer(path: &[String]) -> String {
    if path.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(path.len() * 8);
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Returns true if the path addresses the document root.
pub fn is_root(path: &[String]) -> bool {
    path.is_empty()
}

/// Returns true if `child` is strictly below `parent`.
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && child[..parent.len()] == parent[..]
}

/// Returns true if the token is a valid array index per RFC 6901
/// (decimal digits, no leading zero unless the index is exactly "0").
pub fn is_valid_index(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    let bytes = token.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}

/// Returns the parent of a non-root path.
pub fn parent(path: &[String]) -> Result<Path, JsonPointerError> {
    if path.is_empty() {
        return Err(JsonPointerError::NoParent);
    }
    Ok(path[..path.len() - 1].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_roundtrip() {
        for raw in ["plain", "a~b", "c/d", "a~b/c", "~~", "//", ""] {
            assert_eq!(unescape_component(&escape_component(raw)), raw);
        }
    }

    #[test]
    fn parse_empty_is_root() {
        assert_eq!(parse_json_pointer("").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn parse_slash_is_one_empty_token() {
        assert_eq!(parse_json_pointer("/").unwrap(), vec![""]);
    }

    #[test]
    fn parse_rejects_relative() {
        assert_eq!(
            parse_json_pointer("foo"),
            Err(JsonPointerError::NotAbsolute)
        );
    }

    #[test]
    fn parse_unescapes_tokens() {
        assert_eq!(
            parse_json_pointer("/a~1b/~0k/0").unwrap(),
            vec!["a/b", "~k", "0"]
        );
    }

    #[test]
    fn format_escapes_tokens() {
        assert_eq!(
            format_json_pointer(&["a/b".to_string(), "~k".to_string()]),
            "/a~1b/~0k"
        );
    }

    #[test]
    fn pointer_string_roundtrip() {
        for ptr in ["", "/", "/foo", "/foo/0", "/a~0b/c~1d", "/foo///"] {
            let path = parse_json_pointer(ptr).unwrap();
            assert_eq!(format_json_pointer(&path), ptr);
        }
    }

    #[test]
    fn index_validity() {
        assert!(is_valid_index("0"));
        assert!(is_valid_index("42"));
        assert!(!is_valid_index("01"));
        assert!(!is_valid_index("-1"));
        assert!(!is_valid_index(""));
        assert!(!is_valid_index("1.5"));
    }

    #[test]
    fn child_relation() {
        let p = vec!["a".to_string()];
        let c = vec!["a".to_string(), "b".to_string()];
        assert!(is_child(&p, &c));
        assert!(!is_child(&c, &p));
        assert!(!is_child(&p, &p));
    }
}
