//! JSON Pointer (RFC 6901) paths for case-record documents.
//!
//! Paths are held unescaped as `Vec<String>`; escaping only happens at the
//! string boundary (`parse_json_pointer` / `format_json_pointer`).
//!
//! # Example
//!
//! ```
//! use case_json_pointer::{format_json_pointer, lookup, parse_json_pointer, Lookup};
//!
//! let path = parse_json_pointer("/startingActions/0/a~1b");
//! assert_eq!(path, vec!["startingActions", "0", "a/b"]);
//! assert_eq!(format_json_pointer(&path), "/startingActions/0/a~1b");
//!
//! let doc = serde_json::json!({"startingActions": [{"a/b": 1}]});
//! assert_eq!(lookup(&doc, &path), Lookup::Found(&serde_json::json!(1)));
//! ```

pub mod lookup;
pub mod types;
pub mod validate;

pub use lookup::{get, get_mut, lookup, lookup_mut};
pub use types::{Lookup, Path, PathStep};
pub use validate::{is_valid_index, parse_index, PointerError};

/// Unescapes a JSON Pointer path component.
///
/// `~1` is decoded before `~0` so that `~01` yields `~1`.
///
/// ```
/// use case_json_pointer::unescape_component;
///
/// assert_eq!(unescape_component("a~0b"), "a~b");
/// assert_eq!(unescape_component("c~1d"), "c/d");
/// assert_eq!(unescape_component("~01"), "~1");
/// ```
pub fn unescape_component(component: &str) -> String {
    if !component.contains('~') {
        return component.to_string();
    }
    component.replace("~1", "/").replace("~0", "~")
}

/// Escapes a JSON Pointer path component.
///
/// ```
/// use case_json_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Parse a JSON Pointer string into unescaped path components.
///
/// The empty string is the root. The first character is assumed to be `/`
/// and skipped; use [`parse_json_pointer_strict`] to reject anything else.
pub fn parse_json_pointer(pointer: &str) -> Path {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer[pointer.chars().next().map_or(0, char::len_utf8)..]
        .split('/')
        .map(unescape_component)
        .collect()
}

/// Like [`parse_json_pointer`] but rejects pointers without a leading `/`.
pub fn parse_json_pointer_strict(pointer: &str) -> Result<Path, PointerError> {
    if !pointer.is_empty() && !pointer.starts_with('/') {
        return Err(PointerError::PointerInvalid(pointer.to_string()));
    }
    Ok(parse_json_pointer(pointer))
}

/// Format path components into a JSON Pointer string (`""` for the root).
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

pub fn is_root(path: &[String]) -> bool {
    path.is_empty()
}

/// True when `child` lies strictly below `parent`.
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && starts_with(child, parent)
}

/// True when `path` equals `prefix` or lies below it.
pub fn starts_with(path: &[String], prefix: &[String]) -> bool {
    path.len() >= prefix.len() && path[..prefix.len()] == *prefix
}

/// Split a path into its parent and last segment.
pub fn split_last(path: &[String]) -> Result<(&[String], &str), PointerError> {
    match path.split_last() {
        Some((last, parent)) => Ok((parent, last.as_str())),
        None => Err(PointerError::NoParent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(steps: &[&str]) -> Vec<String> {
        steps.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn root_pointer_is_empty_path() {
        assert!(parse_json_pointer("").is_empty());
        assert_eq!(format_json_pointer(&[]), "");
    }

    #[test]
    fn single_slash_is_empty_key() {
        assert_eq!(parse_json_pointer("/"), p(&[""]));
        assert_eq!(format_json_pointer(&p(&[""])), "/");
    }

    #[test]
    fn escaped_segments_round_trip() {
        let path = p(&["a/b", "c~d", "0"]);
        let ptr = format_json_pointer(&path);
        assert_eq!(ptr, "/a~1b/c~0d/0");
        assert_eq!(parse_json_pointer(&ptr), path);
    }

    #[test]
    fn strict_rejects_relative() {
        assert!(parse_json_pointer_strict("foo").is_err());
        assert_eq!(parse_json_pointer_strict("/foo").unwrap(), p(&["foo"]));
    }

    #[test]
    fn child_and_prefix() {
        assert!(is_child(&p(&["a"]), &p(&["a", "b"])));
        assert!(!is_child(&p(&["a"]), &p(&["a"])));
        assert!(starts_with(&p(&["a"]), &p(&["a"])));
        assert!(!starts_with(&p(&["b", "a"]), &p(&["a"])));
    }

    #[test]
    fn split_last_of_root_fails() {
        assert_eq!(split_last(&[]), Err(PointerError::NoParent));
        let path = p(&["a", "b"]);
        let (parent, last) = split_last(&path).unwrap();
        assert_eq!(parent, &p(&["a"])[..]);
        assert_eq!(last, "b");
    }
}
