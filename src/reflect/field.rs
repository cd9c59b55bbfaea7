//! Field descriptors and annotation strings.

/// FieldDescriptor describes one declared field of a reflected struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name is the Rust field name.
    pub name: &'static str,
    /// Tag holds the raw annotation string of the field.
    pub tag: StructTag<'static>,
    /// Exported is true for fields declared with a `pub` visibility.
    /// Private fields are never read or written by the copy engine.
    pub exported: bool,
}

impl FieldDescriptor {
    /// Creates a new field descriptor.
    pub const fn new(name: &'static str, tag: &'static str, exported: bool) -> Self {
        FieldDescriptor {
            name,
            tag: StructTag::new(tag),
            exported,
        }
    }
}

/// StructTag is an annotation string made of space separated `key:"value"`
/// pairs, e.g. `protectfor:"create,update" protectopt:"match"`.
///
/// Values are returned verbatim; a backslash only prevents the following
/// quote from terminating the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StructTag<'a>(&'a str);

impl<'a> StructTag<'a> {
    /// Creates a new struct tag from its raw text.
    pub const fn new(raw: &'a str) -> Self {
        StructTag(raw)
    }

    /// Returns the raw text.
    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// Returns true if the tag has no content.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Returns the value associated with `key`, or the empty string if absent.
    pub fn get(&self, key: &str) -> &'a str {
        self.lookup(key).unwrap_or("")
    }

    /// Returns the value associated with `key`, if the key is present.
    ///
    /// Parsing stops at the first malformed pair.
    pub fn lookup(&self, key: &str) -> Option<&'a str> {
        let mut rest = self.0;
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                return None;
            }

            let colon = rest.find(':')?;
            let name = &rest[..colon];
            if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == '"') {
                return None;
            }

            let quoted = rest[colon + 1..].strip_prefix('"')?;
            let end = closing_quote(quoted)?;
            if name == key {
                return Some(&quoted[..end]);
            }
            rest = &quoted[end + 1..];
        }
    }
}

fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_single_key() {
        let tag = StructTag::new(r#"protectfor:"create,update""#);
        assert_eq!(tag.lookup("protectfor"), Some("create,update"));
        assert_eq!(tag.lookup("protectopt"), None);
        assert_eq!(tag.get("protectopt"), "");
    }

    #[test]
    fn test_lookup_multiple_keys() {
        let tag = StructTag::new(r#"json:"items,omitempty"  protectfor:"update" protectopt:"match""#);
        assert_eq!(tag.get("json"), "items,omitempty");
        assert_eq!(tag.get("protectfor"), "update");
        assert_eq!(tag.get("protectopt"), "match");
    }

    #[test]
    fn test_lookup_escaped_quote() {
        let tag = StructTag::new(r#"note:"say \"hi\"" protectfor:"create""#);
        assert_eq!(tag.get("note"), r#"say \"hi\""#);
        assert_eq!(tag.get("protectfor"), "create");
    }

    #[test]
    fn test_lookup_malformed() {
        assert_eq!(StructTag::new("protectfor").lookup("protectfor"), None);
        assert_eq!(StructTag::new(r#"protectfor:create"#).lookup("protectfor"), None);
        assert_eq!(StructTag::new(r#"protectfor:"create"#).lookup("protectfor"), None);
        assert!(StructTag::new("  ").is_empty());
    }

    #[test]
    fn test_descriptor_const() {
        const FIELD: FieldDescriptor = FieldDescriptor::new("id", r#"protectfor:"create""#, true);
        assert_eq!(FIELD.name, "id");
        assert_eq!(FIELD.tag.get("protectfor"), "create");
        assert!(FIELD.exported);
    }
}
