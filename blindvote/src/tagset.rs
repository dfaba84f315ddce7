use crate::*;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A single `key=value` pair attached to a ballot or election.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    key: String,
    value: String,
}

impl Tag {
    /// Parse a tag from its `key=value` form. The `=` appears only as the
    /// separator, so there must be exactly one.
    pub fn from_bytes(raw: &[u8]) -> Result<Tag, Error> {
        let text = std::str::from_utf8(raw).map_err(|_| Error::MalformedTag)?;
        let mut parts = text.splitn(2, '=');
        let key = parts.next().unwrap_or("");
        let value = parts.next().ok_or(Error::MalformedTag)?;
        Tag::new(key, value)
    }

    pub fn new(key: &str, value: &str) -> Result<Tag, Error> {
        if key.len() > MAX_TAG_KEY_SIZE {
            return Err(Error::TagKeyTooBig);
        }
        if !VALID_TAG_KEY.is_match(key) {
            return Err(Error::TagKeyInvalid);
        }
        if value.len() > MAX_TAG_VALUE_SIZE {
            return Err(Error::TagValueTooBig);
        }
        if !value.is_empty() && !VALID_TAG_VALUE.is_match(value) {
            return Err(Error::TagValueInvalid);
        }
        Ok(Tag {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// An ordered set of tags. Insertion order is preserved and duplicate
/// keys are permitted at this layer; storage collaborators deduplicate
/// with last-writer-wins via [`TagSet::map`]. The canonical form is one
/// tag per line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    pub fn from_bytes(raw: &[u8]) -> Result<TagSet, Error> {
        let text = std::str::from_utf8(raw).map_err(|_| Error::MalformedTag)?;
        let mut tags = Vec::new();
        for line in text.split('\n') {
            tags.push(Tag::from_bytes(line.as_bytes())?);
        }
        if tags.len() > MAX_TAGS {
            return Err(Error::TagSetTooBig);
        }
        Ok(TagSet(tags))
    }

    pub fn from_tags(tags: Vec<Tag>) -> Result<TagSet, Error> {
        if tags.len() > MAX_TAGS {
            return Err(Error::TagSetTooBig);
        }
        Ok(TagSet(tags))
    }

    pub fn tags(&self) -> &[Tag] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key/value view with duplicate keys collapsed, last writer wins.
    pub fn map(&self) -> HashMap<&str, &str> {
        self.0
            .iter()
            .map(|t| (t.key.as_str(), t.value.as_str()))
            .collect()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|t| t.key.as_str()).collect()
    }

    pub fn values(&self) -> Vec<&str> {
        self.0.iter().map(|t| t.value.as_str()).collect()
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl FromStr for TagSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TagSet::from_bytes(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let raw = b"district=7\nprecinct=12a";
        let tagset = TagSet::from_bytes(raw).unwrap();
        assert_eq!(tagset.tags().len(), 2);
        assert_eq!(tagset.to_string().as_bytes(), raw);
    }

    #[test]
    fn duplicate_keys_last_writer_wins() {
        let tagset = TagSet::from_bytes(b"district=7\ndistrict=9").unwrap();
        assert_eq!(tagset.tags().len(), 2);
        assert_eq!(tagset.map().get("district"), Some(&"9"));
    }

    #[test]
    fn separator_appears_exactly_once() {
        assert!(Tag::from_bytes(b"district").is_err());
        assert!(Tag::from_bytes(b"district=7=9").is_err());
        assert!(Tag::from_bytes(b"district=").is_ok());
    }

    #[test]
    fn size_limits() {
        let key = "k".repeat(MAX_TAG_KEY_SIZE + 1);
        assert!(matches!(
            Tag::new(&key, "v"),
            Err(Error::TagKeyTooBig)
        ));

        let value = "v".repeat(MAX_TAG_VALUE_SIZE + 1);
        assert!(matches!(
            Tag::new("k", &value),
            Err(Error::TagValueTooBig)
        ));
    }
}
