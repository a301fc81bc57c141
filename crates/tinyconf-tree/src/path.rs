use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One step from a node to a child.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A route from the root to a node, e.g. `server.ports[0]`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Path {
    segments: Vec<Segment>,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("invalid path `{input}` at offset {offset}: {reason}")]
pub struct ParsePathError {
    pub input: String,
    pub offset: usize,
    pub reason: &'static str,
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self { segments: parent.to_vec() })
    }

    /// The first `len` segments.
    pub fn prefix(&self, len: usize) -> Self {
        Self { segments: self.segments[..len.min(self.segments.len())].to_vec() }
    }

    pub fn join(&self, segment: impl Into<Segment>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

pub(crate) fn is_bare_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) if is_bare_key(key) => f.write_str(key),
            Self::Key(key) => write!(f, "{key:?}"),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, Segment::Key(_)) {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = ParsePathError;

    /// Parses `a.b[0]."dotted.key"`. The empty string is the root.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |offset, reason| ParsePathError { input: s.to_string(), offset, reason };
        let mut segments = Vec::new();
        let mut chars = s.char_indices().peekable();

        if s.is_empty() {
            return Ok(Self::root());
        }

        loop {
            match chars.peek().copied() {
                Some((at, '[')) => {
                    chars.next();
                    let mut digits = String::new();
                    while let Some(&(_, c)) = chars.peek() {
                        if !c.is_ascii_digit() {
                            break;
                        }
                        digits.push(c);
                        chars.next();
                    }
                    if chars.next().map(|(_, c)| c) != Some(']') {
                        return Err(error(at, "unterminated index"));
                    }
                    let Ok(index) = digits.parse() else {
                        return Err(error(at, "index must be a non-negative integer"));
                    };
                    segments.push(Segment::Index(index));
                }
                Some((at, '"')) => {
                    chars.next();
                    let mut key = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '"')) => break,
                            Some((_, '\\')) => match chars.next() {
                                Some((_, c)) => key.push(c),
                                None => return Err(error(at, "unterminated quoted key")),
                            },
                            Some((_, c)) => key.push(c),
                            None => return Err(error(at, "unterminated quoted key")),
                        }
                    }
                    segments.push(Segment::Key(key));
                }
                Some((_, c)) if !matches!(c, '.' | ']') => {
                    let mut key = String::new();
                    while let Some(&(_, c)) = chars.peek() {
                        if matches!(c, '.' | '[' | ']' | '"') {
                            break;
                        }
                        key.push(c);
                        chars.next();
                    }
                    segments.push(Segment::Key(key));
                }
                Some((at, _)) => return Err(error(at, "expected a key or an index")),
                None => return Err(error(s.len(), "expected a key or an index")),
            }

            match chars.peek().copied() {
                None => break,
                Some((_, '.')) => {
                    chars.next();
                }
                Some((_, '[')) => {}
                Some((at, _)) => return Err(error(at, "expected `.` or `[`")),
            }
        }

        Ok(Self { segments })
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(keys: [&str; N]) -> Self {
        keys.into_iter().map(Segment::from).collect()
    }
}

impl From<&[&str]> for Path {
    fn from(keys: &[&str]) -> Self {
        keys.iter().copied().map(Segment::from).collect()
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self { segments: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_indices() {
        let path: Path = r#"server.ports[0]."a.b""#.parse().unwrap();
        assert_eq!(
            path.segments(),
            [
                Segment::Key("server".into()),
                Segment::Key("ports".into()),
                Segment::Index(0),
                Segment::Key("a.b".into())
            ]
        );
        assert_eq!(path.to_string(), r#"server.ports[0]."a.b""#);
    }

    #[test]
    fn empty_string_is_root() {
        assert!("".parse::<Path>().unwrap().is_root());
        assert_eq!(Path::root().to_string(), "");
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!("a..b".parse::<Path>().unwrap_err().offset, 2);
        assert_eq!("a.".parse::<Path>().unwrap_err().reason, "expected a key or an index");
        assert_eq!("a[x]".parse::<Path>().unwrap_err().reason, "unterminated index");
        assert_eq!("a[0]b".parse::<Path>().unwrap_err().reason, "expected `.` or `[`");
    }

    #[test]
    fn parent_and_prefix() {
        let path = Path::from(["a", "b", "c"]);
        assert_eq!(path.parent(), Some(Path::from(["a", "b"])));
        assert_eq!(path.prefix(1), Path::from(["a"]));
        assert!(path.starts_with(&Path::from(["a", "b"])));
        assert!(!path.starts_with(&Path::from(["b"])));
        assert_eq!(Path::root().parent(), None);
    }
}
