// src/metadata/object_path.rs
use crate::error::{TdmsError, Result};
use std::fmt;

/// Represents an object path in the TDMS hierarchy.
///
/// Paths are `/` for the file, `/'group'` for a group and
/// `/'group'/'channel'` for a channel. A single quote inside a name is
/// written twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectPath {
    Root,
    Group(String),
    Channel { group: String, channel: String },
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectPath::Root => write!(f, "/"),
            ObjectPath::Group(name) => write!(f, "/'{}'", escape(name)),
            ObjectPath::Channel { group, channel } => {
                write!(f, "/'{}'/'{}'", escape(group), escape(channel))
            }
        }
    }
}

impl ObjectPath {
    pub fn from_string(s: &str) -> Result<Self> {
        if s == "/" {
            return Ok(ObjectPath::Root);
        }

        let invalid = || TdmsError::InvalidPath(s.to_string());
        let mut rest = s.strip_prefix('/').ok_or_else(invalid)?;
        let mut names: Vec<String> = Vec::with_capacity(2);

        loop {
            let (name, tail) = parse_quoted(rest).ok_or_else(invalid)?;
            names.push(name);
            if tail.is_empty() {
                break;
            }
            rest = tail.strip_prefix('/').ok_or_else(invalid)?;
        }

        let mut names = names.into_iter();
        match (names.next(), names.next(), names.next()) {
            (Some(group), None, None) => Ok(ObjectPath::Group(group)),
            (Some(group), Some(channel), None) => Ok(ObjectPath::Channel { group, channel }),
            _ => Err(invalid()),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        ObjectPath::Group(name.into())
    }

    pub fn channel(group: impl Into<String>, channel: impl Into<String>) -> Self {
        ObjectPath::Channel {
            group: group.into(),
            channel: channel.into(),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, ObjectPath::Root)
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ObjectPath::Group(_))
    }

    pub fn is_channel(&self) -> bool {
        matches!(self, ObjectPath::Channel { .. })
    }

    /// Name of the group this path belongs to, if any.
    pub fn group_name(&self) -> Option<&str> {
        match self {
            ObjectPath::Root => None,
            ObjectPath::Group(name) => Some(name),
            ObjectPath::Channel { group, .. } => Some(group),
        }
    }

    /// Path of the owning group (`/'group'`), if any.
    pub fn group_path(&self) -> Option<ObjectPath> {
        self.group_name().map(ObjectPath::group)
    }
}

fn escape(name: &str) -> String {
    name.replace('\'', "''")
}

/// Parse one `'name'` component, returning the unescaped name and the text
/// after the closing quote.
fn parse_quoted(s: &str) -> Option<(String, &str)> {
    let body = s.strip_prefix('\'')?;
    let mut name = String::new();
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '\'' {
            name.push(c);
            continue;
        }
        if let Some(&(_, '\'')) = chars.peek() {
            chars.next();
            name.push('\'');
        } else {
            return Some((name, &body[i + 1..]));
        }
    }
    None
}
