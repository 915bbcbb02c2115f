//! Remote tree node types.

use chrono::{DateTime, Utc};
use log::debug;
use serde_json::Value;

use crate::error::{DisboxError, Result};

/// Node type as reported by the metadata server's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    File,
    Directory,
}

impl NodeType {
    /// Parse the server's `type` string.
    pub fn from_type(t: &str) -> Option<Self> {
        match t {
            "file" => Some(NodeType::File),
            "directory" => Some(NodeType::Directory),
            _ => None,
        }
    }
}

/// How a caller identifies a file: by numeric id or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRef {
    ById(i64),
    ByName(String),
}

impl From<i64> for FileRef {
    fn from(id: i64) -> Self {
        FileRef::ById(id)
    }
}

impl From<i32> for FileRef {
    fn from(id: i32) -> Self {
        FileRef::ById(id.into())
    }
}

impl From<u32> for FileRef {
    fn from(id: u32) -> Self {
        FileRef::ById(id.into())
    }
}

impl From<&str> for FileRef {
    fn from(name: &str) -> Self {
        FileRef::ByName(name.to_string())
    }
}

impl From<String> for FileRef {
    fn from(name: String) -> Self {
        FileRef::ByName(name)
    }
}

impl std::fmt::Display for FileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileRef::ById(id) => write!(f, "id {}", id),
            FileRef::ByName(name) => write!(f, "{}", name),
        }
    }
}

/// A stored file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    /// Server-assigned identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// File size in bytes
    pub size: u64,
    /// Chunk references in reassembly order
    pub content: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A folder together with its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Directory {
    pub id: Option<i64>,
    pub name: String,
    pub children: DirectoryNode,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// One entry of the remote tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    File(FileEntry),
    Directory(Directory),
}

impl Node {
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::File(_) => NodeType::File,
            Node::Directory(_) => NodeType::Directory,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Node::File(file) => &file.name,
            Node::Directory(dir) => &dir.name,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            Node::File(file) => Some(file),
            Node::Directory(_) => None,
        }
    }

    /// Parse a node from its JSON object. `key` is the name it is stored under.
    pub(crate) fn from_json(key: &str, json: &Value) -> Result<Node> {
        let type_str = json
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DisboxError::MalformedResponse(format!("{}: missing type", key)))?;
        let node_type = NodeType::from_type(type_str).ok_or_else(|| {
            DisboxError::MalformedResponse(format!("{}: unknown type {:?}", key, type_str))
        })?;

        let name = json
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or(key)
            .to_string();
        let created_at = parse_timestamp(json.get("created_at"));
        let updated_at = parse_timestamp(json.get("updated_at"));

        match node_type {
            NodeType::File => {
                let id = json.get("id").and_then(|v| v.as_i64()).ok_or_else(|| {
                    DisboxError::MalformedResponse(format!("{}: missing file id", key))
                })?;
                let size = json.get("size").and_then(|v| v.as_u64()).unwrap_or(0);
                let content = match json.get("content") {
                    Some(Value::String(raw)) => parse_chunk_refs(raw),
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                    Some(other) => {
                        return Err(DisboxError::MalformedResponse(format!(
                            "{}: chunk list has unexpected type {}",
                            key,
                            json_kind(other)
                        )));
                    }
                    None => {
                        return Err(DisboxError::MalformedResponse(format!(
                            "{}: missing chunk list",
                            key
                        )));
                    }
                };

                Ok(Node::File(FileEntry {
                    id,
                    name,
                    size,
                    content,
                    created_at,
                    updated_at,
                }))
            }
            NodeType::Directory => {
                let children = match json.get("children") {
                    Some(children) => DirectoryNode::from_json(children)?,
                    None => DirectoryNode::default(),
                };

                Ok(Node::Directory(Directory {
                    id: json.get("id").and_then(|v| v.as_i64()),
                    name,
                    children,
                    created_at,
                    updated_at,
                }))
            }
        }
    }
}

/// One level of the remote tree, in server order.
///
/// Children that fail to parse are kept aside with the reason; they only surface as
/// `MalformedResponse` when a lookup or listing touches them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryNode {
    entries: Vec<(String, Node)>,
    malformed: Vec<(String, String)>,
}

impl DirectoryNode {
    /// Parse a `children` object.
    ///
    /// Relies on `serde_json`'s `preserve_order` so entries keep the server's order.
    pub(crate) fn from_json(json: &Value) -> Result<Self> {
        let map = json.as_object().ok_or_else(|| {
            DisboxError::MalformedResponse("children is not an object".to_string())
        })?;

        let mut entries = Vec::with_capacity(map.len());
        let mut malformed = Vec::new();
        for (key, value) in map {
            match Node::from_json(key, value) {
                Ok(node) => entries.push((key.clone(), node)),
                Err(err) => {
                    debug!("deferring malformed entry {}: {}", key, err);
                    malformed.push((key.clone(), err.to_string()));
                }
            }
        }
        Ok(Self { entries, malformed })
    }

    /// Error for a child that exists but could not be parsed.
    pub fn malformed_entry(&self, name: &str) -> Option<DisboxError> {
        self.malformed
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, reason)| DisboxError::MalformedResponse(reason.clone()))
    }

    /// Fail if any direct child could not be parsed.
    pub fn ensure_well_formed(&self) -> Result<()> {
        match self.malformed.first() {
            Some((_, reason)) => Err(DisboxError::MalformedResponse(reason.clone())),
            None => Ok(()),
        }
    }

    /// Look up a direct child by name.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_children(self, name: &str) -> Result<DirectoryNode> {
        if let Some(err) = self.malformed_entry(name) {
            return Err(err);
        }
        self.entries
            .into_iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, node)| match node {
                Node::Directory(dir) => Some(dir.children),
                Node::File(_) => None,
            })
            .ok_or_else(|| DisboxError::NotFound(format!("Invalid folder name: {}", name)))
    }
}

impl FromIterator<(String, Node)> for DirectoryNode {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        let mut entries: Vec<(String, Node)> = Vec::new();
        for (key, node) in iter {
            if !entries.iter().any(|(existing, _)| *existing == key) {
                entries.push((key, node));
            }
        }
        Self {
            entries,
            malformed: Vec::new(),
        }
    }
}

/// Parse the stored chunk list, e.g. `["a","b","c"]`, into its references.
///
/// Brackets are stripped, quotes removed and the rest split on commas.
/// Blank tokens are dropped, so `[]` yields no chunks.
pub fn parse_chunk_refs(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_matches(|c| c == '[' || c == ']')
        .replace('"', "")
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    let raw = value?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
