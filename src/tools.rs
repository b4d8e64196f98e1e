//! The sandboxed tool set the reasoning backend may call.
//!
//! Three read-only operations over the working tree. Every operation returns
//! text: failures become descriptive results the backend can react to, never
//! errors for the caller.

mod files;
mod search;

use std::{
    fmt,
    path::{Component, Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::model::ToolCallRequest;

use files::{list_directory, read_file};
use search::search_keyword;

/// The fixed set of operations exposed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    ListDirectory,
    ReadFile,
    SearchKeyword,
}

impl ToolName {
    pub const ALL: [Self; 3] = [Self::ListDirectory, Self::ReadFile, Self::SearchKeyword];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ListDirectory => "list_directory",
            Self::ReadFile => "read_file",
            Self::SearchKeyword => "search_keyword",
        }
    }

    fn schema(self) -> ToolSchema {
        let (description, parameters) = match self {
            Self::ListDirectory => (
                "List the entries of a directory in the repository. Directories end with '/'.",
                json!({
                    "type": "object",
                    "properties": { "path": { "type": "string", "description": "Directory, relative to the repository root. Defaults to '.'." } }
                }),
            ),
            Self::ReadFile => (
                "Read a text file in the repository (first 5000 characters).",
                json!({
                    "type": "object",
                    "properties": { "path": { "type": "string", "description": "File, relative to the repository root." } },
                    "required": ["path"]
                }),
            ),
            Self::SearchKeyword => (
                "Find source, markup, and config files containing a literal keyword (up to 15 paths).",
                json!({
                    "type": "object",
                    "properties": {
                        "keyword": { "type": "string", "description": "Literal text to look for." },
                        "path": { "type": "string", "description": "Directory to search under. Defaults to '.'." }
                    },
                    "required": ["keyword"]
                }),
            ),
        };

        ToolSchema {
            name: self.as_str(),
            description,
            parameters,
        }
    }
}

impl FromStr for ToolName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or(())
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool declaration as sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSchema {
    pub name: &'static str,
    pub description: &'static str,

    /// JSON Schema for the arguments object.
    pub parameters: Value,
}

// Argument shapes. Fields beyond these are dropped during binding.

#[derive(Deserialize)]
struct ListArgs {
    #[serde(default = "current_dir")]
    path: String,
}

#[derive(Deserialize)]
struct ReadArgs {
    path: String,
}

#[derive(Deserialize)]
struct SearchArgs {
    keyword: String,
    #[serde(default = "current_dir")]
    path: String,
}

fn current_dir() -> String {
    ".".to_string()
}

/// The tool set, rooted at the working tree it may read.
#[derive(Debug, Clone)]
pub struct Toolbox {
    root: PathBuf,
}

impl Toolbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Execute one requested call and return its text result.
    ///
    /// Unknown tool names and unbindable arguments produce an error result
    /// so the backend can correct itself on the next turn.
    pub fn dispatch(&self, call: &ToolCallRequest) -> String {
        let Ok(tool) = call.name.parse::<ToolName>() else {
            tracing::warn!(tool = %call.name, "backend requested an unknown tool");
            return format!(
                "Error: unknown tool '{}'. Available tools: list_directory, read_file, search_keyword.",
                call.name
            );
        };

        self.invoke(tool, &call.arguments)
    }

    /// Execute a known tool with backend-supplied arguments.
    pub fn invoke(&self, tool: ToolName, arguments: &Value) -> String {
        match tool {
            ToolName::ListDirectory => match bind::<ListArgs>(tool, arguments) {
                Ok(args) => list_directory(&self.root, &args.path),
                Err(e) => e,
            },
            ToolName::ReadFile => match bind::<ReadArgs>(tool, arguments) {
                Ok(args) => read_file(&self.root, &args.path),
                Err(e) => e,
            },
            ToolName::SearchKeyword => match bind::<SearchArgs>(tool, arguments) {
                Ok(args) => search_keyword(&self.root, &args.keyword, &args.path),
                Err(e) => e,
            },
        }
    }
}

/// Declarations for every tool, in a fixed order.
pub fn schemas() -> Vec<ToolSchema> {
    ToolName::ALL.into_iter().map(ToolName::schema).collect()
}

/// Bind an arguments value to a tool's parameter struct.
///
/// A missing (`null`) arguments value binds like an empty object.
fn bind<T: DeserializeOwned>(tool: ToolName, arguments: &Value) -> Result<T, String> {
    let empty = json!({});
    let arguments = if arguments.is_null() { &empty } else { arguments };

    T::deserialize(arguments).map_err(|e| format!("Error: invalid arguments for {tool}: {e}"))
}

/// Resolve a caller-supplied path inside `root`.
///
/// Rejects parent-directory segments and absolute paths, so nothing outside
/// the working tree is ever touched.
pub(crate) fn resolve(root: &Path, path: &str) -> Result<PathBuf, String> {
    let relative = Path::new(path);
    let escapes = relative.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });

    if escapes {
        tracing::warn!(path, "rejected path outside the working tree");
        return Err(format!(
            "Error: path '{path}' is not allowed; use a path inside the repository without '..'"
        ));
    }

    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        if let Component::Normal(segment) = component {
            resolved.push(segment);
        }
    }
    Ok(resolved)
}
