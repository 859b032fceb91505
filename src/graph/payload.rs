use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Deepest ring a payload may ask for; larger depths are clamped to it.
pub const MAX_SUPPLIED_DEPTH: u32 = 1024;

/// Graph payload as handed to `GraphEngine::load_graph`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Graph {
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(default)]
    pub depth: Option<f64>,
    /// Remaining fields: numbers become metrics; `file`, `breadcrumbs`,
    /// `code` and the analysis lists become node details.
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LinkSpec {
    pub source: String,
    pub target: String,
}

/// What the detail panel shows for a selected node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeDetails {
    pub id: String,
    pub file: Option<String>,
    pub breadcrumbs: Option<String>,
    pub code: Option<String>,
    pub code_smells: Vec<Finding>,
    pub security_issues: Vec<Finding>,
    pub documentation: Option<Documentation>,
}

/// One analyzer note attached to a function: a code smell or a security
/// issue. Smells carry `name`, issues carry `severity`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub severity: Option<String>,
    pub line: Option<u64>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Documentation {
    pub docstring: Option<String>,
    pub parameters: Vec<String>,
    pub return_type: Option<String>,
    pub line: Option<u64>,
}

impl Finding {
    /// One-line rendering for the detail panel, e.g.
    /// `[high] dangerous_function (line 2): Use of eval`.
    pub fn summary(&self) -> String {
        let mut text = String::new();
        if let Some(severity) = &self.severity {
            text.push_str(&format!("[{severity}] "));
        }
        text.push_str(self.kind.as_deref().unwrap_or("finding"));
        if let Some(name) = &self.name {
            text.push_str(&format!(" `{name}`"));
        }
        if let Some(line) = self.line {
            text.push_str(&format!(" (line {line})"));
        }
        if let Some(description) = &self.description {
            text.push_str(&format!(": {description}"));
        }
        text
    }
}

const ANALYSIS_KEYS: [&str; 3] = ["code_smells", "security_issues", "documentation"];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Graph(Graph),
    CallGraph(BTreeMap<String, FunctionRecord>),
}

#[derive(Debug, Default, Deserialize)]
struct FunctionRecord {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    calls: Vec<String>,
    #[serde(default)]
    complexity: ComplexityRecord,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    breadcrumbs: Option<String>,
    #[serde(default)]
    code_smells: Value,
    #[serde(default)]
    security_issues: Value,
    #[serde(default)]
    documentation: Value,
}

#[derive(Debug, Default, Deserialize)]
struct ComplexityRecord {
    #[serde(default)]
    cyclomatic_complexity: Option<f64>,
    #[serde(default)]
    loc: Option<f64>,
}

impl Graph {
    pub fn new(nodes: Vec<NodeSpec>, links: Vec<LinkSpec>) -> Self {
        Self { nodes, links }
    }
}

impl NodeSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            depth: None,
            fields: HashMap::new(),
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_owned(), Value::from(value));
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(f64::from(depth));
        self
    }

    pub fn with_detail(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_owned(), Value::from(value));
        self
    }

    pub(super) fn metrics(&self) -> HashMap<String, f64> {
        self.fields
            .iter()
            .filter_map(|(name, value)| value.as_f64().map(|number| (name.clone(), number)))
            .collect()
    }

    /// Supplied depth as a ring index, capped at `MAX_SUPPLIED_DEPTH`.
    pub(super) fn depth(&self) -> Option<u32> {
        self.depth
            .filter(|depth| depth.is_finite() && *depth >= 0.0)
            .map(|depth| depth.round().min(f64::from(MAX_SUPPLIED_DEPTH)) as u32)
    }

    pub(super) fn details(&self) -> Option<NodeDetails> {
        let text = |key: &str| {
            self.fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_owned)
        };

        let details = NodeDetails {
            id: self.id.clone(),
            file: text("file"),
            breadcrumbs: text("breadcrumbs"),
            code: text("code"),
            code_smells: self.analysis("code_smells").unwrap_or_default(),
            security_issues: self.analysis("security_issues").unwrap_or_default(),
            documentation: self.analysis("documentation"),
        };

        let empty = NodeDetails {
            id: self.id.clone(),
            ..NodeDetails::default()
        };
        (details != empty).then_some(details)
    }

    /// Decodes one analysis field. Malformed entries are logged and dropped
    /// so the rest of the node still loads.
    fn analysis<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.fields.get(key).filter(|value| !value.is_null())?;
        match T::deserialize(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                log::warn!("ignoring malformed {key} on node {}: {err}", self.id);
                None
            }
        }
    }
}

impl LinkSpec {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

pub fn load_payload(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph payload {}", path.display()))?;
    parse_payload(&raw).with_context(|| format!("failed to parse graph payload {}", path.display()))
}

/// Accepts either a `{nodes, links}` graph or the analyzer's call-graph map
/// keyed by function name.
pub fn parse_payload(raw: &str) -> Result<Graph> {
    let payload: Payload = serde_json::from_str(raw).context("invalid graph JSON")?;
    Ok(match payload {
        Payload::Graph(graph) => graph,
        Payload::CallGraph(functions) => call_graph_to_graph(functions),
    })
}

fn call_graph_to_graph(functions: BTreeMap<String, FunctionRecord>) -> Graph {
    let mut nodes = Vec::with_capacity(functions.len());
    let mut links = Vec::new();

    for (name, record) in functions {
        let mut node = NodeSpec::new(name.clone()).with_metric(
            "complexity",
            record.complexity.cyclomatic_complexity.unwrap_or(0.0),
        );
        if let Some(loc) = record.complexity.loc {
            node = node.with_metric("loc", loc);
        }
        for (key, value) in [
            ("file", record.file),
            ("breadcrumbs", record.breadcrumbs),
            ("code", record.code),
        ] {
            if let Some(value) = value {
                node = node.with_detail(key, &value);
            }
        }
        for (key, value) in ANALYSIS_KEYS.into_iter().zip([
            record.code_smells,
            record.security_issues,
            record.documentation,
        ]) {
            if !value.is_null() {
                node.fields.insert(key.to_owned(), value);
            }
        }
        nodes.push(node);

        for callee in record.calls {
            links.push(LinkSpec::new(name.clone(), callee));
        }
    }

    Graph { nodes, links }
}
