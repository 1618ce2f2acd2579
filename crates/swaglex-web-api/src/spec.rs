//! The OpenAPI document served by `/spec.json` and `/spec.yaml`, plus the
//! summaries derived from it for the `/api/stats`, `/api/paths`, `/api/tags`
//! and `/api/version` endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};
use swaglex_blog::TagIndex;
use thiserror::Error;
use utoipa::{OpenApi, ToSchema};

use crate::openapi::ApiDoc;

const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "options", "head"];

#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Failed to read OpenAPI document {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse OpenAPI document {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("OpenAPI document must be a mapping at the top level")]
    NotAnObject,
    #[error("Failed to serialize OpenAPI document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to render OpenAPI document as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A loaded OpenAPI document. The YAML rendering is produced once up front so
/// that serving it cannot fail.
#[derive(Debug, Clone)]
pub struct ApiSpec {
    document: Value,
    yaml: String,
}

/// One operation of the document, keyed by path and lowercase method.
#[derive(Debug, Clone, PartialEq)]
struct Operation {
    path: String,
    method: String,
    operation_id: Option<String>,
    summary: Option<String>,
    tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpecStats {
    pub api_title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub statistics: SpecStatistics,
    pub endpoints: SpecEndpoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpecStatistics {
    pub total_paths: usize,
    pub total_operations: usize,
    pub total_tags: usize,
    pub tags: Vec<String>,
    pub servers: usize,
    pub security_schemes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpecEndpoints {
    pub docs: String,
    pub json_spec: String,
    pub yaml_spec: String,
    pub health: String,
    pub stats: String,
    pub paths: String,
    pub tags: String,
}

impl SpecEndpoints {
    pub fn new(docs_path: &str) -> Self {
        Self {
            docs: docs_path.to_string(),
            json_spec: "/spec.json".to_string(),
            yaml_spec: "/spec.yaml".to_string(),
            health: "/health".to_string(),
            stats: "/api/stats".to_string(),
            paths: "/api/paths".to_string(),
            tags: "/api/tags".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PathsReport {
    pub total_paths: usize,
    pub paths: Vec<PathSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PathSummary {
    pub path: String,
    pub methods: Vec<String>,
    pub operations: Vec<OperationSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OperationSummary {
    /// Uppercase HTTP method.
    pub method: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OperationTags {
    pub tags: Vec<OperationTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OperationTag {
    pub name: String,
    pub operation_count: usize,
    pub operations: Vec<OperationRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OperationRef {
    pub path: String,
    /// The operation id, or `unknown` when the operation has none.
    pub method: String,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub contact: Option<Value>,
    pub license: Option<Value>,
    pub servers: Option<Value>,
    pub last_updated: DateTime<Utc>,
}

impl ApiSpec {
    /// The document generated from the annotated handlers.
    pub fn generated() -> Result<Self, SpecError> {
        Self::from_value(serde_json::to_value(ApiDoc::openapi())?)
    }

    /// Reads a YAML or JSON document from disk.
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let raw = fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        // JSON is a subset of YAML, so one parser covers both.
        let document: Value = serde_yaml::from_str(&raw).map_err(|source| SpecError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_value(document)
    }

    pub fn from_value(document: Value) -> Result<Self, SpecError> {
        if !document.is_object() {
            return Err(SpecError::NotAnObject);
        }
        let yaml = serde_yaml::to_string(&document)?;
        Ok(Self { document, yaml })
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn yaml(&self) -> &str {
        &self.yaml
    }

    pub fn title(&self) -> Option<String> {
        self.info_str("title")
    }

    pub fn version(&self) -> Option<String> {
        self.info_str("version")
    }

    pub fn description(&self) -> Option<String> {
        self.info_str("description")
    }

    pub fn stats(&self, docs_path: &str) -> SpecStats {
        let operations = self.operations();
        let tags = tag_index(&operations)
            .names()
            .map(str::to_string)
            .collect::<Vec<_>>();

        SpecStats {
            api_title: self.title(),
            version: self.version(),
            description: self.description(),
            statistics: SpecStatistics {
                total_paths: self.path_items().count(),
                total_operations: operations.len(),
                total_tags: tags.len(),
                tags,
                servers: self
                    .document
                    .get("servers")
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len),
                security_schemes: self
                    .document
                    .pointer("/components/securitySchemes")
                    .and_then(Value::as_object)
                    .map_or(0, Map::len),
            },
            endpoints: SpecEndpoints::new(docs_path),
        }
    }

    pub fn paths(&self) -> PathsReport {
        let paths = self
            .path_items()
            .map(|(path, item)| {
                let operations = operations_of(path, item);
                PathSummary {
                    path: path.to_string(),
                    methods: operations.iter().map(|op| op.method.clone()).collect(),
                    operations: operations
                        .into_iter()
                        .map(|op| OperationSummary {
                            method: op.method.to_uppercase(),
                            summary: op.summary,
                            tags: op.tags,
                        })
                        .collect(),
                }
            })
            .collect::<Vec<_>>();

        PathsReport {
            total_paths: paths.len(),
            paths,
        }
    }

    pub fn tags(&self) -> OperationTags {
        let tags = tag_index(&self.operations())
            .into_iter()
            .map(|group| OperationTag {
                operation_count: group.count(),
                name: group.name,
                operations: group.entries,
            })
            .collect();

        OperationTags { tags }
    }

    pub fn version_info(&self) -> VersionInfo {
        VersionInfo {
            title: self.title(),
            version: self.version(),
            description: self.description(),
            contact: self.document.pointer("/info/contact").cloned(),
            license: self.document.pointer("/info/license").cloned(),
            servers: self.document.get("servers").cloned(),
            last_updated: Utc::now(),
        }
    }

    fn info_str(&self, key: &str) -> Option<String> {
        self.document
            .get("info")
            .and_then(|info| info.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn path_items(&self) -> impl Iterator<Item = (&str, &Map<String, Value>)> {
        self.document
            .get("paths")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .filter_map(|(path, item)| item.as_object().map(|item| (path.as_str(), item)))
    }

    fn operations(&self) -> Vec<Operation> {
        self.path_items()
            .flat_map(|(path, item)| operations_of(path, item))
            .collect()
    }
}

/// Operations of one path item in document order. Keys that are not HTTP
/// methods (`parameters`, `summary`, extensions) are skipped.
fn operations_of(path: &str, item: &Map<String, Value>) -> Vec<Operation> {
    item.iter()
        .filter(|(key, _)| HTTP_METHODS.contains(&key.as_str()))
        .map(|(method, operation)| Operation {
            path: path.to_string(),
            method: method.clone(),
            operation_id: string_field(operation, "operationId"),
            summary: string_field(operation, "summary"),
            tags: operation
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect()
}

fn tag_index(operations: &[Operation]) -> TagIndex<OperationRef> {
    TagIndex::build(operations.iter().map(|op| {
        (
            &op.tags,
            OperationRef {
                path: op.path.clone(),
                method: op
                    .operation_id
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                summary: op.summary.clone(),
            },
        )
    }))
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}
