use cubeflow_core::{AccessToken, BuildMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Login response. Different deployments name the token field differently.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: Option<String>,
    pub access_token: Option<String>,
    pub jwt: Option<String>,
}

impl LoginResponse {
    /// Extract the credential, checking fields in fixed preference order.
    pub fn into_token(self) -> Option<AccessToken> {
        self.token
            .or(self.access_token)
            .or(self.jwt)
            .filter(|t| !t.is_empty())
            .map(AccessToken::new)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBuildRequest {
    pub datamodel_id: String,
    pub build_type: String,
    pub row_limit: u32,
    pub schema_origin: String,
}

impl StartBuildRequest {
    pub fn new(datamodel_id: impl Into<String>, mode: BuildMode) -> Self {
        Self {
            datamodel_id: datamodel_id.into(),
            build_type: mode.as_str().to_string(),
            row_limit: 0,
            schema_origin: "latest".to_string(),
        }
    }
}

/// Extract the build identifier from a trigger response body.
///
/// Tries the known identifier fields in order, then falls back to the whole
/// body rendered as a string. `None` only when even the fallback is empty.
pub fn extract_build_id(body: &Value) -> Option<String> {
    for key in ["id", "oid", "_id"] {
        match body.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    let rendered = body.to_string();
    if rendered.is_empty() || rendered == "null" {
        None
    } else {
        Some(rendered)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildStatusResponse {
    pub status: Option<String>,
    pub state: Option<String>,
}

impl BuildStatusResponse {
    /// Raw status string, `status` field preferred over `state`.
    pub fn raw_status(&self) -> Option<&str> {
        self.status.as_deref().or(self.state.as_deref())
    }
}

/// Tabular content exported from a dashboard widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl WidgetTable {
    /// Locate tabular content in a widget payload.
    ///
    /// Two shapes are understood: a list of row objects, and an object with
    /// `headers`/`columns` plus `rows`/`data`, where header entries may be
    /// plain strings or objects carrying `title`/`name`/`field`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        if let Value::Array(items) = payload {
            return Self::from_row_objects(items);
        }

        if let Value::Object(map) = payload {
            let headers = map.get("headers").or_else(|| map.get("columns"))?;
            let rows = map.get("rows").or_else(|| map.get("data"))?;
            let (Value::Array(headers), Value::Array(rows)) = (headers, rows) else {
                return None;
            };
            if rows.is_empty() {
                return None;
            }

            let columns: Vec<String> = headers.iter().map(header_title).collect();
            let rows = rows
                .iter()
                .map(|row| match row {
                    Value::Array(cells) => cells.iter().map(render_cell).collect(),
                    other => vec![render_cell(other)],
                })
                .collect();
            return Some(Self { columns, rows });
        }

        None
    }

    fn from_row_objects(items: &[Value]) -> Option<Self> {
        let first = items.first()?.as_object()?;
        let columns: Vec<String> = first.keys().cloned().collect();
        let rows = items
            .iter()
            .filter_map(|item| item.as_object())
            .map(|obj| {
                columns
                    .iter()
                    .map(|col| obj.get(col).map(render_cell).unwrap_or_default())
                    .collect()
            })
            .collect();
        Some(Self { columns, rows })
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_csv_row(&mut out, &self.columns);
        for row in &self.rows {
            push_csv_row(&mut out, row);
        }
        out
    }

    /// Plain-text preview bounded by row and character count.
    pub fn preview(&self, max_rows: usize, max_chars: usize) -> String {
        let mut lines = vec![self.columns.join(" | ")];
        for row in self.rows.iter().take(max_rows) {
            lines.push(row.join(" | "));
        }
        let mut text = lines.join("\n");
        if text.len() > max_chars {
            let mut end = max_chars;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
            text.push_str("\n...");
        }
        text
    }
}

fn header_title(header: &Value) -> String {
    match header {
        Value::String(s) => s.clone(),
        Value::Object(map) => ["title", "name", "field"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string(),
        other => render_cell(other),
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn push_csv_row(out: &mut String, cells: &[String]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if cell.contains(',') || cell.contains('"') || cell.contains('\n') {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}
