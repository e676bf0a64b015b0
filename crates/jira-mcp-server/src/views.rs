//! Issue projections returned to MCP clients.

use jira_mcp_core::document::flatten_comment_body;
use jira_mcp_core::{CreatedIssue, JiraIssue, SearchPage, TransitionOutcome, UpdateOutcome};
use serde_json::{json, Map, Value};

/// Compact projection used for search results and issue resources.
///
/// Nested objects are reduced to their display value; fields Jira did not
/// return (or returned as null) are left out.
pub fn summary_view(issue: &JiraIssue) -> Value {
    let mut view = Map::new();
    view.insert("key".into(), Value::String(issue.key.clone()));
    view.insert("id".into(), Value::String(issue.id.clone()));

    let fields = &issue.fields;
    let mut put = |name: &str, value: Option<&Value>| {
        if let Some(v) = value.filter(|v| !v.is_null()) {
            view.insert(name.to_string(), v.clone());
        }
    };

    put("summary", fields.get("summary"));
    put("status", nested(fields, "status", "name"));
    put("assignee", nested(fields, "assignee", "displayName"));
    put("priority", nested(fields, "priority", "name"));
    put("issueType", nested(fields, "issuetype", "name"));
    put("created", fields.get("created"));
    put("updated", fields.get("updated"));

    Value::Object(view)
}

/// `{key, id, fields}` with fields passed through untouched.
pub fn fields_view(issue: &JiraIssue) -> Value {
    json!({
        "key": issue.key,
        "id": issue.id,
        "fields": issue.fields,
    })
}

/// Full issue view: every field plus flattened comments when present.
pub fn issue_view(issue: &JiraIssue) -> Value {
    let mut view = fields_view(issue);

    let comments = issue
        .fields
        .get("comment")
        .and_then(|c| c.get("comments"))
        .and_then(Value::as_array);

    if let Some(comments) = comments {
        view["comments"] = Value::Array(comments.iter().map(comment_view).collect());
    }

    view
}

fn comment_view(comment: &Value) -> Value {
    let author = comment
        .get("author")
        .and_then(|a| a.get("displayName"))
        .cloned()
        .unwrap_or(Value::Null);

    json!({
        "id": comment.get("id").cloned().unwrap_or(Value::Null),
        "author": author,
        "created": comment.get("created").cloned().unwrap_or(Value::Null),
        "body": flatten_comment_body(comment.get("body")),
    })
}

/// Search result envelope.
///
/// With `explicit_fields` the caller chose the fields, so each issue keeps
/// them as returned; otherwise issues use the summary projection.
pub fn search_view(page: &SearchPage, explicit_fields: bool) -> Value {
    let issues: Vec<Value> = page
        .issues
        .iter()
        .map(|issue| {
            if explicit_fields {
                fields_view(issue)
            } else {
                summary_view(issue)
            }
        })
        .collect();

    json!({
        "total": page.total,
        "issues": issues,
    })
}

pub fn created_view(created: &CreatedIssue) -> Value {
    json!({
        "key": created.key,
        "id": created.id,
    })
}

/// Update result; `requested_status` is the status string the caller sent.
pub fn update_view(outcome: &UpdateOutcome, requested_status: Option<&str>) -> Value {
    let mut view = json!({
        "success": true,
        "key": outcome.key,
    });

    match &outcome.transition {
        Some(TransitionOutcome::Applied { name, .. }) => {
            view["transition"] = json!({
                "requested": requested_status.unwrap_or(name.as_str()),
                "applied": true,
                "name": name,
            });
        }
        Some(TransitionOutcome::NotFound {
            requested,
            available,
        }) => {
            view["transition"] = json!({
                "requested": requested,
                "applied": false,
                "available": available,
            });
        }
        None => {}
    }

    view
}

fn nested<'a>(fields: &'a Map<String, Value>, field: &str, key: &str) -> Option<&'a Value> {
    fields.get(field).and_then(|v| v.get(key))
}
