//! In-memory `JiraApi` used by the dispatcher, server and SSE tests.

use std::sync::Mutex;

use async_trait::async_trait;
use jira_mcp_core::{
    CreateIssueInput, CreatedIssue, Error, JiraApi, JiraIssue, Result, SearchPage, SearchQuery,
    TransitionOutcome, UpdateIssueInput, UpdateOutcome,
};
use serde_json::json;

pub const MISSING_KEY: &str = "MISSING-1";
pub const FAILING_JQL: &str = "project = BROKEN";

/// Echoes its inputs back so tests can tell requests apart.
#[derive(Default)]
pub struct MockJira {
    pub searches: Mutex<Vec<SearchQuery>>,
    pub created: Mutex<Vec<CreateIssueInput>>,
    pub updated: Mutex<Vec<(String, UpdateIssueInput)>>,
}

impl MockJira {
    pub fn new() -> Self {
        Self::default()
    }
}

fn echo_issue(key: &str, summary: &str) -> JiraIssue {
    let fields = json!({
        "summary": summary,
        "status": {"name": "Open"},
        "assignee": {"displayName": "Jane Doe", "accountId": "abc"},
        "priority": {"name": "High"},
        "issuetype": {"name": "Task"},
        "created": "2024-01-01T10:00:00.000+0000",
        "updated": "2024-01-02T10:00:00.000+0000",
        "comment": {
            "comments": [{
                "id": "100",
                "author": {"displayName": "Reviewer"},
                "created": "2024-01-03T09:00:00.000+0000",
                "body": {
                    "type": "doc",
                    "version": 1,
                    "content": [{
                        "type": "bulletList",
                        "content": [
                            {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "x"}]}]},
                            {"type": "listItem", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "y"}]}]}
                        ]
                    }]
                }
            }]
        }
    });

    JiraIssue {
        id: "10001".to_string(),
        key: key.to_string(),
        fields: fields.as_object().cloned().unwrap_or_default(),
    }
}

#[async_trait]
impl JiraApi for MockJira {
    async fn search(&self, query: SearchQuery) -> Result<SearchPage> {
        self.searches.lock().unwrap().push(query.clone());

        if query.jql == FAILING_JQL {
            return Err(Error::from_status(
                400,
                r#"{"errorMessages":["The value 'BROKEN' does not exist for the field 'project'."],"errors":{}}"#
                    .to_string(),
            ));
        }

        Ok(SearchPage {
            total: 1,
            issues: vec![echo_issue("ECHO-1", &query.jql)],
        })
    }

    async fn get_issue(&self, key: &str, _fields: Option<&[String]>) -> Result<JiraIssue> {
        if key == MISSING_KEY {
            return Err(Error::from_status(
                404,
                r#"{"errorMessages":["Issue does not exist or you do not have permission to see it."],"errors":{}}"#
                    .to_string(),
            ));
        }
        Ok(echo_issue(key, "Fetched issue"))
    }

    async fn create_issue(&self, input: CreateIssueInput) -> Result<CreatedIssue> {
        let key = format!("{}-1", input.project_key);
        self.created.lock().unwrap().push(input);
        Ok(CreatedIssue {
            key,
            id: "10002".to_string(),
        })
    }

    async fn update_issue(&self, key: &str, input: UpdateIssueInput) -> Result<UpdateOutcome> {
        let transition = input.status.as_ref().map(|status| {
            if status.eq_ignore_ascii_case("done") {
                TransitionOutcome::Applied {
                    id: "31".to_string(),
                    name: "Done".to_string(),
                }
            } else {
                TransitionOutcome::NotFound {
                    requested: status.clone(),
                    available: vec!["In Progress".to_string(), "Done".to_string()],
                }
            }
        });
        self.updated
            .lock()
            .unwrap()
            .push((key.to_string(), input));

        Ok(UpdateOutcome {
            key: key.to_string(),
            transition,
        })
    }
}
