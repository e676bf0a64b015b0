//! Jira API client implementation.
//!
//! All calls go to `<instance>/rest/api/3` with basic auth (email:token).

use async_trait::async_trait;
use jira_mcp_core::document::single_paragraph_doc;
use jira_mcp_core::{
    CreateIssueInput, CreatedIssue, Error, JiraApi, JiraIssue, JiraSettings, Result, SearchPage,
    SearchQuery, TransitionOutcome, UpdateIssueInput, UpdateOutcome,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use tracing::{debug, info, warn};

use crate::types::{
    AccountId, CreateIssueFields, CreateIssuePayload, CreateIssueResponse, IssueType,
    JiraSearchResponse, JiraTransitionsResponse, PriorityName, ProjectKey, TransitionId,
    TransitionPayload, UpdateIssueFields, UpdateIssuePayload,
};

/// Jira API client.
pub struct JiraClient {
    base_url: String,
    email: String,
    token: String,
    client: reqwest::Client,
}

impl JiraClient {
    /// Create a new Jira client for the given instance URL.
    pub fn new(
        url: impl Into<String>,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .user_agent(concat!("jira-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: build_api_base(&url),
            email: email.into(),
            token: token.into(),
            client,
        })
    }

    /// Create a client from resolved settings.
    pub fn from_settings(settings: &JiraSettings) -> Result<Self> {
        Self::new(&settings.base_url, &settings.email, &settings.api_token)
    }

    /// REST API base URL this client talks to.
    pub fn api_base(&self) -> &str {
        &self.base_url
    }

    /// URL of a single issue, with the key escaped as one path segment.
    fn issue_url(&self, key: &str) -> Result<String> {
        Ok(format!("{}/issue/{}", self.base_url, encode_issue_key(key)?))
    }

    /// Build request with auth header.
    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Accept", "application/json")
            .basic_auth(&self.email, Some(&self.token))
    }

    /// Make an authenticated GET request.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(url = url, params = ?query, "Jira GET request");

        let response = self
            .request(reqwest::Method::GET, url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Make an authenticated POST request.
    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        debug!(url = url, "Jira POST request");

        let response = self
            .request(reqwest::Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Make an authenticated request whose success response has no body
    /// (Jira answers edits and transitions with 204 No Content).
    async fn send_no_content<B: serde::Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &B,
    ) -> Result<()> {
        debug!(url = url, method = %method, "Jira request");

        let response = self
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.error_from(response).await);
        }

        Ok(())
    }

    /// Handle response and map errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            return Err(self.error_from(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| Error::InvalidData(format!("Failed to parse response: {}", e)))
    }

    /// Turn a non-success response into an upstream error, keeping the body.
    async fn error_from(&self, response: reqwest::Response) -> Error {
        let status_code = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        warn!(
            status = status_code,
            body = %message,
            "Jira API error response"
        );
        Error::from_status(status_code, message)
    }

    /// Transition an issue by transition name.
    ///
    /// The requested status is compared case-insensitively against the
    /// names of the transitions currently available for the issue. When
    /// nothing matches, no request is made and `NotFound` is returned.
    async fn transition_issue(&self, key: &str, target_status: &str) -> Result<TransitionOutcome> {
        let url = format!("{}/transitions", self.issue_url(key)?);
        let transitions: JiraTransitionsResponse = self.get(&url, &[]).await?;

        let wanted = target_status.to_lowercase();
        let Some(transition) = transitions
            .transitions
            .iter()
            .find(|t| t.name.to_lowercase() == wanted)
        else {
            let available: Vec<String> = transitions
                .transitions
                .iter()
                .map(|t| t.name.clone())
                .collect();
            info!(
                issue = key,
                target = target_status,
                available = ?available,
                "No matching transition, status left unchanged"
            );
            return Ok(TransitionOutcome::NotFound {
                requested: target_status.to_string(),
                available,
            });
        };

        let payload = TransitionPayload {
            transition: TransitionId {
                id: transition.id.clone(),
            },
        };

        debug!(
            issue = key,
            transition_id = %transition.id,
            target = target_status,
            "Transitioning issue"
        );

        self.send_no_content(reqwest::Method::POST, &url, &payload)
            .await?;

        Ok(TransitionOutcome::Applied {
            id: transition.id.clone(),
            name: transition.name.clone(),
        })
    }
}

// =============================================================================
// URL building
// =============================================================================

/// Characters escaped in a path segment, `/` and `%` included.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Build the API base URL from the instance URL.
fn build_api_base(url: &str) -> String {
    format!("{}/rest/api/3", url.trim_end_matches('/'))
}

/// Escape an issue key for use as a single path segment.
///
/// Dot segments would be collapsed by URL normalization, so they are
/// rejected outright.
fn encode_issue_key(key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() || key == "." || key == ".." {
        return Err(Error::InvalidArguments(format!(
            "Invalid issue key: {:?}",
            key
        )));
    }
    Ok(utf8_percent_encode(key, PATH_SEGMENT).to_string())
}

// =============================================================================
// Mapping functions: tool inputs -> Jira payloads
// =============================================================================

fn build_create_payload(input: CreateIssueInput) -> CreateIssuePayload {
    CreateIssuePayload {
        fields: CreateIssueFields {
            project: ProjectKey {
                key: input.project_key,
            },
            summary: input.summary,
            issuetype: IssueType {
                name: input.issue_type,
            },
            description: input.description.as_deref().map(single_paragraph_doc),
            priority: input.priority.map(|name| PriorityName { name }),
            assignee: input.assignee.map(|account_id| AccountId { account_id }),
            labels: input.labels,
        },
    }
}

fn build_update_fields(input: &UpdateIssueInput) -> UpdateIssueFields {
    UpdateIssueFields {
        summary: input.summary.clone(),
        description: input.description.as_deref().map(single_paragraph_doc),
        priority: input
            .priority
            .clone()
            .map(|name| PriorityName { name }),
        assignee: input
            .assignee
            .clone()
            .map(|account_id| AccountId { account_id }),
        labels: input.labels.clone(),
    }
}

// =============================================================================
// Trait implementation
// =============================================================================

#[async_trait]
impl JiraApi for JiraClient {
    async fn search(&self, query: SearchQuery) -> Result<SearchPage> {
        // Offset-paged search; the token-paged /search/jql has no startAt or total.
        let url = format!("{}/search", self.base_url);

        let mut params: Vec<(&str, String)> = vec![
            ("jql", query.jql),
            ("startAt", query.start_at.to_string()),
            ("maxResults", query.max_results.to_string()),
        ];
        if !query.fields.is_empty() {
            params.push(("fields", query.fields.join(",")));
        }

        let response: JiraSearchResponse = self.get(&url, &params).await?;
        let total = response
            .total
            .unwrap_or(response.issues.len() as u64);

        debug!(
            total = total,
            returned = response.issues.len(),
            "Jira search completed"
        );

        Ok(SearchPage {
            total,
            issues: response.issues,
        })
    }

    async fn get_issue(&self, key: &str, fields: Option<&[String]>) -> Result<JiraIssue> {
        let url = self.issue_url(key)?;

        let params: Vec<(&str, String)> = match fields {
            Some(fields) if !fields.is_empty() => vec![("fields", fields.join(","))],
            _ => Vec::new(),
        };

        self.get(&url, &params).await
    }

    async fn create_issue(&self, input: CreateIssueInput) -> Result<CreatedIssue> {
        let url = format!("{}/issue", self.base_url);
        let payload = build_create_payload(input);

        let created: CreateIssueResponse = self.post(&url, &payload).await?;
        info!(key = %created.key, "Issue created");

        Ok(CreatedIssue {
            key: created.key,
            id: created.id,
        })
    }

    async fn update_issue(&self, key: &str, input: UpdateIssueInput) -> Result<UpdateOutcome> {
        // Only call PUT if there are field updates
        if input.has_field_updates() {
            let url = self.issue_url(key)?;
            let payload = UpdateIssuePayload {
                fields: build_update_fields(&input),
            };
            self.send_no_content(reqwest::Method::PUT, &url, &payload)
                .await?;
            debug!(issue = key, "Issue fields updated");
        }

        // Handle status change via transitions
        let transition = match &input.status {
            Some(status) => Some(self.transition_issue(key, status).await?),
            None => None,
        };

        Ok(UpdateOutcome {
            key: key.to_string(),
            transition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        assert_eq!(
            build_api_base("https://company.atlassian.net"),
            "https://company.atlassian.net/rest/api/3"
        );
    }

    #[test]
    fn test_issue_key_is_one_path_segment() {
        assert_eq!(encode_issue_key("PROJ-1").unwrap(), "PROJ-1");
        assert_eq!(
            encode_issue_key("../../myself").unwrap(),
            "..%2F..%2Fmyself"
        );
        assert_eq!(encode_issue_key("A B?x#y").unwrap(), "A%20B%3Fx%23y");
    }

    #[test]
    fn test_dot_segment_keys_rejected() {
        for key in ["", ".", "..", " .. "] {
            assert!(matches!(
                encode_issue_key(key),
                Err(Error::InvalidArguments(_))
            ));
        }
    }

    #[test]
    fn test_api_url_strips_trailing_slash() {
        assert_eq!(
            build_api_base("https://company.atlassian.net/"),
            "https://company.atlassian.net/rest/api/3"
        );
    }

    #[test]
    fn test_client_from_settings() {
        let settings = JiraSettings {
            base_url: "https://company.atlassian.net".to_string(),
            email: "me@example.com".to_string(),
            api_token: "token".to_string(),
        };
        let client = JiraClient::from_settings(&settings).unwrap();
        assert_eq!(client.api_base(), "https://company.atlassian.net/rest/api/3");
    }

    #[test]
    fn test_create_payload_omits_absent_optionals() {
        let payload = build_create_payload(CreateIssueInput {
            project_key: "PROJ".to_string(),
            summary: "New task".to_string(),
            issue_type: "Task".to_string(),
            ..Default::default()
        });

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "fields": {
                    "project": {"key": "PROJ"},
                    "summary": "New task",
                    "issuetype": {"name": "Task"}
                }
            })
        );
    }

    #[test]
    fn test_create_payload_with_optionals() {
        let payload = build_create_payload(CreateIssueInput {
            project_key: "PROJ".to_string(),
            summary: "Bug".to_string(),
            issue_type: "Bug".to_string(),
            description: Some("Steps to reproduce".to_string()),
            priority: Some("High".to_string()),
            assignee: Some("5b10a2844c20165700ede21g".to_string()),
            labels: Some(vec!["backend".to_string()]),
        });

        let json = serde_json::to_value(&payload).unwrap();
        let fields = &json["fields"];
        assert_eq!(fields["description"]["type"], "doc");
        assert_eq!(
            fields["description"]["content"][0]["content"][0]["text"],
            "Steps to reproduce"
        );
        assert_eq!(fields["priority"]["name"], "High");
        assert_eq!(fields["assignee"]["accountId"], "5b10a2844c20165700ede21g");
        assert_eq!(fields["labels"][0], "backend");
    }

    #[test]
    fn test_update_fields_only_supplied() {
        let fields = build_update_fields(&UpdateIssueInput {
            summary: Some("Renamed".to_string()),
            status: Some("Done".to_string()),
            ..Default::default()
        });

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json, serde_json::json!({"summary": "Renamed"}));
    }

    // =========================================================================
    // Integration tests with httpmock
    // =========================================================================

    mod integration {
        use super::*;
        use httpmock::prelude::*;

        fn create_client(server: &MockServer) -> JiraClient {
            JiraClient::new(server.base_url(), "user@example.com", "api-token").unwrap()
        }

        fn sample_issue_json() -> serde_json::Value {
            serde_json::json!({
                "id": "10001",
                "key": "PROJ-1",
                "self": "https://company.atlassian.net/rest/api/3/issue/10001",
                "fields": {
                    "summary": "Fix login bug",
                    "status": {"name": "Open"},
                    "priority": {"name": "High"},
                    "assignee": {
                        "accountId": "5b10a2844c20165700ede21g",
                        "displayName": "John Doe"
                    },
                    "labels": ["bug"],
                    "created": "2024-01-01T10:00:00.000+0000",
                    "updated": "2024-01-02T15:30:00.000+0000"
                }
            })
        }

        fn transitions_json() -> serde_json::Value {
            serde_json::json!({
                "transitions": [
                    {"id": "21", "name": "In Progress", "to": {"name": "In Progress"}},
                    {"id": "31", "name": "Done", "to": {"name": "Done"}}
                ]
            })
        }

        #[tokio::test]
        async fn test_search() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/rest/api/3/search")
                    .query_param("jql", "project = PROJ")
                    .query_param("startAt", "0")
                    .query_param("maxResults", "50")
                    .query_param_includes("fields", "summary")
                    .header("Accept", "application/json");
                then.status(200).json_body(serde_json::json!({
                    "issues": [sample_issue_json()],
                    "startAt": 0,
                    "maxResults": 50,
                    "total": 1
                }));
            });

            let client = create_client(&server);
            let page = client.search(SearchQuery::new("project = PROJ")).await.unwrap();

            mock.assert();
            assert_eq!(page.total, 1);
            assert_eq!(page.issues.len(), 1);
            assert_eq!(page.issues[0].key, "PROJ-1");
            assert_eq!(page.issues[0].fields["summary"], "Fix login bug");
        }

        #[tokio::test]
        async fn test_search_pagination_and_fields() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/rest/api/3/search")
                    .query_param("startAt", "5")
                    .query_param("maxResults", "10")
                    .query_param("fields", "summary,labels");
                then.status(200).json_body(serde_json::json!({
                    "issues": [],
                    "startAt": 5,
                    "maxResults": 10,
                    "total": 20
                }));
            });

            let client = create_client(&server);
            let page = client
                .search(SearchQuery {
                    jql: "labels = bug".to_string(),
                    max_results: 10,
                    start_at: 5,
                    fields: vec!["summary".to_string(), "labels".to_string()],
                })
                .await
                .unwrap();

            mock.assert();
            assert_eq!(page.total, 20);
            assert!(page.issues.is_empty());
        }

        #[tokio::test]
        async fn test_search_invalid_jql_propagates_body() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/rest/api/3/search");
                then.status(400).json_body(serde_json::json!({
                    "errorMessages": ["Error in the JQL Query: Expecting operator but got 'nonsense'."],
                    "errors": {}
                }));
            });

            let client = create_client(&server);
            let err = client
                .search(SearchQuery::new("project nonsense"))
                .await
                .unwrap_err();

            match &err {
                Error::Api { status, .. } => assert_eq!(*status, 400),
                other => panic!("Expected Api error, got {:?}", other),
            }
            assert!(err.to_string().contains("Error in the JQL Query"));
            assert!(err.details().unwrap()["errorMessages"].is_array());
        }

        #[tokio::test]
        async fn test_get_issue() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/rest/api/3/issue/PROJ-1");
                then.status(200).json_body(sample_issue_json());
            });

            let client = create_client(&server);
            let issue = client.get_issue("PROJ-1", None).await.unwrap();

            assert_eq!(issue.key, "PROJ-1");
            assert_eq!(issue.id, "10001");
            assert_eq!(issue.fields["labels"][0], "bug");
        }

        #[tokio::test]
        async fn test_get_issue_with_fields() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/rest/api/3/issue/PROJ-1")
                    .query_param("fields", "summary,status");
                then.status(200).json_body(sample_issue_json());
            });

            let client = create_client(&server);
            let fields = vec!["summary".to_string(), "status".to_string()];
            client.get_issue("PROJ-1", Some(&fields)).await.unwrap();

            mock.assert();
        }

        #[tokio::test]
        async fn test_get_issue_not_found_is_upstream_error() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/rest/api/3/issue/NOPE-1");
                then.status(404).json_body(serde_json::json!({
                    "errorMessages": ["Issue does not exist or you do not have permission to see it."],
                    "errors": {}
                }));
            });

            let client = create_client(&server);
            let err = client.get_issue("NOPE-1", None).await.unwrap_err();

            assert!(matches!(err, Error::Api { status: 404, .. }));
        }

        #[tokio::test]
        async fn test_get_issue_key_cannot_escape_issue_path() {
            let server = MockServer::start();

            let myself = server.mock(|when, then| {
                when.method(GET).path("/rest/api/3/myself");
                then.status(200).json_body(serde_json::json!({"accountId": "x"}));
            });
            let dot_dot = server.mock(|when, then| {
                when.method(GET).path("/rest/api/3");
                then.status(200).json_body(sample_issue_json());
            });

            let client = create_client(&server);
            let traversal = client.get_issue("../../myself", None).await;
            let parent = client.get_issue("..", None).await;

            assert!(traversal.is_err());
            assert!(matches!(parent, Err(Error::InvalidArguments(_))));
            myself.assert_hits(0);
            dot_dot.assert_hits(0);
        }

        #[tokio::test]
        async fn test_create_issue_minimal_payload() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(POST)
                    .path("/rest/api/3/issue")
                    .json_body(serde_json::json!({
                        "fields": {
                            "project": {"key": "PROJ"},
                            "summary": "New task",
                            "issuetype": {"name": "Task"}
                        }
                    }));
                then.status(201).json_body(serde_json::json!({
                    "id": "10002",
                    "key": "PROJ-2",
                    "self": "https://company.atlassian.net/rest/api/3/issue/10002"
                }));
            });

            let client = create_client(&server);
            let created = client
                .create_issue(CreateIssueInput {
                    project_key: "PROJ".to_string(),
                    summary: "New task".to_string(),
                    issue_type: "Task".to_string(),
                    ..Default::default()
                })
                .await
                .unwrap();

            mock.assert();
            assert_eq!(created.key, "PROJ-2");
            assert_eq!(created.id, "10002");
        }

        #[tokio::test]
        async fn test_create_issue_with_description() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(POST)
                    .path("/rest/api/3/issue")
                    .body_includes("\"type\":\"doc\"")
                    .body_includes("\"text\":\"Task description\"");
                then.status(201).json_body(serde_json::json!({
                    "id": "10003",
                    "key": "PROJ-3"
                }));
            });

            let client = create_client(&server);
            client
                .create_issue(CreateIssueInput {
                    project_key: "PROJ".to_string(),
                    summary: "Documented task".to_string(),
                    issue_type: "Task".to_string(),
                    description: Some("Task description".to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();

            mock.assert();
        }

        #[tokio::test]
        async fn test_update_issue_fields() {
            let server = MockServer::start();

            let mock = server.mock(|when, then| {
                when.method(PUT)
                    .path("/rest/api/3/issue/PROJ-1")
                    .json_body(serde_json::json!({
                        "fields": {"summary": "Updated title"}
                    }));
                then.status(204);
            });

            let client = create_client(&server);
            let outcome = client
                .update_issue(
                    "PROJ-1",
                    UpdateIssueInput {
                        summary: Some("Updated title".to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();

            mock.assert();
            assert_eq!(outcome.key, "PROJ-1");
            assert!(outcome.transition.is_none());
        }

        #[tokio::test]
        async fn test_update_issue_with_status_transition() {
            let server = MockServer::start();

            let put_mock = server.mock(|when, then| {
                when.method(PUT).path("/rest/api/3/issue/PROJ-1");
                then.status(204);
            });

            server.mock(|when, then| {
                when.method(GET).path("/rest/api/3/issue/PROJ-1/transitions");
                then.status(200).json_body(transitions_json());
            });

            let post_mock = server.mock(|when, then| {
                when.method(POST)
                    .path("/rest/api/3/issue/PROJ-1/transitions")
                    .json_body(serde_json::json!({"transition": {"id": "31"}}));
                then.status(204);
            });

            let client = create_client(&server);
            let outcome = client
                .update_issue(
                    "PROJ-1",
                    UpdateIssueInput {
                        status: Some("done".to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();

            // Status-only update skips the field edit
            assert_eq!(put_mock.hits(), 0);
            post_mock.assert();
            assert_eq!(
                outcome.transition,
                Some(TransitionOutcome::Applied {
                    id: "31".to_string(),
                    name: "Done".to_string()
                })
            );
        }

        #[tokio::test]
        async fn test_update_issue_unmatched_status_succeeds_without_transition() {
            let server = MockServer::start();

            let put_mock = server.mock(|when, then| {
                when.method(PUT).path("/rest/api/3/issue/PROJ-1");
                then.status(204);
            });

            server.mock(|when, then| {
                when.method(GET).path("/rest/api/3/issue/PROJ-1/transitions");
                then.status(200).json_body(transitions_json());
            });

            let post_mock = server.mock(|when, then| {
                when.method(POST).path("/rest/api/3/issue/PROJ-1/transitions");
                then.status(204);
            });

            let client = create_client(&server);
            let outcome = client
                .update_issue(
                    "PROJ-1",
                    UpdateIssueInput {
                        labels: Some(vec!["triaged".to_string()]),
                        status: Some("Closed".to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();

            // Field edits are submitted before the transition lookup
            put_mock.assert();
            assert_eq!(post_mock.hits(), 0);
            assert_eq!(
                outcome.transition,
                Some(TransitionOutcome::NotFound {
                    requested: "Closed".to_string(),
                    available: vec!["In Progress".to_string(), "Done".to_string()],
                })
            );
        }

        #[tokio::test]
        async fn test_update_issue_field_error_stops_before_transition() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(PUT).path("/rest/api/3/issue/PROJ-1");
                then.status(400).json_body(serde_json::json!({
                    "errorMessages": [],
                    "errors": {"priority": "Priority name 'Urgentest' is not valid"}
                }));
            });

            let transitions_mock = server.mock(|when, then| {
                when.method(GET).path("/rest/api/3/issue/PROJ-1/transitions");
                then.status(200).json_body(transitions_json());
            });

            let client = create_client(&server);
            let err = client
                .update_issue(
                    "PROJ-1",
                    UpdateIssueInput {
                        priority: Some("Urgentest".to_string()),
                        status: Some("Done".to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_err();

            assert!(err.to_string().contains("priority"));
            assert_eq!(transitions_mock.hits(), 0);
        }

        #[tokio::test]
        async fn test_unauthorized() {
            let server = MockServer::start();

            server.mock(|when, then| {
                when.method(GET).path("/rest/api/3/search");
                then.status(401).body("");
            });

            let client = create_client(&server);
            let err = client.search(SearchQuery::new("order by created")).await.unwrap_err();

            assert!(matches!(err, Error::Api { status: 401, .. }));
            assert!(err.details().is_none());
        }
    }
}
