//! Todoist task sink -- review reminders via the Todoist REST v2 API.

use std::collections::HashSet;

use reqwest::{Client, Response};
use serde_json::json;

use super::{keyring_store, NewReminder, TaskSink};
use crate::error::SinkError;

const SERVICE: &str = "todoist";
const TOKEN_KEY: &str = "todoist_token";

pub struct TodoistSink {
    api_token: String,
    base_url: String,
    project_id: Option<String>,
    client: Client,
    runtime: tokio::runtime::Runtime,
}

impl TodoistSink {
    /// Load the stored token from the OS keyring (empty if absent).
    ///
    /// A keyring that cannot be read is an error, not a missing token.
    pub fn new(base_url: &str) -> Result<Self, SinkError> {
        Self::from_entry(base_url, &keyring_store::entry(TOKEN_KEY)?)
    }

    fn from_entry(base_url: &str, entry: &keyring::Entry) -> Result<Self, SinkError> {
        let api_token = keyring_store::read(entry)?.unwrap_or_default();
        Self::with_token(base_url, &api_token)
    }

    /// Build a sink with an explicit token, bypassing the keyring.
    pub fn with_token(base_url: &str, api_token: &str) -> Result<Self, SinkError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SinkError::Transport {
                service: SERVICE.into(),
                message: format!("failed to start runtime: {e}"),
            })?;

        Ok(Self {
            api_token: api_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: None,
            client: Client::new(),
            runtime,
        })
    }

    /// File new reminders under this project instead of the inbox.
    pub fn with_project(mut self, project_id: Option<String>) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        !self.api_token.is_empty()
    }

    /// Persist a user-provided token to the OS keyring and update in-memory state.
    pub fn set_credentials(&mut self, token: &str) -> Result<(), SinkError> {
        keyring_store::set(TOKEN_KEY, token)?;
        self.api_token = token.to_string();
        Ok(())
    }

    /// Remove the stored token.
    pub fn disconnect(&mut self) -> Result<(), SinkError> {
        keyring_store::delete(TOKEN_KEY)?;
        self.api_token.clear();
        Ok(())
    }

    /// Check the token against the projects endpoint.
    pub fn verify(&self) -> Result<(), SinkError> {
        let token = self.token()?;
        self.runtime.block_on(async {
            let resp = self
                .client
                .get(self.url("projects"))
                .bearer_auth(token)
                .send()
                .await
                .map_err(transport)?;
            check(resp).await.map(|_| ())
        })
    }

    fn token(&self) -> Result<&str, SinkError> {
        if self.api_token.is_empty() {
            Err(SinkError::NotAuthenticated {
                service: SERVICE.into(),
            })
        } else {
            Ok(&self.api_token)
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl TaskSink for TodoistSink {
    fn name(&self) -> &str {
        SERVICE
    }

    fn create(&self, reminder: &NewReminder) -> Result<String, SinkError> {
        let token = self.token()?;

        let mut body = json!({
            "content": reminder.title,
            "description": reminder.description,
            "labels": reminder.tags,
            "priority": reminder.priority.todoist_value(),
            "due_string": "today",
        });
        if let Some(project_id) = &self.project_id {
            body["project_id"] = json!(project_id);
        }

        self.runtime.block_on(async {
            let resp = self
                .client
                .post(self.url("tasks"))
                .bearer_auth(token)
                .json(&body)
                .send()
                .await
                .map_err(transport)?;
            let value: serde_json::Value = check(resp).await?.json().await.map_err(decode)?;
            task_id(&value).ok_or_else(|| SinkError::Decode {
                service: SERVICE.into(),
                message: "created task has no id".into(),
            })
        })
    }

    /// Follows `next_cursor` until the listing is exhausted. A partial
    /// listing would read as completed reviews, so any page failure fails
    /// the whole call.
    fn list_active(&self) -> Result<HashSet<String>, SinkError> {
        let token = self.token()?;

        self.runtime.block_on(async {
            let mut ids = HashSet::new();
            let mut cursor: Option<String> = None;
            loop {
                let mut request = self.client.get(self.url("tasks")).bearer_auth(token);
                if let Some(cursor) = &cursor {
                    request = request.query(&[("cursor", cursor)]);
                }
                let resp = request.send().await.map_err(transport)?;
                let value: serde_json::Value = check(resp).await?.json().await.map_err(decode)?;
                let (tasks, next) = task_page(&value)?;
                ids.extend(tasks.iter().filter_map(task_id));

                match next {
                    Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                        return Err(SinkError::Decode {
                            service: SERVICE.into(),
                            message: format!("task listing repeated cursor {next}"),
                        });
                    }
                    Some(next) => cursor = Some(next),
                    None => return Ok(ids),
                }
            }
        })
    }

    fn delete(&self, task_id: &str) -> Result<(), SinkError> {
        let token = self.token()?;

        self.runtime.block_on(async {
            let resp = self
                .client
                .delete(self.url(&format!("tasks/{task_id}")))
                .bearer_auth(token)
                .send()
                .await
                .map_err(transport)?;
            check(resp).await.map(|_| ())
        })
    }
}

/// Todoist ids are strings in REST v2 but older payloads used integers.
fn task_id(value: &serde_json::Value) -> Option<String> {
    match &value["id"] {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Tasks of one listing page and the cursor of the next. REST v2 answers
/// with a bare array; the paginated shape is `{"results": [...],
/// "next_cursor": ...}`.
fn task_page(value: &serde_json::Value) -> Result<(&[serde_json::Value], Option<String>), SinkError> {
    if let Some(tasks) = value.as_array() {
        return Ok((tasks, None));
    }
    let tasks = value["results"].as_array().ok_or_else(|| SinkError::Decode {
        service: SERVICE.into(),
        message: "task listing is neither an array nor a results page".into(),
    })?;
    let next = value["next_cursor"]
        .as_str()
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    Ok((tasks, next))
}

async fn check(resp: Response) -> Result<Response, SinkError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(SinkError::Api {
        service: SERVICE.into(),
        status,
        body,
    })
}

fn transport(err: reqwest::Error) -> SinkError {
    SinkError::Transport {
        service: SERVICE.into(),
        message: err.to_string(),
    }
}

fn decode(err: reqwest::Error) -> SinkError {
    SinkError::Decode {
        service: SERVICE.into(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_accepts_string_and_number() {
        assert_eq!(task_id(&json!({"id": "7"})), Some("7".to_string()));
        assert_eq!(task_id(&json!({"id": 42})), Some("42".to_string()));
        assert_eq!(task_id(&json!({"content": "x"})), None);
    }

    #[test]
    fn calls_without_token_are_rejected_locally() {
        let sink = TodoistSink::with_token("http://127.0.0.1:9", "").unwrap();
        assert!(!sink.is_authenticated());
        assert!(matches!(
            sink.list_active(),
            Err(SinkError::NotAuthenticated { .. })
        ));
    }

    #[test]
    fn task_page_reads_both_listing_shapes() {
        let bare = json!([{"id": "1"}]);
        let (tasks, next) = task_page(&bare).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(next, None);

        let paged = json!({"results": [{"id": "1"}, {"id": "2"}], "next_cursor": "abc"});
        let (tasks, next) = task_page(&paged).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(next.as_deref(), Some("abc"));

        let last = json!({"results": [], "next_cursor": null});
        assert_eq!(task_page(&last).unwrap().1, None);

        assert!(task_page(&json!({"tasks": []})).is_err());
    }

    fn mock_entry() -> keyring::Entry {
        use keyring::credential::CredentialBuilderApi;
        let credential = keyring::mock::default_credential_builder()
            .build(None, "lifeos", TOKEN_KEY)
            .unwrap();
        keyring::Entry::new_with_credential(credential)
    }

    #[test]
    fn keyring_failure_is_reported_not_treated_as_logged_out() {
        let entry = mock_entry();
        let mock: &keyring::mock::MockCredential = entry.get_credential().downcast_ref().unwrap();
        mock.set_error(keyring::Error::NoStorageAccess("locked".into()));

        assert!(matches!(
            TodoistSink::from_entry("http://127.0.0.1:9", &entry),
            Err(SinkError::Keyring(_))
        ));
    }

    #[test]
    fn absent_keyring_entry_means_not_authenticated() {
        let sink = TodoistSink::from_entry("http://127.0.0.1:9", &mock_entry()).unwrap();
        assert!(!sink.is_authenticated());
    }

    #[test]
    fn stored_token_is_loaded() {
        let entry = mock_entry();
        entry.set_password("tok").unwrap();
        let sink = TodoistSink::from_entry("http://127.0.0.1:9", &entry).unwrap();
        assert!(sink.is_authenticated());
    }

    #[test]
    fn url_strips_trailing_slash() {
        let sink = TodoistSink::with_token("https://example.test/rest/v2/", "t").unwrap();
        assert_eq!(sink.url("tasks"), "https://example.test/rest/v2/tasks");
    }
}
