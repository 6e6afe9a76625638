//! Shared HTTP entry point with the response interceptors.
//!
//! # Design
//! `HttpClient` joins request paths onto its base URL, executes them through
//! a `Transport` and runs every outcome through the same steps:
//! - a 2xx body is parsed and JSOG-normalized before it is returned;
//! - a write (anything but `GET`) answered with 200, 201 or 204 whose body
//!   normalized pushes a success notification;
//! - a non-2xx answer, a missing answer or an undecodable body pushes an
//!   error notification with the server's `userMessage` (if any) and the
//!   failure is returned unchanged.

use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::jsog;
use crate::notification::{Notification, NotificationSink};
use crate::transport::{Transport, UreqTransport};

pub const SUCCESS_MESSAGE: &str = "Operação realizada com sucesso!";
pub const ERROR_PREFIX: &str = "Erro: Ação não concluída! ";

const NOTIFYING_STATUSES: [u16; 3] = [200, 201, 204];

pub struct HttpClient<T = UreqTransport> {
    base_url: String,
    transport: T,
    notifications: NotificationSink,
}

impl HttpClient<UreqTransport> {
    pub fn from_config(config: &ClientConfig, notifications: NotificationSink) -> Self {
        Self::new(
            &config.api_url,
            UreqTransport::new(config.timeout()),
            notifications,
        )
    }
}

impl<T: Transport> HttpClient<T> {
    pub fn new(base_url: &str, transport: T, notifications: NotificationSink) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            notifications,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn notifications(&self) -> &NotificationSink {
        &self.notifications
    }

    pub fn get(&self, path: &str, query: Vec<(String, String)>) -> Result<Value, ApiError> {
        let mut request = HttpRequest::new(HttpMethod::Get, path);
        request.query = query;
        self.send(request)
    }

    pub fn post(&self, path: &str, body: String) -> Result<Value, ApiError> {
        self.send(HttpRequest::new(HttpMethod::Post, path).with_json_body(body))
    }

    pub fn put(&self, path: &str, body: String) -> Result<Value, ApiError> {
        self.send(HttpRequest::new(HttpMethod::Put, path).with_json_body(body))
    }

    pub fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send(HttpRequest::new(HttpMethod::Delete, path))
    }

    /// Execute `request` and return its normalized JSON body.
    pub fn send(&self, mut request: HttpRequest) -> Result<Value, ApiError> {
        let method = request.method;
        request.path = format!("{}{}", self.base_url, request.path);
        tracing::debug!(%method, url = %request.path, "sending request");

        let response = match self.transport.execute(&request) {
            Ok(response) => response,
            Err(err) => return Err(self.on_failure(ApiError::Transport(err))),
        };
        tracing::debug!(%method, status = response.status, "received response");

        if !response.is_success() {
            let HttpResponse { status, body, .. } = response;
            return Err(self.on_failure(ApiError::Http { status, body }));
        }

        let body = match jsog::normalize(parse_body(&response.body)) {
            Ok(body) => body,
            Err(err) => return Err(self.on_failure(ApiError::Normalize(err))),
        };
        if !method.is_read() && NOTIFYING_STATUSES.contains(&response.status) {
            self.notifications.notify(Notification::success(SUCCESS_MESSAGE));
        }
        Ok(body)
    }

    fn on_failure(&self, err: ApiError) -> ApiError {
        let user_message = err.user_message().unwrap_or_default();
        tracing::warn!(status = ?err.status(), %user_message, error = %err, "request failed");
        self.notifications
            .notify(Notification::error(format!("{ERROR_PREFIX}{user_message}")));
        err
    }
}

/// Empty bodies become `null`; non-JSON text is kept as a JSON string.
pub(crate) fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::notification::NotificationKind;
    use crate::transport::TransportError;

    /// Transport that replays scripted outcomes and records what it was sent.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        pub(crate) sent: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn reply(self, status: u16, body: &str) -> Self {
            self.outcomes
                .lock()
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        pub(crate) fn fail(self, err: TransportError) -> Self {
            self.outcomes.lock().push_back(Err(err));
            self
        }

        pub(crate) fn last_request(&self) -> HttpRequest {
            self.sent.lock().last().cloned().expect("no request sent")
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.sent.lock().push(request.clone());
            self.outcomes
                .lock()
                .pop_front()
                .expect("no scripted outcome left")
        }
    }

    pub(crate) fn client(transport: ScriptedTransport) -> (HttpClient<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let client = HttpClient::new("http://api.test/", transport.clone(), NotificationSink::new());
        (client, transport)
    }

    #[test]
    fn path_is_joined_onto_base_url() {
        let (client, transport) = client(ScriptedTransport::default().reply(200, "[]"));
        client.get("/colecoes", Vec::new()).unwrap();
        assert_eq!(transport.last_request().path, "http://api.test/colecoes");
    }

    #[test]
    fn writes_with_notifying_status_push_success() {
        for (status, send) in [
            (200, HttpMethod::Put),
            (201, HttpMethod::Post),
            (204, HttpMethod::Delete),
        ] {
            let (client, _) = client(ScriptedTransport::default().reply(status, ""));
            client.send(HttpRequest::new(send, "/colecoes/1")).unwrap();
            let note = client.notifications().latest().unwrap();
            assert_eq!(note.kind, NotificationKind::Success);
            assert_eq!(note.message, SUCCESS_MESSAGE);
            assert!(note.visible);
            assert_eq!(client.notifications().sequence(), 1);
        }
    }

    #[test]
    fn reads_never_push_success() {
        for status in [200, 201, 204] {
            let (client, _) = client(ScriptedTransport::default().reply(status, "{}"));
            client.get("/colecoes", Vec::new()).unwrap();
            assert!(client.notifications().latest().is_none());
        }
    }

    #[test]
    fn other_2xx_writes_do_not_notify() {
        let (client, _) = client(ScriptedTransport::default().reply(202, "{}"));
        client.post("/colecoes", "{}".to_string()).unwrap();
        assert!(client.notifications().latest().is_none());
    }

    #[test]
    fn body_is_normalized() {
        let body = r#"[{"@id":"1","nome":"a"},{"@ref":"1"}]"#;
        let (client, _) = client(ScriptedTransport::default().reply(200, body));
        let value = client.get("/colecoes", Vec::new()).unwrap();
        assert_eq!(value, json!([{"nome": "a"}, {"nome": "a"}]));
    }

    #[test]
    fn empty_body_is_null_and_text_is_kept() {
        let (client, _) = client(ScriptedTransport::default().reply(204, "").reply(200, "pong"));
        assert_eq!(client.delete("/colecoes/1").unwrap(), Value::Null);
        assert_eq!(client.get("/ping", Vec::new()).unwrap(), json!("pong"));
    }

    #[test]
    fn bad_references_surface_as_normalize_error() {
        let (client, _) = client(ScriptedTransport::default().reply(200, r#"{"@ref":"7"}"#));
        let err = client.get("/colecoes", Vec::new()).unwrap_err();
        assert!(matches!(err, ApiError::Normalize(_)));
    }

    #[test]
    fn undecodable_write_body_notifies_error_not_success() {
        let (client, _) = client(ScriptedTransport::default().reply(201, r#"{"@ref":"7"}"#));
        let err = client.post("/colecoes", "{}".to_string()).unwrap_err();
        assert!(matches!(err, ApiError::Normalize(_)));

        let note = client.notifications().latest().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, ERROR_PREFIX);
        assert_eq!(client.notifications().sequence(), 1);
    }

    #[test]
    fn http_failure_pushes_error_with_user_message() {
        let body = r#"{"status":409,"userMessage":"Já existe uma coleção com esse nome."}"#;
        let (client, _) = client(ScriptedTransport::default().reply(409, body));
        let err = client.post("/colecoes", "{}".to_string()).unwrap_err();

        match err {
            ApiError::Http { status, body: ref got } => {
                assert_eq!(status, 409);
                assert_eq!(got, body);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let note = client.notifications().latest().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(
            note.message,
            "Erro: Ação não concluída! Já existe uma coleção com esse nome."
        );
    }

    #[test]
    fn failed_reads_also_notify() {
        let (client, _) = client(ScriptedTransport::default().reply(500, r#"{"userMessage":"falha"}"#));
        client.get("/colecoes", Vec::new()).unwrap_err();
        assert_eq!(
            client.notifications().latest().unwrap().message,
            "Erro: Ação não concluída! falha"
        );
    }

    #[test]
    fn transport_failure_notifies_without_user_message() {
        let (client, _) = client(ScriptedTransport::default().fail(TransportError::Timeout));
        let err = client.get("/colecoes", Vec::new()).unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Timeout)));
        let note = client.notifications().latest().unwrap();
        assert_eq!(note.kind, NotificationKind::Error);
        assert_eq!(note.message, ERROR_PREFIX);
    }
}
