//! `reqwest` implementation of [`JobBackend`].

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use docforge_core::{GenerationRequest, JobId, JobSnapshot, RecordKey, SubmittedJob};

use crate::backend::{Download, JobBackend};
use crate::config::ClientConfig;
use crate::error::{ClientError, server_message};

/// Submission body expected by the backend.
#[derive(Debug, Serialize)]
struct SubmitBody<'a> {
    source_record_id: &'a str,
    template_code: &'a str,
    template_name: &'a str,
}

/// HTTP client for the document endpoints of the backend API.
#[derive(Debug, Clone)]
pub struct HttpJobBackend {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpJobBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let raw = config.base_url.trim_end_matches('/');
        let base_url = Url::parse(raw)
            .map_err(|e| ClientError::Config(format!("invalid base URL {raw:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!("base URL {raw:?} cannot carry a path")));
        }

        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `{base}/{kind}/{record}/documents/{tail...}`, each segment percent-encoded.
    fn documents_url(&self, record: &RecordKey, tail: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(record.kind.path_segment())
                .push(record.source_record_id.as_str())
                .push("documents")
                .extend(tail);
        }
        url
    }

    fn job_url(&self, record: &RecordKey, job_id: &JobId, tail: &[&str]) -> Url {
        let mut segments = vec!["jobs", job_id.as_str()];
        segments.extend_from_slice(tail);
        self.documents_url(record, &segments)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ClientError> {
        let resp = self.authorized(req).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::api(status.as_u16(), server_message(status, &body)))
    }

    async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl JobBackend for HttpJobBackend {
    async fn submit(&self, request: &GenerationRequest) -> Result<SubmittedJob, ClientError> {
        let record = request.record_key();
        let url = self.documents_url(&record, &["generate"]);
        let body = SubmitBody {
            source_record_id: request.source_record_id.as_str(),
            template_code: request.template.code.as_str(),
            template_name: &request.template.name,
        };

        debug!(%url, template = %request.template.code, "submitting generation job");
        let resp = self.send(self.http.post(url).json(&body)).await?;
        Self::json(resp).await
    }

    async fn job_status(&self, record: &RecordKey, job_id: &JobId) -> Result<JobSnapshot, ClientError> {
        let url = self.job_url(record, job_id, &[]);
        let resp = self.send(self.http.get(url)).await?;
        Self::json(resp).await
    }

    async fn download(&self, record: &RecordKey, job_id: &JobId) -> Result<Download, ClientError> {
        let url = self.job_url(record, job_id, &["download"]);
        let resp = self.send(self.http.get(url.clone())).await?;

        let headers = resp.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename);

        let bytes = resp.bytes().await?.to_vec();
        debug!(%url, bytes = bytes.len(), "downloaded artifact");

        Ok(Download {
            content_type,
            filename,
            bytes,
        })
    }
}

/// Filename from a `Content-Disposition` header value.
///
/// The RFC 6266 `filename*` form (`charset'lang'percent-encoded`) wins over
/// plain `filename`. Quoted values may contain `;`.
fn disposition_filename(value: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for param in split_params(value).into_iter().skip(1) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.eq_ignore_ascii_case("filename*") {
            extended = extended.or_else(|| decode_ext_value(raw).filter(|v| !v.trim().is_empty()));
        } else if key.eq_ignore_ascii_case("filename") {
            plain = plain.or_else(|| Some(unquote(raw)).filter(|v| !v.trim().is_empty()));
        }
    }

    extended.or(plain).map(|name| name.trim().to_string())
}

/// Split on `;` outside quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            ';' if !quoted => {
                parts.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) else {
        return raw.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Decode an RFC 5987 `ext-value`. Only UTF-8 and ISO-8859-1 are defined.
fn decode_ext_value(raw: &str) -> Option<String> {
    let mut parts = raw.trim().splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let bytes: Vec<u8> = percent_decode_str(parts.next()?).collect();

    if charset.eq_ignore_ascii_case("utf-8") {
        String::from_utf8(bytes).ok()
    } else if charset.eq_ignore_ascii_case("iso-8859-1") {
        Some(bytes.into_iter().map(char::from).collect())
    } else {
        None
    }
}
