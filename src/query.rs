//! Typed server-side queries against the vCD query service.
//!
//! A [`TypedQuery`] issues one GET on `{api}/query` and yields the result
//! records of a single page in document order. Pagination is owned by the
//! caller if ever needed; none of the entity wrappers page.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Method;

use crate::error::VcloudResult;
use crate::types::media_type;
use crate::vcloud::VcloudClient;
use crate::xml::XmlElement;

/// Result formats understood by the query service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryResultFormat {
    Records,
    References,
    IdRecords,
}

impl QueryResultFormat {
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Records => media_type::QUERY_RECORDS,
            Self::References => media_type::QUERY_REFERENCES,
            Self::IdRecords => media_type::QUERY_ID_RECORDS,
        }
    }

    /// The `format` query parameter value.
    pub fn format_name(&self) -> &'static str {
        match self {
            Self::Records => "records",
            Self::References => "references",
            Self::IdRecords => "idrecords",
        }
    }

    /// Suffix of the result elements this format produces.
    fn record_suffix(&self) -> &'static str {
        match self {
            Self::Records | Self::IdRecords => "Record",
            Self::References => "Reference",
        }
    }
}

/// Characters escaped in query filter values. Everything but unreserved
/// characters and `/` is encoded, so full hrefs survive as filter operands.
const FILTER_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'+')
    .add(b',')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode a filter value for embedding in a query URI.
pub fn query_encode(value: &str) -> String {
    utf8_percent_encode(value, FILTER_ENCODE_SET).to_string()
}

/// One typed query against the vCD query service.
pub struct TypedQuery<'a> {
    client: &'a VcloudClient,
    resource_type: String,
    format: QueryResultFormat,
    equality_filter: Option<(String, String)>,
    qfilter: Option<String>,
}

impl<'a> TypedQuery<'a> {
    pub(crate) fn new(
        client: &'a VcloudClient,
        resource_type: &str,
        format: QueryResultFormat,
        equality_filter: Option<(&str, &str)>,
        qfilter: Option<String>,
    ) -> Self {
        Self {
            client,
            resource_type: resource_type.to_string(),
            format,
            equality_filter: equality_filter.map(|(f, v)| (f.to_string(), v.to_string())),
            qfilter,
        }
    }

    /// Execute the query; returns the page's result records in document
    /// order, empty when the server has none.
    pub async fn execute(&self) -> VcloudResult<Vec<XmlElement>> {
        let uri = self.build_uri();
        let result = self.client.do_request(Method::GET, &uri).await?;
        Ok(record_elements(&result, self.format))
    }

    fn build_uri(&self) -> String {
        let mut uri = format!(
            "{}/query?type={}&format={}",
            self.client.api_base_uri(),
            self.resource_type,
            self.format.format_name()
        );

        // A qfilter arrives pre-encoded; equality filter values are encoded
        // here. Multiple terms are joined with ';' (logical AND).
        let mut terms = Vec::new();
        if let Some(ref qfilter) = self.qfilter {
            terms.push(qfilter.clone());
        }
        if let Some((ref field, ref value)) = self.equality_filter {
            terms.push(format!("{}=={}", field, query_encode(value)));
        }
        if !terms.is_empty() {
            uri.push_str("&filter=(");
            uri.push_str(&terms.join(";"));
            uri.push(')');
        }

        uri
    }
}

/// Result records of a query result tree (Link and metadata children of the
/// result list are skipped).
fn record_elements(result: &XmlElement, format: QueryResultFormat) -> Vec<XmlElement> {
    result
        .children
        .iter()
        .filter(|c| c.name.ends_with(format.record_suffix()))
        .cloned()
        .collect()
}
