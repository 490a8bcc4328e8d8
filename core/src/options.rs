//! Per-call query options.
//!
//! # Design
//! One struct enumerates every option the server recognizes, each
//! independently togglable. An unset option is omitted from the URL
//! entirely; nothing serializes as `false`. Each operation appends only
//! the keys it recognizes, onto the final outbound URL, so a set option is
//! actually transmitted. `watch` has two wire encodings: an empty-value
//! flag (`watch=`) on document reads and `watch=true` on ad-hoc queries.

/// Options appended to an operation's URL as query parameters.
///
/// Scoped per call, never persisted. `QueryOptions::default()` sends
/// nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub pretty: bool,
    pub metrics: bool,
    pub provenance: bool,
    pub instrument: bool,
    pub watch: bool,
    pub explain: bool,
}

impl QueryOptions {
    /// Options recognized by policy writes (put/delete).
    pub(crate) fn append_policy_write(&self, url: &mut String) {
        if self.pretty {
            push_option(url, "pretty", "true");
        }
        if self.metrics {
            push_option(url, "metrics", "true");
        }
    }

    /// Options recognized by document reads. `watch` is an empty-value flag.
    pub(crate) fn append_document_read(&self, url: &mut String) {
        if self.pretty {
            push_option(url, "pretty", "true");
        }
        if self.metrics {
            push_option(url, "metrics", "true");
        }
        if self.provenance {
            push_option(url, "provenance", "true");
        }
        if self.instrument {
            push_option(url, "instrument", "true");
        }
        if self.watch {
            push_option(url, "watch", "");
        }
    }

    /// Options recognized by the simple query.
    pub(crate) fn append_simple_query(&self, url: &mut String) {
        if self.pretty {
            push_option(url, "pretty", "true");
        }
    }

    /// Options recognized by the ad-hoc query. `watch` carries a value here.
    pub(crate) fn append_adhoc_query(&self, url: &mut String) {
        if self.pretty {
            push_option(url, "pretty", "true");
        }
        if self.metrics {
            push_option(url, "metrics", "true");
        }
        if self.watch {
            push_option(url, "watch", "true");
        }
        if self.explain {
            push_option(url, "explain", "true");
        }
    }
}

fn push_option(url: &mut String, key: &str, value: &str) {
    url.push(if url.contains('?') { '&' } else { '?' });
    url.push_str(key);
    url.push('=');
    url.push_str(value);
}
