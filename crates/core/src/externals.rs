//! External resource auditing.
//!
//! Extracts the hostnames a page references through a fixed allowlist of
//! tag/attribute pairs and classifies them against a set of trusted domain
//! suffixes. Markup is scanned at the html5ever tokenizer level rather than
//! through a tree builder, so an allowlisted tag is seen wherever it appears,
//! including positions a browser would drop (a `<frame>` outside any
//! `<frameset>`, for instance).

use std::collections::BTreeSet;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use url::Url;

/// Tag kinds and the attribute through which each one references a resource.
pub const RESOURCE_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("area", "href"),
    ("base", "href"),
    ("link", "href"),
    ("img", "src"),
    ("script", "src"),
    ("iframe", "src"),
    ("frame", "src"),
    ("input", "src"),
];

/// Collects resource references from start tags.
#[derive(Default)]
struct ReferenceSink {
    references: Vec<String>,
}

impl ReferenceSink {
    fn collect(&mut self, tag: &Tag) {
        let Some((_, attribute)) = RESOURCE_ATTRIBUTES
            .iter()
            .find(|(name, _)| *name == &*tag.name)
        else {
            return;
        };
        if let Some(attr) = tag.attrs.iter().find(|a| &*a.name.local == *attribute) {
            self.references.push(attr.value.to_string());
        }
    }
}

/// Element content the tokenizer must not scan for tags, mirroring the
/// states a tree builder would switch it into.
fn raw_content(name: &str) -> Option<RawKind> {
    match name {
        "title" | "textarea" => Some(RawKind::Rcdata),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" => Some(RawKind::Rawtext),
        "script" => Some(RawKind::ScriptData),
        _ => None,
    }
}

impl TokenSink for ReferenceSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let Token::TagToken(tag) = token else {
            return TokenSinkResult::Continue;
        };
        if tag.kind != TagKind::StartTag {
            return TokenSinkResult::Continue;
        }
        self.collect(&tag);
        match raw_content(&tag.name) {
            Some(kind) if !tag.self_closing => TokenSinkResult::RawData(kind),
            _ => TokenSinkResult::Continue,
        }
    }
}

/// Collect the distinct hostnames referenced by `html_lines`.
///
/// Only absolute (`https://host/...`) and scheme-relative (`//host/...`)
/// references resolve to a hostname. Relative paths, fragments and
/// host-less schemes (`mailto:`, `javascript:`, `data:`) are skipped.
pub fn find_external_hosts<S: AsRef<str>>(html_lines: &[S]) -> BTreeSet<String> {
    let markup = html_lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n");

    let mut input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(&markup));
    let mut tokenizer = Tokenizer::new(ReferenceSink::default(), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();

    tokenizer
        .sink
        .references
        .iter()
        .filter_map(|reference| resolve_host(reference))
        .collect()
}

/// Resolve a URL reference to its lowercase hostname, if it names one.
pub fn resolve_host(reference: &str) -> Option<String> {
    let reference = reference.trim();
    let parsed = if reference.starts_with("//") {
        Url::parse(&format!("http:{reference}"))
    } else {
        Url::parse(reference)
    };
    let host = parsed
        .ok()?
        .host_str()?
        .trim_end_matches('.')
        .to_ascii_lowercase();
    (!host.is_empty()).then_some(host)
}

/// Return the subset of `hostnames` not covered by any trusted suffix.
pub fn classify<S: AsRef<str>>(
    hostnames: &BTreeSet<String>,
    trusted_suffixes: &[S],
) -> BTreeSet<String> {
    hostnames
        .iter()
        .filter(|host| !is_trusted(host, trusted_suffixes))
        .cloned()
        .collect()
}

/// Whether `hostname` equals a trusted suffix or is a subdomain of one.
///
/// Matching works on whole dot-separated labels: `cdn.trusted.com` is covered
/// by `trusted.com`, while `nottrusted.com` and `trusted.com.evil.net` are not.
/// Empty suffixes never match.
pub fn is_trusted<S: AsRef<str>>(hostname: &str, trusted_suffixes: &[S]) -> bool {
    let hostname = hostname.trim_end_matches('.').to_ascii_lowercase();
    trusted_suffixes
        .iter()
        .any(|suffix| label_suffix_match(&hostname, suffix.as_ref()))
}

fn label_suffix_match(hostname: &str, suffix: &str) -> bool {
    let suffix = suffix
        .trim()
        .trim_start_matches('.')
        .trim_end_matches('.')
        .to_ascii_lowercase();
    if suffix.is_empty() {
        return false;
    }
    hostname == suffix
        || hostname
            .strip_suffix(suffix.as_str())
            .is_some_and(|rest| rest.ends_with('.'))
}

/// Hostnames referenced by `html_lines` that fall outside `trusted_suffixes`.
pub fn untrusted_hosts<L: AsRef<str>, S: AsRef<str>>(
    html_lines: &[L],
    trusted_suffixes: &[S],
) -> BTreeSet<String> {
    classify(&find_external_hosts(html_lines), trusted_suffixes)
}
