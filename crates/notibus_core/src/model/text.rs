//! Templated text: positional format arguments and the "get text" renderer.
//!
//! # Responsibility
//! - Store typed positional arguments per text slot.
//! - Resolve a slot's text (localized key, else plain text) and substitute
//!   `%d`/`%s`/`%f`/`%%` placeholders left to right.
//!
//! # Invariants
//! - A leading `Count` argument positioned `Left` renders as a prefix and a
//!   trailing `Count` positioned `Right` renders as a suffix; neither is
//!   consumed by an inline placeholder.
//! - Rendered output never exceeds the byte limit; overflow is truncated at a
//!   char boundary.

use crate::codec::tag::{encode_tag, TextTag};
use crate::config::DEFAULT_TEXT_LIMIT;
use crate::error::{NotiError, NotiResult};
use crate::model::noti::{Notification, TextSlot};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Fallback localization domain consulted after the record's own domain.
pub const SYSTEM_TEXT_DOMAIN: &str = "sys_string";
const COUNT_DISPLAY_MAX: i32 = 999;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[dsf%]").expect("valid placeholder regex"));

/// Where a notification count is drawn relative to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountPosition {
    #[default]
    None,
    Left,
    Right,
}

/// One typed positional argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FormatArg {
    Int(i32),
    Double(f64),
    Str(String),
    Count { value: i32, position: CountPosition },
    /// Absolute time in epoch seconds, rendered as a `TIME` tag.
    Time(i64),
}

impl FormatArg {
    pub(crate) fn validate(&self) -> NotiResult<()> {
        match self {
            Self::Double(value) if !value.is_finite() => {
                Err(NotiError::invalid("double argument must be finite"))
            }
            Self::Count { value, .. } if *value < 0 => {
                Err(NotiError::invalid("count argument cannot be negative"))
            }
            Self::Time(value) if *value < 0 => {
                Err(NotiError::invalid("time argument cannot be negative"))
            }
            _ => Ok(()),
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Int(value) => value.to_string(),
            Self::Double(value) => format!("{value:.2}"),
            Self::Str(value) => value.clone(),
            Self::Count { value, .. } => render_count(*value),
            Self::Time(value) => encode_tag(TextTag::Time, &value.to_string()),
        }
    }
}

/// Positional arguments keyed by text slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatArgs(BTreeMap<TextSlot, Vec<FormatArg>>);

impl FormatArgs {
    pub fn get(&self, slot: TextSlot) -> &[FormatArg] {
        self.0.get(&slot).map_or(&[][..], Vec::as_slice)
    }

    pub(crate) fn set(&mut self, slot: TextSlot, args: Vec<FormatArg>) {
        if args.is_empty() {
            self.0.remove(&slot);
        } else {
            self.0.insert(slot, args);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub(crate) fn flatten(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parses the flattened form; empty input yields `None`.
    pub(crate) fn parse(flattened: &str) -> NotiResult<Option<Self>> {
        if flattened.trim().is_empty() {
            return Ok(None);
        }
        let parsed: Self = serde_json::from_str(flattened)
            .map_err(|err| NotiError::InvalidData(format!("malformed format args: {err}")))?;
        Ok((!parsed.is_empty()).then_some(parsed))
    }
}

/// Translation source for localization keys.
pub trait Localizer {
    fn lookup(&self, domain: &str, key: &str) -> Option<String>;
}

impl<F> Localizer for F
where
    F: Fn(&str, &str) -> Option<String>,
{
    fn lookup(&self, domain: &str, key: &str) -> Option<String> {
        self(domain, key)
    }
}

/// Localizer that never translates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocalizer;

impl Localizer for NoLocalizer {
    fn lookup(&self, _domain: &str, _key: &str) -> Option<String> {
        None
    }
}

impl Notification {
    /// Resolves and renders the text of one slot with the default limit.
    pub fn text(&self, slot: TextSlot, localizer: &dyn Localizer) -> Option<String> {
        self.text_with_limit(slot, localizer, DEFAULT_TEXT_LIMIT)
    }

    /// Resolves and renders the text of one slot, capped at `limit` bytes.
    ///
    /// Resolution order: key translated in the record's domain, key
    /// translated in the system domain, plain text, untranslated key.
    pub fn text_with_limit(
        &self,
        slot: TextSlot,
        localizer: &dyn Localizer,
        limit: usize,
    ) -> Option<String> {
        let base = self.resolve_base_text(slot, localizer)?;
        let args = self.format_args(slot);
        if args.is_empty() {
            return Some(truncate_utf8(base.into_owned(), limit));
        }
        Some(render_template(&base, args, limit))
    }

    fn resolve_base_text(&self, slot: TextSlot, localizer: &dyn Localizer) -> Option<Cow<'_, str>> {
        if let Some(key) = self.text_key(slot) {
            let translated = self
                .domain
                .as_deref()
                .and_then(|domain| localizer.lookup(domain, key))
                .or_else(|| localizer.lookup(SYSTEM_TEXT_DOMAIN, key));
            if let Some(value) = translated {
                return Some(Cow::Owned(value));
            }
        }
        self.text_raw(slot)
            .or_else(|| self.text_key(slot))
            .map(Cow::Borrowed)
    }
}

/// Substitutes positional arguments into `template`.
///
/// Placeholders without a matching argument are kept verbatim.
pub fn render_template(template: &str, args: &[FormatArg], limit: usize) -> String {
    let (prefix, inline, suffix) = split_count_args(args);
    let mut out = String::with_capacity(template.len());
    if let Some(count) = prefix {
        out.push_str(&count);
        out.push(' ');
    }

    let mut next_arg = inline.iter();
    let mut copied_to = 0;
    for placeholder in PLACEHOLDER_RE.find_iter(template) {
        out.push_str(&template[copied_to..placeholder.start()]);
        copied_to = placeholder.end();
        if placeholder.as_str() == "%%" {
            out.push('%');
            continue;
        }
        match next_arg.next() {
            Some(arg) => out.push_str(&arg.render()),
            None => out.push_str(placeholder.as_str()),
        }
    }
    out.push_str(&template[copied_to..]);

    if let Some(count) = suffix {
        out.push(' ');
        out.push_str(&count);
    }
    truncate_utf8(out, limit)
}

fn split_count_args(args: &[FormatArg]) -> (Option<String>, &[FormatArg], Option<String>) {
    let mut inline = args;
    let mut prefix = None;
    let mut suffix = None;
    if let Some((
        FormatArg::Count {
            value,
            position: CountPosition::Left,
        },
        rest,
    )) = inline.split_first()
    {
        prefix = Some(render_count(*value));
        inline = rest;
    }
    if let Some((
        FormatArg::Count {
            value,
            position: CountPosition::Right,
        },
        rest,
    )) = inline.split_last()
    {
        suffix = Some(render_count(*value));
        inline = rest;
    }
    (prefix, inline, suffix)
}

fn render_count(value: i32) -> String {
    if value > COUNT_DISPLAY_MAX {
        format!("{COUNT_DISPLAY_MAX}+")
    } else {
        value.to_string()
    }
}

fn truncate_utf8(mut value: String, limit: usize) -> String {
    if value.len() <= limit {
        return value;
    }
    let mut end = limit;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value.truncate(end);
    value
}
