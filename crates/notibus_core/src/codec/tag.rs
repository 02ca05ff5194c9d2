//! `<TAG>value</TAG>` markup used to embed typed scalars in text.

use crate::error::{NotiError, NotiResult};

/// Markup tags understood by [`decode_tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTag {
    /// Absolute time in epoch seconds.
    Time,
}

impl TextTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "TIME",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "TIME" => Some(Self::Time),
            _ => None,
        }
    }
}

/// Wraps `value` as `<TAG>value</TAG>`.
pub fn encode_tag(tag: TextTag, value: &str) -> String {
    let name = tag.as_str();
    format!("<{name}>{value}</{name}>")
}

/// Extracts the tag and value from text containing a fragment produced by
/// [`encode_tag`].
///
/// The value spans from the first `>` to the first `</` after it and must be
/// non-empty. The tag name starts after the last `<` before that `>`, so any
/// leading text is skipped.
pub fn decode_tag(text: &str) -> NotiResult<(TextTag, String)> {
    let open_end = text
        .find('>')
        .ok_or_else(|| NotiError::invalid("tagged text has no opening tag"))?;
    let value_start = open_end + 1;
    let close_start = text[value_start..]
        .find("</")
        .map(|offset| value_start + offset)
        .ok_or_else(|| NotiError::invalid("tagged text has no closing tag"))?;
    if close_start <= value_start {
        return Err(NotiError::invalid("tagged text has an empty value"));
    }

    let name_start = text[..open_end]
        .rfind('<')
        .map(|offset| offset + 1)
        .ok_or_else(|| NotiError::invalid("tagged text has no `<` before `>`"))?;
    let name = &text[name_start..open_end];
    let tag = TextTag::parse(name)
        .ok_or_else(|| NotiError::invalid(format!("unknown text tag `{name}`")))?;
    Ok((tag, text[value_start..close_start].to_string()))
}

/// Encodes an absolute time for a templated-text channel.
pub fn encode_time(epoch_secs: i64) -> String {
    encode_tag(TextTag::Time, &epoch_secs.to_string())
}

/// Recovers a time encoded by [`encode_time`].
pub fn decode_time(fragment: &str) -> NotiResult<i64> {
    match decode_tag(fragment)? {
        (TextTag::Time, value) => value
            .parse()
            .map_err(|_| NotiError::invalid(format!("time tag value `{value}` is not a number"))),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_tag, decode_time, encode_tag, encode_time, TextTag};

    #[test]
    fn encoded_fragment_decodes_to_the_same_value() {
        let fragment = encode_tag(TextTag::Time, "yesterday 10:00");
        assert_eq!(fragment, "<TIME>yesterday 10:00</TIME>");
        let (tag, value) = decode_tag(&fragment).unwrap();
        assert_eq!(tag, TextTag::Time);
        assert_eq!(value, "yesterday 10:00");
    }

    #[test]
    fn untagged_or_malformed_text_is_invalid() {
        for input in ["plain", "<TIME>no close", "<TIME></TIME>", "TIME>1</TIME>", "<DATE>1</DATE>"] {
            let err = decode_tag(input).expect_err(input);
            assert_eq!(err.code(), "invalid_parameter");
        }
    }

    #[test]
    fn tag_inside_rendered_text_is_found() {
        let (tag, value) = decode_tag("at <TIME>1700000000</TIME>").unwrap();
        assert_eq!(tag, TextTag::Time);
        assert_eq!(value, "1700000000");
        assert_eq!(decode_time("sent <TIME>42</TIME> ago").unwrap(), 42);
    }

    #[test]
    fn time_round_trips_exactly() {
        assert_eq!(decode_time(&encode_time(1_699_999_999)).unwrap(), 1_699_999_999);
    }
}
