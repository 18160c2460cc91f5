//! Gmail API response normalization
//!
//! Flattens a Gmail message (headers plus a nested MIME part tree) into a
//! [`NormalizedMail`]. Every function here is pure: the only input besides
//! the message is the fallback date the caller wants when the message has
//! no usable `Date` header.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use log::warn;

use super::api::{GmailMessage, MessagePart, MessagePayload};
use crate::models::{MessageId, NormalizedMail, Sender, UNKNOWN_SENDER};

/// Normalize a Gmail API message into a flat mail record
///
/// Missing headers, labels or body never fail; each falls back to its
/// documented default. A blank `Subject` or `From` counts as missing.
pub fn normalize_message(gmail_msg: GmailMessage, fallback_date: DateTime<Utc>) -> NormalizedMail {
    let payload = gmail_msg.payload.as_ref();

    let from = extract_header(payload, "From").filter(|v| !v.trim().is_empty());
    let from = parse_sender(from.as_deref().unwrap_or(UNKNOWN_SENDER));

    let mut builder = NormalizedMail::builder(MessageId::new(gmail_msg.id.as_str()))
        .from(from)
        .date(payload.and_then(extract_date))
        .fallback_date(fallback_date)
        .labels(gmail_msg.label_ids.unwrap_or_default());

    if let Some(subject) = extract_header(payload, "Subject").filter(|v| !v.trim().is_empty()) {
        builder = builder.subject(subject);
    }

    if let Some(payload) = payload {
        builder = builder.body(select_body(payload));
    }

    builder.build()
}

/// Extract a header value by name (ASCII case-insensitive)
fn extract_header(payload: Option<&MessagePayload>, name: &str) -> Option<String> {
    payload?.headers.as_ref()?.iter().find_map(|h| {
        if h.name.eq_ignore_ascii_case(name) {
            Some(h.value.clone())
        } else {
            None
        }
    })
}

/// Split a `From` header into display name and address
///
/// Supports exactly two forms: `Display Name <addr>` (the name may be
/// quoted) and a bare value. For a bare value the whole string is used as
/// both name and address. Address lists and encoded words are not decoded.
pub fn parse_sender(raw: &str) -> Sender {
    match raw.split_once('<') {
        Some((name, rest)) => {
            let name = name.trim().replace('"', "");
            let email = rest.split_once('>').map_or(rest, |(addr, _)| addr).trim();
            Sender::new(name, email)
        }
        None => Sender::new(raw, raw),
    }
}

/// Select the body to display
///
/// A payload with parts yields the first `text/html` part found depth-first,
/// then the first `text/plain` part, then nothing. A payload without parts
/// uses its own body.
pub fn select_body(payload: &MessagePayload) -> String {
    let data = match payload.parts.as_deref() {
        Some(parts) if !parts.is_empty() => find_part_data(parts, "text/html")
            .or_else(|| find_part_data(parts, "text/plain")),
        _ => payload.body.as_ref().and_then(|b| b.data.as_deref()),
    };

    let Some(data) = data else {
        return String::new();
    };
    decode_base64_body(data).unwrap_or_else(|| {
        warn!("Body data is not valid base64 ({} bytes)", data.len());
        String::new()
    })
}

/// Depth-first search for the first part of `mime_type` carrying data
fn find_part_data<'a>(parts: &'a [MessagePart], mime_type: &str) -> Option<&'a str> {
    for part in parts {
        if part
            .mime_type
            .as_deref()
            .is_some_and(|m| mime_essence(m).eq_ignore_ascii_case(mime_type))
            && let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref())
        {
            return Some(data);
        }

        if let Some(nested) = &part.parts
            && let Some(data) = find_part_data(nested, mime_type)
        {
            return Some(data);
        }
    }

    None
}

/// MIME type without parameters, e.g. `text/html` for `text/html; charset=UTF-8`
fn mime_essence(mime_type: &str) -> &str {
    mime_type.split(';').next().unwrap_or_default().trim()
}

/// Accepts padded or unpadded input and non-zero trailing bits
const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Decode base64-encoded body data
///
/// Gmail emits URL-safe base64, but padding varies and some payloads use
/// the standard alphabet. Invalid UTF-8 is replaced rather than rejected.
pub fn decode_base64_body(data: &str) -> Option<String> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    [&URL_SAFE_LENIENT, &STANDARD_LENIENT]
        .iter()
        .find_map(|decoder| decoder.decode(&compact).ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse the `Date` header, if present and well-formed
pub fn extract_date(payload: &MessagePayload) -> Option<DateTime<Utc>> {
    let raw = extract_header(Some(payload), "Date")?;
    let parsed = parse_date(&raw);
    if parsed.is_none() {
        warn!("Unparseable Date header: {:?}", raw);
    }
    parsed
}

/// Parse an RFC 2822 date, tolerating a trailing zone comment like `(UTC)`.
/// RFC 3339 is accepted as well.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let mut value = raw.trim();
    if value.ends_with(')')
        && let Some(open) = value.rfind('(')
    {
        value = value[..open].trim_end();
    }

    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
