use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::classify::looks_like_match_data;

// Decoded payloads that failed classification go here so a changed page
// layout can be inspected after the fact. Never read back by the pipeline.
pub trait DiagnosticSink {
    fn capture(&self, label: &str, value: &Value);
}

pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn capture(&self, _label: &str, _value: &Value) {}
}

pub struct Candidate {
    pub label: String,
    pub value: Value,
}

enum PayloadKind {
    // JSON embedded in a script string literal, backslash escapes intact.
    Escaped,
    // JSON written directly into the script source.
    Literal,
}

struct Recognizer {
    label: &'static str,
    pattern: Regex,
    payload: PayloadKind,
    // The generic pattern captures the variable name itself as group 1.
    labeled_by_capture: bool,
}

impl Recognizer {
    fn known(label: &'static str, pattern: &str, payload: PayloadKind) -> Self {
        Self {
            label,
            pattern: Regex::new(pattern).expect("recognizer pattern must compile"),
            payload,
            labeled_by_capture: false,
        }
    }

    fn try_extract(&self, content: &str) -> Option<Candidate> {
        let caps = self.pattern.captures(content)?;
        let (label, raw) = if self.labeled_by_capture {
            (caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str())
        } else {
            (self.label.to_string(), caps.get(1)?.as_str())
        };
        let decoded = match self.payload {
            PayloadKind::Escaped => decode_escaped_json(raw)?,
            PayloadKind::Literal => raw.to_string(),
        };
        let value = serde_json::from_str(&decoded).ok()?;
        Some(Candidate { label, value })
    }
}

// Ordered most specific first; the first classifier-accepted candidate wins.
static RECOGNIZERS: Lazy<Vec<Recognizer>> = Lazy::new(|| {
    vec![
        Recognizer::known(
            "statisticsData",
            r"var statisticsData\s*=\s*JSON\.parse\('([^']+)'\);",
            PayloadKind::Escaped,
        ),
        Recognizer::known(
            "datesData",
            r"var datesData\s*=\s*JSON\.parse\('([^']+)'\);",
            PayloadKind::Escaped,
        ),
        Recognizer::known(
            "playersData",
            r"var playersData\s*=\s*JSON\.parse\('([^']+)'\);",
            PayloadKind::Escaped,
        ),
        Recognizer::known(
            "matchesData",
            r"var matchesData\s*=\s*JSON\.parse\('([^']+)'\);",
            PayloadKind::Escaped,
        ),
        Recognizer::known(
            "matchesData",
            r#"var matchesData\s*=\s*JSON\.parse\("([^"]+)"\);"#,
            PayloadKind::Escaped,
        ),
        Recognizer::known(
            "matchesData",
            r"(?s)var matchesData\s*=\s*(\[.*?\]);",
            PayloadKind::Literal,
        ),
        Recognizer {
            label: "anyData",
            pattern: Regex::new(r"var\s+(\w*[Dd]ata\w*)\s*=\s*JSON\.parse\('([^']+)'\);")
                .expect("recognizer pattern must compile"),
            payload: PayloadKind::Escaped,
            labeled_by_capture: true,
        },
    ]
});

static ANY_PARSE_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"var\s+(\w+)\s*=\s*JSON\.parse\('([^']+)'\);")
        .expect("scan pattern must compile")
});

// Returns the first embedded payload that classifies as match data. None is
// the normal "page carries no match data" outcome, not a failure.
pub fn extract_match_payload(content: &str, sink: &dyn DiagnosticSink) -> Option<Value> {
    for recognizer in RECOGNIZERS.iter() {
        let Some(candidate) = recognizer.try_extract(content) else {
            continue;
        };
        if looks_like_match_data(&candidate.value) {
            return Some(candidate.value);
        }
        sink.capture(&candidate.label, &candidate.value);
    }
    scan_all_parse_assignments(content, sink)
}

// Broad fallback: every JSON.parse assignment in document order.
fn scan_all_parse_assignments(content: &str, sink: &dyn DiagnosticSink) -> Option<Value> {
    for caps in ANY_PARSE_ASSIGNMENT.captures_iter(content) {
        let (Some(label), Some(raw)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let Some(decoded) = decode_escaped_json(raw.as_str()) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(&decoded) else {
            continue;
        };
        if looks_like_match_data(&value) {
            return Some(value);
        }
        sink.capture(label.as_str(), &value);
    }
    None
}

// Undo the backslash escaping a script string literal applies to embedded
// JSON. The source mostly uses \xNN for quotes; \uNNNN (with surrogate
// pairs) and the usual single-character escapes also appear. Unknown escapes
// are kept verbatim for the JSON parser to judge. None means the escape
// structure itself is broken.
fn decode_escaped_json(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            'x' => out.push(char::from_u32(take_hex(&mut chars, 2)?)?),
            'u' => {
                let unit = take_hex(&mut chars, 4)?;
                let scalar = if (0xD800..0xDC00).contains(&unit) {
                    if chars.next()? != '\\' || chars.next()? != 'u' {
                        return None;
                    }
                    let low = take_hex(&mut chars, 4)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return None;
                    }
                    0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    unit
                };
                out.push(char::from_u32(scalar)?);
            }
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            '/' => out.push('/'),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

fn take_hex(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<u32> {
    let mut code = 0u32;
    for _ in 0..digits {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::decode_escaped_json;

    #[test]
    fn decodes_hex_escaped_quotes() {
        let decoded = decode_escaped_json(r"[{\x22side\x22:\x22h\x22}]").unwrap();
        assert_eq!(decoded, r#"[{"side":"h"}]"#);
    }

    #[test]
    fn decodes_unicode_and_surrogate_pairs() {
        assert_eq!(decode_escaped_json(r"M\u00FCnchen").unwrap(), "M\u{fc}nchen");
        assert_eq!(decode_escaped_json(r"\uD83D\uDE00").unwrap(), "\u{1f600}");
    }

    #[test]
    fn truncated_escape_is_a_decode_failure() {
        assert!(decode_escaped_json(r"broken\x2").is_none());
        assert!(decode_escaped_json(r"broken\u00").is_none());
        assert!(decode_escaped_json(r"lone\uD83D tail").is_none());
    }

    #[test]
    fn unknown_escapes_pass_through() {
        assert_eq!(decode_escaped_json(r"a\qb").unwrap(), r"a\qb");
    }
}
