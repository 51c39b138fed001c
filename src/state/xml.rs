//! Minimal XML helpers for the small state files.
//!
//! The progress cursor and failure ledger are tiny documents with a fixed
//! schema, so they are written by hand and read with a streaming parser.

use quick_xml::Reader;
use quick_xml::events::Event;

/// Escapes the five XML special characters for element content.
#[must_use]
pub fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Returns the text content of the first element named `name`, or `None`
/// when the document has no such element.
///
/// # Errors
///
/// Returns a parser diagnostic when the document is not well-formed.
pub fn element_text(xml: &str, name: &str) -> Result<Option<String>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut inside = false;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) if e.name().as_ref() == name.as_bytes() => inside = true,
            Event::Text(t) if inside => {
                text.push_str(&t.unescape().map_err(|e| e.to_string())?);
            }
            Event::End(e) if e.name().as_ref() == name.as_bytes() => return Ok(Some(text)),
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_escape_replaces_special_characters() {
        assert_eq!(
            xml_escape(r#"a & b < c > "d" 'e'"#),
            "a &amp; b &lt; c &gt; &quot;d&quot; &apos;e&apos;"
        );
        assert_eq!(xml_escape("plain"), "plain");
    }

    #[test]
    fn test_element_text_finds_named_element() {
        let xml = "<Progress><LastDownloadedDate>2026-08-29</LastDownloadedDate></Progress>";
        let text = element_text(xml, "LastDownloadedDate").unwrap();
        assert_eq!(text.as_deref(), Some("2026-08-29"));
    }

    #[test]
    fn test_element_text_missing_element_is_none() {
        let xml = "<Progress></Progress>";
        assert!(element_text(xml, "LastDownloadedDate").unwrap().is_none());
    }

    #[test]
    fn test_element_text_unescapes_entities() {
        let xml = "<Root><Value>a &amp; b</Value></Root>";
        assert_eq!(element_text(xml, "Value").unwrap().as_deref(), Some("a & b"));
    }

    #[test]
    fn test_element_text_malformed_is_error() {
        assert!(element_text("<Root><Value></Root>", "Value").is_err());
    }
}
