use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use zip::ZipArchive;

/// Errors raised while extracting markup from a document container.
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("Not a word-processor container: {0}")]
    Container(#[from] zip::result::ZipError),

    #[error("Container has no word/document.xml part")]
    MissingDocumentPart,

    #[error("Malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error while reading container: {0}")]
    Io(#[from] std::io::Error),
}

/// Extracts the body of a docx as an HTML fragment.
///
/// Paragraphs become `<p>`, `Heading1`..`Heading6` styles become `<h1>`..
/// `<h6>`, bold and italic runs become `<strong>` and `<em>`. Anything
/// richer (tables, images, footnotes) is dropped; the goal is readable
/// markup, not fidelity.
pub fn docx_to_html(bytes: &[u8]) -> Result<String, MarkupError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let document_xml = {
        let mut part = archive
            .by_name("word/document.xml")
            .map_err(|e| match e {
                zip::result::ZipError::FileNotFound => MarkupError::MissingDocumentPart,
                other => MarkupError::Container(other),
            })?;
        let mut xml = String::new();
        part.read_to_string(&mut xml)?;
        xml
    };
    extract_body_html(&document_xml)
}

/// Wraps an HTML fragment into a standalone page for the headless renderer.
pub fn wrap_html_page(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n</head>\n<body>\n{}\n</body>\n</html>\n",
        fragment
    )
}

#[derive(Default)]
struct Run {
    bold: bool,
    italic: bool,
    text: String,
}

impl Run {
    fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn render(&self, out: &mut String) {
        if self.bold {
            out.push_str("<strong>");
        }
        if self.italic {
            out.push_str("<em>");
        }
        out.push_str(&escape_html(&self.text));
        if self.italic {
            out.push_str("</em>");
        }
        if self.bold {
            out.push_str("</strong>");
        }
    }
}

fn extract_body_html(xml: &str) -> Result<String, MarkupError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut html = String::new();
    let mut paragraph = String::new();
    let mut paragraph_style: Option<String> = None;
    let mut run = Run::default();
    let mut in_run = false;
    let mut in_run_props = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    paragraph.clear();
                    paragraph_style = None;
                }
                b"r" => {
                    in_run = true;
                    run = Run::default();
                }
                b"rPr" if in_run => in_run_props = true,
                b"t" if in_run => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"pStyle" => {
                    paragraph_style = attribute_value(&e, b"val");
                }
                b"b" if in_run_props => run.bold = flag_enabled(&e),
                b"i" if in_run_props => run.italic = flag_enabled(&e),
                b"br" if in_run => run.text.push('\n'),
                b"tab" if in_run => run.text.push('\t'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(|e| MarkupError::Xml(e.into()))?;
                run.text.push_str(&text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    let (open, close) = paragraph_tags(paragraph_style.as_deref());
                    html.push_str(open);
                    html.push_str(&paragraph);
                    html.push_str(close);
                    html.push('\n');
                }
                b"r" => {
                    if !run.is_empty() {
                        run.render(&mut paragraph);
                    }
                    in_run = false;
                }
                b"rPr" => in_run_props = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(html)
}

/// Maps a paragraph style to its HTML tag pair. Heading1..Heading6 map to
/// h1..h6, everything else is a plain paragraph.
fn paragraph_tags(style: Option<&str>) -> (&'static str, &'static str) {
    match style {
        Some("Heading1") => ("<h1>", "</h1>"),
        Some("Heading2") => ("<h2>", "</h2>"),
        Some("Heading3") => ("<h3>", "</h3>"),
        Some("Heading4") => ("<h4>", "</h4>"),
        Some("Heading5") => ("<h5>", "</h5>"),
        Some("Heading6") => ("<h6>", "</h6>"),
        _ => ("<p>", "</p>"),
    }
}

fn attribute_value(e: &quick_xml::events::BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if attr.key.local_name().as_ref() == name {
            String::from_utf8(attr.value.to_vec()).ok()
        } else {
            None
        }
    })
}

/// An on/off run property is enabled unless its w:val says otherwise.
fn flag_enabled(e: &quick_xml::events::BytesStart<'_>) -> bool {
    match attribute_value(e, b"val") {
        Some(val) => !matches!(val.as_str(), "false" | "0" | "none"),
        None => true,
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_simple_paragraphs() {
        let docx = fixtures::sample_docx(&["Hello world", "Second paragraph"]);
        let html = docx_to_html(&docx).unwrap();
        assert!(html.contains("<p>Hello world</p>"));
        assert!(html.contains("<p>Second paragraph</p>"));
    }

    #[test]
    fn test_heading_styles_map_to_heading_tags() {
        let xml = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Title</w:t></w:r></w:p>
    <w:p><w:r><w:t>Body</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let html = extract_body_html(xml).unwrap();
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>Body</p>"));
    }

    #[test]
    fn test_bold_and_italic_runs() {
        let xml = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:r><w:rPr><w:b/></w:rPr><w:t>bold</w:t></w:r>
      <w:r><w:rPr><w:i/></w:rPr><w:t>italic</w:t></w:r>
      <w:r><w:rPr><w:b/><w:i/></w:rPr><w:t>both</w:t></w:r>
    </w:p>
  </w:body>
</w:document>"#;
        let html = extract_body_html(xml).unwrap();
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
        assert!(html.contains("<strong><em>both</em></strong>"));
    }

    #[test]
    fn test_disabled_flag_is_not_bold() {
        let xml = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:rPr><w:b w:val="false"/></w:rPr><w:t>plain</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let html = extract_body_html(xml).unwrap();
        assert!(html.contains("<p>plain</p>"));
        assert!(!html.contains("<strong>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let docx = fixtures::sample_docx(&["a < b & c > d"]);
        let html = docx_to_html(&docx).unwrap();
        assert!(html.contains("a &lt; b &amp; c &gt; d"));
    }

    #[test]
    fn test_non_zip_bytes_are_rejected() {
        let err = docx_to_html(b"not a container").unwrap_err();
        assert!(matches!(err, MarkupError::Container(_)));
    }

    #[test]
    fn test_zip_without_document_part_is_rejected() {
        let bytes = fixtures::zip_with_single_file("other.txt", b"hello");
        let err = docx_to_html(&bytes).unwrap_err();
        assert!(matches!(err, MarkupError::MissingDocumentPart));
    }

    #[test]
    fn test_wrap_html_page() {
        let page = wrap_html_page("<p>x</p>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<meta charset=\"utf-8\">"));
        assert!(page.contains("<p>x</p>"));
    }
}
