//! Small in-memory sample artifacts for tests.

use std::io::{Cursor, Write};

use image::{ImageFormat, Rgb, RgbImage};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn sample_image() -> RgbImage {
    RgbImage::from_fn(8, 8, |x, y| {
        if (x + y) % 2 == 0 {
            Rgb([220, 40, 40])
        } else {
            Rgb([40, 40, 220])
        }
    })
}

/// An 8x8 checkerboard encoded as PNG.
pub fn sample_png() -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    sample_image()
        .write_to(&mut out, ImageFormat::Png)
        .expect("png fixture encode");
    out.into_inner()
}

/// An 8x8 checkerboard encoded as JPEG.
pub fn sample_jpeg() -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    sample_image()
        .write_to(&mut out, ImageFormat::Jpeg)
        .expect("jpeg fixture encode");
    out.into_inner()
}

/// A zip archive holding a single named file.
pub fn zip_with_single_file(name: &str, data: &[u8]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(name, SimpleFileOptions::default())
        .expect("zip fixture entry");
    writer.write_all(data).expect("zip fixture write");
    writer.finish().expect("zip fixture finish").into_inner()
}

/// A minimal docx whose body contains one plain paragraph per entry.
pub fn sample_docx(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|text| {
            format!(
                "<w:p><w:r><w:t>{}</w:t></w:r></w:p>",
                text.replace('&', "&amp;").replace('<', "&lt;")
            )
        })
        .collect();

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{}</w:body>
</w:document>"#,
        body
    );

    let content_types = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

    let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in [
        ("[Content_Types].xml", content_types.as_bytes()),
        ("_rels/.rels", root_rels.as_bytes()),
        ("word/document.xml", document.as_bytes()),
    ] {
        writer.start_file(name, options).expect("docx fixture entry");
        writer.write_all(data).expect("docx fixture write");
    }
    writer.finish().expect("docx fixture finish").into_inner()
}
