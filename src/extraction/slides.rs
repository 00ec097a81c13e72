use std::fs::File;
use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use thiserror::Error;
use zip::ZipArchive;

use super::{DocumentKind, ExtractionError, PageReader, RawPage};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

static SLIDE_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ppt/slides/slide(\d+)\.xml$").expect("slide entry pattern is valid"));

/// Per-slide failure; the slide degrades to an unreadable page.
#[derive(Debug, Error)]
enum SlideError {
    #[error("archive entry: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("read: {0}")]
    Io(#[from] std::io::Error),
    #[error("xml: {0}")]
    Xml(String),
}

/// Slide decks (`.pptx`): a zip of DrawingML slide parts.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlideDeckReader;

impl PageReader for SlideDeckReader {
    fn read_pages(&self, path: &Path) -> Result<Vec<RawPage>, ExtractionError> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file).map_err(|e| ExtractionError::Corrupt {
            kind: DocumentKind::SlideDeck,
            reason: e.to_string(),
        })?;

        let mut numbered: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| {
                let number = SLIDE_ENTRY.captures(name)?.get(1)?.as_str().parse().ok()?;
                Some((number, name.to_string()))
            })
            .collect();
        numbered.sort_by_key(|(number, _)| *number);

        if numbered.is_empty() && archive.by_name(PRESENTATION_PART).is_err() {
            return Err(ExtractionError::Corrupt {
                kind: DocumentKind::SlideDeck,
                reason: "archive is not a presentation".to_string(),
            });
        }

        let slides = match deck_order(&mut archive) {
            Ok(order) if !order.is_empty() => order,
            Ok(_) => numbered.into_iter().map(|(_, name)| name).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Deck order unreadable, using slide part numbers");
                numbered.into_iter().map(|(_, name)| name).collect()
            }
        };

        let pages = slides
            .iter()
            .zip(1u32..)
            .map(|(name, number)| {
                read_slide(&mut archive, name).unwrap_or_else(|e| {
                    tracing::warn!(slide = number, part = %name, error = %e, "Slide unreadable");
                    RawPage::unreadable()
                })
            })
            .collect();

        Ok(pages)
    }
}

fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Result<String, SlideError> {
    let mut xml = String::new();
    archive.by_name(name)?.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Slide part names in display order, from `p:sldIdLst` resolved through
/// the presentation relationships. Empty when the deck lists no slides.
fn deck_order(archive: &mut ZipArchive<File>) -> Result<Vec<String>, SlideError> {
    let ids = match read_part(archive, PRESENTATION_PART) {
        Ok(xml) => parse_slide_ids(&xml)?,
        Err(SlideError::Zip(zip::result::ZipError::FileNotFound)) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let targets = parse_relationships(&read_part(archive, PRESENTATION_RELS)?)?;
    ids.iter()
        .map(|id| {
            targets
                .iter()
                .find(|(rel_id, _)| rel_id == id)
                .map(|(_, target)| resolve_target(target))
                .ok_or_else(|| SlideError::Xml(format!("slide relationship {id} missing")))
        })
        .collect()
}

/// Relationship ids of `p:sldId` entries, in list order.
fn parse_slide_ids(xml: &str) -> Result<Vec<String>, SlideError> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();

    loop {
        match reader.read_event().map_err(|e| SlideError::Xml(e.to_string()))? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sldId" => {
                // The numeric `id` is unprefixed; the relationship id is `r:id`.
                let rel_id = e.attributes().flatten().find(|a| {
                    a.key.prefix().is_some() && a.key.local_name().as_ref() == b"id"
                });
                if let Some(attr) = rel_id {
                    let value = attr.unescape_value().map_err(|e| SlideError::Xml(e.to_string()))?;
                    ids.push(value.into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(ids)
}

/// `(Id, Target)` of every `Relationship` element.
fn parse_relationships(xml: &str) -> Result<Vec<(String, String)>, SlideError> {
    let mut reader = Reader::from_str(xml);
    let mut relationships = Vec::new();

    loop {
        match reader.read_event().map_err(|e| SlideError::Xml(e.to_string()))? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().map_err(|e| SlideError::Xml(e.to_string()))?;
                    match attr.key.as_ref() {
                        b"Id" => id = Some(value.into_owned()),
                        b"Target" => target = Some(value.into_owned()),
                        _ => {}
                    }
                }
                relationships.extend(id.zip(target));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(relationships)
}

/// Targets are relative to `ppt/` unless absolute within the package.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("ppt/{}", target.trim_start_matches("./")),
    }
}

fn read_slide(archive: &mut ZipArchive<File>, name: &str) -> Result<RawPage, SlideError> {
    let xml = read_part(archive, name)?;

    let shapes = parse_shapes(&xml)?;
    Ok(compose(&shapes))
}

#[derive(Debug, Default)]
struct Shape {
    is_title: bool,
    paragraphs: Vec<String>,
}

impl Shape {
    fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    fn push_str(&mut self, s: &str) {
        match self.paragraphs.last_mut() {
            Some(paragraph) => paragraph.push_str(s),
            None => self.paragraphs.push(s.to_string()),
        }
    }
}

/// Collect the text of every `p:sp` shape, one string per `a:p` paragraph.
fn parse_shapes(xml: &str) -> Result<Vec<Shape>, SlideError> {
    let mut reader = Reader::from_str(xml);
    let mut shapes = Vec::new();
    let mut current: Option<Shape> = None;
    let mut in_run_text = false;

    loop {
        match reader.read_event().map_err(|e| SlideError::Xml(e.to_string()))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"sp" => current = Some(Shape::default()),
                b"p" => {
                    if let Some(shape) = current.as_mut() {
                        shape.paragraphs.push(String::new());
                    }
                }
                b"t" => in_run_text = current.is_some(),
                b"ph" => mark_title(&e, current.as_mut()),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"ph" => mark_title(&e, current.as_mut()),
                b"p" => {
                    if let Some(shape) = current.as_mut() {
                        shape.paragraphs.push(String::new());
                    }
                }
                b"br" => {
                    if let Some(shape) = current.as_mut() {
                        shape.push_str("\n");
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_run_text => {
                let text = t.unescape().map_err(|e| SlideError::Xml(e.to_string()))?;
                if let Some(shape) = current.as_mut() {
                    shape.push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"sp" => shapes.extend(current.take()),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

fn mark_title(element: &BytesStart<'_>, shape: Option<&mut Shape>) {
    let Some(shape) = shape else { return };
    if let Ok(Some(kind)) = element.try_get_attribute("type") {
        if matches!(&*kind.value, b"title" | b"ctrTitle") {
            shape.is_title = true;
        }
    }
}

/// Title first (if any), then every other shape with visible text, one
/// per line, in document order.
fn compose(shapes: &[Shape]) -> RawPage {
    let title_index = shapes.iter().position(|s| s.is_title);
    let title = title_index
        .map(|i| shapes[i].text().trim().to_string())
        .filter(|t| !t.is_empty());

    let mut text = String::new();
    if let Some(title) = &title {
        text.push_str(title);
        text.push('\n');
    }
    for (i, shape) in shapes.iter().enumerate() {
        if Some(i) == title_index {
            continue;
        }
        let body = shape.text();
        let body = body.trim();
        if !body.is_empty() {
            text.push_str(body);
            text.push('\n');
        }
    }

    RawPage {
        text: Some(text),
        title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld><p:spTree>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="3" name="Body"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
      <p:txBody><a:bodyPr/><a:p><a:r><a:t>Heat &amp; work</a:t></a:r></a:p><a:p><a:r><a:t>Entropy</a:t></a:r></a:p></p:txBody>
    </p:sp>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="2" name="Title"/><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
      <p:txBody><a:bodyPr/><a:p><a:r><a:t>  Thermodynamics </a:t></a:r></a:p></p:txBody>
    </p:sp>
    <p:sp>
      <p:nvSpPr><p:cNvPr id="4" name="Empty"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>
      <p:txBody><a:bodyPr/><a:p/></p:txBody>
    </p:sp>
  </p:spTree></p:cSld>
</p:sld>"#;

    #[test]
    fn title_leads_and_blank_shapes_are_skipped() {
        let shapes = parse_shapes(SLIDE).unwrap();
        assert_eq!(shapes.len(), 3);

        let page = compose(&shapes);
        assert_eq!(page.title.as_deref(), Some("Thermodynamics"));
        assert_eq!(page.text.as_deref(), Some("Thermodynamics\nHeat & work\nEntropy\n"));
    }

    #[test]
    fn slide_ids_follow_list_order() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst>
<p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/>
</p:sldIdLst></p:presentation>"#;
        assert_eq!(parse_slide_ids(xml).unwrap(), vec!["rId3", "rId2"]);
        assert!(parse_slide_ids("<p:presentation/>").unwrap().is_empty());
    }

    #[test]
    fn relationship_targets_resolve_under_ppt() {
        let xml = r#"<Relationships xmlns="x">
<Relationship Id="rId2" Type="slide" Target="slides/slide1.xml"/>
<Relationship Id="rId3" Type="slide" Target="/ppt/slides/slide7.xml"/>
</Relationships>"#;
        let rels = parse_relationships(xml).unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(resolve_target(&rels[0].1), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target(&rels[1].1), "ppt/slides/slide7.xml");
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(parse_shapes("<p:sld><p:sp></p:sld>").is_err());
    }
}
