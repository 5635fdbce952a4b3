//! WMS GetCapabilities document parsing.
//!
//! Every `Layer` element is visited in document order. The first one is the
//! service's root container and never yields a record. The remaining ones
//! yield a record when their own `Name` child is a qualified
//! `workspace:layer` name.

use quick_xml::{events::Event, Reader};
use shared::{
    domain::{LayerName, LayerRecord},
    error::DiscoveryError,
};
use tracing::debug;

use crate::catalog::Catalog;

#[derive(Debug, Clone, Copy)]
enum OpenElement {
    Layer(usize),
    Name,
    Title,
    Other,
}

#[derive(Debug, Default)]
struct LayerFrame {
    name: Option<String>,
    title: Option<String>,
}

pub fn parse_capabilities(xml: &str) -> Result<Catalog, DiscoveryError> {
    let frames = collect_layer_frames(xml)?;
    let mut records = Vec::new();

    for (index, frame) in frames.into_iter().enumerate().skip(1) {
        let Some(raw_name) = frame.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
        else {
            debug!(index, "skipping layer without a name");
            continue;
        };
        match LayerName::parse(raw_name) {
            Ok(full_name) => records.push(LayerRecord::new(full_name, frame.title.as_deref())),
            Err(err) => debug!(index, name = raw_name, "skipping unaddressable layer: {err}"),
        }
    }

    Ok(Catalog::from_records(records))
}

fn collect_layer_frames(xml: &str) -> Result<Vec<LayerFrame>, DiscoveryError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut open: Vec<OpenElement> = Vec::new();
    let mut frames: Vec<LayerFrame> = Vec::new();
    let mut saw_element = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                saw_element = true;
                let element = match e.local_name().as_ref() {
                    b"Layer" => {
                        frames.push(LayerFrame::default());
                        OpenElement::Layer(frames.len() - 1)
                    }
                    b"Name" => OpenElement::Name,
                    b"Title" => OpenElement::Title,
                    _ => OpenElement::Other,
                };
                open.push(element);
            }
            Ok(Event::Empty(ref e)) => {
                saw_element = true;
                if e.local_name().as_ref() == b"Layer" {
                    frames.push(LayerFrame::default());
                }
            }
            Ok(Event::End(_)) => {
                open.pop();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| {
                    DiscoveryError::parse(format!(
                        "at byte {}: {err}",
                        reader.buffer_position()
                    ))
                })?;
                append_text(&open, &mut frames, &text);
            }
            Ok(Event::CData(e)) => {
                let bytes = e.into_inner();
                append_text(&open, &mut frames, &String::from_utf8_lossy(&bytes));
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(DiscoveryError::parse(format!(
                    "at byte {}: {err}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_element {
        return Err(DiscoveryError::parse("document has no root element"));
    }
    if !open.is_empty() {
        return Err(DiscoveryError::parse(format!(
            "document ended with {} unclosed element(s)",
            open.len()
        )));
    }

    Ok(frames)
}

/// Only text directly inside a `Layer`'s own `Name`/`Title` child counts;
/// `Style/Name` and similar nested fields are ignored.
fn append_text(open: &[OpenElement], frames: &mut [LayerFrame], text: &str) {
    let [.., OpenElement::Layer(index), field] = open else {
        return;
    };
    let frame = &mut frames[*index];
    let slot = match field {
        OpenElement::Name => &mut frame.name,
        OpenElement::Title => &mut frame.title,
        OpenElement::Layer(_) | OpenElement::Other => return,
    };
    slot.get_or_insert_with(String::new).push_str(text);
}

#[cfg(test)]
#[path = "tests/capabilities_tests.rs"]
mod tests;
