//! Building the arena from XHTML bytes with quick-xml

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::node::{Document, Element, NodeId};

/// Markup errors; any of these makes a content document unusable
#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("XML syntax error at byte {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("Unclosed element <{0}> at end of document")]
    Unclosed(String),

    #[error("Closing tag without an open element at byte {0}")]
    UnexpectedClose(usize),

    #[error("Second root element <{0}>")]
    MultipleRoots(String),

    #[error("Document has no root element")]
    NoRootElement,
}

/// An element whose end tag has not been seen yet
struct OpenElement {
    id: NodeId,
    /// Children seen so far, per name
    child_counts: HashMap<String, u32>,
}

/// Qualified name as written, prefix included (`epub:switch`)
fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

impl Document {
    /// Parse a content document
    pub fn parse(bytes: &[u8]) -> Result<Self, MarkupError> {
        let mut reader = Reader::from_reader(bytes);
        let mut doc = Document { nodes: Vec::new() };
        let mut open: Vec<OpenElement> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| MarkupError::Syntax {
                position: reader.buffer_position(),
                message: e.to_string(),
            })?;

            match event {
                Event::Start(start) => {
                    let id = doc.push_element(element_name(&start), &mut open)?;
                    open.push(OpenElement {
                        id,
                        child_counts: HashMap::new(),
                    });
                }
                Event::Empty(start) => {
                    doc.push_element(element_name(&start), &mut open)?;
                }
                Event::End(_) => {
                    if open.pop().is_none() {
                        return Err(MarkupError::UnexpectedClose(reader.buffer_position()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            let name = doc.nodes[unclosed.id as usize].name.clone();
            return Err(MarkupError::Unclosed(name));
        }
        if doc.nodes.is_empty() {
            return Err(MarkupError::NoRootElement);
        }

        Ok(doc)
    }

    fn push_element(
        &mut self,
        name: String,
        open: &mut [OpenElement],
    ) -> Result<NodeId, MarkupError> {
        let id = self.nodes.len() as NodeId;

        let (parent, sibling_index) = match open.last_mut() {
            Some(parent) => {
                let count = parent.child_counts.entry(name.clone()).or_insert(0);
                *count += 1;
                (Some(parent.id), *count)
            }
            None if self.nodes.is_empty() => (None, 1),
            None => return Err(MarkupError::MultipleRoots(name)),
        };

        if let Some(parent) = parent {
            self.nodes[parent as usize].children.push(id);
        }
        self.nodes.push(Element {
            name,
            parent,
            children: Vec::new(),
            sibling_index,
        });

        Ok(id)
    }
}
