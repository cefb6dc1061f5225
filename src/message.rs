//! Multimodal messages passed into and between pipeline stages.
//!
//! Image bytes move into the message rather than being copied: discovery
//! hands its images over with [`AnalysisMessage::from_images`], and the
//! analyzer appends rasterized PDF pages with [`AnalysisMessage::extended`].

use crate::document::{Document, DocumentKind, ImageFormat};
use std::fmt;

/// One piece of a multimodal message.
#[derive(Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Image { format: ImageFormat, bytes: Vec<u8> },
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Segment::Image { format, bytes } => f
                .debug_struct("Image")
                .field("format", format)
                .field("bytes", &bytes.len())
                .finish(),
        }
    }
}

/// Ordered text and image segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisMessage {
    segments: Vec<Segment>,
}

impl AnalysisMessage {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// A message holding a single text segment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![Segment::Text(text.into())])
    }

    /// The instruction text followed by `images` in discovery order. PDF
    /// documents are dropped; the analyzer resolves them separately.
    pub fn from_images(instruction: impl Into<String>, images: Vec<Document>) -> Self {
        let mut segments = Vec::with_capacity(1 + images.len());
        segments.push(Segment::Text(instruction.into()));
        segments.extend(images.into_iter().filter_map(image_segment));
        Self { segments }
    }

    /// This message with `more` appended after the existing segments.
    pub fn extended(mut self, more: impl IntoIterator<Item = Segment>) -> Self {
        self.segments.extend(more);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Text segments joined with a blank line.
    pub fn joined_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Text(t) => Some(t.as_str()),
                Segment::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn images(&self) -> impl Iterator<Item = (ImageFormat, &[u8])> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Image { format, bytes } => Some((*format, bytes.as_slice())),
            Segment::Text(_) => None,
        })
    }

    pub fn image_count(&self) -> usize {
        self.images().count()
    }
}

fn image_segment(doc: Document) -> Option<Segment> {
    match doc.kind {
        DocumentKind::Image { format, bytes } => Some(Segment::Image { format, bytes }),
        DocumentKind::Pdf => None,
    }
}
