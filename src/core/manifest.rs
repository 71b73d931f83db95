//! Addon manifest (`addon.xml`) reader
//!
//! Only the parts the release needs are extracted: the `id`, `name` and
//! `version` attributes of the root element and the release notes in
//! `extension[@point='xbmc.addon.metadata']/news`.

use crate::core::error::{ReleaseError, ReleaseResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// Extension point carrying the addon metadata
const METADATA_EXTENSION_POINT: &str = "xbmc.addon.metadata";

/// Addon identity parsed from the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub id: String,
    pub name: String,
    pub version: String,
    /// Release notes, if the manifest has any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<String>,
}

impl Manifest {
    /// Read and parse a manifest file
    pub fn load(path: &Path) -> ReleaseResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ReleaseError::ManifestNotFound {
                path: path.to_path_buf(),
            },
            _ => ReleaseError::io(format!("Failed to read {}", path.display()), e),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ReleaseError::ManifestParse { message, .. } => ReleaseError::ManifestParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse manifest XML
    pub fn parse(xml: &str) -> ReleaseResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut root: Option<RootAttributes> = None;
        // Element names from the root down to the current element
        let mut stack: Vec<String> = Vec::new();
        let mut in_metadata = false;
        let mut news: Option<String> = None;

        loop {
            let event = reader.read_event().map_err(parse_error)?;
            match event {
                Event::Start(ref element) | Event::Empty(ref element) => {
                    let is_empty = matches!(event, Event::Empty(_));
                    let name = element_name(element);

                    if root.is_none() {
                        root = Some(RootAttributes::from_element(element)?);
                    } else if stack.len() == 1
                        && name == "extension"
                        && attribute(element, "point")?.as_deref()
                            == Some(METADATA_EXTENSION_POINT)
                    {
                        in_metadata = !is_empty;
                    } else if in_metadata && stack.len() == 2 && name == "news" && news.is_none() {
                        news = Some(String::new());
                    }

                    if !is_empty {
                        stack.push(name);
                    }
                }
                Event::Text(text) => {
                    if let Some(buffer) = news_buffer(&mut news, &stack, in_metadata) {
                        buffer.push_str(&text.unescape().map_err(parse_error)?);
                    }
                }
                Event::CData(data) => {
                    if let Some(buffer) = news_buffer(&mut news, &stack, in_metadata) {
                        buffer.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::End(_) => {
                    let closed = stack.pop();
                    if stack.len() == 1 && closed.as_deref() == Some("extension") {
                        in_metadata = false;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let root = root.ok_or_else(|| ReleaseError::ManifestParse {
            path: Default::default(),
            message: "document has no root element".to_string(),
        })?;

        Ok(Self {
            id: root.require("id")?,
            name: root.require("name")?,
            version: root.require("version")?,
            news: news.filter(|n| !n.is_empty()),
        })
    }

    /// File name of the release archive, `<id>-<version>.zip`
    pub fn archive_name(&self) -> String {
        format!("{}-{}.zip", self.id, self.version)
    }
}

/// Identity attributes found on the root element
struct RootAttributes {
    id: Option<String>,
    name: Option<String>,
    version: Option<String>,
}

impl RootAttributes {
    fn from_element(element: &BytesStart<'_>) -> ReleaseResult<Self> {
        Ok(Self {
            id: attribute(element, "id")?,
            name: attribute(element, "name")?,
            version: attribute(element, "version")?,
        })
    }

    fn require(&self, attribute: &str) -> ReleaseResult<String> {
        let value = match attribute {
            "id" => &self.id,
            "name" => &self.name,
            _ => &self.version,
        };
        value
            .clone()
            .ok_or_else(|| ReleaseError::ManifestAttributeMissing {
                attribute: attribute.to_string(),
            })
    }
}

/// The news buffer, when the reader sits directly inside `<news>`
fn news_buffer<'a>(
    news: &'a mut Option<String>,
    stack: &[String],
    in_metadata: bool,
) -> Option<&'a mut String> {
    if in_metadata && stack.len() == 3 && stack.last().map(String::as_str) == Some("news") {
        news.as_mut()
    } else {
        None
    }
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

fn attribute(element: &BytesStart<'_>, key: &str) -> ReleaseResult<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(parse_error)?;
        if attr.key.as_ref() == key.as_bytes() {
            let value = attr.unescape_value().map_err(parse_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn parse_error(error: impl std::fmt::Display) -> ReleaseError {
    ReleaseError::ManifestParse {
        path: Default::default(),
        message: error.to_string(),
    }
}
