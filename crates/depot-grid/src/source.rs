//! The map-loading seam.
//!
//! The engine never reads map files itself. Whatever produces a
//! [`Layout`] (a preset generator, an ASCII literal, a host-side asset
//! loader) does so through [`MapSource`].

use crate::error::GridError;
use crate::layout::Layout;
use crate::preset::MapId;

/// A provider of warehouse layouts.
pub trait MapSource {
    /// Produce the layout.
    fn load(&self) -> Result<Layout, GridError>;
}

impl MapSource for MapId {
    fn load(&self) -> Result<Layout, GridError> {
        self.build()
    }
}

impl MapSource for Layout {
    fn load(&self) -> Result<Layout, GridError> {
        Ok(self.clone())
    }
}

/// An owned ASCII map, parsed on every [`load`](MapSource::load).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AsciiMap(pub String);

impl AsciiMap {
    /// Wrap map text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl MapSource for AsciiMap {
    fn load(&self) -> Result<Layout, GridError> {
        Layout::parse(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_are_object_safe() {
        let sources: Vec<Box<dyn MapSource>> = vec![
            Box::new(MapId::Tiny),
            Box::new(AsciiMap::new("x.g")),
        ];
        let widths: Vec<u32> = sources.iter().map(|s| s.load().unwrap().width()).collect();
        assert_eq!(widths, vec![10, 3]);
    }

    #[test]
    fn ascii_source_surfaces_parse_errors() {
        assert_eq!(AsciiMap::new("...").load(), Err(GridError::NoGoals));
    }
}
