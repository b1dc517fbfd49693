//! Pixel surfaces that maps render into.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tiles_common::{TilesError, TilesResult};
use tiny_skia::{IntSize, Pixmap};

use crate::png::create_png_auto;

/// A fixed-format ARGB pixel surface.
///
/// Pixels are stored premultiplied; accessors hand out straight RGBA.
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Allocate a transparent surface of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> TilesResult<Self> {
        let invalid =
            || TilesError::RenderError(format!("could not create {}x{} surface", width, height));
        let size = IntSize::from_wh(width, height).ok_or_else(invalid)?;
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(invalid)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| {
            TilesError::OutOfMemory(format!("cannot allocate {}x{} surface", width, height))
        })?;
        data.resize(len, 0);

        let pixmap = Pixmap::from_vec(data, size).ok_or_else(invalid)?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight RGBA value of a single pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Copy out the whole surface as straight RGBA rows.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        rgba
    }

    /// Encode the surface as a PNG image.
    pub fn encode_png(&self) -> TilesResult<Vec<u8>> {
        create_png_auto(
            &self.to_rgba(),
            self.width() as usize,
            self.height() as usize,
        )
        .map_err(TilesError::RenderError)
    }

    /// Encode the surface and write it to an arbitrary byte sink.
    pub fn write_png<W: Write>(&self, writer: &mut W) -> TilesResult<()> {
        let png = self.encode_png()?;
        writer
            .write_all(&png)
            .and_then(|_| writer.flush())
            .map_err(|e| TilesError::RenderError(format!("error writing png stream: {}", e)))
    }

    /// Encode the surface into a file at `path`.
    pub fn save_png(&self, path: impl AsRef<Path>) -> TilesResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            TilesError::RenderError(format!("error creating {}: {}", path.display(), e))
        })?;
        self.write_png(&mut BufWriter::new(file))
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = Surface::new(4, 3).unwrap();
        assert_eq!(surface.width(), 4);
        assert_eq!(surface.height(), 3);
        assert_eq!(surface.pixel(3, 2), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(4, 0), None);
        assert_eq!(surface.to_rgba().len(), 4 * 3 * 4);
    }

    #[test]
    fn test_zero_sized_surface_fails() {
        assert!(matches!(
            Surface::new(0, 10),
            Err(TilesError::RenderError(_))
        ));
    }

    #[test]
    fn test_write_png_signature() {
        let surface = Surface::new(2, 2).unwrap();
        let mut out = Vec::new();
        surface.write_png(&mut out).unwrap();
        assert_eq!(&out[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }
}
