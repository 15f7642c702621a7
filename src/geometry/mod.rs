//! Coordinate conversion between caller space and PDF user space.
//!
//! Callers (the editing UI) place things with the origin at the top-left corner
//! of the page and Y growing downwards. PDF user space has its origin at the
//! bottom-left corner of the MediaBox and Y growing upwards. Every caller
//! position goes through [`PageGeometry::to_native`] before it reaches a
//! content stream.

/// A position in caller space (top-left origin, Y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate, measured from the top edge
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_pagekit::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in PDF user space (lower-left corner plus size).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// X coordinate of the lower-left corner
    pub x: f32,
    /// Y coordinate of the lower-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from a `[llx, lly, urx, ury]` box, normalizing
    /// swapped corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_pagekit::geometry::Rect;
    ///
    /// let rect = Rect::from_box([0.0, 792.0, 612.0, 0.0]);
    /// assert_eq!(rect.y, 0.0);
    /// assert_eq!(rect.height, 792.0);
    /// ```
    pub fn from_box(b: [f32; 4]) -> Self {
        let (x0, x1) = if b[0] <= b[2] { (b[0], b[2]) } else { (b[2], b[0]) };
        let (y0, y1) = if b[1] <= b[3] { (b[1], b[3]) } else { (b[3], b[1]) };
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }
}

/// Native Y of an element's lower edge.
///
/// `element_height` is the font size for text and the rectangle height for
/// shapes.
///
/// ```
/// use pdf_pagekit::geometry::to_native_y;
///
/// // 12pt text placed 100pt below the top of a Letter page.
/// assert_eq!(to_native_y(792.0, 100.0, 12.0), 680.0);
/// ```
pub fn to_native_y(page_height: f32, caller_y: f32, element_height: f32) -> f32 {
    page_height - caller_y - element_height
}

/// The visible frame of one page, used to convert caller positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// The page MediaBox in user space.
    pub media_box: Rect,
}

impl PageGeometry {
    /// Geometry for a page with the given MediaBox.
    pub fn new(media_box: Rect) -> Self {
        Self { media_box }
    }

    /// Page width in points.
    pub fn width(&self) -> f32 {
        self.media_box.width
    }

    /// Page height in points.
    pub fn height(&self) -> f32 {
        self.media_box.height
    }

    /// Convert a caller position of an element with the given height into the
    /// native lower-left corner of that element.
    ///
    /// A MediaBox that does not start at the origin shifts both axes by its
    /// lower-left corner.
    ///
    /// The page's `/Rotate` is not applied: positions are in the unrotated
    /// page frame, so on a page displayed at 90 or 270 degrees the caller's
    /// top-left is not the viewer's top-left.
    pub fn to_native(&self, position: Point, element_height: f32) -> (f32, f32) {
        let x = self.media_box.x + position.x;
        let y = self.media_box.y + to_native_y(self.height(), position.y, element_height);
        (x, y)
    }

    /// Native rectangle for a caller-space box.
    pub fn to_native_rect(&self, position: Point, width: f32, height: f32) -> Rect {
        let (x, y) = self.to_native(position, height);
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter() -> PageGeometry {
        PageGeometry::new(Rect::new(0.0, 0.0, 612.0, 792.0))
    }

    #[test]
    fn test_to_native_y() {
        assert_eq!(to_native_y(792.0, 0.0, 0.0), 792.0);
        assert_eq!(to_native_y(792.0, 0.0, 20.0), 772.0);
        assert_eq!(to_native_y(792.0, 792.0, 0.0), 0.0);
    }

    #[test]
    fn test_text_position() {
        let (x, y) = letter().to_native(Point::new(72.0, 72.0), 12.0);
        assert_eq!(x, 72.0);
        assert_eq!(y, 708.0);
    }

    #[test]
    fn test_rect_position() {
        let rect = letter().to_native_rect(Point::new(10.0, 30.0), 100.0, 20.0);
        assert_eq!(rect, Rect::new(10.0, 742.0, 100.0, 20.0));
    }

    #[test]
    fn test_offset_media_box() {
        let geom = PageGeometry::new(Rect::from_box([10.0, 20.0, 210.0, 320.0]));
        let (x, y) = geom.to_native(Point::new(0.0, 0.0), 0.0);
        assert_eq!(x, 10.0);
        assert_eq!(y, 320.0);
    }

    #[test]
    fn test_from_box_normalizes() {
        let rect = Rect::from_box([612.0, 792.0, 0.0, 0.0]);
        assert_eq!(rect, Rect::new(0.0, 0.0, 612.0, 792.0));
    }
}
