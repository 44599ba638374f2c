//! tiny-skia backed implementation of [`Renderer`].

use kurbo::{Affine, BezPath, PathEl, RoundedRect, Shape as KurboShape, Size};
use lessonboard_core::export::{
    ExportError, ExportResult, GridStyle, RasterImage, Renderer, Scene, parse_data_url,
};
use lessonboard_core::shapes::{Element, Image, ImageSource, Math, SerializableColor, Stroke};
use tiny_skia::{
    BlendMode, Color, ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder,
    Pixmap, PixmapPaint, Stroke as SkStroke, Transform,
};

/// Corner radius of the math container.
const MATH_CORNER_RADIUS: f64 = 5.0;

fn math_fill() -> SerializableColor {
    SerializableColor::new(0xf9, 0xf9, 0xf9, 255)
}

fn to_color(color: SerializableColor) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn to_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// Convert a kurbo path. Returns `None` for paths with no extent.
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Pen settings for one stroke.
struct Pen {
    color: SerializableColor,
    width: f64,
    rounded: bool,
    blend_mode: BlendMode,
}

impl Pen {
    fn new(color: SerializableColor, width: f64) -> Self {
        Self {
            color,
            width,
            rounded: false,
            blend_mode: BlendMode::SourceOver,
        }
    }

    fn rounded(mut self) -> Self {
        self.rounded = true;
        self
    }
}

/// Rasterizes scenes on the CPU.
///
/// Grid and elements are drawn on a transparent layer so eraser strokes
/// cut through both; the layer is then composited over the background.
/// Glyphs are not rendered: text and math labels are laid out by the host.
#[derive(Debug, Clone)]
pub struct SoftwareRenderer {
    /// Whether to anti-alias edges.
    pub anti_alias: bool,
}

impl Default for SoftwareRenderer {
    fn default() -> Self {
        Self { anti_alias: true }
    }
}

impl SoftwareRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn paint(&self, color: SerializableColor, blend_mode: BlendMode) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(to_color(color));
        paint.anti_alias = self.anti_alias;
        paint.blend_mode = blend_mode;
        paint
    }

    fn stroke(&self, pixmap: &mut Pixmap, path: &BezPath, pen: Pen, transform: Transform) {
        // Zero-width strokes draw nothing, unlike tiny-skia hairlines.
        if pen.width.is_nan() || pen.width <= 0.0 {
            return;
        }
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let (line_cap, line_join) = if pen.rounded {
            (LineCap::Round, LineJoin::Round)
        } else {
            (LineCap::Butt, LineJoin::Miter)
        };
        let stroke = SkStroke {
            width: pen.width as f32,
            line_cap,
            line_join,
            ..SkStroke::default()
        };
        let paint = self.paint(pen.color, pen.blend_mode);
        pixmap.stroke_path(&path, &paint, &stroke, transform, None);
    }

    fn fill(&self, pixmap: &mut Pixmap, path: &BezPath, color: SerializableColor, transform: Transform) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let paint = self.paint(color, BlendMode::SourceOver);
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    }

    fn draw_grid(&self, pixmap: &mut Pixmap, grid: &GridStyle, size: Size, transform: Transform) {
        if grid.spacing.is_nan() || grid.spacing <= 0.0 {
            log::debug!("Skipping grid with spacing {}", grid.spacing);
            return;
        }
        let mut path = BezPath::new();
        let mut x = 0.0;
        while x <= size.width {
            path.move_to((x, 0.0));
            path.line_to((x, size.height));
            x += grid.spacing;
        }
        let mut y = 0.0;
        while y <= size.height {
            path.move_to((0.0, y));
            path.line_to((size.width, y));
            y += grid.spacing;
        }
        self.stroke(pixmap, &path, Pen::new(grid.color, grid.line_width), transform);
    }

    /// Freehand and eraser ink. A single tap leaves a dot.
    fn draw_ink(&self, pixmap: &mut Pixmap, element: &Element, stroke: &Stroke, pen: Pen, transform: Transform) {
        match stroke.points.as_slice() {
            [] => {}
            [dot] => {
                let Some(circle) = PathBuilder::from_circle(
                    dot.x as f32,
                    dot.y as f32,
                    (pen.width / 2.0) as f32,
                ) else {
                    return;
                };
                let paint = self.paint(pen.color, pen.blend_mode);
                pixmap.fill_path(&circle, &paint, FillRule::Winding, transform, None);
            }
            _ => self.stroke(pixmap, &element.to_path(), pen, transform),
        }
    }

    fn draw_math(&self, pixmap: &mut Pixmap, math: &Math, transform: Transform) {
        let container = RoundedRect::from_rect(math.container(), MATH_CORNER_RADIUS).to_path(0.1);
        self.fill(pixmap, &container, math_fill(), transform);
        self.stroke(pixmap, &container, Pen::new(math.style.stroke_color, 1.0), transform);
    }

    fn draw_image(&self, pixmap: &mut Pixmap, image: &Image, transform: Transform) {
        let ImageSource::DataUri(uri) = &image.source else {
            log::warn!("Skipping image with unresolved cached source");
            return;
        };
        let Some((_, bytes)) = parse_data_url(uri) else {
            log::warn!("Skipping image with malformed data URL");
            return;
        };
        let decoded = match ::image::load_from_memory(&bytes) {
            Ok(decoded) => decoded.to_rgba8(),
            Err(e) => {
                log::warn!("Skipping undecodable image: {}", e);
                return;
            }
        };

        let (width, height) = decoded.dimensions();
        let Some(mut source) = Pixmap::new(width, height) else {
            return;
        };
        for (dst, px) in source.pixels_mut().iter_mut().zip(decoded.pixels()) {
            let [r, g, b, a] = px.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }

        let placement = image.rotation_affine()
            * Affine::translate(image.position.to_vec2())
            * Affine::scale_non_uniform(image.width / width as f64, image.height / height as f64);
        let paint = PixmapPaint {
            quality: FilterQuality::Nearest,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            transform.pre_concat(to_transform(placement)),
            None,
        );
    }

    fn draw_element(&self, pixmap: &mut Pixmap, element: &Element, transform: Transform) {
        match element {
            Element::Freehand(stroke) => {
                let pen = Pen::new(stroke.style.stroke_color, stroke.style.stroke_width).rounded();
                self.draw_ink(pixmap, element, stroke, pen, transform);
            }
            Element::Eraser(stroke) => {
                let mut pen = Pen::new(SerializableColor::black(), stroke.style.stroke_width * 2.0).rounded();
                pen.blend_mode = BlendMode::DestinationOut;
                self.draw_ink(pixmap, element, stroke, pen, transform);
            }
            Element::Line(line) => {
                let pen = Pen::new(line.style.stroke_color, line.style.stroke_width).rounded();
                self.stroke(pixmap, &element.to_path(), pen, transform);
            }
            Element::Rectangle(_) | Element::Ellipse(_) | Element::Triangle(_) => {
                let style = element.style();
                let pen = Pen::new(style.stroke_color, style.stroke_width);
                self.stroke(pixmap, &element.to_path(), pen, transform);
            }
            Element::Text(_) => {}
            Element::Image(image) => self.draw_image(pixmap, image, transform),
            Element::Math(math) => self.draw_math(pixmap, math, transform),
            Element::Solid(solid) => {
                let outline = solid.viewport().to_path(0.1);
                self.stroke(pixmap, &outline, Pen::new(solid.style.stroke_color, 1.0), transform);
            }
        }
    }
}

impl Renderer for SoftwareRenderer {
    fn render(&mut self, scene: &Scene) -> ExportResult<RasterImage> {
        let (width, height) = scene.pixel_size();
        if width == 0 || height == 0 {
            return Err(ExportError::InvalidDimensions { width, height });
        }
        let allocate = || {
            Pixmap::new(width, height).ok_or_else(|| {
                ExportError::RenderFailed(format!("cannot allocate {}x{} pixmap", width, height))
            })
        };

        let ratio = scene.pixel_ratio as f32;
        let transform = Transform::from_scale(ratio, ratio);

        let mut layer = allocate()?;
        if let Some(grid) = &scene.grid {
            self.draw_grid(&mut layer, grid, scene.size, transform);
        }
        for element in &scene.elements {
            self.draw_element(&mut layer, element, transform);
        }

        let mut output = allocate()?;
        output.fill(to_color(scene.background));
        output.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        log::debug!(
            "Rendered {} elements at {}x{}",
            scene.elements.len(),
            width,
            height
        );
        let rgba = output
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RasterImage::new(width, height, rgba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use lessonboard_core::export::data_url;
    use lessonboard_core::shapes::{ElementStyle, Line, Rectangle, Text};

    const RED: SerializableColor = SerializableColor {
        r: 255,
        g: 0,
        b: 0,
        a: 255,
    };

    fn assert_pixel(image: &RasterImage, x: u32, y: u32, expected: SerializableColor) {
        let actual = image.pixel(x, y).unwrap();
        let expected = [expected.r, expected.g, expected.b, expected.a];
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!(
                (*a as i16 - *e as i16).abs() <= 2,
                "pixel ({}, {}) is {:?}, expected {:?}",
                x,
                y,
                actual,
                expected
            );
        }
    }

    fn scene(width: f64, height: f64, elements: Vec<Element>) -> Scene {
        Scene::new(Size::new(width, height), elements)
    }

    fn line(from: (f64, f64), to: (f64, f64), color: SerializableColor, width: f64) -> Element {
        let mut line = Line::new(Point::new(from.0, from.1), Point::new(to.0, to.1));
        line.style = ElementStyle::new(color, width);
        Element::Line(line)
    }

    #[test]
    fn test_background_fill() {
        let scene = scene(10.0, 10.0, Vec::new()).with_background(SerializableColor::black());
        let image = SoftwareRenderer::new().render(&scene).unwrap();
        assert_eq!((image.width, image.height), (10, 10));
        assert_pixel(&image, 5, 5, SerializableColor::black());
    }

    #[test]
    fn test_pixel_ratio_scales_output() {
        let scene = scene(10.0, 8.0, Vec::new()).with_pixel_ratio(2.0);
        let image = SoftwareRenderer::new().render(&scene).unwrap();
        assert_eq!((image.width, image.height), (20, 16));
    }

    #[test]
    fn test_empty_scene_size_is_error() {
        let result = SoftwareRenderer::new().render(&scene(0.0, 10.0, Vec::new()));
        assert!(matches!(
            result,
            Err(ExportError::InvalidDimensions { width: 0, .. })
        ));
    }

    #[test]
    fn test_line_is_stroked() {
        let scene = scene(20.0, 20.0, vec![line((0.0, 10.0), (20.0, 10.0), RED, 4.0)]);
        let image = SoftwareRenderer::new().render(&scene).unwrap();
        assert_pixel(&image, 10, 10, RED);
        assert_pixel(&image, 10, 2, SerializableColor::white());
    }

    #[test]
    fn test_rectangle_is_outlined() {
        let mut rect = Rectangle::new(Point::new(10.0, 10.0), 20.0, 20.0);
        rect.style = ElementStyle::new(RED, 2.0);
        let scene = scene(40.0, 40.0, vec![Element::Rectangle(rect)]);
        let image = SoftwareRenderer::new().render(&scene).unwrap();
        assert_pixel(&image, 10, 20, RED);
        assert_pixel(&image, 20, 20, SerializableColor::white());
    }

    #[test]
    fn test_eraser_reveals_background() {
        let mut eraser = Stroke::from_points(vec![Point::new(0.0, 10.0), Point::new(20.0, 10.0)]);
        eraser.style = ElementStyle::new(SerializableColor::black(), 4.0);
        let scene = scene(
            20.0,
            20.0,
            vec![
                line((0.0, 10.0), (20.0, 10.0), SerializableColor::black(), 6.0),
                Element::Eraser(eraser),
            ],
        );
        let image = SoftwareRenderer::new().render(&scene).unwrap();
        assert_pixel(&image, 10, 10, SerializableColor::white());
    }

    #[test]
    fn test_grid_lines() {
        let grid = GridStyle {
            spacing: 20.0,
            color: SerializableColor::black(),
            line_width: 2.0,
        };
        let scene = scene(41.0, 41.0, Vec::new()).with_grid(Some(grid));
        let image = SoftwareRenderer::new().render(&scene).unwrap();
        assert_pixel(&image, 20, 5, SerializableColor::black());
        assert_pixel(&image, 10, 10, SerializableColor::white());
    }

    #[test]
    fn test_image_is_scaled_into_place() {
        let png = RasterImage::filled(2, 2, RED).unwrap().to_png().unwrap();
        let mut image = Image::new(
            Point::ZERO,
            ImageSource::DataUri(data_url("image/png", &png)),
            2,
            2,
        );
        image.width = 10.0;
        image.height = 10.0;
        let scene = scene(20.0, 20.0, vec![Element::Image(image)]);
        let raster = SoftwareRenderer::new().render(&scene).unwrap();
        assert_pixel(&raster, 5, 5, RED);
        assert_pixel(&raster, 15, 15, SerializableColor::white());
    }

    #[test]
    fn test_broken_image_is_skipped() {
        let image = Image::new(
            Point::ZERO,
            ImageSource::DataUri("data:image/png;base64,AAAA".to_string()),
            2,
            2,
        );
        let scene = scene(10.0, 10.0, vec![Element::Image(image)]);
        let raster = SoftwareRenderer::new().render(&scene).unwrap();
        assert_pixel(&raster, 1, 1, SerializableColor::white());
    }

    #[test]
    fn test_math_container_fill() {
        let scene = scene(200.0, 100.0, vec![Element::Math(Math::new(Point::ZERO, "x^2"))]);
        let image = SoftwareRenderer::new().render(&scene).unwrap();
        assert_pixel(&image, 75, 40, math_fill());
    }

    #[test]
    fn test_text_draws_no_glyphs() {
        let scene = scene(50.0, 50.0, vec![Element::Text(Text::new(Point::ZERO, "Hello"))]);
        let image = SoftwareRenderer::new().render(&scene).unwrap();
        assert_pixel(&image, 5, 5, SerializableColor::white());
    }
}
