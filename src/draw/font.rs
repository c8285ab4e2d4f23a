//! Font descriptor and text measurement.

/// Line height multiplier applied to the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.3;

/// Font configuration for text rendering.
///
/// Describes which font to use, including family name, weight, and style.
/// The same descriptor is used for measuring text at commit time and for
/// painting it during replay, so both agree on block dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// Font family name (e.g., "Sans", "Monospace", "JetBrains Mono")
    pub family: String,

    /// Font weight (e.g., "normal", "bold", "light" or numeric 100-900)
    pub weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    pub style: String,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            weight: "normal".to_string(),
            style: "normal".to_string(),
        }
    }
}

impl FontDescriptor {
    /// Creates a new font descriptor with the specified parameters.
    pub fn new(family: String, weight: String, style: String) -> Self {
        Self {
            family,
            weight,
            style,
        }
    }

    /// Converts this font descriptor to a Pango font description string.
    ///
    /// Format: "Family Style Weight Size", e.g. "Sans Bold 32".
    pub fn to_pango_string(&self, size: f64) -> String {
        let mut parts = vec![self.family.clone()];

        if !self.style.eq_ignore_ascii_case("normal") {
            parts.push(capitalize_first(&self.style));
        }

        if !self.weight.eq_ignore_ascii_case("normal") {
            parts.push(capitalize_first(&self.weight));
        }

        // Pango sizes are in points; annotation sizes are pixels.
        parts.push(format!("{}px", size.round() as i32));

        parts.join(" ")
    }

    /// Builds a Pango layout on `ctx` configured for this font at `size`.
    pub fn layout(&self, ctx: &cairo::Context, size: f64) -> pango::Layout {
        let layout = pangocairo::functions::create_layout(ctx);
        let font_desc = pango::FontDescription::from_string(&self.to_pango_string(size));
        layout.set_font_description(Some(&font_desc));
        layout
    }
}

/// Height of one text line for a given font size: `round(size × 1.3)`.
pub fn line_height(size: f64) -> f64 {
    (size * LINE_HEIGHT_FACTOR).round()
}

/// Measured dimensions of a (possibly multi-line) text value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

/// Measures `text` as it will be painted: the widest line by the line count
/// times [`line_height`].
pub fn measure_text(text: &str, size: f64, font: &FontDescriptor) -> TextMetrics {
    let line_count = text.split('\n').count();
    let width = widest_line(text, size, font).unwrap_or_else(|| {
        log::warn!("Text measurement unavailable; estimating width from character count");
        estimate_width(text, size)
    });

    TextMetrics {
        width,
        height: line_height(size) * line_count as f64,
    }
}

fn widest_line(text: &str, size: f64, font: &FontDescriptor) -> Option<f64> {
    // A 1x1 surface is enough; only the layout extents are used.
    let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 1, 1).ok()?;
    let ctx = cairo::Context::new(&surface).ok()?;
    let layout = font.layout(&ctx, size);

    let scale = pango::SCALE as f64;
    let widest = text
        .split('\n')
        .map(|line| {
            layout.set_text(line);
            let (_ink, logical) = layout.extents();
            logical.width() as f64 / scale
        })
        .fold(0.0, f64::max);

    Some(widest)
}

fn estimate_width(text: &str, size: f64) -> f64 {
    let longest = text
        .split('\n')
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    longest as f64 * size * 0.6
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
