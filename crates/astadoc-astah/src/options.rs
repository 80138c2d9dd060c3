//! Image and figure options.
//!
//! Options come from the directive attributes (`{#id .class width=480}`),
//! optionally extended by an `options="k=v&k2=v2"` attribute holding
//! percent-encoded query parameters. Query parameters are applied last, so
//! they win over plain attributes of the same name.

use std::collections::HashMap;
use std::fmt::Write;

use astadoc_renderer::directive::DirectiveArgs;
use astadoc_renderer::escape_html;
use percent_encoding::percent_decode_str;

const IMAGE_KEYS: &[&str] = &[
    "alt", "title", "width", "height", "scale", "align", "target", "class",
];
const FIGURE_KEYS: &[&str] = &["figclass", "figwidth"];

/// Image alignment, rendered as an `align-*` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

impl Align {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "middle" => Some(Self::Middle),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Top => "top",
            Self::Middle => "middle",
            Self::Bottom => "bottom",
        }
    }
}

/// CSS length: a number and an optional unit (`px` when absent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: &'static str,
}

impl Length {
    const UNITS: &[&str] = &["px", "em", "ex", "rem", "pt", "pc", "cm", "mm", "in", "vw", "%"];

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let split = value
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(value.len());
        let (number, unit) = value.split_at(split);
        let number: f64 = number.parse().ok()?;
        if !number.is_finite() || number < 0.0 {
            return None;
        }
        let unit = match unit.trim() {
            "" => "px",
            unit => Self::UNITS.iter().copied().find(|u| *u == unit)?,
        };
        Some(Self {
            value: number,
            unit,
        })
    }

    fn scaled(self, percent: u32) -> Self {
        Self {
            value: self.value * f64::from(percent) / 100.0,
            unit: self.unit,
        }
    }
}

impl std::fmt::Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// How the converted image is shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOptions {
    pub alt: Option<String>,
    pub title: Option<String>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    /// Percentage applied to width and height.
    pub scale: Option<u32>,
    pub align: Option<Align>,
    /// Wrap the image in a link to this URL.
    pub target: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

/// Figure wrapper settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FigureOptions {
    pub classes: Vec<String>,
    pub width: Option<Length>,
}

impl FigureOptions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.width.is_none()
    }

    /// Opening `<figure>` tag.
    #[must_use]
    pub fn open_tag(&self, id: Option<&str>) -> String {
        let mut tag = String::from("<figure");
        if let Some(id) = id {
            let _ = write!(tag, r#" id="{}""#, escape_html(id));
        }
        tag.push_str(r#" class="astah-figure"#);
        for class in &self.classes {
            tag.push(' ');
            tag.push_str(&escape_html(class));
        }
        tag.push('"');
        if let Some(width) = self.width {
            let _ = write!(tag, r#" style="width: {width}""#);
        }
        tag.push('>');
        tag
    }
}

/// Options of one directive, with the problems found while reading them.
#[derive(Debug, Default)]
pub struct DiagramOptions {
    pub image: ImageOptions,
    pub figure: FigureOptions,
    pub warnings: Vec<String>,
}

impl DiagramOptions {
    /// Read options from directive arguments.
    ///
    /// Unknown keys and invalid values are reported in `warnings` and
    /// otherwise ignored.
    #[must_use]
    pub fn from_args(args: &DirectiveArgs) -> Self {
        let mut options = Self::default();
        let attrs = merged_attrs(args);

        let mut keys: Vec<&String> = attrs.keys().collect();
        keys.sort();
        for key in keys {
            let value = attrs[key].as_str();
            options.apply(key, value);
        }

        options.image.id.clone_from(&args.id);
        options.image.classes.extend(args.classes.iter().cloned());
        options
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "alt" => self.image.alt = Some(value.to_owned()),
            "title" => self.image.title = Some(value.to_owned()),
            "width" => self.image.width = self.length(key, value),
            "height" => self.image.height = self.length(key, value),
            "scale" => match value.trim().trim_end_matches('%').parse::<u32>() {
                Ok(scale) => self.image.scale = Some(scale),
                Err(_) => self.invalid(key, value),
            },
            "align" => match Align::parse(value) {
                Some(align) => self.image.align = Some(align),
                None => self.invalid(key, value),
            },
            "target" => self.image.target = Some(value.to_owned()),
            "class" => self
                .image
                .classes
                .extend(value.split_whitespace().map(str::to_owned)),
            "figclass" => self
                .figure
                .classes
                .extend(value.split_whitespace().map(str::to_owned)),
            "figwidth" => self.figure.width = self.length(key, value),
            _ => self.warnings.push(format!(
                "unknown option '{key}' ignored (valid: {})",
                IMAGE_KEYS
                    .iter()
                    .chain(FIGURE_KEYS)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }

    fn length(&mut self, key: &str, value: &str) -> Option<Length> {
        let length = Length::parse(value);
        if length.is_none() {
            self.invalid(key, value);
        }
        length
    }

    fn invalid(&mut self, key: &str, value: &str) {
        self.warnings
            .push(format!("invalid value '{value}' for option '{key}' ignored"));
    }
}

/// Directive attributes with `options` expanded into them.
fn merged_attrs(args: &DirectiveArgs) -> HashMap<String, String> {
    let mut attrs: HashMap<String, String> = args
        .attrs
        .iter()
        .filter(|(key, _)| key.as_str() != "options")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    if let Some(query) = args.get("options") {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            attrs.insert(decode(key), decode(value));
        }
    }
    attrs
}

fn decode(s: &str) -> String {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

impl ImageOptions {
    /// Render the `<img>` tag for `src`.
    ///
    /// `dimensions` are the pixel size of the image file, used for `scale`
    /// when no explicit width or height is given.
    #[must_use]
    pub fn to_html(&self, src: &str, dimensions: Option<(u32, u32)>) -> String {
        let mut html = String::new();
        if let Some(target) = &self.target {
            let _ = write!(html, r#"<a class="image-reference" href="{}">"#, escape_html(target));
        }

        let _ = write!(html, r#"<img src="{}""#, escape_html(src));
        let _ = write!(
            html,
            r#" alt="{}""#,
            escape_html(self.alt.as_deref().unwrap_or_default())
        );
        if let Some(title) = &self.title {
            let _ = write!(html, r#" title="{}""#, escape_html(title));
        }
        if let Some(id) = &self.id {
            let _ = write!(html, r#" id="{}""#, escape_html(id));
        }

        let mut classes: Vec<String> = self.classes.iter().map(|c| escape_html(c)).collect();
        if let Some(align) = self.align {
            classes.push(format!("align-{}", align.as_str()));
        }
        if !classes.is_empty() {
            let _ = write!(html, r#" class="{}""#, classes.join(" "));
        }

        let style = self.style(dimensions);
        if !style.is_empty() {
            let _ = write!(html, r#" style="{style}""#);
        }
        html.push('>');

        if self.target.is_some() {
            html.push_str("</a>");
        }
        html
    }

    fn style(&self, dimensions: Option<(u32, u32)>) -> String {
        let (mut width, mut height) = (self.width, self.height);
        if let Some(scale) = self.scale {
            if width.is_none() && height.is_none() {
                if let Some((w, h)) = dimensions {
                    width = Some(Length { value: f64::from(w), unit: "px" });
                    height = Some(Length { value: f64::from(h), unit: "px" });
                }
            }
            width = width.map(|l| l.scaled(scale));
            height = height.map(|l| l.scaled(scale));
        }

        let mut style = Vec::new();
        if let Some(width) = width {
            style.push(format!("width: {width};"));
        }
        if let Some(height) = height {
            style.push(format!("height: {height};"));
        }
        style.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options(attrs: &str) -> DiagramOptions {
        DiagramOptions::from_args(&DirectiveArgs::parse("model.asta", attrs))
    }

    #[test]
    fn test_length_parse() {
        assert_eq!(Length::parse("480"), Some(Length { value: 480.0, unit: "px" }));
        assert_eq!(Length::parse("50%"), Some(Length { value: 50.0, unit: "%" }));
        assert_eq!(Length::parse("2.5em"), Some(Length { value: 2.5, unit: "em" }));
        assert_eq!(Length::parse("wide"), None);
        assert_eq!(Length::parse("10parsecs"), None);
        assert_eq!(Length::parse(""), None);
    }

    #[test]
    fn test_plain_img() {
        let html = ImageOptions::default().to_html("_images/astah-1.png", None);
        assert_eq!(html, r#"<img src="_images/astah-1.png" alt="">"#);
    }

    #[test]
    fn test_full_img() {
        let opts = options(r#"#order .wide alt="Order flow" title=Orders width=480 align=center target=https://example.com/"#);
        assert!(opts.warnings.is_empty());

        let html = opts.image.to_html("../_images/astah-1.png", None);
        assert_eq!(
            html,
            concat!(
                r#"<a class="image-reference" href="https://example.com/">"#,
                r#"<img src="../_images/astah-1.png" alt="Order flow" title="Orders" id="order""#,
                r#" class="wide align-center" style="width: 480px;"></a>"#
            )
        );
    }

    #[test]
    fn test_scale_explicit_size() {
        let opts = options("width=400 height=10em scale=50");
        assert_eq!(
            opts.image.to_html("a.png", Some((1000, 1000))),
            r#"<img src="a.png" alt="" style="width: 200px; height: 5em;">"#
        );
    }

    #[test]
    fn test_scale_uses_image_dimensions() {
        let opts = options("scale=50%");
        assert_eq!(
            opts.image.to_html("a.png", Some((640, 301))),
            r#"<img src="a.png" alt="" style="width: 320px; height: 150.5px;">"#
        );
        assert_eq!(opts.image.to_html("a.png", None), r#"<img src="a.png" alt="">"#);
    }

    #[test]
    fn test_options_query_wins() {
        let opts = options(r#"width=100 options="width=300&alt=Order%20flow&class=a+b""#);
        assert!(opts.warnings.is_empty());
        assert_eq!(opts.image.width, Length::parse("300"));
        assert_eq!(opts.image.alt.as_deref(), Some("Order flow"));
        assert_eq!(opts.image.classes, ["a", "b"]);
    }

    #[test]
    fn test_invalid_and_unknown_options() {
        let opts = options("align=diagonal width=huge border=1");
        assert_eq!(opts.image, ImageOptions::default());
        assert_eq!(opts.warnings.len(), 3);
        assert!(opts.warnings[0].starts_with("invalid value 'diagonal' for option 'align'"));
        assert!(opts.warnings[1].starts_with("unknown option 'border'"));
        assert!(opts.warnings[2].starts_with("invalid value 'huge' for option 'width'"));
    }

    #[test]
    fn test_figure_options() {
        let opts = options(".shadow figclass=\"wide boxed\" figwidth=80%");
        assert_eq!(opts.figure.classes, ["wide", "boxed"]);
        assert_eq!(opts.image.classes, ["shadow"]);
        assert_eq!(
            opts.figure.open_tag(Some("fig-1")),
            r#"<figure id="fig-1" class="astah-figure wide boxed" style="width: 80%">"#
        );
        assert_eq!(
            FigureOptions::default().open_tag(None),
            r#"<figure class="astah-figure">"#
        );
    }

    #[test]
    fn test_escaping() {
        let opts = options(r#"alt="<Order> & 'Item'" target="/a?b=1&c=2""#);
        let html = opts.image.to_html("x.png", None);
        assert!(html.contains(r#"alt="&lt;Order&gt; &amp; &#x27;Item&#x27;""#), "{html}");
        assert!(html.contains(r#"href="/a?b=1&amp;c=2""#), "{html}");
    }
}
