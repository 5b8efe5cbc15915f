use anyhow::{Context, Result};
use std::{borrow::Cow, fs, path::Path};

pub const BACKGROUND: &str = "#111111";
pub const FOREGROUND: &str = "#eeeeee";
pub const GRID: &str = "#444444";
pub const ACCENT: &str = "#e91916";

/// Qualitative palette for categories and communities, cycled.
const PALETTE: [&str; 12] = [
  "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c", "#fdbf6f",
  "#ff7f00", "#cab2d6", "#6a3d9a", "#ffff99", "#b15928",
];

pub fn palette(i: usize) -> &'static str {
  PALETTE[i % PALETTE.len()]
}

/// Blue (-1) through white (0) to red (1).
pub fn diverging(value: f64) -> String {
  let v = value.max(-1.).min(1.);
  let (from, to) = if v < 0. {
    ([255., 255., 255.], [49., 54., 149.])
  } else {
    ([255., 255., 255.], [165., 0., 38.])
  };
  let t = v.abs();
  let channel = |i: usize| (from[i] + (to[i] - from[i]) * t).round() as u8;
  format!("#{:02x}{:02x}{:02x}", channel(0), channel(1), channel(2))
}

pub fn escape(text: &str) -> Cow<'_, str> {
  if !text.contains(&['&', '<', '>', '"'][..]) {
    return Cow::Borrowed(text);
  }
  Cow::Owned(
    text
      .replace('&', "&amp;")
      .replace('<', "&lt;")
      .replace('>', "&gt;")
      .replace('"', "&quot;"),
  )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
  Start,
  Middle,
  End,
}

impl Anchor {
  fn name(self) -> &'static str {
    match self {
      Self::Start => "start",
      Self::Middle => "middle",
      Self::End => "end",
    }
  }
}

/// Minimal SVG document writer, shapes are appended in drawing order.
pub struct Svg {
  width: f64,
  height: f64,
  body: String,
}

impl Svg {
  pub fn new(width: f64, height: f64) -> Self {
    let mut out = Self {
      width,
      height,
      body: String::new(),
    };
    out.rect(0., 0., width, height, BACKGROUND, None);
    out
  }

  pub fn width(&self) -> f64 {
    self.width
  }

  pub fn height(&self) -> f64 {
    self.height
  }

  pub fn rect(
    &mut self,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    fill: &str,
    stroke: Option<&str>,
  ) {
    self.body.push_str(&format!(
      "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"{}/>\n",
      x,
      y,
      width.max(0.),
      height.max(0.),
      fill,
      stroke_attrs(stroke),
    ));
  }

  pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, stroke: Option<&str>) {
    self.body.push_str(&format!(
      "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"{}/>\n",
      cx,
      cy,
      r,
      fill,
      stroke_attrs(stroke),
    ));
  }

  pub fn line(
    &mut self,
    from: [f64; 2],
    to: [f64; 2],
    stroke: &str,
    width: f64,
    dashed: bool,
  ) {
    self.body.push_str(&format!(
      "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{}\"{}/>\n",
      from[0],
      from[1],
      to[0],
      to[1],
      stroke,
      width,
      if dashed { " stroke-dasharray=\"6 4\"" } else { "" },
    ));
  }

  pub fn path(&mut self, d: &str, fill: &str, stroke: Option<&str>) {
    self.body.push_str(&format!(
      "<path d=\"{}\" fill=\"{}\"{}/>\n",
      d,
      fill,
      stroke_attrs(stroke)
    ));
  }

  pub fn text(
    &mut self,
    x: f64,
    y: f64,
    size: f64,
    anchor: Anchor,
    fill: &str,
    content: &str,
  ) {
    self.body.push_str(&format!(
      "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"sans-serif\" font-size=\"{}\" text-anchor=\"{}\" fill=\"{}\">{}</text>\n",
      x,
      y,
      size,
      anchor.name(),
      fill,
      escape(content),
    ));
  }

  /// Text rotated a quarter turn counter clockwise around its anchor.
  pub fn vertical_text(&mut self, x: f64, y: f64, size: f64, content: &str) {
    self.body.push_str(&format!(
      "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"sans-serif\" font-size=\"{}\" text-anchor=\"end\" fill=\"{}\" transform=\"rotate(-90 {:.2} {:.2})\">{}</text>\n",
      x,
      y,
      size,
      FOREGROUND,
      x,
      y,
      escape(content),
    ));
  }

  pub fn title(&mut self, content: &str) {
    let x = self.width / 2.;
    self.text(x, 32., 20., Anchor::Middle, FOREGROUND, content);
  }

  /// Group with the given opacity, closed by `end_group`.
  pub fn begin_group(&mut self, opacity: f64) {
    self
      .body
      .push_str(&format!("<g opacity=\"{}\">\n", opacity));
  }

  pub fn end_group(&mut self) {
    self.body.push_str("</g>\n");
  }

  pub fn finish(self) -> String {
    format!(
      "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n{}</svg>\n",
      self.body,
      w = self.width,
      h = self.height,
    )
  }

  pub fn save(self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, self.finish())
      .with_context(|| format!("failed to write {}", path.display()))
  }
}

fn stroke_attrs(stroke: Option<&str>) -> String {
  stroke.map_or_else(String::new, |s| {
    format!(" stroke=\"{}\" stroke-width=\"1\"", s)
  })
}

/// Nice tick values covering `[min, max]`, about `target` of them.
pub fn ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
  if !(max > min) || target == 0 {
    return vec![min];
  }
  let raw = (max - min) / target as f64;
  let magnitude = 10f64.powf(raw.log10().floor());
  let step = [1., 2., 5., 10.]
    .iter()
    .map(|m| m * magnitude)
    .find(|&s| s >= raw)
    .unwrap_or(10. * magnitude);
  let first = (min / step).ceil() as i64;
  let last = (max / step).floor() as i64;
  (first..=last).map(|i| i as f64 * step).collect()
}

/// Plain notation, few decimals for small values.
pub fn format_value(value: f64) -> String {
  if value == value.trunc() && value.abs() < 1e15 {
    format!("{}", value as i64)
  } else if value.abs() >= 1. {
    format!("{:.2}", value)
  } else {
    format!("{:.4}", value)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn document() {
    let mut svg = Svg::new(100., 50.);
    svg.text(1., 2., 10., Anchor::Start, FOREGROUND, "a < b & c");
    svg.circle(5., 5., 2., palette(13), Some("white"));
    let text = svg.finish();
    assert!(text.starts_with("<?xml"));
    assert!(text.contains("a &lt; b &amp; c"));
    assert!(text.contains(palette(1)));
    assert!(text.trim_end().ends_with("</svg>"));
  }

  #[test]
  fn colours() {
    assert_eq!(diverging(0.), "#ffffff");
    assert_eq!(diverging(1.), "#a50026");
    assert_eq!(diverging(-3.), "#313695");
  }

  #[test]
  fn tick_steps() {
    assert_eq!(ticks(0., 10., 5), vec![0., 2., 4., 6., 8., 10.]);
    assert_eq!(ticks(3., 3., 5), vec![3.]);
    assert_eq!(format_value(1500.), "1500");
    assert_eq!(format_value(0.25), "0.2500");
  }
}
