//! Styles: key/value directives and the drawing verbs they are bound to.
//!
//! A fixed table maps style keys onto verbs. Callers apply an ordered subset
//! of keys at each drawing stage; a key is only applied when the rule
//! defines it, and omitted keys are skipped silently.

use serde::{Deserialize, Serialize};
use tiles_common::Color;
use tiny_skia::{LineCap, LineJoin};

use crate::context::Context;
use crate::text::{TextAttribute, TextLayout, LAYOUT_SCALE};

/// Key read directly by the point dispatcher rather than through the verb table.
pub const RADIUS: &str = "radius";

/// A single styling directive, e.g. `fill` = `#ff0000`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    key: String,
    arg: String,
}

impl Style {
    pub fn new(key: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            arg: arg.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn arg(&self) -> &str {
        &self.arg
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    pub fn set_arg(&mut self, arg: impl Into<String>) {
        self.arg = arg.into();
    }
}

/// Whatever a verb mutates: the drawing context, or a label's text layout.
pub enum StyleTarget<'a> {
    Context(&'a mut Context),
    Layout(&'a mut TextLayout),
}

/// A drawing verb. Verbs ignore targets they have no meaning for.
pub type StyleVerb = fn(&mut StyleTarget<'_>, &str);

static STYLE_TABLE: &[(&str, StyleVerb)] = &[
    ("fill", fill),
    ("stroke", stroke),
    ("weight", weight),
    ("line-cap", line_cap),
    ("color", fill),
    ("text-outline-color", stroke),
    ("text-outline-weight", weight),
    ("letter-spacing", letter_spacing),
    ("paint", paint),
    ("line-join", line_join),
];

/// Find the verb registered for `key`.
pub fn lookup_verb(key: &str) -> Option<StyleVerb> {
    STYLE_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, verb)| *verb)
}

/// First style in insertion order whose key matches.
pub fn lookup_style<'a>(styles: &'a [Style], key: &str) -> Option<&'a Style> {
    styles.iter().find(|style| style.key == key)
}

/// Apply `keys` in order, each one only if it has a verb and `styles` defines it.
pub fn apply_styles(target: &mut StyleTarget<'_>, styles: &[Style], keys: &[&str]) {
    for key in keys {
        let Some(verb) = lookup_verb(key) else {
            continue;
        };
        let Some(style) = lookup_style(styles, key) else {
            continue;
        };
        verb(target, &style.arg);
    }
}

/// Parse the leading decimal number of `arg`, or 0 when there is none.
pub fn parse_number(arg: &str) -> f64 {
    let s = arg.trim_start();
    let bytes = s.as_bytes();
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let mantissa_start = end;
    end = digits(end);
    let int_digits = end - mantissa_start;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        end = digits(frac_start);
        frac_digits = end - frac_start;
    }
    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

/// Parse the leading integer of `arg`, or 0 when there is none.
pub fn parse_integer(arg: &str) -> i32 {
    let s = arg.trim_start();
    let bytes = s.as_bytes();
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    s[..end].parse().unwrap_or(0)
}

/// Set the source color from a `#RRGGBB[AA]` argument; anything else is ignored.
fn set_color(ctx: &mut Context, arg: &str) {
    if let Some(color) = Color::from_hex(arg) {
        let [r, g, b, a] = color.to_f32_array();
        ctx.set_source_rgba(r as f64, g as f64, b as f64, a as f64);
    }
}

fn fill(target: &mut StyleTarget<'_>, arg: &str) {
    if let StyleTarget::Context(ctx) = target {
        set_color(ctx, arg);
        ctx.fill_preserve();
    }
}

fn stroke(target: &mut StyleTarget<'_>, arg: &str) {
    if let StyleTarget::Context(ctx) = target {
        set_color(ctx, arg);
        ctx.stroke_preserve();
    }
}

/// Paint an overlay color across the clip region.
fn paint(target: &mut StyleTarget<'_>, arg: &str) {
    if let StyleTarget::Context(ctx) = target {
        set_color(ctx, arg);
        ctx.paint();
    }
}

/// Line width given in device pixels.
fn weight(target: &mut StyleTarget<'_>, arg: &str) {
    if let StyleTarget::Context(ctx) = target {
        let (width, _) = ctx.device_to_user_distance(parse_number(arg), 0.0);
        ctx.set_line_width(width);
    }
}

fn line_cap(target: &mut StyleTarget<'_>, arg: &str) {
    if let StyleTarget::Context(ctx) = target {
        match arg {
            "butt" => ctx.set_line_cap(LineCap::Butt),
            "round" => ctx.set_line_cap(LineCap::Round),
            "square" => ctx.set_line_cap(LineCap::Square),
            _ => {}
        }
    }
}

fn line_join(target: &mut StyleTarget<'_>, arg: &str) {
    if let StyleTarget::Context(ctx) = target {
        match arg {
            "miter" => ctx.set_line_join(LineJoin::Miter),
            "round" => ctx.set_line_join(LineJoin::Round),
            "bevel" => ctx.set_line_join(LineJoin::Bevel),
            _ => {}
        }
    }
}

fn letter_spacing(target: &mut StyleTarget<'_>, arg: &str) {
    if let StyleTarget::Layout(layout) = target {
        let spacing = parse_integer(arg).saturating_mul(LAYOUT_SCALE);
        layout.insert_attribute(TextAttribute::LetterSpacing(spacing));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    fn context() -> Context {
        Context::new(Surface::new(10, 10).unwrap())
    }

    fn square(ctx: &mut Context) {
        ctx.move_to(0.0, 0.0);
        ctx.line_to(10.0, 0.0);
        ctx.line_to(10.0, 10.0);
        ctx.line_to(0.0, 10.0);
        ctx.close_path();
    }

    #[test]
    fn test_lookup_returns_first_match() {
        let styles = vec![
            Style::new("fill", "#ff0000"),
            Style::new("stroke", "#000000"),
            Style::new("fill", "#00ff00"),
        ];
        assert_eq!(lookup_style(&styles, "fill").unwrap().arg(), "#ff0000");
        assert!(lookup_style(&styles, "weight").is_none());
    }

    #[test]
    fn test_registry_aliases() {
        for key in [
            "fill",
            "color",
            "stroke",
            "text-outline-color",
            "weight",
            "text-outline-weight",
            "paint",
        ] {
            assert!(lookup_verb(key).is_some(), "{} should be registered", key);
        }
        assert!(lookup_verb("line-cap").is_some());
        assert!(lookup_verb("line-join").is_some());
        assert!(lookup_verb("letter-spacing").is_some());
        assert!(lookup_verb(RADIUS).is_none());
        assert!(lookup_verb("opacity").is_none());
    }

    #[test]
    fn test_aliases_draw_like_their_verbs() {
        let pairs = [
            ("color", "fill", "#ff8000"),
            ("text-outline-color", "stroke", "#00ff00"),
            ("text-outline-weight", "weight", "3.5"),
        ];
        for (alias, verb, arg) in pairs {
            let mut via_alias = context();
            square(&mut via_alias);
            apply_styles(
                &mut StyleTarget::Context(&mut via_alias),
                &[Style::new(alias, arg)],
                &[alias],
            );

            let mut direct = context();
            square(&mut direct);
            apply_styles(
                &mut StyleTarget::Context(&mut direct),
                &[Style::new(verb, arg)],
                &[verb],
            );

            assert_eq!(via_alias.source_rgba(), direct.source_rgba(), "{}", alias);
            assert_eq!(via_alias.line_width(), direct.line_width(), "{}", alias);
            assert_eq!(via_alias.surface().to_rgba(), direct.surface().to_rgba(), "{}", alias);
        }
    }

    #[test]
    fn test_apply_in_caller_order() {
        let mut ctx = context();
        square(&mut ctx);
        let styles = vec![
            Style::new("stroke", "#0000ff"),
            Style::new("fill", "#ff0000"),
        ];
        // fill applied after stroke sets the final source color
        apply_styles(&mut StyleTarget::Context(&mut ctx), &styles, &["stroke", "fill"]);
        assert_eq!(ctx.source_rgba(), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(ctx.surface().pixel(5, 5), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_missing_keys_are_skipped() {
        let mut ctx = context();
        let styles = vec![Style::new("weight", "4")];
        apply_styles(
            &mut StyleTarget::Context(&mut ctx),
            &styles,
            &["fill", "radius", "bogus", "weight"],
        );
        assert_eq!(ctx.line_width(), 4.0);
        assert_eq!(ctx.surface().pixel(5, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_invalid_color_keeps_previous_source() {
        let mut ctx = context();
        ctx.set_source_rgba(0.0, 1.0, 0.0, 1.0);
        square(&mut ctx);
        let styles = vec![Style::new("fill", "#f00")];
        apply_styles(&mut StyleTarget::Context(&mut ctx), &styles, &["fill"]);
        assert_eq!(ctx.source_rgba(), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(ctx.surface().pixel(5, 5), Some([0, 255, 0, 255]));
    }

    #[test]
    fn test_weight_is_device_units() {
        let mut ctx = context();
        ctx.scale(2.0, 2.0);
        let styles = vec![Style::new("weight", "3")];
        apply_styles(&mut StyleTarget::Context(&mut ctx), &styles, &["weight"]);
        assert_eq!(ctx.line_width(), 1.5);
    }

    #[test]
    fn test_line_settings() {
        let mut ctx = context();
        let styles = vec![
            Style::new("line-join", "round"),
            Style::new("line-cap", "square"),
        ];
        apply_styles(
            &mut StyleTarget::Context(&mut ctx),
            &styles,
            &["line-join", "line-cap"],
        );
        assert_eq!(ctx.line_join(), LineJoin::Round);
        assert_eq!(ctx.line_cap(), LineCap::Square);

        let unknown = vec![Style::new("line-join", "wobbly")];
        apply_styles(&mut StyleTarget::Context(&mut ctx), &unknown, &["line-join"]);
        assert_eq!(ctx.line_join(), LineJoin::Round);
    }

    #[test]
    fn test_paint_covers_surface() {
        let mut ctx = context();
        let styles = vec![Style::new("paint", "#0000ff80")];
        apply_styles(&mut StyleTarget::Context(&mut ctx), &styles, &["paint"]);
        let [_, _, b, a] = ctx.surface().pixel(0, 9).unwrap();
        assert_eq!(a, 0x80);
        assert!(b >= 254);
    }

    #[test]
    fn test_letter_spacing_targets_layout() {
        let mut layout = TextLayout::new("label");
        let styles = vec![Style::new("letter-spacing", "3px")];
        apply_styles(&mut StyleTarget::Layout(&mut layout), &styles, &["letter-spacing"]);
        assert_eq!(layout.letter_spacing(), Some(3 * LAYOUT_SCALE));

        // context-only verbs leave a layout alone
        let paint = vec![Style::new("fill", "#ff0000")];
        apply_styles(&mut StyleTarget::Layout(&mut layout), &paint, &["fill"]);
        assert_eq!(layout.attributes().map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_parse_number_is_permissive() {
        assert_eq!(parse_number("2"), 2.0);
        assert_eq!(parse_number(" 2.5px"), 2.5);
        assert_eq!(parse_number("-.5"), -0.5);
        assert_eq!(parse_number("1e2"), 100.0);
        assert_eq!(parse_number("3e"), 3.0);
        assert_eq!(parse_number("wide"), 0.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("-"), 0.0);
        assert_eq!(parse_number("."), 0.0);
    }

    #[test]
    fn test_parse_integer_is_permissive() {
        assert_eq!(parse_integer("12"), 12);
        assert_eq!(parse_integer("-4.7"), -4);
        assert_eq!(parse_integer("x"), 0);
    }

    #[test]
    fn test_style_setters_replace_wholesale() {
        let mut style = Style::new("fill", "#ff0000");
        style.set_key("stroke");
        style.set_arg("#000000");
        assert_eq!(style, Style::new("stroke", "#000000"));
    }
}
