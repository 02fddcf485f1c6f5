//! Genome document parser
//!
//! Reads `<flame>` elements into [`Flame`]s. Attribute values are typed loosely
//! ([`AttrValue::parse`]); the well-known header attributes are checked and moved
//! into typed fields, everything else is kept verbatim.
//!
//! After the structure is built, the document's scale is converted to the internal
//! percent-of-width unit, a `<symmetry>` directive is expanded, the legacy-format
//! migrator runs and the default color attributes are filled in.

use crate::chaos::{Chaos, ChaosError};
use crate::compat;
use crate::flame::{Flame, HEADER_FIELDS};
use crate::geometry::to_byte;
use crate::palette::{Palette, PaletteError, PALETTE_SIZE};
use crate::value::AttrValue;
use crate::xform::{Coefs, Triangle, Xform, XformId};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

/// Scale used when a document's scale is not positive.
const FALLBACK_SCALE: f64 = 10.0;

/// Errors that abort parsing a document. No partial flame is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("XML error: {0}")]
    Xml(String),
    #[error("no <flame> element found")]
    NoFlame,
    #[error("more than one final xform found")]
    MultipleFinal,
    #[error("palette must contain {expected} entries, found {found}")]
    PaletteCount { expected: usize, found: usize },
    #[error("unsupported palette format '{0}' (only RGB is supported)")]
    UnsupportedPaletteFormat(String),
    #[error("<palette> element is missing its count attribute")]
    MissingPaletteCount,
    #[error("{values} chaos values given but the flame only has {xforms} xforms")]
    TooManyChaosValues { values: usize, xforms: usize },
    #[error("chaos weight must be non-negative, got {0}")]
    NegativeChaos(f64),
    #[error("invalid {attribute}=\"{value}\" on <{element}>: {reason}")]
    InvalidAttribute { element: String, attribute: String, value: String, reason: String },
}

impl From<ChaosError> for ParseError {
    fn from(err: ChaosError) -> Self {
        match err {
            ChaosError::NegativeWeight(w) => ParseError::NegativeChaos(w),
            ChaosError::TooManyValues { values, xforms } => {
                ParseError::TooManyChaosValues { values, xforms }
            }
        }
    }
}

fn xml_err(err: impl std::fmt::Display) -> ParseError {
    ParseError::Xml(err.to_string())
}

fn invalid(element: &str, attribute: &str, value: &str, reason: &str) -> ParseError {
    ParseError::InvalidAttribute {
        element: element.to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

type Attributes = Vec<(String, String)>;

fn element_name(elem: &BytesStart) -> Result<String, ParseError> {
    std::str::from_utf8(elem.name().as_ref()).map(str::to_string).map_err(xml_err)
}

/// Attributes of an element, in document order, with entities resolved.
fn parse_attributes(elem: &BytesStart) -> Result<Attributes, ParseError> {
    let mut attrs = Vec::new();
    for attr_result in elem.attributes() {
        let attr = attr_result.map_err(xml_err)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(xml_err)?.to_string();
        let value = attr.unescape_value().map_err(xml_err)?.into_owned();
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn get<'a>(attrs: &'a Attributes, name: &str) -> Option<&'a str> {
    attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

fn numbers(element: &str, attribute: &str, value: &str, len: usize) -> Result<Vec<f64>, ParseError> {
    let parsed: Result<Vec<f64>, _> = value.split_whitespace().map(str::parse).collect();
    match parsed {
        Ok(v) if v.len() == len => Ok(v),
        Ok(v) => Err(invalid(element, attribute, value, &format!("expected {} numbers, got {}", len, v.len()))),
        Err(_) => Err(invalid(element, attribute, value, "not a list of numbers")),
    }
}

fn six(element: &str, attribute: &str, value: &str) -> Result<[f64; 6], ParseError> {
    let v = numbers(element, attribute, value, 6)?;
    Ok([v[0], v[1], v[2], v[3], v[4], v[5]])
}

/// Raw children of one `<flame>` element.
#[derive(Default)]
struct FlameElement {
    header: Attributes,
    xforms: Vec<Attributes>,
    final_xform: Option<Attributes>,
    palette: Option<(Attributes, String)>,
    colors: Vec<Attributes>,
    symmetry: Option<Attributes>,
}

impl FlameElement {
    fn add_child(&mut self, name: &str, attrs: Attributes) -> Result<(), ParseError> {
        match name {
            "xform" => self.xforms.push(attrs),
            "finalxform" => {
                if self.final_xform.is_some() {
                    return Err(ParseError::MultipleFinal);
                }
                self.final_xform = Some(attrs);
            }
            "color" => self.colors.push(attrs),
            "symmetry" => self.symmetry = Some(attrs),
            "palette" => self.palette = Some((attrs, String::new())),
            other => warn!(element = other, "skipping unknown flame child element"),
        }
        Ok(())
    }
}

/// Read the children of a `<flame>` start tag up to its matching end tag.
fn read_flame_element(reader: &mut Reader<&[u8]>, start: &BytesStart, empty: bool) -> Result<FlameElement, ParseError> {
    let mut flame = FlameElement { header: parse_attributes(start)?, ..Default::default() };
    if empty {
        return Ok(flame);
    }
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Empty(e) => {
                let name = element_name(&e)?;
                flame.add_child(&name, parse_attributes(&e)?)?;
            }
            Event::Start(e) => {
                let name = element_name(&e)?;
                flame.add_child(&name, parse_attributes(&e)?)?;
                if name == "palette" {
                    let text = read_text(reader)?;
                    if let Some((_, body)) = flame.palette.as_mut() {
                        *body = text;
                    }
                } else {
                    reader.read_to_end(e.name()).map_err(xml_err)?;
                }
            }
            Event::End(_) => return Ok(flame),
            Event::Eof => return Err(ParseError::Xml("unexpected end of document inside <flame>".to_string())),
            _ => {}
        }
    }
}

/// Concatenated text content up to the closing tag of the current element.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, ParseError> {
    let mut text = String::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Text(t) => {
                text.push_str(&t.unescape().map_err(xml_err)?);
                text.push('\n');
            }
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return Ok(text),
            Event::End(_) => depth -= 1,
            Event::Eof => return Err(ParseError::Xml("unexpected end of document inside <palette>".to_string())),
            _ => {}
        }
    }
}

fn build_palette(element: &FlameElement) -> Result<Palette, ParseError> {
    let entries = match &element.palette {
        Some((attrs, body)) => {
            let count = get(attrs, "count").ok_or(ParseError::MissingPaletteCount)?;
            let count: usize =
                count.trim().parse().map_err(|_| invalid("palette", "count", count, "not an integer"))?;
            if count != PALETTE_SIZE {
                return Err(ParseError::PaletteCount { expected: PALETTE_SIZE, found: count });
            }
            let format = get(attrs, "format").unwrap_or("RGB");
            if !format.trim().eq_ignore_ascii_case("rgb") {
                return Err(ParseError::UnsupportedPaletteFormat(format.to_string()));
            }
            Palette::decode_hex(body)
        }
        None => element
            .colors
            .iter()
            .map(|attrs| -> Result<[u8; 3], ParseError> {
                let rgb = get(attrs, "rgb").ok_or_else(|| invalid("color", "rgb", "", "missing"))?;
                let v = numbers("color", "rgb", rgb, 3)?;
                Ok([to_byte(v[0]), to_byte(v[1]), to_byte(v[2])])
            })
            .collect::<Result<Vec<_>, ParseError>>()?,
    };
    Palette::from_entries(entries).map_err(|err| match err {
        PaletteError::WrongLength(found) => ParseError::PaletteCount { expected: PALETTE_SIZE, found },
        other => ParseError::Xml(other.to_string()),
    })
}

/// Apply the attributes of an `<xform>`/`<finalxform>` element.
fn apply_xform_attributes(
    xform: &mut Xform,
    element: &str,
    attrs: &Attributes,
    targets: &[XformId],
) -> Result<(), ParseError> {
    for (name, value) in attrs {
        match name.as_str() {
            "coefs" => xform.set_screen_coefs(six(element, name, value)?),
            "post" => xform.post.set_coefs(Coefs::from_screen(six(element, name, value)?)),
            "chaos" => {
                if targets.is_empty() && element == "finalxform" {
                    debug!("ignoring chaos on final xform");
                    continue;
                }
                let values: Result<Vec<f64>, _> = value.split_whitespace().map(str::parse).collect();
                let values = values.map_err(|_| invalid(element, name, value, "not a list of numbers"))?;
                xform.chaos = Chaos::from_values(targets, &values)?;
            }
            _ => xform.set(name, AttrValue::parse(value)),
        }
    }
    Ok(())
}

fn header_numbers(value: &str, len: usize) -> Option<Vec<f64>> {
    let v: Vec<f64> = value.split_whitespace().map(str::parse).collect::<Result<_, _>>().ok()?;
    (v.len() == len).then_some(v)
}

/// Move a header attribute into its typed field, or into `extra`.
///
/// A value that does not fit its typed field leaves the field at its default
/// and is kept in `extra`, so it is written back as found. Returns whether the
/// typed field was set.
fn apply_header_attribute(flame: &mut Flame, name: &str, value: &str) -> bool {
    let number = || value.trim().parse::<f64>().ok();
    let applied = match name {
        "name" => {
            flame.name = value.to_string();
            Some(())
        }
        "version" => {
            flame.version = Some(value.to_string());
            Some(())
        }
        "size" => header_numbers(value, 2)
            .filter(|v| v.iter().all(|n| *n >= 0.0 && n.fract() == 0.0))
            .map(|v| flame.size = (v[0] as u32, v[1] as u32)),
        "center" => header_numbers(value, 2).map(|v| flame.center = (v[0], v[1])),
        "background" => header_numbers(value, 3).map(|v| flame.background = [v[0], v[1], v[2]]),
        "scale" => number().map(|n| flame.scale = n),
        "rotate" => number().map(|n| flame.rotate = n),
        "brightness" => number().map(|n| flame.brightness = n),
        "gamma" => number().map(|n| flame.gamma = n),
        "gamma_threshold" => number().map(|n| flame.gamma_threshold = n),
        "vibrancy" => number().map(|n| flame.vibrancy = n),
        "highlight_power" => number().map(|n| flame.highlight_power = n),
        _ => None,
    };
    if applied.is_none() {
        if HEADER_FIELDS.contains(&name) {
            warn!(attribute = name, value, "header value does not fit its field, keeping it verbatim");
        }
        flame.extra.set(name, AttrValue::parse(value));
    }
    applied.is_some()
}

fn build_flame(element: FlameElement) -> Result<Flame, ParseError> {
    let mut flame = Flame::new();
    // An absent version marks a legacy document
    flame.version = None;
    flame.gradient = build_palette(&element)?;

    // Every id must exist before any chaos row refers to it
    let ids: Vec<_> = element.xforms.iter().map(|_| flame.alloc_id()).collect();
    for (id, attrs) in ids.iter().zip(&element.xforms) {
        let mut xform = Xform::bare(*id);
        apply_xform_attributes(&mut xform, "xform", attrs, &ids)?;
        flame.push_xform(xform);
    }
    if let Some(attrs) = &element.final_xform {
        let id = flame.alloc_id();
        let mut xform = Xform::bare(id);
        apply_xform_attributes(&mut xform, "finalxform", attrs, &[])?;
        flame.set_final(xform);
    }

    let mut has_scale = false;
    for (name, value) in &element.header {
        let typed = apply_header_attribute(&mut flame, name, value);
        has_scale |= typed && name == "scale";
    }

    if has_scale {
        if flame.width() == 0 {
            let size = format!("{} {}", flame.width(), flame.height());
            return Err(invalid("flame", "size", &size, "width must be positive to convert scale"));
        }
        flame.scale = flame.scale * 100.0 / flame.width() as f64;
    }
    if !flame.scale.is_finite() || flame.scale <= 0.0 {
        warn!(scale = flame.scale, "non-positive scale, using {}", FALLBACK_SCALE);
        flame.scale = FALLBACK_SCALE;
    }

    if let Some(attrs) = &element.symmetry {
        let kind = get(attrs, "kind").unwrap_or("0");
        let sym: i32 = kind.trim().parse().map_err(|_| invalid("symmetry", "kind", kind, "not an integer"))?;
        flame.add_symmetry(sym, &mut rand::thread_rng());
    }

    compat::migrate(&mut flame);

    for i in 0..flame.xforms().len() {
        if let Some(x) = flame.xform_mut(i) {
            x.fill_defaults();
        }
    }
    if let Some(x) = flame.final_xform_mut() {
        x.fill_defaults();
    }

    debug!(name = %flame.name, xforms = flame.xforms().len(), "parsed flame");
    Ok(flame)
}

fn flame_elements(text: &str, limit: Option<usize>) -> Result<Vec<FlameElement>, ParseError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut elements = Vec::new();
    loop {
        if limit.is_some_and(|n| elements.len() >= n) {
            break;
        }
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) if e.name().as_ref() == b"flame" => {
                elements.push(read_flame_element(&mut reader, &e, false)?);
            }
            Event::Empty(e) if e.name().as_ref() == b"flame" => {
                elements.push(read_flame_element(&mut reader, &e, true)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(elements)
}

/// Parse the first `<flame>` element of a document.
pub fn parse_flame(text: &str) -> Result<Flame, ParseError> {
    let element = flame_elements(text, Some(1))?.into_iter().next().ok_or(ParseError::NoFlame)?;
    build_flame(element)
}

/// Parse every `<flame>` element of a document, typically a `<flames>` file.
pub fn parse_flames(text: &str) -> Result<Vec<Flame>, ParseError> {
    flame_elements(text, None)?.into_iter().map(build_flame).collect()
}

fn flame_string_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<flame .*?</flame>").expect("flame string regex"))
}

/// Raw `<flame …>…</flame>` substrings of a file, without parsing them.
pub fn flame_strings(text: &str) -> Vec<&str> {
    flame_string_regex().find_iter(text).map(|m| m.as_str()).collect()
}

/// Whether a document's root element records a version other than the current one.
pub fn needs_conversion(text: &str) -> Result<bool, ParseError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) | Event::Empty(e) => {
                let attrs = parse_attributes(&e)?;
                return Ok(get(&attrs, "version") != Some(compat::VERSION));
            }
            Event::Eof => return Err(ParseError::NoFlame),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(n: usize) -> String {
        (0..n).map(|i| format!("<color index=\"{}\" rgb=\"{} 0 0\"/>", i, i % 256)).collect()
    }

    fn doc(header: &str, body: &str) -> String {
        format!("<flame {}>{}{}</flame>", header, body, colors(256))
    }

    #[test]
    fn test_parse_minimal() {
        let flame = parse_flame(&doc("name=\"a\" version=\"flamekit 0.1\"", "")).unwrap();
        assert_eq!(flame.name, "a");
        assert!(flame.xforms().is_empty());
        assert_eq!(flame.gradient[3], [3, 0, 0]);
    }

    #[test]
    fn test_no_flame() {
        assert_eq!(parse_flame("<flames></flames>"), Err(ParseError::NoFlame));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(parse_flame("<flame name=\"x\"><xform"), Err(ParseError::Xml(_))));
    }

    #[test]
    fn test_wrong_color_count() {
        let text = format!("<flame>{}</flame>", colors(255));
        assert_eq!(parse_flame(&text), Err(ParseError::PaletteCount { expected: 256, found: 255 }));
        assert_eq!(
            parse_flame("<flame></flame>"),
            Err(ParseError::PaletteCount { expected: 256, found: 0 })
        );
    }

    #[test]
    fn test_hex_palette() {
        let body = "FF0000".repeat(256);
        let text = format!("<flame><palette count=\"256\" format=\"RGB\">\n{}\n</palette></flame>", body);
        let flame = parse_flame(&text).unwrap();
        assert!(flame.gradient.iter().all(|c| *c == [255, 0, 0]));
    }

    #[test]
    fn test_hex_palette_errors() {
        let text = "<flame><palette count=\"128\" format=\"RGB\">00</palette></flame>";
        assert_eq!(parse_flame(text), Err(ParseError::PaletteCount { expected: 256, found: 128 }));

        let text = "<flame><palette count=\"256\" format=\"RGBA\">00</palette></flame>";
        assert_eq!(parse_flame(text), Err(ParseError::UnsupportedPaletteFormat("RGBA".to_string())));

        let text = "<flame><palette format=\"RGB\">00</palette></flame>";
        assert_eq!(parse_flame(text), Err(ParseError::MissingPaletteCount));

        let text = format!("<flame><palette count=\"256\" format=\" rgb \">{}</palette></flame>", "00".repeat(30));
        assert_eq!(parse_flame(&text), Err(ParseError::PaletteCount { expected: 256, found: 10 }));
    }

    #[test]
    fn test_multiple_final() {
        let text = doc("", "<finalxform coefs=\"1 0 0 1 0 0\"/><finalxform coefs=\"1 0 0 1 0 0\"/>");
        assert_eq!(parse_flame(&text), Err(ParseError::MultipleFinal));
    }

    #[test]
    fn test_chaos_errors() {
        let text = doc("", "<xform coefs=\"1 0 0 1 0 0\" chaos=\"1 1\"/>");
        assert_eq!(parse_flame(&text), Err(ParseError::TooManyChaosValues { values: 2, xforms: 1 }));

        let text = doc("version=\"flamekit\"", "<xform chaos=\"-1\"/>");
        assert_eq!(parse_flame(&text), Err(ParseError::NegativeChaos(-1.0)));
    }

    #[test]
    fn test_chaos_refers_to_later_xforms() {
        let text = doc("version=\"flamekit\"", "<xform chaos=\"1 0\"/><xform/>");
        let flame = parse_flame(&text).unwrap();
        assert_eq!(flame.chaos_row(0), Some(vec![1.0, 0.0]));
        assert_eq!(flame.chaos_row(1), Some(vec![1.0, 1.0]));
    }

    #[test]
    fn test_invalid_coefs() {
        let text = doc("", "<xform coefs=\"1 0 0 1\"/>");
        assert!(matches!(
            parse_flame(&text),
            Err(ParseError::InvalidAttribute { ref attribute, .. }) if attribute == "coefs"
        ));
    }

    #[test]
    fn test_header_typing() {
        let text = doc(
            "name=\"42\" size=\"800 600\" center=\"1 -2\" scale=\"400\" quality=\"50\" motto=\"hi there\"",
            "",
        );
        let flame = parse_flame(&text).unwrap();
        assert_eq!(flame.name, "42");
        assert_eq!(flame.size, (800, 600));
        assert_eq!(flame.center, (1.0, -2.0));
        assert_eq!(flame.scale, 50.0);
        assert_eq!(flame.extra.get("quality"), Some(&AttrValue::Number(50.0)));
        assert_eq!(flame.extra.get("motto"), Some(&AttrValue::Text("hi there".to_string())));
    }

    #[test]
    fn test_zero_width_with_scale() {
        let text = doc("size=\"0 10\" scale=\"5\"", "");
        assert!(matches!(parse_flame(&text), Err(ParseError::InvalidAttribute { .. })));
    }

    #[test]
    fn test_nonpositive_scale_clamped() {
        let flame = parse_flame(&doc("scale=\"0\"", "")).unwrap();
        assert_eq!(flame.scale, FALLBACK_SCALE);
    }

    #[test]
    fn test_symmetry_directive() {
        let text = doc("version=\"flamekit\"", "<xform coefs=\"1 0 0 1 0 0\"/><symmetry kind=\"3\"/>");
        let flame = parse_flame(&text).unwrap();
        assert_eq!(flame.xforms().len(), 3);
    }

    #[test]
    fn test_xform_start_tag_with_children() {
        let text = doc("version=\"flamekit\"", "<xform coefs=\"1 0 0 1 0 0\" julia=\"1\"><note/></xform>");
        let flame = parse_flame(&text).unwrap();
        assert_eq!(flame.xforms().len(), 1);
        assert_eq!(flame.xform(0).unwrap().get("julia"), 1.0);
    }

    #[test]
    fn test_escaped_name() {
        let flame = parse_flame(&doc("name=\"a &amp; b\"", "")).unwrap();
        assert_eq!(flame.name, "a & b");
    }

    #[test]
    fn test_parse_flames_and_strings() {
        let one = doc("name=\"one\"", "");
        let two = doc("name=\"two\"", "");
        let file = format!("<flames version=\"x\">\n{}\n{}\n</flames>", one, two);
        let flames = parse_flames(&file).unwrap();
        let names: Vec<_> = flames.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);

        let strings = flame_strings(&file);
        assert_eq!(strings, vec![one.as_str(), two.as_str()]);
    }

    #[test]
    fn test_needs_conversion() {
        let current = format!("<flames version=\"{}\"></flames>", compat::VERSION);
        assert_eq!(needs_conversion(&current), Ok(false));
        assert_eq!(needs_conversion("<flames version=\"Apophysis 2.0\"></flames>"), Ok(true));
        assert_eq!(needs_conversion("<flames></flames>"), Ok(true));
    }
}
