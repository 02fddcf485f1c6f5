//! Genome serializer
//!
//! Writes flames back to the genome text format:
//! - Header attributes: name, version, size, center, then the typed render
//!   parameters, then every preserved extra attribute in document order
//! - One line per xform, the final xform last
//! - 256 `<color>` lines
//!
//! Numbers use the shortest round-tripping form, with integral values written
//! without a decimal point.

use crate::compat;
use crate::flame::{Flame, HEADER_FIELDS};
use crate::geometry::fmt_num;
use crate::value::AttrValue;
use crate::xform::{Triangle, Xform, XformId};
use quick_xml::escape::escape;
use std::fmt::Write;
use tracing::debug;

fn join(values: &[f64]) -> String {
    values.iter().map(|v| fmt_num(*v)).collect::<Vec<_>>().join(" ")
}

fn attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {}=\"{}\"", name, escape(value));
}

/// Header attributes in output order, with scale converted back to the wire unit.
///
/// A typed field whose document value did not parse is written from the
/// verbatim copy kept in `extra`.
fn header_attributes(flame: &Flame) -> Vec<(String, String)> {
    let (w, h) = flame.size;
    let typed = [
        ("size", format!("{} {}", w, h)),
        ("center", join(&[flame.center.0, flame.center.1])),
        ("scale", fmt_num(flame.pixels_per_unit())),
        ("rotate", fmt_num(flame.rotate)),
        ("background", join(&flame.background)),
        ("brightness", fmt_num(flame.brightness)),
        ("gamma", fmt_num(flame.gamma)),
        ("gamma_threshold", fmt_num(flame.gamma_threshold)),
        ("vibrancy", fmt_num(flame.vibrancy)),
        ("highlight_power", fmt_num(flame.highlight_power)),
    ];

    let mut attrs = vec![("name".to_string(), flame.name.clone())];
    if let Some(version) = &flame.version {
        attrs.push(("version".to_string(), version.clone()));
    }
    for (name, value) in typed {
        let value = flame.extra.get(name).map(AttrValue::to_attribute).unwrap_or(value);
        attrs.push((name.to_string(), value));
    }
    for (name, value) in flame.extra.iter().filter(|(name, _)| !HEADER_FIELDS.contains(name)) {
        attrs.push((name.to_string(), value.to_attribute()));
    }
    attrs
}

/// One `<xform …/>` or `<finalxform …/>` line.
pub fn write_xform(xform: &Xform, targets: Option<&[XformId]>) -> String {
    let tag = if targets.is_some() { "xform" } else { "finalxform" };
    let mut out = format!("   <{}", tag);
    for (name, value) in xform.written_attributes() {
        attr(&mut out, name, &value.to_attribute());
    }
    attr(&mut out, "coefs", &xform.coefs().to_attribute());
    if let Some(post) = xform.post.to_attribute() {
        attr(&mut out, "post", &post);
    }
    if let Some(chaos) = targets.and_then(|t| xform.chaos.to_attribute(t)) {
        attr(&mut out, "chaos", &chaos);
    }
    out.push_str("/>\n");
    out
}

/// Serialize a single flame.
pub fn write_flame(flame: &Flame) -> String {
    let mut out = String::from("<flame");
    for (name, value) in header_attributes(flame) {
        attr(&mut out, &name, &value);
    }
    out.push_str(">\n");

    let targets = flame.xform_ids();
    for xform in flame.xforms() {
        out.push_str(&write_xform(xform, Some(&targets)));
    }
    if let Some(final_xform) = flame.final_xform() {
        out.push_str(&write_xform(final_xform, None));
    }
    out.push_str(&flame.gradient.to_color_elements());
    out.push_str("</flame>");
    debug!(name = %flame.name, bytes = out.len(), "serialized flame");
    out
}

/// Serialize several flames into a `<flames>` file stamped with the current version.
pub fn write_flames(flames: &[Flame]) -> String {
    let mut out = format!("<flames version=\"{}\">\n", escape(compat::VERSION));
    for flame in flames {
        out.push_str(&write_flame(flame));
        out.push('\n');
    }
    out.push_str("</flames>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_order() {
        let mut flame = Flame::new();
        flame.name = "a<b".to_string();
        flame.extra.set("quality", 50.0);
        let text = write_flame(&flame);
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            format!(
                "<flame name=\"a&lt;b\" version=\"{}\" size=\"640 480\" center=\"0 0\" scale=\"160\" \
                 rotate=\"0\" background=\"0 0 0\" brightness=\"4\" gamma=\"4\" gamma_threshold=\"0.04\" \
                 vibrancy=\"1\" highlight_power=\"-1\" quality=\"50\">",
                compat::VERSION
            )
        );
    }

    #[test]
    fn test_identity_xform_line() {
        let mut flame = Flame::new();
        flame.add_xform();
        let text = write_flame(&flame);
        let line = text.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "   <xform opacity=\"1\" color=\"0\" color_speed=\"0.5\" animate=\"1\" linear=\"1\" \
             weight=\"1\" coefs=\"1 0 0 1 0 0\"/>"
        );
    }

    #[test]
    fn test_post_and_chaos_written_when_set() {
        let mut flame = Flame::new();
        let a = flame.add_xform().id();
        flame.add_xform();
        let x = flame.xform_mut(1).unwrap();
        x.post.rotate(90.0, None);
        x.chaos.set(a, 0.0).unwrap();
        let line = write_xform(flame.xform(1).unwrap(), Some(&flame.xform_ids()));
        assert!(line.contains(" post=\""));
        assert!(line.contains(" chaos=\"0\"/>"));
    }

    #[test]
    fn test_final_has_no_chaos() {
        let mut flame = Flame::new();
        flame.add_final();
        let text = write_flame(&flame);
        assert!(text.contains("   <finalxform "));
        assert!(!text.contains("chaos="));
    }

    #[test]
    fn test_palette_and_footer() {
        let text = write_flame(&Flame::new());
        assert_eq!(text.matches("<color ").count(), 256);
        assert!(text.ends_with("</flame>"));
    }

    #[test]
    fn test_write_flames() {
        let text = write_flames(&[Flame::new(), Flame::new()]);
        assert!(text.starts_with(&format!("<flames version=\"{}\">\n", compat::VERSION)));
        assert_eq!(text.matches("<flame ").count(), 2);
        assert!(text.ends_with("</flame>\n</flames>\n"));
    }
}
