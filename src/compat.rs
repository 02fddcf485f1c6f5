//! Legacy genome migration
//!
//! Documents written by older tools (Apophysis, flam3 before 2.8) use attributes
//! that have since been replaced. [`migrate`] rewrites them once, right after
//! parsing, and stamps the current format version so it never runs twice.

use crate::flame::Flame;
use crate::value::AttrValue;
use tracing::info;

/// Format version written by this crate.
pub const VERSION: &str = concat!("flamekit ", env!("CARGO_PKG_VERSION"));

/// Version prefixes that already use the current attribute set.
const CURRENT_PREFIXES: &[&str] = &["flamekit", "fr0st"];

/// Legacy linear chaos percentage to the logarithmic weight scale.
pub fn log_to_percent(value: f64) -> f64 {
    if value != 0.0 {
        2f64.powf(value.log10())
    } else {
        0.0
    }
}

/// Inverse of [`log_to_percent`].
pub fn percent_to_log(percent: f64) -> f64 {
    10f64.powf(-(1.0 / percent).log10() / 2f64.log10())
}

/// Whether a recorded version already uses the current attribute set.
pub fn is_current(version: Option<&str>) -> bool {
    version.is_some_and(|v| {
        let v = v.to_ascii_lowercase();
        CURRENT_PREFIXES.iter().any(|p| v.starts_with(p))
    })
}

/// Upgrade a freshly parsed flame in place. A no-op for current documents.
pub fn migrate(flame: &mut Flame) {
    if is_current(flame.version.as_deref()) {
        return;
    }

    // zoom folds into scale
    if let Some(zoom) = flame.extra.remove("zoom") {
        let zoom = zoom.as_f64().unwrap_or(0.0);
        flame.scale *= 2f64.powf(zoom);
    }

    // Per-xform symmetry becomes color_speed and animate
    let count = flame.xforms().len();
    let finals = flame.final_xform().is_some() as usize;
    for i in 0..count + finals {
        let xform = if i < count { flame.xform_mut(i) } else { flame.final_xform_mut() };
        let Some(xform) = xform else { continue };
        let symmetry = xform.get("symmetry");
        if !xform.has("color_speed") {
            xform.set("color_speed", (1.0 - symmetry) / 2.0);
        }
        if !xform.has("animate") {
            xform.set("animate", if symmetry <= 0.0 { 1.0 } else { 0.0 });
        }
        xform.remove("symmetry");
    }

    // plotmode="off" hides an xform
    for i in 0..count {
        let Some(xform) = flame.xform_mut(i) else { continue };
        let off = matches!(xform.attr("plotmode"), Some(AttrValue::Text(mode)) if mode.eq_ignore_ascii_case("off"));
        if off {
            xform.set("opacity", 0.0);
            xform.remove("plotmode");
        }
    }

    // soloxform shows a single xform
    if let Some(solo) = flame.extra.remove("soloxform") {
        let solo = solo.as_f64();
        for i in 0..count {
            if let Some(xform) = flame.xform_mut(i) {
                let shown = solo == Some(i as f64);
                xform.set("opacity", if shown { 1.0 } else { 0.0 });
            }
        }
    }

    for i in 0..count {
        if let Some(xform) = flame.xform_mut(i) {
            xform.chaos.remap(log_to_percent);
        }
    }

    info!(name = %flame.name, from = ?flame.version, to = VERSION, "migrated legacy flame");
    flame.version = Some(VERSION.to_string());
}
