//! The flame genome: xforms, palette and global render parameters
//!
//! [`Flame`] owns an ordered sequence of xforms, an optional final xform, a
//! 256-entry [`Palette`] and the global parameters. Unknown header attributes are
//! kept in an ordered [`AttrBag`] so they survive a load/save cycle.
//!
//! Xforms are created through the flame, which hands out stable [`XformId`]s.
//! Chaos weights are keyed by those ids, so reordering or deleting xforms never
//! shifts a weight onto the wrong target.
//!
//! # Example
//!
//! ```
//! use flamekit::flame::Flame;
//! use flamekit::xform::Triangle;
//!
//! let mut flame = Flame::new();
//! flame.add_xform().rotate(45.0, None);
//! flame.add_xform().set("julia", 0.5);
//!
//! let text = flame.to_string();
//! let reparsed: Flame = text.parse().unwrap();
//! assert_eq!(reparsed.xforms().len(), 2);
//! assert_eq!(reparsed.xform(1).unwrap().get("julia"), 0.5);
//! ```

use crate::compat;
use crate::geometry::{polar, rect};
use crate::palette::Palette;
use crate::parser::{self, ParseError};
use crate::render::Bounds;
use crate::value::AttrBag;
use crate::variations::{self, Variation};
use crate::xform::{Coefs, PostXform, Triangle, Xform, XformId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Weighted draw for a random symmetry order.
/// Header attributes stored in typed fields rather than in [`Flame::extra`].
pub const HEADER_FIELDS: [&str; 12] = [
    "name",
    "version",
    "size",
    "center",
    "scale",
    "rotate",
    "background",
    "brightness",
    "gamma",
    "gamma_threshold",
    "vibrancy",
    "highlight_power",
];

const SYMMETRY_DISTRIBUTION: [i32; 15] = [-4, -3, -2, -2, -2, -1, -1, -1, 2, 2, 2, 3, 3, 4, 4];

/// Bookkeeping inconsistency inside a flame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("xform {0:?} belongs neither to the sequence nor to the final slot")]
    UnknownXform(XformId),
}

/// One complete fractal description.
#[derive(Debug, Clone, PartialEq)]
pub struct Flame {
    pub name: String,
    /// Format version recorded in the document. New flames and migrated ones carry the current version.
    pub version: Option<String>,
    /// Output size in pixels `(width, height)`.
    pub size: (u32, u32),
    /// Center of the view in logical coordinates `(x_offset, y_offset)`.
    pub center: (f64, f64),
    /// Zoom, in percent of the image width per logical unit.
    pub scale: f64,
    /// View rotation in degrees.
    pub rotate: f64,
    pub background: [f64; 3],
    pub brightness: f64,
    pub gamma: f64,
    pub gamma_threshold: f64,
    pub vibrancy: f64,
    pub highlight_power: f64,
    /// Header attributes without a dedicated field, in document order.
    pub extra: AttrBag,
    pub gradient: Palette,
    xform: Vec<Xform>,
    final_xform: Option<Xform>,
    next_id: u64,
}

impl Default for Flame {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            version: Some(compat::VERSION.to_string()),
            size: (640, 480),
            center: (0.0, 0.0),
            scale: 25.0,
            rotate: 0.0,
            background: [0.0, 0.0, 0.0],
            brightness: 4.0,
            gamma: 4.0,
            gamma_threshold: 0.04,
            vibrancy: 1.0,
            highlight_power: -1.0,
            extra: AttrBag::new(),
            gradient: Palette::default(),
            xform: Vec::new(),
            final_xform: None,
            next_id: 0,
        }
    }
}

/// Options for [`Flame::add_random_xform`].
#[derive(Debug, Clone, PartialEq)]
pub struct RandomXform {
    /// Pool of variation names to draw from.
    pub pool: Vec<&'static str>,
    /// Number of distinct variations to set.
    pub count: usize,
    /// Positive: fixed weight. Negative: uniform in `[0, -weight)`. Zero: uniform in `[0.1, 1)`.
    pub weight: f64,
    /// Replace the final xform instead of appending to the sequence.
    pub is_final: bool,
    pub color: f64,
    /// Keep identity coefficients and give every variation weight 1.
    pub identity: bool,
}

impl Default for RandomXform {
    fn default() -> Self {
        Self {
            pool: variations::list_variation_names(),
            count: 1,
            weight: 0.0,
            is_final: false,
            color: 0.0,
            identity: false,
        }
    }
}

impl Flame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a single `<flame>` element.
    #[tracing::instrument(skip_all)]
    pub fn parse(text: &str) -> Result<Flame, ParseError> {
        parser::parse_flame(text)
    }

    pub(crate) fn alloc_id(&mut self) -> XformId {
        let id = XformId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn push_xform(&mut self, xform: Xform) {
        self.xform.push(xform);
    }

    pub(crate) fn set_final(&mut self, xform: Xform) {
        self.final_xform = Some(xform);
    }

    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    /// Wire-format scale: pixels per logical unit at the flame's own width.
    pub fn pixels_per_unit(&self) -> f64 {
        self.scale * self.size.0 as f64 / 100.0
    }

    /// View rotation in radians.
    pub fn angle(&self) -> f64 {
        self.rotate.to_radians()
    }

    pub fn set_angle(&mut self, radians: f64) {
        self.rotate = radians.to_degrees();
    }

    /// Move the center by `diff`, given in rotated view coordinates.
    pub fn move_center(&mut self, diff: (f64, f64)) {
        let (r, phi) = polar(diff);
        let (w, h) = rect((r, phi - self.rotate));
        self.center.0 += w;
        self.center.1 += h;
    }

    pub fn xforms(&self) -> &[Xform] {
        &self.xform
    }

    pub fn xform(&self, index: usize) -> Option<&Xform> {
        self.xform.get(index)
    }

    pub fn xform_mut(&mut self, index: usize) -> Option<&mut Xform> {
        self.xform.get_mut(index)
    }

    pub fn final_xform(&self) -> Option<&Xform> {
        self.final_xform.as_ref()
    }

    pub fn final_xform_mut(&mut self) -> Option<&mut Xform> {
        self.final_xform.as_mut()
    }

    pub fn xform_by_id(&self, id: XformId) -> Option<&Xform> {
        self.iter_xforms().find(|x| x.id() == id)
    }

    pub fn xform_by_id_mut(&mut self, id: XformId) -> Option<&mut Xform> {
        self.xform.iter_mut().chain(self.final_xform.as_mut()).find(|x| x.id() == id)
    }

    /// Ids of the sequence xforms, in order. This is the column order of every chaos row.
    pub fn xform_ids(&self) -> Vec<XformId> {
        self.xform.iter().map(Xform::id).collect()
    }

    /// Sequence xforms, then the final xform if there is one.
    pub fn iter_xforms(&self) -> impl Iterator<Item = &Xform> {
        self.xform.iter().chain(self.final_xform.as_ref())
    }

    /// Post-transforms that differ from the identity.
    pub fn iter_posts(&self) -> impl Iterator<Item = &PostXform> {
        self.iter_xforms().map(|x| &x.post).filter(|p| p.is_active())
    }

    /// Position of an xform: `Some(i)` in the sequence, `None` for the final xform.
    pub fn index_of(&self, id: XformId) -> Result<Option<usize>, StructuralError> {
        if let Some(i) = self.xform.iter().position(|x| x.id() == id) {
            return Ok(Some(i));
        }
        match &self.final_xform {
            Some(f) if f.id() == id => Ok(None),
            _ => Err(StructuralError::UnknownXform(id)),
        }
    }

    /// Outgoing chaos weights of sequence xform `index`, in sequence order.
    pub fn chaos_row(&self, index: usize) -> Option<Vec<f64>> {
        let ids = self.xform_ids();
        self.xform.get(index).map(|x| x.chaos.row(&ids))
    }

    /// Append an xform: identity coefficients, `linear = 1`, `color = 0`, `weight = 1`.
    pub fn add_xform(&mut self) -> &mut Xform {
        let id = self.alloc_id();
        let mut xform = Xform::new(id);
        xform.set("linear", 1.0);
        xform.set("color", 0.0);
        xform.set("weight", 1.0);
        self.xform.push(xform);
        let last = self.xform.len() - 1;
        &mut self.xform[last]
    }

    /// The final xform, created with identity coefficients, `linear = 1`,
    /// `color = 0` and `color_speed = 0` when there is none yet.
    pub fn add_final(&mut self) -> &mut Xform {
        let id = XformId(self.next_id);
        let mut created = false;
        let xform = self.final_xform.get_or_insert_with(|| {
            created = true;
            let mut xform = Xform::new(id);
            xform.set("linear", 1.0);
            xform.set("color", 0.0);
            xform.set("color_speed", 0.0);
            xform
        });
        if created {
            self.next_id += 1;
        }
        xform
    }

    /// Remove every xform, including the final one.
    pub fn clear(&mut self) {
        self.xform.clear();
        self.final_xform = None;
    }

    /// Append a copy of sequence xform `index` under a new identity.
    ///
    /// The copy keeps coefficients, post-transform, attributes and outgoing chaos.
    /// Other xforms reach it with the default weight.
    pub fn copy_xform(&mut self, index: usize) -> Option<&mut Xform> {
        let source = self.xform.get(index)?;
        let id = XformId(self.next_id);
        let copy = source.with_id(id);
        self.next_id += 1;
        self.xform.push(copy);
        self.xform.last_mut()
    }

    /// Remove sequence xform `index`, together with every chaos weight pointing at it.
    pub fn delete_xform(&mut self, index: usize) -> Option<Xform> {
        if index >= self.xform.len() {
            return None;
        }
        let removed = self.xform.remove(index);
        for xform in self.xform.iter_mut().chain(self.final_xform.as_mut()) {
            xform.chaos.forget(removed.id());
        }
        Some(removed)
    }

    pub fn delete_final(&mut self) -> Option<Xform> {
        self.final_xform.take()
    }

    /// Move sequence xform `from` to position `to`. Chaos weights follow identity.
    pub fn move_xform(&mut self, from: usize, to: usize) -> bool {
        if from >= self.xform.len() || to >= self.xform.len() {
            return false;
        }
        let xform = self.xform.remove(from);
        self.xform.insert(to, xform);
        true
    }

    /// Add rotational (and, for negative orders, reflective) symmetry.
    ///
    /// `sym == 0` draws an order from a fixed distribution skewed towards ±2.
    /// An order of 1 adds nothing. A negative order first adds a reflection, then
    /// `|sym| - 1` rotated copies. Returns the number of xforms added.
    pub fn add_symmetry(&mut self, sym: i32, rng: &mut impl Rng) -> usize {
        let sym = if sym == 0 { *SYMMETRY_DISTRIBUTION.choose(rng).unwrap_or(&1) } else { sym };
        if sym == 0 || sym == 1 {
            return 0;
        }

        let mut added = 0;
        if sym < 0 {
            let x = self.add_xform();
            x.set_weight(1.0);
            x.set("color_speed", 0.0);
            x.set("animate", 0.0);
            x.set_color(1.0);
            x.coefs_mut().a = -1.0;
            added += 1;
        }

        let n = sym.unsigned_abs();
        let step = 360.0 / n as f64;
        for k in 1..n {
            let x = self.add_xform();
            x.set_weight(1.0);
            x.set("color_speed", 0.0);
            x.set("animate", 0.0);
            let color = if n < 3 { 0.0 } else { (k as f64 - 1.0) / (n as f64 - 2.0) };
            x.set_color(color);
            x.rotate(k as f64 * step, None);
            added += 1;
        }
        debug!(sym, added, "added symmetry");
        added
    }

    /// Fit the view to an estimated bounding box of the attractor.
    ///
    /// Offsets within 5 units are adopted as the new center; the scale is chosen so
    /// the smaller extent fills 70 % of the image width, clamped into `[10, 100]`.
    pub fn reframe(&mut self, bounds: &Bounds) {
        let (x_off, y_off) = bounds.center();
        if x_off.abs() < 5.0 {
            self.center.0 = x_off;
        }
        if y_off.abs() < 5.0 {
            self.center.1 = y_off;
        }
        let (w, h) = bounds.extent();
        let denom = w.min(h);
        let scale = if denom == 0.0 { 0.0 } else { 0.7 * 100.0 / denom };
        self.scale = scale.clamp(10.0, 100.0);
    }

    /// Add an xform with random coefficients and variations.
    pub fn add_random_xform(&mut self, options: &RandomXform, rng: &mut impl Rng) -> &mut Xform {
        let chosen: Vec<&'static Variation> = options
            .pool
            .choose_multiple(rng, options.count)
            .filter_map(|name| variations::get_variation(name))
            .collect();

        let coefs = if options.identity {
            Coefs::IDENTITY
        } else {
            let mut c = Coefs::from_array(std::array::from_fn(|_| rng.gen_range(-1.0..1.0)));
            if rng.gen::<f64>() > 0.7 {
                c.c = 0.0;
                c.f = 0.0;
            }
            c
        };
        let weight = if options.weight > 0.0 {
            options.weight
        } else if options.weight < 0.0 {
            rng.gen_range(0.0..-options.weight)
        } else {
            rng.gen_range(0.1..1.0)
        };
        let amounts: Vec<f64> = chosen
            .iter()
            .map(|_| if options.identity { 1.0 } else { rng.gen_range(-1.0..1.0) })
            .collect();

        let x = if options.is_final {
            self.delete_final();
            self.add_final()
        } else {
            let x = self.add_xform();
            x.set_weight(weight);
            x.set("animate", 1.0);
            x
        };
        x.set("linear", 0.0);
        x.set_coefs(coefs);
        for (variation, amount) in chosen.iter().zip(amounts) {
            x.set(variation.name, amount);
            for (param, default) in variation.params {
                x.set(param, *default);
            }
        }
        x.set_color(options.color);
        x
    }
}

impl FromStr for Flame {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flame::parse(s)
    }
}

impl fmt::Display for Flame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::fmt::write_flame(self))
    }
}
