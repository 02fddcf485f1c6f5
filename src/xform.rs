//! Xforms: affine transforms with variation, color and chaos data
//!
//! Coefficients are stored in complex-plane orientation. The genome format uses
//! screen orientation, related by negating `d`, `b` and `f`:
//!
//! ```text
//! screen = (a, -d, -b, e, c, -f)
//! ```
//!
//! The conversion happens exactly once, at the parse/serialize boundary
//! ([`Coefs::from_screen`] / [`Coefs::to_screen`]).
//!
//! Geometric editing (triangle vertices, polar views, rotation, orbiting) lives on
//! the [`Triangle`] trait, shared by [`Xform`] and the coefficient-only [`PostXform`].

use crate::chaos::Chaos;
use crate::geometry::{fmt_num, polar, rect};
use crate::value::{AttrBag, AttrValue};
use crate::variations;

/// Stable identity of an xform within its flame.
///
/// Ids are handed out by the owning flame and never reused, so chaos weights can
/// be keyed by them across reordering and deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XformId(pub(crate) u64);

/// The six affine coefficients in complex-plane orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefs {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Coefs {
    pub const IDENTITY: Coefs = Coefs { a: 1.0, b: 0.0, c: 0.0, d: 0.0, e: 1.0, f: 0.0 };
    pub const ZERO: Coefs = Coefs { a: 0.0, b: 0.0, c: 0.0, d: 0.0, e: 0.0, f: 0.0 };

    /// Coefficients in storage order `(a, d, b, e, c, f)`.
    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.d, self.b, self.e, self.c, self.f]
    }

    pub fn from_array([a, d, b, e, c, f]: [f64; 6]) -> Self {
        Coefs { a, b, c, d, e, f }
    }

    /// Build from the six values of a `coefs="…"` attribute.
    pub fn from_screen(screen: [f64; 6]) -> Self {
        let mut coefs = Coefs::from_array(screen);
        coefs.d = -coefs.d;
        coefs.b = -coefs.b;
        coefs.f = -coefs.f;
        coefs
    }

    /// The six values of a `coefs="…"` attribute.
    pub fn to_screen(&self) -> [f64; 6] {
        [self.a, -self.d, -self.b, self.e, self.c, -self.f]
    }

    /// Space-joined screen coefficients.
    pub fn to_attribute(&self) -> String {
        self.to_screen().iter().map(|v| fmt_num(*v)).collect::<Vec<_>>().join(" ")
    }
}

impl Default for Coefs {
    fn default() -> Self {
        Coefs::IDENTITY
    }
}

/// A point in the plane.
pub type Point = (f64, f64);

/// Geometric view of an affine transform as the image of the unit triangle.
///
/// The three vertices are `x = (a+c, d+f)`, `y = (b+c, e+f)` and `o = (c, f)`.
/// Polar views express the legs `(a, d)`, `(b, e)` and the origin `(c, f)` as
/// `(radius, degrees)`.
pub trait Triangle {
    fn coefs(&self) -> &Coefs;
    fn coefs_mut(&mut self) -> &mut Coefs;

    fn set_coefs(&mut self, coefs: Coefs) {
        *self.coefs_mut() = coefs;
    }

    fn screen_coefs(&self) -> [f64; 6] {
        self.coefs().to_screen()
    }

    fn set_screen_coefs(&mut self, screen: [f64; 6]) {
        self.set_coefs(Coefs::from_screen(screen));
    }

    /// Translation component `(c, f)`.
    fn pos(&self) -> Point {
        (self.coefs().c, self.coefs().f)
    }

    fn set_pos(&mut self, (c, f): Point) {
        let coefs = self.coefs_mut();
        coefs.c = c;
        coefs.f = f;
    }

    fn move_pos(&mut self, (dx, dy): Point) {
        let coefs = self.coefs_mut();
        coefs.c += dx;
        coefs.f += dy;
    }

    fn x(&self) -> Point {
        let c = self.coefs();
        (c.a + c.c, c.d + c.f)
    }

    /// Place the x vertex, keeping `o` fixed.
    fn set_x(&mut self, (x, y): Point) {
        let coefs = self.coefs_mut();
        coefs.a = x - coefs.c;
        coefs.d = y - coefs.f;
    }

    fn move_x(&mut self, (dx, dy): Point) {
        let coefs = self.coefs_mut();
        coefs.a += dx;
        coefs.d += dy;
    }

    fn y(&self) -> Point {
        let c = self.coefs();
        (c.b + c.c, c.e + c.f)
    }

    /// Place the y vertex, keeping `o` fixed.
    fn set_y(&mut self, (x, y): Point) {
        let coefs = self.coefs_mut();
        coefs.b = x - coefs.c;
        coefs.e = y - coefs.f;
    }

    fn move_y(&mut self, (dx, dy): Point) {
        let coefs = self.coefs_mut();
        coefs.b += dx;
        coefs.e += dy;
    }

    fn o(&self) -> Point {
        self.pos()
    }

    /// Move the origin vertex while the x and y vertices stay where they are.
    fn set_o(&mut self, (x, y): Point) {
        let coefs = self.coefs_mut();
        coefs.a += coefs.c - x;
        coefs.d += coefs.f - y;
        coefs.b += coefs.c - x;
        coefs.e += coefs.f - y;
        coefs.c = x;
        coefs.f = y;
    }

    fn move_o(&mut self, (dx, dy): Point) {
        let coefs = self.coefs_mut();
        coefs.a -= dx;
        coefs.d -= dy;
        coefs.b -= dx;
        coefs.e -= dy;
        coefs.c += dx;
        coefs.f += dy;
    }

    fn points(&self) -> [Point; 3] {
        [self.x(), self.y(), self.o()]
    }

    fn set_points(&mut self, [x, y, o]: [Point; 3]) {
        self.set_x(x);
        self.set_y(y);
        self.set_o(o);
    }

    fn xp(&self) -> Point {
        polar((self.coefs().a, self.coefs().d))
    }

    fn set_xp(&mut self, coord: Point) {
        let (a, d) = rect(coord);
        let coefs = self.coefs_mut();
        coefs.a = a;
        coefs.d = d;
    }

    fn yp(&self) -> Point {
        polar((self.coefs().b, self.coefs().e))
    }

    fn set_yp(&mut self, coord: Point) {
        let (b, e) = rect(coord);
        let coefs = self.coefs_mut();
        coefs.b = b;
        coefs.e = e;
    }

    fn op(&self) -> Point {
        polar(self.pos())
    }

    fn set_op(&mut self, coord: Point) {
        self.set_pos(rect(coord));
    }

    fn polars(&self) -> [Point; 3] {
        [self.xp(), self.yp(), self.op()]
    }

    fn set_polars(&mut self, [xp, yp, op]: [Point; 3]) {
        self.set_xp(xp);
        self.set_yp(yp);
        self.set_op(op);
    }

    fn scale_x(&mut self, v: f64) {
        let coefs = self.coefs_mut();
        coefs.a *= v;
        coefs.d *= v;
    }

    fn scale_y(&mut self, v: f64) {
        let coefs = self.coefs_mut();
        coefs.b *= v;
        coefs.e *= v;
    }

    fn scale(&mut self, v: f64) {
        self.scale_x(v);
        self.scale_y(v);
    }

    fn rotate_x(&mut self, deg: f64) {
        let (r, theta) = self.xp();
        self.set_xp((r, theta + deg));
    }

    fn rotate_y(&mut self, deg: f64) {
        let (r, theta) = self.yp();
        self.set_yp((r, theta + deg));
    }

    /// Rotate both legs by `deg`. With a pivot, the origin vertex is also
    /// revolved around it by the same angle.
    fn rotate(&mut self, deg: f64, pivot: Option<Point>) {
        self.rotate_x(deg);
        self.rotate_y(deg);
        if let Some(pivot) = pivot {
            self.orbit(deg, pivot);
        }
    }

    /// Push the origin vertex `v` units further from (0, 0) along its current angle.
    fn move_outward(&mut self, v: f64) {
        let (r, theta) = self.op();
        self.set_op((r + v, theta));
    }

    /// Revolve the origin vertex around `pivot` without changing the legs.
    fn orbit(&mut self, deg: f64, pivot: Point) {
        if pivot == (0.0, 0.0) {
            let (r, theta) = self.op();
            self.set_op((r, theta + deg));
            return;
        }
        let coefs = self.coefs_mut();
        let hor = coefs.c - pivot.0;
        let ver = coefs.f - pivot.1;
        // Angle measured from the vertical axis: atan2(horizontal, vertical)
        let angle = hor.atan2(ver) - deg.to_radians();
        let vector = hor.hypot(ver);
        coefs.c = pivot.0 + angle.sin() * vector;
        coefs.f = pivot.1 + angle.cos() * vector;
    }
}

/// A post-transform: coefficients only.
///
/// Post-transforms carry no weight, color, variations or chaos, and cannot be
/// copied into or deleted from a flame on their own.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PostXform {
    coefs: Coefs,
}

impl PostXform {
    pub fn is_active(&self) -> bool {
        self.coefs != Coefs::IDENTITY
    }

    /// The `post="…"` value, omitted for the identity.
    pub fn to_attribute(&self) -> Option<String> {
        self.is_active().then(|| self.coefs.to_attribute())
    }
}

impl Triangle for PostXform {
    fn coefs(&self) -> &Coefs {
        &self.coefs
    }

    fn coefs_mut(&mut self) -> &mut Coefs {
        &mut self.coefs
    }
}

/// Attributes written even when they are zero.
pub const ALWAYS_WRITE: &[&str] = &["opacity", "color", "color_speed", "animate"];

/// Attribute names that are structural, never stored in the attribute bag.
pub const RESERVED: &[&str] = &["coefs", "post", "chaos", "a", "b", "c", "d", "e", "f"];

/// An affine transform with its variation, color and chaos data.
///
/// Every attribute behaves as a number with a default of `0.0` when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct Xform {
    id: XformId,
    coefs: Coefs,
    pub post: PostXform,
    pub chaos: Chaos,
    attrs: AttrBag,
}

impl Xform {
    /// A fresh xform with the default color attributes.
    pub(crate) fn new(id: XformId) -> Self {
        let mut xform = Xform::bare(id);
        xform.fill_defaults();
        xform
    }

    /// An xform with nothing set, used while loading a document. Coefficients
    /// missing from the document read as zero.
    pub(crate) fn bare(id: XformId) -> Self {
        Xform {
            id,
            coefs: Coefs::ZERO,
            post: PostXform::default(),
            chaos: Chaos::new(),
            attrs: AttrBag::new(),
        }
    }

    /// Materialize the color attributes that weren't given explicitly.
    pub(crate) fn fill_defaults(&mut self) {
        for (name, value) in
            [("opacity", 1.0), ("color", 0.0), ("color_speed", 0.5), ("animate", 1.0)]
        {
            if !self.attrs.contains(name) {
                self.attrs.set(name, value);
            }
        }
    }

    pub(crate) fn with_id(&self, id: XformId) -> Self {
        Xform { id, ..self.clone() }
    }

    pub fn id(&self) -> XformId {
        self.id
    }

    /// Numeric attribute, `0.0` when unset.
    pub fn get(&self, name: &str) -> f64 {
        match name {
            "a" => self.coefs.a,
            "b" => self.coefs.b,
            "c" => self.coefs.c,
            "d" => self.coefs.d,
            "e" => self.coefs.e,
            "f" => self.coefs.f,
            _ => self.attrs.number(name),
        }
    }

    /// Raw attribute value, if set.
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.attrs.contains(name)
    }

    /// Set an attribute. Single-letter coefficient names write the coefficients.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        let slot = match name {
            "a" => &mut self.coefs.a,
            "b" => &mut self.coefs.b,
            "c" => &mut self.coefs.c,
            "d" => &mut self.coefs.d,
            "e" => &mut self.coefs.e,
            "f" => &mut self.coefs.f,
            _ => {
                if !RESERVED.contains(&name) {
                    self.attrs.set(name, value);
                }
                return;
            }
        };
        if let Some(n) = value.as_f64() {
            *slot = n;
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.attrs.remove(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter()
    }

    /// Attributes that belong in the serialized form: set and non-zero, or on
    /// the always-write list (which includes every variation name).
    pub fn written_attributes(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().filter(|(name, value)| {
            !RESERVED.contains(name)
                && (value.is_truthy()
                    || ALWAYS_WRITE.contains(name)
                    || variations::is_variation(name))
        })
    }

    pub fn weight(&self) -> f64 {
        self.get("weight")
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.set("weight", weight);
    }

    pub fn color(&self) -> f64 {
        self.get("color")
    }

    pub fn set_color(&mut self, color: f64) {
        self.set("color", color);
    }

    pub fn color_speed(&self) -> f64 {
        self.get("color_speed")
    }

    pub fn opacity(&self) -> f64 {
        self.get("opacity")
    }

    pub fn animate(&self) -> f64 {
        self.get("animate")
    }

    /// Variations set on this xform, in catalog order, with their weights.
    pub fn variations(&self) -> Vec<(&'static str, f64)> {
        variations::VARIATIONS
            .iter()
            .filter(|v| self.has(v.name))
            .map(|v| (v.name, self.get(v.name)))
            .collect()
    }
}

impl Triangle for Xform {
    fn coefs(&self) -> &Coefs {
        &self.coefs
    }

    fn coefs_mut(&mut self) -> &mut Coefs {
        &mut self.coefs
    }
}
