//! Variation catalog.
//!
//! The nonlinear variation functions themselves live in the rendering engine.
//! This table only names them, in engine order, together with the sub-parameters
//! each one reads (attribute names `"<variation>_<param>"`) and their default values.

/// A variation known to the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variation {
    pub name: &'static str,
    /// Full attribute names of the sub-parameters, with defaults.
    pub params: &'static [(&'static str, f64)],
}

macro_rules! catalog {
    ($( $name:literal $( { $( $param:literal = $default:expr ),* $(,)? } )? ),* $(,)?) => {
        &[$(
            Variation {
                name: $name,
                params: &[$( $( ($param, $default) ),* )?],
            }
        ),*]
    };
}

/// Every variation, in engine index order.
pub const VARIATIONS: &[Variation] = catalog![
    "linear",
    "sinusoidal",
    "spherical",
    "swirl",
    "horseshoe",
    "polar",
    "handkerchief",
    "heart",
    "disc",
    "spiral",
    "hyperbolic",
    "diamond",
    "ex",
    "julia",
    "bent",
    "waves",
    "fisheye",
    "popcorn",
    "exponential",
    "power",
    "cosine",
    "rings",
    "fan",
    "blob" { "blob_low" = 0.0, "blob_high" = 1.0, "blob_waves" = 1.0 },
    "pdj" { "pdj_a" = 0.0, "pdj_b" = 0.0, "pdj_c" = 0.0, "pdj_d" = 0.0 },
    "fan2" { "fan2_x" = 0.0, "fan2_y" = 0.0 },
    "rings2" { "rings2_val" = 0.0 },
    "eyefish",
    "bubble",
    "cylinder",
    "perspective" { "perspective_angle" = 0.0, "perspective_dist" = 0.0 },
    "noise",
    "julian" { "julian_power" = 1.0, "julian_dist" = 1.0 },
    "juliascope" { "juliascope_power" = 1.0, "juliascope_dist" = 1.0 },
    "blur",
    "gaussian_blur",
    "radial_blur" { "radial_blur_angle" = 0.0 },
    "pie" { "pie_slices" = 6.0, "pie_rotation" = 0.0, "pie_thickness" = 0.5 },
    "ngon" { "ngon_sides" = 5.0, "ngon_power" = 3.0, "ngon_circle" = 1.0, "ngon_corners" = 2.0 },
    "curl" { "curl_c1" = 1.0, "curl_c2" = 0.0 },
    "rectangles" { "rectangles_x" = 1.0, "rectangles_y" = 1.0 },
    "arch",
    "tangent",
    "square",
    "rays",
    "blade",
    "secant2",
    "twintrian",
    "cross",
    "disc2" { "disc2_rot" = 0.0, "disc2_twist" = 0.0 },
    "super_shape" {
        "super_shape_rnd" = 0.0,
        "super_shape_m" = 0.0,
        "super_shape_n1" = 1.0,
        "super_shape_n2" = 1.0,
        "super_shape_n3" = 1.0,
        "super_shape_holes" = 0.0,
    },
    "flower" { "flower_petals" = 0.0, "flower_holes" = 0.0 },
    "conic" { "conic_eccentricity" = 1.0, "conic_holes" = 0.0 },
    "parabola" { "parabola_height" = 0.0, "parabola_width" = 0.0 },
    "bent2" { "bent2_x" = 1.0, "bent2_y" = 1.0 },
    "bipolar" { "bipolar_shift" = 0.0 },
    "boarders",
    "butterfly",
    "cell" { "cell_size" = 1.0 },
    "cpow" { "cpow_r" = 1.0, "cpow_i" = 0.0, "cpow_power" = 1.0 },
    "curve" { "curve_xamp" = 0.0, "curve_yamp" = 0.0, "curve_xlength" = 1.0, "curve_ylength" = 1.0 },
    "edisc",
    "elliptic",
    "escher" { "escher_beta" = 0.0 },
    "foci",
    "lazysusan" {
        "lazysusan_spin" = 0.0,
        "lazysusan_space" = 0.0,
        "lazysusan_twist" = 0.0,
        "lazysusan_x" = 0.0,
        "lazysusan_y" = 0.0,
    },
    "loonie",
    "pre_blur",
    "modulus" { "modulus_x" = 0.0, "modulus_y" = 0.0 },
    "oscilloscope" {
        "oscilloscope_separation" = 1.0,
        "oscilloscope_frequency" = std::f64::consts::PI,
        "oscilloscope_amplitude" = 1.0,
        "oscilloscope_damping" = 0.0,
    },
    "polar2",
    "popcorn2" { "popcorn2_x" = 0.0, "popcorn2_y" = 0.0, "popcorn2_c" = 0.0 },
    "scry",
    "separation" {
        "separation_x" = 0.0,
        "separation_y" = 0.0,
        "separation_xinside" = 0.0,
        "separation_yinside" = 0.0,
    },
    "split" { "split_xsize" = 0.0, "split_ysize" = 0.0 },
    "splits" { "splits_x" = 0.0, "splits_y" = 0.0 },
    "stripes" { "stripes_space" = 0.0, "stripes_warp" = 0.0 },
    "wedge" { "wedge_angle" = 0.0, "wedge_hole" = 0.0, "wedge_count" = 1.0, "wedge_swirl" = 0.0 },
    "wedge_julia" {
        "wedge_julia_angle" = 0.0,
        "wedge_julia_count" = 1.0,
        "wedge_julia_power" = 1.0,
        "wedge_julia_dist" = 0.0,
    },
    "wedge_sph" {
        "wedge_sph_angle" = 0.0,
        "wedge_sph_count" = 1.0,
        "wedge_sph_hole" = 0.0,
        "wedge_sph_swirl" = 0.0,
    },
    "whorl" { "whorl_inside" = 0.0, "whorl_outside" = 0.0 },
    "waves2" { "waves2_freqx" = 0.0, "waves2_freqy" = 0.0, "waves2_scalex" = 0.0, "waves2_scaley" = 0.0 },
    "exp",
    "log",
    "sin",
    "cos",
    "tan",
    "sec",
    "csc",
    "cot",
    "sinh",
    "cosh",
    "tanh",
    "sech",
    "csch",
    "coth",
    "auger" { "auger_sym" = 0.0, "auger_weight" = 0.5, "auger_freq" = 1.0, "auger_scale" = 1.0 },
    "flux" { "flux_spread" = 0.0 },
    "mobius" {
        "mobius_re_a" = 1.0,
        "mobius_re_b" = 0.0,
        "mobius_re_c" = 0.0,
        "mobius_re_d" = 1.0,
        "mobius_im_a" = 0.0,
        "mobius_im_b" = 0.0,
        "mobius_im_c" = 0.0,
        "mobius_im_d" = 0.0,
    },
];

/// Returns the names of all variations, in engine order.
pub fn list_variation_names() -> Vec<&'static str> {
    VARIATIONS.iter().map(|v| v.name).collect()
}

/// Returns a variation by name, or None if the engine doesn't know it.
pub fn get_variation(name: &str) -> Option<&'static Variation> {
    VARIATIONS.iter().find(|v| v.name == name)
}

pub fn is_variation(name: &str) -> bool {
    get_variation(name).is_some()
}
