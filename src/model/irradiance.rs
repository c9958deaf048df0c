//! Plane-of-array irradiance: angle of incidence, Hay-Davies transposition
//! and the physical incidence angle modifier.

use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;

/// Ground reflectance used for the reflected component
pub const DEFAULT_ALBEDO: f64 = 0.25;

/// Irradiance components on a tilted surface, W/m²
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PoaIrradiance {
    pub poa_global: f64,
    pub poa_direct: f64,
    pub poa_diffuse: f64,
    pub poa_sky_diffuse: f64,
    pub poa_ground_diffuse: f64,
}

/// Orientation of a fixed mount
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceOrientation {
    pub tilt_deg: f64,
    /// Degrees clockwise from north
    pub azimuth_deg: f64,
}

impl SurfaceOrientation {
    /// Cosine of the angle between the surface normal and the sun
    pub fn aoi_projection(&self, zenith_deg: f64, sun_azimuth_deg: f64) -> f64 {
        let tilt = self.tilt_deg * DEG;
        let zenith = zenith_deg * DEG;
        let projection = tilt.cos() * zenith.cos()
            + tilt.sin() * zenith.sin() * ((sun_azimuth_deg - self.azimuth_deg) * DEG).cos();
        projection.clamp(-1.0, 1.0)
    }

    /// Angle of incidence in degrees
    pub fn aoi(&self, zenith_deg: f64, sun_azimuth_deg: f64) -> f64 {
        self.aoi_projection(zenith_deg, sun_azimuth_deg).acos() / DEG
    }
}

/// Sky diffuse irradiance on the surface, split into circumsolar and isotropic parts
/// weighted by the anisotropy index `dni / dni_extra`
pub fn haydavies(
    surface: SurfaceOrientation,
    dhi: f64,
    dni: f64,
    dni_extra: f64,
    zenith_deg: f64,
    sun_azimuth_deg: f64,
) -> f64 {
    let cos_tt = surface.aoi_projection(zenith_deg, sun_azimuth_deg).max(0.0);
    let cos_zenith = (zenith_deg * DEG).cos().max(0.01745);
    let rb = cos_tt / cos_zenith;

    let anisotropy = if dni_extra > 0.0 { dni / dni_extra } else { 0.0 };
    let isotropic = (dhi * (1.0 - anisotropy) * 0.5 * (1.0 + (surface.tilt_deg * DEG).cos())).max(0.0);
    let circumsolar = (dhi * anisotropy * rb).max(0.0);

    isotropic + circumsolar
}

/// Ground-reflected irradiance seen by the surface
pub fn ground_diffuse(tilt_deg: f64, ghi: f64, albedo: f64) -> f64 {
    ghi * albedo * (1.0 - (tilt_deg * DEG).cos()) * 0.5
}

/// Total plane-of-array irradiance
#[allow(clippy::too_many_arguments)]
pub fn total_irradiance(
    surface: SurfaceOrientation,
    zenith_deg: f64,
    sun_azimuth_deg: f64,
    dni: f64,
    ghi: f64,
    dhi: f64,
    dni_extra: f64,
    albedo: f64,
) -> PoaIrradiance {
    let aoi = surface.aoi(zenith_deg, sun_azimuth_deg);
    let sky = haydavies(surface, dhi, dni, dni_extra, zenith_deg, sun_azimuth_deg);
    let ground = ground_diffuse(surface.tilt_deg, ghi, albedo);

    let direct = (dni * (aoi * DEG).cos()).max(0.0);
    let diffuse = sky + ground;

    PoaIrradiance {
        poa_global: direct + diffuse,
        poa_direct: direct,
        poa_diffuse: diffuse,
        poa_sky_diffuse: sky,
        poa_ground_diffuse: ground,
    }
}

/// Incidence angle modifier from Fresnel reflection and absorption in the glazing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalIam {
    /// Refractive index of the cover
    pub n: f64,
    /// Glazing extinction coefficient, 1/m
    pub k: f64,
    /// Glazing thickness, m
    pub l: f64,
}

impl Default for PhysicalIam {
    fn default() -> Self {
        Self { n: 1.526, k: 4.0, l: 0.002 }
    }
}

impl PhysicalIam {
    fn transmittance(&self, cos_i: f64) -> f64 {
        let sin_i = (1.0 - cos_i * cos_i).max(0.0).sqrt();
        let sin_t = sin_i / self.n;
        let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();

        let rs = ((cos_i - self.n * cos_t) / (cos_i + self.n * cos_t)).powi(2);
        let rp = ((cos_t - self.n * cos_i) / (cos_t + self.n * cos_i)).powi(2);
        let absorption = (-self.k * self.l / cos_t).exp();

        0.5 * ((1.0 - rs) + (1.0 - rp)) * absorption
    }

    /// Modifier relative to normal incidence; zero at or beyond 90°
    pub fn modifier(&self, aoi_deg: f64) -> f64 {
        if !(aoi_deg.abs() < 90.0) {
            return 0.0;
        }
        let tau = self.transmittance((aoi_deg * DEG).cos());
        let tau0 = self.transmittance(1.0);
        (tau / tau0).max(0.0)
    }
}
