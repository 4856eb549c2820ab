//! Cloud cover to irradiance conversion.
//!
//! Two models are available. [`IrradianceModel::ClearskyScaling`] scales the
//! Ineichen-Perez clear-sky GHI linearly by cloud cover and splits it into beam and
//! diffuse light with the DISC model. [`IrradianceModel::LiuJordan`] derives an
//! atmospheric transmittance from cloud cover and decomposes it with Liu-Jordan.

use crate::solar::position::SolarPosition;
use std::fmt;
use std::str::FromStr;

/// Extraterrestrial irradiance assumed by the Liu-Jordan model, W/m2.
pub const DNI_EXTRA: f64 = 1367.0;

/// Linke turbidity used for the clear-sky model when no climatology is available.
pub const DEFAULT_LINKE_TURBIDITY: f64 = 3.0;

/// Share of clear-sky GHI that remains under full overcast.
const OVERCAST_GHI_FRACTION: f64 = 0.35;

/// Clear-sky atmospheric transmittance used when scaling by cloud cover.
const CLEAR_SKY_TRANSMITTANCE: f64 = 0.75;

const DISC_MAX_ZENITH: f64 = 87.0;
const DISC_MAX_AIRMASS: f64 = 12.0;
const DISC_MIN_COS_ZENITH: f64 = 0.065;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Irradiance {
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
}

/// How total cloud cover is turned into GHI, DNI and DHI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IrradianceModel {
    /// Ineichen clear sky scaled by cloud cover, DNI from DISC.
    #[default]
    ClearskyScaling,
    /// Liu-Jordan with a cloud-cover dependent transmittance.
    LiuJordan,
}

impl fmt::Display for IrradianceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrradianceModel::ClearskyScaling => f.write_str("clearsky_scaling"),
            IrradianceModel::LiuJordan => f.write_str("liu_jordan"),
        }
    }
}

impl FromStr for IrradianceModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "clearsky_scaling" => Ok(IrradianceModel::ClearskyScaling),
            "liu_jordan" => Ok(IrradianceModel::LiuJordan),
            other => Err(format!(
                "unknown irradiance model '{other}', expected 'clearsky_scaling' or 'liu_jordan'"
            )),
        }
    }
}

/// Extraterrestrial normal irradiance for a day of the year, Spencer (1971).
pub fn extra_radiation(day_of_year: u32, solar_constant: f64) -> f64 {
    let b = 2.0 * std::f64::consts::PI / 365.0 * (day_of_year as f64 - 1.0);
    let r_over_r0_squared = 1.00011
        + 0.034221 * b.cos()
        + 0.00128 * b.sin()
        + 0.000719 * (2.0 * b).cos()
        + 0.000077 * (2.0 * b).sin();
    solar_constant * r_over_r0_squared
}

/// Relative optical airmass after Kasten and Young (1989), or `None` when the sun
/// is at or below the horizon.
pub fn relative_airmass(apparent_zenith: f64) -> Option<f64> {
    if !(0.0..90.0).contains(&apparent_zenith) {
        return None;
    }
    let cos_z = apparent_zenith.to_radians().cos();
    Some(1.0 / (cos_z + 0.50572 * (96.07995 - apparent_zenith).powf(-1.6364)))
}

/// Relative optical airmass after Kasten (1966), as used by DISC.
fn relative_airmass_kasten1966(zenith: f64) -> Option<f64> {
    if !(0.0..=90.0).contains(&zenith) {
        return None;
    }
    Some(1.0 / (zenith.to_radians().cos() + 0.15 * (93.885 - zenith).powf(-1.253)))
}

/// Ineichen-Perez clear-sky irradiance at sea level.
pub fn ineichen(apparent_zenith: f64, day_of_year: u32, linke_turbidity: f64) -> Irradiance {
    let Some(airmass) = relative_airmass(apparent_zenith) else {
        return Irradiance::default();
    };
    let cos_z = apparent_zenith.to_radians().cos().max(0.0);
    let dni_extra = extra_radiation(day_of_year, 1366.1);
    let tl = linke_turbidity;

    // Altitude terms at 0 m: fh1 = fh2 = 1.
    let cg1 = 0.868;
    let cg2 = 0.0387;
    let ghi = cg1 * dni_extra * cos_z * (-cg2 * airmass * tl).exp().max(0.0);

    let b = 0.664 + 0.163;
    let bnci = dni_extra * (b * (-0.09 * airmass * (tl - 1.0)).exp()).max(0.0);
    let bnci_2 = (1.0 - (0.1 - 0.2 * (-tl).exp()) / (0.1 + 0.882)) / cos_z;
    let bnci_2 = ghi * bnci_2.clamp(0.0, 1e20);

    let dni = bnci.min(bnci_2);
    Irradiance {
        ghi,
        dni,
        dhi: ghi - dni * cos_z,
    }
}

/// Direct normal irradiance estimated from GHI with the DISC model (Maxwell 1987).
pub fn disc(ghi: f64, zenith: f64, day_of_year: u32) -> f64 {
    if zenith > DISC_MAX_ZENITH || ghi < 0.0 {
        return 0.0;
    }
    let Some(airmass) = relative_airmass_kasten1966(zenith) else {
        return 0.0;
    };
    let airmass = airmass.min(DISC_MAX_AIRMASS);
    let i0 = extra_radiation(day_of_year, 1370.0);
    let cos_z = zenith.to_radians().cos().max(DISC_MIN_COS_ZENITH);
    let kt = (ghi / (i0 * cos_z)).clamp(0.0, 1.0);

    let kt2 = kt * kt;
    let kt3 = kt2 * kt;
    let (a, b, c) = if kt <= 0.6 {
        (
            0.512 - 1.56 * kt + 2.286 * kt2 - 2.222 * kt3,
            0.37 + 0.962 * kt,
            -0.28 + 0.932 * kt - 2.048 * kt2,
        )
    } else {
        (
            -5.743 + 21.77 * kt - 27.49 * kt2 + 11.56 * kt3,
            41.4 - 118.5 * kt + 66.05 * kt2 + 31.9 * kt3,
            -47.01 + 184.2 * kt - 222.0 * kt2 + 73.81 * kt3,
        )
    };
    let delta_kn = a + b * (c * airmass).exp();
    let knc = 0.866 - 0.122 * airmass + 0.0121 * airmass.powi(2) - 0.000653 * airmass.powi(3)
        + 1.4e-05 * airmass.powi(4);

    let dni = (knc - delta_kn) * i0;
    if dni < 0.0 {
        0.0
    } else {
        dni
    }
}

/// Scales clear-sky GHI linearly from 100 % at clear sky down to the overcast
/// fraction at full cloud cover.
pub fn cloud_cover_to_ghi_linear(total_clouds: f64, ghi_clear: f64) -> f64 {
    let cover = total_clouds.clamp(0.0, 100.0) / 100.0;
    (OVERCAST_GHI_FRACTION + (1.0 - OVERCAST_GHI_FRACTION) * (1.0 - cover)) * ghi_clear
}

/// Cloud-scaled Ineichen GHI, DNI from DISC, DHI as the remainder.
pub fn clearsky_scaling(position: &SolarPosition, day_of_year: u32, total_clouds: f64) -> Irradiance {
    let clear = ineichen(position.apparent_zenith, day_of_year, DEFAULT_LINKE_TURBIDITY);
    let ghi = cloud_cover_to_ghi_linear(total_clouds, clear.ghi);
    let dni = disc(ghi, position.zenith, day_of_year);
    Irradiance {
        ghi,
        dni,
        dhi: ghi - dni * position.zenith.to_radians().cos(),
    }
}

/// Liu-Jordan decomposition of beam and diffuse light for a given transmittance.
/// Returns zero irradiance when the sun is down.
pub fn liu_jordan(apparent_zenith: f64, transmittance: f64) -> Irradiance {
    let Some(airmass) = relative_airmass(apparent_zenith) else {
        return Irradiance::default();
    };
    let cos_z = apparent_zenith.to_radians().cos();
    let beam_fraction = transmittance.powf(airmass);

    let dni = DNI_EXTRA * beam_fraction;
    let dhi = 0.3 * (1.0 - beam_fraction) * DNI_EXTRA * cos_z;
    Irradiance {
        ghi: dhi + dni * cos_z,
        dni,
        dhi,
    }
}

/// Transmittance for a total cloud cover percentage.
pub fn cloud_cover_to_transmittance(total_clouds: f64) -> f64 {
    let cover = total_clouds.clamp(0.0, 100.0);
    (100.0 - cover) / 100.0 * CLEAR_SKY_TRANSMITTANCE
}

/// Estimates GHI, DNI and DHI from the total cloud cover at a sun position.
pub fn cloud_cover_to_irradiance(
    model: IrradianceModel,
    position: &SolarPosition,
    day_of_year: u32,
    total_clouds: f64,
) -> Irradiance {
    match model {
        IrradianceModel::ClearskyScaling => clearsky_scaling(position, day_of_year, total_clouds),
        IrradianceModel::LiuJordan => liu_jordan(
            position.apparent_zenith,
            cloud_cover_to_transmittance(total_clouds),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overhead() -> SolarPosition {
        SolarPosition {
            zenith: 20.0,
            apparent_zenith: 19.99,
            elevation: 70.01,
            azimuth: 180.0,
        }
    }

    #[test]
    fn test_airmass_at_zenith_is_one() {
        let am = relative_airmass(0.0).unwrap();
        assert!((am - 1.0).abs() < 1e-3, "airmass {am}");
        assert!(relative_airmass(60.0).unwrap() > 1.9);
        assert_eq!(relative_airmass(90.0), None);
        assert_eq!(relative_airmass(120.0), None);
    }

    #[test]
    fn test_extra_radiation_follows_earth_sun_distance() {
        // Perihelion in early January, aphelion in early July.
        let january = extra_radiation(3, 1366.1);
        let july = extra_radiation(185, 1366.1);
        assert!(january > 1400.0 && january < 1420.0, "january {january}");
        assert!(july > 1315.0 && july < 1330.0, "july {july}");
    }

    #[test]
    fn test_ineichen_at_zenith() {
        let clear = ineichen(0.0, 80, 3.0);
        assert!(clear.ghi > 1000.0 && clear.ghi < 1100.0, "ghi {}", clear.ghi);
        assert!(clear.dni > 900.0 && clear.dni < 1000.0, "dni {}", clear.dni);
        assert!((clear.ghi - clear.dni - clear.dhi).abs() < 1e-6);
        assert_eq!(ineichen(95.0, 80, 3.0), Irradiance::default());
    }

    #[test]
    fn test_ghi_linear_scaling() {
        assert_eq!(cloud_cover_to_ghi_linear(0.0, 1000.0), 1000.0);
        assert!((cloud_cover_to_ghi_linear(100.0, 1000.0) - 350.0).abs() < 1e-9);
        assert!((cloud_cover_to_ghi_linear(50.0, 1000.0) - 675.0).abs() < 1e-9);
    }

    #[test]
    fn test_disc_splits_clear_and_overcast() {
        let clear = disc(1000.0, 20.0, 172);
        assert!(clear > 700.0, "clear dni {clear}");
        let overcast = disc(150.0, 20.0, 172);
        assert!(overcast < 50.0, "overcast dni {overcast}");
        assert_eq!(disc(20.0, 88.0, 172), 0.0);
    }

    #[test]
    fn test_clearsky_scaling_is_the_default() {
        assert_eq!(IrradianceModel::default(), IrradianceModel::ClearskyScaling);
        let clear = cloud_cover_to_irradiance(IrradianceModel::default(), &overhead(), 172, 0.0);
        let cloudy = cloud_cover_to_irradiance(IrradianceModel::default(), &overhead(), 172, 100.0);
        assert!(clear.ghi > 850.0, "ghi {}", clear.ghi);
        assert!((cloudy.ghi - 0.35 * clear.ghi).abs() < 1e-6);
        assert!(cloudy.dni < clear.dni);
        let cos_z = 20f64.to_radians().cos();
        assert!((clear.ghi - clear.dni * cos_z - clear.dhi).abs() < 1e-6);
    }

    #[test]
    fn test_model_names() {
        assert_eq!("clearsky_scaling".parse(), Ok(IrradianceModel::ClearskyScaling));
        assert_eq!("Liu-Jordan".parse(), Ok(IrradianceModel::LiuJordan));
        assert!("perez".parse::<IrradianceModel>().is_err());
        assert_eq!(IrradianceModel::LiuJordan.to_string(), "liu_jordan");
    }

    #[test]
    fn test_clear_sky_at_zenith() {
        let irr = liu_jordan(0.0, cloud_cover_to_transmittance(0.0));
        // 1367 * 0.75^1
        assert!((irr.dni - 1025.25).abs() < 1.0, "dni {}", irr.dni);
        assert!((irr.dhi - 0.3 * 0.25 * 1367.0).abs() < 1.0, "dhi {}", irr.dhi);
        assert!((irr.ghi - (irr.dni + irr.dhi)).abs() < 1e-6);
    }

    #[test]
    fn test_overcast_has_no_beam() {
        let irr = liu_jordan(30.0, cloud_cover_to_transmittance(100.0));
        assert_eq!(irr.dni, 0.0);
        assert!(irr.dhi > 0.0);
        assert!((irr.ghi - irr.dhi).abs() < 1e-9);
    }

    #[test]
    fn test_more_clouds_less_light() {
        let clear = liu_jordan(40.0, cloud_cover_to_transmittance(10.0));
        let cloudy = liu_jordan(40.0, cloud_cover_to_transmittance(80.0));
        assert!(cloudy.ghi < clear.ghi);
        assert!(cloudy.dni < clear.dni);
    }

    #[test]
    fn test_night_is_dark() {
        assert_eq!(liu_jordan(95.0, 0.75), Irradiance::default());
        let night = SolarPosition {
            zenith: 110.0,
            apparent_zenith: 110.0,
            elevation: -20.0,
            azimuth: 0.0,
        };
        assert_eq!(
            cloud_cover_to_irradiance(IrradianceModel::ClearskyScaling, &night, 172, 20.0),
            Irradiance::default()
        );
    }
}
