//! # Reference frames and coordinate transforms
//!
//! Elementary rotations, Cartesian ↔ spherical conversions, the ecliptic ↔ equatorial
//! rotation, the equatorial → horizontal transform and stellar aberration.
//!
//! Angles are radians unless the name says otherwise. Azimuths are measured from north
//! through east, in [0, 2π).
use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::{Radian, DPI, VLIGHT_AU};

/// Coordinate axis of an elementary rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Construct a rotation matrix around one of the principal axes (X, Y, or Z).
///
/// # Arguments
///
/// * `alpha` - Rotation angle in radians (counterclockwise seen from the positive axis).
/// * `axis` - Axis of rotation.
///
/// # Returns
///
/// A 3×3 rotation matrix `R` such that the rotated vector is `x' = R · x`.
///
/// # Remarks
///
/// * The rotation is **applied to the vector** in a fixed frame and does **not** represent a
///   change of basis: the frame rotation by `α` is `rotmt(-α, axis)`.
/// * The returned matrix is orthonormal and satisfies `R.transpose() == R.inverse()`.
///
/// # See also
/// * [`precession_matrix`](crate::earth_orientation::precession_matrix)
/// * [`nutation_matrix`](crate::earth_orientation::nutation_matrix)
pub fn rotmt(alpha: f64, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Rotation taking ecliptic coordinates to equatorial coordinates for obliquity `eps`.
pub fn ecliptic_to_equatorial(eps: Radian) -> Matrix3<f64> {
    rotmt(eps, Axis::X)
}

/// Rotation taking equatorial coordinates to ecliptic coordinates for obliquity `eps`.
pub fn equatorial_to_ecliptic(eps: Radian) -> Matrix3<f64> {
    rotmt(-eps, Axis::X)
}

/// Convert a 3D Cartesian position vector to right ascension and declination.
///
/// Arguments
/// ---------
/// * `cartesian_position`: 3D position vector in Cartesian coordinates [AU or any length unit].
///
/// Returns
/// --------
/// * Tuple `(α, δ, ρ)`:
///     - `α`: longitude-like angle in radians, in the range [0, 2π).
///     - `δ`: latitude-like angle in radians, in the range [−π/2, +π/2].
///     - `ρ`: Euclidean norm of the vector (distance to the origin).
///
/// Remarks
/// -------
/// * If the input vector has zero norm, the result is `(0.0, 0.0, 0.0)`.
/// * Works for any frame: in an ecliptic frame the angles are ecliptic longitude and latitude.
pub fn cartesian_to_radec(cartesian_position: Vector3<f64>) -> (Radian, Radian, f64) {
    let pos_norm = cartesian_position.norm();
    if pos_norm == 0. {
        return (0.0, 0.0, pos_norm);
    }

    let delta = (cartesian_position.z / pos_norm).clamp(-1.0, 1.0).asin();
    let alpha = cartesian_position
        .y
        .atan2(cartesian_position.x)
        .rem_euclid(DPI);
    (alpha, delta, pos_norm)
}

/// Unit vector pointing at `(α, δ)`.
pub fn radec_to_unit(ra: Radian, dec: Radian) -> Vector3<f64> {
    let (sd, cd) = dec.sin_cos();
    let (sa, ca) = ra.sin_cos();
    Vector3::new(cd * ca, cd * sa, sd)
}

/// Apply first-order annual aberration to a geocentric direction.
///
/// Arguments
/// ---------
/// * `xrel`: position of the object relative to the observer [AU] (or a unit vector).
/// * `v_observer`: barycentric velocity of the observer [AU/day].
///
/// Returns
/// --------
/// * Displaced vector (same norm to first order) pointing at the apparent direction:
/// ```text
/// x_app = xrel + (‖xrel‖ / c) · v_observer
/// ```
pub fn correct_aberration(xrel: Vector3<f64>, v_observer: Vector3<f64>) -> Vector3<f64> {
    let dt = xrel.norm() / VLIGHT_AU;
    xrel + dt * v_observer
}

/// Horizontal coordinates of a body from its local hour angle and declination.
///
/// Arguments
/// ---------
/// * `hour_angle`: local hour angle (west positive), radians.
/// * `dec`: declination of date, radians.
/// * `latitude`: geodetic latitude of the observer, radians.
///
/// Returns
/// --------
/// * `(altitude, azimuth)` in radians, azimuth from north through east in [0, 2π).
pub fn equatorial_to_horizontal(hour_angle: Radian, dec: Radian, latitude: Radian) -> (Radian, Radian) {
    let (sh, ch) = hour_angle.sin_cos();
    let (sd, cd) = dec.sin_cos();
    let (sp, cp) = latitude.sin_cos();

    let alt = (sp * sd + cp * cd * ch).clamp(-1.0, 1.0).asin();
    let az = (-cd * sh).atan2(sd * cp - cd * sp * ch).rem_euclid(DPI);
    (alt, az)
}
