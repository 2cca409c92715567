use anyhow::{Context, bail};
use glam::{Quat, Vec3};
use itertools::Itertools;
use mu_files::common::types::{C3Vector, C4Quaternion};

/// Unity is Y-up, the scene is Z-up: swap the second and third component.
#[inline]
pub fn convert_vector(source: Vec3) -> Vec3 {
    Vec3::new(source.x, source.z, source.y)
}

/// Unity is left handed and stores (x, y, z, w). Swapping y and z fixes the up axis and
/// negating the vector part reverses the rotation direction, so in (w, x, y, z) order the
/// result is (w, -x, -z, -y).
#[inline]
pub fn convert_quaternion(source: Quat) -> Quat {
    Quat::from_xyzw(-source.x, -source.z, -source.y, source.w)
}

#[inline]
pub fn mu_to_scene_vector(source: C3Vector) -> Vec3 {
    convert_vector(Vec3::new(source.x, source.y, source.z))
}

#[inline]
pub fn mu_to_scene_quaternion(source: C4Quaternion) -> Quat {
    convert_quaternion(Quat::from_xyzw(source.x, source.y, source.z, source.w))
}

/// Parses `x,y,z` as written in craft files, without any conversion.
pub fn parse_vector(value: &str) -> anyhow::Result<Vec3> {
    Ok(Vec3::from_array(parse_components::<3>(value)?))
}

/// Parses `x,y,z,w` as written in craft files, without any conversion.
pub fn parse_quaternion(value: &str) -> anyhow::Result<Quat> {
    Ok(Quat::from_array(parse_components::<4>(value)?))
}

pub fn read_vector(value: &str) -> anyhow::Result<Vec3> {
    parse_vector(value).map(convert_vector)
}

pub fn read_quaternion(value: &str) -> anyhow::Result<Quat> {
    parse_quaternion(value).map(convert_quaternion)
}

fn parse_components<const N: usize>(value: &str) -> anyhow::Result<[f32; N]> {
    let splits = value.split(',').map(str::trim).collect_vec();
    if splits.len() != N {
        bail!(
            "Expected {} comma separated numbers, found {} in '{}'",
            N,
            splits.len(),
            value
        );
    }

    let mut components = [0.0; N];
    for (slot, split) in components.iter_mut().zip(splits) {
        *slot = split
            .parse::<f32>()
            .with_context(|| format!("'{}' is not a number in '{}'", split, value))?;
    }
    Ok(components)
}
