use std::f64::consts::TAU;

use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::math;

/// Four-channel noise used for cosmetic vertex displacement.
///
/// Channels are expected in `[0, 1]`; `0.5` means "no displacement".
pub trait NoiseSource: Send + Sync {
    /// Samples the noise at noise-space coordinates.
    fn sample(&self, x: f32, z: f32) -> Vec4;
}

impl<F> NoiseSource for F
where
    F: Fn(f32, f32) -> Vec4 + Send + Sync,
{
    fn sample(&self, x: f32, z: f32) -> Vec4 {
        self(x, z)
    }
}

/// Returns the same sample everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantNoise(pub Vec4);

impl ConstantNoise {
    /// Mid-range on every channel: perturbation becomes a no-op.
    pub const NEUTRAL: Self = Self(Vec4::splat(0.5));
}

impl NoiseSource for ConstantNoise {
    fn sample(&self, _x: f32, _z: f32) -> Vec4 {
        self.0
    }
}

/// Tileable fractal noise, one seeded `Fbm<Perlin>` per channel.
///
/// Each noise-space axis is wrapped onto a circle in 4D, so the pattern
/// repeats every `period` units without a seam.
pub struct FbmNoise {
    channels: [Fbm<Perlin>; 4],
    period: f64,
    frequency: f64,
}

impl FbmNoise {
    /// Creates the four channel generators from consecutive seeds.
    pub fn new(seed: u32, octaves: usize, period: f64, frequency: f64) -> Self {
        Self {
            channels: std::array::from_fn(|i| {
                Fbm::<Perlin>::new(seed.wrapping_add(i as u32)).set_octaves(octaves)
            }),
            period,
            frequency,
        }
    }
}

impl NoiseSource for FbmNoise {
    fn sample(&self, x: f32, z: f32) -> Vec4 {
        let radius = self.frequency / TAU;
        let ax = x as f64 / self.period * TAU;
        let az = z as f64 / self.period * TAU;
        let point = [
            ax.cos() * radius,
            ax.sin() * radius,
            az.cos() * radius,
            az.sin() * radius,
        ];
        let [r, g, b, a] = self
            .channels
            .each_ref()
            .map(|fbm| math::map_noise_to_range(fbm.get(point), 0.0, 1.0).clamp(0.0, 1.0));
        Vec4::new(r, g, b, a)
    }
}
