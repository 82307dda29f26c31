use std::{fmt, str::FromStr};

use crate::foundation::{
    core::SAMPLE_MAX,
    error::{FxError, FxResult},
};

/// 3x3 convolution weights indexed `[dy + 1][dx + 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kernel {
    pub weights: [[f64; 3]; 3],
}

impl Kernel {
    pub const fn new(weights: [[f64; 3]; 3]) -> Self {
        Self { weights }
    }

    /// Weight applied to the neighbour at offset `(dx, dy)`, both in `-1..=1`.
    pub fn at(&self, dx: i64, dy: i64) -> f64 {
        self.weights[(dy + 1) as usize][(dx + 1) as usize]
    }

    pub fn sum(&self) -> f64 {
        self.weights.iter().flatten().sum()
    }
}

const NINTH: f64 = 1.0 / 9.0;

pub const SHARPEN: Kernel = Kernel::new([[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]]);

pub const EDGE_DETECT: Kernel = Kernel::new([
    [-1.0, -1.0, -1.0],
    [-1.0, 8.0, -1.0],
    [-1.0, -1.0, -1.0],
]);

pub const BOX_BLUR: Kernel = Kernel::new([
    [NINTH, NINTH, NINTH],
    [NINTH, NINTH, NINTH],
    [NINTH, NINTH, NINTH],
]);

/// The closed set of effects an effect record may name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Effect {
    /// `S`
    Sharpen,
    /// `E`
    EdgeDetect,
    /// `B`
    Blur,
    /// `G`
    Grayscale,
}

/// What a pass does with each pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectOp {
    Convolve(&'static Kernel),
    Grayscale,
}

impl Effect {
    pub const ALL: [Effect; 4] = [
        Effect::Sharpen,
        Effect::EdgeDetect,
        Effect::Blur,
        Effect::Grayscale,
    ];

    pub fn from_code(code: &str) -> FxResult<Self> {
        match code {
            "S" => Ok(Self::Sharpen),
            "E" => Ok(Self::EdgeDetect),
            "B" => Ok(Self::Blur),
            "G" => Ok(Self::Grayscale),
            _ => Err(FxError::validation(format!("unknown effect code '{code}'"))),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Sharpen => "S",
            Self::EdgeDetect => "E",
            Self::Blur => "B",
            Self::Grayscale => "G",
        }
    }

    pub fn op(self) -> EffectOp {
        match self {
            Self::Sharpen => EffectOp::Convolve(&SHARPEN),
            Self::EdgeDetect => EffectOp::Convolve(&EDGE_DETECT),
            Self::Blur => EffectOp::Convolve(&BOX_BLUR),
            Self::Grayscale => EffectOp::Grayscale,
        }
    }

    pub fn kernel(self) -> Option<&'static Kernel> {
        match self.op() {
            EffectOp::Convolve(k) => Some(k),
            EffectOp::Grayscale => None,
        }
    }
}

impl FromStr for Effect {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Resolves every code up front; the first unknown code fails the whole list.
pub fn parse_effect_codes<S: AsRef<str>>(codes: &[S]) -> FxResult<Vec<Effect>> {
    codes.iter().map(|c| Effect::from_code(c.as_ref())).collect()
}

/// Saturates an accumulated channel value into `[0, 65535]`, rounding to nearest.
///
/// NaN maps to 0.
pub fn clamp_sample(v: f64) -> u16 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, f64::from(SAMPLE_MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_saturates_both_ends() {
        assert_eq!(clamp_sample(-500.0), 0);
        assert_eq!(clamp_sample(70000.0), 65535);
        assert_eq!(clamp_sample(f64::NEG_INFINITY), 0);
        assert_eq!(clamp_sample(f64::INFINITY), 65535);
        assert_eq!(clamp_sample(f64::NAN), 0);
    }

    #[test]
    fn clamp_is_identity_on_sample_range() {
        for x in [0u16, 1, 2, 255, 256, 32767, 32768, 65534, 65535] {
            assert_eq!(clamp_sample(f64::from(x)), x);
        }
    }

    #[test]
    fn catalog_maps_codes_to_kernels() {
        assert_eq!(Effect::from_code("S").unwrap().kernel(), Some(&SHARPEN));
        assert_eq!(Effect::from_code("E").unwrap().kernel(), Some(&EDGE_DETECT));
        assert_eq!(Effect::from_code("B").unwrap().kernel(), Some(&BOX_BLUR));
        assert_eq!(Effect::from_code("G").unwrap().op(), EffectOp::Grayscale);
        for e in Effect::ALL {
            assert_eq!(Effect::from_code(e.code()).unwrap(), e);
            assert_eq!(e.to_string(), e.code());
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        for code in ["X", "s", "", "SE", " S"] {
            let err = Effect::from_code(code).unwrap_err();
            assert!(err.to_string().contains("unknown effect code"));
        }
        assert!(parse_effect_codes(&["S", "X", "B"]).is_err());
        assert_eq!(
            parse_effect_codes(&["S", "G"]).unwrap(),
            vec![Effect::Sharpen, Effect::Grayscale]
        );
    }

    #[test]
    fn kernel_sums_match_their_role() {
        assert_eq!(SHARPEN.sum(), 1.0);
        assert_eq!(EDGE_DETECT.sum(), 0.0);
        assert!((BOX_BLUR.sum() - 1.0).abs() < 1e-12);
        assert_eq!(SHARPEN.at(0, 0), 5.0);
        assert_eq!(SHARPEN.at(-1, -1), 0.0);
        assert_eq!(EDGE_DETECT.at(1, -1), -1.0);
    }
}
