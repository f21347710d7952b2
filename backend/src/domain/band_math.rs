//! Arithmetic over Sentinel-2 bands.
//!
//! Index formulas are expressed as a small tree that outbound adapters
//! translate into engine-native image operations. The tree also renders as
//! a human-readable formula for index metadata.

use std::fmt;

/// Sentinel-2 surface reflectance band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Band {
    /// Blue, 490 nm.
    B2,
    /// Red, 665 nm.
    B4,
    /// Near infrared, 842 nm.
    B8,
    /// Short-wave infrared, 1610 nm.
    B11,
}

impl Band {
    /// Band identifier as stored in the collection.
    pub fn id(self) -> &'static str {
        match self {
            Self::B2 => "B2",
            Self::B4 => "B4",
            Self::B8 => "B8",
            Self::B11 => "B11",
        }
    }

    /// Conventional spectral label used in formulas.
    pub fn label(self) -> &'static str {
        match self {
            Self::B2 => "BLUE",
            Self::B4 => "RED",
            Self::B8 => "NIR",
            Self::B11 => "SWIR1",
        }
    }
}

/// Binary operator in a band expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `lhs + rhs`
    Add,
    /// `lhs - rhs`
    Subtract,
    /// `lhs * rhs`
    Multiply,
    /// `lhs / rhs`
    Divide,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Subtract => 1,
            Self::Multiply | Self::Divide => 2,
        }
    }
}

/// Expression tree over reflectance bands and constants.
///
/// # Examples
/// ```
/// use agriscope_backend::domain::{Band, BandExpr};
///
/// let ndvi = BandExpr::band(Band::B8)
///     .minus(BandExpr::band(Band::B4))
///     .over(BandExpr::band(Band::B8).plus(BandExpr::band(Band::B4)));
/// assert_eq!(ndvi.to_string(), "(NIR - RED) / (NIR + RED)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum BandExpr {
    /// Reflectance of one band.
    Band(Band),
    /// Scalar constant.
    Constant(f64),
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<BandExpr>,
        /// Right operand.
        rhs: Box<BandExpr>,
    },
}

impl BandExpr {
    /// Leaf reading one band.
    pub fn band(band: Band) -> Self {
        Self::Band(band)
    }

    /// Leaf holding a constant.
    pub fn constant(value: f64) -> Self {
        Self::Constant(value)
    }

    fn binary(self, op: BinaryOp, rhs: Self) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }

    /// `self + rhs`
    pub fn plus(self, rhs: Self) -> Self {
        self.binary(BinaryOp::Add, rhs)
    }

    /// `self - rhs`
    pub fn minus(self, rhs: Self) -> Self {
        self.binary(BinaryOp::Subtract, rhs)
    }

    /// `self * rhs`
    pub fn times(self, rhs: Self) -> Self {
        self.binary(BinaryOp::Multiply, rhs)
    }

    /// `self / rhs`
    pub fn over(self, rhs: Self) -> Self {
        self.binary(BinaryOp::Divide, rhs)
    }

    /// Distinct bands read by the expression, in band order.
    pub fn bands(&self) -> Vec<Band> {
        let mut bands = Vec::new();
        self.collect_bands(&mut bands);
        bands.sort();
        bands.dedup();
        bands
    }

    fn collect_bands(&self, out: &mut Vec<Band>) {
        match self {
            Self::Band(band) => out.push(*band),
            Self::Constant(_) => {}
            Self::Binary { lhs, rhs, .. } => {
                lhs.collect_bands(out);
                rhs.collect_bands(out);
            }
        }
    }

    /// Evaluate against per-band reflectance values.
    ///
    /// Used to sanity-check formulas; the engine performs the real math.
    pub fn evaluate(&self, reflectance: &impl Fn(Band) -> f64) -> f64 {
        match self {
            Self::Band(band) => reflectance(*band),
            Self::Constant(value) => *value,
            Self::Binary { op, lhs, rhs } => {
                let l = lhs.evaluate(reflectance);
                let r = rhs.evaluate(reflectance);
                match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Subtract => l - r,
                    BinaryOp::Multiply => l * r,
                    BinaryOp::Divide => l / r,
                }
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent: BinaryOp, right: bool) -> fmt::Result {
        let needs_parens = match self {
            Self::Binary { op, .. } => {
                op.precedence() < parent.precedence()
                    || (right
                        && op.precedence() == parent.precedence()
                        && matches!(parent, BinaryOp::Subtract | BinaryOp::Divide))
                    || (matches!(parent, BinaryOp::Divide) && !right)
            }
            _ => false,
        };
        if needs_parens {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for BandExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Band(band) => f.write_str(band.label()),
            Self::Constant(value) => write!(f, "{value}"),
            Self::Binary { op, lhs, rhs } => {
                lhs.fmt_operand(f, *op, false)?;
                write!(f, " {} ", op.symbol())?;
                rhs.fmt_operand(f, *op, true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nir() -> BandExpr {
        BandExpr::band(Band::B8)
    }

    fn red() -> BandExpr {
        BandExpr::band(Band::B4)
    }

    #[test]
    fn renders_minimal_parentheses() {
        let expr = nir().minus(red()).over(nir().plus(red()));
        assert_eq!(expr.to_string(), "(NIR - RED) / (NIR + RED)");

        let scaled = BandExpr::constant(2.5).times(nir().minus(red()));
        assert_eq!(scaled.to_string(), "2.5 * (NIR - RED)");

        let chain = nir().plus(red()).plus(BandExpr::constant(0.5));
        assert_eq!(chain.to_string(), "NIR + RED + 0.5");
    }

    #[test]
    fn keeps_right_associativity_visible() {
        let expr = nir().minus(BandExpr::constant(2.0).times(red()).minus(BandExpr::band(Band::B2)));
        assert_eq!(expr.to_string(), "NIR - (2 * RED - BLUE)");
    }

    #[test]
    fn lists_distinct_bands_in_order() {
        let expr = nir().minus(BandExpr::band(Band::B2)).over(nir().plus(BandExpr::band(Band::B11)));
        assert_eq!(expr.bands(), vec![Band::B2, Band::B8, Band::B11]);
    }

    #[test]
    fn evaluates_against_reflectance() {
        let expr = nir().minus(red()).over(nir().plus(red()));
        let value = expr.evaluate(&|band| match band {
            Band::B8 => 0.5,
            Band::B4 => 0.1,
            _ => 0.0,
        });
        assert!((value - (0.4 / 0.6)).abs() < 1e-12);
    }
}
