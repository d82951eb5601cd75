use std::fmt;

/// Coefficients of `a·x² + b·x + c = 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coeffs {
    pub a: i32,
    pub b: i32,
    pub c: i32,
}

impl Coeffs {
    pub fn new(a: i32, b: i32, c: i32) -> Self {
        Self { a, b, c }
    }
}

impl fmt::Display for Coeffs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.a, self.b, self.c)
    }
}

/// Real roots of an equation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Roots {
    None,
    One(f64),
    /// Smaller root first
    Two(f64, f64),
}

/// A solved equation, as handed from the solver to the printer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadEquation {
    pub coeffs: Coeffs,
    pub roots: Roots,
    /// Vertex abscissa `-b / 2a`; absent when `a == 0`
    pub extremum: Option<f64>,
}

impl fmt::Display for QuadEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => ", self.coeffs)?;
        match self.roots {
            Roots::None => write!(f, "no roots")?,
            Roots::One(x) => write!(f, "root ({})", x)?,
            Roots::Two(x1, x2) => write!(f, "roots ({}, {})", x1, x2)?,
        }
        match self.extremum {
            Some(m) => write!(f, ", extremum ({})", m),
            None => write!(f, ", no extremum"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_roots() {
        let eq = QuadEquation {
            coeffs: Coeffs::new(1, -3, 2),
            roots: Roots::Two(1.0, 2.0),
            extremum: Some(1.5),
        };
        assert_eq!(eq.to_string(), "(1 -3 2) => roots (1, 2), extremum (1.5)");
    }

    #[test]
    fn test_display_no_roots_no_extremum() {
        let eq = QuadEquation {
            coeffs: Coeffs::new(0, 0, 5),
            roots: Roots::None,
            extremum: None,
        };
        assert_eq!(eq.to_string(), "(0 0 5) => no roots, no extremum");
    }
}
