use super::types::{Coeffs, QuadEquation, Roots};
use crate::buffer::BoundedBlockingQueue;
use crate::stage::MapStage;

/// Solver stage: coefficients in, solved equations out
pub type QuadSolver = MapStage<Coeffs, QuadEquation, fn(Coeffs) -> QuadEquation>;

pub fn quad_solver(
    input: BoundedBlockingQueue<Coeffs>,
    output: BoundedBlockingQueue<QuadEquation>,
) -> QuadSolver {
    MapStage::new("solver", input, output, solve as fn(Coeffs) -> QuadEquation)
}

/// Solve one equation. Pure and total over `i32` coefficients.
pub fn solve(coeffs: Coeffs) -> QuadEquation {
    QuadEquation {
        coeffs,
        roots: roots(coeffs),
        extremum: extremum(coeffs),
    }
}

fn roots(Coeffs { a, b, c }: Coeffs) -> Roots {
    if a == 0 {
        if b == 0 {
            return Roots::None;
        }
        // b·x + c = 0
        return Roots::One(normalize(-f64::from(c) / f64::from(b)));
    }

    let (a, b, c) = (i128::from(a), i128::from(b), i128::from(c));
    let discriminant = b * b - 4 * a * c;
    let two_a = (2 * a) as f64;

    match discriminant {
        d if d > 0 => {
            let sqrt_d = (d as f64).sqrt();
            let x1 = normalize((-b as f64 - sqrt_d) / two_a);
            let x2 = normalize((-b as f64 + sqrt_d) / two_a);
            Roots::Two(x1.min(x2), x1.max(x2))
        }
        0 => Roots::One(normalize(-b as f64 / two_a)),
        _ => Roots::None,
    }
}

fn extremum(Coeffs { a, b, .. }: Coeffs) -> Option<f64> {
    if a == 0 {
        return None;
    }
    Some(normalize(-f64::from(b) / (2.0 * f64::from(a))))
}

// Avoid printing "-0"
fn normalize(x: f64) -> f64 {
    x + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_distinct_roots() {
        let eq = solve(Coeffs::new(1, -3, 2));
        assert_eq!(eq.roots, Roots::Two(1.0, 2.0));
        assert_eq!(eq.extremum, Some(1.5));
    }

    #[test]
    fn test_two_roots_ordered_for_negative_a() {
        let eq = solve(Coeffs::new(-1, 3, -2));
        assert_eq!(eq.roots, Roots::Two(1.0, 2.0));
    }

    #[test]
    fn test_repeated_root() {
        let eq = solve(Coeffs::new(1, 2, 1));
        assert_eq!(eq.roots, Roots::One(-1.0));
        assert_eq!(eq.extremum, Some(-1.0));
    }

    #[test]
    fn test_negative_discriminant() {
        let eq = solve(Coeffs::new(1, 0, 1));
        assert_eq!(eq.roots, Roots::None);
        assert_eq!(eq.extremum, Some(0.0));
    }

    #[test]
    fn test_constant_equation_has_no_roots() {
        let eq = solve(Coeffs::new(0, 0, 5));
        assert_eq!(eq.roots, Roots::None);
        assert_eq!(eq.extremum, None);
    }

    #[test]
    fn test_linear_equation() {
        let eq = solve(Coeffs::new(0, 2, -4));
        assert_eq!(eq.roots, Roots::One(2.0));
        assert_eq!(eq.extremum, None);
    }

    #[test]
    fn test_no_negative_zero() {
        let eq = solve(Coeffs::new(1, 0, 0));
        assert_eq!(eq.roots, Roots::One(0.0));
        assert!(matches!(eq.roots, Roots::One(x) if x.is_sign_positive()));
    }

    #[test]
    fn test_extreme_coefficients_do_not_overflow() {
        let eq = solve(Coeffs::new(i32::MAX, i32::MIN, i32::MIN));
        assert!(matches!(eq.roots, Roots::Two(_, _)));
    }
}
