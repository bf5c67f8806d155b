//! Legacy "information density" heuristic
//!
//! Used only by [`SalienceMode::LegacyDensity`](crate::SalienceMode) to derive
//! psi from raw text when no score is supplied.

use std::collections::HashMap;

/// Character count x Shannon entropy (bits) of the character distribution
pub fn information_density(input: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut mass = 0usize;
    for c in input.chars() {
        *counts.entry(c).or_insert(0) += 1;
        mass += 1;
    }
    if mass == 0 {
        return 0.0;
    }
    let total = mass as f64;
    let entropy: f64 = counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum();
    total * entropy
}

/// Scale a density into psi, clamped to [0, 1]
pub fn psi_from_density(density: f64, scale: f64) -> f64 {
    (density / scale).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(information_density(""), 0.0);
    }

    #[test]
    fn test_uniform_characters_have_zero_entropy() {
        assert_eq!(information_density("aaaa"), 0.0);
    }

    #[test]
    fn test_two_symbols() {
        // 4 chars, 1 bit each
        assert!((information_density("abab") - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_psi_from_density_clamps() {
        assert_eq!(psi_from_density(50.0, 100.0), 0.5);
        assert_eq!(psi_from_density(500.0, 100.0), 1.0);
    }
}
