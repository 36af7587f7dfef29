//! Cross-module damage math.

// ============================================================================
// Outgoing
// ============================================================================

/// Stacks damage boost multipliers additively on their percentages.
///
/// # Formula
///
/// ```text
/// multiplier = 1 + Σ (mᵢ − 1)
/// ```
///
/// Two boosts of `1.2` and `1.3` give `1.5`, not `1.56`. With no boosts the
/// multiplier is `1.0`.
pub fn stack_boosts(multipliers: impl IntoIterator<Item = f64>) -> f64 {
    1.0 + multipliers.into_iter().map(|m| m - 1.0).sum::<f64>()
}

// ============================================================================
// Incoming
// ============================================================================

/// Caps a summed reduction fraction.
///
/// # Formula
///
/// ```text
/// reduction = clamp(Σ fractionᵢ, 0, cap)
/// ```
///
/// `cap` itself is clamped to `[0, 1]`; a non-finite cap or sum yields no
/// reduction.
pub fn cap_reduction(sum: f64, cap: f64) -> f64 {
    if !sum.is_finite() || !cap.is_finite() {
        return 0.0;
    }
    sum.clamp(0.0, cap.clamp(0.0, 1.0))
}

/// Damage sent back to the attacker.
///
/// # Formula
///
/// ```text
/// reflected = after_reduction × Σ fractionᵢ
/// ```
pub fn reflected_damage(after_reduction: f64, fractions: impl IntoIterator<Item = f64>) -> f64 {
    let total: f64 = fractions.into_iter().sum();
    (after_reduction * total).max(0.0)
}
