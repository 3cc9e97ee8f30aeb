use praxis_domain::Installment;

/// Fraction of a sale actually collected, in [0, 1].
///
/// A sale with no installment schedule (e.g. paid cash up front) counts as
/// fully collected. Partial payments arrive asynchronously between service
/// completion and settlement, so this is recomputed from live installment
/// state at settlement time and never cached.
pub fn payment_progress(installments: &[Installment]) -> f64 {
    let total_due: f64 = installments.iter().map(|i| i.amount).sum();
    if total_due <= 0.0 {
        return 1.0;
    }
    let total_paid: f64 = installments.iter().filter(|i| i.paid).map(|i| i.amount).sum();
    (total_paid / total_due).clamp(0.0, 1.0)
}
