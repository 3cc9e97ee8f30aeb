use praxis_domain::FeeRule;

/// Resolve the fee rule that applies to a (professional, procedure) pair.
///
/// A custom override wins; otherwise the clinic default (30% of net base)
/// applies. Resolution never fails. Percentage range checks happen when a
/// rule is written, not here.
pub fn resolve_fee(custom: Option<FeeRule>) -> FeeRule {
    custom.unwrap_or_else(FeeRule::clinic_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use praxis_domain::FeeKind;
    use uuid::Uuid;

    #[test]
    fn default_applies_when_no_custom_rule_exists() {
        let rule = resolve_fee(None);
        assert_eq!(rule.kind, FeeKind::Percentage);
        assert_eq!(rule.value, 30.0);
    }

    #[test]
    fn custom_rule_wins() {
        let custom = FeeRule::fixed(Uuid::new_v4(), Uuid::new_v4(), 120.0).unwrap();
        let rule = resolve_fee(Some(custom.clone()));
        assert_eq!(rule, custom);
    }
}
