// src/access/rule.rs

use crate::access::table::RowFacts;
use crate::models::identity::Caller;

/// Predicados nomeados que compõem as políticas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Qualquer chamador com identidade.
    Authenticated,
    /// O dono da linha é o chamador. Identidade ausente nunca casa, nem com dono nulo.
    Owner,
    /// A linha está marcada como compartilhada e o chamador tem identidade.
    SharedFlag,
    AnyOf(Vec<Rule>),
}

impl Rule {
    pub fn holds(&self, caller: &Caller, row: &RowFacts) -> bool {
        match self {
            Rule::Authenticated => caller.is_authenticated(),
            Rule::Owner => matches!(
                (caller.user_id(), row.owner),
                (Some(caller_id), Some(owner)) if caller_id == owner
            ),
            Rule::SharedFlag => caller.is_authenticated() && row.shared,
            Rule::AnyOf(rules) => rules.iter().any(|rule| rule.holds(caller, row)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn owner_rule_never_matches_anonymous() {
        let orphan = RowFacts::owned_by(None);
        let owned = RowFacts::owned_by(Some(Uuid::new_v4()));

        assert!(!Rule::Owner.holds(&Caller::Anonymous, &orphan));
        assert!(!Rule::Owner.holds(&Caller::Anonymous, &owned));
    }

    #[test]
    fn owner_rule_does_not_match_orphan_rows() {
        let caller = Caller::authenticated(Uuid::new_v4());
        assert!(!Rule::Owner.holds(&caller, &RowFacts::owned_by(None)));
    }

    #[test]
    fn shared_flag_requires_identity() {
        let row = RowFacts::owned_by(None).with_shared(true);
        assert!(!Rule::SharedFlag.holds(&Caller::Anonymous, &row));
        assert!(Rule::SharedFlag.holds(&Caller::authenticated(Uuid::new_v4()), &row));
    }

    #[test]
    fn any_of_is_a_disjunction() {
        let me = Uuid::new_v4();
        let rule = Rule::AnyOf(vec![Rule::Owner, Rule::SharedFlag]);

        let mine = RowFacts::owned_by(Some(me));
        let theirs = RowFacts::owned_by(Some(Uuid::new_v4()));
        let theirs_shared = theirs.with_shared(true);

        let caller = Caller::authenticated(me);
        assert!(rule.holds(&caller, &mine));
        assert!(!rule.holds(&caller, &theirs));
        assert!(rule.holds(&caller, &theirs_shared));
        assert!(!Rule::AnyOf(vec![]).holds(&caller, &mine));
    }
}
