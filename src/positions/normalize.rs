use alloy::primitives::{Address, U256};

use crate::chain::{RawDeposit, RawValue};
use crate::model::{Deposit, DepositStatus, Strategy};

/// Field order of the flat `getDeposit` tuple, which is also the set of
/// names in the struct encoding.
const FIELDS: [&str; 9] = [
    "user",
    "amount0Remaining",
    "amount1Remaining",
    "depositTime",
    "lockUntil",
    "strategy",
    "assignedAgent",
    "status",
    "positionTokenIds",
];

/// Map either encoding of a deposit onto [`Deposit`].
///
/// Never fails: an absent or mistyped field falls back to zero, the zero
/// address, an empty list, or the first enum variant.
pub fn normalize_deposit(raw: &RawDeposit) -> Deposit {
    let field = |i: usize| field_at(raw, i);

    Deposit {
        owner: address_or_zero(field(0)),
        amount0_remaining: uint_or_zero(field(1)),
        amount1_remaining: uint_or_zero(field(2)),
        deposit_time: u64_or_zero(field(3)),
        lock_until: u64_or_zero(field(4)),
        strategy: small_index(field(5))
            .and_then(Strategy::from_index)
            .unwrap_or_default(),
        assigned_agent: address_or_zero(field(6)),
        status: small_index(field(7))
            .and_then(DepositStatus::from_index)
            .unwrap_or_default(),
        position_token_ids: match field(8) {
            Some(RawValue::UintArray(ids)) => ids.clone(),
            _ => Vec::new(),
        },
    }
}

fn field_at(raw: &RawDeposit, i: usize) -> Option<&RawValue> {
    match raw {
        RawDeposit::Positional(values) => values.get(i),
        RawDeposit::Named(map) => map.get(FIELDS[i]),
    }
}

fn address_or_zero(value: Option<&RawValue>) -> Address {
    match value {
        Some(RawValue::Address(a)) => *a,
        _ => Address::ZERO,
    }
}

fn uint_or_zero(value: Option<&RawValue>) -> U256 {
    match value {
        Some(RawValue::Uint(v)) => *v,
        _ => U256::ZERO,
    }
}

fn u64_or_zero(value: Option<&RawValue>) -> u64 {
    uint_or_zero(value).try_into().unwrap_or(0)
}

fn small_index(value: Option<&RawValue>) -> Option<u8> {
    match value {
        Some(RawValue::Uint(v)) => (*v).try_into().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use alloy::primitives::address;

    use super::*;

    fn positional() -> Vec<RawValue> {
        vec![
            RawValue::Address(address!("1111111111111111111111111111111111111111")),
            RawValue::Uint(U256::from(100u64)),
            RawValue::Uint(U256::from(200u64)),
            RawValue::Uint(U256::from(1_700_000_000u64)),
            RawValue::Uint(U256::from(1_702_592_000u64)),
            RawValue::Uint(U256::from(1u8)),
            RawValue::Address(address!("6c52aAD1Cbb66C0f666b62b36261d2f2205A8607")),
            RawValue::Uint(U256::from(1u8)),
            RawValue::UintArray(vec![U256::from(7u64), U256::from(9u64)]),
        ]
    }

    fn named() -> BTreeMap<String, RawValue> {
        FIELDS
            .iter()
            .map(|f| f.to_string())
            .zip(positional())
            .collect()
    }

    #[test]
    fn test_both_encodings_normalize_identically() {
        let a = normalize_deposit(&RawDeposit::Positional(positional()));
        let b = normalize_deposit(&RawDeposit::Named(named()));
        assert_eq!(a, b);

        assert_eq!(a.strategy, Strategy::Balanced);
        assert_eq!(a.status, DepositStatus::Processing);
        assert_eq!(a.lock_until, 1_702_592_000);
        assert!(a.is_assigned());
        assert_eq!(a.position_token_ids, vec![U256::from(7u64), U256::from(9u64)]);
    }

    #[test]
    fn test_truncated_legacy_tuple_defaults() {
        let mut values = positional();
        values.truncate(5);
        let d = normalize_deposit(&RawDeposit::Positional(values));

        assert_eq!(d.amount1_remaining, U256::from(200u64));
        assert_eq!(d.strategy, Strategy::Conservative);
        assert_eq!(d.assigned_agent, Address::ZERO);
        assert!(!d.is_assigned());
        assert_eq!(d.status, DepositStatus::Active);
        assert!(d.position_token_ids.is_empty());
    }

    #[test]
    fn test_missing_and_mistyped_named_fields_default() {
        let mut map = named();
        map.remove("amount0Remaining");
        map.remove("positionTokenIds");
        map.insert("depositTime".into(), RawValue::Address(Address::ZERO));
        map.insert("strategy".into(), RawValue::Uint(U256::from(9u8)));

        let d = normalize_deposit(&RawDeposit::Named(map));
        assert_eq!(d.amount0_remaining, U256::ZERO);
        assert_eq!(d.deposit_time, 0);
        assert_eq!(d.strategy, Strategy::Conservative);
        assert!(d.position_token_ids.is_empty());
        assert_eq!(d.amount1_remaining, U256::from(200u64));
    }

    #[test]
    fn test_empty_record_is_all_defaults() {
        let d = normalize_deposit(&RawDeposit::Positional(Vec::new()));
        assert_eq!(d, Deposit::default());
    }
}
