//! Key-based merge of a primary sequence with a secondary lookup sequence.
//!
//! The secondary side is indexed once (O(m)) and probed per primary row
//! (O(1)), so a merge is O(n + m). Output follows primary order exactly.
//!
//! Duplicate secondary keys resolve to the first record in provider order,
//! the same record a front-to-back scan would find. A primary row without a
//! secondary match is a data condition, never an error.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

use configs::{DuplicateKeys, JoinConfig, MissingMatch};
use models::{CompositeBestSeller, ProductId, ProductInfo, ProductStat};
use tracing::debug;

use crate::errors::{JoinError, JoinSide};
use crate::observability::JOIN_UNMATCHED_TOTAL;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingMatchPolicy {
    /// Keep the primary row with absent descriptive fields.
    #[default]
    Emit,
    /// Leave the primary row out of the result.
    Drop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateKeyPolicy {
    /// First secondary record per key wins; primary duplicates are kept.
    #[default]
    FirstWins,
    /// Any repeated key on either side fails with `JoinError::KeyAmbiguous`.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinOptions {
    pub missing_match: MissingMatchPolicy,
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl From<&JoinConfig> for JoinOptions {
    fn from(cfg: &JoinConfig) -> Self {
        Self {
            missing_match: match cfg.missing_match {
                MissingMatch::Emit => MissingMatchPolicy::Emit,
                MissingMatch::Drop => MissingMatchPolicy::Drop,
            },
            duplicate_keys: match cfg.duplicate_keys {
                DuplicateKeys::FirstWins => DuplicateKeyPolicy::FirstWins,
                DuplicateKeys::Strict => DuplicateKeyPolicy::Strict,
            },
        }
    }
}

/// Result of [`merge_by_key`]: merged rows plus the primary keys that found
/// no partner, in primary order.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged<O, K> {
    pub rows: Vec<O>,
    pub unmatched: Vec<K>,
}

pub fn merge_by_key<P, S, K, O>(
    primary: &[P],
    secondary: &[S],
    primary_key: impl Fn(&P) -> K,
    secondary_key: impl Fn(&S) -> K,
    combine: impl Fn(&P, Option<&S>) -> O,
    options: JoinOptions,
) -> Result<Merged<O, K>, JoinError>
where
    K: Eq + Hash + Display,
{
    let strict = options.duplicate_keys == DuplicateKeyPolicy::Strict;

    let mut index: HashMap<K, &S> = HashMap::with_capacity(secondary.len());
    for record in secondary {
        match index.entry(secondary_key(record)) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(slot) if strict => {
                return Err(JoinError::KeyAmbiguous { side: JoinSide::Secondary, key: slot.key().to_string() });
            }
            Entry::Occupied(_) => {}
        }
    }

    let mut seen: HashSet<K> = HashSet::new();
    let mut rows = Vec::with_capacity(primary.len());
    let mut unmatched = Vec::new();
    for record in primary {
        let key = primary_key(record);
        let partner = index.get(&key).copied();
        if strict && !seen.insert(primary_key(record)) {
            return Err(JoinError::KeyAmbiguous { side: JoinSide::Primary, key: key.to_string() });
        }
        match partner {
            Some(s) => rows.push(combine(record, Some(s))),
            None => {
                if options.missing_match == MissingMatchPolicy::Emit {
                    rows.push(combine(record, None));
                }
                unmatched.push(key);
            }
        }
    }

    Ok(Merged { rows, unmatched })
}

/// Join best-seller stats with product info on `product_id`.
pub fn merge_best_sellers(
    stats: &[ProductStat],
    infos: &[ProductInfo],
    options: JoinOptions,
) -> Result<Vec<CompositeBestSeller>, JoinError> {
    let merged = merge_by_key(
        stats,
        infos,
        |s| s.product_id,
        |i| i.product_id,
        CompositeBestSeller::new,
        options,
    )?;
    if !merged.unmatched.is_empty() {
        JOIN_UNMATCHED_TOTAL.inc_by(merged.unmatched.len() as u64);
        debug!(
            unmatched = ?merged.unmatched,
            policy = ?options.missing_match,
            "best_seller_rows_without_product_info"
        );
    }
    Ok(merged.rows)
}

/// Product ids of `stats`, in order, as sent to the bulk product lookup.
pub fn product_ids(stats: &[ProductStat]) -> Vec<ProductId> {
    stats.iter().map(|s| s.product_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(id: ProductId, qty: i64) -> ProductStat {
        ProductStat { product_id: id, total_quantity: qty, total_price: qty as f64 * 10.0, total_discounted_price: qty as f64 * 9.0 }
    }

    fn info(id: ProductId, name: &str, rating: f64) -> ProductInfo {
        ProductInfo { product_id: id, name: name.to_string(), avg_ratings: rating }
    }

    #[test]
    fn emits_unmatched_with_absent_fields() {
        let stats = vec![stat(1, 10), stat(2, 5)];
        let infos = vec![info(2, "Widget", 4.5)];
        let out = merge_best_sellers(&stats, &infos, JoinOptions::default()).expect("merge");

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].product_id, 1);
        assert_eq!(out[0].total_quantity, 10);
        assert_eq!(out[0].name, None);
        assert_eq!(out[0].avg_ratings, None);
        assert_eq!(out[1].product_id, 2);
        assert_eq!(out[1].total_quantity, 5);
        assert_eq!(out[1].name.as_deref(), Some("Widget"));
        assert_eq!(out[1].avg_ratings, Some(4.5));
    }

    #[test]
    fn preserves_primary_order_not_key_order() {
        let stats = vec![stat(9, 1), stat(3, 2), stat(7, 3), stat(1, 4)];
        let infos = vec![info(1, "a", 1.0), info(3, "b", 2.0), info(7, "c", 3.0), info(9, "d", 4.0)];
        let out = merge_best_sellers(&stats, &infos, JoinOptions::default()).expect("merge");
        let ids: Vec<_> = out.iter().map(|c| c.product_id).collect();
        assert_eq!(ids, vec![9, 3, 7, 1]);
        assert!(out.iter().all(CompositeBestSeller::is_matched));
    }

    #[test]
    fn empty_secondary_keeps_every_row() {
        let stats = vec![stat(1, 1), stat(2, 2), stat(3, 3)];
        let out = merge_best_sellers(&stats, &[], JoinOptions::default()).expect("merge");
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|c| !c.is_matched()));
    }

    #[test]
    fn empty_primary_yields_empty() {
        let out = merge_best_sellers(&[], &[info(1, "a", 1.0)], JoinOptions::default()).expect("merge");
        assert!(out.is_empty());
    }

    #[test]
    fn first_duplicate_in_provider_order_wins() {
        let stats = vec![stat(5, 1)];
        let infos = vec![info(5, "first", 1.0), info(5, "second", 2.0)];
        let a = merge_best_sellers(&stats, &infos, JoinOptions::default()).expect("merge");
        let b = merge_best_sellers(&stats, &infos, JoinOptions::default()).expect("merge");
        assert_eq!(a[0].name.as_deref(), Some("first"));
        assert_eq!(a, b);
    }

    #[test]
    fn drop_policy_filters_unmatched() {
        let opts = JoinOptions { missing_match: MissingMatchPolicy::Drop, ..JoinOptions::default() };
        let stats = vec![stat(1, 10), stat(2, 5), stat(3, 1)];
        let infos = vec![info(3, "Gadget", 3.0), info(2, "Widget", 4.5)];
        let out = merge_best_sellers(&stats, &infos, opts).expect("merge");
        let ids: Vec<_> = out.iter().map(|c| c.product_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn strict_rejects_duplicate_secondary_key() {
        let opts = JoinOptions { duplicate_keys: DuplicateKeyPolicy::Strict, ..JoinOptions::default() };
        let err = merge_best_sellers(&[stat(5, 1)], &[info(5, "a", 1.0), info(5, "b", 2.0)], opts).expect_err("ambiguous");
        assert_eq!(err, JoinError::KeyAmbiguous { side: JoinSide::Secondary, key: "5".into() });
    }

    #[test]
    fn strict_rejects_duplicate_primary_key() {
        let opts = JoinOptions { duplicate_keys: DuplicateKeyPolicy::Strict, ..JoinOptions::default() };
        let err = merge_best_sellers(&[stat(4, 1), stat(4, 2)], &[info(4, "a", 1.0)], opts).expect_err("ambiguous");
        assert_eq!(err, JoinError::KeyAmbiguous { side: JoinSide::Primary, key: "4".into() });
    }

    #[test]
    fn first_wins_keeps_duplicate_primary_rows() {
        let out = merge_best_sellers(&[stat(4, 1), stat(4, 2)], &[info(4, "a", 1.0)], JoinOptions::default()).expect("merge");
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].total_quantity, 2);
    }

    #[test]
    fn generic_merge_reports_unmatched_keys_in_order() {
        let primary = vec![("x", 1), ("y", 2), ("z", 3)];
        let secondary = vec![("y", "Y")];
        let merged = merge_by_key(
            &primary,
            &secondary,
            |p| p.0,
            |s| s.0,
            |p, s| (p.1, s.map(|s| s.1)),
            JoinOptions::default(),
        )
        .expect("merge");
        assert_eq!(merged.rows, vec![(1, None), (2, Some("Y")), (3, None)]);
        assert_eq!(merged.unmatched, vec!["x", "z"]);
    }

    #[test]
    fn config_maps_to_options() {
        let cfg = JoinConfig { missing_match: MissingMatch::Drop, duplicate_keys: DuplicateKeys::Strict };
        let opts = JoinOptions::from(&cfg);
        assert_eq!(opts.missing_match, MissingMatchPolicy::Drop);
        assert_eq!(opts.duplicate_keys, DuplicateKeyPolicy::Strict);
    }
}
