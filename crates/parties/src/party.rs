use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dukaan_core::{ChannelAddress, CustomerId, StoreId, SupplierId};

/// A retail store: the owner side of every negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    /// Channel address of the store owner; classifies inbound senders.
    pub contact: ChannelAddress,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A supplier registered with a store, scoped to a catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub store_id: StoreId,
    pub name: String,
    pub contact: ChannelAddress,
    /// Category this supplier covers; reorder creation resolves the supplier
    /// for the item's category.
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// A khata customer of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub store_id: StoreId,
    pub name: String,
    pub contact: Option<ChannelAddress>,
    pub created_at: DateTime<Utc>,
}

/// Pick the customer a spoken/typed name refers to, within one store's
/// customers.
///
/// Case-insensitive containment either way round ("Raj" matches "Rajveer",
/// and "Rajveer bhai" matches "Rajveer"). First candidate wins; callers must
/// pass candidates in a stable order so resolution is deterministic for a
/// given directory snapshot.
pub fn match_customer_by_name<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a Customer>,
) -> Option<&'a Customer> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    candidates.into_iter().find(|c| {
        let candidate = c.name.to_lowercase();
        candidate.contains(&needle) || needle.contains(&candidate)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(name: &str) -> Customer {
        Customer {
            id: CustomerId::new(),
            store_id: StoreId::new(),
            name: name.to_string(),
            contact: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn matches_partial_name_case_insensitively() {
        let customers = vec![customer("Pratul"), customer("Rajveer")];
        let found = match_customer_by_name("rajveer", &customers).unwrap();
        assert_eq!(found.name, "Rajveer");

        let found = match_customer_by_name("Raj", &customers).unwrap();
        assert_eq!(found.name, "Rajveer");
    }

    #[test]
    fn matches_when_spoken_name_is_longer() {
        let customers = vec![customer("Rajveer")];
        let found = match_customer_by_name("Rajveer bhai", &customers).unwrap();
        assert_eq!(found.name, "Rajveer");
    }

    #[test]
    fn first_candidate_wins_on_ambiguity() {
        let customers = vec![customer("Ram"), customer("Ramesh")];
        let found = match_customer_by_name("Ram", &customers).unwrap();
        assert_eq!(found.name, "Ram");
    }

    #[test]
    fn empty_name_matches_nothing() {
        let customers = vec![customer("Pratul")];
        assert!(match_customer_by_name("  ", &customers).is_none());
    }
}
