//! Wallet and item inventory operations for agents.
//!
//! Balances use [`Decimal`] so transfers never accumulate rounding error.
//! Every mutating method validates first and either applies completely or
//! returns an error without changing anything.

use std::collections::BTreeMap;

use civitas_types::Item;
use rust_decimal::Decimal;

use crate::error::AgentError;

/// An agent's currency balance and carried items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    balance: Decimal,
    items: BTreeMap<Item, u32>,
}

impl Inventory {
    /// Create an inventory. Negative balances are clamped to zero and zero
    /// quantities are dropped.
    pub fn new(balance: Decimal, items: BTreeMap<Item, u32>) -> Self {
        Self {
            balance: balance.max(Decimal::ZERO),
            items: items.into_iter().filter(|&(_, q)| q > 0).collect(),
        }
    }

    /// Current currency balance.
    pub const fn balance(&self) -> Decimal {
        self.balance
    }

    /// Whether the balance covers `amount`.
    pub fn can_afford(&self, amount: Decimal) -> bool {
        amount >= Decimal::ZERO && self.balance >= amount
    }

    /// Add `amount` to the balance.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), AgentError> {
        if amount < Decimal::ZERO {
            return Err(AgentError::NegativeAmount(amount));
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| AgentError::ArithmeticOverflow {
                context: String::from("balance credit overflow"),
            })?;
        Ok(())
    }

    /// Remove `amount` from the balance.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), AgentError> {
        if amount < Decimal::ZERO {
            return Err(AgentError::NegativeAmount(amount));
        }
        if self.balance < amount {
            return Err(AgentError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| AgentError::ArithmeticOverflow {
                context: String::from("balance debit underflow"),
            })?;
        Ok(())
    }

    /// Quantity of `item` held.
    pub fn quantity(&self, item: Item) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// Whether at least `amount` of `item` is held.
    pub fn has(&self, item: Item, amount: u32) -> bool {
        self.quantity(item) >= amount
    }

    /// Add `amount` of `item`.
    pub fn add_item(&mut self, item: Item, amount: u32) -> Result<(), AgentError> {
        if amount == 0 {
            return Ok(());
        }
        let next = self
            .quantity(item)
            .checked_add(amount)
            .ok_or_else(|| AgentError::ArithmeticOverflow {
                context: format!("{item} quantity overflow"),
            })?;
        self.items.insert(item, next);
        Ok(())
    }

    /// Remove `amount` of `item`. The entry disappears when it reaches zero.
    pub fn remove_item(&mut self, item: Item, amount: u32) -> Result<(), AgentError> {
        let available = self.quantity(item);
        let remaining = available
            .checked_sub(amount)
            .ok_or(AgentError::InsufficientItems {
                item,
                requested: amount,
                available,
            })?;
        if remaining == 0 {
            self.items.remove(&item);
        } else {
            self.items.insert(item, remaining);
        }
        Ok(())
    }

    /// Carried items with non-zero quantity, in item order.
    pub const fn items(&self) -> &BTreeMap<Item, u32> {
        &self.items
    }

    /// Total number of carried items.
    pub fn item_count(&self) -> u32 {
        self.items.values().fold(0_u32, |acc, &q| acc.saturating_add(q))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_sanitizes_inputs() {
        let inv = Inventory::new(Decimal::new(-5, 0), BTreeMap::from([(Item::Food, 0), (Item::Book, 2)]));
        assert_eq!(inv.balance(), Decimal::ZERO);
        assert_eq!(inv.items().len(), 1);
        assert_eq!(inv.item_count(), 2);
    }

    #[test]
    fn debit_rejects_overdraft_without_change() {
        let mut inv = Inventory::new(Decimal::new(10, 0), BTreeMap::new());
        let err = inv.debit(Decimal::new(1050, 2)).unwrap_err();
        assert!(matches!(err, AgentError::InsufficientFunds { .. }));
        assert_eq!(inv.balance(), Decimal::new(10, 0));
        inv.debit(Decimal::new(250, 2)).unwrap();
        assert_eq!(inv.balance(), Decimal::new(750, 2));
    }

    #[test]
    fn negative_amounts_are_rejected() {
        let mut inv = Inventory::default();
        assert_eq!(
            inv.credit(Decimal::NEGATIVE_ONE),
            Err(AgentError::NegativeAmount(Decimal::NEGATIVE_ONE))
        );
        assert!(!inv.can_afford(Decimal::NEGATIVE_ONE));
    }

    #[test]
    fn items_add_and_remove() {
        let mut inv = Inventory::default();
        inv.add_item(Item::Coffee, 3).unwrap();
        inv.remove_item(Item::Coffee, 2).unwrap();
        assert_eq!(inv.quantity(Item::Coffee), 1);
        assert!(matches!(
            inv.remove_item(Item::Coffee, 2),
            Err(AgentError::InsufficientItems { requested: 2, available: 1, .. })
        ));
        inv.remove_item(Item::Coffee, 1).unwrap();
        assert!(inv.items().is_empty());
        assert!(!inv.has(Item::Coffee, 1));
    }
}
