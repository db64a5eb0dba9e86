//! Promotion gating shared by planning and execution

use crate::core::config::PromotionTable;
use crate::village::jobs::Tier;
use crate::village::ledger::ResourceLedger;
use crate::village::villager::Villager;

/// The tier `villager` may be promoted to right now, if any.
///
/// Tier 1 to 2 needs experience above the apprentice threshold. Tier 2 to 3
/// additionally needs the path's gate resource stocked at or above its
/// minimum. Never skips a tier.
pub fn promotion_target(table: &PromotionTable, villager: &Villager, stock: &ResourceLedger) -> Option<Tier> {
    let next = villager.tier.next()?;
    let eligible = if next == Tier::JOURNEYMAN {
        villager.experience > table.apprentice_experience
    } else {
        let gate = table.master_gate(villager.path);
        villager.experience > gate.experience && stock.get(gate.resource) >= gate.minimum
    };
    eligible.then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::village::jobs::{JobPath, Resource};

    fn stock(wood: u32, food: u32, stone: u32) -> ResourceLedger {
        ResourceLedger::with_stock(&[(Resource::Wood, wood), (Resource::Food, food), (Resource::Stone, stone)])
    }

    #[test]
    fn test_apprentice_threshold_is_exclusive() {
        let table = PromotionTable::default();
        let at = Villager::new("A", JobPath::Wood).with_experience(70);
        let above = Villager::new("B", JobPath::Wood).with_experience(71);
        assert_eq!(promotion_target(&table, &at, &stock(0, 0, 0)), None);
        assert_eq!(promotion_target(&table, &above, &stock(0, 0, 0)), Some(Tier::JOURNEYMAN));
    }

    #[test]
    fn test_master_gate_needs_resource() {
        let table = PromotionTable::default();
        let lumberjack = Villager::new("A", JobPath::Wood)
            .with_tier(Tier::JOURNEYMAN)
            .with_experience(90);

        assert_eq!(promotion_target(&table, &lumberjack, &stock(199, 0, 0)), None);
        assert_eq!(
            promotion_target(&table, &lumberjack, &stock(200, 0, 0)),
            Some(Tier::MASTER),
            "Gate resource at exactly the minimum qualifies"
        );
    }

    #[test]
    fn test_master_gate_per_path() {
        let table = PromotionTable::default();
        let excavator = Villager::new("C", JobPath::Stone)
            .with_tier(Tier::JOURNEYMAN)
            .with_experience(90);
        // Stone path needs experience above 90
        assert_eq!(promotion_target(&table, &excavator, &stock(0, 0, 500)), None);

        let farmer = Villager::new("B", JobPath::Food)
            .with_tier(Tier::JOURNEYMAN)
            .with_experience(95);
        assert_eq!(promotion_target(&table, &farmer, &stock(0, 200, 0)), Some(Tier::MASTER));
        assert_eq!(promotion_target(&table, &farmer, &stock(500, 199, 500)), None);
    }

    #[test]
    fn test_master_is_terminal() {
        let table = PromotionTable::default();
        let builder = Villager::new("A", JobPath::Wood)
            .with_tier(Tier::MASTER)
            .with_experience(100);
        assert_eq!(promotion_target(&table, &builder, &stock(999, 999, 999)), None);
    }
}
