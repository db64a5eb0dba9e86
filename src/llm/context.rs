//! Gather settlement context for advisory prompts
//!
//! The prompt carries the same facts the rule book sees: stock, buildings,
//! each villager's job, stamina and experience, plus the map summary from
//! the latest analysis.

use serde::Serialize;

use crate::oracle::OracleSnapshot;

/// System prompt describing the job trees, rules and reply schema
pub const ORACLE_SYSTEM_PROMPT: &str = r#"You are the Oracle, governor of an autonomous village.
Make rational, resource-based decisions for every villager for one day.

JOB TREES (3 tiers per path)
- wood: woodcutter (1), lumberjack (2), builder (3)
- food: forager (1), farmer (2), chef (3)
- stone: miner (1), excavator (2), engineer (3)

TASKS: "chop_wood", "gather_food", "mine_stone", "farm_crops", "cook_food", "rest",
"build_house", "build_workshop", "build_farm"
- Anyone may rest. Villagers only chop, gather or mine on their own path.
- farm_crops: farmers and chefs. cook_food: chefs, uses 10 food.
- build_house, build_workshop: builders and engineers.
- build_farm: farmers, chefs and builders.
- A task whose stamina cost exceeds the villager's stamina is skipped.

RULES
1. If stamina < 0.2 the villager rests, no matter what.
2. If wood < 100 all wood-path villagers chop wood; otherwise if food < 100 foragers
   gather food and farmers and chefs farm crops; otherwise if stone < 80 all
   stone-path villagers mine.
3. When wood >= 200 a builder may build a house (wood 50, stone 30).
   When stone >= 150 and wood >= 100 an engineer may build a workshop (wood 80, stone 60).
   When food >= 180 a chef may build a farm (wood 40, food 20).
4. Otherwise villagers work their path: farmers farm crops, chefs cook food
   while at least 10 food is left.
5. Promotions, one tier at a time: tier 1 -> 2 when experience > 70.
   lumberjack -> builder: experience > 85 and wood >= 200.
   farmer -> chef: experience > 90 and food >= 200.
   excavator -> engineer: experience > 90 and stone >= 150.

Reply with ONLY this JSON object:
{
  "assignments": [{"name": "villager_name", "job_tier": 1, "task": "chop_wood"}],
  "build_actions": [{"building": "house", "assigned_to": "villager_name"}]
}"#;

/// Structured context for the advisory prompt
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub day: u64,
    pub resources: Vec<(String, u32)>,
    pub buildings: Vec<(String, u32)>,
    pub villagers: Vec<VillagerSummary>,
    pub map_summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VillagerSummary {
    pub name: String,
    pub job: String,
    pub job_tier: u8,
    pub stamina: f32,
    pub experience: u32,
}

impl PromptContext {
    pub fn from_snapshot(snapshot: &OracleSnapshot<'_>) -> Self {
        let villagers = snapshot
            .villagers
            .iter()
            .map(|v| VillagerSummary {
                name: v.name.clone(),
                job: v.job_title().to_string(),
                job_tier: v.tier.get(),
                // Two decimals is plenty for the 0.2 survival line
                stamina: (v.stamina * 100.0).round() / 100.0,
                experience: v.experience,
            })
            .collect();

        Self {
            day: snapshot.day,
            resources: snapshot.ledger.iter().map(|(r, n)| (r.to_string(), n)).collect(),
            buildings: snapshot.buildings.iter().map(|(b, n)| (b.to_string(), n)).collect(),
            villagers,
            map_summary: snapshot.analysis.map_summary.clone(),
        }
    }

    /// Human-readable digest placed ahead of the JSON state
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Day: {}\n", self.day));

        let stock: Vec<String> = self.resources.iter().map(|(r, n)| format!("{} {}", r, n)).collect();
        s.push_str(&format!("Resources: {}\n", stock.join(", ")));

        let built: Vec<String> = self
            .buildings
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(b, n)| format!("{} {}", n, b))
            .collect();
        if !built.is_empty() {
            s.push_str(&format!("Buildings: {}\n", built.join(", ")));
        }

        if !self.villagers.is_empty() {
            s.push_str("\nVillagers:\n");
            for v in &self.villagers {
                s.push_str(&format!(
                    "- {} ({}, tier {}), stamina {:.2}, experience {}\n",
                    v.name, v.job, v.job_tier, v.stamina, v.experience
                ));
            }
        }

        s.push_str(&format!("\nMap: {}\n", self.map_summary));
        s
    }

    /// Full user message: digest plus the JSON state
    pub fn user_prompt(&self) -> crate::core::error::Result<String> {
        let state = serde_json::to_string_pretty(self)?;
        Ok(format!(
            "{}\nCurrent village state:\n{}\n\nMake your decisions:",
            self.summary(),
            state
        ))
    }
}
