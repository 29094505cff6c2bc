// End-of-run summaries and rankings

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, RosterEntry};
use crate::item::{Catalog, Item};
use crate::types::{AgentId, Price};

/// One team after the auction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent: AgentId,
    pub name: String,
    pub remaining: Price,
    pub spent: Price,
    pub capacity: usize,
    pub roster: Vec<RosterEntry>,
}

impl From<&Agent> for AgentSummary {
    fn from(agent: &Agent) -> Self {
        Self {
            agent: agent.id,
            name: agent.name.clone(),
            remaining: agent.remaining(),
            spent: agent.spent(),
            capacity: agent.capacity(),
            roster: agent.roster().to_vec(),
        }
    }
}

impl fmt::Display for AgentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} Summary ---", self.name)?;
        writeln!(f, "Remaining Budget: {:.2} Cr", self.remaining)?;
        writeln!(f, "Players in Squad ({}/{}):", self.roster.len(), self.capacity)?;
        for entry in &self.roster {
            writeln!(f, " • {} ({}) for {:.2} Cr", entry.name, entry.category, entry.price)?;
        }
        write!(f, "---------------------------")
    }
}

pub fn summaries(agents: &[Agent]) -> Vec<AgentSummary> {
    agents.iter().map(AgentSummary::from).collect()
}

/// An agent's score under some roster metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub agent: AgentId,
    pub name: String,
    pub score: f64,
}

/// Rank agents by the sum of `metric` over their rosters, best first.
/// Equal scores keep agent order.
pub fn standings(agents: &[Agent], catalog: &Catalog, metric: impl Fn(&Item) -> f64) -> Vec<Standing> {
    let mut table: Vec<Standing> = agents
        .iter()
        .map(|agent| Standing {
            agent: agent.id,
            name: agent.name.clone(),
            score: agent
                .roster()
                .iter()
                .filter_map(|entry| catalog.get(entry.item))
                .map(&metric)
                .sum(),
        })
        .collect();
    table.sort_by(|a, b| b.score.total_cmp(&a.score));
    table
}

/// Ranking by total star rating.
pub fn star_standings(agents: &[Agent], catalog: &Catalog) -> Vec<Standing> {
    standings(agents, catalog, Item::stars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn fixture() -> (Catalog, Vec<Agent>) {
        let mut catalog = Catalog::new();
        let a = catalog.insert(Item::new("A", Category::Batsman, 1.0).with_stat("stars", 7.0));
        let b = catalog.insert(Item::new("B", Category::Bowler, 1.0).with_stat("stars", 4.0));
        let c = catalog.insert(Item::new("C", Category::Bowler, 1.0).with_stat("stars", 5.0));

        let mut first = Agent::new(AgentId(0), "Team A", 10.0, 11);
        first.acquire(b, "B", Category::Bowler, 2.0);
        let mut second = Agent::new(AgentId(1), "Team B", 10.0, 11);
        second.acquire(a, "A", Category::Batsman, 3.0);
        second.acquire(c, "C", Category::Bowler, 1.5);
        (catalog, vec![first, second])
    }

    #[test]
    fn stars_rank_rosters() {
        let (catalog, agents) = fixture();
        let table = star_standings(&agents, &catalog);
        assert_eq!(table[0].name, "Team B");
        assert_eq!(table[0].score, 12.0);
        assert_eq!(table[1].score, 4.0);
    }

    #[test]
    fn ties_keep_agent_order() {
        let (catalog, agents) = fixture();
        let table = standings(&agents, &catalog, |_| 0.0);
        assert_eq!(table[0].agent, AgentId(0));
        assert_eq!(table[1].agent, AgentId(1));
    }

    #[test]
    fn summary_renders_roster() {
        let (_, agents) = fixture();
        let summary = AgentSummary::from(&agents[1]);
        assert_eq!(summary.spent, 4.5);

        let text = summary.to_string();
        assert!(text.contains("Remaining Budget: 5.50 Cr"), "{text}");
        assert!(text.contains("A (batsman) for 3.00 Cr"), "{text}");
    }
}
