// ============================================================================
// Allocation result: what the procedure hands back to callers and renderers
// ============================================================================

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::assignment::Assignment;
use crate::error::AllocationResult;
use crate::ledger::Ledger;
use crate::matrix::ValuationMatrix;
use crate::types::{AgentId, ItemId, Money};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct AgentOutcome {
    pub agent: AgentId,
    pub name: Option<String>,
    pub items: Vec<ItemId>,
    pub fair_share: Money,
    pub raw_adjustment: Money,
    /// Positive: receives money. Negative: pays.
    pub net_payment: Money,
    /// Own-bid value of the bundle plus net payment
    pub perceived_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct Allocation {
    /// Winner per item, indexed by item
    pub winners: Vec<AgentId>,
    pub item_names: Option<Vec<String>>,
    /// One row per agent, indexed by agent
    pub agents: Vec<AgentOutcome>,
    pub pot: Money,
    pub deficit: Money,
    pub surplus: Money,
    pub surplus_share: Money,
}

impl Allocation {
    /// Package an assignment and its settled ledger.
    pub fn build(
        matrix: &ValuationMatrix,
        assignment: &Assignment,
        fair_shares: &[Money],
        ledger: &Ledger,
    ) -> AllocationResult<Self> {
        assignment.check_against(matrix)?;
        for len in [
            fair_shares.len(),
            ledger.values_won.len(),
            ledger.raw_adjustments.len(),
            ledger.net_payments.len(),
        ] {
            matrix.check_per_agent(len)?;
        }

        let bundles = assignment.bundles(matrix.num_agents());
        let agents = matrix
            .agents()
            .zip(bundles)
            .map(|(agent, items)| {
                let i = agent.index();
                AgentOutcome {
                    agent,
                    name: matrix.agent_name(agent).map(str::to_owned),
                    items,
                    fair_share: fair_shares[i],
                    raw_adjustment: ledger.raw_adjustments[i],
                    net_payment: ledger.net_payments[i],
                    perceived_value: ledger.values_won[i] + ledger.net_payments[i],
                }
            })
            .collect();
        let item_names = matrix
            .items()
            .map(|item| matrix.item_name(item).map(str::to_owned))
            .collect();

        Ok(Self {
            winners: assignment.winners().to_vec(),
            item_names,
            agents,
            pot: ledger.pot,
            deficit: ledger.deficit,
            surplus: ledger.surplus,
            surplus_share: ledger.surplus_share,
        })
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    pub fn num_items(&self) -> usize {
        self.winners.len()
    }

    pub fn winner(&self, item: ItemId) -> AgentId {
        self.winners[item.index()]
    }

    pub fn winners(&self) -> &[AgentId] {
        &self.winners
    }

    pub fn agents(&self) -> &[AgentOutcome] {
        &self.agents
    }

    pub fn outcome(&self, agent: AgentId) -> &AgentOutcome {
        &self.agents[agent.index()]
    }

    pub fn bundle(&self, agent: AgentId) -> &[ItemId] {
        &self.outcome(agent).items
    }

    pub fn net_payment(&self, agent: AgentId) -> Money {
        self.outcome(agent).net_payment
    }

    pub fn perceived_value(&self, agent: AgentId) -> Money {
        self.outcome(agent).perceived_value
    }

    pub fn fair_share(&self, agent: AgentId) -> Money {
        self.outcome(agent).fair_share
    }

    pub fn net_payments(&self) -> Vec<Money> {
        self.agents.iter().map(|a| a.net_payment).collect()
    }

    /// Sum of net payments. Zero up to rounding.
    pub fn balance(&self) -> Money {
        self.agents.iter().map(|a| a.net_payment).sum()
    }

    pub fn pot(&self) -> Money {
        self.pot
    }

    pub fn deficit(&self) -> Money {
        self.deficit
    }

    pub fn surplus(&self) -> Money {
        self.surplus
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
