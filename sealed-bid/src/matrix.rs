//! Valuation matrix: rows are agents, columns are items, `v[i][j]` is agent
//! i's sealed bid for item j.
//!
//! A `ValuationMatrix` can only be obtained through a validating constructor,
//! so everything downstream may assume it is rectangular, non-empty, and
//! holds finite non-negative bids.

use serde::Serialize;

use crate::error::{AllocationError, AllocationResult, MatrixDefect};
use crate::types::{AgentId, Bid, ItemId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationMatrix {
    agents: usize,
    items: usize,
    /// Row-major: `values[agent * items + item]`
    values: Vec<Bid>,
    agent_names: Option<Vec<String>>,
    item_names: Option<Vec<String>>,
}

impl ValuationMatrix {
    /// Build from a list of bid rows, one row per agent.
    pub fn from_rows<R: AsRef<[Bid]>>(rows: &[R]) -> AllocationResult<Self> {
        let agents = rows.len();
        let items = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        // a leading empty row only means "empty" if every other row agrees
        if rows.iter().all(|r| r.as_ref().is_empty()) {
            return Err(AllocationError::EmptyInstance { agents, items });
        }

        let mut values = Vec::with_capacity(rows.iter().map(|r| r.as_ref().len()).sum());
        for (agent, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != items {
                return Err(MatrixDefect::Ragged {
                    agent,
                    expected: items,
                    found: row.len(),
                }
                .into());
            }
            values.extend_from_slice(row);
        }

        Self::new(agents, items, values)
    }

    /// Build from a flat row-major buffer.
    pub fn new(agents: usize, items: usize, values: Vec<Bid>) -> AllocationResult<Self> {
        if agents == 0 || items == 0 {
            return Err(AllocationError::EmptyInstance { agents, items });
        }
        let expected = agents.checked_mul(items).ok_or(MatrixDefect::LengthMismatch {
            expected: usize::MAX,
            found: values.len(),
        })?;
        if values.len() != expected {
            return Err(MatrixDefect::LengthMismatch {
                expected,
                found: values.len(),
            }
            .into());
        }
        for (idx, &value) in values.iter().enumerate() {
            let (agent, item) = (idx / items, idx % items);
            if !value.is_finite() {
                return Err(MatrixDefect::NonFiniteBid { agent, item }.into());
            }
            if value < 0.0 {
                return Err(MatrixDefect::NegativeBid { agent, item, value }.into());
            }
        }

        Ok(Self {
            agents,
            items,
            values,
            agent_names: None,
            item_names: None,
        })
    }

    /// Attach display names for agents and items.
    pub fn with_names(
        mut self,
        agent_names: Vec<String>,
        item_names: Vec<String>,
    ) -> AllocationResult<Self> {
        if agent_names.len() != self.agents {
            return Err(MatrixDefect::NameCount {
                axis: "agent",
                expected: self.agents,
                found: agent_names.len(),
            }
            .into());
        }
        if item_names.len() != self.items {
            return Err(MatrixDefect::NameCount {
                axis: "item",
                expected: self.items,
                found: item_names.len(),
            }
            .into());
        }
        self.agent_names = Some(agent_names);
        self.item_names = Some(item_names);
        Ok(self)
    }

    pub fn num_agents(&self) -> usize {
        self.agents
    }

    pub fn num_items(&self) -> usize {
        self.items
    }

    pub fn agents(&self) -> impl ExactSizeIterator<Item = AgentId> + use<> {
        (0..self.agents as u32).map(AgentId)
    }

    pub fn items(&self) -> impl ExactSizeIterator<Item = ItemId> + use<> {
        (0..self.items as u32).map(ItemId)
    }

    /// Agent's bid for a single item.
    ///
    /// Panics if either index is out of range; see [`Self::get`].
    pub fn bid(&self, agent: AgentId, item: ItemId) -> Bid {
        self.row(agent)[item.index()]
    }

    pub fn get(&self, agent: AgentId, item: ItemId) -> Option<Bid> {
        if agent.index() >= self.agents || item.index() >= self.items {
            return None;
        }
        Some(self.values[agent.index() * self.items + item.index()])
    }

    /// Agent's bids for all items.
    pub fn row(&self, agent: AgentId) -> &[Bid] {
        let start = agent.index() * self.items;
        &self.values[start..start + self.items]
    }

    /// Sum of the agent's bids over every item.
    pub fn row_total(&self, agent: AgentId) -> Bid {
        self.row(agent).iter().sum()
    }

    pub fn agent_value_for_bundle(&self, agent: AgentId, bundle: &[ItemId]) -> Bid {
        let row = self.row(agent);
        bundle.iter().map(|item| row[item.index()]).sum()
    }

    pub fn agent_name(&self, agent: AgentId) -> Option<&str> {
        self.agent_names
            .as_ref()
            .map(|names| names[agent.index()].as_str())
    }

    pub fn item_name(&self, item: ItemId) -> Option<&str> {
        self.item_names
            .as_ref()
            .map(|names| names[item.index()].as_str())
    }

    /// A copy of this matrix with the given agent removed.
    pub fn without_agent(&self, agent: AgentId) -> AllocationResult<Self> {
        self.check_index("agent", agent.index(), self.agents)?;
        let values = self
            .agents()
            .filter(|&a| a != agent)
            .flat_map(|a| self.row(a).iter().copied())
            .collect();
        let mut out = Self::new(self.agents - 1, self.items, values)?;
        out.agent_names = self.agent_names.as_ref().map(|names| {
            let mut names = names.clone();
            names.remove(agent.index());
            names
        });
        out.item_names = self.item_names.clone();
        Ok(out)
    }

    /// A copy of this matrix with the given item removed.
    pub fn without_item(&self, item: ItemId) -> AllocationResult<Self> {
        self.check_index("item", item.index(), self.items)?;
        let values = self
            .agents()
            .flat_map(|a| {
                self.row(a)
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != item.index())
                    .map(|(_, &v)| v)
            })
            .collect();
        let mut out = Self::new(self.agents, self.items - 1, values)?;
        out.agent_names = self.agent_names.clone();
        out.item_names = self.item_names.as_ref().map(|names| {
            let mut names = names.clone();
            names.remove(item.index());
            names
        });
        Ok(out)
    }

    /// Check that a per-agent vector has exactly one entry per agent.
    pub fn check_per_agent(&self, found: usize) -> AllocationResult<()> {
        if found != self.agents {
            return Err(MatrixDefect::LengthMismatch {
                expected: self.agents,
                found,
            }
            .into());
        }
        Ok(())
    }

    fn check_index(&self, axis: &'static str, index: usize, len: usize) -> AllocationResult<()> {
        if index >= len {
            return Err(MatrixDefect::IndexOutOfRange { axis, index, len }.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ValuationMatrix {
        ValuationMatrix::from_rows(&[vec![1.0, 4.0, 7.0], vec![6.0, 3.0, 0.0]]).unwrap()
    }

    #[test]
    fn indexing_by_agent_and_item() {
        let v = sample();
        assert_eq!(v.num_agents(), 2);
        assert_eq!(v.num_items(), 3);
        assert_eq!(v.bid(AgentId(0), ItemId(1)), 4.0);
        assert_eq!(v.row(AgentId(1)), &[6.0, 3.0, 0.0]);
        assert_eq!(v.row_total(AgentId(0)), 12.0);
    }

    #[test]
    fn bundle_values() {
        let v = sample();
        assert_eq!(v.agent_value_for_bundle(AgentId(0), &[ItemId(0), ItemId(2)]), 8.0);
        assert_eq!(v.agent_value_for_bundle(AgentId(1), &[ItemId(1), ItemId(0)]), 9.0);
        assert_eq!(v.agent_value_for_bundle(AgentId(1), &[]), 0.0);
    }

    #[test]
    fn removing_agents_and_items() {
        let v = sample();
        let no_first = v.without_agent(AgentId(0)).unwrap();
        assert_eq!(no_first.num_agents(), 1);
        assert_eq!(no_first.row(AgentId(0)), &[6.0, 3.0, 0.0]);

        let no_middle = v.without_item(ItemId(1)).unwrap();
        assert_eq!(no_middle.row(AgentId(0)), &[1.0, 7.0]);
        assert_eq!(no_middle.row(AgentId(1)), &[6.0, 0.0]);

        let single = ValuationMatrix::from_rows(&[vec![5.0]]).unwrap();
        assert!(matches!(
            single.without_agent(AgentId(0)),
            Err(AllocationError::EmptyInstance { agents: 0, items: 1 })
        ));
        assert!(matches!(
            v.without_item(ItemId(3)),
            Err(AllocationError::MalformedInput(MatrixDefect::IndexOutOfRange { .. }))
        ));
    }

    #[test]
    fn names_follow_removals() {
        let v = sample()
            .with_names(
                vec!["ann".into(), "bob".into()],
                vec!["car".into(), "boat".into(), "house".into()],
            )
            .unwrap();
        let w = v.without_item(ItemId(0)).unwrap().without_agent(AgentId(0)).unwrap();
        assert_eq!(w.agent_name(AgentId(0)), Some("bob"));
        assert_eq!(w.item_name(ItemId(0)), Some("boat"));
        assert_eq!(w.item_name(ItemId(1)), Some("house"));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = ValuationMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            AllocationError::MalformedInput(MatrixDefect::Ragged {
                agent: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn rejects_negative_and_non_finite_bids() {
        let err = ValuationMatrix::from_rows(&[vec![1.0, -2.0]]).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::MalformedInput(MatrixDefect::NegativeBid { agent: 0, item: 1, .. })
        ));

        let err = ValuationMatrix::from_rows(&[vec![1.0], vec![f64::NAN]]).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::MalformedInput(MatrixDefect::NonFiniteBid { agent: 1, item: 0 })
        ));
    }

    #[test]
    fn rejects_empty_instances() {
        let none: Vec<Vec<f64>> = Vec::new();
        assert_eq!(
            ValuationMatrix::from_rows(&none).unwrap_err(),
            AllocationError::EmptyInstance { agents: 0, items: 0 }
        );
        assert_eq!(
            ValuationMatrix::from_rows(&[Vec::<f64>::new(), Vec::new()]).unwrap_err(),
            AllocationError::EmptyInstance { agents: 2, items: 0 }
        );
    }

    #[test]
    fn leading_empty_row_is_ragged_not_empty() {
        let err = ValuationMatrix::from_rows(&[vec![], vec![1.0, 2.0]]).unwrap_err();
        assert_eq!(
            err,
            AllocationError::MalformedInput(MatrixDefect::Ragged {
                agent: 1,
                expected: 0,
                found: 2
            })
        );
    }

    #[test]
    fn oversized_shape_is_a_length_mismatch() {
        let err = ValuationMatrix::new(usize::MAX, 2, vec![]).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::MalformedInput(MatrixDefect::LengthMismatch { found: 0, .. })
        ));
    }

    #[test]
    fn item_index_never_spills_into_next_row() {
        let m = ValuationMatrix::from_rows(&[vec![1.0, 2.0], vec![30.0, 40.0]]).unwrap();
        assert_eq!(m.get(AgentId(0), ItemId(1)), Some(2.0));
        assert_eq!(m.get(AgentId(0), ItemId(2)), None);
        assert_eq!(m.get(AgentId(2), ItemId(0)), None);
    }

    #[test]
    #[should_panic]
    fn out_of_range_item_panics_instead_of_reading_next_agent() {
        let m = ValuationMatrix::from_rows(&[vec![1.0, 2.0], vec![30.0, 40.0]]).unwrap();
        m.bid(AgentId(0), ItemId(2));
    }

    #[test]
    fn per_agent_lengths_are_checked() {
        let m = sample();
        assert!(m.check_per_agent(2).is_ok());
        assert_eq!(
            m.check_per_agent(1).unwrap_err(),
            AllocationError::MalformedInput(MatrixDefect::LengthMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn rejects_wrong_name_counts() {
        let err = sample()
            .with_names(vec!["ann".into()], vec!["a".into(), "b".into(), "c".into()])
            .unwrap_err();
        assert!(matches!(
            err,
            AllocationError::MalformedInput(MatrixDefect::NameCount { axis: "agent", .. })
        ));
    }
}
