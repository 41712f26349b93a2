//! Instance adaptors: turn the shapes callers actually have into a validated
//! [`ValuationMatrix`].
//!
//! - a list of bid rows, `[[50, 20], [60, 40]]`
//! - agent name -> item name -> bid, `{"ann": {"car": 50, "boat": 20}, ...}`

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::error::{AllocationError, AllocationResult, MatrixDefect};
use crate::matrix::ValuationMatrix;
use crate::types::Bid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[serde(untagged)]
#[tsify(from_wasm_abi)]
pub enum Instance {
    Rows(Vec<Vec<Bid>>),
    Named(BTreeMap<String, BTreeMap<String, Bid>>),
}

impl Instance {
    pub fn from_json(json: &str) -> AllocationResult<Self> {
        serde_json::from_str(json).map_err(|e| MatrixDefect::Unreadable(e.to_string()).into())
    }

    pub fn num_agents(&self) -> usize {
        match self {
            Instance::Rows(rows) => rows.len(),
            Instance::Named(agents) => agents.len(),
        }
    }

    pub fn into_matrix(self) -> AllocationResult<ValuationMatrix> {
        match self {
            Instance::Rows(rows) => ValuationMatrix::from_rows(&rows),
            Instance::Named(agents) => named_to_matrix(agents),
        }
    }
}

impl From<Vec<Vec<Bid>>> for Instance {
    fn from(rows: Vec<Vec<Bid>>) -> Self {
        Instance::Rows(rows)
    }
}

/// Agents in key order; items are the sorted union of every agent's items.
fn named_to_matrix(
    agents: BTreeMap<String, BTreeMap<String, Bid>>,
) -> AllocationResult<ValuationMatrix> {
    let items: BTreeSet<&String> = agents.values().flat_map(|bids| bids.keys()).collect();
    if agents.is_empty() || items.is_empty() {
        return Err(AllocationError::EmptyInstance {
            agents: agents.len(),
            items: items.len(),
        });
    }

    let mut values = Vec::with_capacity(agents.len() * items.len());
    for (agent, bids) in &agents {
        for &item in &items {
            let bid = bids.get(item).ok_or_else(|| MatrixDefect::MissingBid {
                agent: agent.clone(),
                item: item.clone(),
            })?;
            values.push(*bid);
        }
    }

    let item_names: Vec<String> = items.into_iter().cloned().collect();
    let agent_names: Vec<String> = agents.into_keys().collect();
    ValuationMatrix::new(agent_names.len(), item_names.len(), values)?
        .with_names(agent_names, item_names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AgentId, ItemId};

    #[test]
    fn rows_parse_from_json() {
        let instance = Instance::from_json("[[1, 2], [3, 4.5]]").unwrap();
        assert_eq!(instance, Instance::Rows(vec![vec![1.0, 2.0], vec![3.0, 4.5]]));
        let m = instance.into_matrix().unwrap();
        assert_eq!(m.bid(AgentId(1), ItemId(1)), 4.5);
        assert_eq!(m.agent_name(AgentId(0)), None);
    }

    #[test]
    fn named_instance_sorts_agents_and_items() {
        let instance = Instance::from_json(
            r#"{"bob": {"car": 1, "boat": 2}, "ann": {"boat": 5, "car": 7}}"#,
        )
        .unwrap();
        assert_eq!(instance.num_agents(), 2);
        let m = instance.into_matrix().unwrap();
        assert_eq!(m.agent_name(AgentId(0)), Some("ann"));
        assert_eq!(m.item_name(ItemId(0)), Some("boat"));
        assert_eq!(m.row(AgentId(0)), &[5.0, 7.0]);
        assert_eq!(m.row(AgentId(1)), &[2.0, 1.0]);
    }

    #[test]
    fn named_instance_requires_every_bid() {
        let instance =
            Instance::from_json(r#"{"ann": {"car": 1, "boat": 2}, "bob": {"car": 3}}"#).unwrap();
        let err = instance.into_matrix().unwrap_err();
        assert_eq!(
            err,
            AllocationError::MalformedInput(MatrixDefect::MissingBid {
                agent: "bob".into(),
                item: "boat".into()
            })
        );
    }

    #[test]
    fn empty_shapes_are_empty_instances() {
        let err = Instance::from_json("{}").unwrap().into_matrix().unwrap_err();
        assert!(matches!(err, AllocationError::EmptyInstance { agents: 0, .. }));
        let err = Instance::from_json(r#"{"ann": {}}"#).unwrap().into_matrix().unwrap_err();
        assert_eq!(err, AllocationError::EmptyInstance { agents: 1, items: 0 });
    }

    #[test]
    fn unparseable_instance_is_malformed() {
        for json in ["[[1, null]]", "[[1, 2]", r#"{"ann": {"car": "lots"}}"#] {
            assert!(
                matches!(
                    Instance::from_json(json),
                    Err(AllocationError::MalformedInput(MatrixDefect::Unreadable(_)))
                ),
                "{json}"
            );
        }
    }

    #[test]
    fn negative_named_bid_is_malformed() {
        let err = Instance::from_json(r#"{"ann": {"car": -1}}"#)
            .unwrap()
            .into_matrix()
            .unwrap_err();
        assert!(matches!(
            err,
            AllocationError::MalformedInput(MatrixDefect::NegativeBid { .. })
        ));
    }
}
