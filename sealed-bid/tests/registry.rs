use sealed_bid::{
    AgentId, Algorithm, AllocationConfig, AllocationError, Instance, InputKind, ItemId,
    MatrixDefect, bidding_for_envy_freeness, divide, registry,
};

#[test]
fn divide_accepts_rows() {
    let instance = Instance::from_json("[[50, 20, 10, 20], [60, 40, 15, 10], [0, 40, 25, 35], [50, 35, 10, 30]]")
        .unwrap();
    let alloc = divide(
        Algorithm::BiddingForEnvyFreeness,
        instance.clone(),
        &AllocationConfig::default(),
    )
    .unwrap();

    let direct = bidding_for_envy_freeness(&instance.into_matrix().unwrap()).unwrap();
    assert_eq!(alloc, direct);
    assert_eq!(alloc.winner(ItemId(1)), AgentId(1));
}

#[test]
fn divide_accepts_named_bids() {
    let instance = Instance::from_json(
        r#"{
            "ami": {"car": 60, "flat": 20},
            "ben": {"car": 40, "flat": 80},
            "cy":  {"car": 10, "flat": 10}
        }"#,
    )
    .unwrap();
    let alloc = divide(
        Algorithm::BiddingForEnvyFreeness,
        instance,
        &AllocationConfig::parallel(),
    )
    .unwrap();

    // items sorted: car = 0, flat = 1
    assert_eq!(alloc.item_names.as_deref(), Some(&["car".to_string(), "flat".to_string()][..]));
    assert_eq!(alloc.winner(ItemId(0)), AgentId(0));
    assert_eq!(alloc.winner(ItemId(1)), AgentId(1));
    assert_eq!(alloc.outcome(AgentId(2)).name.as_deref(), Some("cy"));
    assert!(alloc.balance().abs() < 1e-9);
}

#[test]
fn divide_rejects_incomplete_named_bids() {
    let instance = Instance::from_json(r#"{"ami": {"car": 1}, "ben": {"flat": 2}}"#).unwrap();
    let err = divide(
        Algorithm::BiddingForEnvyFreeness,
        instance,
        &AllocationConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AllocationError::MalformedInput(MatrixDefect::MissingBid { .. })
    ));
}

#[test]
fn algorithms_declare_their_input() {
    let d = Algorithm::BiddingForEnvyFreeness.descriptor();
    assert_eq!(d.input, InputKind::NormalizedMatrix);
    assert_eq!(registry::find(d.name).map(|f| f.algorithm), Some(d.algorithm));
    assert_eq!(registry::REGISTRY.len(), 1);
}

#[test]
fn config_from_json_drives_divide() {
    let config = AllocationConfig::from_json(r#"{"strategy": {"mode": "parallel", "threads": 2}}"#)
        .unwrap();
    let alloc = divide(
        Algorithm::BiddingForEnvyFreeness,
        vec![vec![5.0]].into(),
        &config,
    )
    .unwrap();
    assert_eq!(alloc.perceived_value(AgentId(0)), 5.0);
}
