use sic::runtime::address::{self, port, DEFAULT_BASE};
use sic::runtime::arena::Buffer;
use sic::runtime::codec::{Kind, Record, UNSET};
use sic::runtime::reducer::{Halt, Reducer, Step};
use sic::runtime::{image, parse};
use sic::{run, Costs, EngineConfig, Malformed, Status};

/// con ~ fan, every auxiliary port capped with an eraser. Reaches normal
/// form in 13 rewrites: 5 commutations and 8 annihilations.
const CON_FAN: &str = "
0: con 1.0 2.0 3.0
1: fan 0.0 4.0 5.0
2: era 0.1 2.2 2.1
3: era 0.2 3.2 3.1
4: era 1.1 4.2 4.1
5: era 1.2 5.2 5.1
";

/// Two constructors with every port wired across.
const CON_CON: &str = "
0: con 1.0 1.1 1.2
1: con 0.0 0.1 0.2
";

fn unit() -> EngineConfig {
    EngineConfig {
        costs: Costs::unit(),
        ..EngineConfig::default()
    }
}

fn assemble(source: &str) -> Vec<u8> {
    let net = parse::parse(source, &EngineConfig::default()).unwrap();
    image::store(net.buffer())
}

fn count(bytes: &[u8]) -> u64 {
    (bytes.len() / image::HEADER_SIZE) as u64 - 1
}

#[test]
fn annihilation_leaves_nothing_behind() {
    let bytes = assemble(CON_CON);
    let outcome = run(&bytes, u64::MAX, &EngineConfig::default());
    assert_eq!(outcome.status, Status::NormalForm);
    assert_eq!(outcome.rewrites.annihilate, 1);
    assert_eq!(outcome.rewrites.commute, 0);
    assert_eq!(outcome.budget_left, u64::MAX - 125);

    let net = image::load(&outcome.bytes, &EngineConfig::default()).unwrap();
    for node in 0..2 {
        assert!(net.buffer().record(node).unwrap().is_retired());
    }
    // the auxiliary wires closed into loops between the consumed nodes
    assert_eq!(net.enter(port(0, 1).unwrap()).unwrap(), port(1, 1).unwrap());
    assert_eq!(net.enter(port(1, 1).unwrap()).unwrap(), port(0, 1).unwrap());
}

#[test]
fn commutation_adds_two_nodes_and_keeps_the_outer_wires() {
    let bytes = assemble(CON_FAN);
    let outcome = run(&bytes, 1, &unit());
    assert_eq!(outcome.status, Status::BudgetExhausted);
    assert_eq!(outcome.rewrites.commute, 1);
    assert_eq!(count(&outcome.bytes), count(&bytes) + 2);

    let net = image::load(&outcome.bytes, &unit()).unwrap();
    // the old principal wire is gone
    assert_ne!(net.enter(0).unwrap(), port(1, 0).unwrap());
    // each of the four erasers is still wired by its principal port,
    // now to a copy rather than to the original pair
    for era in 2..6 {
        let target = net.enter(port(era, 0).unwrap()).unwrap();
        assert_ne!(target, UNSET);
        assert_eq!(address::slot(target), 0);
        assert_eq!(net.partner(era).unwrap(), Some(address::addr(target)));
    }
}

#[test]
fn running_a_normal_form_again_does_nothing() {
    let first = run(&assemble(CON_FAN), u64::MAX, &unit());
    assert_eq!(first.status, Status::NormalForm);
    assert_eq!(first.rewrites.total(), 13);

    let second = run(&first.bytes, u64::MAX, &unit());
    assert_eq!(second.status, Status::NormalForm);
    assert_eq!(second.rewrites.total(), 0);
    assert_eq!(second.bytes, first.bytes);
}

#[test]
fn budget_one_short_applies_all_but_the_last_rewrite() {
    let bytes = assemble(CON_FAN);
    let full = run(&bytes, u64::MAX, &unit());
    let k = full.rewrites.total();

    let partial = run(&bytes, k - 1, &unit());
    assert_eq!(partial.status, Status::BudgetExhausted);
    assert_eq!(partial.rewrites.total(), k - 1);
    assert_eq!(partial.budget_left, 0);

    let resumed = run(&partial.bytes, u64::MAX, &unit());
    assert_eq!(resumed.status, Status::NormalForm);
    assert_eq!(resumed.rewrites.total(), 1);
    assert_eq!(resumed.bytes, full.bytes);
}

#[test]
fn exact_budget_reaches_normal_form() {
    let outcome = run(&assemble(CON_FAN), 13, &unit());
    assert_eq!(outcome.status, Status::NormalForm);
    assert_eq!(outcome.budget_left, 0);
}

#[test]
fn running_out_of_memory_keeps_the_last_good_buffer() {
    let bytes = assemble(CON_FAN);
    let config = EngineConfig {
        capacity: address::node_addr(DEFAULT_BASE, 6).unwrap(),
        ..unit()
    };
    let outcome = run(&bytes, u64::MAX, &config);
    assert_eq!(outcome.status, Status::OutOfMemory);
    assert!(outcome.status.is_error());
    assert_eq!(outcome.rewrites.total(), 0);
    assert_eq!(outcome.bytes, bytes);
}

#[test]
fn malformed_images_are_returned_untouched() {
    let mut bytes = assemble(CON_CON);
    bytes.extend_from_slice(&[0; 8]);
    let outcome = run(&bytes, u64::MAX, &EngineConfig::default());
    assert!(matches!(
        outcome.status,
        Status::MalformedGraph(Malformed::TrailingBytes { .. })
    ));
    assert_eq!(outcome.bytes, bytes);
    assert!(outcome.error.is_some());
}

#[test]
fn active_pairs_with_loose_ends_are_malformed() {
    let bytes = assemble(
        "
        0: con 1.0 0.2 0.1
        1: fan 0.0 _ _
        ",
    );
    let outcome = run(&bytes, u64::MAX, &EngineConfig::default());
    assert_eq!(
        outcome.status,
        Status::MalformedGraph(Malformed::UnsetWire { port: 5 })
    );
    assert_eq!(outcome.bytes, bytes);
}

#[test]
fn mixed_network_stays_well_formed() {
    // a con ~ fan pair whose con aux ports feed back into another fan,
    // plus an eraser eating that fan
    let source = "
        0: con 1.0 2.1 2.2
        1: fan 0.0 3.0 4.0
        2: fan 5.0 0.1 0.2
        3: era 1.1 3.2 3.1
        4: era 1.2 4.2 4.1
        5: era 2.0 5.2 5.1
    ";
    let mut net = parse::parse(source, &unit()).unwrap();
    let mut reducer = Reducer::new(&mut net, Costs::unit(), 200);
    let mut fired = 0;
    loop {
        match reducer.step().unwrap() {
            Step::Fired { .. } => {
                reducer.net().validate().unwrap();
                fired += 1;
            }
            Step::Halted(halt) => {
                assert!(fired > 0);
                assert!(matches!(halt, Halt::NormalForm | Halt::BudgetExhausted));
                break;
            }
        }
    }
}

fn raw_image(records: &[Record]) -> Vec<u8> {
    let config = EngineConfig::default();
    let buffer = Buffer::from_records(records.to_vec(), config.base, config.capacity).unwrap();
    image::store(&buffer)
}

#[test]
fn self_wired_ports_are_refused_before_reducing() {
    // con ~ fan where con's second auxiliary port loops onto itself
    let mut records = [
        Record::new(Kind::Con),
        Record::new(Kind::Fan),
        Record::new(Kind::Era),
    ];
    records[0].wires = [port(1, 0).unwrap(), port(1, 2).unwrap(), port(0, 2).unwrap()];
    records[1].wires = [port(0, 0).unwrap(), port(2, 0).unwrap(), port(0, 1).unwrap()];
    records[2].wires = [port(1, 1).unwrap(), port(2, 2).unwrap(), port(2, 1).unwrap()];
    let bytes = raw_image(&records);

    let outcome = run(&bytes, u64::MAX, &EngineConfig::default());
    assert_eq!(
        outcome.status,
        Status::MalformedGraph(Malformed::SelfWire { port: 2 })
    );
    assert_eq!(outcome.rewrites.total(), 0);
    assert_eq!(outcome.bytes, bytes);
}

#[test]
fn stray_wires_on_free_principal_nodes_are_refused() {
    let mut records = [Record::new(Kind::Con), Record::new(Kind::Con)];
    records[0].wires[1] = port(9, 1).unwrap();
    let outcome = run(&raw_image(&records), u64::MAX, &EngineConfig::default());
    assert_eq!(
        outcome.status,
        Status::MalformedGraph(Malformed::NodeOutOfBounds { port: 37, count: 2 })
    );

    records[0].wires[1] = UNSET;
    records[0].wires[2] = port(1, 3).unwrap();
    let outcome = run(&raw_image(&records), u64::MAX, &EngineConfig::default());
    assert_eq!(
        outcome.status,
        Status::MalformedGraph(Malformed::NotAWire { port: 7 })
    );
}

#[test]
fn erasers_cancel_against_each_other() {
    let source = "
        0: era 1.0 0.2 0.1
        1: era 0.0 1.2 1.1
    ";
    let outcome = run(&assemble(source), u64::MAX, &EngineConfig::default());
    assert_eq!(outcome.status, Status::NormalForm);
    assert_eq!(outcome.rewrites.annihilate, 1);
    let net = image::load(&outcome.bytes, &EngineConfig::default()).unwrap();
    assert!(net.buffer().records().iter().all(|record| record.is_retired()));
}

#[test]
fn an_eraser_commuting_through_a_constructor_cancels_out() {
    let source = "
        0: era 1.0 0.2 0.1
        1: con 0.0 2.0 3.0
        2: era 1.1 2.2 2.1
        3: era 1.2 3.2 3.1
    ";
    let outcome = run(&assemble(source), u64::MAX, &unit());
    assert_eq!(outcome.status, Status::NormalForm);
    assert_eq!(outcome.rewrites.commute, 1);
    assert_eq!(outcome.rewrites.annihilate, 3);
    assert_eq!(count(&outcome.bytes), 6);
    let net = image::load(&outcome.bytes, &unit()).unwrap();
    assert!(net.buffer().records().iter().all(|record| record.is_retired()));
}
