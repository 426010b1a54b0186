use lumberjack::{
    encodings::{adder::BinaryAdder, EncodeStats},
    instances::{BasicVarManager, Cnf, ManageVars},
    solvers::{Count, Engine, SolCount},
    types::{Lit, Var},
};
use lumberjack_batsat::EnumSampler;

fn binomial(n: u64, k: u64) -> u64 {
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

/// Sets up `n` input literals and the true literal
fn setup(n: u32) -> (BasicVarManager, Lit, Vec<Lit>) {
    let mut vm = BasicVarManager::default();
    let inputs: Vec<Lit> = (0..n).map(|_| vm.new_lit()).collect();
    let true_lit = vm.new_lit();
    (vm, true_lit, inputs)
}

/// Counts the input assignments satisfying the encoding
fn count(cnf: Cnf, vm: &BasicVarManager, true_lit: Lit, inputs: &[Lit]) -> u64 {
    let mut engine = EnumSampler::default();
    engine.reserve(vm.max_var().unwrap()).unwrap();
    engine.add_unit(true_lit).unwrap();
    engine.add_cnf(cnf).unwrap();
    engine
        .set_sampling_set(inputs.iter().map(|l| l.var()).collect::<Vec<Var>>())
        .unwrap();
    let SolCount {
        cell_count,
        hash_count,
    } = engine.count().unwrap();
    assert_eq!(hash_count, 0);
    cell_count
}

fn check_leq(n: u32, k: usize) {
    let (mut vm, true_lit, inputs) = setup(n);
    let mut cnf = Cnf::new();
    let mut adder = BinaryAdder::new(true_lit);
    adder.encode_leq(&inputs, k, &mut cnf, &mut vm).unwrap();
    assert_eq!(adder.n_clauses(), cnf.len());
    let expected: u64 = (0..=std::cmp::min(k as u64, u64::from(n)))
        .map(|i| binomial(u64::from(n), i))
        .sum();
    assert_eq!(count(cnf, &vm, true_lit, &inputs), expected, "n={n} k={k}");
}

fn check_eq(n: u32, k: usize) {
    let (mut vm, true_lit, inputs) = setup(n);
    let mut cnf = Cnf::new();
    let mut adder = BinaryAdder::new(true_lit);
    adder.encode_eq(&inputs, k, &mut cnf, &mut vm).unwrap();
    let expected = if k as u64 > u64::from(n) {
        0
    } else {
        binomial(u64::from(n), k as u64)
    };
    assert_eq!(count(cnf, &vm, true_lit, &inputs), expected, "n={n} k={k}");
}

#[test]
fn leq_all_bounds() {
    for n in [1, 2, 3, 7, 8] {
        for k in 0..=n as usize + 1 {
            check_leq(n, k);
        }
    }
}

#[test]
fn eq_all_bounds() {
    for n in [1, 2, 3, 7, 8] {
        for k in 0..=n as usize + 1 {
            check_eq(n, k);
        }
    }
}

#[test]
fn trivial_leq_is_free() {
    let (mut vm, true_lit, inputs) = setup(5);
    let mut cnf = Cnf::new();
    let mut adder = BinaryAdder::new(true_lit);
    adder.encode_leq(&inputs, 5, &mut cnf, &mut vm).unwrap();
    assert!(cnf.is_empty());
    assert_eq!(adder.n_vars(), 0);
}

#[test]
fn empty_sum() {
    let (mut vm, true_lit, _) = setup(0);
    let mut cnf = Cnf::new();
    let mut adder = BinaryAdder::new(true_lit);
    adder.encode_eq(&[], 0, &mut cnf, &mut vm).unwrap();
    assert_eq!(count(cnf, &vm, true_lit, &[]), 1);

    let (mut vm, true_lit, _) = setup(0);
    let mut cnf = Cnf::new();
    let mut adder = BinaryAdder::new(true_lit);
    adder.encode_eq(&[], 1, &mut cnf, &mut vm).unwrap();
    assert_eq!(count(cnf, &vm, true_lit, &[]), 0);
}

#[test]
fn sums_are_functional() {
    // every input assignment extends to exactly one model
    let (mut vm, true_lit, inputs) = setup(5);
    let mut cnf = Cnf::new();
    let mut adder = BinaryAdder::new(true_lit);
    let sum = adder.sum(&inputs, &mut cnf, &mut vm);
    assert!(sum.len() >= 3);
    let mut engine = EnumSampler::default();
    engine.reserve(vm.max_var().unwrap()).unwrap();
    engine.add_unit(true_lit).unwrap();
    engine.add_cnf(cnf).unwrap();
    assert_eq!(engine.count().unwrap(), SolCount::exact(32));
    for sol in engine.solutions().unwrap() {
        let n_true = inputs.iter().filter(|&&l| sol.is_true(l)).count();
        let value = sum
            .iter()
            .enumerate()
            .filter(|(_, bit)| sol.is_true(**bit))
            .fold(0, |acc, (i, _)| acc | (1 << i));
        assert_eq!(value, n_true);
    }
}
