use lumberjack::{
    dollo::{validate::check_sample, DolloSampler, Error, Options, Phase},
    instances::{Matrix, TernaryMatrix},
    solvers::{EngineStatistics, SolCount},
    types::RsHashSet,
};
use lumberjack_batsat::EnumSampler;

fn matrix(rows: &[&[u8]]) -> Matrix {
    Matrix::from_rows(rows.iter().map(|r| r.to_vec())).unwrap()
}

fn ternary(rows: &[&[u8]]) -> TernaryMatrix {
    TernaryMatrix::from_digits(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>())
}

/// All completions, decoded from the enumerated solutions
fn completions(input: &Matrix, opts: Options) -> RsHashSet<TernaryMatrix> {
    let mut sampler = DolloSampler::new(input.clone(), opts.clone()).unwrap();
    let mut engine = EnumSampler::default();
    sampler.init(&mut engine).unwrap();
    let count = sampler.count(&mut engine).unwrap();
    let solutions = engine.solutions().unwrap();
    assert_eq!(count, SolCount::exact(solutions.len() as u64));
    let mut matrices = RsHashSet::default();
    for model in solutions {
        let sample = sampler.process(model).unwrap();
        check_sample(input, &opts, &sample).unwrap();
        assert!(matrices.insert(sample.matrix), "solutions are distinct matrices");
    }
    matrices
}

fn n_completions(input: &Matrix, opts: Options) -> usize {
    let eager = completions(input, opts.clone().lazy(false));
    let lazy = completions(input, opts.lazy(true));
    assert_eq!(eager, lazy);
    eager.len()
}

fn three_gametes() -> Matrix {
    matrix(&[&[1, 0], &[0, 1], &[1, 1]])
}

fn staircase() -> Matrix {
    matrix(&[&[1, 0, 0], &[1, 1, 0], &[1, 1, 1]])
}

fn ones() -> Matrix {
    matrix(&[&[1, 1], &[1, 1], &[1, 1]])
}

#[test]
fn two_by_two() {
    let input = matrix(&[&[0, 1], &[1, 0]]);
    assert_eq!(n_completions(&input, Options::default()), 4);
    let exact = completions(&input, Options::default().no_loss([0, 1]));
    assert_eq!(exact.len(), 1);
    assert!(exact.contains(&ternary(&[&[0, 1], &[1, 0]])));
}

#[test]
fn three_gametes_need_a_loss() {
    let found = completions(&three_gametes(), Options::default());
    let expected: RsHashSet<_> = [
        ternary(&[&[1, 0], &[2, 1], &[1, 1]]),
        ternary(&[&[1, 2], &[0, 1], &[1, 1]]),
        ternary(&[&[1, 2], &[2, 1], &[1, 1]]),
    ]
    .into_iter()
    .collect();
    assert_eq!(found, expected);
    assert_eq!(n_completions(&three_gametes(), Options::default()), 3);
}

#[test]
fn no_loss_column() {
    let found = completions(&three_gametes(), Options::default().no_loss([1]));
    assert_eq!(found.len(), 1);
    assert!(found.contains(&ternary(&[&[1, 0], &[2, 1], &[1, 1]])));
    assert!(completions(&three_gametes(), Options::default().no_loss([0, 1])).is_empty());
}

#[test]
fn staircase_losses() {
    assert_eq!(n_completions(&staircase(), Options::default()), 6);
}

#[test]
fn false_negatives() {
    for rate in [0.25, 0.34, 0.5] {
        assert_eq!(
            n_completions(&staircase(), Options::default().fn_rate(rate)),
            9,
            "fn rate {rate}"
        );
    }
}

#[test]
fn false_positives() {
    assert_eq!(n_completions(&ones(), Options::default()), 0);
    assert_eq!(n_completions(&ones(), Options::default().fp_rate(0.25)), 30);
    assert_eq!(
        n_completions(
            &ones(),
            Options::default()
                .fp_rate(0.25)
                .cell_clusters(1)
                .mutation_clusters(1)
        ),
        1
    );
}

#[test]
fn cell_clusters() {
    let input = matrix(&[&[1, 0], &[1, 0], &[0, 1], &[1, 1]]);
    let opts = Options::default().cell_clusters(3);
    assert_eq!(n_completions(&input, opts.clone()), 3);
    for completion in completions(&input, opts) {
        // the duplicated rows stay duplicates
        assert_eq!(completion.row(0), completion.row(1));
    }
}

#[test]
fn mutation_clusters() {
    let input = matrix(&[&[1, 0, 0], &[0, 1, 1], &[1, 1, 1]]);
    let opts = Options::default().mutation_clusters(2);
    assert_eq!(n_completions(&input, opts.clone()), 3);
    for completion in completions(&input, opts) {
        assert!(completion.col(1).eq(completion.col(2)));
    }
}

#[test]
fn draw_samples() {
    let input = staircase();
    let opts = Options::default().fn_rate(0.5).lazy(true);
    let mut sampler = DolloSampler::new(input.clone(), opts.clone()).unwrap();
    let mut engine = EnumSampler::new(3);
    sampler.init(&mut engine).unwrap();
    let samples = sampler.sample(&mut engine, 25).unwrap();
    assert_eq!(samples.len(), 25);
    assert_eq!(sampler.phase(), Phase::Sampled);
    assert_eq!(sampler.stats().n_samples, 25);
    for sample in &samples {
        check_sample(&input, &opts, sample).unwrap();
        assert!(sample.n_false_negatives(&input) <= sampler.bounds().false_negatives);
        assert_eq!(sample.n_false_positives(&input), 0);
        assert_eq!(sample.n_cell_clusters(), 3);
    }
    let separator = sampler.separator().unwrap();
    assert!(separator.n_calls() > 0);
    assert_eq!(engine.stats().n_separation_clauses, separator.n_clauses());

    // same seed, same samples
    let mut again = DolloSampler::new(input, opts).unwrap();
    let mut engine = EnumSampler::new(3);
    again.init(&mut engine).unwrap();
    let redrawn = again.sample(&mut engine, 25).unwrap();
    assert!(samples
        .iter()
        .zip(&redrawn)
        .all(|(a, b)| a.matrix == b.matrix));
}

#[test]
fn infeasible_is_empty() {
    let mut sampler = DolloSampler::new(ones(), Options::default()).unwrap();
    let mut engine = EnumSampler::default();
    sampler.init(&mut engine).unwrap();
    assert!(sampler.sample(&mut engine, 10).unwrap().is_empty());
    assert_eq!(sampler.phase(), Phase::Sampled);
}

#[test]
fn phases() {
    let mut sampler = DolloSampler::new(staircase(), Options::default()).unwrap();
    let mut engine = EnumSampler::default();
    assert!(matches!(
        sampler.count(&mut engine),
        Err(Error::Phase {
            found: Phase::Constructed,
            ..
        })
    ));
    assert!(sampler.write_dimacs(&mut Vec::new()).is_err());
    sampler.init(&mut engine).unwrap();
    assert!(matches!(
        sampler.init(&mut engine),
        Err(Error::Phase {
            found: Phase::Initialized,
            ..
        })
    ));
    let mut dimacs = Vec::new();
    sampler.write_dimacs(&mut dimacs).unwrap();
    let dimacs = String::from_utf8(dimacs).unwrap();
    let header = format!(
        "p cnf {} {}",
        sampler.stats().n_vars,
        sampler.stats().n_clauses()
    );
    assert!(dimacs.lines().any(|l| l == header));
}

#[test]
fn invalid_options() {
    assert!(matches!(
        DolloSampler::new(staircase(), Options::default().fn_rate(2.)),
        Err(Error::Options(_))
    ));
    assert!(matches!(
        DolloSampler::new(staircase(), Options::default().no_loss([5])),
        Err(Error::Options(_))
    ));
}
