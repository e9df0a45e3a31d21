//! Selection-based `median` agrees with a sort-based reference on random
//! lists, including lists with many duplicates.

use dmn_feel::builtins;
use dmn_feel::{Context, Env, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

fn reference_median(values: &[i64]) -> Decimal {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();
    if n % 2 == 1 {
        Decimal::from(sorted[n / 2])
    } else {
        (Decimal::from(sorted[n / 2 - 1]) + Decimal::from(sorted[n / 2])) / Decimal::TWO
    }
}

fn median(values: &[i64]) -> Value {
    let median = builtins::lookup("median").unwrap();
    let list = Value::List(values.iter().map(|v| Value::from(*v)).collect());
    let env = Env::owned(Context::new());
    (median.call)(&[list], &env).unwrap()
}

#[test]
fn agrees_with_sorting_on_random_lists() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..500 {
        let len = rng.gen_range(1..=200);
        let spread = rng.gen_range(1..=1_000);
        let values: Vec<i64> = (0..len).map(|_| rng.gen_range(-spread..=spread)).collect();
        assert_eq!(
            median(&values),
            Value::Number(reference_median(&values)),
            "median of {:?}",
            values
        );
    }
}

#[test]
fn handles_heavy_duplication() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let len = rng.gen_range(1..=64);
        let values: Vec<i64> = (0..len).map(|_| rng.gen_range(0..=2)).collect();
        assert_eq!(median(&values), Value::Number(reference_median(&values)));
    }
}

#[test]
fn variadic_arguments_match_a_list_argument() {
    let median_fn = builtins::lookup("median").unwrap();
    let env = Env::owned(Context::new());
    let args: Vec<Value> = [8, 1, 5, 3].iter().map(|v| Value::from(*v as i64)).collect();
    assert_eq!((median_fn.call)(&args, &env).unwrap(), median(&[8, 1, 5, 3]));
}

#[test]
fn empty_list_has_no_median() {
    assert_eq!(median(&[]), Value::Absent);
}
