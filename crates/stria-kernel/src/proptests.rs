//! Property-based tests for the parallel kernel.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use stria_core::{serial_eliminate, DiagonallyDominantSource, Mapping, Matrix, MatrixSource};

    use crate::clock::SystemClock;
    use crate::config::{Backend, EliminationConfig};
    use crate::runner::run;

    // Strategy for (order, workers) pairs with order divisible by workers.
    fn partition() -> impl Strategy<Value = (usize, usize)> {
        (1usize..=4, 1usize..=4).prop_map(|(workers, rows_each)| (workers * rows_each, workers))
    }

    fn mapping() -> impl Strategy<Value = Mapping> {
        prop_oneof![Just(Mapping::Block), Just(Mapping::Cyclic)]
    }

    fn backend() -> impl Strategy<Value = Backend> {
        prop_oneof![Just(Backend::SharedMemory), Just(Backend::MessagePassing)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn parallel_result_equals_serial_reference(
            (order, workers) in partition(),
            mapping in mapping(),
            backend in backend(),
            seed in any::<u64>(),
        ) {
            let input: Matrix<f64> = DiagonallyDominantSource::new(seed).init(order);
            let serial = serial_eliminate(&input).unwrap();
            let config = EliminationConfig::new(order, workers)
                .with_mapping(mapping)
                .with_backend(backend);
            let report = run(input, &config, &SystemClock::new()).unwrap();
            prop_assert!(report.matrix.is_row_echelon());
            prop_assert_eq!(report.matrix, serial);
        }

        #[test]
        fn every_worker_owns_an_equal_share(
            (order, workers) in partition(),
            mapping in mapping(),
            backend in backend(),
        ) {
            let input: Matrix<f64> = DiagonallyDominantSource::new(0).init(order);
            let config = EliminationConfig::new(order, workers)
                .with_mapping(mapping)
                .with_backend(backend);
            let report = run(input, &config, &SystemClock::new()).unwrap();
            prop_assert!(report.workers.iter().all(|w| w.rows_owned == order / workers));
            prop_assert_eq!(report.pivots_published(), order);
        }
    }
}
