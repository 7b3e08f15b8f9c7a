//! Property-based tests for row mappings and the serial reference.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::{DiagonallyDominantSource, Mapping, Matrix, MatrixSource, RowMap, serial_eliminate};

    // Strategy for (order, workers) pairs with order divisible by workers.
    fn partition() -> impl Strategy<Value = (usize, usize)> {
        (1usize..=8, 1usize..=8).prop_map(|(workers, rows_each)| (workers * rows_each, workers))
    }

    fn mapping() -> impl Strategy<Value = Mapping> {
        prop_oneof![Just(Mapping::Block), Just(Mapping::Cyclic)]
    }

    proptest! {
        #[test]
        fn every_row_has_exactly_one_owner((order, workers) in partition(), mapping in mapping()) {
            let map = RowMap::new(order, workers, mapping).unwrap();
            for row in 0..order {
                let owners = (0..workers)
                    .filter(|&w| map.rows_of(w).any(|r| r == row))
                    .count();
                prop_assert_eq!(owners, 1);
                prop_assert!(map.owner(row) < workers);
            }
        }

        #[test]
        fn local_storage_is_dense((order, workers) in partition(), mapping in mapping()) {
            let map = RowMap::new(order, workers, mapping).unwrap();
            for worker in 0..workers {
                for (k, row) in map.rows_of(worker).enumerate() {
                    prop_assert_eq!(map.owner(row), worker);
                    prop_assert_eq!(map.local_index(row), k);
                }
            }
        }

        #[test]
        fn uneven_partitions_are_rejected(order in 1usize..64, workers in 1usize..16) {
            let result = RowMap::new(order, workers, Mapping::Cyclic);
            prop_assert_eq!(result.is_ok(), order % workers == 0);
        }

        #[test]
        fn serial_reference_yields_echelon_form(order in 1usize..24, seed in any::<u64>()) {
            let m: Matrix<f64> = DiagonallyDominantSource::new(seed).init(order);
            let r = serial_eliminate(&m).unwrap();
            prop_assert!(r.is_row_echelon());
        }
    }
}
