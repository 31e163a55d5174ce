use crate::param::{AlgorithmVariant, Parameters};

/// Number of threads per workgroup actually useful for `data_len` elements,
/// given that every thread owns two elements.
pub fn effective_workgroup_size(data_len: u32, max_workgroup_size: u32) -> u32 {
    if data_len < max_workgroup_size * 2 {
        data_len / 2
    } else {
        max_workgroup_size
    }
}

/// Computes the full dispatch sequence for sorting `data_len` elements.
///
/// `data_len` must be a power of two >= 2 and `workgroup_size_x` a power of
/// two <= `data_len / 2`; every emitted `h` is then a power of two.
///
/// The sequence starts with one local merge sort of every workgroup-sized
/// block. Each following round doubles `h`, flips across the now-larger span
/// and disperses back down, switching from big to local dispatches as soon as
/// the remaining span fits into one workgroup's shared window.
pub fn stage_sequence(data_len: u32, workgroup_size_x: u32) -> Vec<Parameters> {
    let n = data_len;
    let local_span = workgroup_size_x * 2;

    let mut stages = Vec::new();
    let mut h = local_span;

    stages.push(Parameters {
        h,
        algorithm: AlgorithmVariant::LocalBitonicMergeSort,
    });

    // h doubles before every flip; h and n are powers of two, so h < n
    // keeps the doubling from overflowing even for n = 2^31
    while h < n {
        h *= 2;

        stages.push(Parameters {
            h,
            algorithm: AlgorithmVariant::BigFlip,
        });

        let mut hh = h / 2;
        while hh > 1 {
            if hh <= local_span {
                // the remaining cascade fits into shared memory, one local
                // dispatch finishes it
                stages.push(Parameters {
                    h: hh,
                    algorithm: AlgorithmVariant::LocalDisperse,
                });
                break;
            }

            stages.push(Parameters {
                h: hh,
                algorithm: AlgorithmVariant::BigDisperse,
            });
            hh /= 2;
        }
    }

    stages
}
