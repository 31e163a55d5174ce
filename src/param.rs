use bytemuck::NoUninit;

/// Stage behavior selector for a single kernel dispatch.
///
/// The numeric values cross the host/device boundary by raw value and must
/// stay in sync with the constants in `bitonic_sort.wgsl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, NoUninit)]
#[repr(u32)]
pub enum AlgorithmVariant {
    /// Full merge sort of one workgroup-sized block in shared memory.
    LocalBitonicMergeSort = 0,
    /// Disperse cascade within one workgroup-sized block in shared memory.
    LocalDisperse = 1,
    /// Flip with a span larger than one workgroup, directly on the storage buffer.
    BigFlip = 2,
    /// Single disperse step with a span larger than one workgroup.
    BigDisperse = 3,
}

impl AlgorithmVariant {
    pub fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::LocalBitonicMergeSort),
            1 => Some(Self::LocalDisperse),
            2 => Some(Self::BigFlip),
            3 => Some(Self::BigDisperse),
            _ => None,
        }
    }
}

/// Per-dispatch stage record.
///
/// `h` is the comparison span of the stage and is always a power of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, NoUninit)]
#[repr(C)]
pub struct Parameters {
    pub h: u32,
    pub algorithm: AlgorithmVariant,
}

/// Complete push-constant block for one dispatch: the stage record plus the
/// requested sort length, which bounds every compare-and-swap so a sort never
/// touches buffer entries past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, NoUninit)]
#[repr(C)]
pub struct PushConstants {
    pub stage: Parameters,
    pub data_len: u32,
}

#[cfg(test)]
mod tests {
    use std::mem::{align_of, size_of};

    use bytemuck::bytes_of;

    use super::*;

    #[test]
    fn layout() {
        assert_eq!(size_of::<Parameters>(), 8);
        assert_eq!(align_of::<Parameters>(), 4);
        assert_eq!(size_of::<AlgorithmVariant>(), 4);
        assert_eq!(size_of::<PushConstants>(), 12);
    }

    #[test]
    fn push_constant_block_offsets() {
        let block = PushConstants {
            stage: Parameters {
                h: 0x0403_0201,
                algorithm: AlgorithmVariant::BigFlip,
            },
            data_len: 0x0807_0605,
        };

        let bytes = bytes_of(&block);
        // the stage record keeps its own layout at offset 0
        assert_eq!(&bytes[0..8], bytes_of(&block.stage));
        assert_eq!(&bytes[8..12], &0x0807_0605_u32.to_ne_bytes());
    }

    #[test]
    fn field_offsets() {
        let param = Parameters {
            h: 0x0403_0201,
            algorithm: AlgorithmVariant::BigDisperse,
        };

        let bytes = bytes_of(&param);
        assert_eq!(&bytes[0..4], &0x0403_0201_u32.to_ne_bytes());
        assert_eq!(&bytes[4..8], &3_u32.to_ne_bytes());
    }

    #[test]
    fn variant_values_pinned() {
        assert_eq!(AlgorithmVariant::LocalBitonicMergeSort as u32, 0);
        assert_eq!(AlgorithmVariant::LocalDisperse as u32, 1);
        assert_eq!(AlgorithmVariant::BigFlip as u32, 2);
        assert_eq!(AlgorithmVariant::BigDisperse as u32, 3);
    }

    #[test]
    fn raw_round_trip() {
        for raw in 0..4 {
            let variant = AlgorithmVariant::from_raw(raw).unwrap();
            assert_eq!(variant as u32, raw);

            let param = Parameters {
                h: 1 << raw,
                algorithm: variant,
            };
            let bytes = bytes_of(&param);
            let h = u32::from_ne_bytes(bytes[0..4].try_into().unwrap());
            let tag = u32::from_ne_bytes(bytes[4..8].try_into().unwrap());

            assert_eq!(h, param.h);
            assert_eq!(AlgorithmVariant::from_raw(tag), Some(variant));
        }
    }

    #[test]
    fn raw_out_of_range() {
        assert_eq!(AlgorithmVariant::from_raw(4), None);
        assert_eq!(AlgorithmVariant::from_raw(u32::MAX), None);
    }
}
