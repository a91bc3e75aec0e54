pub mod interval;
pub mod interval_set;
pub mod variant;

// re-export for cleaner imports
pub use self::interval::GenomicInterval;
pub use self::interval_set::IntervalSet;
pub use self::variant::{
    Annotation, CandidateMutation, FilterStatus, MutationKey, Variant, Zygosity,
};
