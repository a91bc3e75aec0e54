pub mod bed;
pub mod fasta;
pub mod vcf;

pub use self::bed::read_bed;
pub use self::fasta::{FastaScanOptions, scan_target_regions};
pub use self::vcf::{VcfReadOptions, VcfReader};
