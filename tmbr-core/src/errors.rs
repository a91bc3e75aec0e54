use thiserror::Error;

#[derive(Error, Debug)]
pub enum BurdenError {
    #[error("Invalid interval {contig}:{start}-{end}: {reason}")]
    InvalidInterval {
        contig: String,
        start: u64,
        end: u64,
        reason: &'static str,
    },

    #[error("Effective interrogated region is empty; burden is undefined over 0 bases")]
    EmptyDenominator,

    #[error("No candidate mutations were examined; the variant input appears to be empty")]
    EmptyInput,

    #[error("Malformed variant record at {path}:{line}: {reason}")]
    MalformedVariantRecord {
        path: String,
        line: u64,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What to do with a record that cannot be parsed into the Variant shape.
///
/// The default is [`Abort`](MalformedRecordPolicy::Abort): silently dropping
/// records could mask a systematic upstream problem. [`Skip`](MalformedRecordPolicy::Skip)
/// drops the record and surfaces it through a diagnostic counter instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedRecordPolicy {
    #[default]
    Abort,
    Skip,
}
