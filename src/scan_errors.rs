use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Sample interval must be constant (relative spread {spread:.4} exceeds 1%)")]
    NonUniformSampling { spread: f64 },

    #[error("Column lengths differ: {0}")]
    MismatchedLengths(String),

    #[error("Not enough samples: {found} found, at least {required} required")]
    NotEnoughSamples { found: usize, required: usize },

    #[error("Number of repeats must be >= 1, got {0}")]
    InvalidRepeat(u32),

    #[error("max_scan_duration and num_repeat cannot be given together")]
    ConflictingRepeat,

    #[error("This pattern is not repeatable, num_repeat and max_scan_duration cannot be given")]
    NotRepeatable,

    #[error(
        "max_scan_duration = {max_scan_duration} s is too short, one period lasts {period} s"
    )]
    ScanDurationTooShort { max_scan_duration: f64, period: f64 },

    #[error(
        "A start basis is required: start_datetime, start_hrang, start_lst or start_el/moving_up"
    )]
    MissingStartBasis,

    #[error("Exactly one start basis must be given, {0} were given")]
    MultipleStartBases(usize),

    #[error("Missing observation field: {0}")]
    MissingObservationField(&'static str),

    #[error(
        "Elevation {elevation} deg is not reachable at dec = {dec} deg and latitude = {latitude} deg"
    )]
    UnreachableElevation {
        elevation: f64,
        dec: f64,
        latitude: f64,
    },

    #[error(
        "Hour angle branch is ambiguous: {matching} candidate(s) match moving_up = {moving_up}"
    )]
    AmbiguousHourAngleBranch { matching: usize, moving_up: bool },

    #[error("Invalid sexagesimal angle: {0}")]
    InvalidSexagesimal(String),

    #[error("{0} is not a known module name or instrument slot")]
    UnknownModule(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON record error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl PartialEq for ScanError {
    fn eq(&self, other: &Self) -> bool {
        use ScanError::*;
        match (self, other) {
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            (NonUniformSampling { spread: a }, NonUniformSampling { spread: b }) => a == b,
            (MismatchedLengths(a), MismatchedLengths(b)) => a == b,
            (
                NotEnoughSamples {
                    found: f1,
                    required: r1,
                },
                NotEnoughSamples {
                    found: f2,
                    required: r2,
                },
            ) => f1 == f2 && r1 == r2,
            (InvalidRepeat(a), InvalidRepeat(b)) => a == b,
            (
                ScanDurationTooShort {
                    max_scan_duration: d1,
                    period: p1,
                },
                ScanDurationTooShort {
                    max_scan_duration: d2,
                    period: p2,
                },
            ) => d1 == d2 && p1 == p2,
            (MultipleStartBases(a), MultipleStartBases(b)) => a == b,
            (MissingObservationField(a), MissingObservationField(b)) => a == b,
            (
                UnreachableElevation {
                    elevation: e1,
                    dec: d1,
                    latitude: l1,
                },
                UnreachableElevation {
                    elevation: e2,
                    dec: d2,
                    latitude: l2,
                },
            ) => e1 == e2 && d1 == d2 && l1 == l2,
            (
                AmbiguousHourAngleBranch {
                    matching: m1,
                    moving_up: u1,
                },
                AmbiguousHourAngleBranch {
                    matching: m2,
                    moving_up: u2,
                },
            ) => m1 == m2 && u1 == u2,
            (InvalidSexagesimal(a), InvalidSexagesimal(b)) => a == b,
            (UnknownModule(a), UnknownModule(b)) => a == b,

            // not comparable: equal when the variant matches
            (CsvError(_), CsvError(_)) => true,
            (JsonError(_), JsonError(_)) => true,
            (IoError(_), IoError(_)) => true,

            (ConflictingRepeat, ConflictingRepeat) => true,
            (NotRepeatable, NotRepeatable) => true,
            (MissingStartBasis, MissingStartBasis) => true,

            _ => false,
        }
    }
}
