use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpicycleError {
    #[error("phase vector must have 2 to 6 components, got {0}")]
    InvalidPhaseVectorLength(usize),

    #[error("{accessor}() is not defined for a {variant} orbit")]
    Dimensionality {
        accessor: &'static str,
        variant: &'static str,
    },

    #[error("orbit interpolation failed and t = {0} is not a stored sample; integrate on a finer grid")]
    InterpolationGrid(f64),

    #[error("requested time {t} is outside the integrated range [{start}, {end}]")]
    TimeOutOfRange { t: f64, start: f64, end: f64 },

    #[error("orbit has not been integrated; evaluation is only defined at t = 0, got t = {0}")]
    NotIntegrated(f64),

    #[error("trajectory arrays mismatch: {0}")]
    TrajectoryMismatch(String),

    #[error("interpolation knots must be strictly increasing")]
    NonMonotonicKnots,

    #[error("at least two samples are required to interpolate, got {0}")]
    TooFewSamples(usize),

    #[error("normalization defaults already installed")]
    ConfigAlreadyInstalled,

    #[error("unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("configuration parse error: {0}")]
    ConfigParseError(#[from] toml::de::Error),
}
