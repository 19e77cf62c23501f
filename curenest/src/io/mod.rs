/// External (serializable) representations of requests and responses
pub mod ext_repr;

/// Exporting a [`BatchSolution`](crate::entities::BatchSolution) into a [`SolveResponse`](ext_repr::SolveResponse)
pub mod export;

/// Importing and validating a [`SolveRequest`](ext_repr::SolveRequest)
pub mod import;

/// Rendering layouts as SVG documents
#[cfg(feature = "svg-export")]
pub mod svg;
