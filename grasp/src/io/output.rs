use crate::config::GraspConfig;
use curenest::io::ext_repr::{SolveRequest, SolveResponse};
use serde::{Deserialize, Serialize};

/// Everything needed to reproduce and inspect a solve: the request, the response and the configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GraspOutput {
    #[serde(flatten)]
    pub request: SolveRequest,
    pub response: SolveResponse,
    pub config: GraspConfig,
}
