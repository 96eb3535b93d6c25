pub mod analysis;
pub mod domain;
pub mod pipeline;
pub mod poller;
pub mod ports;

pub use analysis::parse_analysis;
pub use domain::{
    AnalysisResult, Difficulty, GenerationJob, JobStatus, MediaKind, MediaUpload, PipelineOutput,
    UploadRequest, VideoRequest,
};
pub use pipeline::Pipeline;
pub use poller::{JobStatusPoller, PollState, DEFAULT_POLL_INTERVAL};
pub use ports::{
    ImageAnalysisService, ImageNormalizer, JobStatusSource, MediaStorageService, PortError,
    PortResult, SessionStore, TextToSpeechService, VideoGenerationService,
};
