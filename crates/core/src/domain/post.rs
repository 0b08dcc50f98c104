// PoST Data Initialization Model

use serde::{Deserialize, Serialize};

/// Lifecycle of the data initialization job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
    Stopped,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Stopped)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Idle => write!(f, "IDLE"),
            JobState::Running => write!(f, "RUNNING"),
            JobState::Completed => write!(f, "COMPLETED"),
            JobState::Failed => write!(f, "FAILED"),
            JobState::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Parameters of one initialization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostOptions {
    pub data_dir: String,
    /// Target size of the data area in bytes
    pub data_size: u64,
    #[serde(default)]
    pub append: bool,
    #[serde(default)]
    pub throttle: bool,
    #[serde(default)]
    pub compute_provider_id: u32,
}

/// Failure classes reported inside progress events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostErrorKind {
    FileNotFound,
    FileIo,
    InsufficientSpace,
    ComputeFailure,
}

/// One progress update emitted by the compute backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub bytes_written: u64,
    pub error_kind: Option<PostErrorKind>,
    pub error_message: Option<String>,
    pub in_progress: bool,
}

impl ProgressEvent {
    pub fn progress(bytes_written: u64) -> Self {
        Self {
            bytes_written,
            in_progress: true,
            ..Default::default()
        }
    }

    pub fn failure(bytes_written: u64, kind: PostErrorKind, message: impl Into<String>) -> Self {
        Self {
            bytes_written,
            error_kind: Some(kind),
            error_message: Some(message.into()),
            in_progress: false,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_kind.is_some()
    }
}

/// Answer to a status query: job state, last progress and last options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSetupStatus {
    pub state: JobState,
    pub bytes_written: u64,
    pub error_kind: Option<PostErrorKind>,
    pub error_message: Option<String>,
    pub in_progress: bool,
    pub last_options: Option<PostOptions>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComputeApiClass {
    #[default]
    Unspecified,
    Cpu,
    Cuda,
    Vulkan,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeProvider {
    pub id: u32,
    pub model: String,
    pub compute_api: ComputeApiClass,
}

/// A provider together with its measured throughput.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderBenchmark {
    #[serde(flatten)]
    pub provider: ComputeProvider,
    /// Bytes of labels per second
    pub performance: u64,
}
