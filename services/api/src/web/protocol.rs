//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket messages the server pushes to a client watching a
//! video generation job. The client sends nothing except close frames.

use serde::Serialize;
use tutor_core::{domain::GenerationJob, poller::PollState};

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The job is still pending or processing.
    Status { job: GenerationJob },

    /// The latest status request failed. Polling continues.
    PollError { message: String },

    /// The job finished and `job.result_url` holds the video.
    Completed { job: GenerationJob },

    /// The vendor gave up on the job.
    Failed { job: GenerationJob },
}

impl ServerMessage {
    /// Translates a poller state into the message the client should see.
    ///
    /// Returns `None` when there is nothing new to report, e.g. before the
    /// first status request has resolved.
    pub fn from_state(state: &PollState) -> Option<Self> {
        match state {
            PollState::Idle => None,
            PollState::Polling {
                error: Some(message),
                ..
            } => Some(ServerMessage::PollError {
                message: message.clone(),
            }),
            PollState::Polling {
                last: Some(job), ..
            } => Some(ServerMessage::Status { job: job.clone() }),
            PollState::Polling { .. } => None,
            PollState::Completed(job) => Some(ServerMessage::Completed { job: job.clone() }),
            PollState::Failed(job) => Some(ServerMessage::Failed { job: job.clone() }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ServerMessage::Completed { .. } | ServerMessage::Failed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::domain::JobStatus;

    fn job(status: JobStatus) -> GenerationJob {
        GenerationJob {
            id: "gen-1".to_string(),
            status,
            result_url: None,
            error: None,
        }
    }

    #[test]
    fn nothing_to_report_before_the_first_response() {
        assert_eq!(ServerMessage::from_state(&PollState::Idle), None);
        let waiting = PollState::Polling {
            job_id: "gen-1".to_string(),
            last: None,
            error: None,
        };
        assert_eq!(ServerMessage::from_state(&waiting), None);
    }

    #[test]
    fn poll_errors_take_precedence_over_the_last_record() {
        let state = PollState::Polling {
            job_id: "gen-1".to_string(),
            last: Some(job(JobStatus::Processing)),
            error: Some("vendor timed out".to_string()),
        };
        assert_eq!(
            ServerMessage::from_state(&state),
            Some(ServerMessage::PollError {
                message: "vendor timed out".to_string()
            })
        );
    }

    #[test]
    fn serializes_with_a_type_tag() {
        let mut done = job(JobStatus::Completed);
        done.result_url = Some("https://cdn.example/v.mp4".to_string());
        let msg = ServerMessage::from_state(&PollState::Completed(done)).unwrap();
        assert!(msg.is_terminal());

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "completed");
        assert_eq!(json["job"]["status"], "completed");
        assert_eq!(json["job"]["resultUrl"], "https://cdn.example/v.mp4");
    }

    #[test]
    fn status_messages_are_not_terminal() {
        let state = PollState::Polling {
            job_id: "gen-1".to_string(),
            last: Some(job(JobStatus::Pending)),
            error: None,
        };
        let msg = ServerMessage::from_state(&state).unwrap();
        assert!(!msg.is_terminal());
        assert_eq!(serde_json::to_value(&msg).unwrap()["type"], "status");
    }
}
