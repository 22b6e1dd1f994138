//! Error mapping for the webrtc-rs implementation

use janus_interfaces::ApiError;

// Maps a webrtc-rs error raised during offer/answer handling to ApiError
pub(crate) fn map_negotiation_error(context: &str, err: webrtc::Error) -> ApiError {
    match err {
        webrtc::Error::ErrConnectionClosed => {
            ApiError::PeerConnectionFailed(format!("{}: connection closed", context))
        }
        webrtc::Error::Sdp(sdp_err) => {
            ApiError::InvalidDescription(format!("{}: {}", context, sdp_err))
        }
        other => ApiError::NegotiationFailed(format!("{}: {}", context, other)),
    }
}

pub(crate) fn map_setup_error(context: &str, err: webrtc::Error) -> ApiError {
    ApiError::PeerConnectionFailed(format!("{}: {}", context, err))
}
