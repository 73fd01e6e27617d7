use std::sync::Arc;
use webrtc::api::media_engine::MIME_TYPE_H264;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Supplies the local tracks a host attaches to each new connection.
pub trait MediaSource: Send + Sync {
    fn tracks(&self) -> Vec<Arc<dyn TrackLocal + Send + Sync>>;
}

/// No local media. Used by viewers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl MediaSource for NoMedia {
    fn tracks(&self) -> Vec<Arc<dyn TrackLocal + Send + Sync>> {
        Vec::new()
    }
}

/// One H264 video track. The capture layer writes encoded frames into
/// [`StaticVideoSource::track`].
#[derive(Clone)]
pub struct StaticVideoSource {
    track: Arc<TrackLocalStaticSample>,
}

impl StaticVideoSource {
    pub fn new() -> Self {
        let track = TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_H264.to_owned(),
                ..Default::default()
            },
            "screen".to_owned(),
            "screenbridge".to_owned(),
        );
        Self {
            track: Arc::new(track),
        }
    }

    pub fn track(&self) -> Arc<TrackLocalStaticSample> {
        self.track.clone()
    }
}

impl Default for StaticVideoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSource for StaticVideoSource {
    fn tracks(&self) -> Vec<Arc<dyn TrackLocal + Send + Sync>> {
        vec![self.track.clone()]
    }
}
