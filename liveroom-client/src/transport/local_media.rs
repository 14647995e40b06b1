use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use webrtc::api::media_engine::MIME_TYPE_OPUS;
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

const OPUS_FRAME: Duration = Duration::from_millis(20);
// One Opus frame of digital silence (TOC byte + padding).
const OPUS_SILENCE: [u8; 3] = [0xf8, 0xff, 0xfe];

/// Opus track published on every peer link built with it.
pub fn opus_track(stream_id: &str) -> Arc<TrackLocalStaticSample> {
    Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_owned(),
            clock_rate: 48000,
            channels: 2,
            ..Default::default()
        },
        "audio".to_owned(),
        stream_id.to_owned(),
    ))
}

/// Feed `track` with silent frames until the task is aborted. Lets a
/// headless participant publish media without a capture device.
pub fn spawn_silence(track: Arc<TrackLocalStaticSample>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(OPUS_FRAME);
        loop {
            ticker.tick().await;
            let sample = Sample {
                data: OPUS_SILENCE.to_vec().into(),
                duration: OPUS_FRAME,
                ..Default::default()
            };
            if let Err(e) = track.write_sample(&sample).await {
                debug!("Dropping silent frame: {}", e);
            }
        }
    })
}
