use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::playback::domain::frame_source::{FrameSource, FrameSourceError};
use crate::shared::frame::Frame;
use crate::shared::sequence_info::SequenceInfo;

/// Microseconds per second; container-level seeks use this time base.
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Requests further ahead than this decode-forward are served by a keyframe
/// seek instead of decoding every frame in between.
const MAX_FORWARD_DECODE: usize = 12;

/// Random-access frame source over a video file, via ffmpeg-next.
///
/// Seeking jumps to the nearest keyframe at or before the target and
/// decodes forward; consecutive or nearby indices reuse the running decoder.
/// Each frame is converted to RGB24.
pub struct FfmpegFrameSource {
    active: Option<ActiveVideo>,
}

// Safety: FfmpegFrameSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegFrameSource {}

impl FfmpegFrameSource {
    pub fn new() -> Self {
        Self { active: None }
    }
}

impl Default for FfmpegFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FfmpegFrameSource {
    fn sequence(&self) -> Option<&SequenceInfo> {
        self.active.as_ref().map(|a| &a.info)
    }

    fn seek(&mut self, index: usize) -> Result<Frame, FrameSourceError> {
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| FrameSourceError::decode(index, "no sequence open"))?;
        active.seek(index)
    }

    fn replace(&mut self, identifier: &Path) -> Result<SequenceInfo, FrameSourceError> {
        // Build the new decoder completely before touching the active one.
        let opened = ActiveVideo::open(identifier)?;
        let info = opened.info.clone();
        log::info!(
            "Opened video {} ({} frames @ {:.2} fps, {}x{})",
            identifier.display(),
            info.frame_count,
            info.fps,
            info.width,
            info.height
        );
        self.active = Some(opened);
        Ok(info)
    }

    fn close(&mut self) {
        self.active = None;
    }
}

struct ActiveVideo {
    info: SequenceInfo,
    ictx: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
    /// Seconds per stream timestamp tick.
    time_base: f64,
    start_ts: i64,
    /// Index the next sequentially decoded frame will carry.
    next_index: usize,
    timestamps_reliable: bool,
    eof: bool,
    last: Option<Frame>,
}

impl ActiveVideo {
    fn open(path: &Path) -> Result<Self, FrameSourceError> {
        let open_err = |e: &dyn std::fmt::Display| FrameSourceError::open(path, e);

        ffmpeg_next::init().map_err(|e| open_err(&e))?;
        let mut ictx = ffmpeg_next::format::input(&path).map_err(|e| open_err(&e))?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| open_err(&"no video stream found"))?;
        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| open_err(&e))?;
        let decoder = codec_ctx.decoder().video().map_err(|e| open_err(&e))?;

        let time_base = rational_to_f64(stream.time_base());
        let fps = match rational_to_f64(stream.avg_frame_rate()) {
            fps if fps > 0.0 => fps,
            _ => rational_to_f64(stream.rate()),
        };
        let start_ts = match stream.start_time() {
            i64::MIN => 0,
            ts => ts,
        };
        let declared_frames = stream.frames().max(0) as usize;
        let width = decoder.width();
        let height = decoder.height();

        let frame_count = if declared_frames > 0 {
            declared_frames
        } else {
            let counted = count_packets(&mut ictx, stream_index);
            ictx.seek(0, ..).map_err(|e| open_err(&e))?;
            counted
        };
        if frame_count == 0 {
            return Err(open_err(&"video stream has no frames"));
        }

        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| open_err(&e))?;

        Ok(Self {
            info: SequenceInfo {
                identifier: path.to_path_buf(),
                width,
                height,
                fps,
                frame_count,
            },
            ictx,
            decoder,
            scaler,
            stream_index,
            time_base,
            start_ts,
            next_index: 0,
            timestamps_reliable: true,
            eof: false,
            last: None,
        })
    }

    fn seek(&mut self, index: usize) -> Result<Frame, FrameSourceError> {
        if index >= self.info.frame_count {
            return Err(FrameSourceError::decode(
                index,
                format!("index out of range (frame count {})", self.info.frame_count),
            ));
        }
        if let Some(last) = self.last.as_ref().filter(|f| f.index() == index) {
            return Ok(last.clone());
        }

        if index < self.next_index || index > self.next_index + MAX_FORWARD_DECODE {
            self.reposition(index)?;
        }

        while let Some(frame) = self.decode_next(index)? {
            if frame.index() >= index {
                let frame = frame.with_index(index);
                self.last = Some(frame.clone());
                return Ok(frame);
            }
        }
        Err(FrameSourceError::decode(
            index,
            "stream ended before the requested frame",
        ))
    }

    /// Moves the demuxer to the keyframe at or before `index`.
    ///
    /// Without usable timestamps we cannot tell where a seek landed, so the
    /// stream is rewound and frames are counted from the start instead.
    fn reposition(&mut self, index: usize) -> Result<(), FrameSourceError> {
        let seek_result = if self.timestamps_reliable && self.info.fps > 0.0 {
            let start_us = self.start_ts as f64 * self.time_base * AV_TIME_BASE;
            let target_us = (index as f64 / self.info.fps * AV_TIME_BASE + start_us) as i64;
            self.ictx.seek(target_us, ..target_us)
        } else {
            self.next_index = 0;
            self.ictx.seek(0, ..)
        };
        seek_result.map_err(|e| FrameSourceError::decode(index, e))?;
        self.decoder.flush();
        self.eof = false;
        self.last = None;
        Ok(())
    }

    /// Decodes the next frame in stream order, or `None` at end of stream.
    fn decode_next(&mut self, requested: usize) -> Result<Option<Frame>, FrameSourceError> {
        loop {
            let mut decoded = Video::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return self.convert(&decoded, requested).map(Some);
            }
            if self.eof {
                return Ok(None);
            }

            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.eof = true;
                continue;
            };
            if stream.index() != self.stream_index {
                continue;
            }
            if let Err(e) = self.decoder.send_packet(&packet) {
                log::debug!("Skipping undecodable packet: {e}");
            }
        }
    }

    fn convert(&mut self, decoded: &Video, requested: usize) -> Result<Frame, FrameSourceError> {
        let index = match decoded.timestamp().or_else(|| decoded.pts()) {
            Some(ts) if self.timestamps_reliable => {
                let seconds = (ts - self.start_ts) as f64 * self.time_base;
                (seconds * self.info.fps).round().max(0.0) as usize
            }
            _ => {
                self.timestamps_reliable = false;
                self.next_index
            }
        };
        self.next_index = index + 1;

        let mut rgb_frame = Video::empty();
        self.scaler
            .run(decoded, &mut rgb_frame)
            .map_err(|e| FrameSourceError::decode(requested, e))?;
        let pixels = extract_rgb_pixels(&rgb_frame, self.info.width, self.info.height);
        Ok(Frame::new(pixels, self.info.width, self.info.height, index))
    }
}

fn rational_to_f64(rational: ffmpeg_next::Rational) -> f64 {
    if rational.denominator() == 0 {
        0.0
    } else {
        rational.numerator() as f64 / rational.denominator() as f64
    }
}

fn count_packets(ictx: &mut Input, stream_index: usize) -> usize {
    ictx.packets()
        .filter(|(stream, _)| stream.index() == stream_index)
        .count()
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer,
/// dropping per-row stride padding.
pub(crate) fn extract_rgb_pixels(rgb_frame: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_bytes = width as usize * Frame::CHANNELS;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + row_bytes]);
    }
    pixels
}

#[cfg(test)]
pub(crate) mod test_video {
    use std::path::Path;

    /// Encodes `num_frames` flat grey MPEG-4 frames; frame `i` has level `(i * 40) % 256`.
    pub fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: i32) {
        ffmpeg_next::init().unwrap();

        let mut octx = ffmpeg_next::format::output(path).unwrap();
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();
        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();

        encoder_ctx.set_width(width);
        encoder_ctx.set_height(height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));
        encoder_ctx.set_gop(4);
        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let mut encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);
        octx.write_header().unwrap();
        let ost_time_base = octx.stream(0).unwrap().time_base();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .unwrap();

        for i in 0..num_frames {
            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
                ffmpeg_next::format::Pixel::RGB24,
                width,
                height,
            );
            let stride = rgb_frame.stride(0);
            let data = rgb_frame.data_mut(0);
            let value = ((i * 40) % 256) as u8;
            for row in 0..height as usize {
                for col in 0..(width as usize * 3) {
                    data[row * stride + col] = value;
                }
            }

            let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&rgb_frame, &mut yuv_frame).unwrap();
            yuv_frame.set_pts(Some(i as i64));
            encoder.send_frame(&yuv_frame).unwrap();

            let mut encoded = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut encoded).is_ok() {
                encoded.set_stream(0);
                encoded.rescale_ts(ffmpeg_next::Rational(1, fps), ost_time_base);
                encoded.write_interleaved(&mut octx).unwrap();
            }
        }

        encoder.send_eof().unwrap();
        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(ffmpeg_next::Rational(1, fps), ost_time_base);
            encoded.write_interleaved(&mut octx).unwrap();
        }
        octx.write_trailer().unwrap();
    }
}
