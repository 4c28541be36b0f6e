use std::path::Path;

use ffmpeg_next::codec;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Codec and option set used by [`FfmpegWriter`].
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderSettings {
    /// The encoder is looked up by this id.
    pub codec: codec::Id,
    /// Passed to the encoder when it is opened.
    pub encoder_options: Vec<(String, String)>,
    /// Passed to the muxer when the container header is written.
    pub muxer_options: Vec<(String, String)>,
}

impl EncoderSettings {
    /// H.264 High profile, level 5.1, slow preset, MP4 index up front.
    pub fn h264() -> Self {
        Self {
            codec: codec::Id::H264,
            encoder_options: vec![
                ("preset".to_string(), "slower".to_string()),
                ("profile".to_string(), "high".to_string()),
                ("level".to_string(), "5.1".to_string()),
            ],
            muxer_options: vec![("movflags".to_string(), "faststart".to_string())],
        }
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::h264()
    }
}

fn dictionary(options: &[(String, String)]) -> ffmpeg_next::Dictionary<'static> {
    let mut dict = ffmpeg_next::Dictionary::new();
    for (key, value) in options {
        dict.set(key, value);
    }
    dict
}

/// Source handle and stream mapping for copied audio.
struct AudioSource {
    input: ffmpeg_next::format::context::Input,
    stream_index: usize,
    time_base: ffmpeg_next::Rational,
    output_index: usize,
}

/// Encodes RGB frames to a YUV 4:2:0 video stream via ffmpeg-next.
///
/// When the metadata passed to `open` names a source file with an audio
/// track, that track's packets are copied into the output unchanged.
pub struct FfmpegWriter {
    settings: EncoderSettings,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    source: Option<ffmpeg_next::format::context::Input>,
    encoder_time_base: ffmpeg_next::Rational,
    width: u32,
    height: u32,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new(settings: EncoderSettings) -> Self {
        Self {
            settings,
            octx: None,
            encoder: None,
            scaler: None,
            source: None,
            encoder_time_base: ffmpeg_next::Rational(0, 1),
            width: 0,
            height: 0,
            frame_count: 0,
            video_stream_index: 0,
        }
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new(EncoderSettings::default())
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        if metadata.width == 0 || metadata.height == 0 {
            return Err(format!(
                "Invalid output size {}x{}",
                metadata.width, metadata.height
            )
            .into());
        }
        if metadata.width % 2 != 0 || metadata.height % 2 != 0 {
            return Err(format!(
                "YUV 4:2:0 output needs even dimensions, got {}x{}",
                metadata.width, metadata.height
            )
            .into());
        }
        let fps = metadata.fps.round() as i32;
        if fps <= 0 {
            return Err(format!("Invalid output frame rate {}", metadata.fps).into());
        }

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(self.settings.codec)
            .ok_or_else(|| format!("No encoder available for {:?}", self.settings.codec))?;

        let mut ost = octx.add_stream(Some(codec))?;
        let video_stream_index = ost.index();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        let time_base = ffmpeg_next::Rational(1, fps);
        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(dictionary(&self.settings.encoder_options))?;
        ost.set_parameters(&encoder);

        let mut audio = match &metadata.source_path {
            Some(source) => add_audio_stream(&mut octx, source)?,
            None => None,
        };

        octx.write_header_with(dictionary(&self.settings.muxer_options))?;

        if let Some(audio) = audio.as_mut() {
            let copied = copy_audio_packets(audio, &mut octx)?;
            log::info!("Copied {copied} audio packets");
        }

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        self.width = metadata.width;
        self.height = metadata.height;
        self.encoder_time_base = time_base;
        self.video_stream_index = video_stream_index;
        self.frame_count = 0;
        self.source = audio.map(|a| a.input);
        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(scaler), Some(octx)) = (
            self.encoder.as_mut(),
            self.scaler.as_mut(),
            self.octx.as_mut(),
        ) else {
            return Err("FfmpegWriter: not opened".into());
        };

        if frame.width() != self.width || frame.height() != self.height || frame.channels() != 3
        {
            return Err(format!(
                "Frame {} is {}x{}x{}, expected {}x{}x3",
                frame.index(),
                frame.width(),
                frame.height(),
                frame.channels(),
                self.width,
                self.height
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let stride = rgb_frame.stride(0);
        let row_len = self.width as usize * 3;
        let data = rgb_frame.data_mut(0);
        let src = frame.data();

        // Copy pixel data, respecting stride
        for row in 0..self.height as usize {
            let src_start = row * row_len;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_len]
                .copy_from_slice(&src[src_start..src_start + row_len]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&yuv_frame)?;
        drain_packets(
            encoder,
            octx,
            self.video_stream_index,
            self.encoder_time_base,
        )?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(mut encoder), Some(mut octx)) = (self.encoder.take(), self.octx.take()) else {
            return Ok(());
        };

        encoder.send_eof()?;
        drain_packets(
            &mut encoder,
            &mut octx,
            self.video_stream_index,
            self.encoder_time_base,
        )?;
        octx.write_trailer()?;

        drop(octx);
        self.scaler = None;
        self.source = None;

        log::info!("Encoded {} video frames", self.frame_count);
        Ok(())
    }
}

/// Muxes every packet the encoder has ready.
fn drain_packets(
    encoder: &mut ffmpeg_next::encoder::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    stream_index: usize,
    encoder_time_base: ffmpeg_next::Rational,
) -> Result<usize, Box<dyn std::error::Error>> {
    let ost_time_base = octx
        .stream(stream_index)
        .ok_or("Output video stream missing")?
        .time_base();

    let mut written = 0;
    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(stream_index);
        encoded.rescale_ts(encoder_time_base, ost_time_base);
        encoded.write_interleaved(octx)?;
        written += 1;
    }
    Ok(written)
}

/// Opens `source` and, if it has an audio track, adds an output stream
/// templated from the first one.
fn add_audio_stream(
    octx: &mut ffmpeg_next::format::context::Output,
    source: &Path,
) -> Result<Option<AudioSource>, Box<dyn std::error::Error>> {
    let input = ffmpeg_next::format::input(source)?;

    let Some((stream_index, time_base, parameters)) = input
        .streams()
        .find(|s| s.parameters().medium() == ffmpeg_next::media::Type::Audio)
        .map(|s| (s.index(), s.time_base(), s.parameters()))
    else {
        log::info!("{} has no audio track", source.display());
        return Ok(None);
    };

    let mut ost = octx.add_stream(ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::None))?;
    ost.set_parameters(parameters);
    // Let the muxer pick a tag valid for the output container.
    unsafe {
        (*ost.parameters().as_mut_ptr()).codec_tag = 0;
    }
    let output_index = ost.index();

    Ok(Some(AudioSource {
        input,
        stream_index,
        time_base,
        output_index,
    }))
}

/// Packets without a decoding timestamp cannot be muxed.
fn timed_packets<I>(packets: I) -> impl Iterator<Item = ffmpeg_next::Packet>
where
    I: IntoIterator<Item = ffmpeg_next::Packet>,
{
    packets.into_iter().filter(|packet| packet.dts().is_some())
}

/// Demuxes the source audio track and muxes it into the output in order.
fn copy_audio_packets(
    audio: &mut AudioSource,
    octx: &mut ffmpeg_next::format::context::Output,
) -> Result<usize, Box<dyn std::error::Error>> {
    let ost_time_base = octx
        .stream(audio.output_index)
        .ok_or("Output audio stream missing")?
        .time_base();

    let stream_index = audio.stream_index;
    let packets = audio
        .input
        .packets()
        .filter(|(stream, _)| stream.index() == stream_index)
        .map(|(_, packet)| packet);

    let mut copied = 0;
    for mut packet in timed_packets(packets) {
        packet.rescale_ts(audio.time_base, ost_time_base);
        packet.set_position(-1);
        packet.set_stream(audio.output_index);
        packet.write_interleaved(octx)?;
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_media::{
        count_decoded_frames, count_packets, create_test_video, create_test_video_with_audio,
    };
    use approx::assert_abs_diff_eq;
    use std::path::PathBuf;

    fn mpeg4_settings() -> EncoderSettings {
        EncoderSettings {
            codec: codec::Id::MPEG4,
            encoder_options: Vec::new(),
            muxer_options: vec![("movflags".to_string(), "faststart".to_string())],
        }
    }

    fn metadata(w: u32, h: u32, fps: f64, source: Option<PathBuf>) -> VideoMetadata {
        VideoMetadata {
            width: w,
            height: h,
            fps,
            total_frames: 0,
            codec: String::new(),
            source_path: source,
        }
    }

    fn solid_frame(index: usize, w: u32, h: u32, value: u8) -> Frame {
        let data = vec![value; (w * h * 3) as usize];
        Frame::new(data, w, h, 3, index)
    }

    fn write_frames(path: &Path, meta: &VideoMetadata, count: usize) {
        let mut writer = FfmpegWriter::new(mpeg4_settings());
        writer.open(path, meta).unwrap();
        for i in 0..count {
            writer
                .write(&solid_frame(i, meta.width, meta.height, 128))
                .unwrap();
        }
        writer.close().unwrap();
    }

    fn video_duration_secs(path: &Path) -> f64 {
        let ictx = ffmpeg_next::format::input(path).unwrap();
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .unwrap();
        stream.duration() as f64 * f64::from(stream.time_base())
    }

    #[test]
    fn test_default_settings_are_h264_high() {
        let settings = EncoderSettings::default();
        assert_eq!(settings.codec, codec::Id::H264);
        assert!(settings
            .encoder_options
            .contains(&("preset".to_string(), "slower".to_string())));
        assert!(settings
            .encoder_options
            .contains(&("profile".to_string(), "high".to_string())));
        assert!(settings
            .encoder_options
            .contains(&("level".to_string(), "5.1".to_string())));
        assert_eq!(
            settings.muxer_options,
            vec![("movflags".to_string(), "faststart".to_string())]
        );
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        write_frames(&path, &metadata(160, 120, 24.0, None), 3);

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_silent_ten_frames_give_ten_frame_video_without_audio() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("silent.mp4");
        create_test_video(&source, 10, 160, 120, 30);
        let path = dir.path().join("silent-ascii.mp4");

        write_frames(&path, &metadata(160, 120, 24.0, Some(source)), 10);

        assert_eq!(count_decoded_frames(&path), 10);
        assert_abs_diff_eq!(video_duration_secs(&path), 10.0 / 24.0, epsilon = 0.05);
        assert_eq!(count_packets(&path, ffmpeg_next::media::Type::Audio), (0, 0));
    }

    #[test]
    fn test_frame_count_ignores_source_rate() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("fast.mp4");
        create_test_video(&source, 6, 160, 120, 60);
        let path = dir.path().join("fast-ascii.mp4");

        write_frames(&path, &metadata(160, 120, 24.0, Some(source)), 6);

        assert_eq!(count_decoded_frames(&path), 6);
        assert_abs_diff_eq!(video_duration_secs(&path), 6.0 / 24.0, epsilon = 0.05);
    }

    #[test]
    fn test_audio_packets_are_copied() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("speech.mp4");
        create_test_video_with_audio(&source, 5, 160, 120, 30, 20);
        let path = dir.path().join("speech-ascii.mp4");

        write_frames(&path, &metadata(160, 120, 24.0, Some(source.clone())), 5);

        let (_, source_timed) = count_packets(&source, ffmpeg_next::media::Type::Audio);
        let (copied, copied_timed) = count_packets(&path, ffmpeg_next::media::Type::Audio);
        assert!(source_timed > 0);
        assert_eq!(copied, source_timed);
        assert_eq!(copied_timed, copied);
        assert_eq!(count_decoded_frames(&path), 5);
    }

    #[test]
    fn test_audio_packets_keep_their_order() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("speech.mp4");
        create_test_video_with_audio(&source, 3, 160, 120, 30, 12);
        let path = dir.path().join("speech-ascii.mp4");

        write_frames(&path, &metadata(160, 120, 24.0, Some(source)), 3);

        let mut ictx = ffmpeg_next::format::input(&path).unwrap();
        let audio_index = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .unwrap()
            .index();
        let dts: Vec<i64> = ictx
            .packets()
            .filter(|(s, _)| s.index() == audio_index)
            .filter_map(|(_, p)| p.dts())
            .collect();
        assert!(!dts.is_empty());
        assert!(dts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_untimed_packets_are_dropped() {
        let untimed = ffmpeg_next::Packet::empty();
        let mut first = ffmpeg_next::Packet::new(4);
        first.set_dts(Some(0));
        let mut second = ffmpeg_next::Packet::new(4);
        second.set_dts(Some(1024));

        let kept: Vec<_> = timed_packets(vec![first, untimed, second]).collect();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].dts(), Some(0));
        assert_eq!(kept[1].dts(), Some(1024));
    }

    #[test]
    fn test_written_video_has_correct_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        write_frames(&path, &metadata(160, 120, 24.0, None), 1);

        let ictx = ffmpeg_next::format::input(&path).unwrap();
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .unwrap();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).unwrap();
        let decoder = codec_ctx.decoder().video().unwrap();
        assert_eq!(decoder.width(), 160);
        assert_eq!(decoder.height(), 120);
    }

    #[test]
    fn test_h264_output_when_libx264_available() {
        ffmpeg_next::init().unwrap();
        if ffmpeg_next::encoder::find_by_name("libx264").is_none() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let meta = metadata(160, 120, 24.0, None);

        let mut writer = FfmpegWriter::default();
        writer.open(&path, &meta).unwrap();
        for i in 0..4 {
            writer.write(&solid_frame(i, 160, 120, 90)).unwrap();
        }
        writer.close().unwrap();

        let ictx = ffmpeg_next::format::input(&path).unwrap();
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .unwrap();
        assert_eq!(stream.parameters().id(), codec::Id::H264);
        assert_eq!(count_decoded_frames(&path), 4);
    }

    #[test]
    fn test_odd_dimensions_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let mut writer = FfmpegWriter::new(mpeg4_settings());
        let err = writer
            .open(&path, &metadata(161, 120, 24.0, None))
            .unwrap_err();
        assert!(err.to_string().contains("even"));
    }

    #[test]
    fn test_mismatched_frame_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let mut writer = FfmpegWriter::new(mpeg4_settings());
        writer
            .open(&path, &metadata(160, 120, 24.0, None))
            .unwrap();
        let err = writer.write(&solid_frame(7, 80, 60, 0)).unwrap_err();
        assert!(err.to_string().contains("Frame 7"));
    }

    #[test]
    fn test_write_without_open_returns_error() {
        let mut writer = FfmpegWriter::new(mpeg4_settings());
        let result = writer.write(&solid_frame(0, 160, 120, 128));
        assert!(result.is_err());
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");

        let mut writer = FfmpegWriter::new(mpeg4_settings());
        writer
            .open(&path, &metadata(160, 120, 24.0, None))
            .unwrap();
        writer.write(&solid_frame(0, 160, 120, 128)).unwrap();
        writer.close().unwrap();
        assert!(writer.close().is_ok());
    }

    #[test]
    fn test_roundtrip_preserves_brightness() {
        use crate::video::domain::video_reader::VideoReader;
        use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.mp4");
        write_frames(&path, &metadata(160, 120, 24.0, None), 3);

        let mut reader = FfmpegReader::new();
        let read_meta = reader.open(&path).unwrap();
        assert_eq!(read_meta.width, 160);
        assert_eq!(read_meta.height, 120);

        let frames: Vec<_> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 3);

        // Codec is lossy, but the overall brightness should be close
        let first = &frames[0];
        let avg: f64 =
            first.data().iter().map(|&b| b as f64).sum::<f64>() / first.data().len() as f64;
        assert!(
            (avg - 128.0).abs() < 40.0,
            "Average pixel value {avg} should be close to 128"
        );
    }
}
