//! Synthetic media files for FFmpeg-backed tests.

use std::path::Path;

use ffmpeg_next::format::sample::Type as SampleType;
use ffmpeg_next::format::Sample;

const AUDIO_RATE: i32 = 44_100;
const AUDIO_FRAME: usize = 1024;
const COVER_SIZE: u32 = 16;

/// Writes an MPEG-4 video of `num_frames` solid grey frames, no audio.
pub fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: i32) {
    write_media(path, Some((num_frames, width, height, fps)), 0, false);
}

/// Writes an MPEG-4 video plus an AAC track of `audio_frames` x 1024 samples.
pub fn create_test_video_with_audio(
    path: &Path,
    num_frames: usize,
    width: u32,
    height: u32,
    fps: i32,
    audio_frames: usize,
) {
    write_media(path, Some((num_frames, width, height, fps)), audio_frames, false);
}

/// Writes a file holding only an AAC track.
pub fn create_audio_only(path: &Path, audio_frames: usize) {
    write_media(path, None, audio_frames, false);
}

/// Writes an AAC track plus a PNG cover picture (an `ATTACHED_PIC` stream).
pub fn create_audio_with_cover(path: &Path, audio_frames: usize) {
    write_media(path, None, audio_frames, true);
}

/// Number of demuxed packets on the first stream of `medium`, and how many
/// of those carry a decoding timestamp.
pub fn count_packets(path: &Path, medium: ffmpeg_next::media::Type) -> (usize, usize) {
    let mut ictx = ffmpeg_next::format::input(path).unwrap();
    let Some(index) = ictx
        .streams()
        .find(|s| s.parameters().medium() == medium)
        .map(|s| s.index())
    else {
        return (0, 0);
    };
    let mut total = 0;
    let mut timed = 0;
    for (stream, packet) in ictx.packets() {
        if stream.index() != index {
            continue;
        }
        total += 1;
        if packet.dts().is_some() {
            timed += 1;
        }
    }
    (total, timed)
}

/// Decodes the first video stream and returns the number of frames.
pub fn count_decoded_frames(path: &Path) -> usize {
    let mut ictx = ffmpeg_next::format::input(path).unwrap();
    let stream = ictx
        .streams()
        .best(ffmpeg_next::media::Type::Video)
        .unwrap();
    let index = stream.index();
    let mut decoder = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
        .unwrap()
        .decoder()
        .video()
        .unwrap();

    let mut count = 0;
    let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
    for (stream, packet) in ictx.packets() {
        if stream.index() != index {
            continue;
        }
        decoder.send_packet(&packet).unwrap();
        while decoder.receive_frame(&mut decoded).is_ok() {
            count += 1;
        }
    }
    decoder.send_eof().unwrap();
    while decoder.receive_frame(&mut decoded).is_ok() {
        count += 1;
    }
    count
}

fn write_media(
    path: &Path,
    video: Option<(usize, u32, u32, i32)>,
    audio_frames: usize,
    cover: bool,
) {
    ffmpeg_next::init().unwrap();

    let mut octx = ffmpeg_next::format::output(path).unwrap();
    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

    let mut video_encoder = None;
    if let Some((_, width, height, fps)) = video {
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
        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }
        let encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);
        video_encoder = Some((ost.index(), encoder));
    }

    let mut audio_encoder = None;
    if audio_frames > 0 {
        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::AAC).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();
        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .audio()
            .unwrap();
        encoder_ctx.set_rate(AUDIO_RATE);
        encoder_ctx.set_channel_layout(ffmpeg_next::ChannelLayout::MONO);
        encoder_ctx.set_format(Sample::F32(SampleType::Planar));
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, AUDIO_RATE));
        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }
        let encoder = encoder_ctx.open_as(codec).unwrap();
        ost.set_parameters(&encoder);
        audio_encoder = Some((ost.index(), encoder));
    }

    let mut cover_encoder = None;
    if cover {
        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::PNG).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();
        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();
        encoder_ctx.set_width(COVER_SIZE);
        encoder_ctx.set_height(COVER_SIZE);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::RGB24);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, 1));
        let encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);
        unsafe {
            (*ost.as_mut_ptr()).disposition =
                ffmpeg_next::format::stream::Disposition::ATTACHED_PIC.bits();
        }
        cover_encoder = Some((ost.index(), encoder));
    }

    octx.write_header().unwrap();

    if let Some((index, encoder)) = cover_encoder.as_mut() {
        let ost_tb = octx.stream(*index).unwrap().time_base();
        let mut picture = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            COVER_SIZE,
            COVER_SIZE,
        );
        picture.data_mut(0).fill(200);
        picture.set_pts(Some(0));
        encoder.send_frame(&picture).unwrap();
        encoder.send_eof().unwrap();
        drain(encoder, &mut octx, *index, ffmpeg_next::Rational(1, 1), ost_tb);
    }

    if let (Some((num_frames, width, height, fps)), Some((index, encoder))) =
        (video, video_encoder.as_mut())
    {
        let tb = ffmpeg_next::Rational(1, fps);
        let ost_tb = octx.stream(*index).unwrap().time_base();
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
            let value = ((i * 40) % 256) as u8;
            rgb_frame.data_mut(0).fill(value);

            let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&rgb_frame, &mut yuv_frame).unwrap();
            yuv_frame.set_pts(Some(i as i64));
            encoder.send_frame(&yuv_frame).unwrap();
            drain(encoder, &mut octx, *index, tb, ost_tb);
        }
        encoder.send_eof().unwrap();
        drain(encoder, &mut octx, *index, tb, ost_tb);
    }

    if let Some((index, encoder)) = audio_encoder.as_mut() {
        let tb = ffmpeg_next::Rational(1, AUDIO_RATE);
        let ost_tb = octx.stream(*index).unwrap().time_base();
        for n in 0..audio_frames {
            let mut frame = ffmpeg_next::util::frame::audio::Audio::new(
                Sample::F32(SampleType::Planar),
                AUDIO_FRAME,
                ffmpeg_next::ChannelLayout::MONO,
            );
            frame.set_rate(AUDIO_RATE as u32);
            frame.set_pts(Some((n * AUDIO_FRAME) as i64));
            let dst = frame.data_mut(0);
            for i in 0..AUDIO_FRAME {
                let t = (n * AUDIO_FRAME + i) as f32 / AUDIO_RATE as f32;
                let sample = (t * 440.0 * std::f32::consts::TAU).sin() * 0.25;
                dst[i * 4..i * 4 + 4].copy_from_slice(&sample.to_ne_bytes());
            }
            encoder.send_frame(&frame).unwrap();
            drain(encoder, &mut octx, *index, tb, ost_tb);
        }
        encoder.send_eof().unwrap();
        drain(encoder, &mut octx, *index, tb, ost_tb);
    }

    octx.write_trailer().unwrap();
}

fn drain(
    encoder: &mut ffmpeg_next::encoder::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    stream_index: usize,
    encoder_tb: ffmpeg_next::Rational,
    ost_tb: ffmpeg_next::Rational,
) {
    let mut packet = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        packet.set_stream(stream_index);
        packet.rescale_ts(encoder_tb, ost_tb);
        packet.write_interleaved(octx).unwrap();
    }
}
