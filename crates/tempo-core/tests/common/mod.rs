#![allow(dead_code)]

use ndarray::Array2;

use tempo_core::frame::{ColorFrame, Frame, FrameRate, VideoFrame};

pub fn rate(num: u32, den: u32) -> FrameRate {
    FrameRate { num, den }
}

pub fn flat_frame(h: usize, w: usize, value: f32) -> Frame {
    Frame::new(Array2::from_elem((h, w), value), 8)
}

/// Smooth non-periodic texture, with its content moved by `(dx, dy)` pixels.
pub fn textured_frame(h: usize, w: usize, dx: f32, dy: f32) -> Frame {
    let data = Array2::from_shape_fn((h, w), |(r, c)| {
        let x = c as f32 - dx;
        let y = r as f32 - dy;
        let v = 0.5 + 0.25 * (x * 0.45).sin() * (y * 0.3).cos() + 0.2 * ((x + y) * 0.17).sin();
        v.clamp(0.0, 1.0)
    });
    Frame::new(data, 8)
}

/// Vertical stripes repeating every `period` pixels.
pub fn stripe_frame(h: usize, w: usize, period: usize) -> Frame {
    let data = Array2::from_shape_fn((h, w), |(_, c)| {
        if c % period < period / 2 {
            1.0
        } else {
            0.0
        }
    });
    Frame::new(data, 8)
}

pub fn mono(frame: Frame) -> VideoFrame {
    VideoFrame::Mono(frame)
}

/// `n` mono frames panning right by `step` pixels per frame.
pub fn moving_clip(n: usize, h: usize, w: usize, step: f32) -> Vec<VideoFrame> {
    (0..n)
        .map(|i| mono(textured_frame(h, w, i as f32 * step, 0.0)))
        .collect()
}

/// Color version of [`moving_clip`] with differently scaled channels.
pub fn moving_color_clip(n: usize, h: usize, w: usize, step: f32) -> Vec<VideoFrame> {
    (0..n)
        .map(|i| {
            let base = textured_frame(h, w, i as f32 * step, 0.0);
            let scaled = |k: f32| Frame::new(base.data.mapv(|v| (v * k).clamp(0.0, 1.0)), 8);
            VideoFrame::Color(ColorFrame {
                red: scaled(1.0),
                green: scaled(0.8),
                blue: scaled(0.6),
            })
        })
        .collect()
}

/// Largest per-pixel difference over every plane.
pub fn max_abs_diff(a: &VideoFrame, b: &VideoFrame) -> f32 {
    let (ca, cb) = (a.to_color(), b.to_color());
    [
        (&ca.red, &cb.red),
        (&ca.green, &cb.green),
        (&ca.blue, &cb.blue),
    ]
    .iter()
    .flat_map(|(pa, pb)| pa.data.iter().zip(pb.data.iter()).map(|(x, y)| (x - y).abs()))
    .fold(0.0, f32::max)
}

/// Every sample of every plane, for range checks.
pub fn samples(frame: &VideoFrame) -> Vec<f32> {
    let c = frame.to_color();
    c.red
        .data
        .iter()
        .chain(c.green.data.iter())
        .chain(c.blue.data.iter())
        .copied()
        .collect()
}
