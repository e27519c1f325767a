//! Host-side previews of what the panel shows.
//!
//! [`FrameRecorder`] is an [`LedStrip`] that keeps every frame written to it. The recorded
//! frames can be rendered through the panel's [`LedLayout`] into a PNG (one frame) or a
//! looping APNG (a whole scroll pass), drawing each LED as a soft-edged dot.

use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use embassy_time::Duration;
use png::{BitDepth, ColorType, Encoder, ScaledFloat};

use crate::led_strip::{Frame1d, LedStrip, Rgb};
use crate::led2d::layout::LedLayout;

const PREVIEW_INVERSE_GAMMA: f32 = 2.2;

/// An [`LedStrip`] that records frames instead of lighting LEDs.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder<const N: usize> {
    frames: Vec<Frame1d<N>>,
}

impl<const N: usize> FrameRecorder<N> {
    /// An empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Frames written so far, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[Frame1d<N>] {
        &self.frames
    }

    /// Take the recorded frames.
    #[must_use]
    pub fn into_frames(self) -> Vec<Frame1d<N>> {
        self.frames
    }
}

impl<const N: usize> LedStrip<N> for FrameRecorder<N> {
    async fn write_frame(&mut self, frame: &Frame1d<N>) -> crate::Result<()> {
        self.frames.push(*frame);
        Ok(())
    }
}

/// Render one frame, placed through `led_layout`, into a PNG no larger than
/// `target_max_dimension` pixels on its longer side.
///
/// # Errors
///
/// Returns an I/O or PNG encoding error.
pub fn write_frame_png<const N: usize, const W: usize, const H: usize>(
    frame: &Frame1d<N>,
    led_layout: &LedLayout<N, W, H>,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> Result<(), Box<dyn Error>> {
    let output_path = output_path.as_ref();
    let geometry = DotGeometry::fit(W, H, target_max_dimension)?;
    let pixels = render(frame, led_layout, &geometry);

    let mut encoder = encoder_for(output_path, &geometry)?;
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&pixels)?;
    println!("wrote PNG to {}", output_path.display());
    Ok(())
}

/// Render `frames` as a looping APNG, each held for `frame_delay`.
///
/// # Errors
///
/// Returns an error if `frames` is empty, the delay does not fit APNG's millisecond field,
/// or writing fails.
pub fn write_frames_apng<const N: usize, const W: usize, const H: usize>(
    frames: &[Frame1d<N>],
    led_layout: &LedLayout<N, W, H>,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    frame_delay: Duration,
) -> Result<(), Box<dyn Error>> {
    if frames.is_empty() {
        return Err("no frames to write".into());
    }
    let output_path = output_path.as_ref();
    let geometry = DotGeometry::fit(W, H, target_max_dimension)?;
    let frame_count = u32::try_from(frames.len())?;
    let delay_ms = u16::try_from(frame_delay.as_millis())?;

    let mut encoder = encoder_for(output_path, &geometry)?;
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    encoder.set_animated(frame_count, 0)?;
    let mut writer = encoder.write_header()?;
    for frame in frames {
        writer.set_frame_delay(delay_ms, 1000)?;
        writer.write_image_data(&render(frame, led_layout, &geometry))?;
    }
    writer.finish()?;
    println!("wrote APNG to {}", output_path.display());
    Ok(())
}

fn encoder_for(
    output_path: &Path,
    geometry: &DotGeometry,
) -> Result<Encoder<'static, BufWriter<File>>, Box<dyn Error>> {
    if let Some(parent) = output_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), geometry.width, geometry.height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Sixteen);
    Ok(encoder)
}

/// Pixel sizes of the preview: one square cell per LED with a dot centered in it.
struct DotGeometry {
    cell_size: u32,
    radius: u32,
    fade_width: u32,
    width: u32,
    height: u32,
}

impl DotGeometry {
    /// The largest cell size whose image still fits `target_max_dimension`.
    fn fit(columns: usize, rows: usize, target_max_dimension: u32) -> Result<Self, Box<dyn Error>> {
        let columns = u32::try_from(columns)?;
        let rows = u32::try_from(rows)?;
        let mut cell_size = target_max_dimension;
        while cell_size >= 4 {
            let geometry = Self::with_cell_size(columns, rows, cell_size);
            if geometry.width.max(geometry.height) <= target_max_dimension {
                return Ok(geometry);
            }
            cell_size -= 1;
        }
        Err(format!("{target_max_dimension} px is too small for a {columns}x{rows} preview").into())
    }

    fn with_cell_size(columns: u32, rows: u32, cell_size: u32) -> Self {
        let margin = (cell_size / 8).max(1);
        let radius = (cell_size - margin * 2) / 2;
        Self {
            cell_size,
            radius,
            fade_width: (radius / 3).max(1),
            // A border of one radius keeps edge dots off the image edge.
            width: columns * cell_size + radius * 2,
            height: rows * cell_size + radius * 2,
        }
    }

    /// Brightness of the dot at offset `(dx, dy)` from its center, 0.0 to 1.0.
    fn intensity(&self, dx: i64, dy: i64) -> f32 {
        let radius = self.radius as f32;
        let solid = radius - self.fade_width as f32;
        let distance = ((dx * dx + dy * dy) as f32).sqrt();
        if distance <= solid {
            1.0
        } else {
            ((radius - distance) / (radius - solid)).max(0.0)
        }
    }
}

/// 16-bit RGB image bytes for one frame.
fn render<const N: usize, const W: usize, const H: usize>(
    frame: &Frame1d<N>,
    led_layout: &LedLayout<N, W, H>,
    geometry: &DotGeometry,
) -> Vec<u8> {
    const BYTES_PER_PIXEL: usize = 6;
    let image_width = geometry.width as usize;
    let mut bytes = vec![0_u8; image_width * geometry.height as usize * BYTES_PER_PIXEL];
    let cell_size = geometry.cell_size as usize;
    let center = (cell_size as i64 - 1) / 2;

    for (color, &(x, y)) in frame.iter().zip(led_layout.index_to_xy()) {
        if *color == Rgb::default() {
            continue;
        }
        let channels = [color.r, color.g, color.b].map(|channel| {
            (channel as f32 / 255.0).powf(PREVIEW_INVERSE_GAMMA)
        });
        let origin_x = geometry.radius as usize + usize::from(x) * cell_size;
        let origin_y = geometry.radius as usize + usize::from(y) * cell_size;

        for local_y in 0..cell_size {
            for local_x in 0..cell_size {
                let intensity =
                    geometry.intensity(local_x as i64 - center, local_y as i64 - center);
                if intensity <= 0.0 {
                    continue;
                }
                let start = ((origin_y + local_y) * image_width + origin_x + local_x)
                    * BYTES_PER_PIXEL;
                for (offset, channel) in channels.iter().enumerate() {
                    let level = ((channel * intensity).clamp(0.0, 1.0) * 65535.0).round() as u16;
                    bytes[start + offset * 2..start + offset * 2 + 2]
                        .copy_from_slice(&level.to_be_bytes());
                }
            }
        }
    }
    bytes
}
