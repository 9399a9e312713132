use argh::FromArgs;
use glam::{DMat4, DVec3, Mat3, Mat4};
use std::path::{Path, PathBuf};

use viewfinder::{
    capture::project_viewfinder,
    image::{Image, ImageSize},
    imgproc::{draw::draw_quadrilateral, rectify::CropStrictness},
    k3d::{linalg::rotation_x_180, projector::Quadrilateral3D, Eye, RawCalibration},
    CaptureConfig, CaptureSession, LatestFrame, StereoFrame,
};

const RESOLUTION: ImageSize = ImageSize {
    width: 1280,
    height: 720,
};

#[derive(FromArgs)]
/// Capture a viewfinder from a synthetic stereo frame and save both photos
struct Args {
    /// directory to write the photos to
    #[argh(option, short = 'o')]
    output_dir: PathBuf,

    /// crop strictness: loose, normal or strict
    #[argh(option, short = 's', from_str_fn(parse_strictness))]
    strictness: Option<CropStrictness>,

    /// path to a JSON capture configuration
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// shortest side of the photos in pixels
    #[argh(option)]
    shortest_side: Option<usize>,

    /// horizontal shift of the viewfinder in meters
    #[argh(option, short = 'x', default = "0.0")]
    shift: f64,

    /// also save the frames with the projected viewfinder drawn on top
    #[argh(switch)]
    overlay: bool,
}

fn parse_strictness(value: &str) -> Result<CropStrictness, String> {
    match value {
        "loose" => Ok(CropStrictness::Loose),
        "normal" => Ok(CropStrictness::Normal),
        "strict" => Ok(CropStrictness::Strict),
        _ => Err(format!("unknown strictness: {value}")),
    }
}

fn eye_extrinsics(x: f64) -> Mat4 {
    let view = DMat4::from_translation(DVec3::new(x, 0.0, 0.0));
    (rotation_x_180() * view.inverse()).as_mat4()
}

fn synthetic_calibration() -> RawCalibration {
    let k = Mat3::from_cols_array_2d(&[
        [800.0, 0.0, 0.0],
        [0.0, 800.0, 0.0],
        [640.0, 360.0, 1.0],
    ]);
    RawCalibration {
        left_intrinsics: k,
        right_intrinsics: k,
        left_extrinsics: eye_extrinsics(-0.032),
        right_extrinsics: eye_extrinsics(0.032),
        resolution: RESOLUTION,
    }
}

// a checkerboard tinted per eye
fn synthetic_frame(tint: [u8; 3]) -> Result<Image<u8, 4>, Box<dyn std::error::Error>> {
    let mut img = Image::<u8, 4>::from_size_val(RESOLUTION, 255)?;
    let cols = img.cols();
    img.as_slice_mut()
        .chunks_exact_mut(4)
        .enumerate()
        .for_each(|(i, pixel)| {
            let (x, y) = (i % cols, i / cols);
            let shade = if (x / 40 + y / 40) % 2 == 0 { 230 } else { 40 };
            for (c, t) in pixel.iter_mut().zip(tint) {
                *c = ((shade as u16 + t as u16) / 2) as u8;
            }
        });
    Ok(img)
}

fn save_rgba(img: &Image<u8, 4>, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let buffer = image::RgbaImage::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.as_slice().to_vec(),
    )
    .ok_or("image buffer does not match its size")?;
    buffer.save(path)?;
    log::info!("saved {}", path.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => CaptureConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => CaptureConfig::default(),
    };
    if let Some(strictness) = args.strictness {
        config.strictness = strictness;
    }
    if let Some(shortest_side) = args.shortest_side {
        config.shortest_side = shortest_side;
    }

    let session = CaptureSession::new(config);
    let calibration = session.start(&synthetic_calibration())?;

    let latest = LatestFrame::new();
    latest.publish(StereoFrame {
        left: synthetic_frame([255, 80, 80])?,
        right: synthetic_frame([80, 80, 255])?,
        device_transform: DMat4::IDENTITY,
    });

    // a 40x30 cm viewfinder one meter in front of the device
    let offset = DVec3::new(args.shift, 0.0, 0.0);
    let viewfinder = Quadrilateral3D {
        top_left: DVec3::new(-0.2, 0.15, -1.0) + offset,
        top_right: DVec3::new(0.2, 0.15, -1.0) + offset,
        bottom_left: DVec3::new(-0.2, -0.15, -1.0) + offset,
        bottom_right: DVec3::new(0.2, -0.15, -1.0) + offset,
    };

    let photo = session.capture(&latest, &viewfinder, viewfinder.size())?;

    std::fs::create_dir_all(&args.output_dir)?;
    for eye in [Eye::Left, Eye::Right] {
        save_rgba(
            photo.image(eye),
            &args.output_dir.join(format!("photo_{eye}.png")),
        )?;
    }

    if args.overlay {
        let frame = latest.snapshot().ok_or("no frame published")?;
        let model = calibration.locate(&frame.device_transform);
        for eye in [Eye::Left, Eye::Right] {
            let mut canvas = frame.image(eye).clone();
            let quad = project_viewfinder(&model, eye, &viewfinder)?;
            draw_quadrilateral(&mut canvas, &quad, [0, 255, 0, 255], 3);
            save_rgba(&canvas, &args.output_dir.join(format!("frame_{eye}.png")))?;
        }
    }

    Ok(())
}
