//! Render demo.
//!
//! Renders either the random sphere field or a small mesh on a ground
//! plane and saves the result as a PNG.
//!
//! ```text
//! cargo run --release --example render_demo -- [config.json]
//! ```
//!
//! The optional JSON file may set any of `scene` (`"random_spheres"` or
//! `"pyramid"`), `camera`, `image` and `settings`; missing fields keep
//! their defaults. Set `RUST_LOG=debug` for per-worker logging.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use lux_core::MeshData;
use lux_renderer::{
    scenes, Camera, CameraConfig, GeometryList, ImageConfig, Lambertian, Mesh, RenderSettings, Scene,
    Vec3,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DemoScene {
    #[default]
    RandomSpheres,
    Pyramid,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DemoConfig {
    scene: DemoScene,
    camera: CameraConfig,
    image: ImageConfig,
    settings: RenderSettings,
}

fn load_config() -> Result<DemoConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path))
        }
        None => Ok(DemoConfig::default()),
    }
}

/// Four-sided pyramid with a square base, resting on y = 0.
fn pyramid() -> Mesh {
    let positions = vec![
        Vec3::new(-1.5, 0.0, -1.5),
        Vec3::new(1.5, 0.0, -1.5),
        Vec3::new(1.5, 0.0, 1.5),
        Vec3::new(-1.5, 0.0, 1.5),
        Vec3::new(0.0, 2.5, 0.0),
    ];
    let indices = vec![0, 4, 1, 1, 4, 2, 2, 4, 3, 3, 4, 0];

    let mut data = MeshData::new(positions, indices, None);
    data.ensure_normals();

    let material = Arc::new(Lambertian::new(Vec3::new(0.8, 0.3, 0.2)));
    Mesh::from_triangles(&data.triangles(), material)
}

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config()?;
    let world: GeometryList = match config.scene {
        DemoScene::RandomSpheres => {
            let mut rng = StdRng::seed_from_u64(config.settings.seed);
            scenes::random_spheres(&mut rng)
        }
        DemoScene::Pyramid => scenes::ground_with_mesh(pyramid()),
    };

    let camera = Camera::new(config.camera)?;
    let target = config
        .image
        .target
        .clone()
        .unwrap_or_else(|| "render.png".to_string());
    let (width, height, channels) = (config.image.width, config.image.height, config.image.color_channels);

    let mut scene = Scene::new(world, camera, config.image)?.with_settings(config.settings)?;

    let rows_done = Arc::new(AtomicU32::new(0));
    let progress = Arc::clone(&rows_done);
    scene.set_on_rows_processed(move |rows| {
        let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
        if done % 32 == 0 || done == height {
            log::info!("{}/{} rows (last: row {} from worker {})", done, height, rows.row, rows.worker);
        }
    });

    scene.render()?;

    let color_type = if channels == 4 {
        image::ColorType::Rgba8
    } else {
        image::ColorType::Rgb8
    };
    image::save_buffer(&target, scene.pixels(), width, height, color_type)
        .with_context(|| format!("saving {}", target))?;
    log::info!("Saved {}", target);

    Ok(())
}
