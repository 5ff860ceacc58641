//! End-to-end renders through `Scene`.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use lux_core::TriangleData;
use lux_math::random::gen_f64;
use lux_renderer::{
    encode_pixel, scenes, sky_gradient, Camera, CameraConfig, FrameContext, GeometryList, ImageConfig,
    Lambertian, Mesh, Quantization, RenderError, RenderSettings, RowDelivery, Scene, Scheduler, ThreadUsage,
    Vec3,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn pinhole() -> Camera {
    Camera::new(CameraConfig::pinhole(
        Vec3::new(0.0, 1.0, 4.0),
        Vec3::new(0.0, 0.5, 0.0),
        50.0,
        4.0 / 3.0,
    ))
    .unwrap()
}

fn settings(thread_usage: ThreadUsage, row_delivery: RowDelivery) -> RenderSettings {
    RenderSettings {
        seed: 7,
        thread_usage,
        row_delivery,
        ..RenderSettings::default()
    }
}

fn sphere_world() -> GeometryList {
    let mut rng = StdRng::seed_from_u64(3);
    scenes::random_spheres(&mut rng)
}

fn render(world: GeometryList, image: ImageConfig, settings: RenderSettings) -> Vec<u8> {
    let mut scene = Scene::new(world, pinhole(), image).unwrap().with_settings(settings).unwrap();
    scene.render().unwrap();
    scene.into_pixels()
}

#[test]
fn test_same_seed_renders_identical_buffers() {
    let image = ImageConfig::new(24, 18).with_quality(2, 4);
    let s = settings(ThreadUsage::Fixed(3), RowDelivery::OwnRow);

    let first = render(sphere_world(), image.clone(), s);
    let second = render(sphere_world(), image.clone(), s);
    assert_eq!(first, second);

    let other_seed = render(sphere_world(), image, RenderSettings { seed: 8, ..s });
    assert_ne!(first, other_seed);
}

#[test]
fn test_band_count_is_part_of_the_seed() {
    let image = ImageConfig::new(20, 15).with_quality(2, 4);
    let two = render(sphere_world(), image.clone(), settings(ThreadUsage::Fixed(2), RowDelivery::OwnRow));
    let three = render(sphere_world(), image.clone(), settings(ThreadUsage::Fixed(3), RowDelivery::OwnRow));

    // Band 0 starts at row 0 with the base seed either way
    let first_rows = 5 * image.row_len();
    assert_eq!(two[..first_rows], three[..first_rows]);
    assert_ne!(two, three);

    // Buckets seed per tile, so the pool size does not matter
    let buckets = |thread_usage| RenderSettings {
        scheduler: Scheduler::buckets(),
        ..settings(thread_usage, RowDelivery::OwnRow)
    };
    assert_eq!(
        render(sphere_world(), image.clone(), buckets(ThreadUsage::Fixed(2))),
        render(sphere_world(), image, buckets(ThreadUsage::Fixed(3)))
    );
}

#[test]
fn test_rendering_twice_is_idempotent() {
    let image = ImageConfig::new(16, 12).with_quality(1, 3);
    let mut scene = Scene::new(sphere_world(), pinhole(), image)
        .unwrap()
        .with_settings(settings(ThreadUsage::Fixed(2), RowDelivery::OwnRow))
        .unwrap();

    scene.render().unwrap();
    let first = scene.pixels().to_vec();
    scene.render().unwrap();
    assert_eq!(scene.pixels(), first.as_slice());
}

#[test]
fn test_single_worker_matches_sequential_loop() {
    let image = ImageConfig::new(12, 9).with_quality(1, 4);
    let world = sphere_world();
    let camera = pinhole();

    let pixels = render(world.clone(), image.clone(), settings(ThreadUsage::Single, RowDelivery::OwnRow));

    // Worker 0 seeds its stream with the base seed itself
    let ctx = FrameContext {
        camera: &camera,
        world: &world,
        image: &image,
        quantization: Quantization::Reference,
    };
    let mut rng = StdRng::seed_from_u64(7);
    let mut expected = vec![0u8; image.buffer_len()];
    for (y, row) in expected.chunks_exact_mut(image.row_len()).enumerate() {
        ctx.render_row(y as u32, &mut rng, row);
    }

    assert_eq!(pixels, expected);
}

#[test]
fn test_empty_world_renders_background() {
    let image = ImageConfig::new(10, 6).with_quality(1, 5);
    let camera = Camera::new(CameraConfig::pinhole(
        Vec3::ZERO,
        Vec3::new(0.0, 0.0, -1.0),
        90.0,
        10.0 / 6.0,
    ))
    .unwrap();
    let mut scene = Scene::new(GeometryList::new(), camera.clone(), image.clone())
        .unwrap()
        .with_settings(settings(ThreadUsage::Fixed(2), RowDelivery::OwnRow))
        .unwrap();
    scene.render().unwrap();

    // Replay the jitter stream of each worker to rebuild the exact rays
    let bands = lux_renderer::partition_rows(image.height, 2);
    let mut expected = vec![0u8; image.buffer_len()];
    for band in &bands {
        let mut rng = StdRng::seed_from_u64(7 + band.index as u64);
        for y in band.rows() {
            for x in 0..image.width {
                let s = (x as f64 + gen_f64(&mut rng)) / (image.width - 1) as f64;
                let t = (image.height as f64 - 1.0 - (y as f64 + gen_f64(&mut rng)))
                    / (image.height - 1) as f64;
                let ray = camera.get_ray(s, t, &mut rng);
                let offset = (y as usize * image.width as usize + x as usize) * 3;
                encode_pixel(sky_gradient(&ray), Quantization::Reference, &mut expected[offset..offset + 3]);
            }
        }
    }

    assert_eq!(scene.pixels(), expected.as_slice());
}

#[test]
fn test_row_delivery_modes_agree() {
    let image = ImageConfig::new(20, 15).with_quality(2, 4);
    let reference = render(sphere_world(), image.clone(), settings(ThreadUsage::Fixed(4), RowDelivery::OwnRow));

    for delivery in [RowDelivery::Serialized, RowDelivery::Collector] {
        let pixels = render(sphere_world(), image.clone(), settings(ThreadUsage::Fixed(4), delivery));
        assert_eq!(pixels, reference, "{:?} differs from own-row delivery", delivery);
    }
}

#[test]
fn test_row_delivery_reports_each_row_once() {
    let image = ImageConfig::new(10, 13).with_quality(1, 3);
    let row_len = image.row_len();

    for delivery in [RowDelivery::OwnRow, RowDelivery::Serialized, RowDelivery::Collector] {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);

        let mut scene = Scene::new(sphere_world(), pinhole(), image.clone())
            .unwrap()
            .with_settings(settings(ThreadUsage::Fixed(3), delivery))
            .unwrap();
        scene.set_on_rows_processed(move |rows| {
            assert_eq!(rows.row_pixels.len(), row_len);
            let completed = rows.image.map(|image| {
                // The reported row is already in place in the full view
                let start = rows.row as usize * row_len;
                assert_eq!(&image[start..start + row_len], rows.row_pixels);
                image.chunks_exact(row_len).filter(|r| r.iter().any(|&b| b != 0)).count()
            });
            log.lock().unwrap().push((rows.row, completed));
        });
        scene.render().unwrap();

        let seen = seen.lock().unwrap();
        let rows: HashSet<u32> = seen.iter().map(|(row, _)| *row).collect();
        assert_eq!(seen.len(), 13, "{:?}", delivery);
        assert_eq!(rows, (0..13).collect(), "{:?}", delivery);

        match delivery {
            RowDelivery::OwnRow => assert!(seen.iter().all(|(_, c)| c.is_none())),
            _ => {
                // Calls are serialized, so the completed count grows by one per call
                let counts: Vec<usize> = seen.iter().map(|(_, c)| c.unwrap()).collect();
                assert_eq!(counts, (1..=13).collect::<Vec<_>>(), "{:?}", delivery);
            }
        }
    }
}

#[test]
fn test_bucket_render_is_reproducible() {
    let image = ImageConfig::new(40, 30).with_quality(1, 3);
    let buckets = RenderSettings {
        scheduler: Scheduler::Buckets { size: 16 },
        ..settings(ThreadUsage::All, RowDelivery::OwnRow)
    };

    let first = render(sphere_world(), image.clone(), buckets);
    let second = render(sphere_world(), image.clone(), buckets);
    assert_eq!(first, second);

    // Output does not depend on the size of the bucket pool
    let single = RenderSettings {
        thread_usage: ThreadUsage::Single,
        ..buckets
    };
    assert_eq!(render(sphere_world(), image.clone(), single), first);
    assert_eq!(first.len(), image.buffer_len());

    // Every pixel is written: an empty world shows sky everywhere, never black
    let sky = render(GeometryList::new(), image, buckets);
    assert!(sky.chunks_exact(3).all(|p| p.iter().all(|&b| b > 0)));
}

#[test]
fn test_rgba_output_is_opaque() {
    let image = ImageConfig::new(8, 4).with_quality(1, 2).with_channels(4);
    let pixels = render(GeometryList::new(), image, settings(ThreadUsage::Fixed(2), RowDelivery::OwnRow));

    assert_eq!(pixels.len(), 8 * 4 * 4);
    assert!(pixels.chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn test_mesh_is_visible() {
    let tri = TriangleData::from_positions([
        Vec3::new(-2.0, 0.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
    ]);
    let mesh = Mesh::from_triangles(&[tri], Arc::new(Lambertian::new(Vec3::new(0.9, 0.1, 0.1))));
    let image = ImageConfig::new(9, 9).with_quality(4, 4);
    let camera = Camera::new(CameraConfig::pinhole(
        Vec3::new(0.0, 0.7, 3.0),
        Vec3::new(0.0, 0.7, 0.0),
        40.0,
        1.0,
    ))
    .unwrap();

    let mut with_mesh = Scene::new(scenes::ground_with_mesh(mesh), camera.clone(), image.clone()).unwrap();
    with_mesh.render().unwrap();
    let mut background = Scene::new(GeometryList::new(), camera, image.clone()).unwrap();
    background.render().unwrap();

    let center = (4 * 9 + 4) * 3;
    let lit = &with_mesh.pixels()[center..center + 3];
    let sky = &background.pixels()[center..center + 3];
    assert_ne!(lit, sky);
    // Red surface: red channel dominates
    assert!(lit[0] > lit[2]);
}

#[test]
fn test_configuration_errors() {
    let camera = pinhole();
    assert!(matches!(
        Scene::new(GeometryList::new(), camera.clone(), ImageConfig::new(4, 4).with_quality(0, 1)),
        Err(RenderError::ZeroSamples)
    ));

    let scene = Scene::new(GeometryList::new(), camera, ImageConfig::new(4, 4)).unwrap();
    let zero_buckets = RenderSettings {
        scheduler: Scheduler::Buckets { size: 0 },
        ..RenderSettings::default()
    };
    assert!(matches!(scene.with_settings(zero_buckets), Err(RenderError::ZeroBucketSize)));
}

#[test]
fn test_settings_round_trip_through_json() {
    let settings = RenderSettings {
        seed: 42,
        thread_usage: ThreadUsage::Fixed(6),
        row_delivery: RowDelivery::Collector,
        quantization: Quantization::Unclamped256,
        scheduler: Scheduler::Buckets { size: 32 },
    };
    let json = serde_json::to_string(&settings).unwrap();
    let parsed: RenderSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, settings);

    let partial: RenderSettings = serde_json::from_str(r#"{"thread_usage": "half"}"#).unwrap();
    assert_eq!(partial.thread_usage, ThreadUsage::Half);
    assert_eq!(partial.row_delivery, RowDelivery::OwnRow);

    let image: ImageConfig = serde_json::from_str(r#"{"width": 320, "height": 200}"#).unwrap();
    assert_eq!(image.samples_per_pixel, 16);
    assert!(image.validate().is_ok());

    let camera: CameraConfig = serde_json::from_str(r#"{"fov": 40.0, "position": [1.0, 2.0, 3.0]}"#).unwrap();
    assert_eq!(camera.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(camera.aspect_ratio, 16.0 / 9.0);
}
